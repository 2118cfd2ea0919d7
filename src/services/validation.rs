//! Client-side input validation
//!
//! Forms are checked before anything is sent to the backend. Account forms
//! report one message per field (the first failing rule); forum and comment
//! forms report a single form-level message.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::messages;
use crate::models::{
    ChangePasswordRequest, CommentInput, ForumInput, LoginRequest, RegisterRequest,
    UpdateUserRequest,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_FORUM_TITLE_LENGTH: usize = 100;
pub const MAX_FORUM_DESCRIPTION_LENGTH: usize = 250;
pub const MAX_COMMENT_LENGTH: usize = 250;

/// Local part, then one or more dot-separated domain labels (`admin@localhost` is valid)
static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^[^\s@]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
    )
    .ok()
});

fn is_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Validation failures of one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, &'static str>,
    form: Option<&'static str>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_none()
    }

    /// Message for a form field, keyed by its wire name
    pub fn field(&self, name: &str) -> Option<&'static str> {
        self.fields.get(name).copied()
    }

    /// Message about the form as a whole
    pub fn form(&self) -> Option<&'static str> {
        self.form
    }

    /// All messages, field messages first
    pub fn messages(&self) -> Vec<&'static str> {
        self.fields.values().copied().chain(self.form).collect()
    }

    /// Record a field failure; the first failure of a field wins
    fn add(&mut self, field: &'static str, message: Option<&'static str>) {
        if let Some(message) = message {
            self.fields.entry(field).or_insert(message);
        }
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn form_error(message: &'static str) -> Result<(), ValidationErrors> {
        Err(Self {
            fields: BTreeMap::new(),
            form: Some(message),
        })
    }
}

// ============================================================================
// Field rules
// ============================================================================

fn required(value: &str) -> Option<&'static str> {
    value.is_empty().then_some(messages::REQUIRED)
}

fn email(value: &str) -> Option<&'static str> {
    required(value).or_else(|| (!is_email(value)).then_some(messages::INVALID_EMAIL))
}

/// Password complexity: required, length, a digit, a lowercase letter
pub fn password(value: &str) -> Option<&'static str> {
    if let Some(message) = required(value) {
        return Some(message);
    }
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Some(messages::PASSWORD_TOO_SHORT);
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Some(messages::PASSWORD_NEEDS_DIGIT);
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Some(messages::PASSWORD_NEEDS_LOWERCASE);
    }
    None
}

fn confirmation(value: &str, original: &str, mismatch: &'static str) -> Option<&'static str> {
    required(value).or_else(|| (value != original).then_some(mismatch))
}

// ============================================================================
// Forms
// ============================================================================

pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.add("username", email(&request.username));
    errors.add("password", password(&request.password));
    errors.into_result()
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.add("username", email(&request.username));
    errors.add("password", password(&request.password));
    errors.add(
        "passwordConfirm",
        confirmation(&request.password_confirm, &request.password, messages::PASSWORDS_MUST_MATCH),
    );
    errors.add("firstName", required(&request.first_name));
    errors.add("lastName", required(&request.last_name));
    errors.into_result()
}

pub fn validate_password_change(request: &ChangePasswordRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.add("oldPassword", password(&request.old_password));
    errors.add(
        "password",
        password(&request.password).or_else(|| {
            (request.password == request.old_password).then_some(messages::NEW_PASSWORD_SAME_AS_OLD)
        }),
    );
    errors.add(
        "passwordConfirm",
        confirmation(
            &request.password_confirm,
            &request.password,
            messages::PASSWORD_CONFIRM_MISMATCH,
        ),
    );
    errors.into_result()
}

pub fn validate_profile_update(request: &UpdateUserRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.add("firstName", required(&request.first_name));
    errors.add("lastName", required(&request.last_name));
    errors.into_result()
}

pub fn validate_forum(input: &ForumInput) -> Result<(), ValidationErrors> {
    if input.title.trim().is_empty() || input.description.trim().is_empty() {
        return ValidationErrors::form_error(messages::FORUM_FIELDS_REQUIRED);
    }
    if input.title.chars().count() > MAX_FORUM_TITLE_LENGTH {
        return ValidationErrors::form_error(messages::FORUM_TITLE_TOO_LONG);
    }
    if input.description.chars().count() > MAX_FORUM_DESCRIPTION_LENGTH {
        return ValidationErrors::form_error(messages::FORUM_DESCRIPTION_TOO_LONG);
    }
    Ok(())
}

pub fn validate_comment(input: &CommentInput) -> Result<(), ValidationErrors> {
    if input.message.trim().is_empty() {
        return ValidationErrors::form_error(messages::COMMENT_EMPTY);
    }
    if input.message.chars().count() > MAX_COMMENT_LENGTH {
        return ValidationErrors::form_error(messages::COMMENT_TOO_LONG);
    }
    Ok(())
}
