//! Session gate
//!
//! The browser holds the bearer token; the gate only decides what a request
//! may do with it:
//! - `Unauthenticated`: protected pages redirect to the login page
//! - `Authenticated(token)`: the token is sent with every protected call
//!
//! Every transition returns a [`SessionEffect`] describing what has to change
//! in browser storage. The web layer turns effects into cookies.

use super::ServiceError;

/// Opaque bearer token issued by the backend
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a stored value; empty values count as no token
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Where a token is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPersistence {
    /// Survives a browser restart
    Persistent,
    /// Dropped when the browser session ends
    BrowserSession,
}

/// Storage change requested by a gate transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    None,
    Store {
        token: SessionToken,
        persistence: TokenPersistence,
    },
    /// Remove the token from both storage locations
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionGate {
    #[default]
    Unauthenticated,
    Authenticated(SessionToken),
}

impl SessionGate {
    /// Derive the state from stored tokens, persistent storage first
    pub fn from_storage(persistent: Option<&str>, browser_session: Option<&str>) -> Self {
        persistent
            .and_then(SessionToken::new)
            .or_else(|| browser_session.and_then(SessionToken::new))
            .map(Self::Authenticated)
            .unwrap_or_default()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            Self::Authenticated(token) => Some(token),
            Self::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn sign_in(&mut self, token: SessionToken, persistence: TokenPersistence) -> SessionEffect {
        *self = Self::Authenticated(token.clone());
        SessionEffect::Store { token, persistence }
    }

    /// Clears storage even when no token was known, so stale copies go too
    pub fn sign_out(&mut self) -> SessionEffect {
        *self = Self::Unauthenticated;
        SessionEffect::Clear
    }

    /// React to a failed call: an authorization failure ends the session
    pub fn observe(&mut self, error: &ServiceError) -> SessionEffect {
        if matches!(error, ServiceError::Unauthorized) && self.is_authenticated() {
            tracing::info!("Backend rejected the session token, signing out");
            return self.sign_out();
        }
        SessionEffect::None
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A non-empty persistent token always wins over the browser-session one
        #[test]
        fn prop_persistent_token_wins(
            persistent in "[a-zA-Z0-9]{1,40}",
            browser in proptest::option::of("[a-zA-Z0-9]{0,40}"),
        ) {
            let gate = SessionGate::from_storage(Some(&persistent), browser.as_deref());
            prop_assert_eq!(gate.token().map(|t| t.as_str().to_string()), Some(persistent));
        }

        /// Signing out from any state leaves the gate unauthenticated
        #[test]
        fn prop_sign_out_from_any_state(stored in proptest::option::of("[a-z0-9]{1,20}")) {
            let mut gate = SessionGate::from_storage(stored.as_deref(), None);
            prop_assert_eq!(gate.sign_out(), SessionEffect::Clear);
            prop_assert_eq!(gate, SessionGate::Unauthenticated);
        }
    }
}
