//! Web middleware
//!
//! Contains:
//! - Application state shared by all handlers
//! - Page-level errors and their responses
//! - Token and flash cookies
//! - Session gate middleware for protected pages
//!
//! Handlers never write cookies themselves. They attach a [`SessionEffect`]
//! and/or a [`Flash`] to the response, and [`apply_cookie_effects`] turns
//! those into `Set-Cookie` headers.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::flash::{Flash, FLASH_COOKIE};
use super::views::{ViewError, Views};
use crate::backend::ForumBackend;
use crate::config::{Config, SessionConfig};
use crate::services::{
    messages, CommentService, ForumService, ServiceError, SessionEffect, SessionGate,
    SessionToken, TokenPersistence, UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub forum_service: Arc<ForumService>,
    pub comment_service: Arc<CommentService>,
    pub views: Arc<Views>,
    pub session: Arc<SessionConfig>,
    pub comment_page_size: u32,
}

impl AppState {
    pub fn new(backend: Arc<dyn ForumBackend>, views: Views, config: &Config) -> Self {
        Self {
            user_service: Arc::new(UserService::new(backend.clone())),
            forum_service: Arc::new(ForumService::new(backend.clone())),
            comment_service: Arc::new(CommentService::new(backend)),
            views: Arc::new(views),
            session: Arc::new(config.session.clone()),
            comment_page_size: config.comments.page_size,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Page-level failures
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No stored token on a protected page
    #[error("Session required")]
    SessionRequired,

    /// The backend rejected the stored token
    #[error("Session ended")]
    SessionEnded,

    #[error(transparent)]
    View(#[from] ViewError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::SessionRequired => Redirect::to("/login").into_response(),
            Self::SessionEnded => {
                let mut response = Redirect::to("/login").into_response();
                response.extensions_mut().insert(SessionRejected);
                response
                    .extensions_mut()
                    .insert(Flash::error(messages::INVALID_TOKEN));
                response
            }
            Self::View(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(format!("<h1>{}</h1>", messages::UNKNOWN_ERROR)),
                )
                    .into_response()
            }
        }
    }
}

/// Marks a response whose backend call rejected the session token
#[derive(Debug, Clone, Copy)]
struct SessionRejected;

// ============================================================================
// Cookies
// ============================================================================

/// Value of a request cookie
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

fn cookie(name: &str, value: &str, max_age: Option<u64>, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie(name: &str, secure: bool) -> String {
    cookie(name, "", Some(0), secure)
}

/// Session state of a request, derived from its token cookies
pub fn session_gate(headers: &HeaderMap, config: &SessionConfig) -> SessionGate {
    SessionGate::from_storage(
        read_cookie(headers, &config.cookie_name).as_deref(),
        read_cookie(headers, &config.browser_cookie_name).as_deref(),
    )
}

/// `Set-Cookie` values carrying out a session effect
pub fn session_cookies(effect: &SessionEffect, config: &SessionConfig) -> Vec<String> {
    let persistent = config.cookie_name.as_str();
    let browser = config.browser_cookie_name.as_str();
    match effect {
        SessionEffect::None => Vec::new(),
        SessionEffect::Store { token, persistence } => {
            let value = urlencoding::encode(token.as_str());
            match persistence {
                TokenPersistence::Persistent => vec![
                    cookie(
                        persistent,
                        &value,
                        Some(u64::from(config.max_age_days) * 24 * 60 * 60),
                        config.secure,
                    ),
                    expired_cookie(browser, config.secure),
                ],
                TokenPersistence::BrowserSession => vec![
                    cookie(browser, &value, None, config.secure),
                    expired_cookie(persistent, config.secure),
                ],
            }
        }
        SessionEffect::Clear => vec![
            expired_cookie(persistent, config.secure),
            expired_cookie(browser, config.secure),
        ],
    }
}

/// Write session effects and flashes attached to the response as cookies.
///
/// A flash that came with the request is dropped once a page has been
/// rendered for it.
pub async fn apply_cookie_effects(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let had_flash = read_cookie(request.headers(), FLASH_COOKIE).is_some();
    let mut response = next.run(request).await;

    let mut cookies = Vec::new();
    if let Some(effect) = response.extensions_mut().remove::<SessionEffect>() {
        cookies.extend(session_cookies(&effect, &state.session));
    }
    match response.extensions_mut().remove::<Flash>() {
        Some(flash) => cookies.push(cookie(FLASH_COOKIE, &flash.encode(), None, state.session.secure)),
        None if had_flash && !response.status().is_redirection() => {
            cookies.push(expired_cookie(FLASH_COOKIE, state.session.secure));
        }
        None => {}
    }

    for value in cookies {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping invalid cookie: {}", e),
        }
    }
    response
}

// ============================================================================
// Session extraction
// ============================================================================

/// Token of a request that passed [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionToken);

/// Session gate middleware: pages behind it need a stored token.
///
/// A page that found its token rejected by the backend ends the session
/// here, through the gate.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let mut gate = session_gate(request.headers(), &state.session);
    let token = gate.token().cloned().ok_or(WebError::SessionRequired)?;

    request.extensions_mut().insert(CurrentSession(token));
    let mut response = next.run(request).await;

    if response.extensions_mut().remove::<SessionRejected>().is_some() {
        let effect = gate.observe(&ServiceError::Unauthorized);
        response.extensions_mut().insert(effect);
    }
    Ok(response)
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or(WebError::SessionRequired)
    }
}

/// Session of a public page, if the browser has one
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<SessionToken>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let gate = session_gate(&parts.headers, &state.session);
        Ok(Self(gate.token().cloned()))
    }
}

/// Response that carries a storage effect and/or a flash for the cookie layer
pub fn with_effects(
    response: impl IntoResponse,
    effect: Option<SessionEffect>,
    flash: Option<Flash>,
) -> Response {
    let mut response = response.into_response();
    if let Some(effect) = effect {
        response.extensions_mut().insert(effect);
    }
    if let Some(flash) = flash {
        response.extensions_mut().insert(flash);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_read_cookie() {
        let headers = headers("a=1; token=abc%2Edef; flash=x");
        assert_eq!(read_cookie(&headers, "token"), Some("abc.def".to_string()));
        assert_eq!(read_cookie(&headers, "a"), Some("1".to_string()));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_session_gate_reads_both_cookies() {
        let config = SessionConfig::default();

        let gate = session_gate(&headers("session_token=s1"), &config);
        assert_eq!(gate.token().map(|t| t.as_str()), Some("s1"));

        let gate = session_gate(&headers("session_token=s1; token=p1"), &config);
        assert_eq!(gate.token().map(|t| t.as_str()), Some("p1"));

        let gate = session_gate(&headers("token="), &config);
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_persistent_store_cookies() {
        let config = SessionConfig::default();
        let effect = SessionEffect::Store {
            token: SessionToken::new("t1").unwrap(),
            persistence: TokenPersistence::Persistent,
        };

        let cookies = session_cookies(&effect, &config);

        assert_eq!(
            cookies,
            vec![
                "token=t1; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800".to_string(),
                "session_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string(),
            ]
        );
    }

    #[test]
    fn test_browser_session_store_has_no_max_age() {
        let config = SessionConfig {
            secure: true,
            ..SessionConfig::default()
        };
        let effect = SessionEffect::Store {
            token: SessionToken::new("t1").unwrap(),
            persistence: TokenPersistence::BrowserSession,
        };

        let cookies = session_cookies(&effect, &config);

        assert_eq!(cookies[0], "session_token=t1; Path=/; HttpOnly; SameSite=Lax; Secure");
        assert!(cookies[1].starts_with("token=;"));
    }

    #[test]
    fn test_clear_expires_both_cookies() {
        let cookies = session_cookies(&SessionEffect::Clear, &SessionConfig::default());
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
        assert!(session_cookies(&SessionEffect::None, &SessionConfig::default()).is_empty());
    }
}
