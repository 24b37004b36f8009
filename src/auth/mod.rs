//! Admin guard for the orchestrator routes.
//!
//! A request is admin when it presents the shared secret in the admin API key header or
//! a session cookie the configured [`SessionVerifier`] accepts. Failures are counted per
//! client and lock the client out once they exceed the configured limit.

pub mod attempts;

pub use attempts::{AttemptStore, InMemoryAttemptStore};

use crate::constants::headers as header_names;
use crate::error::AppError;
use crate::refresh::Credentials;
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum_extra::extract::cookie::CookieJar;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Compares two secrets without short-circuiting on the first differing byte.
///
/// Both sides are hashed first so the comparison length never depends on the input.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let left = Sha256::digest(a.as_bytes());
    let right = Sha256::digest(b.as_bytes());
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Decides whether a session cookie value belongs to an admin.
///
/// Cookie signing and session issuing live elsewhere; implementations only verify.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn is_admin(&self, session: &str) -> bool;
}

/// Accepts exactly the configured admin session tokens. With no tokens it accepts nothing.
#[derive(Debug, Clone, Default)]
pub struct AdminSessionTokens {
    tokens: Vec<String>,
}

impl AdminSessionTokens {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens: tokens.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }
}

#[async_trait]
impl SessionVerifier for AdminSessionTokens {
    async fn is_admin(&self, session: &str) -> bool {
        // Every token is compared so timing does not reveal which one matched.
        self.tokens
            .iter()
            .fold(false, |found, token| constant_time_eq(token, session) | found)
    }
}

/// The session cookie's value, read from every `Cookie` header on the request.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(header_names::SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
}

/// All `Cookie` headers joined back into one, as forwarded to refreshers.
fn raw_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct AdminGuard {
    api_key: Option<String>,
    sessions: Arc<dyn SessionVerifier>,
    attempts: Arc<dyn AttemptStore>,
}

impl AdminGuard {
    pub fn new(
        api_key: Option<String>,
        sessions: Arc<dyn SessionVerifier>,
        attempts: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            sessions,
            attempts,
        }
    }

    /// Authorizes one request, returning the credentials to forward downstream.
    pub async fn authorize(&self, client: &str, headers: &HeaderMap) -> Result<Credentials, AppError> {
        self.attempts.check(client).await?;

        match self.credentials_from(headers).await {
            Some(credentials) => {
                self.attempts.clear(client).await;
                Ok(credentials)
            }
            None => {
                let failures = self.attempts.record_failure(client).await;
                warn!("Rejected admin request from {client} ({failures} recent failures)");
                Err(AppError::Unauthorized)
            }
        }
    }

    async fn credentials_from(&self, headers: &HeaderMap) -> Option<Credentials> {
        if let Some(presented) = headers
            .get(header_names::ADMIN_API_KEY)
            .and_then(|value| value.to_str().ok())
        {
            if let Some(expected) = &self.api_key
                && constant_time_eq(expected, presented)
            {
                debug!("Admin authenticated by API key");
                return Some(Credentials::ApiKey(presented.to_string()));
            }
            return None;
        }

        let session = session_cookie(headers)?;
        if self.sessions.is_admin(&session).await {
            debug!("Admin authenticated by session cookie");
            return Some(Credentials::SessionCookie(raw_cookies(headers)));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn guard(max_attempts: u32) -> AdminGuard {
        AdminGuard::new(
            Some("s3cret".to_string()),
            Arc::new(AdminSessionTokens::new(vec!["session-token".to_string()])),
            Arc::new(InMemoryAttemptStore::new(
                max_attempts,
                Duration::from_secs(60),
                16,
            )),
        )
    }

    fn with_header(name: &'static str, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("s3cret", "s3cret"));
        assert!(!constant_time_eq("s3cret", "s3cre"));
        assert!(!constant_time_eq("s3cret", "S3cret"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_session_cookie() {
        let headers = with_header("cookie", "theme=dark; admin_session=abc123; other=x");
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));
        assert_eq!(session_cookie(&with_header("cookie", "theme=dark")), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);

        let quoted = with_header("cookie", "admin_session=\"quoted\"");
        assert_eq!(session_cookie(&quoted).as_deref(), Some("quoted"));
    }

    #[test]
    fn test_split_cookie_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("admin_session=abc123"));
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));
        assert_eq!(raw_cookies(&headers), "theme=dark; admin_session=abc123");
    }

    #[tokio::test]
    async fn test_api_key_is_forwarded() {
        let credentials = guard(5)
            .authorize("client", &with_header("x-admin-api-key", "s3cret"))
            .await
            .unwrap();
        assert_eq!(credentials, Credentials::ApiKey("s3cret".to_string()));
    }

    #[tokio::test]
    async fn test_session_cookie_is_forwarded_whole() {
        let cookie = "theme=dark; admin_session=session-token";
        let credentials = guard(5)
            .authorize("client", &with_header("cookie", cookie))
            .await
            .unwrap();
        assert_eq!(credentials, Credentials::SessionCookie(cookie.to_string()));
    }

    #[tokio::test]
    async fn test_wrong_key_and_missing_credentials_are_unauthorized() {
        let guard = guard(5);
        let err = guard
            .authorize("client", &with_header("x-admin-api-key", "guess"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let err = guard.authorize("client", &HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = guard
            .authorize("client", &with_header("cookie", "admin_session=forged"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_no_configured_key_rejects_every_key() {
        let guard = AdminGuard::new(
            None,
            Arc::new(AdminSessionTokens::default()),
            Arc::new(InMemoryAttemptStore::new(5, Duration::from_secs(60), 16)),
        );
        let err = guard
            .authorize("client", &with_header("x-admin-api-key", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_repeated_failures_lock_out_client() {
        let guard = guard(2);
        for _ in 0..2 {
            let err = guard.authorize("10.0.0.9", &HeaderMap::new()).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized));
        }

        // Even the right key is refused while locked out.
        let err = guard
            .authorize("10.0.0.9", &with_header("x-admin-api-key", "s3cret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TooManyAttempts { .. }));
    }

    #[tokio::test]
    async fn test_success_clears_failures() {
        let guard = guard(2);
        guard.authorize("client", &HeaderMap::new()).await.unwrap_err();
        guard
            .authorize("client", &with_header("x-admin-api-key", "s3cret"))
            .await
            .unwrap();
        guard.authorize("client", &HeaderMap::new()).await.unwrap_err();
        assert!(
            guard
                .authorize("client", &with_header("x-admin-api-key", "s3cret"))
                .await
                .is_ok()
        );
    }
}
