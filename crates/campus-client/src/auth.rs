//! Session verification for the admin area.
//!
//! The server owns the session; the client only asks whether the cookie it
//! holds is still good and sends the user to the login route when it is not.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use campus_core::defaults::AUTH_VERIFY_PATH;
use campus_core::{Error, Result, SessionVerifier};

use crate::envelope;
use crate::http::ApiClient;

/// Names under which the verify endpoint reports validity.
const VALIDITY_FLAGS: &[&str] = &["valid", "isValid", "authenticated"];

/// [`SessionVerifier`] backed by `GET /auth/verify`.
#[derive(Debug, Clone)]
pub struct SessionClient {
    api: ApiClient,
}

impl SessionClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SessionVerifier for SessionClient {
    #[instrument(skip(self), fields(subsystem = "client", component = "auth", op = "verify_session"))]
    async fn verify_session(&self) -> Result<bool> {
        if self.api.config().session_cookie.is_none() {
            debug!("No session cookie configured");
            return Ok(false);
        }
        match self.api.get(AUTH_VERIFY_PATH).await {
            Ok(body) => Ok(validity_flag(&body)),
            Err(Error::Unauthorized(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Read the validity flag from a verify response, looking inside the `data`
/// envelope as well. A missing flag counts as invalid.
pub fn validity_flag(body: &Value) -> bool {
    let find = |value: &Value| {
        VALIDITY_FLAGS
            .iter()
            .find_map(|flag| value.get(*flag).and_then(Value::as_bool))
    };
    find(body)
        .or_else(|| find(&envelope::unwrap(body.clone())))
        .unwrap_or(false)
}

/// Outcome of the admin route guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allowed,
    /// Send the user to this route.
    Redirect(String),
}

/// Guard run before any admin screen is shown.
pub struct AuthGate<V> {
    verifier: V,
    login_route: String,
}

impl<V: SessionVerifier> AuthGate<V> {
    pub fn new(verifier: V, login_route: impl Into<String>) -> Self {
        Self {
            verifier,
            login_route: login_route.into(),
        }
    }

    /// Allow when the session verifies; redirect on an invalid session or any
    /// failure to verify.
    pub async fn check(&self) -> AuthDecision {
        match self.verifier.verify_session().await {
            Ok(true) => {
                debug!("Session valid");
                AuthDecision::Allowed
            }
            Ok(false) => {
                info!(route = %self.login_route, "Session invalid, redirecting to login");
                AuthDecision::Redirect(self.login_route.clone())
            }
            Err(e) => {
                warn!(error = %e, route = %self.login_route, "Session check failed, redirecting to login");
                AuthDecision::Redirect(self.login_route.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Verifier with a canned answer; `None` fails the check.
    struct Fixed(Option<bool>);

    #[async_trait]
    impl SessionVerifier for Fixed {
        async fn verify_session(&self) -> Result<bool> {
            self.0.ok_or_else(|| Error::Request("connection refused".to_string()))
        }
    }

    #[test]
    fn test_validity_flag_names() {
        assert!(validity_flag(&json!({"valid": true})));
        assert!(validity_flag(&json!({"isValid": true})));
        assert!(validity_flag(&json!({"authenticated": true})));
        assert!(!validity_flag(&json!({"valid": false})));
    }

    #[test]
    fn test_validity_flag_inside_envelope() {
        assert!(validity_flag(&json!({"data": {"isValid": true}})));
        assert!(validity_flag(&json!({"data": {"data": {"valid": true}}})));
    }

    #[test]
    fn test_missing_flag_is_invalid() {
        assert!(!validity_flag(&json!({"user": "admin"})));
        assert!(!validity_flag(&Value::Null));
    }

    #[tokio::test]
    async fn test_gate_allows_valid_session() {
        let gate = AuthGate::new(Fixed(Some(true)), "/admin/login");
        assert_eq!(gate.check().await, AuthDecision::Allowed);
    }

    #[tokio::test]
    async fn test_gate_redirects_invalid_session() {
        let gate = AuthGate::new(Fixed(Some(false)), "/admin/login");
        assert_eq!(
            gate.check().await,
            AuthDecision::Redirect("/admin/login".to_string())
        );
    }

    #[tokio::test]
    async fn test_gate_redirects_on_error() {
        let gate = AuthGate::new(Fixed(None), "/login");
        assert_eq!(gate.check().await, AuthDecision::Redirect("/login".to_string()));
    }
}
