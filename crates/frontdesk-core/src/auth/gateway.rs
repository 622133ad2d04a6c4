use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::SessionStore;
use crate::api::{ApiError, AuthorizedTransport, Resource};
use crate::models::UserProfile;

/// Scheme prefix some backends echo inside the token field itself
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default, alias = "credential")]
    token: Option<String>,
    #[serde(alias = "principal")]
    user: UserProfile,
}

/// Strip a redundant `Bearer ` scheme so the stored credential is the bare token.
pub fn normalize_credential(token: &str) -> &str {
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token)
}

/// Login and logout against the backend's `users` endpoints.
#[derive(Clone)]
pub struct AuthGateway {
    users: Resource<UserProfile>,
    session: SessionStore,
}

impl AuthGateway {
    pub fn new(transport: &AuthorizedTransport) -> Self {
        Self {
            users: transport.users(),
            session: transport.session().clone(),
        }
    }

    /// Authenticate and start a session. Backend errors, and a response whose
    /// credential is empty, are returned as errors and leave the session
    /// untouched.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<UserProfile, ApiError> {
        let body = LoginRequest {
            email: identifier,
            password: secret,
        };
        let response = self
            .users
            .execute_anonymous(Method::POST, "login", Some(&body))
            .await?;

        let text = response.text().await?;
        let login: LoginResponse = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse login response: {}", e))
        })?;

        let credential = login
            .token
            .as_deref()
            .map(|token| normalize_credential(token).to_string());
        if credential.as_deref() == Some("") {
            return Err(ApiError::InvalidResponse(
                "Login response carried an empty credential".to_string(),
            ));
        }
        self.session.login(credential, login.user.clone());

        info!(user_id = login.user.id, "Login successful");
        Ok(login.user)
    }

    /// End the session. The remote invalidation is best-effort: the local
    /// session is cleared whatever happens, then a remote failure is
    /// reported to the caller.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let remote = self
            .users
            .execute::<()>(Method::POST, "logout", None)
            .await;

        self.session.logout();

        match remote {
            Ok(_) => {
                info!("Logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Remote logout failed, local session cleared");
                Err(e)
            }
        }
    }

    /// Validate the current session. May log it out; see
    /// [`SessionStore::check_auth`].
    pub fn verify(&self) -> bool {
        self.session.check_auth()
    }
}
