use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::error::AuthError;
use super::password;
use super::token::{bearer_token, TokenSigner};
use crate::agents::{AgentId, AgentProfile, AgentStatus};
use crate::config::AuthConfig;
use crate::repository::AgentDirectory;

/// Login form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub token: String,
    pub agent: AgentProfile,
}

/// Agent projection returned by session verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedAgent {
    #[serde(flatten)]
    pub profile: AgentProfile,
    pub status: AgentStatus,
}

/// Authentication service.
///
/// Generic over the agent directory so the login flow can run against any store.
pub struct AuthService<D> {
    directory: Arc<D>,
    signer: TokenSigner,
}

impl<D> AuthService<D>
where
    D: AgentDirectory + 'static,
{
    pub fn new(directory: Arc<D>, config: &AuthConfig) -> Self {
        Self {
            directory,
            signer: TokenSigner::new(config),
        }
    }

    /// Authenticate with email + password and issue a session token.
    ///
    /// An unknown email and a wrong password produce the same
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutput, AuthError> {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(agent) = self.directory.find_by_email(email).await? else {
            warn!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !agent.is_active() {
            warn!(agent = %agent.code, status = agent.status.label(), "login rejected: inactive account");
            return Err(AuthError::AccountInactive);
        }

        let hash = agent.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Crypto(format!("password check aborted: {e}")))??;
        if !valid {
            warn!(agent = %agent.code, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(&agent)?;
        info!(agent = %agent.code, "agent logged in");

        Ok(LoginOutput {
            token,
            agent: agent.profile(),
        })
    }

    /// Validate an `Authorization` header value and re-check the agent's live status.
    ///
    /// Every failure after the token is present, including a store error during the
    /// re-check, is reported as [`AuthError::InvalidToken`].
    pub async fn verify(&self, authorization: Option<&str>) -> Result<VerifiedAgent, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::MissingToken)?;
        let claims = self.signer.verify(token)?;

        let found = match self.directory.find_by_id(&AgentId(claims.id)).await {
            Ok(found) => found,
            Err(err) => {
                error!(error = %err, agent = %claims.agent_id, "session re-check failed");
                return Err(AuthError::InvalidToken);
            }
        };

        match found {
            Some(agent) if agent.is_active() => Ok(VerifiedAgent {
                profile: agent.profile(),
                status: agent.status,
            }),
            Some(agent) => {
                warn!(agent = %agent.code, "session rejected: account no longer active");
                Err(AuthError::InvalidToken)
            }
            None => Err(AuthError::InvalidToken),
        }
    }
}
