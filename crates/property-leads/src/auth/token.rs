//! HS256 session tokens issued at login.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use crate::agents::AgentRecord;
use crate::config::AuthConfig;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Internal agent id.
    pub id: String,
    /// Agent code, e.g. `AG001`.
    pub agent_id: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens with the shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: config.token_ttl,
        }
    }

    pub fn issue(&self, agent: &AgentRecord) -> Result<String, AuthError> {
        self.issue_at(agent, Utc::now())
    }

    /// Issue a token as if it were `issued_at`.
    pub fn issue_at(
        &self,
        agent: &AgentRecord,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = issued_at.timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| AuthError::Crypto("token lifetime out of range".to_string()))?;
        let claims = SessionClaims {
            id: agent.id.0.clone(),
            agent_id: agent.code.0.clone(),
            email: agent.email.clone(),
            name: agent.name.clone(),
            iat,
            exp,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// Check signature and expiry. Every failure maps to [`AuthError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                AuthError::InvalidToken
            })
    }
}

/// Extract the credential from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (_, token) = header?.trim().split_once(' ')?;
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentCode, AgentId, AgentStatus};

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl: Duration::from_secs(7 * 24 * 3600),
        })
    }

    fn agent() -> AgentRecord {
        AgentRecord {
            id: AgentId("7d1f0c52".to_string()),
            code: AgentCode("AG001".to_string()),
            name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            password_hash: String::new(),
            status: AgentStatus::Active,
            package: Some("premium".to_string()),
        }
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let signer = signer("secret");
        let token = signer.issue(&agent()).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.id, "7d1f0c52");
        assert_eq!(claims.agent_id, "AG001");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = signer("secret").issue(&agent()).unwrap();
        assert!(matches!(
            signer("other").verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_invalid() {
        let signer = signer("secret");
        let issued_at = Utc::now() - chrono::Duration::days(8);
        let token = signer.issue_at(&agent(), issued_at).unwrap();
        assert!(matches!(signer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn malformed_token_is_invalid() {
        assert!(matches!(
            signer("secret").verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_wrap() {
        let signer = TokenSigner::new(&AuthConfig {
            jwt_secret: "secret".to_string(),
            token_ttl: Duration::from_secs(u64::MAX),
        });
        assert!(matches!(signer.issue(&agent()), Err(AuthError::Crypto(_))));
    }

    #[test]
    fn bearer_token_requires_value() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(None), None);
    }
}
