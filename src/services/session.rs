//! Stateless session tokens

use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{Identity, SessionClaims},
};

/// Mints and checks the signed session tokens carried in the session cookie
#[derive(Clone)]
pub struct SessionIssuer {
    secret: String,
    lifetime: Duration,
    refresh_after: Duration,
}

impl SessionIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            lifetime: Duration::days(config.session_lifetime_days),
            refresh_after: Duration::hours(config.refresh_after_hours),
        }
    }

    /// Sign a token for `identity`, valid for the configured lifetime
    pub fn issue(&self, identity: &Identity) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims::for_identity(identity, now, now + self.lifetime.num_seconds());
        claims
            .create_token(&self.secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify signature and expiry. Missing or bad tokens are simply `None`.
    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        match SessionClaims::from_token(token, &self.secret) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(reason = %e, "Rejected session token");
                None
            }
        }
    }

    /// Sliding window: a fresh token for the same subject once the current one
    /// is older than `refresh_after`, otherwise `None`
    pub fn refresh(&self, claims: &SessionClaims) -> AppResult<Option<String>> {
        let age = Utc::now().timestamp() - claims.iat;
        if age < self.refresh_after.num_seconds() {
            return Ok(None);
        }
        self.issue(&claims.identity()).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(&AuthConfig {
            jwt_secret: "test-secret".into(),
            ..AuthConfig::default()
        })
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            name: Some("Ann".into()),
        }
    }

    #[test]
    fn validate_returns_issued_subject() {
        let issuer = issuer();
        let identity = identity();
        let token = issuer.issue(&identity).unwrap();

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.sub, identity.id);
        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn expired_token_is_invalid() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let token = SessionClaims::for_identity(&identity(), now - 120, now - 1)
            .create_token("test-secret")
            .unwrap();

        assert!(issuer.validate(&token).is_none());
    }

    #[test]
    fn garbage_and_foreign_tokens_are_invalid() {
        let issuer = issuer();
        assert!(issuer.validate("").is_none());
        assert!(issuer.validate("not.a.jwt").is_none());

        let foreign = SessionIssuer::new(&AuthConfig {
            jwt_secret: "someone-else".into(),
            ..AuthConfig::default()
        })
        .issue(&identity())
        .unwrap();
        assert!(issuer.validate(&foreign).is_none());
    }

    #[test]
    fn fresh_token_is_not_refreshed() {
        let issuer = issuer();
        let token = issuer.issue(&identity()).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert!(issuer.refresh(&claims).unwrap().is_none());
    }

    #[test]
    fn old_token_is_refreshed_for_same_subject() {
        let issuer = issuer();
        let identity = identity();
        let now = Utc::now().timestamp();
        let old = SessionClaims::for_identity(&identity, now - 2 * 24 * 3600, now + 3600);

        let refreshed = issuer.refresh(&old).unwrap().unwrap();
        let claims = issuer.validate(&refreshed).unwrap();
        assert_eq!(claims.sub, identity.id);
        assert!(claims.exp > old.exp);
    }
}
