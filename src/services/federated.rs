//! Federated identity providers

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    config::FederatedConfig,
    error::{AppError, AppResult},
};

/// Raw assertion handed over by the client, e.g. a Google ID token
#[derive(Debug, Clone)]
pub struct ProviderAssertion {
    pub provider: String,
    pub token: String,
}

/// Identity vouched for by a provider after verifying an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub provider: String,
    /// Provider-side account id
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, assertion: &ProviderAssertion) -> AppResult<VerifiedIdentity>;
}

/// Subset of the Google tokeninfo response we rely on
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: Option<String>,
    email: Option<String>,
    /// Google returns booleans as strings here
    email_verified: Option<String>,
    name: Option<String>,
    aud: Option<String>,
    exp: Option<String>,
}

/// Verifies Google ID tokens through the tokeninfo endpoint
pub struct GoogleTokenInfo {
    http: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleTokenInfo {
    pub fn new(http: reqwest::Client, config: &FederatedConfig) -> Self {
        Self {
            http,
            tokeninfo_url: config.tokeninfo_url.clone(),
            client_id: config.google_client_id.clone(),
        }
    }

    fn check(&self, info: TokenInfo) -> AppResult<VerifiedIdentity> {
        let (Some(sub), Some(email)) = (info.sub, info.email) else {
            return Err(AppError::Provider(
                "Token missing required fields".to_string(),
            ));
        };

        if info.email_verified.as_deref() != Some("true") {
            return Err(AppError::Provider("Email address not verified".to_string()));
        }

        if let Some(exp) = info.exp.as_deref().and_then(|e| e.parse::<i64>().ok()) {
            if exp < Utc::now().timestamp() {
                return Err(AppError::Provider("Token has expired".to_string()));
            }
        }

        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| AppError::Provider("Google sign-in is not configured".to_string()))?;
        if info.aud.as_deref() != Some(client_id) {
            tracing::warn!("Google token audience mismatch");
            return Err(AppError::Provider("Token audience mismatch".to_string()));
        }

        Ok(VerifiedIdentity {
            provider: "google".to_string(),
            subject: sub,
            email,
            name: info.name,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleTokenInfo {
    async fn verify(&self, assertion: &ProviderAssertion) -> AppResult<VerifiedIdentity> {
        if assertion.provider != "google" {
            return Err(AppError::Validation(format!(
                "Unsupported identity provider: {}",
                assertion.provider
            )));
        }
        if self.client_id.is_none() {
            return Err(AppError::Provider("Google sign-in is not configured".to_string()));
        }

        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", assertion.token.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP error contacting Google tokeninfo endpoint");
                AppError::Internal("Google token validation service unavailable".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(http_status = %status, "Google tokeninfo rejected the token");
            return Err(AppError::Provider("Invalid or expired id_token".to_string()));
        }

        let info = response
            .json::<TokenInfo>()
            .await
            .map_err(|_| AppError::Provider("Malformed id_token".to_string()))?;

        self.check(info)
    }
}
