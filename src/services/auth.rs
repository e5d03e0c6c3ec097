//! Authentication service: credential and federated sign-in

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::user::{default_display_name, normalize_email, parse_email, MIN_PASSWORD_LEN},
    models::{Identity, NewUser},
    repository::DynStore,
};

use super::{
    federated::{IdentityProvider, ProviderAssertion},
    password::PasswordHasher,
};

/// What the caller wants to do with submitted credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialIntent {
    SignIn,
    SignUp { name: Option<String> },
}

/// Every way a user can prove who they are
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Credentials {
        email: String,
        password: String,
        intent: CredentialIntent,
    },
    Federated(ProviderAssertion),
}

#[derive(Clone)]
pub struct AuthService {
    store: DynStore,
    hasher: PasswordHasher,
    provider: Arc<dyn IdentityProvider>,
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        store: DynStore,
        hasher: PasswordHasher,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            hasher,
            provider,
        }
    }

    pub async fn authenticate(&self, method: AuthMethod) -> AppResult<Identity> {
        match method {
            AuthMethod::Credentials {
                email,
                password,
                intent: CredentialIntent::SignIn,
            } => self.signin(&email, &password).await,
            AuthMethod::Credentials {
                email,
                password,
                intent: CredentialIntent::SignUp { name },
            } => self.signup(&email, &password, name.as_deref()).await,
            AuthMethod::Federated(assertion) => self.signin_federated(&assertion).await,
        }
    }

    /// Register a credential account
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> AppResult<Identity> {
        let email = parse_email(email)?;
        check_password(password)?;

        if self.store.user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_display_name(&email));
        let password_hash = self.hasher.hash(password.trim()).await?;

        // A concurrent signup that got there first surfaces as Conflict here
        let user = self
            .store
            .create_user(NewUser {
                email,
                name: Some(name),
                password_hash: Some(password_hash),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user.identity())
    }

    /// Check credentials of an existing account
    pub async fn signin(&self, email: &str, password: &str) -> AppResult<Identity> {
        let email = parse_email(email)?;
        check_password(password)?;

        let user = self.store.user_by_email(&email).await?;
        let Some((user, hash)) = user.and_then(|u| {
            let hash = u.password_hash.clone()?;
            Some((u, hash))
        }) else {
            tracing::info!("Sign-in for unknown or password-less account");
            return Err(AppError::AccountNotFound);
        };

        if !self.hasher.verify(password.trim(), &hash).await? {
            tracing::info!(user_id = %user.id, "Sign-in with incorrect password");
            return Err(AppError::Authentication("Incorrect password".to_string()));
        }

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user.identity())
    }

    /// Exchange a provider assertion for the local account with the same email,
    /// creating it on first use
    pub async fn signin_federated(&self, assertion: &ProviderAssertion) -> AppResult<Identity> {
        let verified = self.provider.verify(assertion).await?;
        let email = normalize_email(&verified.email);

        if let Some(user) = self.store.user_by_email(&email).await? {
            tracing::info!(user_id = %user.id, provider = %verified.provider, "Federated sign-in");
            return Ok(user.identity());
        }

        let created = self
            .store
            .create_user(NewUser {
                email: email.clone(),
                name: verified.name.clone(),
                password_hash: None,
            })
            .await;

        let user = match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, provider = %verified.provider, "Federated account created");
                user
            }
            // Lost a race against another first sign-in with the same email
            Err(AppError::Conflict(_)) => self
                .store
                .user_by_email(&email)
                .await?
                .ok_or_else(|| AppError::Internal("User vanished after conflict".to_string()))?,
            Err(e) => return Err(e),
        };

        Ok(user.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AuthConfig,
        repository::{MemoryRepository, Store},
        services::federated::{MockIdentityProvider, VerifiedIdentity},
    };

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&AuthConfig {
            hash_memory_kib: 8,
            hash_iterations: 1,
            hash_parallelism: 1,
            ..AuthConfig::default()
        })
        .unwrap()
    }

    fn service_with(store: DynStore, provider: MockIdentityProvider) -> AuthService {
        AuthService::new(store, hasher(), Arc::new(provider))
    }

    fn service() -> AuthService {
        service_with(Arc::new(MemoryRepository::new()), MockIdentityProvider::new())
    }

    fn google(token: &str) -> ProviderAssertion {
        ProviderAssertion {
            provider: "google".into(),
            token: token.into(),
        }
    }

    fn verified(email: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            provider: "google".into(),
            subject: "g-1".into(),
            email: email.into(),
            name: Some("Ann G".into()),
        }
    }

    #[tokio::test]
    async fn signup_then_signin_with_normalized_email() {
        let auth = service();
        let created = auth.signup("a@x.com", "secret1", Some("Ann")).await.unwrap();
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.name.as_deref(), Some("Ann"));

        let signed_in = auth.signin("A@X.com  ", "secret1").await.unwrap();
        assert_eq!(signed_in.id, created.id);
    }

    #[tokio::test]
    async fn second_signup_with_same_email_conflicts() {
        let auth = service();
        auth.signup("a@x.com", "secret1", None).await.unwrap();

        let err = auth.signup("  A@x.COM", "another1", None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let auth = service();
        assert!(matches!(
            auth.signup("nope", "secret1", None).await,
            Err(AppError::Validation(_))
        ));
        match auth.signup("a@x.com", "12345", None).await {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Password must be at least 6 characters long")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn surrounding_password_whitespace_is_ignored() {
        let auth = service();
        let created = auth.signup("a@x.com", "secret1 ", None).await.unwrap();

        let signed_in = auth.signin("a@x.com", "secret1").await.unwrap();
        assert_eq!(signed_in.id, created.id);
        let signed_in = auth.signin("a@x.com", "  secret1").await.unwrap();
        assert_eq!(signed_in.id, created.id);
    }

    #[tokio::test]
    async fn password_length_counts_untrimmed_characters() {
        let auth = service();
        // Five characters plus padding still meets the minimum
        auth.signup("a@x.com", "abcde ", None).await.unwrap();
        auth.signin("a@x.com", "abcde ").await.unwrap();
    }

    #[tokio::test]
    async fn signup_defaults_name_to_email_local_part() {
        let auth = service();
        let identity = auth.signup("ann@x.com", "secret1", Some("  ")).await.unwrap();
        assert_eq!(identity.name.as_deref(), Some("ann"));
    }

    #[tokio::test]
    async fn signin_with_wrong_password_fails() {
        let auth = service();
        auth.signup("a@x.com", "secret1", None).await.unwrap();

        let err = auth.signin("a@x.com", "secret2").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn signin_unknown_email_is_account_not_found() {
        let err = service().signin("who@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }

    #[tokio::test]
    async fn password_signin_to_federated_account_is_account_not_found() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .returning(|_| Ok(verified("ann@x.com")));
        let auth = service_with(Arc::new(MemoryRepository::new()), provider);

        auth.signin_federated(&google("t")).await.unwrap();
        let err = auth.signin("ann@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }

    #[tokio::test]
    async fn federated_signin_is_idempotent_and_links_by_email() {
        let store: DynStore = Arc::new(MemoryRepository::new());
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .times(2)
            .returning(|_| Ok(verified("Ann@X.com")));
        let auth = service_with(store.clone(), provider);

        let first = auth.signin_federated(&google("t1")).await.unwrap();
        let second = auth.signin_federated(&google("t2")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "ann@x.com");

        let stored = store.user_by_id(first.id).await.unwrap().unwrap();
        assert!(stored.password_hash.is_none());
    }

    #[tokio::test]
    async fn federated_signin_reuses_credential_account() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .returning(|_| Ok(verified("a@x.com")));
        let auth = service_with(Arc::new(MemoryRepository::new()), provider);

        let created = auth.signup("a@x.com", "secret1", Some("Ann")).await.unwrap();
        let federated = auth.signin_federated(&google("t")).await.unwrap();
        assert_eq!(created.id, federated.id);
    }

    #[tokio::test]
    async fn rejected_assertion_creates_nothing() {
        let store: DynStore = Arc::new(MemoryRepository::new());
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .returning(|_| Err(AppError::Provider("Token audience mismatch".into())));
        let auth = service_with(store.clone(), provider);

        assert!(auth.signin_federated(&google("t")).await.is_err());
        assert!(store.user_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_dispatches_on_method() {
        let auth = service();
        let signup = AuthMethod::Credentials {
            email: "a@x.com".into(),
            password: "secret1".into(),
            intent: CredentialIntent::SignUp {
                name: Some("Ann".into()),
            },
        };
        let signin = AuthMethod::Credentials {
            email: "a@x.com".into(),
            password: "secret1".into(),
            intent: CredentialIntent::SignIn,
        };

        let created = auth.authenticate(signup).await.unwrap();
        let signed_in = auth.authenticate(signin).await.unwrap();
        assert_eq!(created.id, signed_in.id);
    }
}
