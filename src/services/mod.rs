//! Business logic services

pub mod auth;
pub mod books;
pub mod federated;
pub mod password;
pub mod session;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::DynStore};

use federated::IdentityProvider;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub sessions: session::SessionIssuer,
    pub books: books::BookService,
    pub store: DynStore,
}

impl Services {
    /// Create all services on top of the given store and identity provider
    pub fn new(
        store: DynStore,
        provider: Arc<dyn IdentityProvider>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        let hasher = password::PasswordHasher::new(&config.auth)?;
        Ok(Self {
            auth: auth::AuthService::new(store.clone(), hasher, provider),
            sessions: session::SessionIssuer::new(&config.auth),
            books: books::BookService::new(store.clone()),
            store,
        })
    }
}
