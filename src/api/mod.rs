//! API handlers for Bookshelf REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod openapi;
pub mod session;

use std::{convert::Infallible, time::Duration};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    middleware,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{error::AppError, models::Identity, AppState};

use self::session::Session;

/// Identity of the caller when the session cookie is valid
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        // Resolved once per request by `session::session_layer`
        let identity = parts
            .extensions
            .get::<Session>()
            .and_then(|Session(identity)| identity.clone());
        Ok(MaybeUser(identity))
    }
}

/// Extractor for a signed-in caller; rejects with 401 otherwise
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeUser(identity) = match MaybeUser::from_request_parts(parts, state).await {
            Ok(user) => user,
            Err(never) => match never {},
        };
        identity.map(AuthenticatedUser).ok_or(AppError::Unauthenticated)
    }
}

/// Generic acknowledgement body
#[derive(Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth", post(auth::authenticate))
        .route("/auth/google", post(auth::google_signin))
        .route("/auth/signout", post(auth::signout))
        .route("/auth/session", get(auth::current_session))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", delete(books::delete_book))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_layer,
        ))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
