//! Authentication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Identity,
    services::{
        auth::{AuthMethod, CredentialIntent},
        federated::ProviderAssertion,
    },
    AppState,
};

use super::{
    session::{removal_cookie, session_cookie},
    MaybeUser, OkResponse,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    #[default]
    Signin,
    Signup,
}

/// Credential sign-in / sign-up request
#[derive(Deserialize, ToSchema)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub action: AuthAction,
    /// Display name, used on signup only
    pub name: Option<String>,
}

impl From<AuthRequest> for AuthMethod {
    fn from(request: AuthRequest) -> Self {
        let intent = match request.action {
            AuthAction::Signin => CredentialIntent::SignIn,
            AuthAction::Signup => CredentialIntent::SignUp { name: request.name },
        };
        AuthMethod::Credentials {
            email: request.email,
            password: request.password,
            intent,
        }
    }
}

/// Google sign-in request
#[derive(Deserialize, ToSchema)]
pub struct GoogleSigninRequest {
    pub id_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub ok: bool,
    pub user: Identity,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: Option<Identity>,
}

/// Run an authentication method and attach a fresh session cookie
async fn sign_in(
    state: &AppState,
    jar: CookieJar,
    method: AuthMethod,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let identity = state.services.auth.authenticate(method).await?;
    let token = state.services.sessions.issue(&identity)?;
    let jar = jar.add(session_cookie(&state.config.auth, token));

    Ok((
        jar,
        Json(AuthResponse {
            ok: true,
            user: identity,
        }),
    ))
}

/// Sign in or sign up with email and password
#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication failed", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(request) =
        payload.map_err(|_| AppError::Validation("Invalid input data".to_string()))?;
    sign_in(&state, jar, request.into()).await
}

/// Sign in with a Google ID token
#[utoipa::path(
    post,
    path = "/auth/google",
    tag = "auth",
    request_body = GoogleSigninRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 401, description = "Token rejected", body = crate::error::ErrorResponse)
    )
)]
pub async fn google_signin(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<GoogleSigninRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(request) =
        payload.map_err(|_| AppError::Validation("Invalid input data".to_string()))?;
    let assertion = ProviderAssertion {
        provider: "google".to_string(),
        token: request.id_token,
    };
    sign_in(&state, jar, AuthMethod::Federated(assertion)).await
}

/// Drop the session cookie
#[utoipa::path(
    post,
    path = "/auth/signout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = OkResponse)
    )
)]
pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<OkResponse>) {
    (
        jar.remove(removal_cookie(&state.config.auth)),
        Json(OkResponse::ok()),
    )
}

/// Current session, if any
#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "auth",
    responses(
        (status = 200, description = "Current identity or null", body = SessionResponse)
    )
)]
pub async fn current_session(MaybeUser(user): MaybeUser) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}
