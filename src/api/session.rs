//! Session cookie transport and sliding refresh

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{config::AuthConfig, models::Identity, AppState};

/// Identity resolved from the session cookie, stored in request extensions
#[derive(Debug, Clone)]
pub struct Session(pub Option<Identity>);

/// HTTP-only cookie carrying a session token
pub fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::days(config.session_lifetime_days))
        .build()
}

/// Cookie value that makes the client drop its session
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), "")).path("/").build()
}

/// Validates the session cookie once per request and re-issues it when it is
/// due for a refresh. Responses that already set a cookie are left untouched.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(&state.config.auth.cookie_name)
        .and_then(|cookie| state.services.sessions.validate(cookie.value()));

    request
        .extensions_mut()
        .insert(Session(claims.as_ref().map(|c| c.identity())));

    let response = next.run(request).await;

    let Some(claims) = claims else {
        return response;
    };
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    match state.services.sessions.refresh(&claims) {
        Ok(Some(token)) => {
            tracing::debug!(user_id = %claims.sub, "Session refreshed");
            let jar = CookieJar::new().add(session_cookie(&state.config.auth, token));
            (jar, response).into_response()
        }
        Ok(None) => response,
        Err(e) => {
            tracing::error!("Session refresh failed: {}", e);
            response
        }
    }
}
