//! Authentication HTTP handlers
//!
//! Email/password registration and login. Both return the session token in
//! the body and set it as the `session` cookie.

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::{AuthenticatedUser, OptionalUser};
use crate::auth::AuthError;
use crate::error::ApiError;
use crate::middleware::{client_ip, ValidatedJson, SESSION_COOKIE};
use crate::models::{
    AuthResponse, ClientInfo, IssuedSession, LoginRequest, MessageResponse, RegisterRequest, User,
    UserResponse,
};
use crate::state::AppState;

fn client_info(headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        ip_address: client_ip(headers),
        user_agent: headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

async fn start_session(
    state: &AppState,
    jar: CookieJar,
    headers: &HeaderMap,
    user: User,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let IssuedSession {
        token, expires_at, ..
    } = state
        .auth_service
        .issue_session(&user, client_info(headers))
        .await?;

    let jar = jar.add(session_cookie(
        token.clone(),
        state.auth_service.secure_cookies(),
    ));

    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
            token_type: "Bearer".to_string(),
            expires_at,
        }),
    ))
}

/// POST /api/register - Create an account and open a session
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let user = state.auth_service.register(&req).await?;
    start_session(&state, jar, &headers, user).await
}

/// POST /api/login - Check credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let user = state.auth_service.login(&req).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, jar, &headers, user).await
}

/// POST /api/logout - Revoke the current session and clear the cookie.
/// Succeeds without a session so clients can always call it.
pub async fn logout(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(user) = user {
        match state.auth_service.revoke_session(&user.jti).await {
            Ok(()) | Err(AuthError::SessionNotFound) => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %user.user_id, "User logged out");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Déconnexion réussie".to_string(),
        }),
    ))
}

/// GET /api/user - Get current authenticated user
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;
    Ok(Json(user.into()))
}
