// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-up and session routes.
//!
//! Credentials are checked by the identity provider. On success the user's
//! profile is created if needed and a session JWT is set as a cookie.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    authenticate, create_jwt, HINT_COOKIE, SESSION_COOKIE, SESSION_DAYS,
};
use crate::models::{Identity, UserProfile};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .route("/auth/google", post(sign_in_with_google))
        .route("/auth/signout", post(sign_out))
        .route("/auth/session", get(session))
}

#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    /// Google ID token obtained by the browser.
    pub id_token: String,
}

/// Response to a successful sign-in or sign-up.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    /// Session JWT, also set as an HttpOnly cookie.
    pub token: String,
    pub profile: UserProfile,
}

/// Whether the caller holds a valid session.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionState {
    SignedIn { uid: String, email: Option<String> },
    SignedOut,
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<Credentials>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let identity = state
        .identity
        .sign_in_with_password(&req.email, &req.password)
        .await?;
    start_session(&state, jar, identity).await
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let identity = state
        .identity
        .sign_up(&req.email, &req.password, display_name)
        .await?;
    start_session(&state, jar, identity).await
}

async fn sign_in_with_google(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<GoogleSignInRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    if req.id_token.trim().is_empty() {
        return Err(AppError::BadRequest("idToken is required".to_string()));
    }

    let identity = state.identity.sign_in_with_google(&req.id_token).await?;
    start_session(&state, jar, identity).await
}

/// Make sure the profile exists, then issue the session cookies.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    identity: Identity,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let profile = state.profiles.ensure_profile(&identity).await?;

    let token = create_jwt(
        &identity.uid,
        identity.email.as_deref(),
        &state.config.jwt_signing_key,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(uid = %identity.uid, "User signed in");

    let secure = state.config.secure_cookies();
    let jar = jar
        .add(session_cookie(token.clone(), secure))
        .add(hint_cookie(secure));

    Ok((jar, Json(AuthResponse { token, profile })))
}

/// Sign out by expiring the session cookies.
async fn sign_out(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let secure = state.config.secure_cookies();
    let jar = jar
        .add(removal(session_cookie(String::new(), secure)))
        .add(removal(hint_cookie(secure)));
    (jar, StatusCode::NO_CONTENT)
}

async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Json<SessionState> {
    let session = authenticate(&jar, &headers, &state.config.jwt_signing_key).ok();

    Json(match session {
        Some(user) => SessionState::SignedIn {
            uid: user.uid,
            email: user.email,
        },
        None => SessionState::SignedOut,
    })
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

fn hint_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((HINT_COOKIE, "1"))
        .path("/")
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

/// Same attributes, empty value, already expired.
fn removal(mut cookie: Cookie<'static>) -> Cookie<'static> {
    cookie.make_removal();
    cookie
}
