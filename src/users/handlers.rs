use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};
use tracing::instrument;

use crate::auth::extractors::{AuthClaims, SESSION_COOKIE};
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::users::dto::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest};
use crate::users::repo::User;
use crate::users::service;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/settings", put(update_settings))
        .route("/me", get(me))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    service::create_user(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user has been created" })),
    ))
}

#[instrument(skip(state, jar, payload))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let response = service::login(&state, payload).await?;

    let cookie = Cookie::build((SESSION_COOKIE, response.token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::hours(state.config.jwt.ttl_hours))
        .build();
    Ok((jar.add(cookie), Json(response)))
}

#[instrument(skip(state, claims))]
async fn me(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<User>, ApiError> {
    Ok(Json(service::get_user(&state, claims.sub).await?))
}

#[instrument(skip(state, claims, payload))]
async fn update_settings(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    // The target account is always the authenticated caller.
    let user = service::update_user(&state, claims.sub, payload).await?;
    Ok(Json(user))
}
