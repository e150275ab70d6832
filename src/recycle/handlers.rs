use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::{AdminClaims, AuthClaims};
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::recycle::dto::{CreateBoxRequest, UpdateBoxRequest};
use crate::recycle::repo::RecycleBox;
use crate::recycle::service;
use crate::state::AppState;

pub fn box_routes() -> Router<AppState> {
    Router::new()
        .route("/recyclebox", post(create_box))
        .route("/recyclebox/:id", get(get_box).put(update_box))
        .route("/recyclebox/add-bottle/:id", post(add_bottle))
        .route("/recyclebox/add-bottle-points/:id", post(add_bottle_with_points))
        .route("/recyclebox/flush/:id", post(flush_box))
}

#[instrument(skip(state, _admin, payload))]
async fn create_box(
    State(state): State<AppState>,
    _admin: AdminClaims,
    AppJson(payload): AppJson<CreateBoxRequest>,
) -> Result<(StatusCode, Json<RecycleBox>), ApiError> {
    let created = service::create_box(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, _claims))]
async fn get_box(
    State(state): State<AppState>,
    _claims: AuthClaims,
    Path(id): Path<i64>,
) -> Result<Json<RecycleBox>, ApiError> {
    Ok(Json(service::get_box(&state, id).await?))
}

#[instrument(skip(state, _claims, payload))]
async fn update_box(
    State(state): State<AppState>,
    _claims: AuthClaims,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateBoxRequest>,
) -> Result<Json<RecycleBox>, ApiError> {
    Ok(Json(service::update_box(&state, id, payload).await?))
}

#[instrument(skip(state, _claims))]
async fn add_bottle(
    State(state): State<AppState>,
    _claims: AuthClaims,
    Path(id): Path<i64>,
) -> Result<Json<RecycleBox>, ApiError> {
    Ok(Json(service::add_bottle(&state, id).await?))
}

#[instrument(skip(state, claims))]
async fn add_bottle_with_points(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<i64>,
) -> Result<Json<RecycleBox>, ApiError> {
    // The reward goes to whoever presented the session token.
    let updated = service::add_bottle_with_points(&state, id, claims.sub).await?;
    Ok(Json(updated))
}

#[instrument(skip(state, _admin))]
async fn flush_box(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<i64>,
) -> Result<Json<RecycleBox>, ApiError> {
    Ok(Json(service::flush_box(&state, id).await?))
}
