//! Authenticated read endpoints over the forecast store and performance
//! ledger, plus login. Thin plumbing: ownership is checked here, all real
//! work happens in the sync pipeline.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::error::ApiError,
    auth::{self, AuthUser},
    domain::{ForecastPoint, PerformanceRecord, Plant, User},
    sync::AppState,
};

/// Number of performance records returned per plant.
const PERFORMANCE_HISTORY_LIMIT: i64 = 30;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/plants", get(list_plants))
        .route("/forecast/:plant_name", get(get_forecast))
        .route("/performance/:plant_name", get(get_performance))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

pub async fn login(
    State(st): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = st
        .repos
        .users()
        .find_by_username(&req.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let access_token = auth::issue_token(
        &user.username,
        &st.cfg.auth.jwt_secret,
        st.cfg.auth.token_ttl_minutes,
    )?;
    Ok(Json(LoginResponse { access_token }))
}

pub async fn list_plants(
    State(st): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Plant>>, ApiError> {
    let user = current_user(&st, &user).await?;
    let plants = st.repos.plants().list_for_user(user.id).await?;
    Ok(Json(plants))
}

pub async fn get_forecast(
    State(st): State<AppState>,
    user: AuthUser,
    Path(plant_name): Path<String>,
) -> Result<Json<Vec<ForecastPoint>>, ApiError> {
    let plant = owned_plant(&st, &user, &plant_name).await?;
    let points = st.repos.forecasts().list_for_plant(plant.id).await?;
    Ok(Json(points))
}

pub async fn get_performance(
    State(st): State<AppState>,
    user: AuthUser,
    Path(plant_name): Path<String>,
) -> Result<Json<Vec<PerformanceRecord>>, ApiError> {
    let plant = owned_plant(&st, &user, &plant_name).await?;
    let records = st
        .repos
        .performance()
        .recent(plant.id, PERFORMANCE_HISTORY_LIMIT)
        .await?;
    Ok(Json(records))
}

async fn current_user(st: &AppState, auth: &AuthUser) -> Result<User, ApiError> {
    st.repos
        .users()
        .find_by_username(&auth.username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Resolve a plant by name, scoped to the caller. An existing plant owned
/// by someone else is indistinguishable from a missing one.
async fn owned_plant(st: &AppState, auth: &AuthUser, name: &str) -> Result<Plant, ApiError> {
    let user = current_user(st, auth).await?;
    st.repos
        .plants()
        .find_for_user(user.id, name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plant not found".to_string()))
}
