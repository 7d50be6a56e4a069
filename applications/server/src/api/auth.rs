/// Authentication API routes
use crate::{
    error::{Result, ServerError},
    services::auth::TokenPair,
    state::AppState,
};
use axum::{extract::State, Json};
use otakuy_storage::users;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

fn invalid_login() -> ServerError {
    ServerError::Auth("Invalid username or password".to_string())
}

/// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let user = users::get_by_username(&app_state.pool, &req.username)
        .await?
        .ok_or_else(invalid_login)?;

    let password_hash = users::get_password_hash(&app_state.pool, &user.id)
        .await?
        .ok_or_else(invalid_login)?;

    if !app_state
        .auth_service
        .verify_password(&req.password, &password_hash)?
    {
        tracing::info!(username = %req.username, "Failed login");
        return Err(invalid_login());
    }

    Ok(Json(app_state.auth_service.issue_tokens(&user.id)?))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let user_id = app_state
        .auth_service
        .verify_refresh_token(&req.refresh_token)?;

    if users::get_by_id(&app_state.pool, &user_id).await?.is_none() {
        return Err(ServerError::Auth("Unknown user".to_string()));
    }

    Ok(Json(RefreshResponse {
        access_token: app_state.auth_service.create_access_token(&user_id)?,
        token_type: "Bearer",
    }))
}
