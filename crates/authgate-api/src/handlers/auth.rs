//! Auth handlers: register, login, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use authgate_core::error::AppError;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{JsonBody, Session};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let credential = state.auth.register(&req.username, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&credential))),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let mut handle = session.lock().await;
    let user = state
        .auth
        .login(&req.username, &req.password, &mut handle)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        message: format!("Welcome, {}!", user.username),
        user: user.into(),
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let mut handle = session.lock().await;
    state.auth.logout(&mut handle).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "logged out".to_string(),
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let handle = session.lock().await;
    let user = state
        .auth
        .current_user(&handle)?
        .ok_or_else(|| AppError::unauthenticated("Not logged in"))?;

    Ok(Json(ApiResponse::ok(user.into())))
}
