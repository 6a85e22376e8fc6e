//! Registration and login. Both issue a bearer token on success.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth;
use crate::models::{Role, User, UserView};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

fn issue_session(ctx: &ApiContext, user: &User) -> Result<AuthResponse, ApiError> {
    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))?;
        sessions.issue(user)
    };
    Ok(AuthResponse {
        token,
        user: UserView::from(user),
    })
}

pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = {
        let conn = ctx.lock_db()?;
        auth::register_user(&conn, &req.name, &req.email, &req.password, req.role)?
    };
    let response = issue_session(&ctx, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = {
        let conn = ctx.lock_db()?;
        auth::authenticate(&conn, &req.email, &req.password)?
    };
    // Unknown email and wrong password produce the same response.
    let user = user.ok_or(ApiError::Unauthorized)?;
    let response = issue_session(&ctx, &user)?;
    Ok(Json(response))
}
