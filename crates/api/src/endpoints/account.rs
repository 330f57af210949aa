//! Account registration endpoint.

use axum::{Json, Router, extract::State, routing::post};
use photogram_common::AppResult;
use photogram_core::RegisterInput;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Registration response. The token is shown exactly once.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub token: Option<String>,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state.account_service.register(input).await?;
    Ok(ApiResponse::ok(RegisterResponse {
        id: user.id,
        username: user.username,
        token: user.token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}
