//! User endpoints.

use axum::{Json, Router, extract::State, routing::post};
use photogram_common::AppResult;
use photogram_core::FollowState;
use photogram_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Get the authenticated user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

/// Show user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    pub username: String,
}

/// Profile page response: the user plus the viewer's relationship to them.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub is_private: bool,
    pub follow_state: String,
    pub follower_count: u64,
    pub following_count: u64,
}

const fn follow_state_str(state: FollowState) -> &'static str {
    match state {
        FollowState::Own => "own",
        FollowState::Following => "following",
        FollowState::Requested => "requested",
        FollowState::NotFollowing => "not_following",
    }
}

/// Show a user by username with follow status.
async fn show(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<ShowResponse>> {
    let target = state.account_service.get_by_username(&req.username).await?;
    let status = state.follow_service.follow_status(&viewer.id, &target.id).await?;

    Ok(ApiResponse::ok(ShowResponse {
        user: target.into(),
        is_private: status.is_private,
        follow_state: follow_state_str(status.state).to_string(),
        follower_count: status.follower_count,
        following_count: status.following_count,
    }))
}

/// Suggested users request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedRequest {
    #[serde(default = "default_suggested_limit")]
    pub limit: u64,
}

const fn default_suggested_limit() -> u64 {
    5
}

/// Suggest accounts the user does not yet follow or have requested.
async fn suggested(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SuggestedRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let limit = req.limit.min(50);
    let users = state.follow_service.suggested_users(&user.id, limit).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Mutual followers request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualRequest {
    pub user_id: String,
}

/// Accounts followed by both the viewer and the named user.
async fn mutual_followers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MutualRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .follow_service
        .mutual_followers(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Set-private request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPrivateRequest {
    pub is_private: bool,
}

/// Toggle the authenticated user's account privacy.
async fn set_private(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetPrivateRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .account_service
        .set_private(&user.id, req.is_private)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", post(me))
        .route("/show", post(show))
        .route("/suggested", post(suggested))
        .route("/mutual-followers", post(mutual_followers))
        .route("/set-private", post(set_private))
}
