//! Follow graph and follow request endpoints.

use axum::{Json, Router, extract::State, routing::post};
use photogram_common::{AppError, AppResult};
use photogram_core::SendOutcome;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow result response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub status: String,
}

/// Follow a user, or request to follow if the target is private.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let outcome = state.follow_service.send_request(&user.id, &req.user_id).await?;

    let status = match outcome {
        SendOutcome::Following => "following",
        SendOutcome::Requested => "requested",
        SendOutcome::AlreadyRequested => "already_requested",
    };

    Ok(ApiResponse::ok(FollowResponse {
        status: status.to_string(),
    }))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.unfollow(&user.id, &req.user_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Request body naming a follow request by ID.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdBody {
    pub request_id: String,
}

/// Accept a follow request addressed to the authenticated user.
async fn accept(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RequestIdBody>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .accept_request(&req.request_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Decline a follow request addressed to the authenticated user.
async fn decline(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RequestIdBody>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .decline_request(&req.request_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Withdraw one's own pending follow request.
async fn cancel(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .cancel_request(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Pending follow request item.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequestItemResponse {
    pub id: String,
    pub created_at: String,
    pub from_user_id: String,
    pub to_user_id: String,
}

impl From<photogram_db::entities::follow_request::Model> for FollowRequestItemResponse {
    fn from(r: photogram_db::entities::follow_request::Model) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at.to_rfc3339(),
            from_user_id: r.from_user_id,
            to_user_id: r.to_user_id,
        }
    }
}

/// List pending request params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingListRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// List received follow requests (pending).
async fn list_pending(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PendingListRequest>,
) -> AppResult<ApiResponse<Vec<FollowRequestItemResponse>>> {
    let limit = req.limit.min(100);
    let requests = state
        .follow_service
        .pending_requests(&user.id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Pending request count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountResponse {
    pub count: u64,
}

/// Count received pending follow requests.
async fn pending_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PendingCountResponse>> {
    let count = state.follow_service.pending_request_count(&user.id).await?;
    Ok(ApiResponse::ok(PendingCountResponse { count }))
}

/// List followers/following request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    10
}

/// Follow edge item response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdgeResponse {
    pub id: String,
    pub created_at: String,
    pub follower_id: String,
    pub following_id: String,
}

impl From<photogram_db::entities::follow_edge::Model> for FollowEdgeResponse {
    fn from(e: photogram_db::entities::follow_edge::Model) -> Self {
        Self {
            id: e.id,
            created_at: e.created_at.to_rfc3339(),
            follower_id: e.follower_id,
            following_id: e.following_id,
        }
    }
}

/// Get followers of a user. Private accounts are gated by visibility.
async fn followers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Vec<FollowEdgeResponse>>> {
    if !state.visibility_service.can_view(&user.id, &req.user_id).await? {
        return Err(AppError::Forbidden("This account is private".to_string()));
    }

    let limit = req.limit.min(100);
    let followers = state
        .follow_service
        .get_followers(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        followers.into_iter().map(Into::into).collect(),
    ))
}

/// Get users that a user is following. Private accounts are gated by visibility.
async fn following(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Vec<FollowEdgeResponse>>> {
    if !state.visibility_service.can_view(&user.id, &req.user_id).await? {
        return Err(AppError::Forbidden("This account is private".to_string()));
    }

    let limit = req.limit.min(100);
    let following = state
        .follow_service
        .get_following(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        following.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(follow))
        .route("/delete", post(unfollow))
        .route("/requests/accept", post(accept))
        .route("/requests/decline", post(decline))
        .route("/requests/cancel", post(cancel))
        .route("/requests/list", post(list_pending))
        .route("/requests/count", post(pending_count))
        .route("/followers", post(followers))
        .route("/following", post(following))
}
