//! Notifications endpoints.

use axum::{Json, Router, extract::State, routing::post};
use photogram_common::AppResult;
use photogram_db::entities::notification::{Model as NotificationModel, NotificationType};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    /// Maximum results (default: 10, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Cursor for pagination (before this ID)
    pub until_id: Option<String>,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
    /// Include unread count in response metadata
    #[serde(default)]
    pub with_unread_count: bool,
}

const fn default_limit() -> u64 {
    10
}

/// Notifications response with optional metadata.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsListResponse {
    pub notifications: Vec<NotificationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<u64>,
}

/// Notification response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub created_at: String,
    pub is_read: bool,
    pub is_seen: bool,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(n: NotificationModel) -> Self {
        Self {
            id: n.id,
            created_at: n.created_at.to_rfc3339(),
            is_read: n.is_read,
            is_seen: n.is_seen,
            notification_type: notification_type_to_string(&n.notification_type),
            message: n.message,
            sender_id: n.sender_id,
            post_id: n.post_id,
            comment_id: n.comment_id,
            story_id: n.story_id,
            message_id: n.message_id,
        }
    }
}

fn notification_type_to_string(t: &NotificationType) -> String {
    match t {
        NotificationType::Like => "like".to_string(),
        NotificationType::Comment => "comment".to_string(),
        NotificationType::CommentReply => "commentReply".to_string(),
        NotificationType::Mention => "mention".to_string(),
        NotificationType::Tag => "tag".to_string(),
        NotificationType::Follow => "follow".to_string(),
        NotificationType::FollowRequest => "followRequest".to_string(),
        NotificationType::FollowAccepted => "followAccepted".to_string(),
        NotificationType::Message => "message".to_string(),
        NotificationType::StoryReply => "storyReply".to_string(),
        NotificationType::StoryMention => "storyMention".to_string(),
        NotificationType::StoryLike => "storyLike".to_string(),
        NotificationType::LiveVideo => "liveVideo".to_string(),
        NotificationType::System => "system".to_string(),
    }
}

/// Get notifications for the authenticated user.
///
/// Listing marks everything seen, so the red-dot indicator clears on
/// the next badge poll while unread counts stay intact.
async fn get_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<NotificationsListResponse>> {
    let limit = req.limit.min(100);

    let notifications = state
        .notification_service
        .list(&user.id, limit, req.until_id.as_deref(), req.unread_only)
        .await?;

    state.notification_service.mark_all_seen(&user.id).await?;

    let unread_count = if req.with_unread_count {
        Some(state.notification_service.unread_count(&user.id).await?)
    } else {
        None
    };

    Ok(ApiResponse::ok(NotificationsListResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
        unread_count,
    }))
}

/// Mark-as-read request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadRequest {
    pub notification_id: String,
}

/// Mark a single notification as read (and seen).
async fn mark_as_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MarkAsReadRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .mark_read(&user.id, &req.notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Bulk update response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    pub count: u64,
}

/// Mark all notifications as seen (red-dot indicator only).
async fn mark_all_as_seen(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BulkUpdateResponse>> {
    let count = state.notification_service.mark_all_seen(&user.id).await?;
    Ok(ApiResponse::ok(BulkUpdateResponse { count }))
}

/// Mark all notifications as read and seen.
async fn mark_all_as_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BulkUpdateResponse>> {
    let count = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(BulkUpdateResponse { count }))
}

/// Badge counts response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub count: u64,
}

/// Count unread notifications (badge count).
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.notification_service.unread_count(&user.id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

/// Count unseen notifications (red-dot indicator).
async fn unseen_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.notification_service.unseen_count(&user.id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(get_notifications))
        .route("/mark-as-read", post(mark_as_read))
        .route("/mark-all-as-seen", post(mark_all_as_seen))
        .route("/mark-all-as-read", post(mark_all_as_read))
        .route("/unread-count", post(unread_count))
        .route("/unseen-count", post(unseen_count))
}
