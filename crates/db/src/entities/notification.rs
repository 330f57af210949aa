//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum NotificationType {
    // Engagement
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "comment_reply")]
    CommentReply,
    #[sea_orm(string_value = "mention")]
    Mention,
    #[sea_orm(string_value = "tag")]
    Tag,

    // Social
    #[sea_orm(string_value = "follow")]
    Follow,
    #[sea_orm(string_value = "follow_request")]
    FollowRequest,
    #[sea_orm(string_value = "follow_accepted")]
    FollowAccepted,

    // Messages
    #[sea_orm(string_value = "message")]
    Message,

    // Stories
    #[sea_orm(string_value = "story_reply")]
    StoryReply,
    #[sea_orm(string_value = "story_mention")]
    StoryMention,
    #[sea_orm(string_value = "story_like")]
    StoryLike,

    // Video
    #[sea_orm(string_value = "live_video")]
    LiveVideo,

    // System (no sender)
    #[sea_orm(string_value = "system")]
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub recipient_id: String,

    /// The user who triggered the notification (None for system notifications)
    #[sea_orm(nullable)]
    pub sender_id: Option<String>,

    pub notification_type: NotificationType,

    /// Human-readable message text
    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Related content references (informational, not enforced foreign keys)
    #[sea_orm(nullable)]
    pub post_id: Option<String>,

    #[sea_orm(nullable)]
    pub comment_id: Option<String>,

    #[sea_orm(nullable)]
    pub story_id: Option<String>,

    #[sea_orm(nullable)]
    pub message_id: Option<String>,

    /// Consumed: the recipient opened the notification
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    /// Rendered once in the notification list (red-dot indicator).
    /// Independent of `is_read`, not a state machine.
    #[sea_orm(default_value = false)]
    pub is_seen: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,
}

impl ActiveModelBehavior for ActiveModel {}
