//! Notification fanout service.
//!
//! Every graph or engagement event emits exactly one notification row
//! unless a suppression rule applies. Self-actions never notify; a
//! re-like refreshes the existing row instead of duplicating it; unlike
//! and unfollow delete their notification outright.

use photogram_common::{AppError, AppResult, IdGenerator};
use photogram_db::{
    entities::notification::{self, NotificationType},
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;

/// Optional content references attached to a notification.
#[derive(Debug, Default, Clone)]
pub struct ContentRefs {
    /// Related post ID.
    pub post_id: Option<String>,
    /// Related comment ID.
    pub comment_id: Option<String>,
    /// Related story ID.
    pub story_id: Option<String>,
    /// Related direct message ID.
    pub message_id: Option<String>,
}

impl ContentRefs {
    fn post(post_id: &str) -> Self {
        Self {
            post_id: Some(post_id.to_string()),
            ..Self::default()
        }
    }

    fn story(story_id: &str) -> Self {
        Self {
            story_id: Some(story_id.to_string()),
            ..Self::default()
        }
    }
}

/// Maximum excerpt length for comment/reply texts in messages.
const EXCERPT_LEN: usize = 50;

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}

/// Notification service for fanout and read/seen state.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Internal helper to insert a notification row.
    async fn create_internal(
        &self,
        recipient_id: &str,
        sender_id: Option<&str>,
        notification_type: NotificationType,
        message: String,
        refs: ContentRefs,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            sender_id: Set(sender_id.map(std::string::ToString::to_string)),
            notification_type: Set(notification_type),
            message: Set(message),
            post_id: Set(refs.post_id),
            comment_id: Set(refs.comment_id),
            story_id: Set(refs.story_id),
            message_id: Set(refs.message_id),
            is_read: Set(false),
            is_seen: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    async fn sender_username(&self, sender_id: &str) -> AppResult<String> {
        Ok(self.user_repo.get_by_id(sender_id).await?.username)
    }

    /// Notify a post owner that their post was liked.
    ///
    /// Idempotent per (recipient, sender, post): a like after a prior
    /// like/unlike cycle refreshes the surviving row rather than
    /// inserting a second one.
    pub async fn notify_like(
        &self,
        post_owner_id: &str,
        liker_id: &str,
        post_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if post_owner_id == liker_id {
            return Ok(None);
        }

        if let Some(existing) = self
            .notification_repo
            .find_like(post_owner_id, liker_id, post_id)
            .await?
        {
            return Ok(Some(self.notification_repo.refresh(existing).await?));
        }

        let username = self.sender_username(liker_id).await?;
        let created = self
            .create_internal(
                post_owner_id,
                Some(liker_id),
                NotificationType::Like,
                format!("{username} liked your post."),
                ContentRefs::post(post_id),
            )
            .await?;
        Ok(Some(created))
    }

    /// Delete the like notification after an unlike.
    pub async fn remove_like_notification(
        &self,
        post_owner_id: &str,
        unliker_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        self.notification_repo
            .delete_like(post_owner_id, unliker_id, post_id)
            .await
    }

    /// Notify a post owner about a new comment.
    pub async fn notify_comment(
        &self,
        post_owner_id: &str,
        commenter_id: &str,
        post_id: &str,
        comment_id: &str,
        text: &str,
    ) -> AppResult<Option<notification::Model>> {
        if post_owner_id == commenter_id {
            return Ok(None);
        }

        let username = self.sender_username(commenter_id).await?;
        let refs = ContentRefs {
            post_id: Some(post_id.to_string()),
            comment_id: Some(comment_id.to_string()),
            ..ContentRefs::default()
        };
        let created = self
            .create_internal(
                post_owner_id,
                Some(commenter_id),
                NotificationType::Comment,
                format!("{username} commented: {}", excerpt(text)),
                refs,
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a comment author about a reply.
    pub async fn notify_comment_reply(
        &self,
        comment_owner_id: &str,
        replier_id: &str,
        post_id: &str,
        reply_id: &str,
        text: &str,
    ) -> AppResult<Option<notification::Model>> {
        if comment_owner_id == replier_id {
            return Ok(None);
        }

        let username = self.sender_username(replier_id).await?;
        let refs = ContentRefs {
            post_id: Some(post_id.to_string()),
            comment_id: Some(reply_id.to_string()),
            ..ContentRefs::default()
        };
        let created = self
            .create_internal(
                comment_owner_id,
                Some(replier_id),
                NotificationType::CommentReply,
                format!("{username} replied: {}", excerpt(text)),
                refs,
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a user they were mentioned in a post.
    pub async fn notify_mention(
        &self,
        mentioned_id: &str,
        mentioner_id: &str,
        post_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if mentioned_id == mentioner_id {
            return Ok(None);
        }

        let username = self.sender_username(mentioner_id).await?;
        let created = self
            .create_internal(
                mentioned_id,
                Some(mentioner_id),
                NotificationType::Mention,
                format!("{username} mentioned you in a post."),
                ContentRefs::post(post_id),
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a user they were tagged in a post.
    pub async fn notify_tag(
        &self,
        tagged_id: &str,
        post_owner_id: &str,
        post_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if tagged_id == post_owner_id {
            return Ok(None);
        }

        let username = self.sender_username(post_owner_id).await?;
        let created = self
            .create_internal(
                tagged_id,
                Some(post_owner_id),
                NotificationType::Tag,
                format!("{username} tagged you in a post."),
                ContentRefs::post(post_id),
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a user they gained a follower.
    pub async fn notify_follow(
        &self,
        followed_id: &str,
        follower_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if followed_id == follower_id {
            return Ok(None);
        }

        let username = self.sender_username(follower_id).await?;
        let created = self
            .create_internal(
                followed_id,
                Some(follower_id),
                NotificationType::Follow,
                format!("{username} started following you."),
                ContentRefs::default(),
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a private account about a follow request.
    pub async fn notify_follow_request(
        &self,
        target_id: &str,
        requester_id: &str,
    ) -> AppResult<notification::Model> {
        let username = self.sender_username(requester_id).await?;
        self.create_internal(
            target_id,
            Some(requester_id),
            NotificationType::FollowRequest,
            format!("{username} wants to follow you."),
            ContentRefs::default(),
        )
        .await
    }

    /// Notify a requester that their follow request was accepted.
    pub async fn notify_follow_accepted(
        &self,
        requester_id: &str,
        accepter_id: &str,
    ) -> AppResult<notification::Model> {
        let username = self.sender_username(accepter_id).await?;
        self.create_internal(
            requester_id,
            Some(accepter_id),
            NotificationType::FollowAccepted,
            format!("{username} accepted your follow request."),
            ContentRefs::default(),
        )
        .await
    }

    /// Delete the follow notification after an unfollow.
    pub async fn remove_follow_notification(
        &self,
        unfollowed_id: &str,
        unfollower_id: &str,
    ) -> AppResult<()> {
        self.notification_repo
            .delete_follow(unfollowed_id, unfollower_id)
            .await
    }

    /// Notify a user about a new direct message.
    pub async fn notify_message(
        &self,
        recipient_id: &str,
        sender_id: &str,
        message_id: &str,
    ) -> AppResult<notification::Model> {
        let username = self.sender_username(sender_id).await?;
        let refs = ContentRefs {
            message_id: Some(message_id.to_string()),
            ..ContentRefs::default()
        };
        self.create_internal(
            recipient_id,
            Some(sender_id),
            NotificationType::Message,
            format!("{username} sent you a message."),
            refs,
        )
        .await
    }

    /// Notify a story owner about a reply to their story.
    pub async fn notify_story_reply(
        &self,
        story_owner_id: &str,
        replier_id: &str,
        story_id: &str,
        text: &str,
    ) -> AppResult<Option<notification::Model>> {
        if story_owner_id == replier_id {
            return Ok(None);
        }

        let username = self.sender_username(replier_id).await?;
        let created = self
            .create_internal(
                story_owner_id,
                Some(replier_id),
                NotificationType::StoryReply,
                format!("{username} replied to your story: {}", excerpt(text)),
                ContentRefs::story(story_id),
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a user they were mentioned in a story.
    pub async fn notify_story_mention(
        &self,
        mentioned_id: &str,
        story_owner_id: &str,
        story_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if mentioned_id == story_owner_id {
            return Ok(None);
        }

        let username = self.sender_username(story_owner_id).await?;
        let created = self
            .create_internal(
                mentioned_id,
                Some(story_owner_id),
                NotificationType::StoryMention,
                format!("{username} mentioned you in their story."),
                ContentRefs::story(story_id),
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a story owner that their story was liked.
    pub async fn notify_story_like(
        &self,
        story_owner_id: &str,
        liker_id: &str,
        story_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if story_owner_id == liker_id {
            return Ok(None);
        }

        let username = self.sender_username(liker_id).await?;
        let created = self
            .create_internal(
                story_owner_id,
                Some(liker_id),
                NotificationType::StoryLike,
                format!("{username} liked your story."),
                ContentRefs::story(story_id),
            )
            .await?;
        Ok(Some(created))
    }

    /// Notify a follower that someone they follow went live.
    pub async fn notify_live_video(
        &self,
        follower_id: &str,
        broadcaster_id: &str,
    ) -> AppResult<notification::Model> {
        let username = self.sender_username(broadcaster_id).await?;
        self.create_internal(
            follower_id,
            Some(broadcaster_id),
            NotificationType::LiveVideo,
            format!("{username} started a live video. Watch now!"),
            ContentRefs::default(),
        )
        .await
    }

    /// Create a system notification (no sender).
    pub async fn notify_system(
        &self,
        recipient_id: &str,
        message: &str,
    ) -> AppResult<notification::Model> {
        self.create_internal(
            recipient_id,
            None,
            NotificationType::System,
            message.to_string(),
            ContentRefs::default(),
        )
        .await
    }

    /// Get notifications for a recipient (paginated).
    pub async fn list(
        &self,
        recipient_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(recipient_id, limit, until_id, unread_only)
            .await
    }

    /// Mark a single notification as read (and seen).
    ///
    /// Recipient-scoped: a notification owned by someone else is
    /// indistinguishable from a missing one.
    pub async fn mark_read(&self, recipient_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.find_by_id(notification_id).await?;
        match notification {
            Some(n) if n.recipient_id == recipient_id => {
                self.notification_repo.mark_read(notification_id).await
            }
            _ => Err(AppError::NotFound(format!(
                "Notification {notification_id} not found"
            ))),
        }
    }

    /// Mark all notifications as seen (clears the red-dot indicator).
    pub async fn mark_all_seen(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_seen(recipient_id).await
    }

    /// Mark all notifications as read and seen.
    pub async fn mark_all_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_read(recipient_id).await
    }

    /// Count unread notifications (badge count).
    pub async fn unread_count(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(recipient_id).await
    }

    /// Count unseen notifications (red-dot indicator).
    pub async fn unseen_count(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unseen(recipient_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use photogram_db::entities::user;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_sender(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            display_name: None,
            token: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn like_notification(id: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: "owner".to_string(),
            sender_id: Some("liker".to_string()),
            notification_type: NotificationType::Like,
            message: "liker liked your post.".to_string(),
            post_id: Some("post1".to_string()),
            comment_id: None,
            story_id: None,
            message_id: None,
            is_read,
            is_seen: false,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn empty_service() -> NotificationService {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        NotificationService::new(
            NotificationRepository::new(db1),
            UserRepository::new(db2),
        )
    }

    #[test]
    fn test_excerpt_truncates_to_fifty_chars() {
        let long = "a".repeat(80);
        assert_eq!(excerpt(&long).chars().count(), 50);
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn test_like_own_post_is_suppressed() {
        let service = empty_service();
        let result = service.notify_like("user1", "user1", "post1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_comment_on_own_post_is_suppressed() {
        let service = empty_service();
        let result = service
            .notify_comment("user1", "user1", "post1", "c1", "nice")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_self_follow_notification_is_suppressed() {
        let service = empty_service();
        let result = service.notify_follow("user1", "user1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_mark_read_foreign_notification_is_not_found() {
        let other = notification::Model {
            id: "n1".to_string(),
            recipient_id: "someone-else".to_string(),
            sender_id: Some("user2".to_string()),
            notification_type: NotificationType::Like,
            message: "liked your post.".to_string(),
            post_id: Some("post1".to_string()),
            comment_id: None,
            story_id: None,
            message_id: None,
            is_read: false,
            is_seen: false,
            created_at: chrono::Utc::now().into(),
        };

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[other]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service =
            NotificationService::new(NotificationRepository::new(db1), UserRepository::new(db2));

        let result = service.mark_read("user1", "n1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_like_after_unlike_inserts_fresh_row() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    // first like: find_like miss, INSERT .. RETURNING
                    Vec::<notification::Model>::new(),
                    vec![like_notification("n1", false)],
                    // like after the unlike deleted n1: miss again, fresh insert
                    Vec::<notification::Model>::new(),
                    vec![like_notification("n2", false)],
                ])
                // the unlike DELETE
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![test_sender("liker", "alice")],
                    vec![test_sender("liker", "alice")],
                ])
                .into_connection(),
        );
        let service =
            NotificationService::new(NotificationRepository::new(db1), UserRepository::new(db2));

        let first = service
            .notify_like("owner", "liker", "post1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.id, "n1");

        service
            .remove_like_notification("owner", "liker", "post1")
            .await
            .unwrap();

        let second = service
            .notify_like("owner", "liker", "post1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.id, "n2");
        assert!(!second.is_read);
    }

    #[tokio::test]
    async fn test_relike_refreshes_existing_row() {
        let existing = notification::Model {
            id: "n1".to_string(),
            recipient_id: "owner".to_string(),
            sender_id: Some("liker".to_string()),
            notification_type: NotificationType::Like,
            message: "liker liked your post.".to_string(),
            post_id: Some("post1".to_string()),
            comment_id: None,
            story_id: None,
            message_id: None,
            is_read: true,
            is_seen: true,
            created_at: chrono::Utc::now().into(),
        };
        let mut refreshed = existing.clone();
        refreshed.is_read = false;

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // find_like hit, then the UPDATE .. RETURNING row
                .append_query_results([vec![existing], vec![refreshed]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service =
            NotificationService::new(NotificationRepository::new(db1), UserRepository::new(db2));

        let result = service
            .notify_like("owner", "liker", "post1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.id, "n1");
        assert!(!result.is_read);
    }
}
