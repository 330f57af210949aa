//! Follow workflow service.
//!
//! Owns the follow-request state machine and the follow-edge graph.
//! Edges are only ever written through request acceptance or the
//! public-account auto-accept path; unfollow is the only deletion.

use crate::services::notification::NotificationService;
use photogram_common::{AppError, AppResult, IdGenerator};
use photogram_db::{
    entities::{follow_edge, follow_request, follow_request::RequestStatus, user},
    repositories::{
        FollowEdgeRepository, FollowRequestRepository, UserProfileRepository, UserRepository,
    },
};
use sea_orm::Set;

/// Outcome of sending a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Target is public: the request was auto-accepted and the edge exists.
    Following,
    /// Target is private: the request is pending approval.
    Requested,
    /// A pending request already existed; nothing changed.
    AlreadyRequested,
}

/// Relationship of a viewer to a target account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    /// The viewer is the target.
    Own,
    /// A live edge viewer -> target exists.
    Following,
    /// A pending follow request exists.
    Requested,
    /// No relationship.
    NotFollowing,
}

/// Follow status summary for profile rendering.
#[derive(Debug, Clone)]
pub struct FollowStatus {
    /// Relationship state.
    pub state: FollowState,
    /// Whether the target account is private.
    pub is_private: bool,
    /// Follower count of the target, computed at call time.
    pub follower_count: u64,
    /// Following count of the target, computed at call time.
    pub following_count: u64,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    edge_repo: FollowEdgeRepository,
    request_repo: FollowRequestRepository,
    profile_repo: UserProfileRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        edge_repo: FollowEdgeRepository,
        request_repo: FollowRequestRepository,
        profile_repo: UserProfileRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            edge_repo,
            request_repo,
            profile_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a follow request from `requester_id` to `target_id`.
    ///
    /// Public targets are auto-accepted: the request transitions to
    /// accepted and the edge is created in the same operation. A
    /// declined request for the pair is reopened in place, so the
    /// (requester, target) row count never exceeds one.
    pub async fn send_request(
        &self,
        requester_id: &str,
        target_id: &str,
    ) -> AppResult<SendOutcome> {
        if requester_id == target_id {
            return Err(AppError::InvalidOperation(
                "Cannot follow yourself".to_string(),
            ));
        }

        if self.edge_repo.is_following(requester_id, target_id).await? {
            return Err(AppError::AlreadyExists(
                "Already following this user".to_string(),
            ));
        }

        let request = match self.request_repo.find_by_pair(requester_id, target_id).await? {
            Some(r) if r.status == RequestStatus::Pending => {
                // Informational, not a failure: the caller sees the
                // pending request still stands.
                return Ok(SendOutcome::AlreadyRequested);
            }
            // Declined (or stale accepted, see unfollow) rows reopen in place
            Some(r) => self.request_repo.set_status(r, RequestStatus::Pending).await?,
            None => {
                let result = self
                    .request_repo
                    .create(follow_request::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        from_user_id: Set(requester_id.to_string()),
                        to_user_id: Set(target_id.to_string()),
                        status: Set(RequestStatus::Pending),
                        created_at: Set(chrono::Utc::now().into()),
                        updated_at: Set(None),
                    })
                    .await;
                match result {
                    Ok(request) => request,
                    // Lost a race with an identical concurrent request;
                    // the winner's row is already pending.
                    Err(AppError::AlreadyExists(_)) => {
                        return Ok(SendOutcome::AlreadyRequested);
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let target_profile = self.profile_repo.get_by_user_id(target_id).await?;

        if target_profile.is_private {
            self.notifications
                .notify_follow_request(target_id, requester_id)
                .await?;
            tracing::debug!(requester_id, target_id, "Follow request pending");
            return Ok(SendOutcome::Requested);
        }

        // Auto-accept for public accounts
        self.request_repo
            .set_status(request, RequestStatus::Accepted)
            .await?;
        self.create_edge(requester_id, target_id).await?;
        self.notifications
            .notify_follow(target_id, requester_id)
            .await?;

        tracing::debug!(requester_id, target_id, "Follow auto-accepted");
        Ok(SendOutcome::Following)
    }

    /// Accept a pending follow request.
    ///
    /// Only the request's target may accept, and only while pending;
    /// anything else is indistinguishable from a missing request.
    pub async fn accept_request(&self, request_id: &str, acting_user_id: &str) -> AppResult<()> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .filter(|r| r.to_user_id == acting_user_id && r.status == RequestStatus::Pending)
            .ok_or_else(|| AppError::NotFound("Follow request not found".to_string()))?;

        let requester_id = request.from_user_id.clone();

        self.request_repo
            .set_status(request, RequestStatus::Accepted)
            .await?;
        self.create_edge(&requester_id, acting_user_id).await?;
        self.notifications
            .notify_follow_accepted(&requester_id, acting_user_id)
            .await?;

        tracing::debug!(requester_id, acting_user_id, "Follow request accepted");
        Ok(())
    }

    /// Decline a pending follow request. No edge, no notification.
    pub async fn decline_request(&self, request_id: &str, acting_user_id: &str) -> AppResult<()> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .filter(|r| r.to_user_id == acting_user_id && r.status == RequestStatus::Pending)
            .ok_or_else(|| AppError::NotFound("Follow request not found".to_string()))?;

        self.request_repo
            .set_status(request, RequestStatus::Declined)
            .await?;
        Ok(())
    }

    /// Withdraw one's own pending follow request.
    pub async fn cancel_request(&self, requester_id: &str, target_id: &str) -> AppResult<()> {
        let request = self
            .request_repo
            .find_by_pair(requester_id, target_id)
            .await?
            .filter(|r| r.status == RequestStatus::Pending)
            .ok_or_else(|| AppError::NotFound("Follow request not found".to_string()))?;

        self.request_repo.delete(&request.id).await
    }

    /// Unfollow: remove the edge (no-op if absent), drop the stale
    /// accepted request so a later resend starts fresh, and delete the
    /// follow notification that was fanned out.
    pub async fn unfollow(&self, follower_id: &str, target_id: &str) -> AppResult<()> {
        self.edge_repo.delete_by_pair(follower_id, target_id).await?;
        self.request_repo
            .delete_accepted_by_pair(follower_id, target_id)
            .await?;
        self.notifications
            .remove_follow_notification(target_id, follower_id)
            .await?;

        tracing::debug!(follower_id, target_id, "Unfollowed");
        Ok(())
    }

    /// Create an edge idempotently. Fails only on self-edges.
    pub async fn create_edge(&self, follower_id: &str, following_id: &str) -> AppResult<()> {
        if follower_id == following_id {
            return Err(AppError::InvalidOperation(
                "Cannot create a self-edge".to_string(),
            ));
        }

        self.edge_repo
            .create(follow_edge::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(follower_id.to_string()),
                following_id: Set(following_id.to_string()),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        self.edge_repo.is_following(follower_id, following_id).await
    }

    /// Follower count, computed at call time.
    pub async fn follower_count(&self, user_id: &str) -> AppResult<u64> {
        self.edge_repo.count_followers(user_id).await
    }

    /// Following count, computed at call time.
    pub async fn following_count(&self, user_id: &str) -> AppResult<u64> {
        self.edge_repo.count_following(user_id).await
    }

    /// Accounts followed by both `a` and `b`.
    pub async fn mutual_followers(&self, a: &str, b: &str) -> AppResult<Vec<user::Model>> {
        let ids = self.edge_repo.find_mutual_following_ids(a, b).await?;
        self.user_repo.find_by_ids(&ids).await
    }

    /// Get followers of a user (paginated).
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        self.edge_repo.find_followers(user_id, limit, until_id).await
    }

    /// Get users a user is following (paginated).
    pub async fn get_following(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        self.edge_repo.find_following(user_id, limit, until_id).await
    }

    /// Get pending follow requests received by a user (paginated).
    pub async fn pending_requests(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        self.request_repo
            .find_pending_received(user_id, limit, until_id)
            .await
    }

    /// Count pending follow requests received by a user.
    pub async fn pending_request_count(&self, user_id: &str) -> AppResult<u64> {
        self.request_repo.count_pending_received(user_id).await
    }

    /// Follow status summary for a (viewer, target) pair.
    pub async fn follow_status(&self, viewer_id: &str, target_id: &str) -> AppResult<FollowStatus> {
        let profile = self.profile_repo.get_by_user_id(target_id).await?;

        let state = if viewer_id == target_id {
            FollowState::Own
        } else if self.edge_repo.is_following(viewer_id, target_id).await? {
            FollowState::Following
        } else if self.request_repo.exists_pending(viewer_id, target_id).await? {
            FollowState::Requested
        } else {
            FollowState::NotFollowing
        };

        Ok(FollowStatus {
            state,
            is_private: profile.is_private,
            follower_count: self.edge_repo.count_followers(target_id).await?,
            following_count: self.edge_repo.count_following(target_id).await?,
        })
    }

    /// Accounts the user neither follows nor has a pending request toward.
    pub async fn suggested_users(&self, user_id: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let mut exclude = self.edge_repo.find_following_ids(user_id).await?;
        exclude.extend(self.request_repo.find_pending_target_ids(user_id).await?);
        exclude.push(user_id.to_string());

        self.user_repo.find_excluding(&exclude, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use photogram_db::entities::{notification, user_profile};
    use photogram_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            display_name: None,
            token: Some(format!("token-{id}")),
            created_at: chrono::Utc::now().into(),
        }
    }

    fn test_profile(user_id: &str, is_private: bool) -> user_profile::Model {
        user_profile::Model {
            user_id: user_id.to_string(),
            bio: None,
            website: None,
            avatar_url: None,
            is_private,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_edge(id: &str, follower_id: &str, following_id: &str) -> follow_edge::Model {
        follow_edge::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: chrono::Utc::now().into(),
        }
    }

    fn test_request(
        id: &str,
        from: &str,
        to: &str,
        status: RequestStatus,
    ) -> follow_request::Model {
        follow_request::Model {
            id: id.to_string(),
            from_user_id: from.to_string(),
            to_user_id: to.to_string(),
            status,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_notification(id: &str, recipient: &str, sender: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient.to_string(),
            sender_id: Some(sender.to_string()),
            notification_type: notification::NotificationType::Follow,
            message: "started following you.".to_string(),
            post_id: None,
            comment_id: None,
            story_id: None,
            message_id: None,
            is_read: false,
            is_seen: false,
            created_at: chrono::Utc::now().into(),
        }
    }

    struct MockDbs {
        edges: MockDatabase,
        requests: MockDatabase,
        profiles: MockDatabase,
        users: MockDatabase,
        notifications: MockDatabase,
        notif_users: MockDatabase,
    }

    impl MockDbs {
        fn new() -> Self {
            Self {
                edges: MockDatabase::new(DatabaseBackend::Postgres),
                requests: MockDatabase::new(DatabaseBackend::Postgres),
                profiles: MockDatabase::new(DatabaseBackend::Postgres),
                users: MockDatabase::new(DatabaseBackend::Postgres),
                notifications: MockDatabase::new(DatabaseBackend::Postgres),
                notif_users: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn build(self) -> FollowService {
            let notifications = NotificationService::new(
                NotificationRepository::new(Arc::new(self.notifications.into_connection())),
                UserRepository::new(Arc::new(self.notif_users.into_connection())),
            );
            FollowService::new(
                FollowEdgeRepository::new(Arc::new(self.edges.into_connection())),
                FollowRequestRepository::new(Arc::new(self.requests.into_connection())),
                UserProfileRepository::new(Arc::new(self.profiles.into_connection())),
                UserRepository::new(Arc::new(self.users.into_connection())),
                notifications,
            )
        }
    }

    #[tokio::test]
    async fn test_send_request_to_self_is_invalid() {
        let service = MockDbs::new().build();
        let result = service.send_request("user1", "user1").await;
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_send_request_when_already_following() {
        let mut dbs = MockDbs::new();
        dbs.edges = dbs
            .edges
            .append_query_results([[test_edge("e1", "user1", "user2")]]);

        let service = dbs.build();
        let result = service.send_request("user1", "user2").await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_send_request_with_pending_request_is_informational() {
        let mut dbs = MockDbs::new();
        dbs.edges = dbs.edges.append_query_results([Vec::<follow_edge::Model>::new()]);
        dbs.requests = dbs.requests.append_query_results([[test_request(
            "r1",
            "user1",
            "user2",
            RequestStatus::Pending,
        )]]);

        let service = dbs.build();
        let outcome = service.send_request("user1", "user2").await.unwrap();
        assert_eq!(outcome, SendOutcome::AlreadyRequested);
    }

    #[tokio::test]
    async fn test_send_request_public_target_auto_accepts() {
        let mut dbs = MockDbs::new();
        // is_following miss, then the idempotent edge insert
        dbs.edges = dbs
            .edges
            .append_query_results([Vec::<follow_edge::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        // find_by_pair miss, INSERT .. RETURNING, UPDATE .. RETURNING
        dbs.requests = dbs.requests.append_query_results([
            Vec::<follow_request::Model>::new(),
            vec![test_request("r1", "user1", "user2", RequestStatus::Pending)],
            vec![test_request("r1", "user1", "user2", RequestStatus::Accepted)],
        ]);
        dbs.profiles = dbs
            .profiles
            .append_query_results([[test_profile("user2", false)]]);
        dbs.notif_users = dbs.notif_users.append_query_results([[test_user("user1", "alice")]]);
        dbs.notifications = dbs
            .notifications
            .append_query_results([[test_notification("n1", "user2", "user1")]]);

        let service = dbs.build();
        let outcome = service.send_request("user1", "user2").await.unwrap();
        assert_eq!(outcome, SendOutcome::Following);
    }

    #[tokio::test]
    async fn test_send_request_private_target_stays_pending() {
        let mut dbs = MockDbs::new();
        dbs.edges = dbs.edges.append_query_results([Vec::<follow_edge::Model>::new()]);
        dbs.requests = dbs.requests.append_query_results([
            Vec::<follow_request::Model>::new(),
            vec![test_request("r1", "user1", "user2", RequestStatus::Pending)],
        ]);
        dbs.profiles = dbs
            .profiles
            .append_query_results([[test_profile("user2", true)]]);
        dbs.notif_users = dbs.notif_users.append_query_results([[test_user("user1", "alice")]]);
        dbs.notifications = dbs
            .notifications
            .append_query_results([[test_notification("n1", "user2", "user1")]]);

        let service = dbs.build();
        let outcome = service.send_request("user1", "user2").await.unwrap();
        assert_eq!(outcome, SendOutcome::Requested);
    }

    #[tokio::test]
    async fn test_accept_request_by_non_target_is_not_found() {
        let mut dbs = MockDbs::new();
        dbs.requests = dbs.requests.append_query_results([[test_request(
            "r1",
            "user1",
            "user2",
            RequestStatus::Pending,
        )]]);

        let service = dbs.build();
        // user3 is not the target of r1
        let result = service.accept_request("r1", "user3").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_accept_declined_request_is_not_found() {
        let mut dbs = MockDbs::new();
        dbs.requests = dbs.requests.append_query_results([[test_request(
            "r1",
            "user1",
            "user2",
            RequestStatus::Declined,
        )]]);

        let service = dbs.build();
        let result = service.accept_request("r1", "user2").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_cleans_up_edge_request_and_notification() {
        let mut dbs = MockDbs::new();
        // find_by_pair hit, then the edge DELETE
        dbs.edges = dbs
            .edges
            .append_query_results([[test_edge("e1", "user1", "user2")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        // stale accepted request removed
        dbs.requests = dbs.requests.append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
        // fanned-out follow notification removed
        dbs.notifications = dbs.notifications.append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);

        let service = dbs.build();
        assert!(service.unfollow("user1", "user2").await.is_ok());
    }

    #[tokio::test]
    async fn test_is_following() {
        let mut dbs = MockDbs::new();
        dbs.edges = dbs
            .edges
            .append_query_results([[test_edge("e1", "user1", "user2")]]);

        let service = dbs.build();
        assert!(service.is_following("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_not_following() {
        let mut dbs = MockDbs::new();
        dbs.edges = dbs.edges.append_query_results([Vec::<follow_edge::Model>::new()]);

        let service = dbs.build();
        assert!(!service.is_following("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_self_edge_is_invalid() {
        let service = MockDbs::new().build();
        let result = service.create_edge("user1", "user1").await;
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }
}
