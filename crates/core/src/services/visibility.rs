//! Profile visibility policy.

use photogram_common::AppResult;
use photogram_db::repositories::{FollowEdgeRepository, UserProfileRepository};

/// Decides whether a viewer may see a target account's content.
///
/// The policy is deliberately small: owners always see themselves,
/// public accounts are visible to everyone, and private accounts are
/// visible only to accepted followers. Pending requests grant nothing.
#[derive(Clone)]
pub struct VisibilityService {
    profile_repo: UserProfileRepository,
    edge_repo: FollowEdgeRepository,
}

impl VisibilityService {
    /// Create a new visibility service.
    #[must_use]
    pub const fn new(profile_repo: UserProfileRepository, edge_repo: FollowEdgeRepository) -> Self {
        Self {
            profile_repo,
            edge_repo,
        }
    }

    /// Check whether `viewer_id` may view `target_id`'s content.
    pub async fn can_view(&self, viewer_id: &str, target_id: &str) -> AppResult<bool> {
        if viewer_id == target_id {
            return Ok(true);
        }

        let profile = self.profile_repo.get_by_user_id(target_id).await?;
        if !profile.is_private {
            return Ok(true);
        }

        self.edge_repo.is_following(viewer_id, target_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use photogram_db::entities::{follow_edge, user_profile};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

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

    fn service(profiles: MockDatabase, edges: MockDatabase) -> VisibilityService {
        VisibilityService::new(
            UserProfileRepository::new(Arc::new(profiles.into_connection())),
            FollowEdgeRepository::new(Arc::new(edges.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_owner_can_always_view() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );
        assert!(service.can_view("user1", "user1").await.unwrap());
    }

    #[tokio::test]
    async fn test_public_account_visible_to_stranger() {
        let profiles = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_profile("user2", false)]]);
        let service = service(profiles, MockDatabase::new(DatabaseBackend::Postgres));
        assert!(service.can_view("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_private_account_hidden_from_stranger() {
        let profiles = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_profile("user2", true)]]);
        let edges = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<follow_edge::Model>::new()]);
        let service = service(profiles, edges);
        assert!(!service.can_view("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_private_account_visible_to_follower() {
        let profiles = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_profile("user2", true)]]);
        let edges = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            follow_edge::Model {
                id: "e1".to_string(),
                follower_id: "user1".to_string(),
                following_id: "user2".to_string(),
                created_at: chrono::Utc::now().into(),
            },
        ]]);
        let service = service(profiles, edges);
        assert!(service.can_view("user1", "user2").await.unwrap());
    }
}
