//! Follow edge repository.

use std::sync::Arc;

use crate::entities::{FollowEdge, follow_edge};
use photogram_common::{AppError, AppResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Follow edge repository for database operations.
#[derive(Clone)]
pub struct FollowEdgeRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowEdgeRepository {
    /// Create a new follow edge repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an edge by follower and followed user.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<Option<follow_edge::Model>> {
        FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(follower_id))
            .filter(follow_edge::Column::FollowingId.eq(following_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if an edge follower -> following exists.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, following_id).await?.is_some())
    }

    /// Create an edge idempotently.
    ///
    /// Concurrent inserts for the same pair are resolved by the unique
    /// (`follower_id`, `following_id`) index: the losing insert is a no-op.
    pub async fn create(&self, model: follow_edge::ActiveModel) -> AppResult<()> {
        FollowEdge::insert(model)
            .on_conflict(
                OnConflict::columns([
                    follow_edge::Column::FollowerId,
                    follow_edge::Column::FollowingId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an edge by pair. No-op when the edge is absent.
    pub async fn delete_by_pair(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        let edge = self.find_by_pair(follower_id, following_id).await?;
        if let Some(e) = edge {
            e.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Count followers of a user (computed on demand, never cached).
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        FollowEdge::find()
            .filter(follow_edge::Column::FollowingId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user is following.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get followers of a user (paginated).
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        let mut query = FollowEdge::find()
            .filter(follow_edge::Column::FollowingId.eq(user_id))
            .order_by_desc(follow_edge::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_edge::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get users a user is following (paginated).
    pub async fn find_following(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        let mut query = FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(user_id))
            .order_by_desc(follow_edge::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_edge::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of all users a user is following (unpaginated, for graph queries).
    pub async fn find_following_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let edges = FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.into_iter().map(|e| e.following_id).collect())
    }

    /// IDs of users followed by both `a` and `b`.
    pub async fn find_mutual_following_ids(&self, a: &str, b: &str) -> AppResult<Vec<String>> {
        let a_following = self.find_following_ids(a).await?;
        if a_following.is_empty() {
            return Ok(Vec::new());
        }

        let edges = FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(b))
            .filter(follow_edge::Column::FollowingId.is_in(a_following))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.into_iter().map(|e| e.following_id).collect())
    }
}
