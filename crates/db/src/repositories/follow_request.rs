//! Follow request repository.

use std::sync::Arc;

use crate::entities::{FollowRequest, follow_request, follow_request::RequestStatus};
use photogram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

/// Follow request repository for database operations.
#[derive(Clone)]
pub struct FollowRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRequestRepository {
    /// Create a new follow request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<follow_request::Model>> {
        FollowRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the request for a (from, to) pair, regardless of status.
    ///
    /// At most one row exists per pair; declined requests are reopened
    /// in place rather than duplicated.
    pub async fn find_by_pair(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> AppResult<Option<follow_request::Model>> {
        FollowRequest::find()
            .filter(follow_request::Column::FromUserId.eq(from_user_id))
            .filter(follow_request::Column::ToUserId.eq(to_user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check for a pending request from `from_user_id` to `to_user_id`.
    pub async fn exists_pending(&self, from_user_id: &str, to_user_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_pair(from_user_id, to_user_id)
            .await?
            .is_some_and(|r| r.status == RequestStatus::Pending))
    }

    /// Create a new follow request.
    ///
    /// A concurrent duplicate for the same pair trips the unique
    /// (from, to) index and surfaces as `AlreadyExists`, never a
    /// server error.
    pub async fn create(
        &self,
        model: follow_request::ActiveModel,
    ) -> AppResult<follow_request::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::AlreadyExists("Follow request already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Transition a request to a new status, bumping `updated_at`.
    pub async fn set_status(
        &self,
        request: follow_request::Model,
        status: RequestStatus,
    ) -> AppResult<follow_request::Model> {
        let mut active: follow_request::ActiveModel = request.into();
        active.status = Set(status);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a request by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let request = self.find_by_id(id).await?;
        if let Some(r) = request {
            r.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Delete the accepted request for a pair, if any.
    ///
    /// Called on unfollow so a later resend does not collide with a
    /// stale accepted row.
    pub async fn delete_accepted_by_pair(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> AppResult<()> {
        FollowRequest::delete_many()
            .filter(follow_request::Column::FromUserId.eq(from_user_id))
            .filter(follow_request::Column::ToUserId.eq(to_user_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Accepted))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get pending follow requests received by a user (paginated).
    pub async fn find_pending_received(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        let mut query = FollowRequest::find()
            .filter(follow_request::Column::ToUserId.eq(user_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(follow_request::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_request::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending follow requests received by a user.
    pub async fn count_pending_received(&self, user_id: &str) -> AppResult<u64> {
        FollowRequest::find()
            .filter(follow_request::Column::ToUserId.eq(user_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of users toward whom `user_id` has a pending request.
    pub async fn find_pending_target_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let requests = FollowRequest::find()
            .filter(follow_request::Column::FromUserId.eq(user_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(requests.into_iter().map(|r| r.to_user_id).collect())
    }
}
