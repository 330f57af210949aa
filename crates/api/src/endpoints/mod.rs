//! API endpoints.

mod account;
mod follow;
mod notifications;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/account", account::router())
        .nest("/users", users::router())
        .nest("/follow", follow::router())
        .nest("/notifications", notifications::router())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use photogram_core::{AccountService, FollowService, NotificationService, VisibilityService};
    use photogram_db::repositories::{
        FollowEdgeRepository, FollowRequestRepository, NotificationRepository,
        UserProfileRepository, UserRepository,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn test_state() -> AppState {
        let user_repo = UserRepository::new(mock_db());
        let profile_repo = UserProfileRepository::new(mock_db());
        let edge_repo = FollowEdgeRepository::new(mock_db());
        let request_repo = FollowRequestRepository::new(mock_db());
        let notification_repo = NotificationRepository::new(mock_db());

        let notification_service =
            NotificationService::new(notification_repo, user_repo.clone());
        AppState {
            follow_service: FollowService::new(
                edge_repo.clone(),
                request_repo,
                profile_repo.clone(),
                user_repo.clone(),
                notification_service.clone(),
            ),
            visibility_service: VisibilityService::new(profile_repo.clone(), edge_repo),
            account_service: AccountService::new(user_repo, profile_repo),
            notification_service,
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_request_is_rejected() {
        let app = router().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users/me")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_username() {
        let app = router().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/account/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username": ""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
