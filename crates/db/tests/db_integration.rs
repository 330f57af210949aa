//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `photogram_test`)
//!   `TEST_DB_PASSWORD` (default: `photogram_test`)
//!   `TEST_DB_NAME` (default: `photogram_test`)

#![allow(clippy::unwrap_used)]

use photogram_common::AppError;
use photogram_db::entities::{
    follow_edge, follow_request, follow_request::RequestStatus, notification,
    notification::NotificationType, user,
};
use photogram_db::repositories::{
    FollowEdgeRepository, FollowRequestRepository, NotificationRepository, UserRepository,
};
use photogram_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}

async fn setup() -> TestDatabase {
    let db = TestDatabase::create_unique().await.unwrap();
    photogram_db::migrate(db.connection()).await.unwrap();
    db
}

async fn seed_user(repo: &UserRepository, id: &str, username: &str) -> user::Model {
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        username_lower: Set(username.to_lowercase()),
        display_name: Set(None),
        token: Set(Some(format!("token-{id}"))),
        created_at: Set(chrono::Utc::now().into()),
    })
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_edge_create_is_idempotent() {
    let db = setup().await;
    let conn = db.conn.clone();
    let users = UserRepository::new(conn.clone());
    let edges = FollowEdgeRepository::new(conn);

    seed_user(&users, "u1", "alice").await;
    seed_user(&users, "u2", "bob").await;

    let model = |id: &str| follow_edge::ActiveModel {
        id: Set(id.to_string()),
        follower_id: Set("u1".to_string()),
        following_id: Set("u2".to_string()),
        created_at: Set(chrono::Utc::now().into()),
    };

    edges.create(model("e1")).await.unwrap();
    // Second insert for the same pair is a no-op, not an error
    edges.create(model("e2")).await.unwrap();

    assert!(edges.is_following("u1", "u2").await.unwrap());
    assert_eq!(edges.count_followers("u2").await.unwrap(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_decline_then_resend_reuses_row() {
    let db = setup().await;
    let conn = db.conn.clone();
    let users = UserRepository::new(conn.clone());
    let requests = FollowRequestRepository::new(conn);

    seed_user(&users, "u1", "alice").await;
    seed_user(&users, "u2", "bob").await;

    let created = requests
        .create(follow_request::ActiveModel {
            id: Set("r1".to_string()),
            from_user_id: Set("u1".to_string()),
            to_user_id: Set("u2".to_string()),
            status: Set(RequestStatus::Pending),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();

    let declined = requests
        .set_status(created, RequestStatus::Declined)
        .await
        .unwrap();
    assert_eq!(declined.status, RequestStatus::Declined);

    // Reopening flips the same row back to pending
    let reopened = requests
        .set_status(declined, RequestStatus::Pending)
        .await
        .unwrap();
    assert_eq!(reopened.id, "r1");
    assert_eq!(reopened.status, RequestStatus::Pending);

    assert_eq!(requests.count_pending_received("u2").await.unwrap(), 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_request_insert_is_already_exists() {
    let db = setup().await;
    let conn = db.conn.clone();
    let users = UserRepository::new(conn.clone());
    let requests = FollowRequestRepository::new(conn);

    seed_user(&users, "u1", "alice").await;
    seed_user(&users, "u2", "bob").await;

    let model = |id: &str| follow_request::ActiveModel {
        id: Set(id.to_string()),
        from_user_id: Set("u1".to_string()),
        to_user_id: Set("u2".to_string()),
        status: Set(RequestStatus::Pending),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    };

    requests.create(model("r1")).await.unwrap();

    // A second insert for the same pair (what a concurrent sender would
    // attempt) trips the unique index and maps to AlreadyExists, not a
    // generic database error
    let err = requests.create(model("r2")).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists(_)));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_seen_and_read_flags_are_independent() {
    let db = setup().await;
    let conn = db.conn.clone();
    let users = UserRepository::new(conn.clone());
    let notifications = NotificationRepository::new(conn);

    seed_user(&users, "u1", "alice").await;
    seed_user(&users, "u2", "bob").await;

    for id in ["n1", "n2"] {
        notifications
            .create(notification::ActiveModel {
                id: Set(id.to_string()),
                recipient_id: Set("u1".to_string()),
                sender_id: Set(Some("u2".to_string())),
                notification_type: Set(NotificationType::Follow),
                message: Set("bob started following you.".to_string()),
                post_id: Set(None),
                comment_id: Set(None),
                story_id: Set(None),
                message_id: Set(None),
                is_read: Set(false),
                is_seen: Set(false),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await
            .unwrap();
    }

    // Seeing clears the red dot but leaves the unread badge intact
    assert_eq!(notifications.mark_all_seen("u1").await.unwrap(), 2);
    let rows = notifications
        .find_by_recipient("u1", 10, None, false)
        .await
        .unwrap();
    assert!(rows.iter().all(|n| n.is_seen && !n.is_read));
    assert_eq!(notifications.count_unseen("u1").await.unwrap(), 0);
    assert_eq!(notifications.count_unread("u1").await.unwrap(), 2);

    // Reading clears both
    assert_eq!(notifications.mark_all_read("u1").await.unwrap(), 2);
    assert_eq!(notifications.count_unread("u1").await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_mutual_following_ids() {
    let db = setup().await;
    let conn = db.conn.clone();
    let users = UserRepository::new(conn.clone());
    let edges = FollowEdgeRepository::new(conn);

    for (id, name) in [("u1", "alice"), ("u2", "bob"), ("u3", "carol")] {
        seed_user(&users, id, name).await;
    }

    let edge = |id: &str, from: &str, to: &str| follow_edge::ActiveModel {
        id: Set(id.to_string()),
        follower_id: Set(from.to_string()),
        following_id: Set(to.to_string()),
        created_at: Set(chrono::Utc::now().into()),
    };

    // No common targets yet
    assert!(
        edges
            .find_mutual_following_ids("u1", "u2")
            .await
            .unwrap()
            .is_empty()
    );

    edges.create(edge("e1", "u1", "u3")).await.unwrap();
    edges.create(edge("e2", "u2", "u3")).await.unwrap();

    let mutual = edges.find_mutual_following_ids("u1", "u2").await.unwrap();
    assert_eq!(mutual, vec!["u3".to_string()]);

    db.drop_database().await.unwrap();
}
