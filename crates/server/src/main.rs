//! Photogram server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use photogram_api::{middleware::AppState, router as api_router};
use photogram_common::Config;
use photogram_core::{AccountService, FollowService, NotificationService, VisibilityService};
use photogram_db::repositories::{
    FollowEdgeRepository, FollowRequestRepository, NotificationRepository, UserProfileRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photogram=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting photogram server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = photogram_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    photogram_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = UserProfileRepository::new(Arc::clone(&db));
    let edge_repo = FollowEdgeRepository::new(Arc::clone(&db));
    let request_repo = FollowRequestRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Initialize services
    let notification_service =
        NotificationService::new(notification_repo.clone(), user_repo.clone());
    let follow_service = FollowService::new(
        edge_repo.clone(),
        request_repo.clone(),
        profile_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let visibility_service = VisibilityService::new(profile_repo.clone(), edge_repo.clone());
    let account_service = AccountService::new(user_repo, profile_repo);

    let state = AppState {
        account_service,
        follow_service,
        notification_service,
        visibility_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            photogram_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
