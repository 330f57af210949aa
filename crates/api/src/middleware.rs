//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use photogram_core::{AccountService, FollowService, NotificationService, VisibilityService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub follow_service: FollowService,
    pub notification_service: NotificationService,
    pub visibility_service: VisibilityService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stores the model in request
/// extensions; handlers opt in through the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.account_service.authenticate_by_token(token).await
    {
        tracing::trace!(user_id = %user.id, "Authenticated request");
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
