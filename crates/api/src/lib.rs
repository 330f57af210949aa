//! HTTP API layer for photogram.
//!
//! - **Endpoints**: follow graph, follow requests, notifications, accounts
//! - **Extractors**: token authentication via request extensions
//! - **Middleware**: auth, logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
