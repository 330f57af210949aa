//! Business logic services.

pub mod account;
pub mod follow;
pub mod notification;
pub mod visibility;

pub use account::{AccountService, RegisterInput};
pub use follow::{FollowService, FollowState, FollowStatus, SendOutcome};
pub use notification::{ContentRefs, NotificationService};
pub use visibility::VisibilityService;
