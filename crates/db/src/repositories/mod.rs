//! Database repositories.

mod follow_edge;
mod follow_request;
mod notification;
mod user;
mod user_profile;

pub use follow_edge::FollowEdgeRepository;
pub use follow_request::FollowRequestRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
