//! Database entities.

pub mod follow_edge;
pub mod follow_request;
pub mod notification;
pub mod user;
pub mod user_profile;

pub use follow_edge::Entity as FollowEdge;
pub use follow_request::Entity as FollowRequest;
pub use notification::Entity as Notification;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
