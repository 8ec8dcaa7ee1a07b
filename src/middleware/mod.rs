pub mod auth;
pub mod policy;

pub use auth::{get_current_user, CurrentUser};
pub use policy::{is_allowed, Action, Resource};
