pub mod auth;
pub mod reference;

pub use auth::{create_token, hash_password, verify_password, verify_token};
pub use reference::document_reference;
