pub mod auth;

pub use auth::{extract_bearer, resolve_identity};
