pub mod auth;
pub mod error;
pub mod serde_helpers;
