pub mod auth_handler;
pub mod jwks_handler;
