pub mod key_lifecycle;
pub mod token_service;
