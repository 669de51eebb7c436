pub mod accounts;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod payload;
pub mod search;
pub mod sweep;
