pub mod amount;
pub mod api;
pub mod health;
pub mod tools;
pub mod trigger;
