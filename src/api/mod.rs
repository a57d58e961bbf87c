pub mod diagnosis;
pub mod error;
pub mod health;
pub mod openapi;
