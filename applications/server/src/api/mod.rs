/// API route modules
pub mod admin;
pub mod albums;
pub mod auth;
pub mod check;
pub mod health;
pub mod metadata;
