//! Otakuy Music Server Library
//!
//! HTTP surface of the album moderation service: JWT auth, album submission
//! and editing, public listings, moderator actions, cover uploads and
//! external catalog lookups.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::create_router;
pub use services::{AuthService, CoverStorage, DoubanClient, StoreIdentity};
pub use state::AppState;
