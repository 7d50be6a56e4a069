/// Server services
pub mod auth;
pub mod cover_storage;
pub mod identity;
pub mod metadata;

pub use auth::AuthService;
pub use cover_storage::CoverStorage;
pub use identity::StoreIdentity;
pub use metadata::DoubanClient;
