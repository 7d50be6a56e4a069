/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_covers")]
    pub covers: CoverSettings,

    #[serde(default = "default_metadata")]
    pub metadata: MetadataSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    #[serde(default = "default_jwt_refresh_expiration_days")]
    pub jwt_refresh_expiration_days: u64,
}

/// Where uploaded covers are written and the URL they are served under
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverSettings {
    #[serde(default = "default_cover_storage_path")]
    pub storage_path: PathBuf,

    #[serde(default = "default_cover_public_base_url")]
    pub public_base_url: String,
}

/// External catalog (Douban-compatible) API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataSettings {
    #[serde(default = "default_metadata_base_url")]
    pub base_url: String,

    #[serde(default = "default_metadata_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from `config.toml` (or `path`) and the environment
    ///
    /// Environment variables use the `OTAKUY_` prefix and `__` between
    /// section and key, e.g. `OTAKUY_AUTH__JWT_SECRET`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ServerError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("OTAKUY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set OTAKUY_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.covers.public_base_url.trim().is_empty() {
            return Err(ServerError::Config(
                "Cover public base URL is required (set OTAKUY_COVERS__PUBLIC_BASE_URL)"
                    .to_string(),
            ));
        }

        url::Url::parse(&self.metadata.base_url).map_err(|e| {
            ServerError::Config(format!(
                "Invalid metadata base URL {:?}: {e}",
                self.metadata.base_url
            ))
        })?;

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/otakuy.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
        jwt_refresh_expiration_days: default_jwt_refresh_expiration_days(),
    }
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_jwt_refresh_expiration_days() -> u64 {
    30
}

fn default_covers() -> CoverSettings {
    CoverSettings {
        storage_path: default_cover_storage_path(),
        public_base_url: default_cover_public_base_url(),
    }
}

fn default_cover_storage_path() -> PathBuf {
    PathBuf::from("./data/covers")
}

fn default_cover_public_base_url() -> String {
    "http://localhost:8080/covers".to_string()
}

fn default_metadata() -> MetadataSettings {
    MetadataSettings {
        base_url: default_metadata_base_url(),
        timeout_secs: default_metadata_timeout_secs(),
    }
}

fn default_metadata_base_url() -> String {
    "https://api.douban.com".to_string()
}

fn default_metadata_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            covers: default_covers(),
            metadata: default_metadata(),
        }
    }
}
