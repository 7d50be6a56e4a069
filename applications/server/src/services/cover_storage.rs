/// Cover storage service - writes uploaded cover images to disk
use async_trait::async_trait;
use otakuy_core::{BlobStorage, OtakuyError};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct CoverStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl CoverStorage {
    pub fn new(base_path: PathBuf, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            base_path,
            public_base_url,
        }
    }

    /// Create the cover directory
    pub async fn initialize(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Public URL a stored key is served from
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// On-disk location of a key; keys must be plain file names
    pub fn path_for(&self, key: &str) -> otakuy_core::Result<PathBuf> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && Path::new(key).file_name().is_some_and(|name| name == key);

        if plain {
            Ok(self.base_path.join(key))
        } else {
            Err(OtakuyError::validation(format!("Invalid cover key: {key:?}")))
        }
    }
}

#[async_trait]
impl BlobStorage for CoverStorage {
    async fn store(&self, bytes: Vec<u8>, key: &str) -> otakuy_core::Result<String> {
        let path = self.path_for(key)?;

        let write = async {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, &bytes).await
        };
        write
            .await
            .map_err(|e| OtakuyError::upstream("cover storage", e.to_string()))?;

        tracing::debug!(key, size = bytes.len(), "Cover stored");
        Ok(self.url_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_normalized() {
        let storage = CoverStorage::new(PathBuf::from("/tmp/covers"), "https://cover.example.com/");
        assert_eq!(storage.url_for("a.png"), "https://cover.example.com/a.png");
    }

    #[test]
    fn test_keys_cannot_escape_base_path() {
        let storage = CoverStorage::new(PathBuf::from("/tmp/covers"), "https://c");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("nested/a.png").is_err());
        assert!(storage.path_for("..").is_err());
        assert!(storage.path_for("").is_err());
        assert!(storage.path_for("0190-a.png").is_ok());
    }
}
