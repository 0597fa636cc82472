use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use super::access::AccessPolicy;
use super::error::StorageError;
use super::local::LocalStorage;
use super::traits::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Local,
    S3,
    Webdav,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    pub root: PathBuf,
}

/// The `storage` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: Backend,
    #[serde(default)]
    pub access: AccessPolicy,
    pub local: LocalConfig,
    #[cfg(feature = "object-storage")]
    #[serde(default)]
    pub s3: Option<super::s3::S3Config>,
    #[cfg(feature = "object-storage")]
    #[serde(default)]
    pub webdav: Option<super::webdav::WebDavConfig>,
}

/// Build the configured backend.
pub async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    let access = config.access.clone();
    let storage: Arc<dyn Storage> = match config.backend {
        Backend::Local => Arc::new(LocalStorage::new(config.local.root.clone(), access).await?),
        #[cfg(feature = "object-storage")]
        Backend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| StorageError::Config("missing [storage.s3] section".into()))?;
            Arc::new(super::s3::S3Storage::new(s3, access)?)
        }
        #[cfg(feature = "object-storage")]
        Backend::Webdav => {
            let webdav = config
                .webdav
                .clone()
                .ok_or_else(|| StorageError::Config("missing [storage.webdav] section".into()))?;
            Arc::new(super::webdav::WebDavStorage::new(webdav, access)?)
        }
        #[cfg(not(feature = "object-storage"))]
        other => {
            return Err(StorageError::Config(format!(
                "{other:?} backend requires the object-storage feature"
            )));
        }
    };

    tracing::info!(backend = storage.name(), "storage backend ready");
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: Backend::Local,
            access: AccessPolicy::default(),
            local: LocalConfig {
                root: dir.path().join("uploads"),
            },
            #[cfg(feature = "object-storage")]
            s3: None,
            #[cfg(feature = "object-storage")]
            webdav: None,
        };
        let storage = build_storage(&config).await.unwrap();
        assert_eq!(storage.name(), "local");
    }

    #[cfg(feature = "object-storage")]
    #[tokio::test]
    async fn s3_without_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: Backend::S3,
            access: AccessPolicy::default(),
            local: LocalConfig {
                root: dir.path().to_path_buf(),
            },
            s3: None,
            webdav: None,
        };
        assert!(matches!(
            build_storage(&config).await,
            Err(StorageError::Config(_))
        ));
    }
}
