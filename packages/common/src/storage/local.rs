use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufReader};

use super::access::AccessPolicy;
use super::error::StorageError;
use super::traits::{BoxReader, ProxyUrlBuilder, Storage};

/// Files on the local filesystem under a single root directory.
///
/// Writes go to `{root}/.tmp` first and are renamed into place, so a reader
/// never sees a partially written file.
pub struct LocalStorage {
    root: PathBuf,
    access: AccessPolicy,
}

impl LocalStorage {
    pub async fn new(root: PathBuf, access: AccessPolicy) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, access })
    }

    /// Map a backend-relative path under the root, refusing anything that
    /// could escape it.
    fn full_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut full = self.root.clone();
        let mut pushed = false;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    full.push(part);
                    pushed = true;
                }
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(path.to_string())),
            }
        }
        if !pushed {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(full)
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn save(&self, path: &str, mut reader: BoxReader) -> Result<(), StorageError> {
        let target = self.full_path(path)?;
        let temp_path = self.temp_path();

        let mut temp_file = fs::File::create(&temp_path).await?;
        if let Err(e) = tokio::io::copy(&mut reader, &mut temp_file).await {
            drop(temp_file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        temp_file.flush().await?;
        drop(temp_file);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn open(&self, path: &str) -> Result<BoxReader, StorageError> {
        let full = self.full_path(path)?;
        match fs::File::open(&full).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn url(
        &self,
        file_id: i64,
        _path: &str,
        width: u32,
        height: u32,
        proxy: ProxyUrlBuilder<'_>,
    ) -> Result<String, StorageError> {
        // Local content has no public URL of its own.
        Ok(self.access.finish(proxy(file_id), width, height))
    }
}
