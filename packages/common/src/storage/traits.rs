use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Builds the same-origin proxy URL for a file id, e.g. `http://host/api/v1/file/42`.
pub type ProxyUrlBuilder<'a> = &'a (dyn Fn(i64) -> String + Send + Sync);

/// A place where file content lives.
///
/// Paths are backend-relative and use `/` as separator. The backend name is
/// persisted on every file row so reads can be routed back to the backend
/// that wrote the content.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Backend discriminator: `local`, `s3` or `webdav`.
    fn name(&self) -> &'static str;

    /// Stream content to `path`, creating intermediate directories or prefixes.
    async fn save(&self, path: &str, reader: BoxReader) -> Result<(), StorageError>;

    async fn save_bytes(&self, path: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data));
        self.save(path, reader).await
    }

    /// Open the content at `path` as a streaming reader.
    async fn open(&self, path: &str) -> Result<BoxReader, StorageError>;

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.open(path).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Resolve a client-facing URL for the content at `path`.
    ///
    /// A `width`/`height` of `0` asks for the original image when an image
    /// proxy is configured.
    async fn url(
        &self,
        file_id: i64,
        path: &str,
        width: u32,
        height: u32,
        proxy: ProxyUrlBuilder<'_>,
    ) -> Result<String, StorageError>;
}
