use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{Error as ObjectStoreError, ObjectStoreExt, PutPayload};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

use super::access::AccessPolicy;
use super::error::StorageError;
use super::traits::{BoxReader, ProxyUrlBuilder, Storage};

const BACKEND: &str = "s3";

/// Presigned URLs stay valid for a week unless configured otherwise.
pub const DEFAULT_PRESIGN_EXPIRE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// `host:port` or a full URL of the S3-compatible endpoint.
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub use_ssl: bool,
    /// Endpoint used when signing URLs handed to clients, e.g. a CDN in
    /// front of the bucket. Falls back to `endpoint`.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default = "default_presign_expire")]
    pub presign_expire: u64,
}

fn default_region() -> String {
    "us-east-1".into()
}

fn default_presign_expire() -> u64 {
    DEFAULT_PRESIGN_EXPIRE_SECS
}

/// S3-compatible object storage.
pub struct S3Storage {
    store: AmazonS3,
    signer: AmazonS3,
    presign_expire: Duration,
    access: AccessPolicy,
}

impl S3Storage {
    pub fn new(config: &S3Config, access: AccessPolicy) -> Result<Self, StorageError> {
        let endpoint = endpoint_url(&config.endpoint, config.use_ssl);
        let store = build_client(config, &endpoint)?;
        let signer = match config.public_base_url.as_deref() {
            Some(public) if !public.trim().is_empty() => build_client(config, public.trim())?,
            _ => build_client(config, &endpoint)?,
        };

        let presign_expire = if config.presign_expire == 0 {
            DEFAULT_PRESIGN_EXPIRE_SECS
        } else {
            config.presign_expire
        };

        Ok(Self {
            store,
            signer,
            presign_expire: Duration::from_secs(presign_expire),
            access,
        })
    }
}

fn endpoint_url(endpoint: &str, use_ssl: bool) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        let scheme = if use_ssl { "https" } else { "http" };
        format!("{scheme}://{}", endpoint.trim_end_matches('/'))
    }
}

fn build_client(config: &S3Config, endpoint: &str) -> Result<AmazonS3, StorageError> {
    AmazonS3Builder::new()
        .with_region(&config.region)
        .with_bucket_name(&config.bucket)
        .with_access_key_id(&config.access_key_id)
        .with_secret_access_key(&config.secret_access_key)
        .with_endpoint(endpoint)
        .with_allow_http(endpoint.starts_with("http://"))
        .with_virtual_hosted_style_request(false)
        .build()
        .map_err(|e| StorageError::Config(e.to_string()))
}

fn map_error(path: &str, err: ObjectStoreError) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(path.to_string()),
        other => StorageError::backend(BACKEND, other),
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn save(&self, path: &str, mut reader: BoxReader) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        let size = buf.len();

        self.store
            .put(&ObjectPath::from(path), PutPayload::from(buf))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %path, size_bytes = size, "S3 upload failed");
                map_error(path, e)
            })?;
        Ok(())
    }

    async fn open(&self, path: &str) -> Result<BoxReader, StorageError> {
        let result = self
            .store
            .get(&ObjectPath::from(path))
            .await
            .map_err(|e| map_error(path, e))?;

        let stream = result.into_stream().map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(stream)))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.store
            .delete(&ObjectPath::from(path))
            .await
            .map_err(|e| map_error(path, e))
    }

    async fn url(
        &self,
        file_id: i64,
        path: &str,
        width: u32,
        height: u32,
        proxy: ProxyUrlBuilder<'_>,
    ) -> Result<String, StorageError> {
        let url = if self.access.proxy {
            proxy(file_id)
        } else {
            self.signer
                .signed_url(Method::GET, &ObjectPath::from(path), self.presign_expire)
                .await
                .map_err(|e| map_error(path, e))?
                .to_string()
        };
        Ok(self.access.finish(url, width, height))
    }
}
