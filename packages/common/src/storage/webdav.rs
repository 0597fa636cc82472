use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::TryStreamExt;
use http::header::AUTHORIZATION;
use object_store::http::{HttpBuilder, HttpStore};
use object_store::path::Path as ObjectPath;
use object_store::{
    ClientOptions, Error as ObjectStoreError, HeaderMap, HeaderValue, ObjectStoreExt, PutPayload,
};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use url::Url;

use super::access::AccessPolicy;
use super::error::StorageError;
use super::traits::{BoxReader, ProxyUrlBuilder, Storage};

const BACKEND: &str = "webdav";

#[derive(Debug, Clone, Deserialize)]
pub struct WebDavConfig {
    pub endpoint: String,
    /// Directory on the server that holds every stored file.
    #[serde(default)]
    pub base_path: String,
    /// Base URL clients use to fetch files directly when the proxy is off.
    #[serde(default)]
    pub public_base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl WebDavConfig {
    fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }
}

/// WebDAV server accessed over plain HTTP verbs.
pub struct WebDavStorage {
    store: HttpStore,
    config: WebDavConfig,
    access: AccessPolicy,
}

impl WebDavStorage {
    pub fn new(config: WebDavConfig, access: AccessPolicy) -> Result<Self, StorageError> {
        let root = join_url(&config.endpoint, &config.base_path, "")?;

        let mut options = ClientOptions::new().with_allow_http(root.scheme() == "http");
        if let Some((user, pass)) = config.credentials() {
            let token = STANDARD.encode(format!("{user}:{pass}"));
            let mut value = HeaderValue::from_str(&format!("Basic {token}"))
                .map_err(|e| StorageError::Config(e.to_string()))?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, value);
            options = options.with_default_headers(headers);
        }

        let store = HttpBuilder::new()
            .with_url(root.as_str())
            .with_client_options(options)
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            store,
            config,
            access,
        })
    }

    /// Direct URL: `public_base_url/base_path/path`, with credentials in the
    /// user-info part when both are configured.
    fn public_url(&self, path: &str) -> Result<String, StorageError> {
        if self.config.public_base_url.trim().is_empty() {
            return Err(StorageError::Config(
                "webdav public_base_url is required when the proxy is disabled".into(),
            ));
        }

        let mut url = join_url(&self.config.public_base_url, &self.config.base_path, path)?;
        if let Some((user, pass)) = self.config.credentials() {
            url.set_username(user)
                .and_then(|_| url.set_password(Some(pass)))
                .map_err(|_| StorageError::Config("public_base_url cannot carry credentials".into()))?;
        }
        Ok(url.to_string())
    }
}

fn join_url(base: &str, dir: &str, path: &str) -> Result<Url, StorageError> {
    let mut url = Url::parse(base.trim()).map_err(|e| StorageError::Config(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| StorageError::Config(format!("{base} cannot be a base URL")))?;
        segments.pop_if_empty();
        segments.extend(
            dir.split('/')
                .chain(path.split('/'))
                .filter(|s| !s.is_empty() && *s != "."),
        );
    }
    Ok(url)
}

fn map_error(path: &str, err: ObjectStoreError) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(path.to_string()),
        other => StorageError::backend(BACKEND, other),
    }
}

#[async_trait]
impl Storage for WebDavStorage {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn save(&self, path: &str, mut reader: BoxReader) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;

        // Missing collections are created by the HTTP store on a 409 reply.
        self.store
            .put(&ObjectPath::from(path), PutPayload::from(buf))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, path, "WebDAV upload failed");
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
            self.public_url(path)?
        };
        Ok(self.access.finish(url, width, height))
    }
}
