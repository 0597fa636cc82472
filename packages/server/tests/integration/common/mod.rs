use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use serde_json::{Value, json};
use tempfile::TempDir;

use keepsake_server::config::{AppConfig, DatabaseConfig};
use keepsake_server::state::AppState;

pub const PASSWORD: &str = "together";

pub mod routes {
    pub const HEALTH: &str = "/api/v1/health";
    pub const INIT: &str = "/api/v1/system/init";
    pub const INFO: &str = "/api/v1/system/info";
    pub const SITE_SETTINGS: &str = "/api/v1/system/settings/site";
    pub const DASHBOARD: &str = "/api/v1/system/dashboard/stats";
    pub const LOGIN: &str = "/api/v1/user/token";
    pub const ME: &str = "/api/v1/user";
    pub const USERS: &str = "/api/v1/users";
    pub const UPLOAD: &str = "/api/v1/file/upload";
    pub const UNUSED_FILES: &str = "/api/v1/files/unused";
    pub const ALBUMS: &str = "/api/v1/albums";
    pub const MOMENTS: &str = "/api/v1/moments";
    pub const PLACES: &str = "/api/v1/places";
    pub const WISHES: &str = "/api/v1/wishes";
    pub const ANNIVERSARIES: &str = "/api/v1/anniversaries";

    pub fn file(id: i64) -> String {
        format!("/api/v1/file/{id}")
    }

    pub fn album(id: i64) -> String {
        format!("/api/v1/albums/{id}")
    }

    pub fn album_photos(id: i64) -> String {
        format!("/api/v1/albums/{id}/photos")
    }

    pub fn album_photo(id: i64, photo_id: i64) -> String {
        format!("/api/v1/albums/{id}/photos/{photo_id}")
    }

    pub fn album_cover(id: i64) -> String {
        format!("/api/v1/albums/{id}/cover")
    }

    pub fn moment(id: i64) -> String {
        format!("/api/v1/moments/{id}")
    }

    pub fn moment_public(id: i64) -> String {
        format!("/api/v1/moments/{id}/public")
    }

    pub fn moment_like(id: i64) -> String {
        format!("/api/v1/moments/{id}/like")
    }

    pub fn place(id: i64) -> String {
        format!("/api/v1/places/{id}")
    }

    pub fn wish_approve(id: i64) -> String {
        format!("/api/v1/wishes/{id}/approve")
    }

    pub fn user(id: i64) -> String {
        format!("/api/v1/users/{id}")
    }

    pub fn user_avatars(id: i64) -> String {
        format!("/api/v1/users/{id}/avatars")
    }
}

/// A running test server backed by an in-memory SQLite database and a
/// temporary local storage root.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub storage_root: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let storage_root = tempfile::tempdir().expect("Failed to create storage root");

        let mut config: AppConfig = AppConfig::defaults()
            .and_then(|b| b.set_override("auth.jwt_secret", "test-secret-for-integration-tests"))
            .and_then(|b| {
                b.set_override(
                    "storage.local.root",
                    storage_root.path().to_string_lossy().as_ref(),
                )
            })
            .and_then(|b| b.set_override("server.max_upload_size", 1024))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("Failed to build test config");
        config.database = DatabaseConfig::in_memory();

        let db = keepsake_server::database::init_db(&config.database)
            .await
            .expect("Failed to initialize database");
        let storage = ::common::storage::build_storage(&config.storage)
            .await
            .expect("Failed to initialize storage");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        config.server.host_name = addr.to_string();

        let state = AppState {
            db,
            storage,
            config: Arc::new(config),
        };
        let app = keepsake_server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            storage_root,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let res = self
            .authorized(self.client.get(self.url(path)), token)
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let res = self
            .authorized(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let res = self
            .authorized(self.client.put(self.url(path)), token)
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        let res = self
            .authorized(self.client.delete(self.url(path)), token)
            .send()
            .await
            .expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    pub async fn upload(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
        token: Option<&str>,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("path", "album");

        let res = self
            .authorized(self.client.post(self.url(routes::UPLOAD)), token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");
        TestResponse::from_response(res).await
    }

    /// Initialise the site with two accounts and return the token of `bob`.
    pub async fn init_and_login(&self) -> String {
        let res = self
            .post(
                routes::INIT,
                &json!({
                    "siteName": "Our Story",
                    "siteDescription": "since day one",
                    "startDate": "2019-05-20",
                    "userAName": "bob",
                    "userARole": "boy",
                    "userAEmail": "bob@example.com",
                    "userBName": "ann",
                    "userBRole": "girl",
                    "sitePassword": PASSWORD,
                    "sitePasswordConfirm": PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(res.status, 201, "init failed: {}", res.text);
        self.login("bob").await
    }

    pub async fn login(&self, username: &str) -> String {
        let res = self
            .post(
                routes::LOGIN,
                &json!({"username": username, "password": PASSWORD}),
                None,
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);
        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Upload a small PNG-typed file and return its id.
    pub async fn upload_photo(&self, token: &str, bytes: &[u8]) -> i64 {
        let res = self
            .upload("photo.png", "image/png", bytes.to_vec(), Some(token))
            .await;
        assert_eq!(res.status, 201, "upload failed: {}", res.text);
        res.id()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i64 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'")
    }
}
