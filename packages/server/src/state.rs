use std::sync::Arc;

use common::storage::Storage;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn Storage>,
    pub config: Arc<AppConfig>,
}

#[cfg(test)]
pub(crate) async fn test_state() -> (AppState, tempfile::TempDir) {
    use crate::config::DatabaseConfig;

    let dir = tempfile::tempdir().expect("temp dir");
    let mut config: AppConfig = AppConfig::defaults()
        .and_then(|b| b.set_override("auth.jwt_secret", "k".repeat(32)))
        .and_then(|b| b.set_override("storage.local.root", dir.path().to_string_lossy().as_ref()))
        .and_then(|b| b.build())
        .and_then(|c| c.try_deserialize())
        .expect("test config");
    config.database = DatabaseConfig::in_memory();

    let db = crate::database::init_db(&config.database)
        .await
        .expect("in-memory database");
    let storage = common::storage::build_storage(&config.storage)
        .await
        .expect("local storage");

    (
        AppState {
            db,
            storage,
            config: Arc::new(config),
        },
        dir,
    )
}
