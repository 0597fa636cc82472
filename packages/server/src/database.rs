use std::path::Path;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

use crate::config::DatabaseConfig;
use crate::entity::{album, anniversary, entity_file, file, moment, place, setting, user, wish};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    ensure_sqlite_dir(&config.url)?;

    let mut opt = ConnectOptions::new(config.url.clone());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(opt).await?;
    create_schema(&db).await?;

    Ok(db)
}

/// Create every table and index that does not exist yet. `files` precedes
/// `entity_files`, which references it.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, file::Entity).await?;
    create_table(db, album::Entity).await?;
    create_table(db, moment::Entity).await?;
    create_table(db, place::Entity).await?;
    create_table(db, wish::Entity).await?;
    create_table(db, anniversary::Entity).await?;
    create_table(db, setting::Entity).await?;
    create_table(db, entity_file::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }
    Ok(())
}

/// SQLite refuses to create a database file in a missing directory.
fn ensure_sqlite_dir(url: &str) -> Result<(), DbErr> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .map_err(|e| DbErr::Custom(format!("cannot create {}: {e}", dir.display()))),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) async fn test_db() -> DatabaseConnection {
    init_db(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database")
}
