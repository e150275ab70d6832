use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        Ok(Self { db, config })
    }

    /// In-memory state for tests. A single connection keeps every query on
    /// the same in-memory database.
    #[cfg(test)]
    pub async fn test() -> Self {
        use crate::config::JwtConfig;
        use sqlx::sqlite::SqlitePoolOptions;

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        db::create_schema(&db).await.expect("schema");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_hours: 24,
            },
        });
        Self { db, config }
    }
}
