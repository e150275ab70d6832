use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("parse database url")?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(pool)
}

/// Create the tables on boot if they are missing.
pub async fn create_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users(
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL DEFAULT '',
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            phone_number TEXT NOT NULL DEFAULT '',
            birth_date TEXT NOT NULL DEFAULT '',
            points INTEGER NOT NULL DEFAULT 0,
            role TEXT NOT NULL CHECK (role IN ('admin', 'user')) DEFAULT 'user'
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recycle_boxes(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            address TEXT NOT NULL,
            capacity INTEGER NOT NULL,
            count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}
