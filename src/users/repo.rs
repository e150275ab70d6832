use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, SqlitePool};

use crate::auth::claims::Role;
use crate::error::ApiError;

/// User record. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    #[sqlx(rename = "user_id")]
    #[serde(rename = "user_id")]
    pub id: i64,
    pub email: String,
    pub username: String,
    #[sqlx(rename = "password")]
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone_number: String,
    pub birth_date: String,
    pub points: i64,
    pub role: Role,
}

/// The columns needed to check a login attempt.
#[derive(Debug, FromRow)]
pub struct AuthRow {
    #[sqlx(rename = "user_id")]
    pub id: i64,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub role: Role,
}

/// Fields a settings update may touch; `password_hash` is already hashed
/// by the service.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<String>,
}

const USER_COLUMNS: &str =
    "user_id, email, username, password, phone_number, birth_date, points, role";

pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn auth_by_email(db: &SqlitePool, email: &str) -> Result<Option<AuthRow>, ApiError> {
    let row = sqlx::query_as::<_, AuthRow>(
        "SELECT user_id, password, role FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Insert a new account with the default role and zero points. Returns the
/// assigned id.
pub async fn insert(db: &SqlitePool, email: &str, password_hash: &str) -> Result<i64, ApiError> {
    let result = sqlx::query("INSERT INTO users(email, password) VALUES (?, ?)")
        .bind(email)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Write only the fields that differ from the stored row. No difference at
/// all means there is nothing to update.
pub async fn apply_update(
    db: &SqlitePool,
    current: &User,
    changes: &UserChanges,
) -> Result<(), ApiError> {
    let mut sets: Vec<(&str, &str)> = Vec::new();
    if let Some(email) = changes.email.as_deref() {
        if email != current.email {
            sets.push(("email", email));
        }
    }
    if let Some(username) = changes.username.as_deref() {
        if username != current.username {
            sets.push(("username", username));
        }
    }
    if let Some(hash) = changes.password_hash.as_deref() {
        if hash != current.password_hash {
            sets.push(("password", hash));
        }
    }
    if let Some(phone) = changes.phone_number.as_deref() {
        if phone != current.phone_number {
            sets.push(("phone_number", phone));
        }
    }
    if let Some(birth) = changes.birth_date.as_deref() {
        if birth != current.birth_date {
            sets.push(("birth_date", birth));
        }
    }

    if sets.is_empty() {
        return Err(ApiError::NothingToUpdate);
    }

    let mut builder = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");
    for (column, value) in sets {
        separated.push(format!("{column} = "));
        separated.push_bind_unseparated(value.to_owned());
    }
    builder.push(" WHERE user_id = ").push_bind(current.id);
    builder.build().execute(db).await?;
    Ok(())
}
