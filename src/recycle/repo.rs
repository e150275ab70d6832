use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::ApiError;
use crate::recycle::dto::{CreateBoxRequest, UpdateBoxRequest};

/// Points credited to the depositor by a rewarded deposit.
pub const POINTS_PER_BOTTLE: i64 = 100;

/// A physical deposit container with a bounded fill count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecycleBox {
    pub id: i64,
    pub title: String,
    pub address: String,
    pub capacity: i64,
    pub count: i64,
}

const BOX_COLUMNS: &str = "id, title, address, capacity, count";

pub async fn get(db: &SqlitePool, id: i64) -> Result<RecycleBox, ApiError> {
    sqlx::query_as::<_, RecycleBox>(&format!(
        "SELECT {BOX_COLUMNS} FROM recycle_boxes WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(ApiError::NotFound)
}

pub async fn insert(db: &SqlitePool, dto: &CreateBoxRequest) -> Result<RecycleBox, ApiError> {
    let result =
        sqlx::query("INSERT INTO recycle_boxes(title, address, capacity, count) VALUES (?, ?, ?, 0)")
            .bind(&dto.title)
            .bind(&dto.address)
            .bind(dto.capacity)
            .execute(db)
            .await?;
    get(db, result.last_insert_rowid()).await
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    dto: &UpdateBoxRequest,
) -> Result<RecycleBox, ApiError> {
    let result = sqlx::query(
        "UPDATE recycle_boxes SET title = ?, address = ?, capacity = ?, count = ? WHERE id = ?",
    )
    .bind(&dto.title)
    .bind(&dto.address)
    .bind(dto.capacity)
    .bind(dto.count)
    .bind(id)
    .execute(db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    get(db, id).await
}

pub async fn flush(db: &SqlitePool, id: i64) -> Result<RecycleBox, ApiError> {
    let result = sqlx::query("UPDATE recycle_boxes SET count = 0 WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    get(db, id).await
}

/// Capacity-bounded increment. The condition inside the UPDATE is what
/// keeps count <= capacity under concurrent deposits; zero affected rows
/// means the box is missing or already full.
pub async fn add_bottle(db: &SqlitePool, id: i64) -> Result<RecycleBox, ApiError> {
    let result =
        sqlx::query("UPDATE recycle_boxes SET count = count + 1 WHERE id = ? AND count < capacity")
            .bind(id)
            .execute(db)
            .await?;
    if result.rows_affected() == 0 {
        get(db, id).await?;
        return Err(ApiError::BoxFull);
    }
    get(db, id).await
}

/// Bounded increment plus the points credit, in one transaction. Either
/// both rows change or neither does.
pub async fn add_bottle_with_points(
    db: &SqlitePool,
    box_id: i64,
    user_id: i64,
) -> Result<RecycleBox, ApiError> {
    let mut tx = db.begin().await?;

    let incremented =
        sqlx::query("UPDATE recycle_boxes SET count = count + 1 WHERE id = ? AND count < capacity")
            .bind(box_id)
            .execute(&mut *tx)
            .await?;
    if incremented.rows_affected() == 0 {
        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recycle_boxes WHERE id = ?")
                .bind(box_id)
                .fetch_one(&mut *tx)
                .await?;
        return Err(if exists == 0 {
            ApiError::NotFound
        } else {
            ApiError::BoxFull
        });
    }

    let credited = sqlx::query("UPDATE users SET points = points + ? WHERE user_id = ?")
        .bind(POINTS_PER_BOTTLE)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if credited.rows_affected() == 0 {
        // Unknown depositor; dropping the transaction rolls the count back.
        return Err(ApiError::NotFound);
    }

    let updated = sqlx::query_as::<_, RecycleBox>(&format!(
        "SELECT {BOX_COLUMNS} FROM recycle_boxes WHERE id = ?"
    ))
    .bind(box_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(updated)
}
