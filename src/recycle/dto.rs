use serde::Deserialize;

/// Request body for creating a recycle box.
#[derive(Debug, Deserialize)]
pub struct CreateBoxRequest {
    pub title: String,
    pub address: String,
    pub capacity: i64,
}

/// Full overwrite of a recycle box; every field is applied, including the
/// current count.
#[derive(Debug, Deserialize)]
pub struct UpdateBoxRequest {
    pub title: String,
    pub address: String,
    pub capacity: i64,
    pub count: i64,
}
