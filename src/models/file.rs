use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata for an uploaded file. The binary itself lives in `FileStorage`;
/// `filename` is the server-generated storage key, not the client's name.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct File {
    pub id: i64,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub course: String,
    pub file_type: String,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub course: String,
    pub file_type: String,
    pub user_id: i64,
}
