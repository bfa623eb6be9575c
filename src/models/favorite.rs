use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's bookmark of a file. The (user_id, file_id) pair is unique.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub file_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
