use crate::models::{Favorite, File};
use anyhow::Result;
use sqlx::SqlitePool;

pub struct FavoriteRepository {
    pool: SqlitePool,
}

impl FavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a favorite. Returns `None` when the (user, file) pair was
    /// already present; the UNIQUE constraint makes the insert idempotent.
    pub async fn add_favorite(&self, user_id: i64, file_id: i64) -> Result<Option<Favorite>> {
        let favorite = sqlx::query_as::<_, Favorite>(
            "INSERT OR IGNORE INTO favorites (user_id, file_id, created_at) \
             VALUES (?, ?, ?) \
             RETURNING id, user_id, file_id, created_at",
        )
        .bind(user_id)
        .bind(file_id)
        .bind(chrono::Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite)
    }

    /// Full metadata of every file a user has favorited, newest bookmark first.
    pub async fn files_for_user(&self, user_id: i64) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(
            "SELECT f.id, f.filename, f.title, f.description, f.keywords, f.course, \
                    f.file_type, f.user_id, f.created_at \
             FROM files f \
             INNER JOIN favorites fav ON fav.file_id = f.id \
             WHERE fav.user_id = ? \
             ORDER BY fav.created_at DESC, fav.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }
}
