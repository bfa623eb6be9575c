use crate::models::{File, NewFile};
use anyhow::Result;
use sqlx::SqlitePool;

const FILE_COLUMNS: &str =
    "id, filename, title, description, keywords, course, file_type, user_id, created_at";

pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_file(&self, file: &NewFile) -> Result<File> {
        let result = sqlx::query_as::<_, File>(&format!(
            "INSERT INTO files (filename, title, description, keywords, course, file_type, user_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {FILE_COLUMNS}",
        ))
        .bind(&file.filename)
        .bind(&file.title)
        .bind(&file.description)
        .bind(&file.keywords)
        .bind(&file.course)
        .bind(&file.file_type)
        .bind(file.user_id)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn get_file(&self, id: i64) -> Result<Option<File>> {
        let file =
            sqlx::query_as::<_, File>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(file)
    }

    pub async fn list_files(&self) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Exact-match filter on the course column, never a substring search.
    pub async fn find_by_course(&self, course: &str) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE course = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(course)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }
}
