pub mod errors;
pub mod favorites;
pub mod files;
pub mod users;

use anyhow::Result;
use axum::{
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::database::Database;
use crate::models::File;
use crate::services::{FileStorage, GoogleAuthService};

pub use errors::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub storage: FileStorage,
    pub google: GoogleAuthService,
    pub config: AppConfig,
}

/// Assembles every route of the public surface. The caller owns the
/// cross-cutting layers (CORS, tracing, body limit) and the state.
pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/api/saludo", get(saludo_handler))
        .route("/download/{filename}", get(files::download_file))
        .nest("/users", users::create_router().await?)
        .nest("/files", files::create_router().await?)
        .nest("/favorites", favorites::create_router().await?);

    Ok(router)
}

async fn saludo_handler() -> Json<Value> {
    Json(json!({ "mensaje": "¡Hola desde el backend!" }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Wire shape of one file's metadata; identical in listings and detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
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

impl From<File> for FileResponse {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            filename: file.filename,
            title: file.title,
            description: file.description,
            keywords: file.keywords,
            course: file.course,
            file_type: file.file_type,
            user_id: file.user_id,
            created_at: file.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesResponse {
    pub files: Vec<FileResponse>,
}

impl FilesResponse {
    pub fn new(files: Vec<File>) -> Self {
        Self {
            files: files.into_iter().map(FileResponse::from).collect(),
        }
    }
}
