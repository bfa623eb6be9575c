use anyhow::Result;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState, FileResponse, FilesResponse};
use crate::models::NewFile;
use crate::repositories::{FileRepository, UserRepository};
use crate::services::{FileStorage, StorageError};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
    /// The server-generated stored name, usable with /download/{filename}.
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    pub course: Option<String>,
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/", get(list_files).post(upload_file))
        .route("/{file_id}", get(get_file));

    Ok(router)
}

async fn upload_file(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    // Gather the file part and the metadata fields in one pass
    let mut client_filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut keywords: Option<String> = None;
    let mut course: Option<String> = None;
    let mut file_type: Option<String> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::Validation("Invalid multipart data".to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                client_filename = field.file_name().map(|s| s.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to read file content: {}", e);
                            ApiError::Validation("Failed to read file".to_string())
                        })?
                        .to_vec(),
                );
            }
            "title" => title = Some(read_text_field(field, "title").await?),
            "description" => description = Some(read_text_field(field, "description").await?),
            "keywords" => keywords = Some(read_text_field(field, "keywords").await?),
            "course" => course = Some(read_text_field(field, "course").await?),
            "file_type" => file_type = Some(read_text_field(field, "file_type").await?),
            "user_id" => user_id = Some(read_text_field(field, "user_id").await?),
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::Validation("No file part".to_string()))?;
    let client_filename = client_filename.unwrap_or_default();
    if client_filename.is_empty() {
        return Err(ApiError::Validation("No selected file".to_string()));
    }

    // Metadata is required alongside the binary
    let (Some(title), Some(description), Some(keywords), Some(course), Some(user_id)) =
        (title, description, keywords, course, user_id)
    else {
        return Err(ApiError::MissingFields);
    };
    if title.is_empty() || description.is_empty() || keywords.is_empty() || course.is_empty() {
        return Err(ApiError::MissingFields);
    }

    let user_id: i64 = user_id
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("Invalid user id".to_string()))?;

    // The owner must exist before any metadata row references it
    let user_repo = UserRepository::new(app_state.database.pool().clone());
    if user_repo
        .get_user(user_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
        .is_none()
    {
        return Err(ApiError::Validation("Unknown user".to_string()));
    }

    // Absent file_type falls back to the client filename's extension
    let file_type = match file_type.filter(|t| !t.is_empty()) {
        Some(file_type) => file_type,
        None => derived_file_type(&client_filename),
    };

    // Binary first, metadata row after; a failed insert must not leave a
    // row pointing at nothing
    let stored_name = app_state
        .storage
        .save(&content, &client_filename)
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?;

    let new_file = NewFile {
        filename: stored_name,
        title,
        description,
        keywords,
        course,
        file_type,
        user_id,
    };

    let file_repo = FileRepository::new(app_state.database.pool().clone());
    let file = file_repo
        .create_file(&new_file)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: file.id,
            filename: file.filename,
        }),
    ))
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &'static str,
) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        tracing::error!("Failed to read {} field: {}", name, e);
        ApiError::Validation(format!("Invalid {name}"))
    })
}

/// Lowercased extension of the client filename, "bin" when it has none.
fn derived_file_type(client_filename: &str) -> String {
    std::path::Path::new(client_filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

async fn list_files(
    State(app_state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<FilesResponse>, ApiError> {
    let file_repo = FileRepository::new(app_state.database.pool().clone());

    // ?course= is an exact equality filter, never a substring search
    let files = match query.course.as_deref() {
        Some(course) => file_repo.find_by_course(course).await,
        None => file_repo.list_files().await,
    }
    .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok(Json(FilesResponse::new(files)))
}

async fn get_file(
    State(app_state): State<AppState>,
    Path(file_id): Path<i64>,
) -> Result<Json<FileResponse>, ApiError> {
    let file_repo = FileRepository::new(app_state.database.pool().clone());

    let file = file_repo
        .get_file(file_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
        .ok_or(ApiError::NotFound("File"))?;

    Ok(Json(FileResponse::from(file)))
}

/// GET /download/{filename} - stream a stored file back as an attachment.
///
/// A traversal attempt is answered exactly like a missing file, so the
/// route leaks nothing about the filesystem.
pub async fn download_file(
    State(app_state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !FileStorage::is_safe_name(&filename) {
        return Err(ApiError::NotFound("File"));
    }

    let content = match app_state.storage.load(&filename).await {
        Ok(content) => content,
        Err(StorageError::NotFound(_)) | Err(StorageError::UnsafeName(_)) => {
            return Err(ApiError::NotFound("File"));
        }
        Err(e) => return Err(ApiError::Storage(e.to_string())),
    };

    // Determine content type from the stored name
    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response)
}

/// Content-Disposition value that cannot inject headers: control characters
/// stripped, quotes and backslashes neutralized, RFC 5987 `filename*` for
/// anything beyond plain ASCII.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}
