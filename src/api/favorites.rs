use anyhow::Result;
use axum::{
    extract::State,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState, MessageResponse};
use crate::repositories::{FavoriteRepository, FileRepository, UserRepository};

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteRequest {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub file_id: i64,
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new().route("/", post(add_favorite));

    Ok(router)
}

async fn add_favorite(
    State(app_state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Both referents must exist; the schema's foreign keys back this up
    let user_repo = UserRepository::new(app_state.database.pool().clone());
    if user_repo
        .get_user(req.user_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
        .is_none()
    {
        return Err(ApiError::Validation("Unknown user".to_string()));
    }

    let file_repo = FileRepository::new(app_state.database.pool().clone());
    if file_repo
        .get_file(req.file_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
        .is_none()
    {
        return Err(ApiError::Validation("Unknown file".to_string()));
    }

    // Re-favoriting the same file is a no-op success
    let favorite_repo = FavoriteRepository::new(app_state.database.pool().clone());
    favorite_repo
        .add_favorite(req.user_id, req.file_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok(Json(MessageResponse::new("Favorite added")))
}
