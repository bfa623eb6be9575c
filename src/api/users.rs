use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::{ApiError, AppState, FilesResponse, MessageResponse};
use crate::auth::{hash_password, verify_password};
use crate::models::{NewUser, User};
use crate::repositories::{FavoriteRepository, FileRepository, UserRepository};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    #[serde(default, rename = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub token: String,
}

/// What login and google-login answer: just enough identity for a client
/// to act as this user afterwards.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/google-login", post(google_login))
        .route("/{user_id}/files", get(list_user_files))
        .route("/{user_id}/favorites", get(list_user_favorites));

    Ok(router)
}

/// True when the database refused the row over a UNIQUE constraint. The
/// find-then-insert checks race under concurrent requests for the same
/// email; the schema constraint decides the loser, and this classifies it.
fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

async fn register(
    State(app_state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    // All four fields are required
    if req.email.is_empty()
        || req.password.is_empty()
        || req.first_name.is_empty()
        || req.last_name.is_empty()
    {
        return Err(ApiError::MissingFields);
    }

    // Validate request
    req.validate()
        .map_err(|_| ApiError::Validation("Invalid email address".to_string()))?;

    let user_repo = UserRepository::new(app_state.database.pool().clone());

    // Check if email already exists
    if user_repo
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
        .is_some()
    {
        return Err(ApiError::EmailTaken);
    }

    // Hash password
    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    // Create new user
    let new_user = NewUser {
        email: req.email,
        password_hash: Some(password_hash),
        first_name: req.first_name,
        last_name: req.last_name,
    };

    user_repo.create_user(&new_user).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::EmailTaken
        } else {
            ApiError::Database(e.to_string())
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

async fn login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_repo = UserRepository::new(app_state.database.pool().clone());

    // Find user by email
    let user = user_repo
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
        .ok_or(ApiError::InvalidCredentials)?;

    // Google-only accounts carry no hash and can never password-login
    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    let is_valid =
        verify_password(&req.password, password_hash).map_err(|_| ApiError::InvalidCredentials)?;

    if !is_valid {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(UserResponse::from(user)))
}

async fn google_login(
    State(app_state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if req.token.is_empty() {
        return Err(ApiError::InvalidToken);
    }

    // Verify the token with Google before touching the database
    let claims = app_state
        .google
        .verify_id_token(&req.token)
        .await
        .map_err(|e| {
            tracing::warn!("Google token verification failed: {}", e);
            ApiError::InvalidToken
        })?;

    let user_repo = UserRepository::new(app_state.database.pool().clone());

    // Find or create the local account keyed by the verified email
    let user = match user_repo
        .find_by_email(&claims.email)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?
    {
        Some(user) => user,
        None => {
            let new_user = NewUser {
                email: claims.email,
                password_hash: None,
                first_name: claims.given_name,
                last_name: claims.family_name,
            };

            match user_repo.create_user(&new_user).await {
                Ok(user) => user,
                // A concurrent first login for this email won the insert;
                // the upsert stays idempotent by returning the winner's row
                Err(e) if is_unique_violation(&e) => user_repo
                    .find_by_email(&new_user.email)
                    .await
                    .map_err(|e| ApiError::Database(e.to_string()))?
                    .ok_or_else(|| {
                        ApiError::Database(format!("user {} missing after insert", new_user.email))
                    })?,
                Err(e) => return Err(ApiError::Database(e.to_string())),
            }
        }
    };

    Ok(Json(UserResponse::from(user)))
}

async fn list_user_files(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<FilesResponse>, ApiError> {
    let file_repo = FileRepository::new(app_state.database.pool().clone());

    let files = file_repo
        .find_by_user(user_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok(Json(FilesResponse::new(files)))
}

async fn list_user_favorites(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<FilesResponse>, ApiError> {
    let favorite_repo = FavoriteRepository::new(app_state.database.pool().clone());

    let files = favorite_repo
        .files_for_user(user_id)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok(Json(FilesResponse::new(files)))
}
