use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::database::Database;
use crate::services::{FileStorage, GoogleAuthService};

static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Create an isolated in-memory SQLite database with the real migrations
/// applied. Shared cache keeps the database alive across the pool's
/// single connection.
pub async fn create_test_database() -> Result<Database> {
    let counter = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let url = format!("file:test_db_{}?mode=memory&cache=shared", counter);

    // SQLite in-memory works best with a single connection
    Database::new(&url, 1).await
}

/// Full application state over a fresh database and a throwaway upload
/// directory. The Google verifier points at a dead endpoint; use
/// `create_test_state_with_google` when a test needs to stub it.
pub async fn create_test_state() -> Result<AppState> {
    create_test_state_with_google("http://127.0.0.1:9/tokeninfo", "test-client-id").await
}

pub async fn create_test_state_with_google(
    tokeninfo_url: &str,
    client_id: &str,
) -> Result<AppState> {
    let database = create_test_database().await?;

    let storage_root = std::env::temp_dir().join(format!("apuntes-test-{}", Uuid::new_v4()));
    let storage = FileStorage::new(&storage_root).await?;

    let mut config = AppConfig::new()?;
    config.storage.upload_dir = storage_root.to_string_lossy().into_owned();
    config.google.client_id = client_id.to_string();
    config.google.tokeninfo_url = tokeninfo_url.to_string();

    let google = GoogleAuthService::new(
        config.google.client_id.clone(),
        config.google.tokeninfo_url.clone(),
    );

    Ok(AppState {
        database,
        storage,
        google,
        config,
    })
}
