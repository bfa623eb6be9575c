pub mod google;
pub mod storage;

pub use google::{GoogleAuthService, GoogleClaims};
pub use storage::{FileStorage, StorageError};
