pub mod favorite_repository;
pub mod file_repository;
pub mod user_repository;

pub use favorite_repository::FavoriteRepository;
pub use file_repository::FileRepository;
pub use user_repository::UserRepository;
