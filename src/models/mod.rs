pub mod favorite;
pub mod file;
pub mod user;

pub use favorite::*;
pub use file::*;
pub use user::*;
