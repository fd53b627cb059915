pub mod modules;
pub mod schema;
pub mod shared;

pub use shared::errors::{AppError, AppResult};
pub use shared::{Database, Settings};
