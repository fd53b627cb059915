// Shared kernel: concerns used by every bounded context.

pub mod config;
pub mod database;
pub mod errors;
pub mod utils;

// Re-exports for convenience
pub use config::Settings;
pub use database::Database;
