pub mod catalog;
pub mod importer;
pub mod library;
pub mod provider;
pub mod sync;
