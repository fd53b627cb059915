pub mod catalog_repository_impl;
pub mod models;

pub use catalog_repository_impl::CatalogRepositoryImpl;
