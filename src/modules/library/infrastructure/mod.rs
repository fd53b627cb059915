pub mod library_repository_impl;
pub mod models;

pub use library_repository_impl::LibraryRepositoryImpl;
