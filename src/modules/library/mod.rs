pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::LibraryService;
pub use domain::{LibraryFilter, Rating, RatingInput};
pub use infrastructure::LibraryRepositoryImpl;
