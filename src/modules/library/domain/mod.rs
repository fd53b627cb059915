pub mod entities;
pub mod repository;

pub use entities::{rating_id, LibraryFilter, Rating, RatingInput};
pub use repository::LibraryRepository;
