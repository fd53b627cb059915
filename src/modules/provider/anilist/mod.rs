pub mod client;
pub mod dto;
pub mod mapper;
pub mod queries;

pub use client::AniListClient;
pub use dto::Media;
pub use mapper::map_media_to_anime_fields;
