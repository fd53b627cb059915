pub mod client;
pub mod dto;
pub mod parse;

pub use client::AniSongDbClient;
pub use dto::{ArtistEntry, SongEntry};
pub use parse::{explode_names, parse_use_type_and_seq};
