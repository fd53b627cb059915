pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{
    linked_id_as_i64, Anime, AnimeFields, LinkUsage, NewPerson, People, PersonPatch, Song,
    SongAnimeLink,
};
pub use repository::CatalogRepository;
pub use value_objects::{CreditRole, PeopleKind, SongUseType};
