pub mod domain;
pub mod infrastructure;

pub use domain::{
    Anime, AnimeFields, CatalogRepository, CreditRole, LinkUsage, NewPerson, People, PeopleKind,
    PersonPatch, Song, SongAnimeLink, SongUseType,
};
pub use infrastructure::CatalogRepositoryImpl;
