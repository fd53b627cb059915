//! Library service behavior against mocked storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use uuid::Uuid;

use utadex::modules::catalog::domain::{
    Anime, AnimeFields, CatalogRepository, CreditRole, LinkUsage, NewPerson, People, PersonPatch,
    Song, SongAnimeLink,
};
use utadex::modules::library::domain::{
    rating_id, LibraryFilter, LibraryRepository, Rating, RatingInput,
};
use utadex::modules::library::LibraryService;
use utadex::{AppError, AppResult};

mock! {
    CatalogRepo {}

    #[async_trait]
    impl CatalogRepository for CatalogRepo {
        async fn find_anime(&self, id: Uuid) -> AppResult<Option<Anime>>;
        async fn find_anime_by_linked_id(&self, provider: &str, id: i64) -> AppResult<Option<Anime>>;
        async fn find_anime_by_title(&self, title: &str) -> AppResult<Option<Anime>>;
        async fn insert_anime(&self, fields: AnimeFields) -> AppResult<Anime>;
        async fn update_anime(&self, id: Uuid, fields: AnimeFields) -> AppResult<Anime>;
        async fn find_song(&self, id: Uuid) -> AppResult<Option<Song>>;
        async fn find_song_by_name(&self, name: &str) -> AppResult<Option<Song>>;
        async fn find_song_by_amq_id(&self, amq_song_id: i32) -> AppResult<Option<Song>>;
        async fn insert_song(&self, name: &str, audio: &str, amq_song_id: Option<i32>) -> AppResult<Song>;
        async fn set_song_audio(&self, song_id: Uuid, audio: &str) -> AppResult<()>;
        async fn set_song_amq_id(&self, song_id: Uuid, amq_song_id: i32) -> AppResult<()>;
        async fn songs_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<Song>>;
        async fn anime_has_songs(&self, anime_id: Uuid) -> AppResult<bool>;
        async fn links_for_anime(&self, anime_id: Uuid) -> AppResult<Vec<SongAnimeLink>>;
        async fn find_person_by_name(&self, primary_name: &str) -> AppResult<Option<People>>;
        async fn find_person_by_anisongdb_id(&self, anisongdb_id: i32) -> AppResult<Option<People>>;
        async fn insert_person(&self, person: NewPerson) -> AppResult<People>;
        async fn update_person(&self, id: Uuid, patch: PersonPatch) -> AppResult<People>;
        async fn add_membership(&self, group_id: Uuid, member_id: Uuid) -> AppResult<()>;
        async fn credited_people_for_songs(&self, song_ids: &[Uuid]) -> AppResult<Vec<People>>;
        async fn ensure_credit(&self, song_id: Uuid, people_id: Uuid, role: CreditRole) -> AppResult<()>;
        async fn upsert_link(&self, usage: LinkUsage) -> AppResult<()>;
    }
}

mock! {
    LibraryRepo {}

    #[async_trait]
    impl LibraryRepository for LibraryRepo {
        async fn upsert(&self, user_id: Uuid, song_id: Uuid, input: RatingInput) -> AppResult<Rating>;
        async fn find(&self, user_id: Uuid, song_id: Uuid) -> AppResult<Option<Rating>>;
        async fn list(&self, user_id: Uuid, filter: LibraryFilter) -> AppResult<Vec<Rating>>;
        async fn remove(&self, user_id: Uuid, song_id: Uuid) -> AppResult<bool>;
    }
}

fn song(amq_song_id: Option<i32>) -> Song {
    Song {
        id: Uuid::new_v4(),
        name: "Unravel".to_string(),
        audio: "unravel.mp3".to_string(),
        amq_song_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn rating(user_id: Uuid, song_id: Uuid, input: &RatingInput) -> Rating {
    Rating {
        id: rating_id(user_id, song_id),
        user_id,
        song_id,
        amq_song_id: input.amq_song_id,
        score: input.score,
        is_favorite: input.is_favorite,
        note: input.note.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn service(catalog: MockCatalogRepo, library: MockLibraryRepo) -> LibraryService {
    LibraryService::new(Arc::new(library), Arc::new(catalog))
}

#[tokio::test]
async fn out_of_range_score_is_rejected_before_any_lookup() {
    let mut catalog = MockCatalogRepo::new();
    let mut library = MockLibraryRepo::new();
    catalog.expect_find_song().times(0);
    library.expect_upsert().times(0);

    let svc = service(catalog, library);
    let err = svc
        .upsert_rating(Uuid::new_v4(), Uuid::new_v4(), 101, false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn rating_an_unknown_song_is_not_found() {
    let mut catalog = MockCatalogRepo::new();
    let mut library = MockLibraryRepo::new();
    catalog.expect_find_song().returning(|_| Ok(None));
    library.expect_upsert().times(0);

    let svc = service(catalog, library);
    let err = svc
        .upsert_rating(Uuid::new_v4(), Uuid::new_v4(), 80, false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn upsert_denormalizes_the_songs_amq_id() {
    let mut catalog = MockCatalogRepo::new();
    let mut library = MockLibraryRepo::new();
    let the_song = song(Some(4444));
    let song_id = the_song.id;

    catalog
        .expect_find_song()
        .returning(move |_| Ok(Some(the_song.clone())));
    library
        .expect_upsert()
        .withf(|_, _, input| input.amq_song_id == Some(4444) && input.score == 95)
        .times(1)
        .returning(|user, song, input| Ok(rating(user, song, &input)));

    let svc = service(catalog, library);
    let got = svc
        .upsert_rating(Uuid::new_v4(), song_id, 95, true, Some("banger".to_string()))
        .await
        .unwrap();
    assert_eq!(got.amq_song_id, Some(4444));
    assert!(got.is_favorite);
}

#[tokio::test]
async fn removing_a_missing_rating_is_not_found() {
    let catalog = MockCatalogRepo::new();
    let mut library = MockLibraryRepo::new();
    library.expect_remove().returning(|_, _| Ok(false));

    let svc = service(catalog, library);
    let err = svc
        .remove_rating(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn list_rejects_an_out_of_range_min_score_filter() {
    let catalog = MockCatalogRepo::new();
    let mut library = MockLibraryRepo::new();
    library.expect_list().times(0);

    let svc = service(catalog, library);
    let filter = LibraryFilter {
        min_score: Some(-5),
        ..LibraryFilter::default()
    };
    let err = svc.list_library(Uuid::new_v4(), filter).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn get_rating_surfaces_the_stored_entry() {
    let catalog = MockCatalogRepo::new();
    let mut library = MockLibraryRepo::new();
    let user_id = Uuid::new_v4();
    let song_id = Uuid::new_v4();
    let input = RatingInput {
        score: 70,
        is_favorite: false,
        note: None,
        amq_song_id: None,
    };
    let stored = rating(user_id, song_id, &input);

    library
        .expect_find()
        .returning(move |_, _| Ok(Some(stored.clone())));

    let svc = service(catalog, library);
    let got = svc.get_rating(user_id, song_id).await.unwrap();
    assert_eq!(got.id, rating_id(user_id, song_id));
    assert_eq!(got.score, 70);
}
