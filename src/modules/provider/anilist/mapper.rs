//! Maps AniList media payloads onto catalog anime fields.

use serde_json::{Map, Value};

use super::dto::Media;
use crate::modules::catalog::domain::AnimeFields;

/// AniList season enums stored in title case.
fn map_season(season: &str) -> Option<String> {
    match season {
        "WINTER" => Some("Winter".to_string()),
        "SPRING" => Some("Spring".to_string()),
        "SUMMER" => Some("Summer".to_string()),
        "FALL" => Some("Fall".to_string()),
        _ => None,
    }
}

/// Flattens an AniList `Media` node into the column set the catalog stores.
///
/// External ids land in `linked_ids` under `anilist` and `myanimelist`;
/// synonyms ride along in the same map for title matching later.
pub fn map_media_to_anime_fields(media: &Media) -> AnimeFields {
    let mut linked = Map::new();
    linked.insert("anilist".to_string(), Value::from(media.id));
    if let Some(mal) = media.id_mal {
        linked.insert("myanimelist".to_string(), Value::from(mal));
    }
    if !media.synonyms.is_empty() {
        linked.insert(
            "synonyms".to_string(),
            Value::Array(media.synonyms.iter().cloned().map(Value::String).collect()),
        );
    }

    let title = media.title.as_ref();
    let cover = media.cover_image.as_ref();

    AnimeFields {
        title_en: title.and_then(|t| t.english.clone()),
        title_jp: title.and_then(|t| t.native.clone()),
        title_romaji: title.and_then(|t| t.romaji.clone()),
        season: media.season.as_deref().and_then(map_season),
        year: media.season_year,
        anime_type: media.format.clone(),
        cover_image_url: cover.and_then(|c| {
            c.extra_large
                .clone()
                .or_else(|| c.large.clone())
                .or_else(|| c.medium.clone())
        }),
        linked_ids: linked,
    }
}
