//! Pure reconciliation logic over AniSongDB rows.
//!
//! Everything here is side-effect free so the row handling rules can be
//! tested without a database or network.

use std::collections::HashSet;

use crate::modules::catalog::domain::{Anime, SongUseType};
use crate::modules::provider::anisongdb::{explode_names, parse_use_type_and_seq, SongEntry};

/// A feed row normalized into the pieces the import pipeline stores.
#[derive(Debug, Clone)]
pub struct PreparedRow {
    pub title: String,
    pub use_type: SongUseType,
    pub sequence: Option<i32>,
    pub notes: String,
    pub audio: String,
    pub is_dub: bool,
    pub is_rebroadcast: bool,
    pub amq_song_id: Option<i32>,
}

/// Normalizes one feed row. Returns `None` for rows without a usable
/// title or with a song type outside OP/ED/IN.
pub fn prepare_row(entry: &SongEntry) -> Option<PreparedRow> {
    let title = entry.title()?.to_string();
    let song_type_raw = entry.song_type.as_deref().filter(|s| !s.is_empty())?;

    let (use_type, sequence) = parse_use_type_and_seq(Some(song_type_raw));
    let use_type = use_type?;

    Some(PreparedRow {
        title,
        use_type,
        sequence,
        notes: format!("imported from AniSongDB: {}", song_type_raw),
        audio: entry.best_audio().unwrap_or_default().to_string(),
        is_dub: entry.is_dub.unwrap_or(false),
        is_rebroadcast: entry.is_rebroadcast.unwrap_or(false),
        amq_song_id: entry.amq_song_id.and_then(|id| i32::try_from(id).ok()),
    })
}

/// Dedupe key for feed rows: the same usage is often reported several
/// times across mirrors of a search.
pub fn row_key(entry: &SongEntry) -> (Option<String>, Option<String>, Option<i64>) {
    (
        entry.title().map(str::to_string),
        entry.song_type.clone(),
        entry.ann_song_id,
    )
}

/// Drops duplicate rows, keeping first occurrence order.
pub fn dedupe_rows(entries: Vec<SongEntry>) -> Vec<SongEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(row_key(e)))
        .collect()
}

/// Guard for title-based search results: only trust a hit when an
/// external id matches, or failing that when one of the titles does.
pub fn row_matches_anime(entry: &SongEntry, anime: &Anime) -> bool {
    for provider in ["myanimelist", "anilist"] {
        if let (Some(db_id), Some(row_id)) = (anime.linked_id(provider), entry.linked_id(provider))
        {
            if db_id == row_id {
                return true;
            }
        }
    }

    let titles: HashSet<String> = [&anime.title_en, &anime.title_romaji, &anime.title_jp]
        .into_iter()
        .flatten()
        .map(|t| t.to_lowercase())
        .collect();

    let mut names: Vec<String> = [&entry.anime_en_name, &entry.anime_jp_name]
        .into_iter()
        .flatten()
        .map(|t| t.to_lowercase())
        .collect();
    if let Some(alts) = &entry.anime_alt_names {
        names.extend(alts.iter().map(|t| t.to_lowercase()));
    }

    names.iter().any(|n| titles.contains(n))
}

/// Credit names for one role, preferring the structured artist array and
/// falling back to exploding the combined string.
pub fn credit_names<'a>(
    structured: &'a [crate::modules::provider::anisongdb::ArtistEntry],
    combined: Option<&str>,
) -> Vec<String> {
    let from_objects: Vec<String> = structured
        .iter()
        .filter_map(|a| a.primary_name().map(str::to_string))
        .collect();

    if !from_objects.is_empty() {
        from_objects
    } else {
        explode_names(combined)
    }
}

/// Splits an AniSongDB vintage label (`"Spring 1998"`) into season and year.
pub fn parse_vintage(vintage: Option<&str>) -> (Option<String>, Option<i32>) {
    let Some(vintage) = vintage else {
        return (None, None);
    };

    let mut season = None;
    let mut year = None;
    for token in vintage.split_whitespace() {
        match token {
            "Winter" | "Spring" | "Summer" | "Fall" => season = Some(token.to_string()),
            _ => {
                if year.is_none() {
                    year = token.parse::<i32>().ok().filter(|y| (1900..=2100).contains(y));
                }
            }
        }
    }
    (season, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{Map, Value};
    use uuid::Uuid;

    fn entry(json: &str) -> SongEntry {
        serde_json::from_str(json).unwrap()
    }

    fn anime_with(title_en: Option<&str>, linked: &[(&str, i64)]) -> Anime {
        let mut linked_ids = Map::new();
        for (k, v) in linked {
            linked_ids.insert(k.to_string(), Value::from(*v));
        }
        Anime {
            id: Uuid::new_v4(),
            title_en: title_en.map(str::to_string),
            title_jp: None,
            title_romaji: None,
            season: None,
            year: None,
            anime_type: None,
            cover_image_url: None,
            linked_ids,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn prepare_row_requires_title_and_known_type() {
        assert!(prepare_row(&entry(r#"{"songType":"OP 1"}"#)).is_none());
        assert!(prepare_row(&entry(r#"{"songName":"X","songType":"Character Song"}"#)).is_none());

        let row = prepare_row(&entry(
            r#"{"songName":"X","songType":"Opening 2","HQ":"x.webm","isDub":true}"#,
        ))
        .unwrap();
        assert_eq!(row.use_type, SongUseType::Op);
        assert_eq!(row.sequence, Some(2));
        assert_eq!(row.audio, "x.webm");
        assert!(row.is_dub);
        assert_eq!(row.notes, "imported from AniSongDB: Opening 2");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let rows = vec![
            entry(r#"{"songName":"A","songType":"OP 1","annSongId":1,"audio":"first.mp3"}"#),
            entry(r#"{"songName":"A","songType":"OP 1","annSongId":1,"audio":"second.mp3"}"#),
            entry(r#"{"songName":"A","songType":"ED 1","annSongId":2}"#),
        ];
        let deduped = dedupe_rows(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].audio.as_deref(), Some("first.mp3"));
    }

    #[test]
    fn matches_by_external_id_over_title() {
        let anime = anime_with(Some("Cowboy Bebop"), &[("myanimelist", 1)]);
        let hit = entry(r#"{"animeENName":"Something Else","linked_ids":{"myanimelist":"1"}}"#);
        assert!(row_matches_anime(&hit, &anime));

        let miss = entry(r#"{"animeENName":"Something Else","linked_ids":{"myanimelist":2}}"#);
        assert!(!row_matches_anime(&miss, &anime));
    }

    #[test]
    fn matches_by_any_title_when_ids_absent() {
        let anime = anime_with(Some("Cowboy Bebop"), &[]);
        assert!(row_matches_anime(
            &entry(r#"{"animeAltName":["COWBOY BEBOP"]}"#),
            &anime
        ));
        assert!(!row_matches_anime(&entry(r#"{"animeENName":"Trigun"}"#), &anime));
    }

    #[test]
    fn credits_prefer_structured_entries() {
        let e = entry(
            r#"{"artists":[{"id":7,"names":["LiSA"]}],"songArtist":"Somebody Else, Another"}"#,
        );
        assert_eq!(credit_names(&e.artists, e.song_artist.as_deref()), vec!["LiSA"]);

        let e = entry(r#"{"songArtist":"A, B"}"#);
        assert_eq!(credit_names(&e.artists, e.song_artist.as_deref()), vec!["A", "B"]);
    }

    #[test]
    fn vintage_splits_season_and_year() {
        assert_eq!(
            parse_vintage(Some("Spring 1998")),
            (Some("Spring".to_string()), Some(1998))
        );
        assert_eq!(parse_vintage(Some("1998")), (None, Some(1998)));
        assert_eq!(parse_vintage(None), (None, None));
    }
}
