//! Entity resolution: finds or creates catalog rows so repeated imports
//! converge on the same entities instead of multiplying them.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::modules::catalog::domain::{
    Anime, AnimeFields, CatalogRepository, NewPerson, People, PeopleKind, PersonPatch, Song,
};
use crate::modules::provider::anisongdb::{ArtistEntry, SongEntry};
use crate::shared::errors::AppResult;

use super::reconciler::parse_vintage;

/// Merges incoming external ids over the existing map. Existing keys the
/// incoming map doesn't mention are preserved, never clobbered.
pub fn merge_linked_ids(
    existing: &Map<String, Value>,
    incoming: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = existing.clone();
    for (k, v) in incoming {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

pub struct EntityResolver {
    repo: Arc<dyn CatalogRepository>,
}

impl EntityResolver {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    /// Idempotent anime upsert keyed on the `anilist` linked id: existing
    /// rows are refreshed in place with merged external ids.
    pub async fn upsert_anime_by_anilist_id(
        &self,
        anilist_id: i64,
        mut fields: AnimeFields,
    ) -> AppResult<Anime> {
        match self.repo.find_anime_by_linked_id("anilist", anilist_id).await? {
            Some(existing) => {
                fields.linked_ids = merge_linked_ids(&existing.linked_ids, &fields.linked_ids);
                self.repo.update_anime(existing.id, fields).await
            }
            None => self.repo.insert_anime(fields).await,
        }
    }

    /// Resolves the anime an AniSongDB row belongs to, trying MAL then
    /// AniList external ids, then the row's titles, and creating a minimal
    /// row from the feed's own metadata when nothing is known yet.
    pub async fn resolve_anime_for_row(&self, entry: &SongEntry) -> AppResult<Anime> {
        for provider in ["myanimelist", "anilist"] {
            if let Some(id) = entry.linked_id(provider) {
                if let Some(anime) = self.repo.find_anime_by_linked_id(provider, id).await? {
                    return Ok(anime);
                }
            }
        }

        // Rows carrying no usable external id must still converge on one
        // row across re-runs, so fall back to the titles the feed names.
        let mut titles: Vec<&str> = [&entry.anime_en_name, &entry.anime_jp_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if let Some(alts) = &entry.anime_alt_names {
            titles.extend(alts.iter().map(String::as_str));
        }
        for title in titles.into_iter().filter(|t| !t.is_empty()) {
            if let Some(anime) = self.repo.find_anime_by_title(title).await? {
                return Ok(anime);
            }
        }

        let (season, year) = parse_vintage(entry.anime_vintage.as_deref());
        let fields = AnimeFields {
            title_en: entry.anime_en_name.clone(),
            title_jp: entry.anime_jp_name.clone(),
            title_romaji: None,
            season,
            year,
            anime_type: entry.anime_type.clone(),
            cover_image_url: None,
            linked_ids: entry.linked_ids.clone(),
        };
        self.repo.insert_anime(fields).await
    }

    /// Finds a song by AMQ id or name, creating it when neither matches.
    /// Backfills the audio URL on an existing row only when the row has
    /// none; a known URL is never replaced.
    pub async fn get_or_create_song(
        &self,
        name: &str,
        audio: &str,
        amq_song_id: Option<i32>,
    ) -> AppResult<Song> {
        let existing = match amq_song_id {
            Some(amq_id) => match self.repo.find_song_by_amq_id(amq_id).await? {
                Some(song) => Some(song),
                None => self.repo.find_song_by_name(name).await?,
            },
            None => self.repo.find_song_by_name(name).await?,
        };
        if let Some(mut song) = existing {
            if song.audio.is_empty() && !audio.is_empty() {
                self.repo.set_song_audio(song.id, audio).await?;
                song.audio = audio.to_string();
            }
            if song.amq_song_id.is_none() {
                if let Some(amq_id) = amq_song_id {
                    self.repo.set_song_amq_id(song.id, amq_id).await?;
                    song.amq_song_id = Some(amq_id);
                }
            }
            return Ok(song);
        }

        self.repo.insert_song(name, audio, amq_song_id).await
    }

    /// Finds a person by primary name or creates a bare person row.
    pub async fn get_or_create_person(&self, name: &str) -> AppResult<People> {
        if let Some(person) = self.repo.find_person_by_name(name).await? {
            return Ok(person);
        }
        self.repo.insert_person(NewPerson::person(name)).await
    }

    /// Upserts a person (or group) from a structured AniSongDB credit,
    /// recording the remote id, merging alternate names, and wiring group
    /// members.
    pub async fn upsert_person_from_artist_entry(
        &self,
        artist: &ArtistEntry,
    ) -> AppResult<Option<People>> {
        let Some(primary_name) = artist.primary_name() else {
            return Ok(None);
        };

        let kind = match &artist.members {
            Some(members) if !members.is_empty() => PeopleKind::Group,
            _ => PeopleKind::Person,
        };
        let anisongdb_id = artist.id.and_then(|id| i32::try_from(id).ok());

        // Prefer the remote id for identity; fall back to the name.
        let existing = match anisongdb_id {
            Some(id) => match self.repo.find_person_by_anisongdb_id(id).await? {
                Some(p) => Some(p),
                None => self.repo.find_person_by_name(primary_name).await?,
            },
            None => self.repo.find_person_by_name(primary_name).await?,
        };

        let person = match existing {
            Some(existing) => {
                let mut patch = PersonPatch::default();
                if existing.anisongdb_id.is_none() && anisongdb_id.is_some() {
                    patch.anisongdb_id = anisongdb_id;
                }
                if existing.kind == PeopleKind::Person && kind == PeopleKind::Group {
                    patch.kind = Some(PeopleKind::Group);
                }

                let merged = merge_alt_names(&existing, &artist.names);
                if merged != existing.alt_names {
                    patch.alt_names = Some(merged);
                }

                if patch.anisongdb_id.is_some()
                    || patch.kind.is_some()
                    || patch.alt_names.is_some()
                {
                    self.repo.update_person(existing.id, patch).await?
                } else {
                    existing
                }
            }
            None => {
                let alt_names: Vec<String> = artist
                    .names
                    .iter()
                    .skip(1)
                    .filter(|n| !n.is_empty())
                    .cloned()
                    .collect();
                self.repo
                    .insert_person(NewPerson {
                        kind,
                        primary_name: primary_name.to_string(),
                        alt_names,
                        image_url: None,
                        external_links: Map::new(),
                        anisongdb_id,
                    })
                    .await?
            }
        };

        if let Some(members) = &artist.members {
            for member in members {
                // Member lists only nest one level in practice.
                if let Some(member_row) = Box::pin(self.upsert_person_from_artist_entry(member)).await? {
                    self.repo.add_membership(person.id, member_row.id).await?;
                }
            }
        }

        Ok(Some(person))
    }
}

/// Alternate names from the feed, minus the primary, deduped against what
/// the row already has (case-insensitive).
fn merge_alt_names(existing: &People, feed_names: &[String]) -> Vec<String> {
    let mut out = existing.alt_names.clone();
    let mut seen: std::collections::HashSet<String> = out.iter().map(|n| n.to_lowercase()).collect();
    seen.insert(existing.primary_name.to_lowercase());

    for name in feed_names.iter().skip(1) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_lowercase()) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_preserves_existing_and_overwrites_collisions() {
        let mut existing = Map::new();
        existing.insert("anilist".into(), Value::from(1));
        existing.insert("synonyms".into(), Value::from(vec!["Old"]));

        let mut incoming = Map::new();
        incoming.insert("myanimelist".into(), Value::from(5));
        incoming.insert("synonyms".into(), Value::from(vec!["New"]));

        let merged = merge_linked_ids(&existing, &incoming);
        assert_eq!(merged.get("anilist"), Some(&Value::from(1)));
        assert_eq!(merged.get("myanimelist"), Some(&Value::from(5)));
        assert_eq!(merged.get("synonyms"), Some(&Value::from(vec!["New"])));
    }
}
