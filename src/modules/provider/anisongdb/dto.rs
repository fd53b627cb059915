//! Wire types for AniSongDB responses.
//!
//! The feed is loosely typed: ids sometimes arrive as strings, credit
//! strings and credit arrays coexist, and most fields can be absent.
//! Everything here defaults instead of failing.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One song/anime usage row from AniSongDB.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongEntry {
    #[serde(rename = "annSongId", deserialize_with = "lenient_i64")]
    pub ann_song_id: Option<i64>,
    #[serde(rename = "amqSongId", deserialize_with = "lenient_i64")]
    pub amq_song_id: Option<i64>,

    #[serde(rename = "animeENName")]
    pub anime_en_name: Option<String>,
    #[serde(rename = "animeJPName")]
    pub anime_jp_name: Option<String>,
    #[serde(rename = "animeAltName")]
    pub anime_alt_names: Option<Vec<String>>,
    #[serde(rename = "animeVintage")]
    pub anime_vintage: Option<String>,
    #[serde(rename = "animeType")]
    pub anime_type: Option<String>,

    /// External ids of the anime this usage belongs to (`myanimelist`,
    /// `anilist`), values stored as number or string depending on mood.
    pub linked_ids: Map<String, Value>,

    #[serde(rename = "songType")]
    pub song_type: Option<String>,
    #[serde(rename = "songName")]
    pub song_name: Option<String>,
    /// Some deployments use `name` instead of `songName`.
    pub name: Option<String>,

    #[serde(rename = "songArtist")]
    pub song_artist: Option<String>,
    #[serde(rename = "songComposer")]
    pub song_composer: Option<String>,
    #[serde(rename = "songArranger")]
    pub song_arranger: Option<String>,

    pub artists: Vec<ArtistEntry>,
    pub composers: Vec<ArtistEntry>,
    pub arrangers: Vec<ArtistEntry>,

    #[serde(rename = "HQ")]
    pub hq: Option<String>,
    #[serde(rename = "MQ")]
    pub mq: Option<String>,
    pub audio: Option<String>,

    #[serde(rename = "isDub")]
    pub is_dub: Option<bool>,
    #[serde(rename = "isRebroadcast")]
    pub is_rebroadcast: Option<bool>,
}

impl SongEntry {
    /// Song title, tolerating either field name the feed uses.
    pub fn title(&self) -> Option<&str> {
        self.song_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref().filter(|s| !s.is_empty()))
    }

    /// Best available audio URL: direct audio, then HQ, then MQ video.
    pub fn best_audio(&self) -> Option<&str> {
        [&self.audio, &self.hq, &self.mq]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|s| !s.is_empty()))
    }

    /// External anime id under `key`, whether stored as number or string.
    pub fn linked_id(&self, key: &str) -> Option<i64> {
        crate::modules::catalog::domain::linked_id_as_i64(self.linked_ids.get(key))
    }
}

/// Credit object with resolved AniSongDB artist metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistEntry {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub names: Vec<String>,
    /// Populated for groups; each member is itself an artist entry.
    pub members: Option<Vec<ArtistEntry>>,
    #[serde(rename = "line_up_id")]
    pub line_up_id: Option<i32>,
}

impl ArtistEntry {
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str).filter(|s| !s.is_empty())
    }
}

/// Accepts `7`, `"7"`, or null.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_row() {
        let row: SongEntry = serde_json::from_str(
            r#"{"songName":"Cruel Angel's Thesis","songType":"Opening 1","annSongId":"123"}"#,
        )
        .unwrap();
        assert_eq!(row.title(), Some("Cruel Angel's Thesis"));
        assert_eq!(row.ann_song_id, Some(123));
        assert!(row.artists.is_empty());
        assert_eq!(row.best_audio(), None);
    }

    #[test]
    fn audio_prefers_direct_then_hq() {
        let row: SongEntry =
            serde_json::from_str(r#"{"HQ":"hq.webm","MQ":"mq.webm","audio":"a.mp3"}"#).unwrap();
        assert_eq!(row.best_audio(), Some("a.mp3"));

        let row: SongEntry = serde_json::from_str(r#"{"HQ":"hq.webm","MQ":"mq.webm"}"#).unwrap();
        assert_eq!(row.best_audio(), Some("hq.webm"));
    }

    #[test]
    fn linked_ids_tolerate_string_values() {
        let row: SongEntry =
            serde_json::from_str(r#"{"linked_ids":{"myanimelist":"30","anilist":20}}"#).unwrap();
        assert_eq!(row.linked_id("myanimelist"), Some(30));
        assert_eq!(row.linked_id("anilist"), Some(20));
        assert_eq!(row.linked_id("kitsu"), None);
    }
}
