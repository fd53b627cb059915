//! Wire types for the AMQ library master list.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// The master list document. Only the fields the sync drivers need are
/// modelled; the rest of the (large) payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MasterList {
    #[serde(rename = "masterListId")]
    pub master_list_id: Value,
    #[serde(rename = "animeMap")]
    pub anime_map: HashMap<String, MasterAnime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MasterAnime {
    #[serde(rename = "songLinks")]
    pub song_links: SongLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongLinks {
    #[serde(rename = "OP")]
    pub op: Vec<SongLink>,
    #[serde(rename = "ED")]
    pub ed: Vec<SongLink>,
    #[serde(rename = "INS")]
    pub ins: Vec<SongLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongLink {
    #[serde(rename = "songId")]
    pub song_id: Option<i64>,
}

impl MasterList {
    /// Master list version as a string, however the feed typed it.
    pub fn version(&self) -> String {
        match &self.master_list_id {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Every distinct AMQ song id across all anime and usage kinds, sorted.
    pub fn unique_song_ids(&self) -> Vec<i64> {
        let mut ids = BTreeSet::new();
        for anime in self.anime_map.values() {
            for link in anime
                .song_links
                .op
                .iter()
                .chain(&anime.song_links.ed)
                .chain(&anime.song_links.ins)
            {
                if let Some(id) = link.song_id {
                    ids.insert(id);
                }
            }
        }
        ids.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_unique_sorted_ids() {
        let master: MasterList = serde_json::from_str(
            r#"{
              "masterListId": 42,
              "animeMap": {
                "1": {"songLinks": {"OP": [{"songId": 5}, {"songId": 3}], "ED": [{"songId": 5}]}},
                "2": {"songLinks": {"INS": [{"songId": 1}, {}]}}
              }
            }"#,
        )
        .unwrap();

        assert_eq!(master.version(), "42");
        assert_eq!(master.unique_song_ids(), vec![1, 3, 5]);
    }

    #[test]
    fn tolerates_string_master_id_and_empty_map() {
        let master: MasterList =
            serde_json::from_str(r#"{"masterListId": "v7", "animeMap": {}}"#).unwrap();
        assert_eq!(master.version(), "v7");
        assert!(master.unique_song_ids().is_empty());
    }
}
