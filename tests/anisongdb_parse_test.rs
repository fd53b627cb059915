//! Parsing the loosely-typed AniSongDB feed.

use utadex::modules::catalog::SongUseType;
use utadex::modules::provider::anisongdb::{explode_names, parse_use_type_and_seq, SongEntry};

#[test]
fn parses_realistic_feed_row() {
    let row: SongEntry = serde_json::from_str(
        r#"{
          "annSongId": 4210,
          "amqSongId": "17742",
          "animeENName": "Neon Genesis Evangelion",
          "animeJPName": "新世紀エヴァンゲリオン",
          "animeAltName": ["NGE"],
          "animeVintage": "Fall 1995",
          "linked_ids": {"myanimelist": 30, "anilist": "30"},
          "songType": "Opening 1",
          "songName": "Zankoku na Tenshi no These",
          "songArtist": "Yoko Takahashi",
          "artists": [{"id": 318, "names": ["Yoko Takahashi", "高橋洋子"]}],
          "composers": [],
          "arrangers": [],
          "HQ": "ev-op1.webm",
          "audio": "ev-op1.mp3",
          "isDub": false,
          "isRebroadcast": false
        }"#,
    )
    .expect("row parses");

    assert_eq!(row.title(), Some("Zankoku na Tenshi no These"));
    assert_eq!(row.amq_song_id, Some(17742));
    assert_eq!(row.best_audio(), Some("ev-op1.mp3"));
    assert_eq!(row.linked_id("myanimelist"), Some(30));
    assert_eq!(row.linked_id("anilist"), Some(30));
    assert_eq!(row.artists[0].primary_name(), Some("Yoko Takahashi"));

    let (use_type, seq) = parse_use_type_and_seq(row.song_type.as_deref());
    assert_eq!(use_type, Some(SongUseType::Op));
    assert_eq!(seq, Some(1));
}

#[test]
fn song_type_variants_normalize() {
    let cases = [
        ("OP", Some(SongUseType::Op), None),
        ("op 3", Some(SongUseType::Op), Some(3)),
        ("Ending 12", Some(SongUseType::Ed), Some(12)),
        ("ED-2", Some(SongUseType::Ed), Some(2)),
        ("Insert Song", Some(SongUseType::In), None),
        ("insert_7", Some(SongUseType::In), Some(7)),
        ("Character Song 1", None, Some(1)),
    ];
    for (label, want_type, want_seq) in cases {
        let (got_type, got_seq) = parse_use_type_and_seq(Some(label));
        assert_eq!(got_type, want_type, "type for {:?}", label);
        assert_eq!(got_seq, want_seq, "seq for {:?}", label);
    }
}

#[test]
fn name_field_fallback_and_empty_titles() {
    let row: SongEntry = serde_json::from_str(r#"{"name": "fallback title"}"#).unwrap();
    assert_eq!(row.title(), Some("fallback title"));

    let row: SongEntry = serde_json::from_str(r#"{"songName": ""}"#).unwrap();
    assert_eq!(row.title(), None);
}

#[test]
fn explode_names_handles_collab_strings() {
    assert_eq!(
        explode_names(Some("FLOW x GRANRODEO")),
        vec!["FLOW", "GRANRODEO"]
    );
    assert_eq!(
        explode_names(Some("Aimer feat. chelly / aimer")),
        vec!["Aimer", "chelly"]
    );
    assert_eq!(
        explode_names(Some("A, B & C ft. D")),
        vec!["A", "B", "C", "D"]
    );
}

#[test]
fn group_members_nest() {
    let row: SongEntry = serde_json::from_str(
        r#"{
          "artists": [{
            "id": 5,
            "names": ["ClariS"],
            "members": [
              {"id": 6, "names": ["Clara"]},
              {"id": 7, "names": ["Karen"]}
            ]
          }]
        }"#,
    )
    .unwrap();

    let group = &row.artists[0];
    let members = group.members.as_ref().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].primary_name(), Some("Clara"));
    assert_eq!(members[1].id, Some(7));
}
