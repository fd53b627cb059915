//! Resume state persistence for the sync drivers.

use tempfile::tempdir;

use utadex::modules::sync::{MasterListState, ScrapeState};

#[test]
fn master_list_state_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state/.sync_state.json");

    let state = MasterListState {
        master_list_id: "12345".to_string(),
        amq_ids: vec![1, 2, 3],
        etag: Some("\"abc\"".to_string()),
        last_modified: Some("Wed, 21 Oct 2015 07:28:00 GMT".to_string()),
        updated_at: 1_700_000_000,
    };
    state.save(&path).expect("save creates parent dirs");

    let loaded = MasterListState::load(&path).expect("load");
    assert_eq!(loaded.master_list_id, "12345");
    assert_eq!(loaded.amq_ids, vec![1, 2, 3]);
    assert_eq!(loaded.etag.as_deref(), Some("\"abc\""));
    assert_eq!(loaded.updated_at, 1_700_000_000);
}

#[test]
fn missing_master_list_state_is_default() {
    let dir = tempdir().expect("tempdir");
    let loaded = MasterListState::load(&dir.path().join("nope.json")).expect("load");
    assert_eq!(loaded.master_list_id, "");
    assert!(loaded.amq_ids.is_empty());
    assert!(loaded.etag.is_none());
}

#[test]
fn corrupt_master_list_state_errors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").expect("write");

    assert!(MasterListState::load(&path).is_err());
}

#[test]
fn scrape_state_accumulates_and_survives_reload() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(".amq_scrape_state.json");

    let mut state = ScrapeState::load(&path);
    assert!(state.done.is_empty());

    state.mark_done(7);
    state.mark_done(3);
    state.mark_done(7);
    state.save(&path).expect("save");

    let reloaded = ScrapeState::load(&path);
    assert_eq!(reloaded.done.len(), 2);
    assert!(reloaded.done.contains(&3));
    assert!(reloaded.done.contains(&7));
}

#[test]
fn unreadable_scrape_state_starts_fresh() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "][").expect("write");

    let state = ScrapeState::load(&path);
    assert!(state.done.is_empty());
}

#[test]
fn legacy_state_field_names_parse() {
    // The state file uses masterListId, matching what earlier tooling wrote.
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    std::fs::write(
        &path,
        r#"{"masterListId": "9", "amq_ids": [5], "etag": null, "last_modified": null, "updated_at": 1}"#,
    )
    .expect("write");

    let loaded = MasterListState::load(&path).expect("load");
    assert_eq!(loaded.master_list_id, "9");
    assert_eq!(loaded.amq_ids, vec![5]);
}
