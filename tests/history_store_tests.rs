use clipsage::storage::{FileStore, KeyValueStore, MemoryStore};
use clipsage::store::{HistoryStore, StoreConfig, STORAGE_KEY};
use tracing_test::traced_test;

fn memory_store(limit: usize, persist: bool) -> (HistoryStore, MemoryStore) {
    let slots = MemoryStore::new();
    let store = HistoryStore::new(StoreConfig { limit, persist }, Box::new(slots.clone()));
    (store, slots)
}

#[test]
fn test_add_keeps_newest_first() {
    let (mut store, _) = memory_store(10, false);

    store.add("first");
    store.add("second");

    let history = store.history();
    assert_eq!(history.len(), 2, "Expected 2 items, got {}", history.len());
    assert_eq!(history[0].text, "second", "Newest item should be at the head");
    assert_eq!(history[1].text, "first");
    assert_ne!(history[0].id, history[1].id, "Items should get distinct ids");
}

#[test]
fn test_add_evicts_oldest_beyond_limit() {
    let (mut store, _) = memory_store(3, false);

    store.add("First");
    store.add("Second");
    store.add("Third");
    store.add("Fourth");

    let texts: Vec<&str> = store.history().iter().map(|i| i.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Fourth", "Third", "Second"],
        "Adding past the limit should evict from the tail"
    );
}

#[test]
fn test_add_suppresses_consecutive_duplicate() {
    let (mut store, _) = memory_store(10, false);

    let first = store.add("x");
    let second = store.add("x");

    assert_eq!(store.len(), 1, "Duplicate of the head should not be added");
    assert_eq!(second.id, first.id, "Duplicate add should return the existing head");
}

#[test]
fn test_add_allows_non_adjacent_duplicate() {
    let (mut store, _) = memory_store(10, false);

    store.add("x");
    store.add("y");
    store.add("x");

    assert_eq!(store.len(), 3, "Duplicate suppression is head-only, not global");
}

#[test]
fn test_add_accepts_empty_string() {
    let (mut store, _) = memory_store(10, false);

    store.add("");

    assert_eq!(store.len(), 1);
    assert_eq!(store.history()[0].text, "");
}

#[test]
fn test_remove_filters_by_id() {
    let (mut store, _) = memory_store(10, false);

    let keep = store.add("keep");
    let doomed = store.add("doomed");

    store.remove(&doomed.id);
    assert_eq!(store.len(), 1);
    assert_eq!(store.history()[0].id, keep.id);

    store.remove("no-such-id");
    assert_eq!(store.len(), 1, "Removing an unknown id should be a no-op");
}

#[test]
fn test_get_finds_item_by_id() {
    let (mut store, _) = memory_store(10, false);

    let item = store.add("findable");

    assert_eq!(store.get(&item.id).map(|i| i.text.as_str()), Some("findable"));
    assert!(store.get("no-such-id").is_none());
}

#[test]
fn test_clear_empties_collection_and_deletes_slot() {
    let (mut store, slots) = memory_store(10, true);

    store.add("something");
    assert!(
        slots
            .get(STORAGE_KEY)
            .unwrap_or_else(|e| panic!("Failed to read slot: {:?}", e))
            .is_some(),
        "Adding should have persisted the collection"
    );

    store.clear();

    assert!(store.is_empty());
    assert!(
        slots
            .get(STORAGE_KEY)
            .unwrap_or_else(|e| panic!("Failed to read slot: {:?}", e))
            .is_none(),
        "Clearing should delete the slot, not write an empty collection"
    );
}

#[test]
fn test_reload_from_persisted_slot() {
    let slots = MemoryStore::new();

    {
        let mut store = HistoryStore::new(StoreConfig::default(), Box::new(slots.clone()));
        store.add("carried over");
        store.add("also carried");
    }

    let reloaded = HistoryStore::new(StoreConfig::default(), Box::new(slots));
    let texts: Vec<&str> = reloaded.history().iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["also carried", "carried over"]);
}

#[traced_test]
#[test]
fn test_malformed_slot_falls_back_to_empty() {
    let slots = MemoryStore::new();
    slots
        .set(STORAGE_KEY, "not valid json {{{")
        .unwrap_or_else(|e| panic!("Failed to seed slot: {:?}", e));

    let store = HistoryStore::new(StoreConfig::default(), Box::new(slots));

    assert!(store.is_empty(), "Malformed data should be treated as absent");
    assert!(logs_contain("Discarding malformed history slot"));
}

#[test]
fn test_minimal_records_decode_with_defaults() {
    let slots = MemoryStore::new();
    slots
        .set(
            STORAGE_KEY,
            r#"[{"id":"a","text":"bare","timestamp":1}]"#,
        )
        .unwrap_or_else(|e| panic!("Failed to seed slot: {:?}", e));

    let store = HistoryStore::new(StoreConfig::default(), Box::new(slots));

    assert_eq!(store.len(), 1);
    let item = &store.history()[0];
    assert_eq!(item.category, None);
    assert!(item.tags.is_empty());
    assert!(!item.favorite);
}

#[test]
fn test_tag_operations() {
    let (mut store, _) = memory_store(10, false);
    let item = store.add("tagged");

    store.add_tag(&item.id, "code");
    store.add_tag(&item.id, "code");
    store.add_tag(&item.id, "rust");
    assert_eq!(
        store.history()[0].tags,
        vec!["code", "rust"],
        "Tags should stay unique within an item"
    );

    store.remove_tag(&item.id, "code");
    assert_eq!(store.history()[0].tags, vec!["rust"]);

    store.add_tag("no-such-id", "ghost");
    store.remove_tag("no-such-id", "ghost");
    assert_eq!(store.history()[0].tags, vec!["rust"]);
}

#[test]
fn test_category_and_favorite() {
    let (mut store, _) = memory_store(10, false);
    let item = store.add("entry");

    store.set_category(&item.id, "work");
    assert_eq!(store.history()[0].category.as_deref(), Some("work"));

    store.set_category(&item.id, "personal");
    assert_eq!(
        store.history()[0].category.as_deref(),
        Some("personal"),
        "Setting a category should overwrite the previous one"
    );

    store.toggle_favorite(&item.id);
    assert!(store.history()[0].favorite);
    store.toggle_favorite(&item.id);
    assert!(!store.history()[0].favorite);

    store.set_category("no-such-id", "ghost");
    store.toggle_favorite("no-such-id");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_categories_are_unique_in_first_seen_order() {
    let (mut store, _) = memory_store(10, false);
    let a = store.add("a");
    let b = store.add("b");
    let c = store.add("c");

    store.set_category(&a.id, "work");
    store.set_category(&b.id, "personal");
    store.set_category(&c.id, "work");

    // Head-first: c ("work") is seen before b ("personal").
    assert_eq!(store.categories(), vec!["work", "personal"]);
}

#[test]
fn test_filtered_matches_text_and_tags_case_insensitively() {
    let (mut store, _) = memory_store(10, false);
    let hello = store.add("Hello World");
    store.add("unrelated");
    let tagged = store.add("something else");
    store.add_tag(&tagged.id, "WorldWide");

    let matches = store.filtered(Some("world"), None);
    let ids: Vec<&str> = matches.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![tagged.id.as_str(), hello.id.as_str()],
        "Query should match text or tags, newest first"
    );
}

#[test]
fn test_filtered_applies_category_and_query_conjunctively() {
    let (mut store, _) = memory_store(10, false);
    let a = store.add("alpha report");
    let b = store.add("alpha note");
    store.add("beta report");
    store.set_category(&a.id, "work");
    store.set_category(&b.id, "personal");

    let matches = store.filtered(Some("alpha"), Some("work"));
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, a.id);

    let everything = store.filtered(None, None);
    assert_eq!(everything.len(), 3, "No filters should project everything");
}

#[test]
fn test_export_import_round_trip() {
    let (mut store, _) = memory_store(10, false);
    let item = store.add("round");
    store.add("trip");
    store.add_tag(&item.id, "exported");
    store.set_category(&item.id, "tests");
    store.toggle_favorite(&item.id);

    let exported = store
        .export_history()
        .unwrap_or_else(|e| panic!("Failed to export: {:?}", e));

    let (mut other, _) = memory_store(10, false);
    other.import_history(&exported);

    assert_eq!(
        other.history(),
        store.history(),
        "Import of an export should reproduce an equivalent collection"
    );
}

#[test]
fn test_import_rejects_non_array_json() {
    let (mut store, _) = memory_store(10, false);
    store.add("existing");

    store.import_history(r#"{"not":"an array"}"#);
    store.import_history("definitely not json");

    assert_eq!(store.len(), 1, "Malformed imports should leave the collection unchanged");
    assert_eq!(store.history()[0].text, "existing");
}

#[test]
fn test_import_bypasses_limit_until_next_add() {
    let (mut donor, _) = memory_store(10, false);
    for i in 0..5 {
        donor.add(&format!("item-{}", i));
    }
    let exported = donor
        .export_history()
        .unwrap_or_else(|e| panic!("Failed to export: {:?}", e));

    let (mut store, _) = memory_store(2, false);
    store.import_history(&exported);
    assert_eq!(store.len(), 5, "Import does not re-truncate to the limit");

    store.add("fresh");
    assert_eq!(store.len(), 2, "The next add re-establishes the bound");
    assert_eq!(store.history()[0].text, "fresh");
}

#[test]
fn test_export_file_name_pattern() {
    let name = HistoryStore::export_file_name();
    assert!(
        name.starts_with("clipboard-history-") && name.ends_with(".json"),
        "Unexpected export file name: {}",
        name
    );
}

#[test]
fn test_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("Failed to create tempdir: {:?}", e));

    {
        let storage = FileStore::new(dir.path().to_path_buf());
        let mut store = HistoryStore::new(StoreConfig::default(), Box::new(storage));
        store.add("on disk");
    }

    let storage = FileStore::new(dir.path().to_path_buf());
    let reloaded = HistoryStore::new(StoreConfig::default(), Box::new(storage));
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.history()[0].text, "on disk");
}

#[test]
fn test_file_store_clear_removes_slot_file() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("Failed to create tempdir: {:?}", e));
    let slot_file = dir.path().join(format!("{}.json", STORAGE_KEY));

    let storage = FileStore::new(dir.path().to_path_buf());
    let mut store = HistoryStore::new(StoreConfig::default(), Box::new(storage));

    store.add("ephemeral");
    assert!(slot_file.exists(), "Adding should create the slot file");

    store.clear();
    assert!(!slot_file.exists(), "Clearing should delete the slot file");
}
