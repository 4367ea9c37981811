// tests/session_store_test.rs — Integration test: session store retention, search, persistence

use chatmosphere::session::storage::{history_key, USERNAME_KEY};
use chatmosphere::session::{
    FileStorage, KeyValueStorage, MemoryStorage, Message, SessionId, SessionStore,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const HOUR: i64 = 60 * 60 * 1000;
const NOW: i64 = 1_760_000_000_000;

fn memory_store() -> SessionStore {
    SessionStore::open(Box::new(MemoryStorage::new()), "User")
}

/// Create a session whose only message is `text` at `at`.
fn seed(store: &mut SessionStore, text: &str, at: i64) -> SessionId {
    let id = store.create_session_at(at);
    store.append_message(id, Message::user(text, at)).unwrap();
    id
}

#[test]
fn test_recent_and_all_partitions() {
    let mut store = memory_store();
    let old = seed(&mut store, "from yesterday", NOW - 25 * HOUR);
    let hour_ago = seed(&mut store, "an hour ago", NOW - HOUR);
    let fresh = seed(&mut store, "just now", NOW);

    let recent: Vec<SessionId> = store.recent_sessions_at(NOW).iter().map(|s| s.id).collect();
    assert_eq!(recent, vec![fresh, hour_ago]);

    let all: Vec<SessionId> = store.all_sessions().iter().map(|s| s.id).collect();
    assert_eq!(all, vec![fresh, hour_ago, old]);
}

#[test]
fn test_all_sessions_orders_by_last_update() {
    let mut store = memory_store();
    let a = seed(&mut store, "first chat", NOW - 2 * HOUR);
    let b = seed(&mut store, "second chat", NOW - HOUR);
    store
        .append_message(a, Message::assistant("late follow-up", NOW))
        .unwrap();

    let all: Vec<SessionId> = store.all_sessions().iter().map(|s| s.id).collect();
    assert_eq!(all, vec![a, b]);
}

#[test]
fn test_updated_at_never_decreases() {
    let mut store = memory_store();
    let id = seed(&mut store, "hello", NOW);
    store
        .append_message(id, Message::assistant("clock skew", NOW - HOUR))
        .unwrap();
    assert_eq!(store.find_by_id(id).unwrap().updated_at, NOW);
}

#[test]
fn test_preview_rules() {
    let mut store = memory_store();
    let short = seed(&mut store, "Short question", NOW);
    let exact = seed(&mut store, &"e".repeat(50), NOW);
    let long_text = "How do I implement a persistent chat history that survives restarts?";
    let long = seed(&mut store, long_text, NOW);

    assert_eq!(store.find_by_id(short).unwrap().preview, "Short question");
    assert_eq!(store.find_by_id(exact).unwrap().preview, "e".repeat(50));
    let expected: String = long_text.chars().take(50).collect::<String>() + "...";
    assert_eq!(store.find_by_id(long).unwrap().preview, expected);
}

#[test]
fn test_preview_comes_from_first_message() {
    let mut store = memory_store();
    let id = seed(&mut store, "Opening line", NOW);
    store
        .append_message(id, Message::assistant("A much later answer", NOW + 1))
        .unwrap();
    assert_eq!(store.find_by_id(id).unwrap().preview, "Opening line");
}

#[test]
fn test_search_blank_matches_all_sessions() {
    let mut store = memory_store();
    seed(&mut store, "alpha", NOW - HOUR);
    seed(&mut store, "beta", NOW);

    let all: Vec<SessionId> = store.all_sessions().iter().map(|s| s.id).collect();
    let blank: Vec<SessionId> = store.search("").iter().map(|s| s.id).collect();
    let spaces: Vec<SessionId> = store.search("   ").iter().map(|s| s.id).collect();
    assert_eq!(blank, all);
    assert_eq!(spaces, all);
}

#[test]
fn test_search_message_text_case_insensitive() {
    let mut store = memory_store();
    let rust = seed(&mut store, "hello", NOW);
    store
        .append_message(rust, Message::assistant("Ownership in RUST explained", NOW + 1))
        .unwrap();
    seed(&mut store, "Something else entirely", NOW);

    let hits: Vec<SessionId> = store.search("rust").iter().map(|s| s.id).collect();
    assert_eq!(hits, vec![rust]);
    assert!(store.search("no such words").is_empty());
}

#[test]
fn test_delete_missing_session_is_noop() {
    let mut store = memory_store();
    let id = seed(&mut store, "keep me", NOW);
    let before: Vec<_> = store.all_sessions().into_iter().cloned().collect();

    store.delete_session(SessionId::new(42));

    let after: Vec<_> = store.all_sessions().into_iter().cloned().collect();
    assert_eq!(before, after);
    assert!(store.find_by_id(id).is_some());
}

#[test]
fn test_delete_session_removes_everywhere() {
    let mut store = memory_store();
    let id = seed(&mut store, "temporary", NOW);
    store.delete_session(id);
    assert!(store.find_by_id(id).is_none());
    assert!(store.all_sessions().is_empty());
    assert!(store.search("temporary").is_empty());
    // again, idempotent
    store.delete_session(id);
}

#[test]
fn test_persist_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");

    let mut store = SessionStore::open(Box::new(FileStorage::open(&path)), "User");
    let a = seed(&mut store, "first", NOW - 2 * HOUR);
    store
        .append_message(a, Message::assistant("reply one", NOW - 2 * HOUR + 5))
        .unwrap();
    seed(&mut store, "second", NOW - HOUR);
    store.persist().unwrap();
    let before: Vec<_> = store.all_sessions().into_iter().cloned().collect();

    let reopened = SessionStore::open(Box::new(FileStorage::open(&path)), "User");
    let after: Vec<_> = reopened.all_sessions().into_iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn test_missing_history_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(
        Box::new(FileStorage::open(dir.path().join("absent.json"))),
        "User",
    );
    assert!(store.all_sessions().is_empty());
}

#[test]
fn test_garbage_history_is_empty() {
    let mut storage = MemoryStorage::new();
    storage
        .set(&history_key("User"), r#"[{"id": 17, "oops": true}]"#.into())
        .unwrap();
    let store = SessionStore::open(Box::new(storage), "User");
    assert!(store.all_sessions().is_empty());
}

#[test]
fn test_switch_identity_swaps_history() {
    let mut store = memory_store();
    let mine = seed(&mut store, "User's chat", NOW);

    store.switch_identity("ada").unwrap();
    assert_eq!(store.identity(), "ada");
    assert!(store.all_sessions().is_empty());
    assert_eq!(store.storage().get(USERNAME_KEY).as_deref(), Some("ada"));
    let hers = seed(&mut store, "Ada's chat", NOW);

    store.switch_identity("User").unwrap();
    let ids: Vec<SessionId> = store.all_sessions().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![mine]);

    store.switch_identity("ada").unwrap();
    let ids: Vec<SessionId> = store.all_sessions().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![hers]);
}

#[test]
fn test_ids_unique_across_identities() {
    let mut store = memory_store();
    let a = seed(&mut store, "one", NOW);
    store.switch_identity("ada").unwrap();
    let b = seed(&mut store, "two", NOW);
    assert_ne!(a, b);
}
