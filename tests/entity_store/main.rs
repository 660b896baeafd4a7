//! Integration tests for the generic EntityStore.


use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use entity_store::{
    EntitiesExt, EntityStore, InMemoryKv, KvBackend, KvError, SharedKv, StoreError, TimeoutKv,
    ValidationError, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use support::{CountingKv, FlakyKv, Note, SlowKv, Tag};

fn notes() -> (InMemoryKv, EntityStore<Note>) {
    let kv = InMemoryKv::new();
    let shared: SharedKv = Arc::new(kv.clone());
    (kv, shared.entities::<Note>())
}

async fn insert_notes(store: &EntityStore<Note>, count: usize) {
    for i in 0..count {
        store
            .create(Note::new(&format!("note-{:03}", i), "body"))
            .await
            .unwrap();
    }
}

async fn collect_ids(store: &EntityStore<Note>, page_size: usize) -> (Vec<String>, Vec<usize>) {
    let mut ids = Vec::new();
    let mut sizes = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = store.list(cursor.as_deref(), Some(page_size)).await.unwrap();
        sizes.push(page.items.len());
        ids.extend(page.items.into_iter().map(|n| n.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    (ids, sizes)
}

// ============================================================================
// create / get
// ============================================================================

#[tokio::test]
async fn create_then_get_round_trips() {
    let (_, store) = notes();
    let note = Note::new("a", "hello");

    let created = store.create(note.clone()).await.unwrap();
    assert_eq!(created, note);

    let loaded = store.get("a").await.unwrap();
    assert_eq!(loaded, Some(note));
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
    let (_, store) = notes();
    store.create(Note::new("a", "original")).await.unwrap();

    let err = store.create(Note::new("a", "replacement")).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Conflict {
            prefix: "note",
            id: "a".into()
        }
    );

    let stored = store.get("a").await.unwrap().unwrap();
    assert_eq!(stored.body, "original");
}

#[tokio::test]
async fn create_validates_before_touching_backend() {
    let kv = CountingKv::default();
    let store = EntityStore::<Note>::new(Arc::new(kv.clone()));

    let err = store.create(Note::new("a", "   ")).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Validation(ValidationError::EmptyField {
            prefix: "note",
            field: "body"
        })
    );

    let err = store.create(Note::new("", "body")).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Validation(ValidationError::EmptyId { prefix: "note" })
    );

    assert_eq!(kv.calls(), 0);
}

#[tokio::test]
async fn get_missing_is_none_not_error() {
    let (_, store) = notes();
    assert_eq!(store.get("ghost").await.unwrap(), None);
    assert!(!store.exists("ghost").await.unwrap());

    store.create(Note::new("real", "x")).await.unwrap();
    assert!(store.exists("real").await.unwrap());
}

#[tokio::test]
async fn require_reports_not_found() {
    let (_, store) = notes();
    let err = store.require("ghost").await.unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            prefix: "note",
            id: "ghost".into()
        }
    );
}

#[tokio::test]
async fn save_overwrites() {
    let (_, store) = notes();
    store.create(Note::new("a", "v1")).await.unwrap();
    store.save(&Note::new("a", "v2")).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().unwrap().body, "v2");
}

#[tokio::test]
async fn corrupt_record_surfaces_serde_error() {
    let (kv, store) = notes();
    kv.put("note:bad", b"not json".to_vec()).await.unwrap();

    let err = store.get("bad").await.unwrap_err();
    assert!(matches!(err, StoreError::Serde { ref key, .. } if key == "note:bad"));
}

// ============================================================================
// list
// ============================================================================

#[tokio::test]
async fn pagination_visits_every_entity_once() {
    let (_, store) = notes();
    insert_notes(&store, 37).await;

    let (ids, sizes) = collect_ids(&store, 10).await;
    assert_eq!(sizes, vec![10, 10, 10, 7]);
    assert_eq!(ids.len(), 37);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 37);
}

#[tokio::test]
async fn pagination_is_complete_for_any_page_size() {
    let (_, store) = notes();
    insert_notes(&store, 37).await;

    for page_size in [1, 3, 36, 37, 38, 500] {
        let (ids, _) = collect_ids(&store, page_size).await;
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), 37, "page size {}", page_size);
        assert_eq!(unique.len(), 37, "page size {}", page_size);
    }
}

#[tokio::test]
async fn exact_multiple_of_page_size_ends_cleanly() {
    let (_, store) = notes();
    insert_notes(&store, 20).await;

    let (ids, sizes) = collect_ids(&store, 10).await;
    assert_eq!(ids.len(), 20);
    // the second page is full but still the last one
    assert_eq!(sizes, vec![10, 10]);
}

#[tokio::test]
async fn list_preserves_key_order() {
    let (_, store) = notes();
    for id in ["c", "a", "b"] {
        store.create(Note::new(id, "x")).await.unwrap();
    }

    let page = store.list(None, None).await.unwrap();
    let ids: Vec<_> = page.items.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(page.is_last());
}

#[tokio::test]
async fn list_empty_collection() {
    let (_, store) = notes();
    let page = store.list(None, Some(5)).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn list_uses_default_and_max_page_size() {
    let (_, store) = notes();
    insert_notes(&store, MAX_PAGE_SIZE + 5).await;

    let page = store.list(None, None).await.unwrap();
    assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
    assert!(page.next_cursor.is_some());

    let page = store.list(None, Some(MAX_PAGE_SIZE * 10)).await.unwrap();
    assert_eq!(page.items.len(), MAX_PAGE_SIZE);
    assert!(page.next_cursor.is_some());
}

#[tokio::test]
async fn list_rejects_zero_limit() {
    let (_, store) = notes();
    let err = store.list(None, Some(0)).await.unwrap_err();
    assert_eq!(err, StoreError::Validation(ValidationError::ZeroLimit));
}

#[tokio::test]
async fn list_rejects_malformed_cursor() {
    let (_, store) = notes();
    insert_notes(&store, 3).await;

    let err = store.list(Some("%%%not-a-cursor"), None).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCursor(_)));
}

#[tokio::test]
async fn cursor_from_other_entity_type_is_rejected() {
    let kv: SharedKv = Arc::new(InMemoryKv::new());
    let notes = kv.entities::<Note>();
    let tags = kv.entities::<Tag>();

    for slug in ["x", "y"] {
        tags.create(Tag { slug: slug.into() }).await.unwrap();
    }
    let tag_page = tags.list(None, Some(1)).await.unwrap();
    let tag_cursor = tag_page.next_cursor.unwrap();

    let err = notes.list(Some(&tag_cursor), None).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCursor(_)));
}

#[tokio::test]
async fn entity_types_do_not_share_listings() {
    let kv: SharedKv = Arc::new(InMemoryKv::new());
    let notes = kv.entities::<Note>();
    let tags = kv.entities::<Tag>();

    notes.create(Note::new("same", "note")).await.unwrap();
    tags.create(Tag { slug: "same".into() }).await.unwrap();
    notes.ensure_seed().await.unwrap();

    let tag_page = tags.list(None, None).await.unwrap();
    assert_eq!(tag_page.items, vec![Tag { slug: "same".into() }]);

    // seed marker lives outside the note prefix
    let note_page = notes.list(None, None).await.unwrap();
    assert_eq!(note_page.items.len(), 4);
}

#[tokio::test]
async fn cursor_survives_deletion_of_its_anchor() {
    let (_, store) = notes();
    insert_notes(&store, 5).await;

    let first = store.list(None, Some(2)).await.unwrap();
    let anchor = first.items.last().unwrap().id.clone();
    store.delete(&anchor).await.unwrap();

    let rest = store
        .list(first.next_cursor.as_deref(), Some(10))
        .await
        .unwrap();
    let ids: Vec<_> = rest.items.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["note-002", "note-003", "note-004"]);
}

// ============================================================================
// delete / delete_many
// ============================================================================

#[tokio::test]
async fn delete_is_idempotent() {
    let (_, store) = notes();
    store.create(Note::new("a", "x")).await.unwrap();

    assert!(store.delete("a").await.unwrap());
    assert!(!store.delete("a").await.unwrap());
    assert!(!store.delete("never-existed").await.unwrap());
    assert_eq!(store.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn delete_many_counts_only_present_ids() {
    let (_, store) = notes();
    for id in ["a", "b", "c"] {
        store.create(Note::new(id, "x")).await.unwrap();
    }
    store.delete("b").await.unwrap();

    let removed = store.delete_many(["a", "b", "c"]).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.get("a").await.unwrap(), None);
    assert_eq!(store.get("c").await.unwrap(), None);
}

#[tokio::test]
async fn delete_many_counts_duplicates_once() {
    let (_, store) = notes();
    store.create(Note::new("a", "x")).await.unwrap();

    let removed = store.delete_many(vec!["a".to_string(), "a".to_string()]).await.unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn delete_many_keeps_going_after_backend_failure() {
    let flaky = FlakyKv {
        failing_deletes: HashSet::from(["note:b".to_string()]),
        ..FlakyKv::default()
    };
    let store = EntityStore::<Note>::new(Arc::new(flaky.clone()));
    for id in ["a", "b", "c"] {
        store.create(Note::new(id, "x")).await.unwrap();
    }

    let err = store.delete_many(["a", "b", "c"]).await.unwrap_err();
    match err {
        StoreError::BulkDelete {
            deleted,
            attempted,
            failures,
        } => {
            assert_eq!(deleted, 2);
            assert_eq!(attempted, 3);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, "b");
            assert!(matches!(
                failures[0].1,
                StoreError::Backend(KvError::Unavailable(_))
            ));
        }
        other => panic!("expected BulkDelete, got {:?}", other),
    }

    // no rollback: the successful deletes stay deleted
    assert_eq!(store.get("a").await.unwrap(), None);
    assert_eq!(store.get("c").await.unwrap(), None);
    assert!(store.get("b").await.unwrap().is_some());
}

// ============================================================================
// ensure_seed
// ============================================================================

#[tokio::test]
async fn ensure_seed_writes_default_dataset() {
    let (_, store) = notes();
    store.ensure_seed().await.unwrap();

    let page = store.list(None, None).await.unwrap();
    let ids: Vec<_> = page.items.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n1", "n2", "n3"]);
}

#[tokio::test]
async fn ensure_seed_twice_equals_once() {
    let kv = CountingKv::default();
    let store = EntityStore::<Note>::new(Arc::new(kv.clone()));

    store.ensure_seed().await.unwrap();
    let after_first = store.list(None, None).await.unwrap();
    let writes = kv.writes();
    let stored_keys = kv.inner.len();

    store.ensure_seed().await.unwrap();
    let after_second = store.list(None, None).await.unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(kv.writes(), writes);
    assert_eq!(kv.inner.len(), stored_keys);
}

#[tokio::test]
async fn ensure_seed_keeps_existing_records() {
    let (_, store) = notes();
    store.create(Note::new("n1", "mine")).await.unwrap();

    store.ensure_seed().await.unwrap();

    assert_eq!(store.get("n1").await.unwrap().unwrap().body, "mine");
    assert_eq!(store.list(None, None).await.unwrap().items.len(), 3);
}

#[tokio::test]
async fn ensure_seed_does_not_restore_deleted_seed_data() {
    let (_, store) = notes();
    store.ensure_seed().await.unwrap();
    store.delete("n2").await.unwrap();

    store.ensure_seed().await.unwrap();
    assert_eq!(store.get("n2").await.unwrap(), None);
}

#[tokio::test]
async fn seed_marker_is_persisted_in_backend() {
    let kv = InMemoryKv::new();
    let first: SharedKv = Arc::new(kv.clone());
    first.entities::<Note>().ensure_seed().await.unwrap();
    first.entities::<Note>().delete_many(["n1", "n2", "n3"]).await.unwrap();

    // a fresh process on the same backend sees the marker
    let second: SharedKv = Arc::new(kv.clone());
    second.entities::<Note>().ensure_seed().await.unwrap();
    assert!(second.entities::<Note>().list(None, None).await.unwrap().items.is_empty());
    assert!(kv
        .get(&EntityStore::<Note>::seed_marker())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_seeding_writes_each_record_once() {
    let (kv, store) = notes();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.ensure_seed().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let page = store.list(None, None).await.unwrap();
    assert_eq!(page.items.len(), 3);
    // three records plus the marker
    assert_eq!(kv.len(), 4);
}

// ============================================================================
// backend failures
// ============================================================================

#[tokio::test]
async fn backend_timeout_propagates_as_backend_error() {
    let slow = SlowKv {
        delay: Duration::from_millis(200),
        ..SlowKv::default()
    };
    let kv = TimeoutKv::new(slow, Duration::from_millis(10));
    let store = EntityStore::<Note>::new(Arc::new(kv));

    let err = store.get("a").await.unwrap_err();
    match err {
        StoreError::Backend(kv_err) => assert!(kv_err.is_timeout()),
        other => panic!("expected backend timeout, got {:?}", other),
    }
}
