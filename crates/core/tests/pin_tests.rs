// ═══════════════════════════════════════════════════════════════════
// Pin Tests — PinSetManager capacity, removal, overflow, pruning,
// toggle observers and the concurrent read-modify-write limitation
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;

use coin_watch_core::cache::CatalogCache;
use coin_watch_core::errors::CoreError;
use coin_watch_core::models::coin::Coin;
use coin_watch_core::models::pin::{
    AddOutcome, PinEvent, RemoveOutcome, ReplaceOutcome, ToggleOutcome,
};
use coin_watch_core::pins::PinSetManager;
use coin_watch_core::storage::{KeyValueStore, MemoryStore};

const KEY: &str = "Checked IDs";

fn manager() -> (Arc<MemoryStore>, PinSetManager) {
    let store = Arc::new(MemoryStore::new());
    let pins = PinSetManager::new(store.clone(), KEY, 5);
    (store, pins)
}

fn stored(store: &MemoryStore) -> Option<String> {
    store.get(KEY).unwrap()
}

fn fill(pins: &PinSetManager, ids: &[&str]) {
    for id in ids {
        assert_eq!(pins.add(id).unwrap(), AddOutcome::Added);
    }
}

// ═══════════════════════════════════════════════════════════════════
// add / capacity
// ═══════════════════════════════════════════════════════════════════

mod add {
    use super::*;

    #[test]
    fn first_add_persists_single_id() {
        let (store, pins) = manager();
        assert_eq!(pins.add("btc").unwrap(), AddOutcome::Added);
        assert_eq!(stored(&store).as_deref(), Some(r#"["btc"]"#));
    }

    #[test]
    fn sixth_add_is_rejected_and_set_unchanged() {
        let (store, pins) = manager();
        fill(&pins, &["btc", "eth", "xrp", "ada", "dot"]);
        assert_eq!(pins.len().unwrap(), 5);
        let before = stored(&store);

        assert_eq!(pins.add("sol").unwrap(), AddOutcome::AlreadyFull);
        assert_eq!(stored(&store), before);
        assert!(!pins.is_pinned("sol").unwrap());
        assert_eq!(pins.len().unwrap(), 5);
    }

    #[test]
    fn never_exceeds_capacity() {
        let (_, pins) = manager();
        for i in 0..20 {
            let _ = pins.add(&format!("coin-{i}")).unwrap();
            assert!(pins.len().unwrap() <= 5);
        }
        assert_eq!(
            pins.list().unwrap(),
            vec!["coin-0", "coin-1", "coin-2", "coin-3", "coin-4"]
        );
    }

    #[test]
    fn duplicate_add_is_noop() {
        let (_, pins) = manager();
        pins.add("btc").unwrap();
        assert_eq!(pins.add("btc").unwrap(), AddOutcome::NoOp);
        assert_eq!(pins.list().unwrap(), vec!["btc"]);
    }

    #[test]
    fn pinned_id_on_full_set_is_noop_not_full() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c", "d", "e"]);
        assert_eq!(pins.add("c").unwrap(), AddOutcome::NoOp);
    }

    #[test]
    fn try_add_surfaces_capacity_error() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c", "d", "e"]);
        match pins.try_add("f") {
            Err(CoreError::CapacityExceeded { capacity, rejected }) => {
                assert_eq!(capacity, 5);
                assert_eq!(rejected, "f");
            }
            other => panic!("Expected CapacityExceeded, got {:?}", other),
        }
    }

    #[test]
    fn duplicated_legacy_storage_is_deduplicated() {
        let (store, pins) = manager();
        store.set(KEY, r#"["a","a","b"]"#).unwrap();
        assert_eq!(pins.list().unwrap(), vec!["a", "b"]);
        pins.add("c").unwrap();
        assert_eq!(stored(&store).as_deref(), Some(r#"["a","b","c"]"#));
    }

    #[test]
    fn corrupt_storage_is_an_error() {
        let (store, pins) = manager();
        store.set(KEY, "{oops").unwrap();
        assert!(matches!(pins.add("a"), Err(CoreError::Deserialization(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// remove
// ═══════════════════════════════════════════════════════════════════

mod remove {
    use super::*;

    #[test]
    fn removes_present_id() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c"]);
        assert_eq!(pins.remove("b").unwrap(), RemoveOutcome::Removed);
        assert_eq!(pins.list().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn removing_absent_id_is_noop_and_leaves_set() {
        let (store, pins) = manager();
        fill(&pins, &["a", "b"]);
        let before = stored(&store);
        assert_eq!(pins.remove("zzz").unwrap(), RemoveOutcome::NoOp);
        assert_eq!(stored(&store), before);
    }

    #[test]
    fn remove_on_absent_key_normalizes_to_empty_array() {
        let (store, pins) = manager();
        assert_eq!(pins.remove("a").unwrap(), RemoveOutcome::NoOp);
        assert_eq!(stored(&store).as_deref(), Some("[]"));
    }

    #[test]
    fn frees_a_slot() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c", "d", "e"]);
        pins.remove("a").unwrap();
        assert_eq!(pins.add("f").unwrap(), AddOutcome::Added);
        assert_eq!(pins.list().unwrap(), vec!["b", "c", "d", "e", "f"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Overflow prompt / replace / toggle
// ═══════════════════════════════════════════════════════════════════

mod overflow {
    use super::*;

    #[test]
    fn toggle_on_full_set_yields_prompt() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c", "d", "e"]);
        match pins.set_pinned("f", true).unwrap() {
            ToggleOutcome::Overflow(prompt) => {
                assert_eq!(prompt.pinned, vec!["a", "b", "c", "d", "e"]);
                assert_eq!(prompt.candidate, "f");
            }
            other => panic!("Expected Overflow, got {:?}", other),
        }
        assert!(!pins.is_pinned("f").unwrap());
    }

    #[test]
    fn replace_swaps_in_place() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c", "d", "e"]);
        assert_eq!(pins.replace("c", "f").unwrap(), ReplaceOutcome::Replaced);
        assert_eq!(pins.list().unwrap(), vec!["a", "b", "f", "d", "e"]);
    }

    #[test]
    fn replace_with_unpinned_evictee() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b"]);
        assert_eq!(pins.replace("z", "f").unwrap(), ReplaceOutcome::NotPinned);
        assert_eq!(pins.replace("a", "b").unwrap(), ReplaceOutcome::NoOp);
        assert_eq!(pins.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn toggle_off_and_on() {
        let (_, pins) = manager();
        assert_eq!(pins.set_pinned("a", true).unwrap(), ToggleOutcome::Pinned);
        assert_eq!(pins.set_pinned("a", true).unwrap(), ToggleOutcome::Unchanged);
        assert_eq!(pins.set_pinned("a", false).unwrap(), ToggleOutcome::Unpinned);
        assert_eq!(pins.set_pinned("a", false).unwrap(), ToggleOutcome::Unchanged);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Stale pins
// ═══════════════════════════════════════════════════════════════════

mod prune {
    use super::*;

    fn catalog() -> CatalogCache {
        CatalogCache::from_coins(vec![
            Coin::new("bitcoin", "btc", "Bitcoin"),
            Coin::new("ethereum", "eth", "Ethereum"),
        ])
    }

    #[test]
    fn drops_ids_missing_from_catalog() {
        let (_, pins) = manager();
        fill(&pins, &["bitcoin", "gone-1", "ethereum", "gone-2"]);
        let removed = pins.prune_missing(&catalog()).unwrap();
        assert_eq!(removed, vec!["gone-1", "gone-2"]);
        assert_eq!(pins.list().unwrap(), vec!["bitcoin", "ethereum"]);
    }

    #[test]
    fn nothing_to_prune_writes_nothing() {
        let (store, pins) = manager();
        assert!(pins.prune_missing(&catalog()).unwrap().is_empty());
        assert_eq!(stored(&store), None);
    }

    #[test]
    fn clear_removes_key() {
        let (store, pins) = manager();
        fill(&pins, &["a"]);
        pins.clear().unwrap();
        assert_eq!(stored(&store), None);
        assert!(pins.is_empty().unwrap());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Cross-surface consistency
// ═══════════════════════════════════════════════════════════════════

mod observers {
    use super::*;

    #[test]
    fn subscribers_see_changes_in_order() {
        let (_, pins) = manager();
        let mut rx = pins.subscribe();
        pins.add("a").unwrap();
        pins.add("b").unwrap();
        pins.replace("a", "c").unwrap();

        assert_eq!(rx.try_recv().unwrap(), PinEvent::Added("a".into()));
        assert_eq!(rx.try_recv().unwrap(), PinEvent::Added("b".into()));
        assert_eq!(rx.try_recv().unwrap(), PinEvent::Removed("a".into()));
        assert_eq!(rx.try_recv().unwrap(), PinEvent::Added("c".into()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rejected_add_publishes_nothing() {
        let (_, pins) = manager();
        fill(&pins, &["a", "b", "c", "d", "e"]);
        let mut rx = pins.subscribe();
        pins.add("f").unwrap();
        pins.remove("zzz").unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn list_and_modal_toggles_stay_in_sync() {
        let (_, pins) = manager();
        let mut list_toggle = pins.toggle("bitcoin").unwrap();
        let mut modal_toggle = pins.toggle("bitcoin").unwrap();
        assert!(!list_toggle.is_checked());

        // Checked from the list view...
        pins.set_pinned("bitcoin", true).unwrap();
        assert!(list_toggle.refresh(&pins).unwrap());
        assert!(modal_toggle.refresh(&pins).unwrap());

        // ...and unchecked from the modal.
        pins.set_pinned("bitcoin", false).unwrap();
        assert!(!modal_toggle.refresh(&pins).unwrap());
        assert!(!list_toggle.refresh(&pins).unwrap());
    }

    #[test]
    fn toggle_ignores_other_coins() {
        let (_, pins) = manager();
        let mut toggle = pins.toggle("a").unwrap();
        pins.add("b").unwrap();
        assert!(!toggle.refresh(&pins).unwrap());
        assert_eq!(toggle.id(), "a");
    }

    #[test]
    fn toggle_starts_from_persisted_state() {
        let (_, pins) = manager();
        pins.add("a").unwrap();
        assert!(pins.toggle("a").unwrap().is_checked());
        assert!(pins.sync_toggle_state("a").unwrap());
    }

    #[test]
    fn lagging_toggle_falls_back_to_pull() {
        let (_, pins) = manager();
        let mut toggle = pins.toggle("x").unwrap();
        // Overflow the event channel with churn, ending with "x" pinned.
        for i in 0..200 {
            pins.add(&format!("c{i}")).unwrap();
            pins.remove(&format!("c{i}")).unwrap();
        }
        pins.add("x").unwrap();
        assert!(toggle.refresh(&pins).unwrap());
    }

    #[test]
    fn stale_pruning_unchecks_toggles() {
        let (_, pins) = manager();
        pins.add("gone").unwrap();
        let mut toggle = pins.toggle("gone").unwrap();
        assert!(toggle.is_checked());
        pins.prune_missing(&CatalogCache::new()).unwrap();
        assert!(!toggle.refresh(&pins).unwrap());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Known limitation: concurrent read-modify-write
// ═══════════════════════════════════════════════════════════════════

mod last_writer_wins {
    use super::*;

    /// Store that hands every reader the same snapshot until released, the
    /// way two views reading before either writes would see it.
    struct SnapshotStore {
        inner: MemoryStore,
        frozen: std::sync::Mutex<Option<Option<String>>>,
    }

    impl KeyValueStore for SnapshotStore {
        fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            let frozen = self.frozen.lock().unwrap();
            match &*frozen {
                Some(snapshot) => Ok(snapshot.clone()),
                None => self.inner.get(key),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), CoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn two_adds_from_same_snapshot_lose_one() {
        let seed = MemoryStore::new();
        seed.set(KEY, r#"["a","b","c","d"]"#).unwrap();
        let store = Arc::new(SnapshotStore {
            frozen: std::sync::Mutex::new(Some(seed.get(KEY).unwrap())),
            inner: seed,
        });
        let list_view = PinSetManager::new(store.clone(), KEY, 5);
        let modal_view = PinSetManager::new(store.clone(), KEY, 5);

        assert_eq!(list_view.add("e").unwrap(), AddOutcome::Added);
        assert_eq!(modal_view.add("f").unwrap(), AddOutcome::Added);

        *store.frozen.lock().unwrap() = None;
        let ids = list_view.list().unwrap();
        assert_eq!(ids, vec!["a", "b", "c", "d", "f"]);
        assert!(ids.len() <= 5);
    }
}
