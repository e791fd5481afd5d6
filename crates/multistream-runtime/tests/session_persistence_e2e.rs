//! Layout session persistence end-to-end tests.
//!
//! # Invariants
//!
//! 1. **Round-trip integrity**: a customization accepted in one session is
//!    restored by the next session over the same store.
//! 2. **Active set only**: restored mappings never hold identities outside the
//!    active stream set.
//! 3. **Graceful degradation**: corrupt or unreadable storage falls back to
//!    the default grid.
//! 4. **Overlap freedom**: no sequence of accepted gestures produces
//!    overlapping tiles.

#![cfg(test)]

use std::sync::{Arc, Barrier};
use std::thread;

use multistream_layout::{Platform, Rect, Size, Stream, TileId, find_conflicts};
use multistream_runtime::{
    ContainerMetrics, CustomLayoutStore, LayoutConfig, LayoutSession, MemoryStorage,
    StorageBackend, StorageError, StorageResult,
};
use proptest::prelude::*;

fn streams() -> Vec<Stream> {
    vec![
        Stream::new(Platform::Twitch, "alpha", 1),
        Stream::new(Platform::Kick, "beta", 2),
        Stream::new(Platform::Twitch, "gamma", 3),
    ]
}

fn open(store: CustomLayoutStore, streams: Vec<Stream>) -> LayoutSession {
    let mut session = LayoutSession::new(LayoutConfig::default(), store);
    session.set_streams(streams);
    session.observe_container(ContainerMetrics::unpadded(Size::new(1600.0, 900.0)));
    session
}

/// A backend that shares one `MemoryStorage` between sessions.
#[derive(Clone, Default)]
struct SharedMemory(Arc<MemoryStorage>);

impl StorageBackend for SharedMemory {
    fn name(&self) -> &str {
        "SharedMemory"
    }
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.0.get(key)
    }
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.0.set(key, value)
    }
    fn remove(&self, key: &str) -> StorageResult<()> {
        self.0.remove(key)
    }
    fn keys(&self) -> StorageResult<Vec<String>> {
        self.0.keys()
    }
}

/// A backend whose every call fails.
struct Broken;

impl StorageBackend for Broken {
    fn name(&self) -> &str {
        "Broken"
    }
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
    fn keys(&self) -> StorageResult<Vec<String>> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
    fn is_available(&self) -> bool {
        false
    }
}

// ============================================================================
// 1. Restore across sessions
// ============================================================================

#[test]
fn customization_survives_restart() {
    let shared = SharedMemory::default();
    let mut first = open(CustomLayoutStore::new(Box::new(shared.clone())), streams());
    let moved = first
        .handle_drag_stop("twitch:gamma:3", 790.0, 448.0)
        .unwrap();

    let second = open(CustomLayoutStore::new(Box::new(shared)), streams());
    assert_eq!(
        second.positions().get("twitch:gamma:3"),
        Some(&moved),
        "restored session should place the tile where the user left it"
    );
}

#[test]
fn restore_ignores_stream_order() {
    let shared = SharedMemory::default();
    let mut first = open(CustomLayoutStore::new(Box::new(shared.clone())), streams());
    first
        .handle_resize_stop("kick:beta:2", Rect::new(804.0, 0.0, 640.0, 360.0))
        .unwrap();

    let mut reversed = streams();
    reversed.reverse();
    let second = open(CustomLayoutStore::new(Box::new(shared)), reversed);
    assert_eq!(second.custom_layout().len(), 1);
}

#[cfg(feature = "state-persistence")]
#[test]
fn file_backed_session_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("layouts.json");

    let mut first = open(CustomLayoutStore::with_file(&path), streams());
    first
        .handle_resize_stop("twitch:alpha:1", Rect::new(0.0, 0.0, 480.0, 270.0))
        .unwrap();
    drop(first);

    let second = open(CustomLayoutStore::with_file(&path), streams());
    assert_eq!(
        second.custom_layout().get("twitch:alpha:1"),
        Some(&Rect::new(0.0, 0.0, 480.0, 270.0))
    );
}

// ============================================================================
// 2. Active set filtering
// ============================================================================

#[test]
fn load_drops_entries_for_absent_tiles() {
    let active = streams();
    let store = CustomLayoutStore::in_memory();
    let key = store.key_for(&active);
    let backend = MemoryStorage::with_entries([(
        key,
        r#"{
            "twitch:alpha:1": {"x": 0, "y": 0, "w": 400, "h": 225},
            "twitch:alpha:999": {"x": 500, "y": 0, "w": 400, "h": 225}
        }"#
        .to_owned(),
    )]);

    let session = open(CustomLayoutStore::new(Box::new(backend)), active);
    let layout = session.custom_layout();
    assert_eq!(layout.len(), 1);
    assert!(layout.contains("twitch:alpha:1"));
    assert!(!layout.contains("twitch:alpha:999"));
}

// ============================================================================
// 3. Graceful degradation
// ============================================================================

#[test]
fn broken_storage_keeps_session_in_memory() {
    let mut session = open(CustomLayoutStore::new(Box::new(Broken)), streams());
    assert!(session.custom_layout().is_empty());
    assert!(!session.store().is_available());

    let moved = session
        .handle_drag_stop("twitch:gamma:3", 790.0, 448.0)
        .unwrap();
    assert_eq!(session.positions().get("twitch:gamma:3"), Some(&moved));

    session.reset_layout();
    assert!(session.custom_layout().is_empty());
}

#[test]
fn corrupt_entry_falls_back_to_grid() {
    let active = streams();
    let key = CustomLayoutStore::in_memory().key_for(&active);
    let backend = MemoryStorage::with_entries([(key, "{\"twitch:alpha:1\": 42}".to_owned())]);
    let session = open(CustomLayoutStore::new(Box::new(backend)), active);
    assert!(session.custom_layout().is_empty());
    assert_eq!(
        session.positions().get("twitch:alpha:1"),
        Some(&Rect::new(0.0, 0.0, 782.0, 440.0))
    );
}

#[test]
fn memory_storage_is_shareable_across_threads() {
    let storage = Arc::new(MemoryStorage::new());
    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                storage.set(&format!("key-{i}"), "{}").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(storage.keys().unwrap().len(), 4);
}

// ============================================================================
// 4. Overlap freedom under arbitrary gestures
// ============================================================================

#[derive(Debug, Clone)]
enum Gesture {
    Drag { tile: usize, x: u16, y: u16 },
    Resize { tile: usize, x: u16, y: u16, w: u16, h: u16 },
}

fn gesture_strategy() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        (0usize..3, 0u16..1600, 0u16..900).prop_map(|(tile, x, y)| Gesture::Drag { tile, x, y }),
        (0usize..3, 0u16..1600, 0u16..900, 16u16..1200, 9u16..700)
            .prop_map(|(tile, x, y, w, h)| Gesture::Resize { tile, x, y, w, h }),
    ]
}

proptest! {
    #[test]
    fn accepted_gestures_never_overlap(
        gestures in prop::collection::vec(gesture_strategy(), 1..24),
    ) {
        let ids: Vec<TileId> = streams().into_iter().map(|s| s.id).collect();
        let mut session = open(CustomLayoutStore::in_memory(), streams());
        for gesture in gestures {
            let before = session.positions();
            let result = match gesture {
                Gesture::Drag { tile, x, y } => {
                    session.handle_drag_stop(ids[tile].as_str(), f64::from(x), f64::from(y))
                }
                Gesture::Resize { tile, x, y, w, h } => session.handle_resize_stop(
                    ids[tile].as_str(),
                    Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h)),
                ),
            };
            let after = session.positions();
            if result.is_err() {
                prop_assert_eq!(&before, &after);
            }
            let conflicts = find_conflicts(&after);
            prop_assert!(conflicts.is_empty(), "conflicts: {:?}", conflicts);
            prop_assert!(session.stale_tiles().is_empty());
        }
    }
}
