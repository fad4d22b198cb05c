use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Cached note enumeration.
///
/// `invalidate` only bumps the generation; the next reader notices the stale
/// snapshot and refills it. Read-check-refill runs under one mutex and a
/// refill replaces the snapshot wholesale.
pub struct NoteIndex {
    generation: AtomicU64,
    snapshot: Mutex<Option<Snapshot>>,
}

struct Snapshot {
    generation: u64,
    notes: Arc<Vec<PathBuf>>,
}

impl NoteIndex {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            snapshot: Mutex::new(None),
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Current note list, refilled through `enumerate` when stale or empty.
    ///
    /// With `enabled == false` every call enumerates and nothing is stored.
    /// When `enumerate` yields `None` (cancelled) the snapshot is left alone
    /// and an empty list is returned.
    pub fn get_or_refill<F>(&self, enabled: bool, enumerate: F) -> Arc<Vec<PathBuf>>
    where
        F: FnOnce() -> Option<Vec<PathBuf>>,
    {
        if !enabled {
            return Arc::new(enumerate().unwrap_or_default());
        }

        let mut slot = match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let generation = self.generation();
        if let Some(snapshot) = slot.as_ref() {
            if snapshot.generation == generation && !snapshot.notes.is_empty() {
                return snapshot.notes.clone();
            }
        }

        let Some(notes) = enumerate() else {
            return Arc::new(Vec::new());
        };
        let notes = Arc::new(notes);
        *slot = Some(Snapshot {
            generation,
            notes: notes.clone(),
        });
        notes
    }
}

impl Default for NoteIndex {
    fn default() -> Self {
        Self::new()
    }
}
