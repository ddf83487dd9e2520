//! Per-path coalescing of filesystem events.
//!
//! Editors often emit several events for one save (write, chmod, rename).
//! Events for the same path are merged until the path has been quiet for
//! the debounce duration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Kind of filesystem change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A change that survived debouncing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

struct Pending {
    kind: FsEventKind,
    deadline: Instant,
}

/// Thread-safe event debouncer, shared by the watcher and the drain task.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<PathBuf, Pending>>,
    quiet_period: Duration,
}

impl EventDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            quiet_period,
        }
    }

    /// Record an event, merging it with any pending event for the same path.
    pub fn record(&self, path: PathBuf, kind: FsEventKind) {
        self.record_at(path, kind, Instant::now());
    }

    fn record_at(&self, path: PathBuf, kind: FsEventKind, now: Instant) {
        use std::collections::hash_map::Entry;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = now + self.quiet_period;

        match pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(Pending { kind, deadline });
            }
            Entry::Occupied(mut entry) => match merge(entry.get().kind, kind) {
                Some(merged) => {
                    *entry.get_mut() = Pending {
                        kind: merged,
                        deadline,
                    };
                }
                None => {
                    entry.remove();
                }
            },
        }
    }

    /// Take every event whose quiet period has elapsed.
    pub fn drain_ready(&self) -> Vec<FsEvent> {
        self.drain_ready_at(Instant::now())
    }

    fn drain_ready_at(&self, now: Instant) -> Vec<FsEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ready: Vec<FsEvent> = pending
            .extract_if(|_, event| event.deadline <= now)
            .map(|(path, event)| FsEvent {
                path,
                kind: event.kind,
            })
            .collect();
        ready.sort_by(|a, b| a.path.cmp(&b.path));
        ready
    }
}

/// Merge a new event into a pending one for the same path.
///
/// `None` drops both: a file created and removed within one quiet period
/// never existed as far as clients are concerned.
#[allow(clippy::match_same_arms)]
fn merge(pending: FsEventKind, new: FsEventKind) -> Option<FsEventKind> {
    use FsEventKind::{Created, Modified, Removed};

    match (pending, new) {
        (Created, Created | Modified) => Some(Created),
        (Created, Removed) => None,

        (Modified, Created) => Some(Created),
        (Modified, Modified) => Some(Modified),
        (Modified, Removed) => Some(Removed),

        // Replaced by a new file.
        (Removed, Created) => Some(Modified),
        (Removed, Modified | Removed) => Some(Removed),
    }
}
