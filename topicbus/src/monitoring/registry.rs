use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::RwLock;

use crate::monitoring::{Monitor, MonitorId};

struct MonitorEntry {
    id: MonitorId,
    monitor: Arc<dyn Monitor>,
    paused: bool,
}

#[derive(Default)]
struct Entries {
    list: Vec<MonitorEntry>,
    last_id: MonitorId,
}

/// Registry for managing monitors attached to a bus.
///
/// Access via [`Bus::monitors()`](crate::Bus::monitors).
///
/// # Example
///
/// ```ignore
/// let registry = bus.monitors();
///
/// // Add a monitor
/// let id = registry.add(MyMonitor);
///
/// // Pause all monitors
/// registry.pause();
///
/// // Resume all monitors
/// registry.resume();
/// ```
pub struct MonitorRegistry {
    entries: RwLock<Entries>,
    is_active: AtomicBool,
}

impl MonitorRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            is_active: AtomicBool::new(false),
        }
    }

    /// Register a new monitor and return its id.
    ///
    /// The monitor starts in the active (non-paused) state.
    pub fn add<M: Monitor + 'static>(&self, monitor: M) -> MonitorId {
        let mut entries = self.entries.write();
        let id = entries.last_id;
        entries.last_id = entries.last_id.wrapping_add(1);
        entries.list.push(MonitorEntry {
            id,
            monitor: Arc::new(monitor),
            paused: false,
        });
        self.update_is_active(&entries);
        id
    }

    /// Remove a monitor by its id. Returns `false` if it was not registered.
    pub fn remove(&self, id: MonitorId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.list.len();
        entries.list.retain(|e| e.id != id);
        self.update_is_active(&entries);
        entries.list.len() != before
    }

    /// Pause all registered monitors.
    ///
    /// Paused monitors do not receive callbacks. Messages continue to flow
    /// through the bus normally.
    pub fn pause(&self) {
        self.set_paused(None, true);
    }

    /// Resume all registered monitors.
    pub fn resume(&self) {
        self.set_paused(None, false);
    }

    pub fn pause_one(&self, id: MonitorId) {
        self.set_paused(Some(id), true);
    }

    pub fn resume_one(&self, id: MonitorId) {
        self.set_paused(Some(id), false);
    }

    /// Number of registered monitors, paused or not.
    pub fn len(&self) -> usize {
        self.entries.read().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if at least one monitor would receive callbacks.
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }

    /// Invoke `f` on every active monitor.
    ///
    /// Monitors are collected under the read lock and called after it is
    /// released, so a monitor may use the registry itself. A monitor that
    /// panics is removed.
    pub(crate) fn notify(&self, f: impl Fn(&dyn Monitor)) {
        if !self.is_active() {
            return;
        }

        let active: Vec<(MonitorId, Arc<dyn Monitor>)> = self
            .entries
            .read()
            .list
            .iter()
            .filter(|e| !e.paused)
            .map(|e| (e.id, e.monitor.clone()))
            .collect();

        for (id, monitor) in active {
            let result = catch_unwind(AssertUnwindSafe(|| f(monitor.as_ref())));
            if result.is_err() {
                tracing::error!(monitor_id = %id, "Monitor panicked, removing");
                self.remove(id);
            }
        }
    }

    fn set_paused(&self, id: Option<MonitorId>, paused: bool) {
        let mut entries = self.entries.write();
        for entry in entries.list.iter_mut() {
            if id.is_none_or(|id| id == entry.id) {
                entry.paused = paused;
            }
        }
        self.update_is_active(&entries);
    }

    fn update_is_active(&self, entries: &Entries) {
        let active = entries.list.iter().any(|e| !e.paused);
        self.is_active.store(active, Ordering::Relaxed);
    }
}

impl fmt::Debug for MonitorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("MonitorRegistry")
            .field("monitors.len()", &entries.list.len())
            .field("last_id", &entries.last_id)
            .field("is_active", &self.is_active)
            .finish()
    }
}
