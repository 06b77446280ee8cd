//! Change Watchers
//!
//! Watchers run after every mutating call, in the order they were installed.
//! Install the unsynced-changes watcher before the local cache watcher so the
//! cache sees the dirty flag the same call raised.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::{Project, Snapshot};
use crate::persistence::LocalCache;

/// Default quiet window before a pending local cache save runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Settings for the local cache sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// How long edits must pause before the latest snapshot is saved.
    pub debounce: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl SyncOptions {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }
}

#[derive(Debug)]
pub(crate) enum Watcher {
    UnsyncedChanges {
        last: Snapshot,
    },
    LocalCache {
        key: String,
        last: Snapshot,
        tx: UnboundedSender<Snapshot>,
        task: JoinHandle<()>,
    },
}

impl Watcher {
    pub(crate) fn observe(&mut self, project: &mut Project) {
        match self {
            Watcher::UnsyncedChanges { last } => {
                let current = project.export_without_revision_state();
                if current != *last {
                    *last = current;
                    if !project.has_unsynced_changes {
                        debug!("Project content changed, marking unsynced");
                        project.has_unsynced_changes = true;
                    }
                }
            }
            Watcher::LocalCache { key, last, tx, .. } => {
                let current = project.export();
                if current != *last {
                    *last = current.clone();
                    if tx.send(current).is_err() {
                        warn!("Local cache sync for {} is no longer running", key);
                    }
                }
            }
        }
    }
}

impl Project {
    /// Raise the unsynced-changes flag whenever content changes.
    ///
    /// Revision fields (version, timestamps, the flag itself) are not content,
    /// so a save echoing back server metadata does not count as an edit.
    pub fn start_watch_to_set_has_unsynced_changes(&mut self) {
        let last = self.export_without_revision_state();
        self.watchers.push(Watcher::UnsyncedChanges { last });
    }

    /// Save every change to `cache` under `key`, debounced with the default
    /// window. Must be called inside a tokio runtime.
    pub fn start_watch_to_sync_local_cache<C>(&mut self, cache: Arc<C>, key: impl Into<String>)
    where
        C: LocalCache + Send + Sync + 'static,
    {
        self.start_watch_to_sync_local_cache_with(cache, key, SyncOptions::default());
    }

    /// Like [`Project::start_watch_to_sync_local_cache`] with explicit options.
    ///
    /// The current snapshot is queued right away, so one save happens after
    /// the first quiet window even if nothing is edited.
    pub fn start_watch_to_sync_local_cache_with<C>(
        &mut self,
        cache: Arc<C>,
        key: impl Into<String>,
        options: SyncOptions,
    ) where
        C: LocalCache + Send + Sync + 'static,
    {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_cache_sync(cache, key.clone(), options.debounce, rx));

        let current = self.export();
        if tx.send(current.clone()).is_err() {
            warn!("Local cache sync for {} stopped before it started", key);
        }
        debug!("Syncing project to local cache under {}", key);
        self.watchers.push(Watcher::LocalCache {
            key,
            last: current,
            tx,
            task,
        });
    }

    /// Remove all watchers. A pending cache save still runs; this waits for it.
    pub async fn stop_watchers(&mut self) {
        for watcher in self.watchers.drain(..) {
            if let Watcher::LocalCache { key, tx, task, .. } = watcher {
                drop(tx);
                if let Err(e) = task.await {
                    warn!("Local cache sync for {} ended abnormally: {}", key, e);
                }
            }
        }
    }
}

/// Trailing-edge debounce: every snapshot restarts the quiet window; when it
/// expires the latest snapshot is saved once. A closed channel flushes.
async fn run_cache_sync<C>(
    cache: Arc<C>,
    key: String,
    window: Duration,
    mut rx: UnboundedReceiver<Snapshot>,
) where
    C: LocalCache + Send + Sync + 'static,
{
    while let Some(mut pending) = rx.recv().await {
        let mut closed = false;
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(snapshot) => pending = snapshot,
                    None => {
                        closed = true;
                        break;
                    }
                },
                _ = tokio::time::sleep(window) => break,
            }
        }

        match cache.save(&key, &pending.metadata, &pending.files).await {
            Ok(()) => debug!("Saved project to local cache under {}", key),
            // Nobody awaits this task; the next edit schedules another save.
            Err(e) => warn!("Failed to save project to local cache under {}: {}", key, e),
        }

        if closed {
            break;
        }
    }
}
