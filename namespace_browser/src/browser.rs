/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A browsing session: the three stores plus the fetch coordinator.
//!
//! [`Browser`] is a synchronous state machine. Every mutation returns
//! the fetches it made necessary; the caller runs them (typically via
//! [`crate::fetch::spawn_fetch`]) and feeds each completion back
//! through [`Browser::complete`]. Nothing here awaits, so the session
//! can live on a single event loop without locking.

use crate::assemble::NamespaceListing;
use crate::assemble::assemble;
use crate::expansion::ExpansionStore;
use crate::fetch::FetchCompletion;
use crate::fetch::FetchCoordinator;
use crate::fetch::FetchRequest;
use crate::fetch::Reconciliation;
use crate::path::Path;
use crate::snapshot::Snapshot;
use crate::subtree::TermEntry;
use crate::tree::FlatRow;
use crate::tree::TreeView;
use crate::tree::flatten;
use crate::tree::open_visible_namespaces;
use crate::tree_cache::TreeCache;
use crate::watchers::WatchState;
use crate::watchers::WatcherStore;

#[derive(Debug, Default)]
pub struct Browser {
    expansion: ExpansionStore,
    cache: TreeCache,
    watchers: WatcherStore,
    coordinator: FetchCoordinator,
    snapshot: Option<Snapshot>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot every cache entry is validated against.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Switch to `snapshot`. All visible open namespaces are
    /// re-requested under it; responses still in flight for the old
    /// one will be discarded on arrival.
    pub fn set_snapshot(&mut self, snapshot: Option<Snapshot>) -> Vec<FetchRequest> {
        if self.snapshot == snapshot {
            return Vec::new();
        }
        tracing::info!(
            from = self.snapshot.as_ref().map(Snapshot::as_str).unwrap_or("<none>"),
            to = snapshot.as_ref().map(Snapshot::as_str).unwrap_or("<none>"),
            "snapshot changed"
        );
        self.snapshot = snapshot;
        self.coordinator.snapshot_changed();
        self.sync()
    }

    /// Open or close the namespace at `path`.
    pub fn set_open(&mut self, path: &Path, open: bool) -> Vec<FetchRequest> {
        let key = path.key();
        self.expansion.set_open(&key, open);
        if open {
            self.coordinator.forget_failure(&key);
        }
        self.sync()
    }

    /// Flip the namespace at `path`.
    pub fn toggle_namespace(&mut self, path: &Path) -> Vec<FetchRequest> {
        let open = !self.expansion.is_open(&path.key());
        self.set_open(path, open)
    }

    /// Reconcile a finished fetch. A committed subtree may reveal open
    /// descendants that now need loading; those requests are returned.
    pub fn complete(&mut self, completion: FetchCompletion) -> (Reconciliation, Vec<FetchRequest>) {
        let outcome = self
            .coordinator
            .reconcile(&mut self.cache, completion, self.snapshot.as_ref());
        let requests = match outcome {
            Reconciliation::Committed => self.sync(),
            Reconciliation::Stale { .. } | Reconciliation::Failed(_) => Vec::new(),
        };
        (outcome, requests)
    }

    /// Toggle watching of the term at `path`. Non-evaluable terms are
    /// ignored; returns whether the watcher set changed.
    pub fn toggle_term(&mut self, path: &Path, term: &TermEntry) -> bool {
        self.watchers.toggle(path, term)
    }

    pub fn watch_state(&self, path: &Path) -> WatchState<'_> {
        self.watchers.state(path)
    }

    /// Display ordering of `path`'s contents, if it has a valid entry.
    pub fn listing(&self, path: &Path) -> Option<NamespaceListing<'_>> {
        let key = path.key();
        let entry = self.cache.get_valid(&key, self.snapshot.as_ref()?)?;
        Some(assemble(&entry.data))
    }

    /// The visible tree, flattened for display.
    pub fn rows(&self) -> Vec<FlatRow<'_>> {
        flatten(self.view())
    }

    pub fn expansion(&self) -> &ExpansionStore {
        &self.expansion
    }

    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    pub fn watchers(&self) -> &WatcherStore {
        &self.watchers
    }

    pub fn watchers_mut(&mut self) -> &mut WatcherStore {
        &mut self.watchers
    }

    pub fn coordinator(&self) -> &FetchCoordinator {
        &self.coordinator
    }

    fn view(&self) -> TreeView<'_> {
        TreeView {
            expansion: &self.expansion,
            cache: &self.cache,
            watchers: &self.watchers,
            current: self.snapshot.as_ref(),
        }
    }

    /// Request every visible open namespace whose entry is missing or
    /// stale.
    fn sync(&mut self) -> Vec<FetchRequest> {
        let open = open_visible_namespaces(self.view());
        open.iter()
            .filter_map(|path| {
                self.coordinator
                    .request_if_stale(&self.cache, &path.key(), self.snapshot.as_ref())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::error::FetchError;
    use crate::path::NamespaceKey;
    use crate::subtree::SubtreeData;

    fn path(s: &str) -> Path {
        if s.is_empty() {
            Path::root()
        } else {
            Path::from_segments(s.split('.')).unwrap()
        }
    }

    fn ns(names: &[&str]) -> SubtreeData {
        SubtreeData {
            namespaces: names.iter().map(|s| s.to_string()).collect(),
            ..SubtreeData::default()
        }
    }

    fn keys(requests: &[FetchRequest]) -> Vec<&str> {
        requests.iter().map(|r| r.key.as_str()).collect()
    }

    /// Formatted log output collected in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn count(&self, needle: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .matches(needle)
                .count()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn blank_names_are_logged_once_per_commit() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut browser = Browser::new();
            browser.set_snapshot(Some(Snapshot::from("s1")));
            let root = browser.set_open(&Path::root(), true).remove(0);
            browser.complete(FetchCompletion {
                request: root,
                result: Ok(ns(&["a", " ", ""])),
            });
            for _ in 0..3 {
                assert_eq!(browser.rows().len(), 3);
                assert_eq!(browser.listing(&Path::root()).unwrap().namespaces, vec!["a"]);
            }
        });

        assert_eq!(logs.count("dropping blank child namespace names"), 1);
    }

    #[test]
    fn nothing_is_fetched_without_a_snapshot() {
        let mut browser = Browser::new();
        assert!(browser.set_open(&Path::root(), true).is_empty());
        let requests = browser.set_snapshot(Some(Snapshot::from("s1")));
        assert_eq!(keys(&requests), vec![""]);
    }

    #[test]
    fn opening_a_loaded_parent_fetches_open_children() {
        let mut browser = Browser::new();
        browser.set_snapshot(Some(Snapshot::from("s1")));
        let root = browser.set_open(&Path::root(), true).remove(0);
        // "a" was opened earlier but is not yet visible.
        assert!(browser.set_open(&path("a"), true).is_empty());

        let (outcome, requests) = browser.complete(FetchCompletion {
            request: root,
            result: Ok(ns(&["a", "b"])),
        });
        assert_eq!(outcome, Reconciliation::Committed);
        assert_eq!(keys(&requests), vec!["a"]);
    }

    #[test]
    fn closing_does_not_evict_cache() {
        let mut browser = Browser::new();
        browser.set_snapshot(Some(Snapshot::from("s1")));
        let root = browser.set_open(&Path::root(), true).remove(0);
        browser.complete(FetchCompletion {
            request: root,
            result: Ok(ns(&["a"])),
        });
        assert!(browser.set_open(&Path::root(), false).is_empty());
        assert!(browser.cache().get(&NamespaceKey::root()).is_some());
        // Reopening under the same snapshot is a cache hit.
        assert!(browser.set_open(&Path::root(), true).is_empty());
    }

    #[test]
    fn snapshot_change_requests_all_visible_open_namespaces() {
        let mut browser = Browser::new();
        browser.set_snapshot(Some(Snapshot::from("s1")));
        browser.set_open(&path("a"), true);
        let root = browser.set_open(&Path::root(), true).remove(0);
        let a = browser
            .complete(FetchCompletion {
                request: root,
                result: Ok(ns(&["a"])),
            })
            .1
            .remove(0);
        browser.complete(FetchCompletion {
            request: a,
            result: Ok(ns(&[])),
        });

        // Only the root is visible under the new snapshot until it loads.
        let requests = browser.set_snapshot(Some(Snapshot::from("s2")));
        assert_eq!(keys(&requests), vec![""]);
        assert!(requests.iter().all(|r| r.snapshot == Snapshot::from("s2")));
    }

    #[test]
    fn failed_fetch_waits_for_reopen() {
        let mut browser = Browser::new();
        browser.set_snapshot(Some(Snapshot::from("s1")));
        let root = browser.set_open(&Path::root(), true).remove(0);
        let (outcome, requests) = browser.complete(FetchCompletion {
            request: root,
            result: Err(FetchError::Transport("connection refused".into())),
        });
        assert!(matches!(outcome, Reconciliation::Failed(_)));
        assert!(requests.is_empty());
        // An unrelated toggle does not retry the failure.
        assert!(browser.set_open(&path("x"), true).is_empty());

        browser.set_open(&Path::root(), false);
        assert_eq!(keys(&browser.set_open(&Path::root(), true)), vec![""]);
    }

    #[test]
    fn listing_requires_a_valid_entry() {
        let mut browser = Browser::new();
        browser.set_snapshot(Some(Snapshot::from("s1")));
        let root = browser.set_open(&Path::root(), true).remove(0);
        assert!(browser.listing(&Path::root()).is_none());
        browser.complete(FetchCompletion {
            request: root,
            result: Ok(ns(&["b", "a"])),
        });
        assert_eq!(browser.listing(&Path::root()).unwrap().namespaces, vec!["a", "b"]);
        browser.set_snapshot(Some(Snapshot::from("s2")));
        assert!(browser.listing(&Path::root()).is_none());
    }

    #[test]
    fn same_snapshot_is_not_a_change() {
        let mut browser = Browser::new();
        browser.set_snapshot(Some(Snapshot::from("s1")));
        browser.set_open(&Path::root(), true);
        assert!(browser.set_snapshot(Some(Snapshot::from("s1"))).is_empty());
    }
}
