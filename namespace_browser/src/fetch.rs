/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Fetch scheduling and reconciliation for namespace subtrees.
//!
//! A fetch is issued for `(snapshot, key)` when the namespace's cache
//! entry is missing or stale. The snapshot is captured in the
//! [`FetchRequest`] at send time. When the response arrives it is
//! compared with the snapshot current *at completion*; a mismatch
//! means the user moved to another database version while the
//! request was outstanding, and the response is dropped without
//! touching the cache. There is no transport cancellation: this
//! comparison is the cancellation.
//!
//! Invariants:
//! - **Single commit path**: all cache writes go through
//!   [`FetchCoordinator::reconcile`].
//! - **No send-order guarantee**: responses may complete in any
//!   order; only snapshot equality decides whether one is committed.
//! - **No retry loops**: a failure under snapshot `S` is remembered
//!   per namespace and suppresses further requests for `(key, S)`
//!   until the namespace is reopened or the snapshot changes.
//! - **De-duplication**: at most one outstanding request per
//!   `(key, snapshot)`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::assemble::is_blank_name;
use crate::error::FetchError;
use crate::path::NamespaceKey;
use crate::snapshot::Snapshot;
use crate::subtree::SubtreeData;
use crate::tree_cache::TreeCache;

/// Where subtree contents come from.
#[async_trait]
pub trait SubtreeSource: Send + Sync {
    /// Fetch the contents of namespace `key` as of `snapshot`.
    async fn fetch_subtree(
        &self,
        snapshot: &Snapshot,
        key: &NamespaceKey,
    ) -> Result<SubtreeData, FetchError>;
}

/// An issued fetch. `snapshot` is the snapshot captured at send time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Monotonic per-coordinator sequence number.
    pub seq: u64,
    pub key: NamespaceKey,
    pub snapshot: Snapshot,
}

/// A finished fetch, successful or not, awaiting reconciliation.
#[derive(Debug)]
pub struct FetchCompletion {
    pub request: FetchRequest,
    pub result: Result<SubtreeData, FetchError>,
}

/// What reconciliation did with a completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Written to the cache under the requested snapshot.
    Committed,
    /// The snapshot changed since the request was sent; dropped.
    Stale {
        /// The snapshot current at completion time.
        current: Option<Snapshot>,
    },
    /// The fetch failed; the cache was left as it was.
    Failed(FetchError),
}

/// Issues subtree fetches and commits their results.
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    /// Outstanding request per namespace: `(snapshot, seq)`.
    in_flight: HashMap<NamespaceKey, (Snapshot, u64)>,
    /// Snapshot under which the last fetch for a namespace failed.
    failed: HashMap<NamespaceKey, Snapshot>,
    seq: u64,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a request for `key` if its cache entry is missing or
    /// stale relative to `current`.
    ///
    /// Returns `None` on a cache hit, when no snapshot is known yet,
    /// when an identical request is already outstanding, or when the
    /// last attempt under `current` failed.
    pub fn request_if_stale(
        &mut self,
        cache: &TreeCache,
        key: &NamespaceKey,
        current: Option<&Snapshot>,
    ) -> Option<FetchRequest> {
        let current = current?;
        if !cache.is_stale(key, current) {
            return None;
        }
        if self
            .in_flight
            .get(key)
            .is_some_and(|(snapshot, _)| snapshot == current)
        {
            return None;
        }
        if self.failed.get(key) == Some(current) {
            return None;
        }

        self.seq += 1;
        let request = FetchRequest {
            seq: self.seq,
            key: key.clone(),
            snapshot: current.clone(),
        };
        self.in_flight
            .insert(key.clone(), (current.clone(), request.seq));
        tracing::debug!(
            seq = request.seq,
            key = %request.key,
            snapshot = %request.snapshot,
            "issuing subtree fetch"
        );
        Some(request)
    }

    /// Reconcile a completion against the snapshot current now.
    ///
    /// Commits only if the requested snapshot equals `current`.
    pub fn reconcile(
        &mut self,
        cache: &mut TreeCache,
        completion: FetchCompletion,
        current: Option<&Snapshot>,
    ) -> Reconciliation {
        let FetchCompletion { request, result } = completion;

        // A newer request for the same key may have replaced this
        // record; only clear our own.
        if self
            .in_flight
            .get(&request.key)
            .is_some_and(|(_, seq)| *seq == request.seq)
        {
            self.in_flight.remove(&request.key);
        }

        if current != Some(&request.snapshot) {
            tracing::debug!(
                seq = request.seq,
                key = %request.key,
                requested = %request.snapshot,
                current = current.map(Snapshot::as_str).unwrap_or("<none>"),
                "discarding stale subtree response"
            );
            return Reconciliation::Stale {
                current: current.cloned(),
            };
        }

        match result {
            Ok(data) => {
                tracing::debug!(
                    seq = request.seq,
                    key = %request.key,
                    snapshot = %request.snapshot,
                    "committing subtree"
                );
                let blank = data.namespaces.iter().filter(|n| is_blank_name(n)).count();
                if blank > 0 {
                    tracing::warn!(
                        key = %request.key,
                        count = blank,
                        "dropping blank child namespace names"
                    );
                }
                self.failed.remove(&request.key);
                cache.put(request.key, request.snapshot, data);
                Reconciliation::Committed
            }
            Err(err) => {
                tracing::warn!(
                    seq = request.seq,
                    key = %request.key,
                    snapshot = %request.snapshot,
                    error = %err,
                    "subtree fetch failed"
                );
                self.failed.insert(request.key, request.snapshot);
                Reconciliation::Failed(err)
            }
        }
    }

    /// Make `key` eligible for retry (the namespace was reopened).
    pub fn forget_failure(&mut self, key: &NamespaceKey) {
        self.failed.remove(key);
    }

    /// Make every namespace eligible for retry (the snapshot changed).
    pub fn snapshot_changed(&mut self) {
        self.failed.clear();
    }

    pub fn is_in_flight(&self, key: &NamespaceKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn has_failed(&self, key: &NamespaceKey) -> bool {
        self.failed.contains_key(key)
    }
}

/// Run `request` against `source` on the tokio runtime and deliver
/// the completion on `completions`.
///
/// The caller reconciles completions on its own event loop.
pub fn spawn_fetch(
    source: Arc<dyn SubtreeSource>,
    request: FetchRequest,
    completions: mpsc::UnboundedSender<FetchCompletion>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = source.fetch_subtree(&request.snapshot, &request.key).await;
        // A closed receiver means the session is gone.
        let _ = completions.send(FetchCompletion { request, result });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtree::DecodeError;

    fn key(s: &str) -> NamespaceKey {
        NamespaceKey::from(s)
    }

    fn snap(s: &str) -> Snapshot {
        Snapshot::from(s)
    }

    fn ok(request: FetchRequest) -> FetchCompletion {
        FetchCompletion {
            request,
            result: Ok(SubtreeData {
                namespaces: vec!["c".into()],
                ..SubtreeData::default()
            }),
        }
    }

    #[test]
    fn no_snapshot_means_no_request() {
        let mut coord = FetchCoordinator::new();
        let cache = TreeCache::new();
        assert_eq!(coord.request_if_stale(&cache, &key("a"), None), None);
    }

    #[test]
    fn cache_hit_issues_nothing() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        cache.put(key("a"), snap("s1"), SubtreeData::default());
        assert_eq!(
            coord.request_if_stale(&cache, &key("a"), Some(&snap("s1"))),
            None
        );
    }

    #[test]
    fn stale_entry_is_refetched_under_current_snapshot() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        cache.put(key("a"), snap("s1"), SubtreeData::default());
        let req = coord
            .request_if_stale(&cache, &key("a"), Some(&snap("s2")))
            .unwrap();
        assert_eq!(req.snapshot, snap("s2"));
        assert_eq!(req.key, key("a"));
    }

    #[test]
    fn duplicate_request_is_suppressed_while_in_flight() {
        let mut coord = FetchCoordinator::new();
        let cache = TreeCache::new();
        let first = coord.request_if_stale(&cache, &key("a"), Some(&snap("s1")));
        assert!(first.is_some());
        assert!(coord.is_in_flight(&key("a")));
        assert_eq!(
            coord.request_if_stale(&cache, &key("a"), Some(&snap("s1"))),
            None
        );
        // A different snapshot supersedes.
        let second = coord
            .request_if_stale(&cache, &key("a"), Some(&snap("s2")))
            .unwrap();
        assert!(second.seq > first.unwrap().seq);
    }

    #[test]
    fn matching_snapshot_commits() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        let req = coord
            .request_if_stale(&cache, &key("a.b"), Some(&snap("s1")))
            .unwrap();
        let outcome = coord.reconcile(&mut cache, ok(req), Some(&snap("s1")));
        assert_eq!(outcome, Reconciliation::Committed);
        assert_eq!(cache.get(&key("a.b")).unwrap().snapshot, snap("s1"));
        assert!(!coord.is_in_flight(&key("a.b")));
    }

    #[test]
    fn response_for_old_snapshot_is_discarded() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        let req = coord
            .request_if_stale(&cache, &key("a.b"), Some(&snap("s1")))
            .unwrap();
        let outcome = coord.reconcile(&mut cache, ok(req), Some(&snap("s2")));
        assert_eq!(
            outcome,
            Reconciliation::Stale {
                current: Some(snap("s2"))
            }
        );
        assert!(cache.get(&key("a.b")).is_none());
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_entry() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        let old = coord
            .request_if_stale(&cache, &key("k"), Some(&snap("s1")))
            .unwrap();
        let new = coord
            .request_if_stale(&cache, &key("k"), Some(&snap("s2")))
            .unwrap();
        // Newer completes first.
        assert_eq!(
            coord.reconcile(&mut cache, ok(new), Some(&snap("s2"))),
            Reconciliation::Committed
        );
        assert!(matches!(
            coord.reconcile(&mut cache, ok(old), Some(&snap("s2"))),
            Reconciliation::Stale { .. }
        ));
        assert_eq!(cache.get(&key("k")).unwrap().snapshot, snap("s2"));
    }

    #[test]
    fn old_completion_keeps_newer_in_flight_record() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        let old = coord
            .request_if_stale(&cache, &key("k"), Some(&snap("s1")))
            .unwrap();
        let _new = coord
            .request_if_stale(&cache, &key("k"), Some(&snap("s2")))
            .unwrap();
        coord.reconcile(&mut cache, ok(old), Some(&snap("s2")));
        assert!(coord.is_in_flight(&key("k")));
    }

    #[test]
    fn failure_leaves_cache_and_blocks_retry_until_triggered() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        cache.put(key("k"), snap("s0"), SubtreeData::default());
        let req = coord
            .request_if_stale(&cache, &key("k"), Some(&snap("s1")))
            .unwrap();
        let outcome = coord.reconcile(
            &mut cache,
            FetchCompletion {
                request: req,
                result: Err(FetchError::Status(500)),
            },
            Some(&snap("s1")),
        );
        assert_eq!(outcome, Reconciliation::Failed(FetchError::Status(500)));
        // Prior stale value survives.
        assert_eq!(cache.get(&key("k")).unwrap().snapshot, snap("s0"));
        assert!(coord.has_failed(&key("k")));
        assert_eq!(
            coord.request_if_stale(&cache, &key("k"), Some(&snap("s1"))),
            None
        );

        coord.forget_failure(&key("k"));
        assert!(
            coord
                .request_if_stale(&cache, &key("k"), Some(&snap("s1")))
                .is_some()
        );
    }

    #[test]
    fn snapshot_change_clears_failures() {
        let mut coord = FetchCoordinator::new();
        let mut cache = TreeCache::new();
        let req = coord
            .request_if_stale(&cache, &key("k"), Some(&snap("s1")))
            .unwrap();
        coord.reconcile(
            &mut cache,
            FetchCompletion {
                request: req,
                result: Err(FetchError::Decode(DecodeError::Shape("a 4-element array"))),
            },
            Some(&snap("s1")),
        );
        coord.snapshot_changed();
        assert!(!coord.has_failed(&key("k")));
    }

    struct FixedSource;

    #[async_trait]
    impl SubtreeSource for FixedSource {
        async fn fetch_subtree(
            &self,
            snapshot: &Snapshot,
            key: &NamespaceKey,
        ) -> Result<SubtreeData, FetchError> {
            Ok(SubtreeData {
                namespaces: vec![format!("{}@{}", key, snapshot)],
                ..SubtreeData::default()
            })
        }
    }

    #[tokio::test]
    async fn spawn_fetch_delivers_completion() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = FetchRequest {
            seq: 7,
            key: key("a"),
            snapshot: snap("s1"),
        };
        spawn_fetch(Arc::new(FixedSource), request.clone(), tx)
            .await
            .unwrap();
        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.request, request);
        assert_eq!(completion.result.unwrap().namespaces, vec!["a@s1"]);
    }
}
