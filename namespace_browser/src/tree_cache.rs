/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Per-namespace cache of fetched subtrees.
//!
//! Entries are keyed by namespace only, not by `(namespace,
//! snapshot)`: at most one snapshot's data is retained per
//! namespace, so memory is bounded by the set of namespaces ever
//! expanded. An entry whose snapshot differs from the current one is
//! stale and must be treated as absent.
//!
//! Entries are immutable once written. `put` replaces the whole
//! `Arc<TreeCacheEntry>`; readers holding a previous `Arc` keep a
//! consistent view.

use std::collections::HashMap;
use std::sync::Arc;

use crate::path::NamespaceKey;
use crate::snapshot::Snapshot;
use crate::subtree::SubtreeData;

/// A fetched subtree tagged with the snapshot it was fetched under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeCacheEntry {
    pub snapshot: Snapshot,
    pub data: SubtreeData,
}

#[derive(Clone, Debug, Default)]
pub struct TreeCache {
    entries: HashMap<NamespaceKey, Arc<TreeCacheEntry>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored entry regardless of staleness.
    pub fn get(&self, key: &NamespaceKey) -> Option<&Arc<TreeCacheEntry>> {
        self.entries.get(key)
    }

    /// Unconditionally replace the entry for `key`.
    pub fn put(&mut self, key: NamespaceKey, snapshot: Snapshot, data: SubtreeData) {
        self.entries
            .insert(key, Arc::new(TreeCacheEntry { snapshot, data }));
    }

    /// True if there is no entry, or its snapshot is not `current`.
    pub fn is_stale(&self, key: &NamespaceKey, current: &Snapshot) -> bool {
        self.entries
            .get(key)
            .is_none_or(|entry| &entry.snapshot != current)
    }

    /// The entry for `key` only if it was fetched under `current`.
    pub fn get_valid(&self, key: &NamespaceKey, current: &Snapshot) -> Option<&Arc<TreeCacheEntry>> {
        self.entries
            .get(key)
            .filter(|entry| &entry.snapshot == current)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
