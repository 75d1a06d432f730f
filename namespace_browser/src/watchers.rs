/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The watcher set: evaluable terms selected for live evaluation.
//!
//! The set is the only interface to the evaluation subsystem. The
//! evaluator reads descriptors, writes results back through
//! [`WatcherStore::record_value`], and stops evaluating a path once
//! its descriptor is gone. [`WatcherStore::revision`] changes on every
//! add/remove so the evaluator can tell its compiled runtime is out
//! of date.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::path::Path;
use crate::subtree::TermEntry;

/// Current value of one argument slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SlotValue {
    /// Not yet produced by the evaluator.
    #[default]
    Unknown,
    Known(Value),
}

/// A watched term.
///
/// Invariant: `values.len() == args.len()`.
#[derive(Clone, Debug, PartialEq)]
pub struct WatcherDescriptor {
    pub path: Path,
    pub args: Vec<String>,
    pub type_desc: String,
    values: Vec<SlotValue>,
}

impl WatcherDescriptor {
    fn new(path: Path, args: Vec<String>, type_desc: String) -> Self {
        let values = vec![SlotValue::Unknown; args.len()];
        Self {
            path,
            args,
            type_desc,
            values,
        }
    }

    pub fn values(&self) -> &[SlotValue] {
        &self.values
    }
}

/// Whether a term is watched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WatchState<'a> {
    Watching(&'a WatcherDescriptor),
    NotWatching,
}

impl WatchState<'_> {
    pub fn is_watching(&self) -> bool {
        matches!(self, WatchState::Watching(_))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("{0} is not watched")]
    NotWatched(String),
    #[error("{path} has {arity} argument slots, no slot {index}")]
    SlotOutOfRange {
        path: String,
        arity: usize,
        index: usize,
    },
}

/// Map from dot-joined term path to its watcher descriptor.
///
/// Two stores are equal when they watch the same terms with the same
/// descriptors; the revision counter is not part of equality.
#[derive(Clone, Debug, Default)]
pub struct WatcherStore {
    watchers: BTreeMap<String, Arc<WatcherDescriptor>>,
    revision: u64,
}

impl PartialEq for WatcherStore {
    fn eq(&self, other: &Self) -> bool {
        self.watchers == other.watchers
    }
}

impl WatcherStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `term` at `path` if it is not watched, unwatch it if it
    /// is. Terms without an evaluation capability are left alone.
    ///
    /// Returns `true` if the set changed.
    pub fn toggle(&mut self, path: &Path, term: &TermEntry) -> bool {
        let Some(eval) = &term.eval else {
            return false;
        };
        let name = path.to_string();
        if self.watchers.remove(&name).is_some() {
            tracing::debug!(path = %name, "unwatching term");
        } else {
            tracing::debug!(path = %name, arity = eval.arity(), "watching term");
            self.watchers.insert(
                name,
                Arc::new(WatcherDescriptor::new(
                    path.clone(),
                    eval.args.clone(),
                    term.type_desc.clone(),
                )),
            );
        }
        self.revision += 1;
        true
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.watchers.contains_key(&path.to_string())
    }

    pub fn state(&self, path: &Path) -> WatchState<'_> {
        match self.watchers.get(&path.to_string()) {
            Some(descriptor) => WatchState::Watching(descriptor),
            None => WatchState::NotWatching,
        }
    }

    /// Store an evaluation result in slot `index` of `path`'s
    /// descriptor. The descriptor is replaced, not edited in place.
    pub fn record_value(&mut self, path: &Path, index: usize, value: SlotValue) -> Result<(), WatchError> {
        let name = path.to_string();
        let descriptor = self
            .watchers
            .get_mut(&name)
            .ok_or_else(|| WatchError::NotWatched(name.clone()))?;
        let arity = descriptor.values.len();
        if index >= arity {
            return Err(WatchError::SlotOutOfRange {
                path: name,
                arity,
                index,
            });
        }
        Arc::make_mut(descriptor).values[index] = value;
        Ok(())
    }

    /// Watched terms in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<WatcherDescriptor>)> {
        self.watchers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Bumped whenever a watcher is added or removed.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
