/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::collections::HashMap;

use crate::path::NamespaceKey;

/// Open/closed state per namespace.
///
/// Absent keys read as closed. Setting a key never touches any other
/// key, so closing a namespace keeps its descendants' state and
/// reopening it restores their previous expansion.
#[derive(Clone, Debug, Default)]
pub struct ExpansionStore {
    open: HashMap<NamespaceKey, bool>,
}

impl ExpansionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, key: &NamespaceKey) -> bool {
        self.open.get(key).copied().unwrap_or(false)
    }

    pub fn set_open(&mut self, key: &NamespaceKey, open: bool) {
        self.open.insert(key.clone(), open);
    }

    /// Flip the flag for `key` and return the new state.
    pub fn toggle(&mut self, key: &NamespaceKey) -> bool {
        let open = !self.is_open(key);
        self.set_open(key, open);
        open
    }

    /// Keys currently marked open, in no particular order.
    pub fn open_keys(&self) -> impl Iterator<Item = &NamespaceKey> {
        self.open
            .iter()
            .filter_map(|(key, open)| open.then_some(key))
    }
}
