/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Incremental browser for the namespace tree of a content-addressed
//! code database.
//!
//! The tree is loaded lazily, one namespace at a time, and every
//! loaded subtree is tagged with the database snapshot it came from.
//! When the snapshot moves, entries from older snapshots are treated
//! as absent and refetched, and responses that arrive for an old
//! snapshot are discarded instead of committed.
//!
//! State lives in three stores, each mutated only through its own
//! operations:
//! - [`ExpansionStore`]: which namespaces are open.
//! - [`TreeCache`]: snapshot-tagged subtree payloads.
//! - [`WatcherStore`]: terms selected for live evaluation.
//!
//! [`FetchCoordinator`] decides what to fetch and reconciles
//! completions; [`Browser`] ties everything into a session that an
//! event loop can drive.

pub mod assemble;
pub mod browser;
pub mod client;
pub mod error;
pub mod expansion;
pub mod fetch;
pub mod path;
pub mod snapshot;
pub mod subtree;
pub mod tree;
pub mod tree_cache;
pub mod watchers;

pub use assemble::Category;
pub use assemble::NamespaceListing;
pub use browser::Browser;
pub use client::ClientConfig;
pub use client::HttpCodebase;
pub use error::FetchError;
pub use expansion::ExpansionStore;
pub use fetch::FetchCompletion;
pub use fetch::FetchCoordinator;
pub use fetch::FetchRequest;
pub use fetch::Reconciliation;
pub use fetch::SubtreeSource;
pub use fetch::spawn_fetch;
pub use path::NamespaceKey;
pub use path::Path;
pub use snapshot::Snapshot;
pub use subtree::SubtreeData;
pub use subtree::TermEntry;
pub use tree::FlatRow;
pub use tree::RowKind;
pub use tree_cache::TreeCache;
pub use watchers::SlotValue;
pub use watchers::WatchState;
pub use watchers::WatcherStore;
