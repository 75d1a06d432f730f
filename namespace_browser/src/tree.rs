/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Projection of the stores into the visible tree.
//!
//! The tree is never materialized. It is defined by structural
//! recursion from the root: a namespace contributes its children
//! only if it is open and has a cache entry valid for the current
//! snapshot. Closed or loading namespaces contribute just their own
//! row. Both the row projection ([`flatten`]) and the fetch trigger
//! walk ([`open_visible_namespaces`]) use the same traversal, so
//! whatever is on screen is exactly what gets loaded.

use crate::assemble::Category;
use crate::assemble::NamespaceListing;
use crate::assemble::assemble;
use crate::expansion::ExpansionStore;
use crate::path::Path;
use crate::snapshot::Snapshot;
use crate::subtree::ConstructorEntry;
use crate::subtree::TermEntry;
use crate::tree_cache::TreeCache;
use crate::watchers::WatcherStore;

/// What a display row shows.
#[derive(Clone, Debug, PartialEq)]
pub enum RowKind<'a> {
    Namespace {
        path: Path,
        open: bool,
        /// Open, but no valid cache entry yet.
        loading: bool,
    },
    Header(Category),
    Term {
        path: Path,
        term: &'a TermEntry,
        watched: bool,
    },
    Type {
        path: Path,
    },
    Constructor {
        path: Path,
        constructor: &'a ConstructorEntry,
    },
}

/// A single row in the flattened view.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRow<'a> {
    pub kind: RowKind<'a>,
    /// Indentation level; the root namespace row is depth 0.
    pub depth: usize,
}

impl FlatRow<'_> {
    /// Fully qualified path of the row's item, if it has one.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            RowKind::Namespace { path, .. }
            | RowKind::Term { path, .. }
            | RowKind::Type { path }
            | RowKind::Constructor { path, .. } => Some(path),
            RowKind::Header(_) => None,
        }
    }
}

/// Borrowed view over the stores needed to walk the tree.
#[derive(Clone, Copy)]
pub struct TreeView<'a> {
    pub expansion: &'a ExpansionStore,
    pub cache: &'a TreeCache,
    pub watchers: &'a WatcherStore,
    pub current: Option<&'a Snapshot>,
}

impl<'a> TreeView<'a> {
    /// Listing of `path` if it is open and has a valid entry.
    fn open_listing(&self, path: &Path) -> Option<NamespaceListing<'a>> {
        let key = path.key();
        if !self.expansion.is_open(&key) {
            return None;
        }
        let current = self.current?;
        let entry = self.cache.get_valid(&key, current)?;
        Some(assemble(&entry.data))
    }

    fn visit_open(&self, path: Path, out: &mut Vec<Path>) {
        let Some(listing) = self.open_listing(&path) else {
            if self.expansion.is_open(&path.key()) {
                out.push(path);
            }
            return;
        };
        let children: Vec<Path> = listing
            .namespaces
            .iter()
            .filter_map(|name| path.child(name).ok())
            .collect();
        out.push(path);
        for child in children {
            self.visit_open(child, out);
        }
    }

    fn flatten_into(&self, path: Path, depth: usize, rows: &mut Vec<FlatRow<'a>>) {
        let key = path.key();
        let open = self.expansion.is_open(&key);
        let listing = self.open_listing(&path);
        rows.push(FlatRow {
            kind: RowKind::Namespace {
                path: path.clone(),
                open,
                loading: open && listing.is_none(),
            },
            depth,
        });
        let Some(listing) = listing else {
            return;
        };

        let child_depth = depth + 1;
        for category in listing.headers() {
            rows.push(FlatRow {
                kind: RowKind::Header(category),
                depth: child_depth,
            });
            match category {
                Category::Namespaces => {
                    for name in &listing.namespaces {
                        if let Ok(child) = path.child(name) {
                            self.flatten_into(child, child_depth, rows);
                        }
                    }
                }
                Category::Terms => {
                    for term in listing.terms.iter().copied() {
                        if let Ok(term_path) = path.child(&term.name) {
                            let watched = self.watchers.is_watched(&term_path);
                            rows.push(FlatRow {
                                kind: RowKind::Term {
                                    path: term_path,
                                    term,
                                    watched,
                                },
                                depth: child_depth,
                            });
                        }
                    }
                }
                Category::Types => {
                    for name in &listing.types {
                        if let Ok(type_path) = path.child(name) {
                            rows.push(FlatRow {
                                kind: RowKind::Type { path: type_path },
                                depth: child_depth,
                            });
                        }
                    }
                }
                Category::Constructors => {
                    for constructor in listing.constructors.iter().copied() {
                        if let Ok(ctor_path) = path.child(&constructor.name) {
                            rows.push(FlatRow {
                                kind: RowKind::Constructor {
                                    path: ctor_path,
                                    constructor,
                                },
                                depth: child_depth,
                            });
                        }
                    }
                }
            }
        }
    }
}

/// Flatten the visible tree into display rows, root first.
pub fn flatten<'a>(view: TreeView<'a>) -> Vec<FlatRow<'a>> {
    let mut rows = Vec::new();
    view.flatten_into(Path::root(), 0, &mut rows);
    rows
}

/// Every open namespace that is currently visible: the root if
/// open, then recursively each open child listed by a valid entry.
pub fn open_visible_namespaces(view: TreeView<'_>) -> Vec<Path> {
    let mut out = Vec::new();
    view.visit_open(Path::root(), &mut out);
    out
}
