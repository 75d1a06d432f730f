/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Display ordering for one namespace's contents.
//!
//! Each category is sorted independently and lexicographically by
//! name (stable, so identical input always yields identical output).
//! Blank child-namespace names are malformed upstream entries; they
//! are dropped here and logged once when the payload is committed.

use crate::subtree::ConstructorEntry;
use crate::subtree::SubtreeData;
use crate::subtree::TermEntry;

/// The four kinds of namespace content, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Namespaces,
    Terms,
    Types,
    Constructors,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Namespaces,
        Category::Terms,
        Category::Types,
        Category::Constructors,
    ];

    /// Header text.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Namespaces => "Namespaces",
            Category::Terms => "Terms",
            Category::Types => "Types",
            Category::Constructors => "Constructors",
        }
    }
}

/// Sorted, filtered view over a [`SubtreeData`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceListing<'a> {
    pub namespaces: Vec<&'a str>,
    pub terms: Vec<&'a TermEntry>,
    pub types: Vec<&'a str>,
    pub constructors: Vec<&'a ConstructorEntry>,
}

impl NamespaceListing<'_> {
    pub fn len_of(&self, category: Category) -> usize {
        match category {
            Category::Namespaces => self.namespaces.len(),
            Category::Terms => self.terms.len(),
            Category::Types => self.types.len(),
            Category::Constructors => self.constructors.len(),
        }
    }

    /// A header is shown only for a non-empty category.
    pub fn shows_header(&self, category: Category) -> bool {
        self.len_of(category) > 0
    }

    /// Categories whose header is shown, in display order.
    pub fn headers(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|c| self.shows_header(*c))
    }
}

/// Whether a child-namespace name is empty or whitespace only.
pub(crate) fn is_blank_name(name: &str) -> bool {
    name.trim().is_empty()
}

/// Order the contents of a namespace for display.
pub fn assemble(data: &SubtreeData) -> NamespaceListing<'_> {
    let mut namespaces: Vec<&str> = data
        .namespaces
        .iter()
        .map(String::as_str)
        .filter(|name| !is_blank_name(name))
        .collect();
    namespaces.sort();

    let mut terms: Vec<&TermEntry> = data.terms.iter().collect();
    terms.sort_by(|a, b| a.name.cmp(&b.name));

    let mut types: Vec<&str> = data.types.iter().map(String::as_str).collect();
    types.sort();

    let mut constructors: Vec<&ConstructorEntry> = data.constructors.iter().collect();
    constructors.sort_by(|a, b| a.name.cmp(&b.name));

    NamespaceListing {
        namespaces,
        terms,
        types,
        constructors,
    }
}
