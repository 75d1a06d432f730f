/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Namespace paths and their flat string keys.
//!
//! A [`Path`] is an ordered list of non-empty segments; the root is
//! the empty list. A [`NamespaceKey`] is the segments joined with
//! `.`, so the root maps to `""`. The key is a pure function of the
//! path and is used both as the cache/expansion key and for display.
//!
//! Round-trip law: for segments that contain no `.`,
//! `NamespaceKey::from(&p).to_path() == p`.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Separator between segments in a [`NamespaceKey`].
pub const SEGMENT_SEPARATOR: char = '.';

/// Errors constructing a [`Path`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment was empty.
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
}

/// An ordered sequence of non-empty name segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Path(Vec<String>);

impl Path {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments, rejecting empty ones.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathError::EmptySegment(pos));
        }
        Ok(Self(segments))
    }

    /// Extend this path by one segment.
    pub fn child(&self, name: &str) -> Result<Self, PathError> {
        if name.is_empty() {
            return Err(PathError::EmptySegment(self.0.len()));
        }
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Ok(Self(segments))
    }

    /// The path with the last segment removed, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// All strict ancestors from the root down to the parent.
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (0..self.0.len()).map(|n| Self(self.0[..n].to_vec()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, or `None` at the root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The flat key for this path.
    pub fn key(&self) -> NamespaceKey {
        NamespaceKey::from(self)
    }
}

impl TryFrom<Vec<String>> for Path {
    type Error = PathError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_segments(segments)
    }
}

impl From<Path> for Vec<String> {
    fn from(path: Path) -> Self {
        path.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Flat string form of a [`Path`]: segments joined by `.`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceKey(String);

impl NamespaceKey {
    /// Key of the root namespace (`""`).
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Split the key back into a path. The empty key is the root;
    /// empty pieces (from `..` or a leading/trailing dot) are dropped.
    pub fn to_path(&self) -> Path {
        if self.0.is_empty() {
            return Path::root();
        }
        Path(
            self.0
                .split(SEGMENT_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<&Path> for NamespaceKey {
    fn from(path: &Path) -> Self {
        Self(path.0.join("."))
    }
}

impl From<&str> for NamespaceKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
