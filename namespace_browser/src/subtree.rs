/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Subtree payloads returned by the codebase server.
//!
//! On the wire a subtree is a 4-element JSON array:
//!
//! ```text
//! [ namespaces, terms, types, constructors ]
//!   namespaces:   ["name", ...]
//!   terms:        [["name", type, evalCapability, "hash"], ...]
//!   types:        ["name", ...]
//!   constructors: [["name", "hash", tagIndex], ...]
//! ```
//!
//! `evalCapability` is falsy (`false`, `null`, `0`, `""`) for terms
//! that cannot be evaluated, or an array whose first element is the
//! list of argument types. Type descriptions may be plain strings or
//! structured JSON; structured values are kept as compact JSON text.
//!
//! Decoding is strict about the outer shape and lenient about
//! entries: details the server has been seen to vary (extra tuple
//! elements, non-string hashes) are accepted, and an entry that cannot
//! be read at all is skipped with a warning so the rest of the
//! namespace still shows.

use serde::Deserialize;
use serde_json::Value;

/// Why a subtree payload could not be decoded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload did not have the expected outer structure.
    #[error("malformed subtree: expected {0}")]
    Shape(&'static str),
    /// A single entry within a category was malformed. Such entries
    /// are skipped during decoding; the error only describes them.
    #[error("malformed {category} entry at index {index}: {reason}")]
    Entry {
        category: &'static str,
        index: usize,
        reason: String,
    },
}

/// Evaluation capability of a term: the ordered argument types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalCapability {
    pub args: Vec<String>,
}

impl EvalCapability {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A term listed in a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermEntry {
    pub name: String,
    /// Declared type, rendered as text.
    pub type_desc: String,
    /// Present only for terms the evaluator can run.
    pub eval: Option<EvalCapability>,
    pub hash: String,
}

impl TermEntry {
    pub fn is_evaluable(&self) -> bool {
        self.eval.is_some()
    }
}

/// A data constructor listed in a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorEntry {
    pub name: String,
    pub hash: String,
    pub tag: u64,
}

/// Contents of one namespace, split by category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct SubtreeData {
    pub namespaces: Vec<String>,
    pub terms: Vec<TermEntry>,
    pub types: Vec<String>,
    pub constructors: Vec<ConstructorEntry>,
}

impl SubtreeData {
    /// Decode a subtree from its JSON wire form.
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let parts = value
            .as_array()
            .ok_or(DecodeError::Shape("a 4-element array"))?;
        if parts.len() < 4 {
            return Err(DecodeError::Shape("a 4-element array"));
        }
        let list = |idx: usize, what: &'static str| {
            parts[idx].as_array().ok_or(DecodeError::Shape(what))
        };

        let namespaces = decode_entries(list(0, "a namespace list")?, |v, index| {
            name_of(v, "namespace", index)
        });
        let terms = decode_entries(list(1, "a term list")?, decode_term);
        let types = decode_entries(list(2, "a type list")?, |v, index| name_of(v, "type", index));
        let constructors = decode_entries(list(3, "a constructor list")?, decode_constructor);

        Ok(Self {
            namespaces,
            terms,
            types,
            constructors,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
            && self.terms.is_empty()
            && self.types.is_empty()
            && self.constructors.is_empty()
    }
}

impl TryFrom<Value> for SubtreeData {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

/// Decode every entry of one category, skipping the malformed ones.
fn decode_entries<T>(
    items: &[Value],
    decode: impl Fn(&Value, usize) -> Result<T, DecodeError>,
) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, v)| match decode(v, index) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed subtree entry");
                None
            }
        })
        .collect()
}

/// Render a type (or hash) description as text.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style falsiness, which is how the server marks a
/// missing evaluation capability.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// A bare name, or a tuple whose first element is the name.
fn name_of(value: &Value, category: &'static str, index: usize) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => match items.first() {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(DecodeError::Entry {
                category,
                index,
                reason: "tuple does not start with a name".to_string(),
            }),
        },
        other => Err(DecodeError::Entry {
            category,
            index,
            reason: format!("expected a name, got {}", other),
        }),
    }
}

fn tuple<'a>(
    value: &'a Value,
    category: &'static str,
    index: usize,
    min_len: usize,
) -> Result<&'a [Value], DecodeError> {
    match value.as_array() {
        Some(items) if items.len() >= min_len => Ok(items),
        _ => Err(DecodeError::Entry {
            category,
            index,
            reason: format!("expected a tuple of at least {} elements", min_len),
        }),
    }
}

fn decode_eval(value: &Value, index: usize) -> Result<Option<EvalCapability>, DecodeError> {
    if is_falsy(value) {
        return Ok(None);
    }
    let bad = |reason: &str| DecodeError::Entry {
        category: "term",
        index,
        reason: reason.to_string(),
    };
    let items = value
        .as_array()
        .ok_or_else(|| bad("evaluation capability is not an array"))?;
    // Canonically `[[arg, ...], ...]`; a flat `[arg, ...]` is accepted
    // as shorthand for the argument list itself.
    let args = match items.first() {
        None => Vec::new(),
        Some(Value::Array(args)) => args.iter().map(describe).collect(),
        Some(_) if items.iter().all(|v| !v.is_array()) => items.iter().map(describe).collect(),
        Some(_) => return Err(bad("evaluation capability has no argument list")),
    };
    Ok(Some(EvalCapability { args }))
}

fn decode_term(value: &Value, index: usize) -> Result<TermEntry, DecodeError> {
    let items = tuple(value, "term", index, 4)?;
    let name = name_of(&items[0], "term", index)?;
    Ok(TermEntry {
        name,
        type_desc: describe(&items[1]),
        eval: decode_eval(&items[2], index)?,
        hash: describe(&items[3]),
    })
}

fn decode_constructor(value: &Value, index: usize) -> Result<ConstructorEntry, DecodeError> {
    let items = tuple(value, "constructor", index, 3)?;
    let name = name_of(&items[0], "constructor", index)?;
    let tag = items[2].as_u64().ok_or_else(|| DecodeError::Entry {
        category: "constructor",
        index,
        reason: format!("tag index is not a non-negative integer: {}", items[2]),
    })?;
    Ok(ConstructorEntry {
        name,
        hash: describe(&items[1]),
        tag,
    })
}
