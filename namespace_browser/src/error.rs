/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::subtree::DecodeError;

/// A subtree (or head) fetch that did not produce usable data.
///
/// None of these are fatal: the namespace stays uncached and is
/// retried on the next qualifying trigger.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The body was not a well-formed payload.
    #[error("parse error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}
