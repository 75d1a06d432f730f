/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use namespace_browser::FetchRequest;

/// Result of handling a key event.
#[derive(Debug)]
pub(crate) enum KeyResult {
    /// Nothing changed.
    None,
    /// Selection, expansion or watch state changed; redraw only.
    Changed,
    /// Expansion changed and these subtrees must be fetched.
    Fetch(Vec<FetchRequest>),
    /// Poll the server's head now.
    RefreshHead,
}
