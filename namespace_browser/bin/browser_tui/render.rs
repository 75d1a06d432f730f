/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

pub mod status_bar;
pub mod tree_pane;
pub mod watch_pane;

use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;

use self::status_bar::render_footer;
use self::status_bar::render_header;
use self::tree_pane::render_namespace_tree;
use self::watch_pane::render_watch_pane;
use crate::App;

/// Render a full frame of the TUI.
///
/// Splits the screen into header/body/footer regions and delegates to
/// the corresponding render helpers.
pub(crate) fn ui(frame: &mut ratatui::Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_body(frame, chunks[1], app);
    render_footer(frame, chunks[2], app);
}

/// Namespace tree on the left, watched terms on the right.
pub(crate) fn render_body(frame: &mut ratatui::Frame<'_>, area: ratatui::layout::Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_namespace_tree(frame, chunks[0], app);
    render_watch_pane(frame, chunks[1], app);
}
