/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use namespace_browser::SlotValue;
use namespace_browser::watchers::WatcherDescriptor;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use serde_json::Value;

use crate::App;
use crate::theme::Theme;

fn format_value(value: &SlotValue, theme: &Theme) -> Span<'static> {
    match value {
        SlotValue::Unknown => Span::styled(theme.labels.unknown_value, theme.scheme.value_unknown),
        SlotValue::Known(Value::String(s)) => Span::styled(s.clone(), theme.scheme.value_known),
        SlotValue::Known(other) => Span::styled(other.to_string(), theme.scheme.value_known),
    }
}

/// Lines for one watched term: its path and type, then one line per
/// argument slot.
pub(crate) fn watcher_lines<'a>(
    name: &str,
    descriptor: &WatcherDescriptor,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(name.to_string(), theme.scheme.watched),
        Span::styled(format!(" : {}", descriptor.type_desc), theme.scheme.watch_type),
    ])];
    for (index, (arg, value)) in descriptor.args.iter().zip(descriptor.values()).enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: {} = ", index, arg), theme.scheme.stat_label),
            format_value(value, theme),
        ]));
    }
    lines
}

/// Render the watched terms (right pane).
pub(crate) fn render_watch_pane(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let watchers = app.browser.watchers();
    let lines: Vec<Line> = if watchers.is_empty() {
        vec![Line::from(Span::styled(
            app.theme.labels.no_watches,
            app.theme.scheme.info,
        ))]
    } else {
        watchers
            .iter()
            .flat_map(|(name, descriptor)| watcher_lines(name, descriptor, &app.theme))
            .collect()
    };

    let block = Block::default()
        .title(app.theme.labels.pane_watches)
        .borders(Borders::ALL)
        .border_style(app.theme.scheme.border);
    let pane = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(pane, area);
}
