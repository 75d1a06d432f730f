/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;

use crate::App;
use crate::theme::ThemeName;

/// Render the top status/header bar.
///
/// Line 1: app name • URL • head • loading count • watch count • poll
/// interval. Line 2: the last error if there is one, otherwise the
/// selected path.
pub(crate) fn render_header(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let l = &app.theme.labels;
    let s = &app.theme.scheme;

    let head = match app.browser.snapshot() {
        Some(snapshot) => Span::styled(format!("{}{}", l.head, snapshot), s.stat_head),
        None => Span::styled(l.no_head, s.info),
    };

    let mut line1_spans = vec![
        Span::styled(l.app_name, s.app_name),
        Span::styled(l.separator, s.stat_label),
        Span::styled(app.codebase.base_url(), s.stat_url),
        Span::styled(l.separator, s.stat_label),
        head,
    ];

    let in_flight = app.browser.coordinator().in_flight_count();
    if in_flight > 0 {
        line1_spans.extend(vec![
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.in_flight, s.stat_label),
            Span::styled(in_flight.to_string(), s.stat_timing),
        ]);
    }

    let watching = app.browser.watchers().len();
    if watching > 0 {
        line1_spans.extend(vec![
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.watching, s.stat_label),
            Span::styled(watching.to_string(), s.watched),
        ]);
    }

    // Skip the default theme to reduce noise.
    if !matches!(app.theme_name, ThemeName::Nord) {
        line1_spans.extend(vec![
            Span::styled(l.separator, s.stat_label),
            Span::styled(format!("theme:{}", app.theme_name), s.stat_head),
        ]);
    }

    if app.fixed_head {
        line1_spans.extend(vec![
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.fixed_icon, s.stat_timing),
        ]);
    } else if !app.poll_interval_label.is_empty() {
        line1_spans.extend(vec![
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.refresh_icon, s.stat_timing),
            Span::styled(app.poll_interval_label.as_str(), s.stat_timing),
        ]);
    }

    let line2 = if let Some(err) = &app.error {
        Line::from(Span::styled(format!("ERROR: {}", err), s.error))
    } else {
        match app.selected_path() {
            Some(path) if path.is_root() => Line::from(vec![
                Span::styled(l.selection_caret, s.stat_selection),
                Span::styled("/", s.stat_selection),
            ]),
            Some(path) => Line::from(vec![
                Span::styled(l.selection_caret, s.stat_selection),
                Span::styled(path.to_string(), s.stat_selection),
            ]),
            None => Line::from(Span::styled(l.no_selection, s.info)),
        }
    };

    let header = Paragraph::new(vec![Line::from(line1_spans), line2]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(s.border),
    );

    frame.render_widget(header, area);
}

/// Render the bottom help bar.
pub(crate) fn render_footer(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let footer = Paragraph::new(app.theme.labels.footer_help_text)
        .style(app.theme.scheme.footer_help)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}
