/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use namespace_browser::FlatRow;
use namespace_browser::RowKind;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;

use crate::App;
use crate::theme::Theme;

/// Text and style for one row, without selection decoration.
pub(crate) fn row_spans<'a>(row: &FlatRow<'_>, theme: &'a Theme) -> Vec<Span<'a>> {
    let scheme = &theme.scheme;
    let labels = &theme.labels;
    match &row.kind {
        RowKind::Namespace {
            path,
            open,
            loading,
        } => {
            let fold = if *open { "▼ " } else { "▶ " };
            let name = path.name().unwrap_or("");
            let mut spans = vec![Span::styled(
                format!("{}{}/", fold, name),
                scheme.namespace,
            )];
            if *loading {
                spans.push(Span::styled(labels.loading, scheme.loading));
            }
            spans
        }
        RowKind::Header(category) => vec![Span::styled(category.label(), scheme.header)],
        RowKind::Term {
            path,
            term,
            watched,
        } => {
            let name = path.name().unwrap_or("").to_string();
            let style = if term.is_evaluable() {
                scheme.term
            } else {
                scheme.term_inert
            };
            let mut spans = vec![
                Span::styled(name, style),
                Span::styled(format!(" : {}", term.type_desc), scheme.loading),
            ];
            if *watched {
                spans.push(Span::styled(labels.watch_marker, scheme.watched));
            }
            spans
        }
        RowKind::Type { path } => vec![Span::styled(
            path.name().unwrap_or("").to_string(),
            scheme.type_name,
        )],
        RowKind::Constructor { path, constructor } => vec![
            Span::styled(path.name().unwrap_or("").to_string(), scheme.constructor),
            Span::styled(format!(" #{}", constructor.tag), scheme.loading),
        ],
    }
}

/// Render the namespace tree (left pane).
///
/// Each row carries indentation and connectors, a fold glyph for
/// namespaces, and a per-kind style; the selected row is highlighted.
pub(crate) fn render_namespace_tree(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let rows = app.visible_rows();

    let items: Vec<ListItem> = rows
        .as_slice()
        .iter()
        .enumerate()
        .map(|(vis_idx, row)| {
            let indent = "  ".repeat(row.depth.saturating_sub(1));
            let connector = if row.depth == 0 {
                ""
            } else if rows.has_sibling_after(vis_idx, row.depth) {
                "├─ "
            } else {
                "└─ "
            };
            let selected = vis_idx == app.cursor.pos();
            let marker = if selected {
                app.theme.labels.selection_caret
            } else {
                "  "
            };

            let mut spans = vec![Span::styled(
                format!("{}{}{}", marker, indent, connector),
                app.theme.scheme.border,
            )];
            let body = row_spans(row, &app.theme);
            if selected {
                let style = app.theme.scheme.stat_selection.add_modifier(Modifier::BOLD);
                spans.extend(
                    body.into_iter()
                        .map(|span| Span::styled(span.content, style)),
                );
            } else {
                spans.extend(body);
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = Block::default()
        .title(app.theme.labels.pane_tree)
        .borders(Borders::ALL)
        .border_style(app.theme.scheme.border);

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default());
    let mut list_state = ListState::default()
        .with_selected(Some(app.cursor.pos()))
        .with_offset(app.tree_scroll_offset);
    frame.render_stateful_widget(list, area, &mut list_state);
}
