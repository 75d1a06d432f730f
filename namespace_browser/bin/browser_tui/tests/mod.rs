/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Tests that exercise the TUI modules together (App + cursor +
//! render). Fetches are completed by hand instead of over HTTP.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use namespace_browser::ClientConfig;
use namespace_browser::FetchCompletion;
use namespace_browser::FetchError;
use namespace_browser::FetchRequest;
use namespace_browser::NamespaceKey;
use namespace_browser::Path;
use namespace_browser::SubtreeData;
use ratatui::backend::TestBackend;
use serde_json::json;

use super::*;
use crate::render::ui;

fn app_at(
    addr: &str,
) -> (
    App,
    mpsc::UnboundedReceiver<FetchCompletion>,
    mpsc::UnboundedReceiver<HeadResult>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (head_tx, head_rx) = mpsc::unbounded_channel();
    let app = App::new(
        &ClientConfig {
            addr: addr.into(),
            ..ClientConfig::default()
        },
        ThemeName::Nord,
        tx,
        head_tx,
    );
    (app, rx, head_rx)
}

fn test_app() -> (App, mpsc::UnboundedReceiver<FetchCompletion>) {
    let (app, rx, _heads) = app_at("localhost:3000");
    (app, rx)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn payload(value: serde_json::Value) -> SubtreeData {
    SubtreeData::from_json(&value).unwrap()
}

/// Complete `request` successfully and return the follow-ups.
fn answer(app: &mut App, request: FetchRequest, data: SubtreeData) -> Vec<FetchRequest> {
    app.complete(FetchCompletion {
        request,
        result: Ok(data),
    })
}

/// An app at head `s1` with the root namespace loaded.
fn loaded_app() -> App {
    let (mut app, _rx) = test_app();
    let mut requests = app.apply_head(Some(Snapshot::from("s1")));
    assert_eq!(requests.len(), 1);
    let follow_up = answer(
        &mut app,
        requests.remove(0),
        payload(json!([
            ["lib"],
            [["main", "'{IO} ()", [[]], "#m"], ["pi", "Float", false, "#p"]],
            [],
            []
        ])),
    );
    assert!(follow_up.is_empty());
    app
}

fn row_text(app: &App) -> Vec<String> {
    app.visible_rows()
        .as_slice()
        .iter()
        .map(|row| {
            crate::render::tree_pane::row_spans(row, &app.theme)
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect()
}

#[test]
fn cursor_stays_in_bounds() {
    let mut cursor = Cursor::new(0);
    assert!(!cursor.move_down());
    assert!(!cursor.end());
    assert_eq!(cursor.pos(), 0);

    let mut cursor = Cursor::new(3);
    assert!(cursor.end());
    assert_eq!(cursor.pos(), 2);
    assert!(!cursor.move_down());
    cursor.update_len(1);
    assert_eq!(cursor.pos(), 0);
    cursor.set_pos(5);
    assert_eq!(cursor.pos(), 0);
    assert!(!cursor.page_up(10));
}

#[test]
fn root_is_open_but_loading_before_head() {
    let (app, _rx) = test_app();
    assert_eq!(row_text(&app), vec!["▼ / …"]);
    assert_eq!(app.cursor.len(), 1);
    assert_eq!(app.browser.coordinator().in_flight_count(), 0);
}

#[test]
fn loaded_root_lists_children() {
    let app = loaded_app();
    assert_eq!(
        row_text(&app),
        vec![
            "▼ /",
            "Namespaces",
            "▶ lib/",
            "Terms",
            "main : '{IO} ()",
            "pi : Float",
        ]
    );
}

#[test]
fn tab_on_namespace_requests_it() {
    let mut app = loaded_app();
    app.on_key(key(KeyCode::Down));
    app.on_key(key(KeyCode::Down));
    assert_eq!(app.selected_path(), Some(Path::from_segments(["lib"]).unwrap()));

    let KeyResult::Fetch(requests) = app.on_key(key(KeyCode::Tab)) else {
        panic!("expected a fetch");
    };
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].key, NamespaceKey::from("lib"));
    assert_eq!(requests[0].snapshot, Snapshot::from("s1"));
    assert!(row_text(&app).contains(&"▼ lib/ …".to_string()));

    // Closing again does not fetch.
    let KeyResult::Fetch(requests) = app.on_key(key(KeyCode::Tab)) else {
        panic!("expected a fetch result");
    };
    assert!(requests.is_empty());
}

#[test]
fn enter_watches_only_evaluable_terms() {
    let mut app = loaded_app();
    app.on_key(key(KeyCode::End));
    // "pi" is not evaluable.
    assert!(matches!(app.on_key(key(KeyCode::Enter)), KeyResult::None));
    assert!(app.browser.watchers().is_empty());

    app.on_key(key(KeyCode::Up));
    assert!(matches!(app.on_key(key(KeyCode::Enter)), KeyResult::Changed));
    assert_eq!(app.browser.watchers().len(), 1);
    assert!(row_text(&app).contains(&"main : '{IO} () [watch]".to_string()));

    app.on_key(key(KeyCode::Enter));
    assert!(app.browser.watchers().is_empty());
}

#[test]
fn selection_follows_path_when_rows_shift() {
    let (mut app, _rx) = test_app();
    let mut requests = app.apply_head(Some(Snapshot::from("s1")));
    answer(
        &mut app,
        requests.remove(0),
        payload(json!([["b", "a"], [], [], []])),
    );
    // Select "b", then load "a" above it.
    app.on_key(key(KeyCode::End));
    let b = Path::from_segments(["b"]).unwrap();
    assert_eq!(app.selected_path(), Some(b.clone()));

    let mut a_requests = app
        .browser
        .set_open(&Path::from_segments(["a"]).unwrap(), true);
    let a_request = a_requests.remove(0);
    let KeyResult::Fetch(_) = app.on_key(key(KeyCode::Tab)) else {
        panic!("expected a fetch result");
    };
    // Tab on "b" opened it; its request is outstanding.
    assert_eq!(app.selected_path(), Some(b.clone()));
    answer(&mut app, a_request, payload(json!([["x", "y"], [], [], []])));
    assert_eq!(app.selected_path(), Some(b));
}

#[test]
fn failed_fetch_is_reported_and_cleared_by_success() {
    let (mut app, _rx) = test_app();
    let mut requests = app.apply_head(Some(Snapshot::from("s1")));
    let request = requests.remove(0);
    app.complete(FetchCompletion {
        request: request.clone(),
        result: Err(FetchError::Status(503)),
    });
    assert_eq!(app.error.as_deref(), Some("/: HTTP 503"));

    // Reopening the root retries.
    app.on_key(key(KeyCode::Tab));
    let KeyResult::Fetch(mut retry) = app.on_key(key(KeyCode::Tab)) else {
        panic!("expected a fetch result");
    };
    answer(&mut app, retry.remove(0), payload(json!([[], [], [], []])));
    assert_eq!(app.error, None);
}

#[test]
fn stale_completion_is_not_shown() {
    let (mut app, _rx) = test_app();
    let mut requests = app.apply_head(Some(Snapshot::from("s1")));
    let old = requests.remove(0);
    let new = app.apply_head(Some(Snapshot::from("s2")));
    assert_eq!(new.len(), 1);

    answer(&mut app, old, payload(json!([["stale"], [], [], []])));
    assert_eq!(row_text(&app), vec!["▼ / …"]);
}

#[tokio::test]
async fn head_poll_reports_back_without_blocking() {
    // Nothing listens on port 1, so the poll fails fast.
    let (mut app, _rx, mut heads) = app_at("127.0.0.1:1");
    app.request_head();
    assert!(app.head_poll_pending);
    // A tick while a poll is outstanding does not start another.
    app.request_head();

    let result = heads.recv().await.unwrap();
    assert!(matches!(result, Err(FetchError::Transport(_))));
    assert!(app.on_head(result).is_empty());
    assert!(!app.head_poll_pending);
    assert!(app.error.as_deref().is_some_and(|e| e.starts_with("head: ")));
    assert!(heads.try_recv().is_err());

    let requests = app.on_head(Ok(Some(Snapshot::from("s1"))));
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].key, NamespaceKey::root());
}

#[test]
fn fixed_head_never_polls() {
    let (mut app, _rx, _heads) = app_at("localhost:3000");
    app.fixed_head = true;
    app.request_head();
    assert!(!app.head_poll_pending);
}

#[test]
fn quit_keys() {
    let (mut app, _rx) = test_app();
    app.on_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);

    let (mut app, _rx) = test_app();
    app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
}

#[test]
fn refresh_key_is_disabled_for_fixed_head() {
    let (mut app, _rx) = test_app();
    assert!(matches!(
        app.on_key(key(KeyCode::Char('r'))),
        KeyResult::RefreshHead
    ));
    app.fixed_head = true;
    assert!(matches!(app.on_key(key(KeyCode::Char('r'))), KeyResult::None));
}

#[test]
fn frame_renders_header_tree_and_watches() {
    let mut app = loaded_app();
    app.on_key(key(KeyCode::End));
    app.on_key(key(KeyCode::Up));
    app.on_key(key(KeyCode::Enter));

    let mut terminal = ratatui::Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|frame| ui(frame, &app)).unwrap();
    let screen: String = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect();

    assert!(screen.contains("namespace-browser"));
    assert!(screen.contains("http://localhost:3000"));
    assert!(screen.contains("head: s1"));
    assert!(screen.contains("lib/"));
    assert!(screen.contains("watching: 1"));
    assert!(screen.contains("main : '{IO} ()"));
}
