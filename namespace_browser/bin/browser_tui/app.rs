/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use futures::StreamExt;
use namespace_browser::Browser;
use namespace_browser::ClientConfig;
use namespace_browser::FetchCompletion;
use namespace_browser::FetchError;
use namespace_browser::FetchRequest;
use namespace_browser::HttpCodebase;
use namespace_browser::Path;
use namespace_browser::Reconciliation;
use namespace_browser::RowKind;
use namespace_browser::Snapshot;
use namespace_browser::SubtreeSource;
use namespace_browser::TermEntry;
use namespace_browser::spawn_fetch;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::Args;
use crate::Cursor;
use crate::KeyResult;
use crate::Theme;
use crate::ThemeName;
use crate::VisibleRows;
use crate::render::ui;

/// Outcome of one `GET /head` poll.
pub(crate) type HeadResult = Result<Option<Snapshot>, FetchError>;

/// What the selected row would do on Tab/Enter.
enum Selected {
    Namespace(Path),
    Term(Path, TermEntry),
    Inert,
}

/// Runtime state for the browser TUI.
///
/// `App` owns the browsing session and the UI state around it. All
/// mutation happens on the event loop; subtree fetches and head polls
/// run as spawned tasks and come back through `completions` and
/// `heads`.
pub(crate) struct App {
    pub(crate) codebase: Arc<HttpCodebase>,
    pub(crate) browser: Browser,
    pub(crate) cursor: Cursor,
    /// Set when the user requests exit (`q` / `Ctrl-C`).
    pub(crate) should_quit: bool,
    /// Most recent fetch or head-poll failure, cleared on success.
    pub(crate) error: Option<String>,
    /// True when the snapshot was pinned on the command line.
    pub(crate) fixed_head: bool,
    pub(crate) theme: Theme,
    pub(crate) theme_name: ThemeName,
    pub(crate) poll_interval_label: String,
    pub(crate) tree_scroll_offset: usize,
    pub(crate) tree_viewport_height: usize,
    /// True while a head poll is outstanding.
    pub(crate) head_poll_pending: bool,
    completions: mpsc::UnboundedSender<FetchCompletion>,
    heads: mpsc::UnboundedSender<HeadResult>,
}

impl App {
    /// Create an app with the root namespace open. Nothing is fetched
    /// until a head is applied.
    pub(crate) fn new(
        config: &ClientConfig,
        theme_name: ThemeName,
        completions: mpsc::UnboundedSender<FetchCompletion>,
        heads: mpsc::UnboundedSender<HeadResult>,
    ) -> Self {
        let mut browser = Browser::new();
        browser.set_open(&Path::root(), true);
        let len = browser.rows().len();
        Self {
            codebase: Arc::new(HttpCodebase::new(config)),
            browser,
            cursor: Cursor::new(len),
            should_quit: false,
            error: None,
            fixed_head: false,
            theme: Theme::new(theme_name),
            theme_name,
            poll_interval_label: String::new(),
            tree_scroll_offset: 0,
            tree_viewport_height: 20,
            head_poll_pending: false,
            completions,
            heads,
        }
    }

    pub(crate) fn visible_rows(&self) -> VisibleRows<'_> {
        VisibleRows::new(self.browser.rows())
    }

    pub(crate) fn selected_path(&self) -> Option<Path> {
        self.visible_rows()
            .get(&self.cursor)
            .and_then(|row| row.path().cloned())
    }

    /// Start fetches on the runtime; completions arrive on the event
    /// loop's channel.
    pub(crate) fn dispatch(&self, requests: Vec<FetchRequest>) {
        for request in requests {
            let source: Arc<dyn SubtreeSource> = self.codebase.clone();
            spawn_fetch(source, request, self.completions.clone());
        }
    }

    /// Switch to a new head, keeping the selection on the same path
    /// where it is still visible.
    pub(crate) fn apply_head(&mut self, head: Option<Snapshot>) -> Vec<FetchRequest> {
        let selected = self.selected_path();
        let requests = self.browser.set_snapshot(head);
        self.restore_selection(selected);
        requests
    }

    /// Reconcile a completed fetch and return any follow-up fetches.
    pub(crate) fn complete(&mut self, completion: FetchCompletion) -> Vec<FetchRequest> {
        let key = completion.request.key.clone();
        let selected = self.selected_path();
        let (outcome, requests) = self.browser.complete(completion);
        match outcome {
            Reconciliation::Committed => {
                self.error = None;
            }
            Reconciliation::Stale { .. } => {}
            Reconciliation::Failed(err) => {
                let name = if key.is_root() { "/" } else { key.as_str() };
                self.error = Some(format!("{}: {}", name, err));
            }
        }
        self.restore_selection(selected);
        requests
    }

    /// Start a head poll on the runtime; the result arrives on the
    /// event loop's head channel. At most one poll is outstanding.
    pub(crate) fn request_head(&mut self) {
        if self.fixed_head || self.head_poll_pending {
            return;
        }
        self.head_poll_pending = true;
        let codebase = Arc::clone(&self.codebase);
        let heads = self.heads.clone();
        tokio::spawn(async move {
            let result = codebase.fetch_head().await;
            // A closed receiver means the app is gone.
            let _ = heads.send(result);
        });
    }

    /// Apply the outcome of a head poll and return the fetches it
    /// makes necessary.
    pub(crate) fn on_head(&mut self, result: HeadResult) -> Vec<FetchRequest> {
        self.head_poll_pending = false;
        match result {
            Ok(head) => self.apply_head(head),
            Err(err) => {
                tracing::warn!(error = %err, "head poll failed");
                self.error = Some(format!("head: {}", err));
                Vec::new()
            }
        }
    }

    /// Re-clamp the cursor after the rows changed, following `prev`
    /// if it is still visible.
    fn restore_selection(&mut self, prev: Option<Path>) {
        let rows = self.visible_rows();
        let found = prev.and_then(|prev| {
            rows.as_slice()
                .iter()
                .position(|row| row.path() == Some(&prev))
        });
        let len = rows.len();
        self.cursor.update_len(len);
        if let Some(pos) = found {
            self.cursor.set_pos(pos);
        }
        self.ensure_cursor_visible();
    }

    /// Adjust scroll offset so the cursor stays inside the viewport.
    pub(crate) fn ensure_cursor_visible(&mut self) {
        let pos = self.cursor.pos();
        if pos < self.tree_scroll_offset {
            self.tree_scroll_offset = pos;
        } else if pos >= self.tree_scroll_offset + self.tree_viewport_height {
            self.tree_scroll_offset = pos.saturating_sub(self.tree_viewport_height.saturating_sub(1));
        }
    }

    fn selected(&self) -> Selected {
        let rows = self.visible_rows();
        match rows.get(&self.cursor).map(|row| &row.kind) {
            Some(RowKind::Namespace { path, .. }) => Selected::Namespace(path.clone()),
            Some(RowKind::Term { path, term, .. }) => Selected::Term(path.clone(), (*term).clone()),
            _ => Selected::Inert,
        }
    }

    fn moved(&mut self, changed: bool) -> KeyResult {
        if changed {
            self.ensure_cursor_visible();
            KeyResult::Changed
        } else {
            KeyResult::None
        }
    }

    /// Handle a single keypress.
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> KeyResult {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                KeyResult::None
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                KeyResult::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let changed = self.cursor.move_up();
                self.moved(changed)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let changed = self.cursor.move_down();
                self.moved(changed)
            }
            KeyCode::Home | KeyCode::Char('g') => {
                let changed = self.cursor.home();
                self.moved(changed)
            }
            KeyCode::End | KeyCode::Char('G') => {
                let changed = self.cursor.end();
                self.moved(changed)
            }
            KeyCode::PageDown => {
                let changed = self.cursor.page_down(10);
                self.moved(changed)
            }
            KeyCode::PageUp => {
                let changed = self.cursor.page_up(10);
                self.moved(changed)
            }
            KeyCode::Tab | KeyCode::Enter => match self.selected() {
                Selected::Namespace(path) => {
                    let requests = self.browser.toggle_namespace(&path);
                    self.restore_selection(Some(path));
                    KeyResult::Fetch(requests)
                }
                Selected::Term(path, term) => {
                    if self.browser.toggle_term(&path, &term) {
                        KeyResult::Changed
                    } else {
                        KeyResult::None
                    }
                }
                Selected::Inert => KeyResult::None,
            },
            KeyCode::Char('r') if !self.fixed_head => KeyResult::RefreshHead,
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                // Scroll selected item to top of visible area
                self.tree_scroll_offset = self.cursor.pos();
                KeyResult::None
            }
            _ => KeyResult::None,
        }
    }
}

/// Drive the main event loop.
///
/// Polls the head on an interval (unless pinned), reconciles fetch
/// completions and head results as they arrive, and processes
/// keyboard input until the user exits. Nothing in the loop awaits the
/// network.
pub(crate) async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    args: &Args,
    mut app: App,
    mut completions: mpsc::UnboundedReceiver<FetchCompletion>,
    mut heads: mpsc::UnboundedReceiver<HeadResult>,
) -> io::Result<()> {
    let mut poll_interval = tokio::time::interval(Duration::from_millis(args.poll_ms.max(1)));
    app.poll_interval_label = if args.poll_ms >= 1000 && args.poll_ms.is_multiple_of(1000) {
        format!("{}s", args.poll_ms / 1000)
    } else {
        format!("{}ms", args.poll_ms)
    };
    let mut events = EventStream::new();

    loop {
        // Body area is terminal height minus header (3 rows) and
        // footer (2 rows) and the pane border (2 rows).
        let terminal_size = terminal.size()?;
        app.tree_viewport_height = terminal_size.height.saturating_sub(7).max(1) as usize;

        terminal.draw(|frame| ui(frame, &app))?;

        tokio::select! {
            _ = poll_interval.tick(), if !app.fixed_head => {
                app.request_head();
            }
            Some(head) = heads.recv() => {
                let requests = app.on_head(head);
                app.dispatch(requests);
            }
            Some(completion) = completions.recv() => {
                let requests = app.complete(completion);
                app.dispatch(requests);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => match app.on_key(key) {
                        KeyResult::Fetch(requests) => app.dispatch(requests),
                        KeyResult::RefreshHead => app.request_head(),
                        KeyResult::Changed | KeyResult::None => {}
                    },
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err),
                    None => break,
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
