/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Interactive TUI for browsing the namespace tree of a codebase
//! server.
//!
//! The tree is loaded lazily: opening a namespace fetches
//! `GET /terms/{head}/{namespace}` once per head, and the head itself
//! is polled from `GET /head`. Evaluable terms can be selected for
//! watching; the watch pane shows each watched term's argument slots.
//!
//! Invariants the UI relies on:
//! - **Single event loop**: all session state is mutated on the loop
//!   in [`app::run_app`]; fetches run as spawned tasks and report
//!   back over a channel.
//! - **Stale discard**: a completion for a head that is no longer
//!   current is dropped, never shown.
//! - **Selection follows the path**: when rows shift (a subtree
//!   loads, the head changes) the cursor stays on the same path if it
//!   is still visible, otherwise it is clamped.
//!
//! ```bash
//! namespace-browser --addr 127.0.0.1:3000
//! namespace-browser --addr https://codebase.example --tls-ca ca.pem --head '#abc123'
//! ```

mod actions;
mod app;
mod model;
mod render;
mod theme;

use std::io;
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) use actions::*;
use anyhow::Context;
pub(crate) use app::*;
use clap::Parser;
use crossterm::ExecutableCommand;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
pub(crate) use model::*;
use namespace_browser::Snapshot;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
pub(crate) use theme::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Install a file-backed subscriber when `--log-file` is given.
///
/// Without a log file nothing is installed, so log output can never
/// corrupt the alternate screen.
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_new(&args.log_filter)
        .with_context(|| format!("invalid log filter {:?}", args.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// Terminal setup / teardown

/// Enable raw mode and switch to the alternate screen.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Restore the terminal back to normal shell mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !io::stdout().is_terminal() {
        eprintln!("This TUI requires a real terminal.");
        return Ok(());
    }

    init_logging(&args)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let (head_tx, head_rx) = mpsc::unbounded_channel();
    let mut app = App::new(&args.client_config(), args.theme, tx, head_tx);
    tracing::info!(base_url = app.codebase.base_url(), "starting namespace browser");

    // The spinner runs before the alternate screen so it is visible
    // as a normal terminal line.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));

    match &args.head {
        Some(head) => {
            app.fixed_head = true;
            let requests = app.apply_head(Some(Snapshot::new(head.as_str())));
            app.dispatch(requests);
        }
        None => {
            spinner.set_message(format!(
                "namespace-browser — resolving head at {} ...",
                app.codebase.base_url()
            ));
            let head = app.codebase.fetch_head().await;
            let requests = app.on_head(head);
            app.dispatch(requests);
        }
    }

    spinner.finish_and_clear();

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &args, app, rx, head_rx).await;
    restore_terminal(&mut terminal)?;
    Ok(result?)
}

#[cfg(test)]
mod tests;
