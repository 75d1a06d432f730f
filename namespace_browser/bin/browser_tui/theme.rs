/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use namespace_browser::ClientConfig;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Selectable color theme.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum ThemeName {
    /// Nord — an arctic, north-bluish color palette.
    #[default]
    Nord,
    /// doom-nord-light — desaturated Nord accents for light backgrounds.
    DoomNordLight,
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeName::Nord => write!(f, "nord"),
            ThemeName::DoomNordLight => write!(f, "doom-nord-light"),
        }
    }
}

/// Command-line arguments for the namespace browser.
#[derive(Debug, Parser)]
#[command(
    name = "namespace-browser",
    about = "Browse the namespace tree of a codebase server"
)]
pub(crate) struct Args {
    /// Codebase server address (e.g., 127.0.0.1:3000)
    #[arg(long, short, default_value = "127.0.0.1:3000")]
    pub(crate) addr: String,

    /// Browse this snapshot instead of following the server's head
    #[arg(long)]
    pub(crate) head: Option<String>,

    /// Head poll interval in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub(crate) poll_ms: u64,

    /// HTTP request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub(crate) timeout_ms: u64,

    /// PEM-encoded CA certificate for HTTPS
    #[arg(long)]
    pub(crate) tls_ca: Option<PathBuf>,

    /// Color theme
    #[arg(long, default_value_t = ThemeName::Nord, value_enum)]
    pub(crate) theme: ThemeName,

    /// Write logs to this file (no logging when unset)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// Log filter directives
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub(crate) log_filter: String,
}

impl Args {
    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig {
            addr: self.addr.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            tls_ca: self.tls_ca.clone(),
        }
    }
}

/// All user-visible text in the TUI.
pub(crate) struct Labels {
    pub(crate) app_name: &'static str,

    // Chrome / decoration
    pub(crate) separator: &'static str,
    pub(crate) selection_caret: &'static str,
    pub(crate) refresh_icon: &'static str,
    pub(crate) fixed_icon: &'static str,

    // Header stat labels
    pub(crate) head: &'static str,
    pub(crate) no_head: &'static str,
    pub(crate) in_flight: &'static str,
    pub(crate) watching: &'static str,
    pub(crate) no_selection: &'static str,

    // Tree pane
    pub(crate) loading: &'static str,
    pub(crate) watch_marker: &'static str,

    // Watch pane
    pub(crate) no_watches: &'static str,
    pub(crate) unknown_value: &'static str,

    // Pane titles
    pub(crate) pane_tree: &'static str,
    pub(crate) pane_watches: &'static str,

    pub(crate) footer_help_text: &'static str,
}

impl Labels {
    pub(crate) fn en() -> Self {
        Self {
            app_name: "namespace-browser",
            separator: " • ",
            selection_caret: "▸ ",
            refresh_icon: "⟳ ",
            fixed_icon: "⚓ ",
            head: "head: ",
            no_head: "no head",
            in_flight: "loading: ",
            watching: "watching: ",
            no_selection: "No selection",
            loading: " …",
            watch_marker: " [watch]",
            no_watches: "No watched terms. Select an evaluable term and press Enter.",
            unknown_value: "?",
            pane_tree: "Namespaces",
            pane_watches: "Watches",
            footer_help_text: "q: quit | j/k: navigate | g/G: top/bottom | Tab/Enter: open/close or watch | r: re-poll head",
        }
    }
}

/// Color scheme for the TUI, by semantic role.
pub(crate) struct ColorScheme {
    // UI chrome
    pub(crate) app_name: Style,
    pub(crate) border: Style,
    pub(crate) footer_help: Style,

    // Tree rows
    pub(crate) namespace: Style,
    pub(crate) header: Style,
    pub(crate) term: Style,
    pub(crate) term_inert: Style,
    pub(crate) type_name: Style,
    pub(crate) constructor: Style,
    pub(crate) watched: Style,
    pub(crate) loading: Style,

    // Semantic states
    pub(crate) error: Style,
    pub(crate) info: Style,

    // Header stats
    pub(crate) stat_label: Style,
    pub(crate) stat_url: Style,
    pub(crate) stat_timing: Style,
    pub(crate) stat_selection: Style,
    pub(crate) stat_head: Style,

    // Watch pane
    pub(crate) watch_type: Style,
    pub(crate) value_known: Style,
    pub(crate) value_unknown: Style,
}

impl ColorScheme {
    /// Nord color scheme (https://www.nordtheme.com/).
    pub(crate) fn nord() -> Self {
        let polar3 = Color::Rgb(76, 86, 106); // #4C566A
        let snow0 = Color::Rgb(216, 222, 233); // #D8DEE9
        let frost_teal = Color::Rgb(143, 188, 187); // #8FBCBB
        let frost_cyan = Color::Rgb(136, 192, 208); // #88C0D0
        let frost_blue = Color::Rgb(129, 161, 193); // #81A1C1
        let frost_dark = Color::Rgb(94, 129, 172); // #5E81AC
        let aurora_red = Color::Rgb(191, 97, 106); // #BF616A
        let aurora_orange = Color::Rgb(208, 135, 112); // #D08770
        let aurora_yellow = Color::Rgb(235, 203, 139); // #EBCB8B
        let aurora_green = Color::Rgb(163, 190, 140); // #A3BE8C
        let aurora_purple = Color::Rgb(180, 142, 173); // #B48EAD

        Self {
            app_name: Style::default().fg(frost_cyan).add_modifier(Modifier::BOLD),
            border: Style::default().fg(polar3),
            footer_help: Style::default().fg(polar3),

            namespace: Style::default().fg(frost_teal),
            header: Style::default().fg(polar3).add_modifier(Modifier::BOLD),
            term: Style::default().fg(frost_blue),
            term_inert: Style::default().fg(polar3).add_modifier(Modifier::ITALIC),
            type_name: Style::default().fg(aurora_yellow),
            constructor: Style::default().fg(aurora_orange),
            watched: Style::default().fg(aurora_green),
            loading: Style::default().fg(polar3),

            error: Style::default().fg(aurora_red),
            info: Style::default().fg(frost_cyan),

            stat_label: Style::default().fg(snow0),
            stat_url: Style::default().fg(polar3),
            stat_timing: Style::default().fg(aurora_yellow),
            stat_selection: Style::default().fg(aurora_purple),
            stat_head: Style::default().fg(frost_dark),

            watch_type: Style::default().fg(polar3),
            value_known: Style::default().fg(aurora_green),
            value_unknown: Style::default().fg(polar3),
        }
    }

    /// doom-nord-light color scheme.
    ///
    /// Desaturated Nord accents adapted for light backgrounds.
    pub(crate) fn doom_nord_light() -> Self {
        let base7 = Color::Rgb(96, 114, 140); // #60728C
        let fg = Color::Rgb(59, 66, 82); // #3B4252
        let red = Color::Rgb(153, 50, 75); // #99324B
        let orange = Color::Rgb(172, 68, 38); // #AC4426
        let green = Color::Rgb(79, 137, 76); // #4F894C
        let yellow = Color::Rgb(154, 117, 0); // #9A7500
        let blue = Color::Rgb(59, 110, 168); // #3B6EA8
        let dark_blue = Color::Rgb(82, 114, 175); // #5272AF
        let teal = Color::Rgb(41, 131, 141); // #29838D
        let cyan = Color::Rgb(57, 142, 172); // #398EAC
        let violet = Color::Rgb(132, 40, 121); // #842879

        Self {
            app_name: Style::default().fg(teal).add_modifier(Modifier::BOLD),
            border: Style::default().fg(base7),
            footer_help: Style::default().fg(base7),

            namespace: Style::default().fg(teal),
            header: Style::default().fg(base7).add_modifier(Modifier::BOLD),
            term: Style::default().fg(blue),
            term_inert: Style::default().fg(base7).add_modifier(Modifier::ITALIC),
            type_name: Style::default().fg(yellow),
            constructor: Style::default().fg(orange),
            watched: Style::default().fg(green),
            loading: Style::default().fg(base7),

            error: Style::default().fg(red),
            info: Style::default().fg(cyan),

            stat_label: Style::default().fg(fg),
            stat_url: Style::default().fg(base7),
            stat_timing: Style::default().fg(yellow),
            stat_selection: Style::default().fg(violet),
            stat_head: Style::default().fg(dark_blue),

            watch_type: Style::default().fg(base7),
            value_known: Style::default().fg(green),
            value_unknown: Style::default().fg(base7),
        }
    }
}

/// Complete visual presentation — colors + text.
pub(crate) struct Theme {
    pub(crate) scheme: ColorScheme,
    pub(crate) labels: Labels,
}

impl Theme {
    pub(crate) fn new(theme_name: ThemeName) -> Self {
        let scheme = match theme_name {
            ThemeName::Nord => ColorScheme::nord(),
            ThemeName::DoomNordLight => ColorScheme::doom_nord_light(),
        };
        Self {
            scheme,
            labels: Labels::en(),
        }
    }
}
