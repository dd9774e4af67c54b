//! Color theme and styling definitions using ratatui colors

use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone)]
pub struct ColorTheme {
    /// Normal text color (None uses terminal default)
    pub normal_text: Option<Color>,

    /// Query term highlighting inside a matched line
    pub query_match: Style,

    /// The line under the cursor
    pub cursor_line: Style,

    /// Marked lines and the pending range
    pub selection: Style,

    /// Prompt label in front of the query
    pub prompt: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            normal_text: None,
            query_match: Style::default().fg(Color::Black).bg(Color::Yellow),
            cursor_line: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            selection: Style::default().fg(Color::White).bg(Color::Magenta),
            prompt: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            status_bg: Color::Blue,
            status_fg: Color::White,
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            normal_text: None,
            query_match: Style::default().add_modifier(Modifier::UNDERLINED),
            cursor_line: Style::default().add_modifier(Modifier::REVERSED),
            selection: Style::default().add_modifier(Modifier::BOLD),
            prompt: Style::default().add_modifier(Modifier::BOLD),
            status_bg: Color::Black,
            status_fg: Color::White,
        }
    }

    /// Pick the monochrome theme when `NO_COLOR` is set, else the default.
    pub fn from_env() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(value) if !value.is_empty() => Self::monochrome(),
            _ => Self::default(),
        }
    }

    /// Base style for a list line given its state.
    pub fn line_style(&self, is_cursor: bool, is_selected: bool) -> Style {
        let base = match self.normal_text {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        };
        match (is_cursor, is_selected) {
            // Cursor colours win; the underline keeps the mark visible
            (true, true) => base
                .patch(self.cursor_line)
                .add_modifier(Modifier::UNDERLINED),
            (true, false) => base.patch(self.cursor_line),
            (false, true) => base.patch(self.selection),
            (false, false) => base,
        }
    }

    pub fn status_style(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.status_fg)
    }
}
