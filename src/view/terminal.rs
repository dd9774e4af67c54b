//! Terminal UI implementation using ratatui
//!
//! Draws on stderr so that stdout stays reserved for the selected records.

use crate::error::{LinepickError, Result};
use crate::view::layout::ScreenLayout;
use crate::view::renderer::UIRenderer;
use crate::view::screen::Screen;
use crate::view::theme::ColorTheme;
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stderr};

type CrosstermTerminal = Terminal<CrosstermBackend<Stderr>>;

/// Terminal UI with a ratatui backend and a pluggable layout.
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
    layout: Box<dyn ScreenLayout>,
}

impl TerminalUI {
    pub fn new(layout: Box<dyn ScreenLayout>) -> Self {
        Self::with_theme(layout, ColorTheme::from_env())
    }

    pub fn with_theme(layout: Box<dyn ScreenLayout>, theme: ColorTheme) -> Self {
        Self {
            terminal: None,
            theme,
            layout,
        }
    }

    pub fn layout_name(&self) -> &'static str {
        self.layout.name()
    }
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, screen: &Screen) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;
            let layout = &self.layout;
            terminal.draw(move |frame| layout.draw(frame, screen, theme))?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode().map_err(|err| LinepickError::ui(format!("raw mode: {err}")))?;
        let mut stderr = io::stderr();
        execute!(stderr, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        self.terminal = Some(terminal);
        log::debug!("terminal initialized with {} layout", self.layout.name());

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if let Some(mut terminal) = self.terminal.take() {
            disable_raw_mode()?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            terminal.show_cursor()?;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }

    fn page_capacity(&self) -> Result<usize> {
        let (_, rows) = self.get_terminal_size()?;
        Ok(self.layout.lines_per_page(rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
