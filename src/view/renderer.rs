//! UI renderer trait
//!
//! This module defines the `UIRenderer` trait the view loop draws through, so the
//! loop can run against a real terminal or a test double.

use crate::error::Result;
use crate::view::screen::Screen;

/// Core trait for UI rendering
pub trait UIRenderer: Send {
    /// Draw one frame
    fn render(&mut self, screen: &Screen) -> Result<()>;

    /// Initialize the terminal UI
    ///
    /// This method should:
    /// - Set up raw mode
    /// - Switch to the alternate screen
    fn initialize(&mut self) -> Result<()>;

    /// Clean up and restore terminal state
    fn cleanup(&mut self) -> Result<()>;

    /// Get current terminal dimensions
    fn get_terminal_size(&self) -> Result<(u16, u16)>; // (width, height)

    /// Result lines that fit on one page at the current size
    fn page_capacity(&self) -> Result<usize>;
}
