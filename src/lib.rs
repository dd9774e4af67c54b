//! # linepick - Interactive Line Filter
//!
//! Reads lines from a file or stdin, lets the user narrow them down with an
//! incrementally refined query, and prints the chosen lines on stdout.
//!
//! ## Features
//!
//! - **Streaming Input**: lines are usable while the input is still being read
//! - **Matchers**: case-insensitive, case-sensitive, smart-case and regexp
//!   matching powered by ripgrep core libraries, plus external filter commands
//! - **Multi-Selection**: mark single lines or whole ranges across queries
//! - **Terminal UI**: top-down or bottom-up layouts drawn with ratatui
//!
//! ## Architecture
//!
//! Independent tokio tasks talk through a [`hub::Hub`] of bounded channels and
//! share one [`session::Session`]:
//!
//! - [`ingest`] - reads the input into the [`buffer`]
//! - [`filter`] - runs [`matcher`] passes and admits only the latest result
//! - [`view`] - owns paging and draws through a [`view::UIRenderer`]
//! - [`input`] - maps key events to actions
//! - [`app`] - builds the session and joins the loops
//! - [`config`] - command-line options and the settings file
//! - [`error`] - centralized error types

// Core modules
pub mod buffer;
pub mod error;
pub mod hub;
pub mod matcher;
pub mod selection;
pub mod session;

// Loops
pub mod filter;
pub mod ingest;
pub mod input;
pub mod view;

// Startup
pub mod app;
pub mod config;

// Re-export commonly used types for convenience
pub use error::{LinepickError, Result};

pub use app::{Application, Outcome};
pub use buffer::{Match, MemoryBuffer, Record};
pub use config::{Options, Settings};
pub use matcher::{Matcher, MatcherSet};
pub use session::Session;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
