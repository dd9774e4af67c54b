//! Configuration: command-line options layered over the settings file.

pub mod file;
pub mod options;

pub use file::ConfigFile;
pub use options::{command, help_text, FlagSpec, Options, FLAGS};

use crate::error::Result;
use crate::view::TOP_DOWN;
use std::collections::HashMap;

pub const DEFAULT_PROMPT: &str = "QUERY>";

/// Options and file settings merged; command-line values win.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub options: Options,
    pub file: ConfigFile,
}

impl Settings {
    pub fn new(options: Options, file: ConfigFile) -> Self {
        Self { options, file }
    }

    /// Load the settings file the options point at (or the default one).
    pub fn resolve(options: Options) -> Result<Self> {
        let file = ConfigFile::locate(options.rcfile.as_deref())?;
        Ok(Self::new(options, file))
    }

    pub fn layout(&self) -> &str {
        self.options
            .layout
            .as_deref()
            .or(self.file.layout.as_deref())
            .unwrap_or(TOP_DOWN)
    }

    pub fn initial_matcher(&self) -> Option<&str> {
        self.options
            .initial_matcher
            .as_deref()
            .or(self.file.matcher.as_deref())
    }

    pub fn prompt(&self) -> &str {
        self.options
            .prompt
            .as_deref()
            .or(self.file.prompt.as_deref())
            .unwrap_or(DEFAULT_PROMPT)
    }

    pub fn query(&self) -> &str {
        self.options.query.as_deref().unwrap_or("")
    }

    pub fn keymap(&self) -> &HashMap<String, String> {
        &self.file.keymap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_file() {
        let file = ConfigFile {
            layout: Some("bottom-up".to_string()),
            matcher: Some("Regexp".to_string()),
            prompt: Some("FILE>".to_string()),
            ..ConfigFile::default()
        };
        let options = Options {
            prompt: Some("CLI>".to_string()),
            ..Options::default()
        };
        let settings = Settings::new(options, file);
        assert_eq!(settings.prompt(), "CLI>");
        assert_eq!(settings.layout(), "bottom-up");
        assert_eq!(settings.initial_matcher(), Some("Regexp"));
    }

    #[test]
    fn defaults_apply_without_either() {
        let settings = Settings::default();
        assert_eq!(settings.prompt(), DEFAULT_PROMPT);
        assert_eq!(settings.layout(), TOP_DOWN);
        assert_eq!(settings.initial_matcher(), None);
        assert_eq!(settings.query(), "");
    }
}
