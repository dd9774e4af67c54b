//! Command-line options.
//!
//! One static table describes every flag; it builds the clap parser and the
//! help text, so the two cannot drift apart.

use crate::error::{LinepickError, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// One command-line flag.
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    pub long: &'static str,
    pub short: Option<char>,
    /// Placeholder for the flag's value; `None` for switches.
    pub value: Option<&'static str>,
    pub description: &'static str,
}

pub const FLAGS: &[FlagSpec] = &[
    FlagSpec {
        long: "help",
        short: Some('h'),
        value: None,
        description: "show this help message and exit",
    },
    FlagSpec {
        long: "version",
        short: None,
        value: None,
        description: "print the version and exit",
    },
    FlagSpec {
        long: "query",
        short: None,
        value: Some("QUERY"),
        description: "initial value for the query",
    },
    FlagSpec {
        long: "prompt",
        short: None,
        value: Some("TEXT"),
        description: "text shown in front of the query",
    },
    FlagSpec {
        long: "rcfile",
        short: None,
        value: Some("PATH"),
        description: "path to the settings file",
    },
    FlagSpec {
        long: "buffer-size",
        short: Some('b'),
        value: Some("NUM"),
        description: "warn once the input exceeds NUM lines (0 = unlimited)",
    },
    FlagSpec {
        long: "null",
        short: None,
        value: None,
        description: "split lines at NUL: show the part before it, print the part after it",
    },
    FlagSpec {
        long: "initial-index",
        short: None,
        value: Some("NUM"),
        description: "position of the cursor in the first result",
    },
    FlagSpec {
        long: "initial-matcher",
        short: None,
        value: Some("NAME"),
        description: "matcher to start with (IgnoreCase, CaseSensitive, SmartCase, Regexp or a custom one)",
    },
    FlagSpec {
        long: "layout",
        short: None,
        value: Some("NAME"),
        description: "screen layout: top-down or bottom-up",
    },
    FlagSpec {
        long: "select-1",
        short: None,
        value: None,
        description: "print the line right away when the input has exactly one",
    },
];

/// Resolved command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub query: Option<String>,
    pub prompt: Option<String>,
    pub rcfile: Option<PathBuf>,
    pub buffer_size: usize,
    pub null_separator: bool,
    pub initial_index: usize,
    pub initial_matcher: Option<String>,
    pub layout: Option<String>,
    pub select_one: bool,
    pub file: Option<PathBuf>,
}

/// The help text, generated from [`FLAGS`].
pub fn help_text() -> String {
    let mut help = format!(
        "Usage: {} [options] [FILE]\n\nOptions:\n",
        env!("CARGO_PKG_NAME")
    );
    let rows: Vec<(String, &str)> = FLAGS
        .iter()
        .map(|flag| {
            let mut names = match flag.short {
                Some(short) => format!("-{short}, --{}", flag.long),
                None => format!("    --{}", flag.long),
            };
            if let Some(value) = flag.value {
                names.push_str(&format!(" <{value}>"));
            }
            (names, flag.description)
        })
        .collect();
    let width = rows.iter().map(|(names, _)| names.len()).max().unwrap_or(0);
    for (names, description) in rows {
        help.push_str(&format!("  {names:<width$}  {description}\n"));
    }
    help
}

/// Build the clap command from [`FLAGS`].
pub fn command() -> Command {
    let args = FLAGS.iter().map(|flag| {
        let mut arg = Arg::new(flag.long).long(flag.long).help(flag.description);
        if let Some(short) = flag.short {
            arg = arg.short(short);
        }
        match (flag.long, flag.value) {
            ("help", _) => arg.action(ArgAction::Help),
            ("version", _) => arg.action(ArgAction::Version),
            ("buffer-size" | "initial-index", Some(value)) => arg
                .value_name(value)
                .value_parser(value_parser!(usize))
                .action(ArgAction::Set),
            ("rcfile", Some(value)) => arg
                .value_name(value)
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Set),
            (_, Some(value)) => arg.value_name(value).action(ArgAction::Set),
            (_, None) => arg.action(ArgAction::SetTrue),
        }
    });

    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .override_help(help_text())
        .args(args)
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
}

impl Options {
    /// Parse `args` (including the program name).
    pub fn try_parse_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            query: matches.get_one::<String>("query").cloned(),
            prompt: matches.get_one::<String>("prompt").cloned(),
            rcfile: matches.get_one::<PathBuf>("rcfile").cloned(),
            buffer_size: matches.get_one::<usize>("buffer-size").copied().unwrap_or(0),
            null_separator: matches.get_flag("null"),
            initial_index: matches.get_one::<usize>("initial-index").copied().unwrap_or(0),
            initial_matcher: matches.get_one::<String>("initial-matcher").cloned(),
            layout: matches.get_one::<String>("layout").cloned(),
            select_one: matches.get_flag("select-1"),
            file: matches.get_one::<PathBuf>("file").cloned(),
        }
    }

    /// Reject a file argument that does not name a readable regular file.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(LinepickError::FileNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(LinepickError::invalid_argument(format!(
                    "not a regular file: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["linepick"];
        argv.extend_from_slice(args);
        Options::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]), Options::default());
    }

    #[test]
    fn test_every_flag_parses() {
        let options = parse(&[
            "--query",
            "foo bar",
            "--prompt",
            "PICK>",
            "--rcfile",
            "/tmp/rc.toml",
            "-b",
            "100",
            "--null",
            "--initial-index",
            "3",
            "--initial-matcher",
            "Regexp",
            "--layout",
            "bottom-up",
            "--select-1",
            "input.txt",
        ]);
        assert_eq!(options.query.as_deref(), Some("foo bar"));
        assert_eq!(options.prompt.as_deref(), Some("PICK>"));
        assert_eq!(options.rcfile, Some(PathBuf::from("/tmp/rc.toml")));
        assert_eq!(options.buffer_size, 100);
        assert!(options.null_separator);
        assert_eq!(options.initial_index, 3);
        assert_eq!(options.initial_matcher.as_deref(), Some("Regexp"));
        assert_eq!(options.layout.as_deref(), Some("bottom-up"));
        assert!(options.select_one);
        assert_eq!(options.file, Some(PathBuf::from("input.txt")));
    }

    #[test]
    fn test_help_and_version_short_circuit() {
        let help = Options::try_parse_from(["linepick", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        let version = Options::try_parse_from(["linepick", "--version"]).unwrap_err();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let err = Options::try_parse_from(["linepick", "-b", "lots"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_help_lists_every_flag() {
        let help = help_text();
        for flag in FLAGS {
            assert!(help.contains(&format!("--{}", flag.long)), "{}", flag.long);
            assert!(help.contains(flag.description));
        }
        assert!(help.contains("-b, --buffer-size <NUM>"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let options = Options {
            file: Some(PathBuf::from("/nonexistent/linepick-input")),
            ..Options::default()
        };
        assert!(matches!(
            options.validate(),
            Err(LinepickError::FileNotFound { .. })
        ));
    }
}
