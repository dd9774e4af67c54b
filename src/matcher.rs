//! Matching strategies.
//!
//! The built-in strategies form a closed set; externally configured commands are the
//! one open case and ride along as [`Matcher::Custom`]. A filter pass is a pure
//! function of (records, query, matcher): it never touches selection or paging.

pub mod custom;
pub mod set;
pub mod terms;

pub use custom::CustomMatcher;
pub use set::MatcherSet;
pub use terms::{TermKind, TermSet};

use crate::buffer::{Match, Record};
use crate::error::Result;
use std::sync::Arc;

pub const IGNORE_CASE: &str = "IgnoreCase";
pub const CASE_SENSITIVE: &str = "CaseSensitive";
pub const SMART_CASE: &str = "SmartCase";
pub const REGEXP: &str = "Regexp";

/// Built-in passes check for supersession this often (in records).
pub const CANCEL_CHECK_INTERVAL: usize = 1024;

/// A strategy mapping (records, query) to an ordered match list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    IgnoreCase,
    CaseSensitive,
    SmartCase,
    Regexp,
    Custom(CustomMatcher),
}

impl Matcher {
    pub fn builtins() -> Vec<Matcher> {
        vec![
            Matcher::IgnoreCase,
            Matcher::CaseSensitive,
            Matcher::SmartCase,
            Matcher::Regexp,
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            Matcher::IgnoreCase => IGNORE_CASE,
            Matcher::CaseSensitive => CASE_SENSITIVE,
            Matcher::SmartCase => SMART_CASE,
            Matcher::Regexp => REGEXP,
            Matcher::Custom(custom) => custom.name(),
        }
    }

    /// Run a full pass over `records`.
    pub fn filter(&self, records: &[Arc<Record>], query: &str) -> Result<Vec<Match>> {
        Ok(self
            .filter_cancellable(records, query, &|| false)?
            .unwrap_or_default())
    }

    /// Run a pass that gives up early once `superseded` reports true.
    ///
    /// Returns `Ok(None)` when the pass was abandoned. Built-ins poll `superseded`
    /// every [`CANCEL_CHECK_INTERVAL`] records; a custom command is polled while it
    /// runs and killed once superseded.
    pub fn filter_cancellable(
        &self,
        records: &[Arc<Record>],
        query: &str,
        superseded: &dyn Fn() -> bool,
    ) -> Result<Option<Vec<Match>>> {
        if query.trim().is_empty() {
            return Ok(Some(records.iter().cloned().map(Match::plain).collect()));
        }

        let kind = match self {
            Matcher::IgnoreCase => TermKind::LiteralIgnoreCase,
            Matcher::CaseSensitive => TermKind::LiteralCaseSensitive,
            Matcher::SmartCase if query.chars().any(char::is_uppercase) => {
                TermKind::LiteralCaseSensitive
            }
            Matcher::SmartCase => TermKind::LiteralIgnoreCase,
            Matcher::Regexp => TermKind::Regex,
            Matcher::Custom(custom) => return custom.run_cancellable(records, query, superseded),
        };

        let terms = TermSet::compile(query, kind)?;
        let mut matches = Vec::new();
        for (i, record) in records.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 && i > 0 && superseded() {
                return Ok(None);
            }
            if let Some(spans) = terms.find(record.display()) {
                matches.push(Match::new(Arc::clone(record), spans));
            }
        }
        Ok(Some(matches))
    }
}
