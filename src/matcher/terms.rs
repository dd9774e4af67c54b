//! Compiled query terms.
//!
//! A query is split on whitespace and every term becomes its own ripgrep matcher.
//! A record matches when every term is found in its display text; the highlight
//! spans are the union of every occurrence of every term.

use crate::buffer::{merge_spans, Span};
use crate::error::{LinepickError, Result};
use grep_matcher::Matcher as _;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};

/// How the terms of a query should be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    /// Literal substring, compared case-insensitively.
    LiteralIgnoreCase,
    /// Literal substring, compared exactly.
    LiteralCaseSensitive,
    /// Regular expression.
    Regex,
}

/// All terms of one query, ANDed together.
#[derive(Debug)]
pub struct TermSet {
    terms: Vec<RegexMatcher>,
}

impl TermSet {
    /// Compile every whitespace-separated term of `query`.
    pub fn compile(query: &str, kind: TermKind) -> Result<Self> {
        let terms = query
            .split_whitespace()
            .map(|term| compile_term(term, kind))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { terms })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Highlight spans for `text` if every term occurs in it, `None` otherwise.
    pub fn find(&self, text: &str) -> Option<Vec<Span>> {
        let haystack = text.as_bytes();
        let mut spans = Vec::new();

        for term in &self.terms {
            let mut found = false;
            // RegexMatcher's error type is uninhabited
            let _ = term.find_iter(haystack, |m| {
                found = true;
                spans.push((m.start(), m.end()));
                true
            });
            if !found {
                return None;
            }
        }

        Some(merge_spans(spans))
    }
}

fn compile_term(term: &str, kind: TermKind) -> Result<RegexMatcher> {
    let built = match kind {
        TermKind::LiteralIgnoreCase => RegexMatcherBuilder::new()
            .case_insensitive(true)
            .fixed_strings(true)
            .build(term),
        TermKind::LiteralCaseSensitive => RegexMatcherBuilder::new()
            .case_insensitive(false)
            .fixed_strings(true)
            .build(term),
        TermKind::Regex => RegexMatcher::new(term),
    };
    built.map_err(|err| LinepickError::invalid_pattern(term, err.to_string()))
}
