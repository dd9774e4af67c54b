//! Registry of available matchers with exactly one current.

use crate::error::{LinepickError, Result};
use crate::matcher::{CustomMatcher, Matcher};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MatcherSet {
    matchers: Vec<Arc<Matcher>>,
    current: usize,
}

impl Default for MatcherSet {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherSet {
    /// The built-in matchers, with IgnoreCase current.
    pub fn new() -> Self {
        Self {
            matchers: Matcher::builtins().into_iter().map(Arc::new).collect(),
            current: 0,
        }
    }

    /// Verify and add an external matcher. Names must be unique.
    pub fn register_custom(&mut self, custom: CustomMatcher) -> Result<()> {
        if self.position(custom.name()).is_some() {
            return Err(LinepickError::matcher(format!(
                "a matcher named '{}' already exists",
                custom.name()
            )));
        }
        custom.verify()?;
        log::info!("registered custom matcher '{}'", custom.name());
        self.matchers.push(Arc::new(Matcher::Custom(custom)));
        Ok(())
    }

    pub fn current(&self) -> Arc<Matcher> {
        Arc::clone(&self.matchers[self.current])
    }

    /// Make the named matcher current.
    pub fn set_current(&mut self, name: &str) -> Result<()> {
        let index = self
            .position(name)
            .ok_or_else(|| LinepickError::matcher(format!("unknown matcher: '{name}'")))?;
        self.current = index;
        Ok(())
    }

    /// Advance to the next matcher, wrapping around, and return it.
    pub fn rotate(&mut self) -> Arc<Matcher> {
        self.current = (self.current + 1) % self.matchers.len();
        self.current()
    }

    pub fn names(&self) -> Vec<&str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.matchers.iter().position(|m| m.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{IGNORE_CASE, REGEXP, SMART_CASE};

    #[test]
    fn starts_with_ignore_case() {
        let set = MatcherSet::new();
        assert_eq!(set.current().name(), IGNORE_CASE);
        assert_eq!(
            set.names(),
            vec!["IgnoreCase", "CaseSensitive", "SmartCase", "Regexp"]
        );
    }

    #[test]
    fn selects_by_name() {
        let mut set = MatcherSet::new();
        set.set_current(SMART_CASE).unwrap();
        assert_eq!(set.current().name(), SMART_CASE);

        assert!(set.set_current("Fuzzy").is_err());
        assert_eq!(set.current().name(), SMART_CASE);
    }

    #[test]
    fn rotation_wraps() {
        let mut set = MatcherSet::new();
        set.set_current(REGEXP).unwrap();
        assert_eq!(set.rotate().name(), IGNORE_CASE);
    }

    #[cfg(unix)]
    #[test]
    fn custom_matchers_are_verified_before_registration() {
        let mut set = MatcherSet::new();

        let broken =
            CustomMatcher::new("Broken", vec!["/nonexistent/linepick-filter".to_string()]).unwrap();
        assert!(set.register_custom(broken).is_err());
        assert!(set.set_current("Broken").is_err());

        let cat = CustomMatcher::new("Cat", vec!["cat".to_string()]).unwrap();
        set.register_custom(cat.clone()).unwrap();
        set.set_current("Cat").unwrap();
        assert_eq!(*set.current(), Matcher::Custom(cat.clone()));

        assert!(set.register_custom(cat).is_err());
    }
}
