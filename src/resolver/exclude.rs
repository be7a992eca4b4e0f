//! Name-based method exclusion.

use regex::{Regex, RegexSet};

use super::errors::GenerateError;

/// Predicate deciding whether a method name is excluded.
pub trait NameExcluder: Send + Sync {
    /// Returns `true` when the method named `name` must be dropped.
    fn is_excluded(&self, name: &str) -> bool;
}

impl<F> NameExcluder for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_excluded(&self, name: &str) -> bool {
        self(name)
    }
}

/// Excludes names matching any of a set of regular expressions.
#[derive(Debug, Clone)]
pub struct PatternExcluder {
    patterns: Vec<String>,
    set: RegexSet,
}

impl PatternExcluder {
    /// Compile the given patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, GenerateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        // Compile one by one first so the error names the offending pattern
        for pattern in &patterns {
            Regex::new(pattern).map_err(|source| GenerateError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let set = RegexSet::new(&patterns).map_err(|source| GenerateError::InvalidPattern {
            pattern: patterns.join(" | "),
            source,
        })?;

        Ok(PatternExcluder { patterns, set })
    }

    /// An excluder that matches nothing.
    pub fn empty() -> Self {
        PatternExcluder {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// The source patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for PatternExcluder {
    fn default() -> Self {
        Self::empty()
    }
}

impl NameExcluder for PatternExcluder {
    fn is_excluded(&self, name: &str) -> bool {
        self.set.is_match(name)
    }
}
