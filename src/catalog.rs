//! This module provides the pattern catalog and the acceptance oracle.
//!
//! A catalog is an ordered, immutable list of named recognizer expressions, compiled once when
//! the catalog is built. The oracle matches a whole input string against one entry.

use crate::types::SimulatorError;
use regex::Regex;
use tracing::warn;

/// The built-in catalog entries, as (display name, recognizer expression) pairs.
pub const DEFAULT_PATTERNS: [(&str, &str); 10] = [
    ("(a|b)*abb", r"^(?:a|b)*abb$"),
    ("0*1*", r"^0*1*$"),
    ("(ab)*", r"^(?:ab)*$"),
    ("1(01)*0", r"^1(?:01)*0$"),
    (
        "(a+b)*a(a+b)*  (contains at least one 'a')",
        r"^(?:a|b)*a(?:a|b)*$",
    ),
    ("a*b", r"^a*b$"),
    ("a*", r"^a*$"),
    ("b*", r"^b*$"),
    ("(a|b)*ba", r"^(?:a|b)*ba$"),
    ("(ab|ba)*", r"^(?:ab|ba)*$"),
];

/// A named recognizer expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    recognizer: String,
    compiled: Result<Regex, String>,
}

impl Pattern {
    /// Creates a pattern and compiles its recognizer.
    ///
    /// The recognizer must compile on its own before it is wrapped in `^(?:...)$`, so an
    /// unbalanced expression can never turn into a valid unanchored alternation. A recognizer
    /// that does not compile is kept and reported by [`Pattern::error`].
    pub fn new(name: impl Into<String>, recognizer: impl Into<String>) -> Self {
        let recognizer = recognizer.into();
        let compiled = Regex::new(&recognizer)
            .and_then(|_| Regex::new(&format!("^(?:{recognizer})$")))
            .map_err(|e| e.to_string());

        Self {
            name: name.into(),
            recognizer,
            compiled,
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the recognizer expression as written.
    pub fn recognizer(&self) -> &str {
        &self.recognizer
    }

    /// Returns the compile error, if the recognizer is malformed.
    pub fn error(&self) -> Option<&str> {
        self.compiled.as_ref().err().map(String::as_str)
    }

    /// Matches `input` in full against this pattern.
    pub fn check(&self, input: &str) -> MatchOutcome {
        match &self.compiled {
            Ok(regex) if regex.is_match(input) => MatchOutcome::Match,
            Ok(_) => MatchOutcome::NoMatch,
            Err(message) => MatchOutcome::PatternError(message.clone()),
        }
    }
}

/// The result of matching a string against a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The whole string belongs to the pattern's language.
    Match,
    /// The string is legitimately rejected.
    NoMatch,
    /// The entry could not be evaluated (malformed recognizer or unknown index).
    PatternError(String),
}

impl MatchOutcome {
    /// Collapses the outcome to a verdict. Pattern errors reject.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Match)
    }
}

/// An ordered, immutable collection of patterns.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
}

impl Default for PatternCatalog {
    /// Builds the catalog of the ten built-in patterns.
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS)
    }
}

impl PatternCatalog {
    /// Builds a catalog from (name, recognizer) pairs, keeping their order.
    pub fn new<I, N, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: Into<String>,
    {
        Self {
            patterns: entries
                .into_iter()
                .map(|(name, recognizer)| Pattern::new(name, recognizer))
                .collect(),
        }
    }

    /// Get the number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Checks if the catalog has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Get a pattern by its index.
    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Iterates over the patterns in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// List all pattern names, in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::name).collect()
    }

    /// Find the index of the pattern with exactly this display name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.patterns.iter().position(|pattern| pattern.name == name)
    }

    /// Search for patterns whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        self.patterns
            .iter()
            .enumerate()
            .filter(|(_, pattern)| pattern.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Matches `input` in full against the pattern at `index`.
    ///
    /// An index outside the catalog is reported as a [`MatchOutcome::PatternError`].
    pub fn check(&self, input: &str, index: usize) -> MatchOutcome {
        match self.patterns.get(index) {
            Some(pattern) => pattern.check(input),
            None => MatchOutcome::PatternError(format!(
                "pattern index {} out of range (catalog has {} patterns)",
                index,
                self.patterns.len()
            )),
        }
    }

    /// Decides whether `input` is accepted by the pattern at `index`.
    ///
    /// Fails closed: an unusable pattern rejects every input.
    pub fn evaluate(&self, input: &str, index: usize) -> bool {
        match self.check(input, index) {
            MatchOutcome::PatternError(message) => {
                warn!(index, %message, "pattern could not be evaluated; rejecting input");
                false
            }
            outcome => outcome.is_match(),
        }
    }

    /// Reports every pattern whose recognizer does not compile.
    pub fn validate(&self) -> Result<(), Vec<SimulatorError>> {
        let errors: Vec<SimulatorError> = self
            .patterns
            .iter()
            .enumerate()
            .filter_map(|(index, pattern)| {
                pattern.error().map(|message| SimulatorError::Pattern {
                    index,
                    message: message.to_string(),
                })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl<'a> IntoIterator for &'a PatternCatalog {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
