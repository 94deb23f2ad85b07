use crate::pattern::{Fields, NoMatch, Pattern, PatternError};
use thiserror::Error;
use tracing::trace;

/// An ordered list of named grammars. Keyword-prefixed grammars are tried
/// before bare ones, and the first match wins.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and append a grammar.
    pub fn add(&mut self, name: &str, grammar: &str) -> Result<(), PatternError> {
        self.patterns.push(Pattern::compile(name, grammar)?);
        Ok(())
    }

    /// Match `input` against the grammars, keyword-prefixed ones first.
    ///
    /// Prefixed grammars are tried in insertion order, skipping those whose
    /// prefix does not start the input. Grammars without a prefix are tried
    /// only after every prefixed one has failed. Returns the captured fields
    /// and the name of the matching grammar.
    pub fn eval(&self, input: &str) -> Option<(Fields, &str)> {
        let trimmed = input.trim_start();
        let prefixed = self.patterns.iter().filter(|p| {
            p.prefix
                .as_deref()
                .is_some_and(|prefix| trimmed.starts_with(prefix))
        });
        let bare = self.patterns.iter().filter(|p| p.prefix.is_none());
        prefixed.chain(bare).find_map(|pattern| match pattern.matches(input) {
            Ok(fields) => {
                trace!(grammar = %pattern.name, "statement matched");
                Some((fields, pattern.name.as_str()))
            }
            Err(NoMatch(reason)) => {
                trace!(%reason, "grammar rejected");
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    NoMatch(#[from] NoMatch),
}

/// Compile `grammar` and match it against `input` in one step.
pub fn scan(grammar: &str, input: &str) -> Result<Fields, ScanError> {
    let pattern = Pattern::compile("scan", grammar)?;
    Ok(pattern.matches(input)?)
}
