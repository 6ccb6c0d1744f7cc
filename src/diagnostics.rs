//! Non-fatal conditions observed while evaluating selectors or building jobs.
//!
//! These are collected into a value handed back to (or threaded through by)
//! the caller, not written to an ambient log: the recoverable tier of the
//! error taxonomy stays inspectable in tests without capturing output.

/// A single recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A bare selector term named a node the catalog does not know. The term
    /// contributed the empty set and evaluation continued.
    UnknownNode { name: String },

    /// A run step used a state-based selector. The step was skipped rather
    /// than interpreted; this core has no concept of prior-run state.
    StateSelectorSkipped { step: String },
}

/// An append-only collection of [`Diagnostic`]s.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Names from every `UnknownNode` entry, in the order observed.
    pub fn unknown_nodes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|d| match d {
                Diagnostic::UnknownNode { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}
