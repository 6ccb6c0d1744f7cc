//! Selector expressions: the clause type, run-step extraction, rendering.
//!
//! A selector string is whitespace-separated sections unioned together; a
//! section is comma-separated terms intersected together. Evaluation lives in
//! [`eval`], the inverse problem (node set -> selector) in [`synth`].

pub mod eval;
pub mod synth;

pub use eval::{resolve_clauses, select};
pub use synth::{SelectorGenerator, SynthesisMode};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::Result;
use regex::Regex;

/// A pair of included and excluded selector term lists. A job's full
/// selection is the union of all its clauses' included terms minus the union
/// of all excluded terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorClause {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SelectorClause {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Extract a clause from a free-form run-step command string.
    ///
    /// Recognizes `--select`/`-s`/`--models`/`-m`/`--model` and
    /// `--exclude`/`-e` flag values. A step without a select flag yields
    /// `None`, as does a step whose selection is state-based: there is no
    /// prior-run state here to compare against, so the step is skipped and
    /// noted in `diagnostics`.
    pub fn from_step(step: &str, diagnostics: &mut Diagnostics) -> Result<Option<Self>> {
        let select_re = Regex::new(r"(--select|-s|--models|-m|--model) ([@+*a-zA-Z0-9_ :,]*)")?;
        let exclude_re = Regex::new(r"(--exclude|-e) ([@+*a-zA-Z0-9_ :,]*)")?;

        let Some(captures) = select_re.captures(step) else {
            return Ok(None);
        };
        let include = split_terms(&captures[2]);
        if include.iter().any(|term| term.contains("state:")) {
            diagnostics.push(Diagnostic::StateSelectorSkipped {
                step: step.to_string(),
            });
            return Ok(None);
        }

        let exclude = exclude_re
            .captures(step)
            .map(|captures| split_terms(&captures[2]))
            .unwrap_or_default();

        Ok(Some(Self { include, exclude }))
    }
}

fn split_terms(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Render clauses back into build-command argument text:
/// `--select <terms> --exclude <terms>`, the exclude segment omitted when
/// nothing is excluded.
pub fn render_selector(clauses: &[SelectorClause]) -> String {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for clause in clauses {
        include.extend(clause.include.iter().cloned());
        exclude.extend(clause.exclude.iter().cloned());
    }

    let mut rendered = format!("--select {}", include.join(" "));
    if !exclude.is_empty() {
        rendered.push_str(&format!(" --exclude {}", exclude.join(" ")));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(step: &str) -> Option<SelectorClause> {
        SelectorClause::from_step(step, &mut Diagnostics::new()).unwrap()
    }

    #[test]
    fn extracts_select_and_exclude_flags() {
        let clause = extract("build --select staging+ tag:nightly --exclude legacy").unwrap();
        assert_eq!(
            clause.include,
            vec!["staging+".to_string(), "tag:nightly".to_string()]
        );
        assert_eq!(clause.exclude, vec!["legacy".to_string()]);
    }

    #[test]
    fn short_flags_work_too() {
        let clause = extract("run -s +orders -e tag:slow").unwrap();
        assert_eq!(clause.include, vec!["+orders".to_string()]);
        assert_eq!(clause.exclude, vec!["tag:slow".to_string()]);
    }

    #[test]
    fn steps_without_selection_are_ignored() {
        assert_eq!(extract("docs generate"), None);
    }

    #[test]
    fn state_based_steps_are_skipped_with_a_diagnostic() {
        let mut diagnostics = Diagnostics::new();
        let step = "build --select state:modified+";
        let clause = SelectorClause::from_step(step, &mut diagnostics).unwrap();
        assert_eq!(clause, None);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::StateSelectorSkipped { .. })
        ));
    }

    #[test]
    fn render_omits_empty_exclude() {
        let clauses = vec![SelectorClause::new(
            vec!["a+,+d".to_string(), "b".to_string()],
            vec![],
        )];
        assert_eq!(render_selector(&clauses), "--select a+,+d b");
    }

    #[test]
    fn render_concatenates_clauses_positionally() {
        let clauses = vec![
            SelectorClause::new(vec!["a".to_string()], vec!["x".to_string()]),
            SelectorClause::new(vec!["b".to_string()], vec![]),
        ];
        assert_eq!(render_selector(&clauses), "--select a b --exclude x");
    }
}
