//! Selector evaluation over the catalog graph.
//!
//! Contract:
//! - sections (whitespace-separated) union, terms (comma-separated) intersect
//! - a leading `+` pulls in all ancestors, a trailing `+` all descendants;
//!   expansion always keeps the seed nodes themselves
//! - `*` denotes the entire node set and short-circuits expansion
//! - `tag:<v>` and `source:<v>` look up node attributes; values are
//!   sanitized to `[A-Za-z0-9_]` first
//! - an unknown bare name is a diagnostic, not an error: the term
//!   contributes the empty set and evaluation continues
//! - any other qualifier method is a fatal grammar violation

use crate::catalog::Catalog;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Error;
use crate::id::UniqueId;
use crate::selector::SelectorClause;
use crate::Result;
use std::collections::BTreeSet;

/// Evaluate a selector string to the exact node-id set it denotes.
pub fn select(
    catalog: &Catalog,
    selector: &str,
    diagnostics: &mut Diagnostics,
) -> Result<BTreeSet<UniqueId>> {
    let mut nodes = BTreeSet::new();

    for section in selector.split_whitespace() {
        let mut intersected: Option<BTreeSet<UniqueId>> = None;
        for term in section.split(',') {
            let term_nodes = evaluate_term(catalog, term, diagnostics)?;
            intersected = Some(match intersected {
                None => term_nodes,
                Some(current) => current.intersection(&term_nodes).cloned().collect(),
            });
        }
        if let Some(section_nodes) = intersected {
            nodes.extend(section_nodes);
        }
    }

    Ok(nodes)
}

/// Resolve a job's clause list to its tracked node set: the union of every
/// clause's included sections, minus the union of every excluded section,
/// filtered to trackable kinds.
///
/// This is the single evaluation path used both when jobs are built from run
/// steps and when synthesis validates its own output, so the round-trip law
/// is checked against the same semantics jobs live by.
pub fn resolve_clauses(
    catalog: &Catalog,
    clauses: &[SelectorClause],
    diagnostics: &mut Diagnostics,
) -> Result<BTreeSet<UniqueId>> {
    let mut selected = BTreeSet::new();
    let mut excluded = BTreeSet::new();

    for clause in clauses {
        selected.extend(select(catalog, &clause.include.join(" "), diagnostics)?);
        if !clause.exclude.is_empty() {
            excluded.extend(select(catalog, &clause.exclude.join(" "), diagnostics)?);
        }
    }

    Ok(selected
        .difference(&excluded)
        .filter(|id| id.kind().is_trackable())
        .cloned()
        .collect())
}

fn evaluate_term(
    catalog: &Catalog,
    term: &str,
    diagnostics: &mut Diagnostics,
) -> Result<BTreeSet<UniqueId>> {
    // The wildcard is the whole node set; ancestor/descendant expansion
    // could add nothing.
    if term == "*" {
        return Ok(catalog.dag().node_set());
    }

    let upstream = term.starts_with('+');
    let downstream = term.ends_with('+');
    let base = term.trim_start_matches('+').trim_end_matches('+');

    let seeds = match base.split_once(':') {
        Some(("tag", value)) => catalog.nodes_with_tag(&sanitize(value)),
        Some(("source", value)) => catalog.nodes_in_source(&sanitize(value)),
        Some((method, _)) => {
            return Err(Error::UnknownSelectorMethod {
                method: method.to_string(),
            });
        }
        None => {
            let name = sanitize(base);
            match catalog.id_of(&name) {
                Some(id) => BTreeSet::from([id.clone()]),
                None => {
                    diagnostics.push(Diagnostic::UnknownNode { name });
                    BTreeSet::new()
                }
            }
        }
    };

    let mut nodes = seeds.clone();
    for seed in &seeds {
        if upstream {
            nodes.extend(catalog.dag().ancestors(seed));
        }
        if downstream {
            nodes.extend(catalog.dag().descendants(seed));
        }
    }

    Ok(nodes)
}

/// Strip everything outside `[A-Za-z0-9_]` before lookup.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
