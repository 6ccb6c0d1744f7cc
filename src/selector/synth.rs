//! Selector synthesis: the inverse of evaluation.
//!
//! Given a target node set (a job's model map), produce selector clauses
//! guaranteed to evaluate back to exactly that set. Optimized synthesis
//! collapses the set into ancestor terms over foundation blocks and span
//! terms over long paths; trivial synthesis names every model. Either way
//! the result is validated by re-evaluation before it is handed back, and
//! any drift is a hard failure carrying the offending sets.

use crate::catalog::Catalog;
use crate::dag::Dag;
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::id::UniqueId;
use crate::job::{Job, Model};
use crate::selector::eval::resolve_clauses;
use crate::selector::SelectorClause;
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// One bare-name term per model. Always correct, never compact.
    Trivial,
    /// Foundation collapsing followed by longest-path collapsing.
    Optimized,
}

/// Generates selector clauses for explicit model sets over one catalog.
pub struct SelectorGenerator<'a> {
    catalog: &'a Catalog,
}

impl<'a> SelectorGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Synthesize clauses denoting exactly the keys of `models`, validated
    /// by re-evaluation.
    pub fn generate(
        &self,
        models: &BTreeMap<UniqueId, Model>,
        mode: SynthesisMode,
    ) -> Result<Vec<SelectorClause>> {
        let target: BTreeSet<UniqueId> = models.keys().cloned().collect();

        let include = match mode {
            SynthesisMode::Trivial => models.values().map(|m| m.name.clone()).collect(),
            SynthesisMode::Optimized => self.optimized_terms(&target)?,
        };
        let clauses = vec![SelectorClause::new(include, Vec::new())];

        self.validate(&target, &clauses)?;
        Ok(clauses)
    }

    /// Synthesize from the job's current model map and install the result.
    pub fn regenerate(&self, job: &mut Job, mode: SynthesisMode) -> Result<()> {
        debug!(job = %job.name, ?mode, "regenerating selector");
        job.clauses = self.generate(&job.models, mode)?;
        Ok(())
    }

    fn optimized_terms(&self, target: &BTreeSet<UniqueId>) -> Result<Vec<String>> {
        let mut graph = self.catalog.dag().subgraph(target);
        let mut sections: BTreeSet<String> = BTreeSet::new();

        // Step 1: absorb connected foundation blocks into `+sink` terms.
        let (foundation_sections, foundation_nodes) = self.collapse_foundation(&graph)?;
        sections.extend(foundation_sections);
        graph.remove_nodes(&foundation_nodes);

        // Step 2: peel off the longest remaining path each round. Every
        // round removes at least one node, so this terminates.
        let mut iteration = 0u64;
        while !graph.is_empty() {
            trace!(iteration, remaining = graph.len(), "branch collapsing");
            iteration += 1;

            if graph.len() <= 2 {
                for id in graph.node_set() {
                    sections.insert(self.model_name(&id)?);
                }
                break;
            }

            let path = graph.longest_path();
            let path_set: BTreeSet<UniqueId> = path.iter().cloned().collect();

            if path.len() < 3 {
                // Too short for a span term to pay off.
                for id in &path {
                    sections.insert(self.model_name(id)?);
                }
                graph.remove_nodes(&path_set);
                continue;
            }

            // Order by the path subgraph's topology, not raw path order, so
            // shared nodes cannot masquerade as endpoints.
            let ordered = graph.subgraph(&path_set).topological_sort();
            let start = self.model_name(&ordered[0])?;
            let end = self.model_name(&ordered[ordered.len() - 1])?;
            sections.insert(format!("{start}+,+{end}"));
            graph.remove_nodes(&path_set);
        }

        Ok(sections.into_iter().collect())
    }

    /// Compute foundation status over the induced subgraph and emit one
    /// `+<sink>` term per connected foundation block of two or more nodes.
    /// Returns the emitted sections and the nodes they absorbed.
    fn collapse_foundation(
        &self,
        graph: &Dag,
    ) -> Result<(BTreeSet<String>, BTreeSet<UniqueId>)> {
        // Status lives in a synthesis-local map; the catalog stays immutable
        // and reusable across calls.
        let mut foundation: BTreeMap<UniqueId, bool> = graph
            .nodes()
            .map(|id| {
                let eligible = self
                    .catalog
                    .node(id)
                    .map(|n| n.foundation_eligible)
                    .unwrap_or(false);
                (id.clone(), eligible)
            })
            .collect();

        // Forward propagation: a node joins once every dependency is both
        // inside the selection and already foundation.
        for id in graph.topological_sort() {
            if foundation.get(&id).copied().unwrap_or(false) {
                trace!(%id, "already foundation");
                continue;
            }
            let Some(node) = self.catalog.node(&id) else {
                continue;
            };
            if node.depends_on.is_empty() {
                continue;
            }
            let all_foundation = node.depends_on.iter().all(|dependency| {
                graph.contains(dependency)
                    && foundation.get(dependency).copied().unwrap_or(false)
            });
            if all_foundation {
                trace!(%id, "promoted to foundation");
                foundation.insert(id, true);
            }
        }

        let foundation_nodes: BTreeSet<UniqueId> = foundation
            .iter()
            .filter(|(_, status)| **status)
            .map(|(id, _)| id.clone())
            .collect();

        let mut sections = BTreeSet::new();
        let mut removed = BTreeSet::new();

        let foundation_subgraph = graph.subgraph(&foundation_nodes);
        for component in foundation_subgraph.weakly_connected_components() {
            // A lone foundation node gains nothing from an ancestor term;
            // leave it for path collapsing.
            if component.len() <= 1 {
                continue;
            }
            let component_subgraph = foundation_subgraph.subgraph(&component);
            removed.extend(component.iter().cloned());
            for id in &component {
                if component_subgraph.out_degree(id) == 0 {
                    sections.insert(format!("+{}", self.model_name(id)?));
                }
            }
        }

        Ok((sections, removed))
    }

    /// Hard validation: re-evaluate the clauses and require set equality
    /// with the target. On drift, re-run each emitted term alone to name
    /// the term(s) that pulled in extra nodes.
    fn validate(&self, target: &BTreeSet<UniqueId>, clauses: &[SelectorClause]) -> Result<()> {
        let mut diagnostics = Diagnostics::new();
        let resolved = resolve_clauses(self.catalog, clauses, &mut diagnostics)?;
        if resolved == *target {
            return Ok(());
        }

        let added: BTreeSet<UniqueId> = resolved.difference(target).cloned().collect();
        let removed: BTreeSet<UniqueId> = target.difference(&resolved).cloned().collect();

        let mut blamed: BTreeMap<String, BTreeSet<UniqueId>> = BTreeMap::new();
        for clause in clauses {
            for term in &clause.include {
                let alone = resolve_clauses(
                    self.catalog,
                    &[SelectorClause::new(vec![term.clone()], Vec::new())],
                    &mut diagnostics,
                )?;
                let extras: BTreeSet<UniqueId> = alone.intersection(&added).cloned().collect();
                if !extras.is_empty() {
                    blamed.insert(term.clone(), extras);
                }
            }
        }

        Err(Error::SelectionDrift {
            added,
            removed,
            blamed,
        })
    }

    fn model_name(&self, id: &UniqueId) -> Result<String> {
        self.catalog
            .name_of(id)
            .map(str::to_string)
            .ok_or_else(|| Error::UnknownName {
                name: id.to_string(),
            })
    }
}
