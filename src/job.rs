//! Job entity: a set of owned models plus the selector clauses denoting it.
//!
//! The model map is the source of truth; the clause list is a derived,
//! re-synthesizable representation. Mutations (`add_model`, `pop_model`,
//! `union`) touch the map only — regeneration is an explicit separate step,
//! so a batch of mutations costs one synthesis instead of one per change.

use crate::catalog::Catalog;
use crate::diagnostics::Diagnostics;
use crate::id::UniqueId;
use crate::selector::eval::resolve_clauses;
use crate::selector::{render_selector, SelectorClause};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub type JobId = u64;

/// A job-scoped projection of a catalog node: its identity plus the
/// immediate dependencies observed when it was added. Models move between
/// jobs by value — each job may observe dependencies at different
/// granularity, so they are never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub unique_id: UniqueId,
    pub name: String,
    pub depends_on: BTreeSet<UniqueId>,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub steps: Vec<String>,
    pub clauses: Vec<SelectorClause>,
    pub models: BTreeMap<UniqueId, Model>,
}

impl Job {
    pub fn new(id: JobId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            steps: Vec::new(),
            clauses: Vec::new(),
            models: BTreeMap::new(),
        }
    }

    /// Build a job from recorded run steps: extract a clause per step,
    /// resolve the clauses, and materialize the selected models with their
    /// immediate dependencies as the catalog records them.
    pub fn from_steps(
        catalog: &Catalog,
        id: JobId,
        name: impl Into<String>,
        steps: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut job = Job::new(id, name);

        for step in &steps {
            let Some(clause) = SelectorClause::from_step(step, diagnostics)? else {
                continue;
            };
            let selected =
                resolve_clauses(catalog, std::slice::from_ref(&clause), diagnostics)?;
            for node_id in selected {
                let Some(node) = catalog.node(&node_id) else {
                    continue;
                };
                job.models.insert(
                    node_id.clone(),
                    Model {
                        unique_id: node_id,
                        name: node.name.clone(),
                        depends_on: node.depends_on.clone(),
                    },
                );
            }
            job.clauses.push(clause);
        }

        job.steps = steps;
        Ok(job)
    }

    /// The external frontier: every dependency referenced by a held model
    /// that is not itself held. Pure query.
    pub fn model_dependencies(&self) -> BTreeSet<UniqueId> {
        let mut dependencies = BTreeSet::new();
        for model in self.models.values() {
            dependencies.extend(model.depends_on.iter().cloned());
        }
        dependencies.retain(|id| !self.models.contains_key(id));
        dependencies
    }

    /// Insert a model. Does not regenerate the selector.
    pub fn add_model(&mut self, model: Model) {
        self.models.insert(model.unique_id.clone(), model);
    }

    /// Remove and return a model by its human name, if held. Does not
    /// regenerate the selector.
    pub fn pop_model(&mut self, name: &str) -> Option<Model> {
        let id = self
            .models
            .values()
            .find(|m| m.name == name)
            .map(|m| m.unique_id.clone())?;
        self.models.remove(&id)
    }

    /// Merge this job with `others` into a new job: first writer wins on
    /// model-id collisions, clause and step lists concatenate positionally.
    /// The caller regenerates the selector from the merged map.
    pub fn union(&self, others: &[Job]) -> Job {
        debug!(
            job = %self.name,
            with = %others.iter().map(|j| j.name.as_str()).collect::<Vec<_>>().join(", "),
            "performing job union"
        );

        let mut merged = self.clone();
        for other in others {
            for (unique_id, model) in &other.models {
                if merged.models.contains_key(unique_id) {
                    continue;
                }
                merged.models.insert(unique_id.clone(), model.clone());
            }
            merged.clauses.extend(other.clauses.iter().cloned());
            merged.steps.extend(other.steps.iter().cloned());
        }
        merged
    }

    /// The job's selection rendered as build-command argument text.
    pub fn selector_string(&self) -> String {
        render_selector(&self.clauses)
    }

    /// Replace the recorded run steps with a single build command carrying
    /// the current selector. Round-trips through [`Job::from_steps`].
    pub fn rewrite_steps(&mut self) {
        self.steps = vec![format!("build {}", self.selector_string())];
    }
}
