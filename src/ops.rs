//! Job surgery: distribution, explicit transfers, merges, and checkpoints.
//!
//! Distribution is an ordered claim protocol. Each target job, in list
//! order, seeds a frontier with its external dependencies and claims from
//! the source job every dependency the source still owns, expanding the
//! frontier through each claimed model's own dependencies until the closure
//! is exhausted. Earlier targets therefore win any contested dependency.

use crate::catalog::Catalog;
use crate::error::Error;
use crate::id::UniqueId;
use crate::job::{Job, JobId, Model};
use crate::selector::{SelectorGenerator, SynthesisMode};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Outcome of [`distribute`]: the updated target jobs keyed by id, plus the
/// source job as a remainder if it was not fully absorbed.
#[derive(Debug)]
pub struct Distribution {
    pub targets: BTreeMap<JobId, Job>,
    pub remainder: Option<Job>,
}

impl Distribution {
    /// For callers that require the source to have been fully shed: unwrap
    /// the targets, or fail with the models left behind.
    pub fn expect_fully_distributed(self) -> Result<BTreeMap<JobId, Job>> {
        match self.remainder {
            None => Ok(self.targets),
            Some(job) => Err(Error::UnevenDistribution {
                remaining: job.models.keys().cloned().collect(),
                job: job.name,
            }),
        }
    }
}

/// Partition `source` so that its responsibilities move into `targets`.
///
/// Non-trackable dependencies are removed from the source's bookkeeping but
/// never tracked by a target. Every touched job gets a freshly synthesized
/// optimized selector; the source survives only if it still holds models.
pub fn distribute(catalog: &Catalog, mut source: Job, targets: Vec<Job>) -> Result<Distribution> {
    debug!(
        source = %source.name,
        targets = %targets.iter().map(|j| j.name.as_str()).collect::<Vec<_>>().join(", "),
        "distributing models"
    );

    let mut targets = targets;
    for target in &mut targets {
        let mut frontier: BTreeSet<UniqueId> = target.model_dependencies();

        while let Some(dependency) = frontier.pop_first() {
            // Not owned by the source: satisfied elsewhere already.
            if source.models.remove(&dependency).is_none() {
                continue;
            }
            // Free node: shed from the source, tracked by nobody.
            if !dependency.kind().is_trackable() {
                continue;
            }
            let name = catalog
                .name_of(&dependency)
                .ok_or_else(|| Error::UnknownName {
                    name: dependency.to_string(),
                })?
                .to_string();

            trace!(%dependency, source = %source.name, target = %target.name, "claiming dependency");

            // Dependencies are recomputed against the catalog; the source's
            // observation of them does not transfer.
            let model = Model {
                unique_id: dependency.clone(),
                name,
                depends_on: catalog.node_dependencies(&dependency),
            };
            frontier.extend(model.depends_on.iter().cloned());
            target.add_model(model);
        }
    }

    let generator = SelectorGenerator::new(catalog);
    for target in &mut targets {
        generator.regenerate(target, SynthesisMode::Optimized)?;
    }

    let remainder = if source.models.is_empty() {
        None
    } else {
        generator.regenerate(&mut source, SynthesisMode::Optimized)?;
        Some(source)
    };

    Ok(Distribution {
        targets: targets.into_iter().map(|job| (job.id, job)).collect(),
        remainder,
    })
}

/// Move the named models from `source` to `target`, then resynthesize both
/// selectors. Fails if `source` does not hold one of the names.
pub fn transfer_models(
    catalog: &Catalog,
    names: &BTreeSet<String>,
    source: &mut Job,
    target: &mut Job,
    mode: SynthesisMode,
) -> Result<()> {
    for name in names {
        let model = source
            .pop_model(name)
            .ok_or_else(|| Error::UnknownName { name: name.clone() })?;
        target.add_model(model);
    }

    let generator = SelectorGenerator::new(catalog);
    generator.regenerate(source, mode)?;
    generator.regenerate(target, mode)?;
    Ok(())
}

/// Union `job` with `others` and synthesize a selector for the merged model
/// map.
pub fn merge_jobs(catalog: &Catalog, job: &Job, others: &[Job], mode: SynthesisMode) -> Result<Job> {
    let mut merged = job.union(others);
    SelectorGenerator::new(catalog).regenerate(&mut merged, mode)?;
    Ok(merged)
}

/// Named snapshots of the combined model sets of job groups, for validating
/// that a sequence of surgeries preserved overall selection.
#[derive(Debug, Clone, Default)]
pub struct Checkpoints {
    saved: BTreeMap<String, BTreeSet<UniqueId>>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the union of model ids across `jobs` under `name`.
    pub fn save(&mut self, name: &str, jobs: &[&Job]) {
        self.saved.insert(name.to_string(), combined_models(jobs));
    }

    /// Compare the current combined model set of `jobs` against the saved
    /// checkpoint. Any drift is a hard failure carrying both directions of
    /// the difference.
    pub fn validate(&self, name: &str, jobs: &[&Job]) -> Result<()> {
        let original = self
            .saved
            .get(name)
            .ok_or_else(|| Error::UnknownCheckpoint {
                name: name.to_string(),
            })?;
        let current = combined_models(jobs);

        let missing: BTreeSet<UniqueId> = original.difference(&current).cloned().collect();
        let added: BTreeSet<UniqueId> = current.difference(original).cloned().collect();

        if missing.is_empty() && added.is_empty() {
            debug!(checkpoint = name, "selection matches checkpoint");
            return Ok(());
        }
        Err(Error::CheckpointMismatch {
            name: name.to_string(),
            missing,
            added,
        })
    }
}

fn combined_models(jobs: &[&Job]) -> BTreeSet<UniqueId> {
    jobs.iter()
        .flat_map(|job| job.models.keys().cloned())
        .collect()
}
