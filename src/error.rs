//! Fatal error taxonomy.
//!
//! Every variant carries the exact node-id sets involved, so a failure can be
//! diagnosed without re-running the operation that produced it. Recoverable
//! conditions (unknown bare names during evaluation) are not errors; they go
//! through [`crate::diagnostics::Diagnostics`].

use crate::id::UniqueId;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A selector term used a qualifier other than `tag:` or `source:`.
    /// Grammar violation, never recoverable.
    #[error("unsupported selector method {method:?}")]
    UnknownSelectorMethod { method: String },

    /// A synthesized selector failed to round-trip to its target set.
    /// `blamed` maps each emitted term to the extra nodes it contributed,
    /// where one could be identified.
    #[error("selector drift: added [{}], removed [{}]", join(.added), join(.removed))]
    SelectionDrift {
        added: BTreeSet<UniqueId>,
        removed: BTreeSet<UniqueId>,
        blamed: BTreeMap<String, BTreeSet<UniqueId>>,
    },

    /// A source job still holds models after a distribution the caller
    /// required to absorb it completely.
    #[error("job {job:?} was left holding undistributed models [{}]", join(.remaining))]
    UnevenDistribution {
        job: String,
        remaining: BTreeSet<UniqueId>,
    },

    /// The combined model set of a job list drifted from a saved checkpoint.
    #[error("checkpoint {name:?} violated: missing [{}], added [{}]", join(.missing), join(.added))]
    CheckpointMismatch {
        name: String,
        missing: BTreeSet<UniqueId>,
        added: BTreeSet<UniqueId>,
    },

    /// A name lookup failed in a context where the name must exist, e.g. a
    /// transfer of a model the source job does not hold.
    #[error("unknown model name {name:?}")]
    UnknownName { name: String },

    #[error("unknown checkpoint {name:?}")]
    UnknownCheckpoint { name: String },

    /// The node/source tables handed over by the graph collaborator were
    /// inconsistent: duplicate id or name, dangling dependency, or a cycle.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("catalog is not valid JSON: {0}")]
    CatalogJson(#[from] serde_json::Error),

    #[error("invalid selector pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn join(ids: &BTreeSet<UniqueId>) -> String {
    ids.iter()
        .map(UniqueId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
