//! Node identity: unique ids and the resource kind they encode.
//!
//! Example id: model.analytics.stg_orders  =>  kind Model, name stg_orders
//!
//! We store ids as a String newtype and derive ordering so they can key
//! BTreeSet/Map. Every piece of output text in this crate is produced by
//! iterating those ordered collections, which is what keeps synthesis
//! reproducible across runs.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniqueId(pub String);

impl UniqueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The resource kind encoded in the id's dotted prefix.
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::of(&self.0)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UniqueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UniqueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a graph node is, as encoded by its id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Model,
    Snapshot,
    Source,
    Test,
    Operation,
    Other,
}

impl ResourceKind {
    /// Parse the kind from an id's dotted prefix.
    ///
    /// An id without a dotted prefix is treated as a model: plain graphs
    /// (node = id = name) behave as model graphs.
    pub fn of(id: &str) -> Self {
        match id.split_once('.') {
            None => ResourceKind::Model,
            Some((prefix, _)) => match prefix {
                "model" => ResourceKind::Model,
                "snapshot" => ResourceKind::Snapshot,
                "source" => ResourceKind::Source,
                "test" => ResourceKind::Test,
                "operation" => ResourceKind::Operation,
                _ => ResourceKind::Other,
            },
        }
    }

    /// Kinds a job tracks in its model map. Anything else is dropped from
    /// bookkeeping when ownership moves between jobs.
    pub fn is_trackable(self) -> bool {
        matches!(self, ResourceKind::Model | ResourceKind::Snapshot)
    }

    pub fn is_source(self) -> bool {
        matches!(self, ResourceKind::Source)
    }

    /// Kinds that never participate in the dependency graph.
    pub fn is_excluded_from_graph(self) -> bool {
        matches!(self, ResourceKind::Test | ResourceKind::Operation)
    }
}
