//! Catalog layer: raw manifest tables + validated in-memory structures.
//!
//! This module is intentionally separate from selector evaluation and job
//! surgery. It owns:
//! - Node (immutable per-node attributes)
//! - CatalogSpec (serde-friendly node/source tables)
//! - Catalog (validated graph + bidirectional id/name maps)

pub mod spec;

pub use spec::{CatalogSpec, RawNode};

use crate::dag::Dag;
use crate::id::{ResourceKind, UniqueId};
use std::collections::{BTreeMap, BTreeSet};

/// One node of the manifest graph. Immutable once the catalog is built.
#[derive(Debug, Clone)]
pub struct Node {
    pub unique_id: UniqueId,
    pub name: String,
    pub tags: BTreeSet<String>,
    pub source_name: Option<String>,
    /// Direct dependencies, already filtered of kinds excluded from the graph.
    pub depends_on: BTreeSet<UniqueId>,
    pub kind: ResourceKind,
    /// True for sources, and for nodes whose every dependency is a source.
    /// Foundation status propagates forward from these during synthesis.
    pub foundation_eligible: bool,
}

/// Read-only view of the manifest graph: nodes, dependency edges, and total
/// bidirectional id <-> name maps.
#[derive(Debug, Clone)]
pub struct Catalog {
    nodes: BTreeMap<UniqueId, Node>,
    dag: Dag,
    name_to_id: BTreeMap<String, UniqueId>,
}

impl Catalog {
    pub(crate) fn new(
        nodes: BTreeMap<UniqueId, Node>,
        dag: Dag,
        name_to_id: BTreeMap<String, UniqueId>,
    ) -> Self {
        Self {
            nodes,
            dag,
            name_to_id,
        }
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn node(&self, id: &UniqueId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn id_of(&self, name: &str) -> Option<&UniqueId> {
        self.name_to_id.get(name)
    }

    pub fn name_of(&self, id: &UniqueId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    /// All nodes carrying `tag`.
    pub fn nodes_with_tag(&self, tag: &str) -> BTreeSet<UniqueId> {
        self.nodes
            .values()
            .filter(|n| n.tags.contains(tag))
            .map(|n| n.unique_id.clone())
            .collect()
    }

    /// All nodes whose source affiliation equals `source`.
    pub fn nodes_in_source(&self, source: &str) -> BTreeSet<UniqueId> {
        self.nodes
            .values()
            .filter(|n| n.source_name.as_deref() == Some(source))
            .map(|n| n.unique_id.clone())
            .collect()
    }

    /// Immediate dependencies of `id` as recorded in the graph.
    pub fn node_dependencies(&self, id: &UniqueId) -> BTreeSet<UniqueId> {
        self.dag.parents_of(id)
    }
}
