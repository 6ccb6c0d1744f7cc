//! Catalog ingest: the node and source tables the graph-construction
//! collaborator hands over, validated into a [`Catalog`].
//!
//! JSON shape:
//! {
//!   "nodes": [
//!     {
//!       "unique_id": "model.proj.orders",
//!       "name": "orders",
//!       "tags": ["nightly"],
//!       "source_name": null,
//!       "depends_on": ["source.raw.orders"]
//!     },
//!     ...
//!   ],
//!   "sources": [ ...same shape... ]
//! }
//!
//! We check unique ids and names, resolve every dependency reference, drop
//! test/operation nodes from the graph, and reject cycles.

use crate::catalog::{Catalog, Node};
use crate::dag::Dag;
use crate::error::Error;
use crate::id::{ResourceKind, UniqueId};
use crate::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub sources: Vec<RawNode>,
}

/// Raw node shape as it appears in the handed-over tables.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub unique_id: String,

    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub source_name: Option<String>,

    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl RawNode {
    pub fn new(unique_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            tags: Vec::new(),
            source_name: None,
            depends_on: Vec::new(),
        }
    }
}

impl CatalogSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate the tables and build a [`Catalog`]:
    /// - unique ids and unique names
    /// - dependencies reference known ids
    /// - test/operation nodes (and edges touching them) stay out of the graph
    /// - the dependency graph is acyclic
    pub fn validate_and_build(&self) -> Result<Catalog> {
        let mut nodes: BTreeMap<UniqueId, Node> = BTreeMap::new();
        let mut name_to_id: BTreeMap<String, UniqueId> = BTreeMap::new();

        for raw in self.sources.iter().chain(self.nodes.iter()) {
            let id = UniqueId::new(raw.unique_id.clone());
            let kind = id.kind();
            if kind.is_excluded_from_graph() {
                continue;
            }
            if nodes.contains_key(&id) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate node id {}",
                    id
                )));
            }
            if let Some(previous) = name_to_id.insert(raw.name.clone(), id.clone()) {
                return Err(Error::InvalidCatalog(format!(
                    "name {:?} is used by both {} and {}",
                    raw.name, previous, id
                )));
            }

            let depends_on = raw
                .depends_on
                .iter()
                .map(|d| UniqueId::new(d.clone()))
                .filter(|d| !d.kind().is_excluded_from_graph())
                .collect();

            // Eligibility looks at the raw dependency list: a node fed only
            // by sources is a stable leaf of the model graph.
            let foundation_eligible = kind.is_source()
                || (!raw.depends_on.is_empty()
                    && raw.depends_on.iter().all(|d| ResourceKind::of(d).is_source()));

            nodes.insert(
                id.clone(),
                Node {
                    unique_id: id,
                    name: raw.name.clone(),
                    tags: raw.tags.iter().cloned().collect(),
                    source_name: raw.source_name.clone(),
                    depends_on,
                    kind,
                    foundation_eligible,
                },
            );
        }

        if nodes.is_empty() {
            return Err(Error::InvalidCatalog(
                "the node tables contained no graph-eligible nodes".to_string(),
            ));
        }

        let mut dag = Dag::new();
        for node in nodes.values() {
            dag.add_node(node.unique_id.clone());
        }
        for node in nodes.values() {
            for dependency in &node.depends_on {
                if !nodes.contains_key(dependency) {
                    return Err(Error::InvalidCatalog(format!(
                        "node {} depends on unknown id {}",
                        node.unique_id, dependency
                    )));
                }
                dag.add_edge(dependency.clone(), node.unique_id.clone());
            }
        }

        // Kahn's sort comes back short iff an edge set is cyclic.
        if dag.topological_sort().len() != dag.len() {
            return Err(Error::InvalidCatalog(
                "the dependency graph contains a cycle".to_string(),
            ));
        }

        Ok(Catalog::new(nodes, dag, name_to_id))
    }
}
