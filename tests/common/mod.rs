#![allow(dead_code)]

use jobsplit::{Catalog, CatalogSpec, Job, JobId, Model, RawNode};
use std::collections::BTreeMap;

/// Build a catalog from a plain edge list where node = id = name and every
/// endpoint is a model.
pub fn plain_catalog(edges: &[(&str, &str)], extra_nodes: &[&str]) -> Catalog {
    let mut deps: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (from, to) in edges.iter().copied() {
        deps.entry(to).or_default().push(from.to_string());
        deps.entry(from).or_default();
    }
    for node in extra_nodes.iter().copied() {
        deps.entry(node).or_default();
    }

    let nodes = deps
        .into_iter()
        .map(|(id, depends_on)| {
            let mut raw = RawNode::new(id, id);
            raw.depends_on = depends_on;
            raw
        })
        .collect();

    CatalogSpec {
        nodes,
        sources: Vec::new(),
    }
    .validate_and_build()
    .unwrap()
}

/// A job holding the named catalog nodes, dependencies observed from the
/// catalog at build time.
pub fn job_of(catalog: &Catalog, id: JobId, name: &str, members: &[&str]) -> Job {
    let mut job = Job::new(id, name);
    for member in members {
        let unique_id = catalog.id_of(member).unwrap().clone();
        job.add_model(Model {
            unique_id: unique_id.clone(),
            name: (*member).to_string(),
            depends_on: catalog.node_dependencies(&unique_id),
        });
    }
    job
}

/// The include terms of a job's clause list, flattened.
pub fn include_terms(job: &Job) -> Vec<String> {
    job.clauses
        .iter()
        .flat_map(|c| c.include.iter().cloned())
        .collect()
}
