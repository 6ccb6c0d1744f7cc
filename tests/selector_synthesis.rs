//! Synthesis scenarios: path collapsing, foundation collapsing, the
//! round-trip guarantee and its failure mode.

mod common;

use common::{job_of, plain_catalog};
use jobsplit::selector::resolve_clauses;
use jobsplit::{
    Catalog, CatalogSpec, Diagnostics, Error, Model, RawNode, SelectorGenerator, SynthesisMode,
    UniqueId,
};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};

fn synthesize(catalog: &Catalog, members: &[&str]) -> Vec<String> {
    let job = job_of(catalog, 1, "job", members);
    let clauses = SelectorGenerator::new(catalog)
        .generate(&job.models, SynthesisMode::Optimized)
        .unwrap();
    clauses.into_iter().flat_map(|c| c.include).collect()
}

#[test]
fn a_chain_collapses_to_one_span_term() {
    let catalog = plain_catalog(&[("0", "1"), ("1", "2"), ("2", "3")], &[]);
    assert_eq!(
        synthesize(&catalog, &["0", "1", "2", "3"]),
        vec!["0+,+3".to_string()]
    );
}

#[test]
fn a_side_branch_too_short_to_span_is_named_directly() {
    let catalog = plain_catalog(&[("0", "1"), ("1", "2"), ("2", "3"), ("a", "2")], &[]);
    assert_eq!(
        synthesize(&catalog, &["0", "1", "2", "3", "a"]),
        vec!["0+,+3".to_string(), "a".to_string()]
    );
}

#[test]
fn a_selected_subset_spans_only_its_own_nodes() {
    let catalog = plain_catalog(&[("0", "1"), ("1", "2"), ("2", "3"), ("a", "2")], &[]);
    assert_eq!(
        synthesize(&catalog, &["1", "2", "3", "a"]),
        vec!["1+,+3".to_string(), "a".to_string()]
    );
}

fn foundation_catalog() -> Catalog {
    let mut zero_source = RawNode::new("source.raw.zero", "raw_zero");
    zero_source.source_name = Some("raw".to_string());
    let mut alpha_source = RawNode::new("source.raw.alpha", "raw_alpha");
    alpha_source.source_name = Some("raw".to_string());

    let with_deps = |id: &str, deps: &[&str]| {
        let mut raw = RawNode::new(id, id);
        raw.depends_on = deps.iter().map(|d| d.to_string()).collect();
        raw
    };

    CatalogSpec {
        sources: vec![zero_source, alpha_source],
        nodes: vec![
            with_deps("0", &["source.raw.zero"]),
            with_deps("a", &["source.raw.alpha"]),
            with_deps("1", &["0"]),
            with_deps("2", &["1", "a"]),
            with_deps("3", &["2"]),
            with_deps("4", &["2"]),
        ],
    }
    .validate_and_build()
    .unwrap()
}

#[test]
fn a_connected_foundation_block_collapses_to_its_sinks() {
    let catalog = foundation_catalog();
    assert_eq!(
        synthesize(&catalog, &["0", "a", "1", "2", "3", "4"]),
        vec!["+3".to_string(), "+4".to_string()]
    );
}

#[test]
fn foundation_status_propagates_through_the_selection() {
    // 0 and a are eligible (fed only by sources); everything downstream of
    // them inside the selection must become foundation too, or the block
    // above could not have collapsed to sink terms alone.
    let catalog = foundation_catalog();
    for node in ["0", "a", "1", "2"] {
        let terms = synthesize(&catalog, &["0", "a", "1", "2", "3", "4"]);
        assert!(
            !terms.contains(&node.to_string()),
            "{node} should have been absorbed into a foundation block"
        );
    }
}

#[test]
fn synthesis_is_deterministic() {
    let catalog = plain_catalog(
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("a", "2"),
            ("a", "b"),
            ("b", "c"),
        ],
        &["lonely"],
    );
    let members = ["0", "1", "2", "3", "a", "b", "c", "lonely"];
    let first = synthesize(&catalog, &members);
    let second = synthesize(&catalog, &members);
    assert_eq!(first, second);
}

#[test]
fn every_synthesized_selector_round_trips() {
    let catalog = plain_catalog(
        &[("0", "1"), ("1", "2"), ("2", "3"), ("a", "2"), ("3", "4")],
        &["lonely"],
    );
    for members in [
        vec!["0", "1", "2", "3", "4", "a", "lonely"],
        vec!["1", "2", "3"],
        vec!["0", "a"],
        vec!["lonely"],
    ] {
        let job = job_of(&catalog, 1, "job", &members);
        let target: BTreeSet<UniqueId> = job.models.keys().cloned().collect();
        for mode in [SynthesisMode::Trivial, SynthesisMode::Optimized] {
            let clauses = SelectorGenerator::new(&catalog)
                .generate(&job.models, mode)
                .unwrap();
            let resolved =
                resolve_clauses(&catalog, &clauses, &mut Diagnostics::new()).unwrap();
            assert_eq!(resolved, target, "mode {mode:?}, members {members:?}");
        }
    }
}

#[test]
fn trivial_mode_names_every_model() {
    let catalog = plain_catalog(&[("0", "1"), ("1", "2")], &[]);
    let job = job_of(&catalog, 1, "job", &["0", "1", "2"]);
    let clauses = SelectorGenerator::new(&catalog)
        .generate(&job.models, SynthesisMode::Trivial)
        .unwrap();
    assert_eq!(
        clauses[0].include,
        vec!["0".to_string(), "1".to_string(), "2".to_string()]
    );
}

#[test]
fn drift_is_a_hard_failure_carrying_the_difference() {
    let catalog = plain_catalog(&[("0", "1")], &[]);
    // A model the catalog has never heard of cannot round-trip.
    let ghost = UniqueId::from("ghost");
    let mut models: BTreeMap<UniqueId, Model> = BTreeMap::new();
    models.insert(
        ghost.clone(),
        Model {
            unique_id: ghost.clone(),
            name: "ghost".to_string(),
            depends_on: BTreeSet::new(),
        },
    );

    let result = SelectorGenerator::new(&catalog).generate(&models, SynthesisMode::Trivial);
    match result {
        Err(Error::SelectionDrift { added, removed, .. }) => {
            assert!(added.is_empty());
            assert_eq!(removed, [ghost].into_iter().collect());
        }
        other => panic!("expected drift, got {other:?}"),
    }
}

#[test]
fn rewritten_steps_reproduce_the_model_set() {
    let catalog = plain_catalog(&[("0", "1"), ("1", "2"), ("2", "3")], &[]);
    let mut job = job_of(&catalog, 1, "job", &["0", "1", "2", "3"]);
    SelectorGenerator::new(&catalog)
        .regenerate(&mut job, SynthesisMode::Optimized)
        .unwrap();
    job.rewrite_steps();
    assert_eq!(job.steps, vec!["build --select 0+,+3".to_string()]);

    let mut diagnostics = Diagnostics::new();
    let rebuilt = jobsplit::Job::from_steps(&catalog, 1, "job", job.steps.clone(), &mut diagnostics)
        .unwrap();
    assert_eq!(
        rebuilt.models.keys().cloned().collect::<BTreeSet<_>>(),
        job.models.keys().cloned().collect::<BTreeSet<_>>()
    );
}
