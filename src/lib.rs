//! jobsplit: carve, merge and redistribute scheduled build jobs.
//!
//! A job owns a subset of a build-manifest dependency graph and describes
//! that subset with a selector expression. This crate solves the three
//! coupled problems around that description:
//!
//! - evaluating a selector string deterministically over the graph
//!   ([`selector::select`])
//! - the inverse: synthesizing a compact selector that round-trips to an
//!   explicit node set, verified by re-evaluation ([`SelectorGenerator`])
//! - redistributing dependency-closed model subsets between jobs while
//!   keeping every selector in sync ([`ops::distribute`])
//!
//! Everything is synchronous, CPU-bound graph computation over an immutable
//! [`Catalog`]. Unordered collections are never iterated to produce output
//! text; ids live in BTree collections so repeated runs emit identical
//! selector strings.

pub mod catalog;
pub mod dag;
pub mod diagnostics;
pub mod error;
pub mod id;
pub mod job;
pub mod ops;
pub mod selector;

pub use catalog::{Catalog, CatalogSpec, Node, RawNode};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use id::{ResourceKind, UniqueId};
pub use job::{Job, JobId, Model};
pub use ops::{distribute, merge_jobs, transfer_models, Checkpoints, Distribution};
pub use selector::{render_selector, SelectorClause, SelectorGenerator, SynthesisMode};
