//! Release derivation engine
//!
//! Turns tag references into an ordered sequence of releases annotated with
//! lead time and success / restoration status:
//!
//! 1. [tags] resolves tags to commits and orders them newest first
//! 2. [facts] walks each release's commit window ([walker]) in parallel
//! 3. [classifier] assigns success, failure and time to restore
//! 4. [query] ties the stages together behind [query_releases]

pub mod classifier;
pub mod facts;
pub mod query;
pub mod tags;
pub mod walker;

pub use classifier::classify;
pub use facts::{compute_release_facts, ReleaseFacts};
pub use query::query_releases;
pub use tags::{build_sources, resolve_tags};
pub use walker::walk;
