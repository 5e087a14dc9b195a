//! Donor-name matching and scoring pipeline.
//!
//! This crate provides:
//! - Token and city predicates for per-record containment filtering
//! - A token-set similarity scorer for ranking matches
//! - The single-query engine (`search`)
//! - The bulk aggregator (`bulk_search`) with cross-query deduplication
//!
//! Everything here is a pure function over an immutable record snapshot:
//! no component mutates the store or shares state, so the bulk map phase
//! parallelizes freely while the dedup reduce stays sequential.

pub mod aggregate;
pub mod matcher;
pub mod query;
pub mod score;

pub use aggregate::{bulk_search, dedup_key};
pub use matcher::{CityPredicate, NamePredicate};
pub use query::{search, MatchQuery, ScoredMatch};
pub use score::token_set_ratio;
