//! Snapshot ingest: FEC individual-contributions file → normalized records.
//!
//! The loader owns every data-quality decision so downstream crates never
//! see raw source values: organizational rows are dropped, names and cities
//! are uppercased and trimmed, and unparseable dates/amounts become `None`
//! sentinels rather than errors.

pub mod fec;

pub use fec::FecImporter;
