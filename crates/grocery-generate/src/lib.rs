//! Star-schema data synthesis for the grocery analytics warehouse.
//!
//! Dimension generators are pure functions of their configuration and an
//! injected RNG; [`GenerationEngine`] sequences them against a warehouse so
//! that every foreign key is drawn from keys read back from the sink.

pub mod dimensions;
pub mod engine;
pub mod errors;
pub mod faker;
pub mod model;
pub mod products;
pub mod sales;

pub use engine::{GenerationEngine, hash_seed};
pub use errors::GenerateError;
pub use faker::LocaleKey;
pub use model::{CountRange, GenerateOptions, GenerationReport, TableReport};
pub use sales::ReferenceKeys;
