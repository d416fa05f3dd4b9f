//! Persistent nearest-neighbor retrieval over knowledge-base answers.
//!
//! `VectorIndex` is an exact flat inner-product store with two paired
//! on-disk artifacts and rebuild-on-failure semantics; `RetrievalEngine`
//! composes it with an embedding provider into ranked recommendations.

pub mod retrieval;
pub mod seed;
pub mod source;
pub mod store;

pub use retrieval::RetrievalEngine;
pub use source::JsonCorpusSource;
pub use store::{IndexPaths, VectorIndex};
