//! policycheck-index
//!
//! TF-IDF lexical index over document chunks, its on-disk artifact set, and
//! the `Retriever` that builds, persists, reloads and searches it.
pub mod analyzer;
pub mod retriever;
pub mod store;
pub mod tfidf;

pub use retriever::{Retriever, RetrieverStats};
pub use store::IndexStore;
pub use tfidf::{SearchHit, SparseRow, TfidfIndex};
