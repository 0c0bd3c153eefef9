//! # agrinova-retrieval
//!
//! Nearest-neighbour retrieval over the advisory corpus.
//!
//! - [`load_corpus`]: JSON array of [`AdvisoryRecord`]s, empty when the file is missing
//! - [`RetrievalIndex`]: `Empty | Ready` flat vector store with exact search
//! - [`Retriever`]: binds corpus, index and embedding function together and
//!   bounds query-time embedding concurrency through an [`EmbeddingGate`]

#![deny(unsafe_code)]

pub mod advisory;
pub mod errors;
pub mod gate;
pub mod index;
pub mod retriever;
pub mod top_k;

pub use advisory::{AdvisoryRecord, EXCERPT_CHARS, load_corpus};
pub use errors::{Result, RetrievalError};
pub use gate::EmbeddingGate;
pub use index::{Neighbor, RetrievalIndex};
pub use retriever::{RetrievalHit, Retriever, RetrieverOptions};
pub use top_k::TopK;
