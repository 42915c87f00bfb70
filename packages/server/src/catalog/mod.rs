//! Upload ingestion and retrieval.
//!
//! Every operation here takes the acting [`Scope`] (or owner id) explicitly;
//! nothing reads ambient request state.

pub mod error;
pub mod ingest;
pub mod query;
pub mod retrieval;
pub mod scope;
pub mod storage_key;

pub use error::{CatalogError, FailureStage, FileFailure};
pub use scope::Scope;
