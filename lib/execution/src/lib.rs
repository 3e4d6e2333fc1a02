//! Evaluation of the graph patterns of compiled JSON-LD queries.
//!
//! The query compiler is agnostic of where the data comes from. Any [SolutionSource] can answer
//! its graph patterns. [MemorySource] evaluates them against an in-memory graph.

mod error;
mod eval;
mod memory;
mod solutions;
mod source;

pub use error::{LoaderError, QueryEvaluationError};
pub use memory::MemorySource;
pub use solutions::QuerySolutionStream;
pub use source::SolutionSource;
