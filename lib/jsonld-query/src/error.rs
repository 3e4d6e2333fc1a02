use jsonld_query_execution::QueryEvaluationError;
use jsonld_query_parser::CompileError;
use jsonld_query_results::ResultError;

/// An error raised while answering a query.
///
/// A query without matching data is not an error; see
/// [`QueryResponse::data`](crate::QueryResponse::data).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The query document is malformed.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The source failed to evaluate the compiled query.
    #[error(transparent)]
    Evaluation(#[from] QueryEvaluationError),
    /// The data does not fit the shape of the query.
    #[error(transparent)]
    Result(#[from] ResultError),
}
