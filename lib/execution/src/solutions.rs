use crate::QueryEvaluationError;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use jsonld_query_model::{QuerySolution, Variable};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A stream over [`QuerySolution`]s.
///
/// Solutions arrive in no particular order. The stream ends once all solutions have been
/// delivered.
pub struct QuerySolutionStream {
    /// The variables used in the query solutions.
    variables: Arc<[Variable]>,
    inner: BoxStream<'static, Result<QuerySolution, QueryEvaluationError>>,
}

impl QuerySolutionStream {
    pub fn new(
        variables: Arc<[Variable]>,
        inner: impl Stream<Item = Result<QuerySolution, QueryEvaluationError>> + Send + 'static,
    ) -> Self {
        Self {
            variables,
            inner: inner.boxed(),
        }
    }

    /// Creates a stream over solutions that have already been computed.
    pub fn from_solutions(variables: Arc<[Variable]>, solutions: Vec<QuerySolution>) -> Self {
        Self::new(variables, stream::iter(solutions.into_iter().map(Ok)))
    }

    /// The variables used in the solutions.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        self.variables.as_ref()
    }
}

impl Stream for QuerySolutionStream {
    type Item = Result<QuerySolution, QueryEvaluationError>;

    #[inline]
    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
