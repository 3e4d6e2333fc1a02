use crate::{QueryEvaluationError, QuerySolutionStream};
use async_trait::async_trait;
use jsonld_query_model::GraphPattern;
use std::sync::Arc;

/// Something that can evaluate graph patterns, such as an RDF store or a SPARQL endpoint.
///
/// If the pattern is a projection, the solutions only bind the projected variables.
#[async_trait]
pub trait SolutionSource: Send + Sync {
    async fn evaluate(
        &self,
        pattern: &GraphPattern,
    ) -> Result<QuerySolutionStream, QueryEvaluationError>;
}

#[async_trait]
impl<T: SolutionSource + ?Sized> SolutionSource for Arc<T> {
    async fn evaluate(
        &self,
        pattern: &GraphPattern,
    ) -> Result<QuerySolutionStream, QueryEvaluationError> {
        self.as_ref().evaluate(pattern).await
    }
}
