use crate::QueryError;
use futures::TryStreamExt;
use jsonld_query_context::ActiveContext;
use jsonld_query_execution::SolutionSource;
use jsonld_query_parser::{CompiledQuery, Parser, Warning, compile_in_context};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::Instrument;

/// Options for [query_opt].
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    parser: Parser,
    context: Arc<ActiveContext>,
}

impl QueryOptions {
    /// Compiles queries with `parser` instead of [Parser::default].
    #[must_use]
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    /// Uses `context` as the context of the document root.
    ///
    /// A `@context` declared by the query is applied on top of it.
    #[must_use]
    pub fn with_context(mut self, context: Arc<ActiveContext>) -> Self {
        self.context = context;
        self
    }
}

/// The answer to a query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResponse {
    /// The query document with its placeholders filled in, or [None] if the data did not match
    /// the query.
    pub data: Option<JsonValue>,
    pub warnings: Vec<Warning>,
}

/// Answers `document` with the data in `source`.
pub async fn query<S: SolutionSource + ?Sized>(
    source: &S,
    document: &JsonValue,
) -> Result<QueryResponse, QueryError> {
    query_opt(source, document, &QueryOptions::default()).await
}

/// Answers `document` with the data in `source`, using custom options.
pub async fn query_opt<S: SolutionSource + ?Sized>(
    source: &S,
    document: &JsonValue,
    options: &QueryOptions,
) -> Result<QueryResponse, QueryError> {
    let compiled = compile_in_context(document, &options.parser, Arc::clone(&options.context))?;

    let span = tracing::debug_span!("query", projections = compiled.projections.len());
    materialize(source, compiled).instrument(span).await
}

async fn materialize<S: SolutionSource + ?Sized>(
    source: &S,
    compiled: CompiledQuery,
) -> Result<QueryResponse, QueryError> {
    let mut solutions = source.evaluate(&compiled.algebra).await?;
    let mut result = compiled.intermediate_result;
    let mut count = 0_usize;
    while let Some(solution) = solutions.try_next().await? {
        result = result.add_solution(&solution)?;
        count += 1;
    }

    let data = match result.result() {
        Ok(data) => Some(data),
        Err(error) if error.is_incomplete() => {
            tracing::debug!(%error, "The data does not match the query");
            None
        }
        Err(error) => return Err(error.into()),
    };
    tracing::debug!(solutions = count, "Materialized query result");

    Ok(QueryResponse {
        data,
        warnings: compiled.warnings,
    })
}
