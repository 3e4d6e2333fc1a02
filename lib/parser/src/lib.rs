//! Compilation of JSON-LD query documents.
//!
//! A query document is a JSON-LD document in which some values are replaced by the
//! [PLACEHOLDER]. Compiling the document yields a SPARQL graph pattern that matches the shape of
//! the document and an [IntermediateResult] that turns the solutions of this pattern back into a
//! document of the same shape.
//!
//! ```
//! use jsonld_query_parser::{Parser, compile};
//! use serde_json::json;
//!
//! let query = json!({"@id": "ex:1", "ex:name": "?", "ex:friends": [{"ex:name": "?"}]});
//! let compiled = compile(&query, &Parser::default())?;
//! let projections = compiled
//!     .projections
//!     .iter()
//!     .map(|variable| variable.as_str())
//!     .collect::<Vec<_>>();
//! assert_eq!(
//!     projections,
//!     ["root.name", "root.friends", "root.friends.name"]
//! );
//! assert!(compiled.warnings.is_empty());
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod element;
mod error;
mod fragment;
mod naming;
mod parser;
mod productions;

pub use element::QueryElement;
pub use error::CompileError;
pub use fragment::{Operation, ParsedFragment, PathSegment, Warning};
pub use naming::{SEPARATOR, child_variable, root_variable};
pub use parser::{
    ArrayProduction, IndexedListVocabulary, ObjectProduction, PLACEHOLDER, Parser, Scope,
    ValueProduction,
};

use jsonld_query_context::ActiveContext;
use jsonld_query_model::{GraphPattern, Variable};
use jsonld_query_results::IntermediateResult;
use rustc_hash::FxHashSet;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A compiled query document.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    /// The template the solutions of [CompiledQuery::algebra] are folded into.
    pub intermediate_result: IntermediateResult,
    /// The graph pattern that matches the query, projected to [CompiledQuery::projections].
    pub algebra: GraphPattern,
    pub projections: Vec<Variable>,
    pub warnings: Vec<Warning>,
}

/// Compiles `query` without an initial context.
pub fn compile(query: &JsonValue, parser: &Parser) -> Result<CompiledQuery, CompileError> {
    compile_in_context(query, parser, Arc::new(ActiveContext::new()))
}

/// Compiles `query` with `context` as the context of the document root.
pub fn compile_in_context(
    query: &JsonValue,
    parser: &Parser,
    context: Arc<ActiveContext>,
) -> Result<CompiledQuery, CompileError> {
    let scope = Scope::new(root_variable(), context);
    let fragment = (parser.document)(parser, query, &scope)?;
    let pattern = fragment.operation.to_graph_pattern();

    // Placeholders of nodes without any entries are never bound.
    let mut mentioned = FxHashSet::default();
    fragment::collect_variables(&pattern, &mut mentioned);
    let projections = fragment
        .projections
        .into_iter()
        .filter(|variable| mentioned.contains(variable))
        .collect::<Vec<_>>();

    for warning in &fragment.warnings {
        tracing::debug!(path = ?warning.path, "{}", warning.message);
    }
    tracing::debug!(
        projections = projections.len(),
        warnings = fragment.warnings.len(),
        "Compiled query document"
    );

    let algebra = GraphPattern::Project {
        inner: Box::new(pattern),
        variables: projections.clone(),
    };
    Ok(CompiledQuery {
        intermediate_result: fragment.intermediate_result,
        algebra,
        projections,
        warnings: fragment.warnings,
    })
}
