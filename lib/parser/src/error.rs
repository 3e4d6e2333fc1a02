use jsonld_query_context::ContextError;
use serde_json::Value as JsonValue;

/// A query document that cannot be compiled.
///
/// These errors indicate a malformed query. Problems that only affect a part of the query are
/// reported as [crate::Warning]s instead.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("The node object has more than one identifier entry: '{first}' and '{second}'")]
    CollidingIds { first: String, second: String },
    #[error("The value of an '@id' entry must be a string, found {value}")]
    InvalidId { value: JsonValue },
    #[error("The value of a '@type' entry must be a string, found {value}")]
    InvalidType { value: JsonValue },
    #[error("'{value}' does not expand to an absolute IRI")]
    InvalidIri { value: String },
    #[error("A template array must contain exactly one element, found {len}")]
    TemplateCardinality { len: usize },
    #[error(transparent)]
    Context(#[from] ContextError),
}
