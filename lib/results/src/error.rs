use jsonld_query_model::{Term, Variable};

/// An error raised while materializing an [IntermediateResult](crate::IntermediateResult).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultError {
    /// A placeholder never received a value.
    #[error("No value has been bound to {variable}")]
    Incomplete { variable: Variable },
    /// A term cannot be represented as a JSON scalar.
    #[error("The term {term} bound to {variable} has no native JSON representation")]
    BadNativeValue { variable: Variable, term: Term },
    /// A name was requested for a term that is not an IRI.
    #[error("Expected {variable} to be bound to an IRI, found {term}")]
    NotANamedNode { variable: Variable, term: Term },
    /// A literal was found where a node was expected.
    #[error("The literal {term} cannot name a node")]
    BadName { term: Term },
    /// The wrapped result does not contain the expected entry.
    #[error("Expected a result object with the entry '{key}'")]
    BadUnwrap { key: String },
    /// A list has a slot without successor, a successor without slot, or a cycle.
    #[error("The list chain is broken at {term}")]
    BrokenChain { term: Term },
}

impl ResultError {
    /// Returns whether the error indicates missing data rather than malformed data.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ResultError::Incomplete { .. })
    }
}
