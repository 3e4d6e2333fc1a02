use jsonld_query_model::IriParseError;

/// An error raised while processing a JSON-LD context declaration.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The declaration is neither an object, an array, nor `null`.
    #[error("Invalid context: {message}")]
    InvalidContext { message: String },
    /// Remote contexts must be resolved by a normalizer that is able to load them.
    #[error("Remote context '{iri}' cannot be loaded by this context normalizer")]
    RemoteContext { iri: String },
    /// A term definition could not be processed.
    #[error("Invalid definition for term '{term}': {message}")]
    InvalidTermDefinition { term: String, message: String },
    /// A term definition (directly or indirectly) depends on itself.
    #[error("Cyclic definition for term '{term}'")]
    CyclicDefinition { term: String },
    /// The value of `@base` is not a valid IRI.
    #[error("Invalid base IRI '{iri}': {error}")]
    InvalidBaseIri {
        iri: String,
        #[source]
        error: IriParseError,
    },
    /// The value of `@vocab` does not expand to an IRI.
    #[error("Invalid vocabulary mapping '{vocab}'")]
    InvalidVocabMapping { vocab: String },
}
