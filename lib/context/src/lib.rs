//! JSON-LD context handling for the query compiler.
//!
//! An [ActiveContext] maps terms to IRIs and is immutable once built. Nested node objects may
//! declare their own `@context`, which is merged with the enclosing context by a
//! [ContextNormalizer]. The result only applies to the nested subtree; see [propagate].

mod active;
mod error;
mod normalizer;

pub use active::{ActiveContext, Container, ExpandedIri, IriMode, TermDefinition, TypeCoercion};
pub use error::ContextError;
pub use normalizer::{ContextNormalizer, InlineContextNormalizer, propagate};

/// Returns whether `value` is a JSON-LD keyword.
pub fn is_keyword(value: &str) -> bool {
    matches!(
        value,
        "@base"
            | "@container"
            | "@context"
            | "@direction"
            | "@graph"
            | "@id"
            | "@import"
            | "@included"
            | "@index"
            | "@json"
            | "@language"
            | "@list"
            | "@nest"
            | "@none"
            | "@prefix"
            | "@propagate"
            | "@protected"
            | "@reverse"
            | "@set"
            | "@type"
            | "@value"
            | "@version"
            | "@vocab"
    )
}
