use crate::is_keyword;
use jsonld_query_model::{Iri, NamedNode};
use std::collections::HashMap;

/// Whether an IRI is interpreted relative to `@vocab` (property names, `@type` values) or to
/// `@base` (`@id` values).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IriMode {
    Vocab,
    Base,
}

/// The `@container` of a term definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    List,
    Set,
}

/// The `@type` of a term definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeCoercion {
    /// String values are IRIs relative to `@base`.
    Id,
    /// String values are IRIs relative to `@vocab`.
    Vocab,
    /// String values are literals of the given datatype.
    Datatype(NamedNode),
}

/// The result of expanding a term or compact IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpandedIri {
    Keyword(String),
    Iri(NamedNode),
}

impl ExpandedIri {
    /// Returns the IRI, if this is not a keyword.
    pub fn into_iri(self) -> Option<NamedNode> {
        match self {
            ExpandedIri::Iri(iri) => Some(iri),
            ExpandedIri::Keyword(_) => None,
        }
    }

    /// Returns whether this is the given keyword.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, ExpandedIri::Keyword(k) if k == keyword)
    }
}

/// A processed term definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermDefinition {
    mapping: ExpandedIri,
    type_coercion: Option<TypeCoercion>,
    container: Option<Container>,
}

impl TermDefinition {
    pub fn new(mapping: ExpandedIri) -> Self {
        Self {
            mapping,
            type_coercion: None,
            container: None,
        }
    }

    #[must_use]
    pub fn with_type_coercion(mut self, type_coercion: Option<TypeCoercion>) -> Self {
        self.type_coercion = type_coercion;
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: Option<Container>) -> Self {
        self.container = container;
        self
    }

    pub fn mapping(&self) -> &ExpandedIri {
        &self.mapping
    }

    pub fn type_coercion(&self) -> Option<&TypeCoercion> {
        self.type_coercion.as_ref()
    }

    pub fn container(&self) -> Option<Container> {
        self.container
    }
}

/// A normalized JSON-LD context.
///
/// Contexts are never mutated after they have been built. Processing a nested `@context` creates
/// a new [ActiveContext] that starts as a copy of its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveContext {
    base: Option<Iri<String>>,
    vocab: Option<String>,
    terms: HashMap<String, TermDefinition>,
}

impl ActiveContext {
    /// Creates an empty context without `@base` and `@vocab`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context that resolves `@id` values against `base`.
    pub fn with_base(base: Iri<String>) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    pub fn base(&self) -> Option<&Iri<String>> {
        self.base.as_ref()
    }

    pub fn vocab(&self) -> Option<&str> {
        self.vocab.as_deref()
    }

    /// Returns the definition of `term`, if any.
    pub fn term(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    pub(crate) fn set_base(&mut self, base: Option<Iri<String>>) {
        self.base = base;
    }

    pub(crate) fn set_vocab(&mut self, vocab: Option<String>) {
        self.vocab = vocab;
    }

    pub(crate) fn define(&mut self, term: String, definition: Option<TermDefinition>) {
        match definition {
            Some(definition) => {
                self.terms.insert(term, definition);
            }
            None => {
                self.terms.remove(&term);
            }
        }
    }

    /// Expands a term, compact IRI, or relative IRI.
    ///
    /// Returns [None] if `value` is a blank node identifier, an unknown keyword, or cannot be
    /// made absolute.
    pub fn expand_iri(&self, value: &str, mode: IriMode) -> Option<ExpandedIri> {
        if value.starts_with('@') {
            return is_keyword(value).then(|| ExpandedIri::Keyword(value.to_owned()));
        }

        if mode == IriMode::Vocab {
            if let Some(definition) = self.terms.get(value) {
                return Some(definition.mapping.clone());
            }
        }

        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" {
                return None;
            }
            if !suffix.starts_with("//") {
                if let Some(ExpandedIri::Iri(prefix_iri)) =
                    self.terms.get(prefix).map(TermDefinition::mapping)
                {
                    return NamedNode::new(format!("{}{suffix}", prefix_iri.as_str()))
                        .ok()
                        .map(ExpandedIri::Iri);
                }
            }
            if let Ok(iri) = NamedNode::new(value) {
                return Some(ExpandedIri::Iri(iri));
            }
        }

        let expanded = match mode {
            IriMode::Vocab => NamedNode::new(format!("{}{value}", self.vocab.as_deref()?)).ok(),
            IriMode::Base => {
                let resolved = self.base.as_ref()?.resolve(value).ok()?;
                Some(NamedNode::new_unchecked(resolved.into_inner()))
            }
        };
        expanded.map(ExpandedIri::Iri)
    }

    /// Compacts an absolute IRI to the shortest representation this context allows.
    ///
    /// In [IriMode::Vocab], exact term matches and `@vocab`-relative names are preferred. In
    /// [IriMode::Base], only `@base`-relative references and prefixes are used. IRIs that cannot be
    /// compacted are returned as-is.
    pub fn compact_iri(&self, iri: &str, mode: IriMode) -> String {
        if mode == IriMode::Vocab {
            let exact = self
                .terms
                .iter()
                .filter(|(_, definition)| {
                    matches!(&definition.mapping, ExpandedIri::Iri(mapped) if mapped.as_str() == iri)
                })
                .map(|(term, _)| term.as_str())
                .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            if let Some(term) = exact {
                return term.to_owned();
            }

            if let Some(suffix) = self.vocab.as_deref().and_then(|v| iri.strip_prefix(v)) {
                if is_plain_suffix(suffix) && !self.terms.contains_key(suffix) {
                    return suffix.to_owned();
                }
            }
        }

        if mode == IriMode::Base {
            if let Some(suffix) = self.base.as_ref().and_then(|b| iri.strip_prefix(b.as_str())) {
                if is_plain_suffix(suffix) {
                    return suffix.to_owned();
                }
            }
        }

        let compact = self
            .terms
            .iter()
            .filter_map(|(term, definition)| match &definition.mapping {
                ExpandedIri::Iri(prefix) if is_prefix_iri(prefix.as_str()) => iri
                    .strip_prefix(prefix.as_str())
                    .filter(|suffix| !suffix.is_empty())
                    .map(|suffix| format!("{term}:{suffix}")),
                _ => None,
            })
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        compact.unwrap_or_else(|| iri.to_owned())
    }
}

fn is_prefix_iri(iri: &str) -> bool {
    iri.ends_with(['/', '#', ':'])
}

/// A suffix that is read back as a relative name rather than an absolute or compact IRI.
fn is_plain_suffix(suffix: &str) -> bool {
    !suffix.is_empty() && !suffix.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(value: &str) -> ExpandedIri {
        ExpandedIri::Iri(NamedNode::new_unchecked(value))
    }

    fn schema_context() -> ActiveContext {
        let mut context = ActiveContext::new();
        context.set_vocab(Some("http://schema.org/".to_owned()));
        context.define(
            "ex".to_owned(),
            Some(TermDefinition::new(iri("http://example.com/"))),
        );
        context.define(
            "fullName".to_owned(),
            Some(TermDefinition::new(iri("http://xmlns.com/foaf/0.1/name"))),
        );
        context.define(
            "id".to_owned(),
            Some(TermDefinition::new(ExpandedIri::Keyword("@id".to_owned()))),
        );
        context
    }

    #[test]
    fn expand_terms_prefixes_and_vocab() {
        let context = schema_context();
        assert_eq!(
            context.expand_iri("fullName", IriMode::Vocab),
            Some(iri("http://xmlns.com/foaf/0.1/name"))
        );
        assert_eq!(
            context.expand_iri("ex:age", IriMode::Vocab),
            Some(iri("http://example.com/age"))
        );
        assert_eq!(
            context.expand_iri("knows", IriMode::Vocab),
            Some(iri("http://schema.org/knows"))
        );
        assert_eq!(
            context.expand_iri("id", IriMode::Vocab),
            Some(ExpandedIri::Keyword("@id".to_owned()))
        );
    }

    #[test]
    fn expand_without_context_keeps_absolute_iris() {
        let context = ActiveContext::new();
        assert_eq!(
            context.expand_iri("ex:hair_color", IriMode::Vocab),
            Some(iri("ex:hair_color"))
        );
        assert_eq!(
            context.expand_iri("http://example.com/a", IriMode::Base),
            Some(iri("http://example.com/a"))
        );
        assert_eq!(context.expand_iri("bogus", IriMode::Vocab), None);
        assert_eq!(context.expand_iri("_:b0", IriMode::Base), None);
        assert_eq!(context.expand_iri("@bogus", IriMode::Vocab), None);
    }

    #[test]
    fn expand_relative_ids_against_base() {
        let context =
            ActiveContext::with_base(Iri::parse("http://example.com/people/".to_owned()).unwrap());
        assert_eq!(
            context.expand_iri("alice", IriMode::Base),
            Some(iri("http://example.com/people/alice"))
        );
        assert_eq!(context.expand_iri("alice", IriMode::Vocab), None);
    }

    #[test]
    fn compact_in_vocab_mode() {
        let context = schema_context();
        assert_eq!(
            context.compact_iri("http://xmlns.com/foaf/0.1/name", IriMode::Vocab),
            "fullName"
        );
        assert_eq!(
            context.compact_iri("http://schema.org/Person", IriMode::Vocab),
            "Person"
        );
        assert_eq!(
            context.compact_iri("http://example.com/Robot", IriMode::Vocab),
            "ex:Robot"
        );
        assert_eq!(
            context.compact_iri("urn:isbn:123", IriMode::Vocab),
            "urn:isbn:123"
        );
    }

    #[test]
    fn compact_in_base_mode_ignores_terms_and_vocab() {
        let mut context = schema_context();
        context.set_base(Some(Iri::parse("http://example.com/people/".to_owned()).unwrap()));
        assert_eq!(
            context.compact_iri("http://example.com/people/alice", IriMode::Base),
            "alice"
        );
        assert_eq!(
            context.compact_iri("http://example.com/things/1", IriMode::Base),
            "ex:things/1"
        );
        assert_eq!(
            context.compact_iri("http://schema.org/Person", IriMode::Base),
            "http://schema.org/Person"
        );
    }
}
