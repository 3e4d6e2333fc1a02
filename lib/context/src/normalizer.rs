use crate::active::{ActiveContext, Container, ExpandedIri, IriMode, TermDefinition, TypeCoercion};
use crate::error::ContextError;
use jsonld_query_model::Iri;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Merges a context declaration into an enclosing [ActiveContext].
///
/// This is the seam for plugging in a full JSON-LD processor (e.g., one that can fetch remote
/// contexts). Implementations must not modify `parent`.
pub trait ContextNormalizer: Debug + Send + Sync {
    /// Returns the context that results from applying `declaration` on top of `parent`.
    fn normalize(
        &self,
        declaration: &JsonValue,
        parent: &ActiveContext,
    ) -> Result<ActiveContext, ContextError>;
}

/// Computes the context of a nested level.
///
/// Without a declaration, the parent context is shared as-is.
pub fn propagate(
    normalizer: &dyn ContextNormalizer,
    parent: &Arc<ActiveContext>,
    declaration: Option<&JsonValue>,
) -> Result<Arc<ActiveContext>, ContextError> {
    match declaration {
        None => Ok(Arc::clone(parent)),
        Some(declaration) => normalizer.normalize(declaration, parent).map(Arc::new),
    }
}

/// A [ContextNormalizer] that only supports context declarations embedded in the query.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineContextNormalizer;

impl ContextNormalizer for InlineContextNormalizer {
    fn normalize(
        &self,
        declaration: &JsonValue,
        parent: &ActiveContext,
    ) -> Result<ActiveContext, ContextError> {
        match declaration {
            JsonValue::Null => Ok(ActiveContext::new()),
            JsonValue::Array(declarations) => {
                declarations
                    .iter()
                    .try_fold(parent.clone(), |context, declaration| {
                        self.normalize(declaration, &context)
                    })
            }
            JsonValue::String(iri) => Err(ContextError::RemoteContext { iri: iri.clone() }),
            JsonValue::Object(declaration) => process_object(declaration, parent),
            JsonValue::Bool(_) | JsonValue::Number(_) => Err(ContextError::InvalidContext {
                message: format!("unexpected context value {declaration}"),
            }),
        }
    }
}

fn process_object(
    declaration: &Map<String, JsonValue>,
    parent: &ActiveContext,
) -> Result<ActiveContext, ContextError> {
    let mut result = parent.clone();

    if let Some(base) = declaration.get("@base") {
        let base = match base {
            JsonValue::Null => None,
            JsonValue::String(base) => Some(resolve_base(&result, base)?),
            _ => {
                return Err(ContextError::InvalidContext {
                    message: "@base must be a string or null".to_owned(),
                })
            }
        };
        result.set_base(base);
    }

    if let Some(vocab) = declaration.get("@vocab") {
        let vocab = match vocab {
            JsonValue::Null => None,
            JsonValue::String(vocab) => match result.expand_iri(vocab, IriMode::Vocab) {
                Some(ExpandedIri::Iri(iri)) => Some(iri.into_string()),
                _ => {
                    return Err(ContextError::InvalidVocabMapping {
                        vocab: vocab.clone(),
                    })
                }
            },
            _ => {
                return Err(ContextError::InvalidContext {
                    message: "@vocab must be a string or null".to_owned(),
                })
            }
        };
        result.set_vocab(vocab);
    }

    for key in declaration.keys().filter(|key| key.starts_with('@')) {
        match key.as_str() {
            "@base" | "@vocab" | "@version" | "@language" | "@direction" | "@protected"
            | "@propagate" | "@import" => {}
            _ => {
                return Err(ContextError::InvalidContext {
                    message: format!("unsupported context entry {key}"),
                })
            }
        }
    }

    let mut definitions = TermDefinitions {
        declaration,
        result,
        state: HashMap::new(),
    };
    for term in declaration.keys().filter(|key| !key.starts_with('@')) {
        definitions.define(term)?;
    }

    tracing::trace!(
        terms = definitions.state.len(),
        "Processed local context declaration"
    );
    Ok(definitions.result)
}

fn resolve_base(context: &ActiveContext, base: &str) -> Result<Iri<String>, ContextError> {
    let resolved = match context.base() {
        Some(parent) => parent.resolve(base),
        None => Iri::parse(base.to_owned()),
    };
    resolved.map_err(|error| ContextError::InvalidBaseIri {
        iri: base.to_owned(),
        error,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DefinitionState {
    InProgress,
    Defined,
}

/// Processes the term definitions of one local context.
///
/// Definitions may refer to other terms of the same declaration (e.g., a prefix), so terms are
/// defined on demand in dependency order.
struct TermDefinitions<'a> {
    declaration: &'a Map<String, JsonValue>,
    result: ActiveContext,
    state: HashMap<&'a str, DefinitionState>,
}

impl<'a> TermDefinitions<'a> {
    fn define(&mut self, term: &'a str) -> Result<(), ContextError> {
        match self.state.get(term) {
            Some(DefinitionState::Defined) => return Ok(()),
            Some(DefinitionState::InProgress) => {
                return Err(ContextError::CyclicDefinition {
                    term: term.to_owned(),
                })
            }
            None => {}
        }

        let Some(value) = self.declaration.get(term) else {
            return Ok(());
        };

        self.state.insert(term, DefinitionState::InProgress);
        let definition = match value {
            JsonValue::Null => None,
            JsonValue::String(id) => Some(TermDefinition::new(self.expand(term, id)?)),
            JsonValue::Object(definition) => Some(self.expanded_definition(term, definition)?),
            _ => {
                return Err(ContextError::InvalidTermDefinition {
                    term: term.to_owned(),
                    message: "must be a string, an object, or null".to_owned(),
                })
            }
        };
        self.result.define(term.to_owned(), definition);
        self.state.insert(term, DefinitionState::Defined);
        Ok(())
    }

    fn expanded_definition(
        &mut self,
        term: &'a str,
        definition: &'a Map<String, JsonValue>,
    ) -> Result<TermDefinition, ContextError> {
        if definition.contains_key("@reverse") {
            return Err(invalid(term, "reverse properties are not supported"));
        }

        let mapping = match definition.get("@id") {
            Some(JsonValue::String(id)) => self.expand(term, id)?,
            Some(_) => return Err(invalid(term, "@id must be a string")),
            None => self.expand(term, term)?,
        };

        let type_coercion = match definition.get("@type") {
            None => None,
            Some(JsonValue::String(kind)) => Some(match kind.as_str() {
                "@id" => TypeCoercion::Id,
                "@vocab" => TypeCoercion::Vocab,
                datatype => match self.expand(term, datatype)? {
                    ExpandedIri::Iri(datatype) => TypeCoercion::Datatype(datatype),
                    ExpandedIri::Keyword(keyword) => {
                        return Err(invalid(term, &format!("unsupported type {keyword}")))
                    }
                },
            }),
            Some(_) => return Err(invalid(term, "@type must be a string")),
        };

        let container = match definition.get("@container") {
            None => None,
            Some(JsonValue::String(container)) => container_of(container),
            Some(JsonValue::Array(containers)) => containers
                .iter()
                .filter_map(JsonValue::as_str)
                .find_map(container_of),
            Some(_) => return Err(invalid(term, "@container must be a string or an array")),
        };

        Ok(TermDefinition::new(mapping)
            .with_type_coercion(type_coercion)
            .with_container(container))
    }

    /// Expands `value` in the context of the definition of `term`, defining any term of the same
    /// declaration that `value` depends on first.
    fn expand(&mut self, term: &'a str, value: &'a str) -> Result<ExpandedIri, ContextError> {
        if value != term && self.declaration.contains_key(value) {
            self.define(value)?;
        }
        if let Some((prefix, _)) = value.split_once(':') {
            if prefix != term && self.declaration.contains_key(prefix) {
                self.define(prefix)?;
            }
        }

        self.result
            .expand_iri(value, IriMode::Vocab)
            .ok_or_else(|| invalid(term, &format!("'{value}' does not expand to an IRI")))
    }
}

fn container_of(container: &str) -> Option<Container> {
    match container {
        "@list" => Some(Container::List),
        "@set" => Some(Container::Set),
        _ => None,
    }
}

fn invalid(term: &str, message: &str) -> ContextError {
    ContextError::InvalidTermDefinition {
        term: term.to_owned(),
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonld_query_model::NamedNode;
    use serde_json::json;

    fn normalize(declaration: &JsonValue) -> Result<ActiveContext, ContextError> {
        InlineContextNormalizer.normalize(declaration, &ActiveContext::new())
    }

    fn expand(context: &ActiveContext, value: &str) -> Option<String> {
        context
            .expand_iri(value, IriMode::Vocab)
            .and_then(ExpandedIri::into_iri)
            .map(NamedNode::into_string)
    }

    #[test]
    fn prefixes_may_be_defined_after_their_use() {
        let context = normalize(&json!({
            "name": "foaf:name",
            "foaf": "http://xmlns.com/foaf/0.1/"
        }))
        .unwrap();
        assert_eq!(
            expand(&context, "name").as_deref(),
            Some("http://xmlns.com/foaf/0.1/name")
        );
    }

    #[test]
    fn expanded_definitions() {
        let context = normalize(&json!({
            "@vocab": "http://schema.org/",
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "knows": {"@type": "@id"},
            "steps": {"@id": "http://example.com/steps", "@container": "@list"},
            "born": {"@type": "xsd:date"},
            "id": "@id"
        }))
        .unwrap();

        let knows = context.term("knows").unwrap();
        assert_eq!(
            knows.mapping(),
            &ExpandedIri::Iri(NamedNode::new_unchecked("http://schema.org/knows"))
        );
        assert_eq!(knows.type_coercion(), Some(&TypeCoercion::Id));
        assert_eq!(context.term("steps").unwrap().container(), Some(Container::List));
        assert_eq!(
            context.term("born").unwrap().type_coercion(),
            Some(&TypeCoercion::Datatype(NamedNode::new_unchecked(
                "http://www.w3.org/2001/XMLSchema#date"
            )))
        );
        assert!(context.term("id").unwrap().mapping().is_keyword("@id"));
    }

    #[test]
    fn nested_contexts_do_not_modify_their_parent() {
        let parent = Arc::new(normalize(&json!({"@vocab": "http://schema.org/"})).unwrap());
        let declaration = json!({"name": "http://xmlns.com/foaf/0.1/name"});
        let child = propagate(&InlineContextNormalizer, &parent, Some(&declaration)).unwrap();

        assert_eq!(
            expand(&child, "name").as_deref(),
            Some("http://xmlns.com/foaf/0.1/name")
        );
        assert_eq!(
            expand(&parent, "name").as_deref(),
            Some("http://schema.org/name")
        );
        assert!(Arc::ptr_eq(
            &parent,
            &propagate(&InlineContextNormalizer, &parent, None).unwrap()
        ));
    }

    #[test]
    fn null_removes_definitions() {
        let parent = normalize(&json!({"name": "http://xmlns.com/foaf/0.1/name"})).unwrap();
        let child = InlineContextNormalizer
            .normalize(&json!([{"name": null}]), &parent)
            .unwrap();
        assert_eq!(child.term("name"), None);
        assert_eq!(
            InlineContextNormalizer.normalize(&JsonValue::Null, &parent).unwrap(),
            ActiveContext::new()
        );
    }

    #[test]
    fn relative_base_is_resolved_against_parent_base() {
        let parent = normalize(&json!({"@base": "http://example.com/a/"})).unwrap();
        let child = InlineContextNormalizer
            .normalize(&json!({"@base": "b/"}), &parent)
            .unwrap();
        assert_eq!(
            child.base().map(Iri::as_str),
            Some("http://example.com/a/b/")
        );
    }

    #[test]
    fn invalid_declarations() {
        assert!(matches!(
            normalize(&json!("http://schema.org/")),
            Err(ContextError::RemoteContext { .. })
        ));
        assert!(matches!(
            normalize(&json!({"a": "b:x", "b": "a:y"})),
            Err(ContextError::CyclicDefinition { .. })
        ));
        assert!(matches!(
            normalize(&json!({"name": 5})),
            Err(ContextError::InvalidTermDefinition { .. })
        ));
        assert!(matches!(
            normalize(&json!({"@bogus": true})),
            Err(ContextError::InvalidContext { .. })
        ));
    }
}
