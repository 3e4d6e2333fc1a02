use crate::productions::value::expand;
use crate::{CompileError, PLACEHOLDER, ParsedFragment, Parser, Scope, Warning};
use jsonld_query_context::{ExpandedIri, IriMode, propagate};
use jsonld_query_model::vocab::rdf;
use jsonld_query_model::{NamedNode, TermPattern, TriplePattern, Variable};
use jsonld_query_results::{IntermediateResult, ObjectResult};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value as JsonValue};
use std::mem;
use std::sync::Arc;

/// How a node object identifies its node.
enum Identity {
    /// Any node matches.
    Free,
    /// Any node matches, and its IRI is part of the result.
    Placeholder,
    /// Only the given node matches.
    Fixed(NamedNode),
}

/// Compiles a node object.
///
/// Every entry whose key expands to an IRI becomes a required triple pattern from the node of
/// this object to the node of the entry's value. Entries that cannot be expanded are echoed and
/// reported as warnings.
pub fn node_object(
    parser: &Parser,
    map: &Map<String, JsonValue>,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let declaration = map.get("@context");
    let context = propagate(parser.contexts.as_ref(), scope.context(), declaration)?;
    let scope = scope.clone().with_context(context).with_definition(None);

    let identity = identity(map, &scope)?;
    let node = match &identity {
        Identity::Fixed(iri) => TermPattern::NamedNode(iri.clone()),
        Identity::Free | Identity::Placeholder => TermPattern::Variable(scope.variable().clone()),
    };

    let mut object = ObjectResult::new(declaration.cloned());
    let mut fragment = ParsedFragment::new(IntermediateResult::literal(JsonValue::Null), Some(node));
    let mut children = FxHashMap::<Variable, &str>::default();

    for (key, value) in map {
        if key == "@context" {
            continue;
        }

        let (predicate, is_type) = match scope.context().expand_iri(key, IriMode::Vocab) {
            Some(ExpandedIri::Keyword(keyword)) if keyword == "@id" => {
                let result = match &identity {
                    Identity::Placeholder => {
                        fragment.project(scope.variable().clone());
                        IntermediateResult::name_placeholder(
                            scope.variable().clone(),
                            Arc::clone(scope.context()),
                            IriMode::Base,
                        )
                    }
                    Identity::Free | Identity::Fixed(_) => IntermediateResult::literal(value.clone()),
                };
                object.push(key, result);
                continue;
            }
            Some(ExpandedIri::Keyword(keyword)) if keyword == "@type" => {
                (rdf::TYPE.into_owned(), true)
            }
            Some(ExpandedIri::Keyword(keyword)) => {
                object.push(key, IntermediateResult::literal(value.clone()));
                fragment.warnings.push(
                    Warning::new(format!("The keyword {keyword} is not supported in node objects"))
                        .nested(key.as_str()),
                );
                continue;
            }
            Some(ExpandedIri::Iri(predicate)) => (predicate, false),
            None => {
                object.push(key, IntermediateResult::literal(value.clone()));
                fragment.warnings.push(
                    Warning::new(format!("The key '{key}' is not defined in the context"))
                        .nested(key.as_str()),
                );
                continue;
            }
        };

        let child_scope = scope
            .child(key)
            .with_definition(scope.context().term(key).cloned());
        if let Some(previous) = children.insert(child_scope.variable().clone(), key.as_str()) {
            fragment.warnings.push(
                Warning::new(format!(
                    "The keys '{previous}' and '{key}' share the variable {}",
                    child_scope.variable()
                ))
                .nested(key.as_str()),
            );
        }

        let child = if is_type {
            (parser.type_entry)(parser, value, &child_scope)?
        } else {
            (parser.resource)(parser, value, &child_scope)?
        };
        wire(&mut fragment, &mut object, key, predicate, child);
    }

    fragment.intermediate_result = object.into();
    Ok(fragment)
}

/// Adds the compiled value of the entry `key` to the fragment of its node object.
fn wire(
    fragment: &mut ParsedFragment,
    object: &mut ObjectResult,
    key: &str,
    predicate: NamedNode,
    child: ParsedFragment,
) {
    object.push(key, child.intermediate_result);
    fragment
        .warnings
        .extend(child.warnings.into_iter().map(|warning| warning.nested(key)));
    fragment.project_all(child.projections);

    let branch = match (&fragment.term, child.term) {
        (Some(subject), Some(value)) => child.operation.with_link(TriplePattern {
            subject: subject.clone(),
            predicate: predicate.into(),
            object: value,
        }),
        _ => child.operation,
    };
    fragment.operation = mem::take(&mut fragment.operation).join(branch);
}

fn identity(map: &Map<String, JsonValue>, scope: &Scope) -> Result<Identity, CompileError> {
    let mut entries = map.iter().filter(|(key, _)| {
        *key != "@context"
            && scope
                .context()
                .expand_iri(key, IriMode::Vocab)
                .is_some_and(|expanded| expanded.is_keyword("@id"))
    });

    let Some((first, value)) = entries.next() else {
        return Ok(Identity::Free);
    };
    if let Some((second, _)) = entries.next() {
        return Err(CompileError::CollidingIds {
            first: first.clone(),
            second: second.clone(),
        });
    }

    match value {
        JsonValue::String(id) if id == PLACEHOLDER => Ok(Identity::Placeholder),
        JsonValue::String(id) => expand(scope, id, IriMode::Base).map(Identity::Fixed),
        _ => Err(CompileError::InvalidId {
            value: value.clone(),
        }),
    }
}
