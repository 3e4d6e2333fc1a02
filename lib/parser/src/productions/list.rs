//! The two encodings of ordered lists.
//!
//! Linked lists are `rdf:first`/`rdf:rest` chains. A slot of the chain is located by following
//! `rdf:rest` from the head of the list any number of times. Indexed lists link each slot to its
//! position instead; see [crate::IndexedListVocabulary].
//!
//! In both encodings, the link from the parent to the list is required and the slots are
//! optional, so an empty list still matches.

use crate::element::keyword_entry;
use crate::fragment::Operation;
use crate::naming::child_variable;
use crate::{CompileError, ParsedFragment, Parser, PathSegment, Scope, Warning};
use jsonld_query_model::vocab::rdf;
use jsonld_query_model::{GraphPattern, PropertyPathExpression, TriplePattern, Variable};
use jsonld_query_results::{
    IndexedListResult, IntermediateResult, LinkedListResult, ObjectResult, UnwrappedResult,
};
use serde_json::{Map, Value as JsonValue};

const LIST: &str = "@list";

/// Compiles an array that is the value of a term with a list container.
///
/// The array is compiled as a list object, and the result is unwrapped from that object.
pub fn list_array(
    parser: &Parser,
    items: &[JsonValue],
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let mut wrapper = Map::new();
    wrapper.insert(LIST.to_owned(), JsonValue::Array(items.to_vec()));
    let fragment = (parser.list_object)(parser, &wrapper, scope)?;

    let list_key = PathSegment::from(LIST);
    Ok(ParsedFragment {
        intermediate_result: UnwrappedResult::new(LIST, fragment.intermediate_result).into(),
        warnings: fragment
            .warnings
            .into_iter()
            .map(|mut warning| {
                if warning.path.first() == Some(&list_key) {
                    warning.path.remove(0);
                }
                warning
            })
            .collect(),
        ..fragment
    })
}

/// Compiles a list object into a match of an `rdf:first`/`rdf:rest` chain.
pub fn linked_list_object(
    parser: &Parser,
    map: &Map<String, JsonValue>,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let (key, template) = list_template(map, scope)?;
    let list = scope.variable().clone();
    let slot = child_variable(&list, "slot");
    let rest = child_variable(&list, "rest");

    let item_scope = item_scope(scope);
    let element = (parser.resource)(parser, template, &item_scope)?;
    let item = element
        .term
        .unwrap_or_else(|| item_scope.variable().clone().into());

    let chain = Operation::new()
        .with_required(GraphPattern::Path {
            subject: list.clone().into(),
            path: PropertyPathExpression::ZeroOrMore(Box::new(PropertyPathExpression::NamedNode(
                rdf::REST.into_owned(),
            ))),
            object: slot.clone().into(),
        })
        .with_required(GraphPattern::Bgp {
            patterns: vec![
                TriplePattern {
                    subject: slot.clone().into(),
                    predicate: rdf::FIRST.into_owned().into(),
                    object: item,
                },
                TriplePattern {
                    subject: slot.clone().into(),
                    predicate: rdf::REST.into_owned().into(),
                    object: rest.clone().into(),
                },
            ],
        })
        .join(element.operation);

    let result = LinkedListResult::new(
        list.clone(),
        slot.clone(),
        rest.clone(),
        element.intermediate_result,
    );
    let fragment = ParsedFragment::new(
        list_result(map, key, result.into()),
        Some(list.clone().into()),
    )
    .with_operation(Operation::new().join(chain.into_optional()))
    .with_projection(list)
    .with_projection(slot)
    .with_projection(rest);
    Ok(with_items(fragment, key, element.projections, element.warnings))
}

/// Compiles a list object into a match of slots that carry their position.
pub fn indexed_list_object(
    parser: &Parser,
    map: &Map<String, JsonValue>,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let vocabulary = &parser.indexed_lists;
    let (key, template) = list_template(map, scope)?;
    let list = scope.variable().clone();
    let slot = child_variable(&list, "slot");
    let index = child_variable(&list, "index");

    let item_scope = item_scope(scope);
    let element = (parser.resource)(parser, template, &item_scope)?;
    let item = element
        .term
        .unwrap_or_else(|| item_scope.variable().clone().into());

    let chain = Operation::new()
        .with_pattern(TriplePattern {
            subject: list.clone().into(),
            predicate: vocabulary.item.clone().into(),
            object: slot.clone().into(),
        })
        .with_pattern(TriplePattern {
            subject: slot.clone().into(),
            predicate: vocabulary.index.clone().into(),
            object: index.clone().into(),
        })
        .with_pattern(TriplePattern {
            subject: slot.into(),
            predicate: vocabulary.content.clone().into(),
            object: item,
        })
        .join(element.operation);

    let result =
        IndexedListResult::new(index.clone(), vocabulary.origin, element.intermediate_result);
    let fragment = ParsedFragment::new(list_result(map, key, result.into()), Some(list.into()))
        .with_operation(Operation::new().join(chain.into_optional()))
        .with_projection(index);
    Ok(with_items(fragment, key, element.projections, element.warnings))
}

/// Returns the key of the `@list` entry and the template of the list items.
fn list_template<'a>(
    map: &'a Map<String, JsonValue>,
    scope: &Scope,
) -> Result<(&'a str, &'a JsonValue), CompileError> {
    let Some((key, value)) = keyword_entry(map, LIST, scope) else {
        return Err(CompileError::TemplateCardinality { len: 0 });
    };
    match value {
        JsonValue::Array(items) => match items.as_slice() {
            [template] => Ok((key.as_str(), template)),
            _ => Err(CompileError::TemplateCardinality { len: items.len() }),
        },
        template => Ok((key.as_str(), template)),
    }
}

/// List items keep the coercion of the list term, but not its container.
fn item_scope(scope: &Scope) -> Scope {
    let definition = scope
        .definition()
        .cloned()
        .map(|definition| definition.with_container(None));
    scope.child("item").with_definition(definition)
}

/// Echoes the entries of a list object, except for the list itself.
fn list_result(
    map: &Map<String, JsonValue>,
    list_key: &str,
    list: IntermediateResult,
) -> ObjectResult {
    let mut object = ObjectResult::new(None);
    let mut list = Some(list);
    for (key, value) in map {
        let entry = match list.take() {
            Some(list) if key == list_key => list,
            other => {
                list = other;
                IntermediateResult::literal(value.clone())
            }
        };
        object.push(key, entry);
    }
    object
}

fn with_items(
    mut fragment: ParsedFragment,
    list_key: &str,
    projections: Vec<Variable>,
    warnings: Vec<Warning>,
) -> ParsedFragment {
    fragment.project_all(projections);
    fragment.warnings = warnings
        .into_iter()
        .map(|warning| warning.nested(0).nested(list_key))
        .collect();
    fragment
}
