use crate::element::QueryElement;
use crate::{CompileError, PLACEHOLDER, ParsedFragment, Parser, Scope, Warning};
use jsonld_query_context::{ExpandedIri, IriMode, TermDefinition, TypeCoercion};
use jsonld_query_model::{Literal, NamedNode, TermPattern, encode_native};
use jsonld_query_results::IntermediateResult;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Compiles the value of an entry by dispatching on the kind of the value.
pub fn resource(
    parser: &Parser,
    value: &JsonValue,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    match QueryElement::classify(value, scope) {
        QueryElement::Null => Ok(ParsedFragment::echo(JsonValue::Null)
            .with_warning(Warning::new("null values are not supported"))),
        QueryElement::Placeholder | QueryElement::Primitive(_) => {
            (parser.primitive)(parser, value, scope)
        }
        QueryElement::NodeObject(map) => (parser.node_object)(parser, map, scope),
        QueryElement::NodeObjectArray(items) => (parser.node_object_array)(parser, items, scope),
        QueryElement::ListArray(items) => (parser.list_array)(parser, items, scope),
        QueryElement::ListObject(map) => (parser.list_object)(parser, map, scope),
        QueryElement::GraphObject(map) => (parser.graph_object)(parser, map, scope),
        QueryElement::ValueObject(map) => (parser.value_object)(parser, map, scope),
        QueryElement::SetObject(map) => (parser.set_object)(parser, map, scope),
    }
}

/// Compiles a scalar.
///
/// A placeholder is filled in from the term bound to the variable of the scope. If the term
/// definition coerces values to IRIs, the placeholder is filled in with the compacted IRI. If it
/// coerces values to a datatype, the placeholder is filled in with the lexical form. Any other
/// scalar must match exactly and is echoed.
pub fn primitive(
    _parser: &Parser,
    value: &JsonValue,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let coercion = scope.definition().and_then(TermDefinition::type_coercion);
    let variable = scope.variable().clone();

    if value.as_str() == Some(PLACEHOLDER) {
        let result = match coercion {
            Some(TypeCoercion::Id) => IntermediateResult::name_placeholder(
                variable.clone(),
                Arc::clone(scope.context()),
                IriMode::Base,
            ),
            Some(TypeCoercion::Vocab) => IntermediateResult::name_placeholder(
                variable.clone(),
                Arc::clone(scope.context()),
                IriMode::Vocab,
            ),
            Some(TypeCoercion::Datatype(datatype)) => {
                IntermediateResult::typed_placeholder(variable.clone(), datatype.clone())
            }
            None => IntermediateResult::native_placeholder(variable.clone()),
        };
        return Ok(
            ParsedFragment::new(result, Some(variable.clone().into())).with_projection(variable)
        );
    }

    let term: TermPattern = match (value, coercion) {
        (JsonValue::String(name), Some(TypeCoercion::Id)) => {
            expand(scope, name, IriMode::Base)?.into()
        }
        (JsonValue::String(name), Some(TypeCoercion::Vocab)) => {
            expand(scope, name, IriMode::Vocab)?.into()
        }
        (JsonValue::String(lexical), Some(TypeCoercion::Datatype(datatype))) => {
            Literal::new_typed_literal(lexical, datatype.clone()).into()
        }
        _ => match encode_native(value) {
            Some(literal) => literal.into(),
            None => {
                return Ok(ParsedFragment::echo(value.clone())
                    .with_warning(Warning::new("Expected a scalar value")))
            }
        },
    };
    Ok(ParsedFragment::new(
        IntermediateResult::literal(value.clone()),
        Some(term),
    ))
}

/// Compiles the value of a `@type` entry.
///
/// Type names are relative to `@vocab` and are compacted the same way.
pub fn type_entry(
    _parser: &Parser,
    value: &JsonValue,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let variable = scope.variable().clone();
    match value {
        JsonValue::String(name) if name == PLACEHOLDER => {
            let result = IntermediateResult::name_placeholder(
                variable.clone(),
                Arc::clone(scope.context()),
                IriMode::Vocab,
            );
            Ok(ParsedFragment::new(result, Some(variable.clone().into())).with_projection(variable))
        }
        JsonValue::String(name) => {
            let iri = expand(scope, name, IriMode::Vocab)?;
            Ok(ParsedFragment::new(
                IntermediateResult::literal(value.clone()),
                Some(iri.into()),
            ))
        }
        _ => Err(CompileError::InvalidType {
            value: value.clone(),
        }),
    }
}

pub(crate) fn expand(scope: &Scope, name: &str, mode: IriMode) -> Result<NamedNode, CompileError> {
    scope
        .context()
        .expand_iri(name, mode)
        .and_then(ExpandedIri::into_iri)
        .ok_or_else(|| CompileError::InvalidIri {
            value: name.to_owned(),
        })
}
