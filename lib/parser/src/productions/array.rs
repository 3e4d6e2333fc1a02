use crate::{CompileError, ParsedFragment, Parser, Scope};
use jsonld_query_context::propagate;
use jsonld_query_model::{GraphPattern, GroundTerm, TermPattern};
use jsonld_query_results::{ObjectResult, SetResult};
use serde_json::{Map, Value as JsonValue};

/// Compiles an array, which matches any number of nodes of the shape of its only element.
///
/// The matches are optional, so a node without any matching value still has an (empty) array.
pub fn node_object_array(
    parser: &Parser,
    items: &[JsonValue],
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let [template] = items else {
        return Err(CompileError::TemplateCardinality { len: items.len() });
    };

    let element = (parser.resource)(parser, template, scope)?;
    let variable = scope.variable().clone();

    // Members are keyed by the term of the set variable, which a fixed template never binds.
    let fixed = match &element.term {
        Some(TermPattern::NamedNode(iri)) => Some(GroundTerm::NamedNode(iri.clone())),
        Some(TermPattern::Literal(literal)) => Some(GroundTerm::Literal(literal.clone())),
        _ => None,
    };
    let mut operation = element.operation;
    if let Some(term) = fixed {
        operation = operation.with_required(GraphPattern::Values {
            variables: vec![variable.clone()],
            bindings: vec![vec![Some(term)]],
        });
    }

    let mut fragment = ParsedFragment::new(
        SetResult::new(variable.clone(), element.intermediate_result),
        element.term,
    )
    .with_operation(operation.into_optional())
    .with_projection(variable);
    fragment.project_all(element.projections);
    fragment.warnings = element
        .warnings
        .into_iter()
        .map(|warning| warning.nested(0))
        .collect();
    Ok(fragment)
}

/// Compiles a document that only consists of `@graph` (and possibly `@context`).
///
/// The value of `@graph` is compiled like a top-level array.
pub fn top_level_graph_container(
    parser: &Parser,
    map: &Map<String, JsonValue>,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    let declaration = map.get("@context");
    let context = propagate(parser.contexts.as_ref(), scope.context(), declaration)?;
    let scope = scope.clone().with_context(context);

    let element = match map.get("@graph") {
        Some(JsonValue::Array(items)) => (parser.node_object_array)(parser, items, &scope)?,
        Some(value) => (parser.node_object_array)(parser, std::slice::from_ref(value), &scope)?,
        None => return Err(CompileError::TemplateCardinality { len: 0 }),
    };

    let result =
        ObjectResult::new(declaration.cloned()).with_entry("@graph", element.intermediate_result);
    let mut fragment = ParsedFragment::new(result, None).with_operation(element.operation);
    fragment.project_all(element.projections);
    fragment.warnings = element
        .warnings
        .into_iter()
        .map(|warning| warning.nested("@graph"))
        .collect();
    Ok(fragment)
}
