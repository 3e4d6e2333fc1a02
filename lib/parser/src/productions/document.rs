use crate::{CompileError, ParsedFragment, Parser, Scope, Warning};
use serde_json::{Map, Value as JsonValue};

/// Compiles a whole query document.
pub fn document(
    parser: &Parser,
    value: &JsonValue,
    scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    match value {
        JsonValue::Array(items) => (parser.node_object_array)(parser, items, scope),
        JsonValue::Object(map) if is_graph_container(map) => {
            (parser.top_level_graph_container)(parser, map, scope)
        }
        JsonValue::Object(map) => (parser.node_object)(parser, map, scope),
        _ => Ok(ParsedFragment::echo(value.clone()).with_warning(Warning::new(
            "A query document must be an object or an array",
        ))),
    }
}

fn is_graph_container(map: &Map<String, JsonValue>) -> bool {
    map.contains_key("@graph") && map.keys().all(|key| key == "@context" || key == "@graph")
}
