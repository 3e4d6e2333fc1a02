//! Constructs that are recognized but not translated into patterns yet.
//!
//! Their value is echoed into the result as-is.

use crate::{CompileError, ParsedFragment, Parser, Scope, Warning};
use serde_json::{Map, Value as JsonValue};

pub fn graph_object(
    _parser: &Parser,
    map: &Map<String, JsonValue>,
    _scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    Ok(echo(map, "Graph objects are not supported yet"))
}

pub fn value_object(
    _parser: &Parser,
    map: &Map<String, JsonValue>,
    _scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    Ok(echo(map, "Value objects are not supported yet"))
}

pub fn set_object(
    _parser: &Parser,
    map: &Map<String, JsonValue>,
    _scope: &Scope,
) -> Result<ParsedFragment, CompileError> {
    Ok(echo(map, "Set objects are not supported yet"))
}

fn echo(map: &Map<String, JsonValue>, message: &str) -> ParsedFragment {
    ParsedFragment::echo(JsonValue::Object(map.clone())).with_warning(Warning::new(message))
}
