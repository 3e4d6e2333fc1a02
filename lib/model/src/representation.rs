use crate::vocab::xsd;
use oxrdf::{Literal, TermRef};
use oxsdatatypes::Double;
use serde_json::{Number, Value as JsonValue};
use std::str::FromStr;

/// Encodes a JSON scalar as an RDF literal.
///
/// Strings become simple literals, booleans `xsd:boolean` literals, and numbers either
/// `xsd:integer` or `xsd:double` literals depending on whether the number has a fractional part.
/// Returns [None] for JSON values that are not scalars.
pub fn encode_native(value: &JsonValue) -> Option<Literal> {
    match value {
        JsonValue::String(value) => Some(Literal::new_simple_literal(value)),
        JsonValue::Bool(value) => Some(Literal::from(*value)),
        JsonValue::Number(number) => Some(encode_number(number)),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn encode_number(number: &Number) -> Literal {
    if let Some(value) = number.as_i64() {
        return Literal::from(value);
    }
    if let Some(value) = number.as_u64() {
        return Literal::new_typed_literal(value.to_string(), xsd::INTEGER);
    }

    let value = number.as_f64().unwrap_or(f64::NAN);
    if value.is_finite() && value.fract() == 0.0 {
        Literal::new_typed_literal(format!("{value:.0}"), xsd::INTEGER)
    } else {
        Literal::from(value)
    }
}

/// Decodes an RDF term into a JSON scalar.
///
/// Only simple literals, `xsd:integer`, `xsd:double`, and `xsd:boolean` literals have a native
/// representation. Any other term yields [None].
pub fn decode_native(term: TermRef<'_>) -> Option<JsonValue> {
    let TermRef::Literal(literal) = term else {
        return None;
    };

    if literal.language().is_some() {
        return None;
    }

    let value = literal.value();
    let datatype = literal.datatype();
    if datatype == xsd::STRING {
        Some(JsonValue::String(value.to_owned()))
    } else if datatype == xsd::INTEGER {
        decode_integer(value)
    } else if datatype == xsd::DOUBLE {
        let value = Double::from_str(value).ok()?;
        Number::from_f64(f64::from(value)).map(JsonValue::Number)
    } else if datatype == xsd::BOOLEAN {
        match value {
            "true" => Some(JsonValue::Bool(true)),
            "false" => Some(JsonValue::Bool(false)),
            _ => None,
        }
    } else {
        None
    }
}

/// Integers beyond the range of `i64` and `u64` lose precision, just like they do when they are
/// encoded.
fn decode_integer(value: &str) -> Option<JsonValue> {
    if let Ok(value) = value.parse::<i64>() {
        return Some(JsonValue::from(value));
    }
    if let Ok(value) = value.parse::<u64>() {
        return Some(JsonValue::from(value));
    }

    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value
        .strip_prefix('+')
        .unwrap_or(value)
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(JsonValue::Number)
}
