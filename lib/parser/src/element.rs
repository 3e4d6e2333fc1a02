use crate::{PLACEHOLDER, Scope};
use jsonld_query_context::{Container, IriMode, TermDefinition};
use serde_json::{Map, Value as JsonValue};

/// The kind of a value in a query document.
///
/// Objects are classified by the keywords they contain, taking keyword aliases of the active
/// context into account. Arrays are lists if the term they are the value of is a list container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueryElement<'a> {
    Null,
    Placeholder,
    /// A string, number, or boolean.
    Primitive(&'a JsonValue),
    NodeObject(&'a Map<String, JsonValue>),
    NodeObjectArray(&'a [JsonValue]),
    ListArray(&'a [JsonValue]),
    ListObject(&'a Map<String, JsonValue>),
    GraphObject(&'a Map<String, JsonValue>),
    ValueObject(&'a Map<String, JsonValue>),
    SetObject(&'a Map<String, JsonValue>),
}

impl<'a> QueryElement<'a> {
    pub fn classify(value: &'a JsonValue, scope: &Scope) -> Self {
        match value {
            JsonValue::Null => QueryElement::Null,
            JsonValue::String(value) if value == PLACEHOLDER => QueryElement::Placeholder,
            JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
                QueryElement::Primitive(value)
            }
            JsonValue::Array(items) => {
                let container = scope.definition().and_then(TermDefinition::container);
                if container == Some(Container::List) {
                    QueryElement::ListArray(items)
                } else {
                    QueryElement::NodeObjectArray(items)
                }
            }
            JsonValue::Object(map) => {
                let contains = |keyword: &str| {
                    map.keys().any(|key| {
                        scope
                            .context()
                            .expand_iri(key, IriMode::Vocab)
                            .is_some_and(|expanded| expanded.is_keyword(keyword))
                    })
                };
                if contains("@value") {
                    QueryElement::ValueObject(map)
                } else if contains("@list") {
                    QueryElement::ListObject(map)
                } else if contains("@set") {
                    QueryElement::SetObject(map)
                } else if contains("@graph") {
                    QueryElement::GraphObject(map)
                } else {
                    QueryElement::NodeObject(map)
                }
            }
        }
    }
}

/// Returns the entry of `map` whose key is `keyword` or one of its aliases.
pub(crate) fn keyword_entry<'a>(
    map: &'a Map<String, JsonValue>,
    keyword: &str,
    scope: &Scope,
) -> Option<(&'a String, &'a JsonValue)> {
    map.iter().find(|(key, _)| {
        scope
            .context()
            .expand_iri(key, IriMode::Vocab)
            .is_some_and(|expanded| expanded.is_keyword(keyword))
    })
}
