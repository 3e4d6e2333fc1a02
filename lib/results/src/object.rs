use crate::{IntermediateResult, ResultError};
use jsonld_query_model::QuerySolution;
use serde_json::{Map, Value as JsonValue};

/// A JSON object whose entries are intermediate results.
///
/// Every solution is handed to every entry. The object is complete once all of its entries are.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectResult {
    context: Option<JsonValue>,
    entries: Vec<(String, IntermediateResult)>,
}

impl ObjectResult {
    /// Creates an empty object that echoes `context` as its `@context` entry.
    pub fn new(context: Option<JsonValue>) -> Self {
        Self {
            context,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: IntermediateResult) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: IntermediateResult) {
        self.entries.push((key.into(), value));
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &IntermediateResult)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub(crate) fn fold(&mut self, solution: &QuerySolution) -> Result<(), ResultError> {
        for (_, entry) in &mut self.entries {
            entry.fold(solution)?;
        }
        Ok(())
    }

    pub(crate) fn result(&self) -> Result<JsonValue, ResultError> {
        let mut object = Map::new();
        if let Some(context) = &self.context {
            object.insert("@context".to_owned(), context.clone());
        }
        for (key, entry) in &self.entries {
            object.insert(key.clone(), entry.result()?);
        }
        Ok(JsonValue::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::solution;
    use jsonld_query_model::{Literal, Variable};
    use serde_json::json;

    #[test]
    fn entries_keep_their_order_after_context() {
        let object = ObjectResult::new(Some(json!({"@vocab": "http://schema.org/"})))
            .with_entry("name", IntermediateResult::literal("Alice"))
            .with_entry("age", IntermediateResult::literal(42));
        assert_eq!(
            serde_json::to_string(&object.result().unwrap()).unwrap(),
            r#"{"@context":{"@vocab":"http://schema.org/"},"name":"Alice","age":42}"#
        );
    }

    #[test]
    fn incomplete_entry_fails_object() {
        let object: IntermediateResult = ObjectResult::new(None)
            .with_entry("name", IntermediateResult::literal("Alice"))
            .with_entry(
                "age",
                IntermediateResult::native_placeholder(Variable::new_unchecked("age")),
            )
            .into();
        assert!(object.result().unwrap_err().is_incomplete());

        let object = object
            .add_solution(&solution([("age", Literal::from(42).into())]))
            .unwrap();
        assert_eq!(object.result().unwrap(), json!({"name": "Alice", "age": 42}));
    }
}
