use crate::{IntermediateResult, ResultError};
use jsonld_query_model::QuerySolution;
use serde_json::Value as JsonValue;

/// Returns a single entry of the object produced by the inner result.
///
/// Used when the query wraps a value in a container object (e.g., `{"@list": [...]}`) that must
/// not appear in the output.
#[derive(Clone, Debug, PartialEq)]
pub struct UnwrappedResult {
    key: String,
    inner: Box<IntermediateResult>,
}

impl UnwrappedResult {
    pub fn new(key: impl Into<String>, inner: IntermediateResult) -> Self {
        Self {
            key: key.into(),
            inner: Box::new(inner),
        }
    }

    pub(crate) fn fold(&mut self, solution: &QuerySolution) -> Result<(), ResultError> {
        self.inner.fold(solution)
    }

    pub(crate) fn result(&self) -> Result<JsonValue, ResultError> {
        match self.inner.result()? {
            JsonValue::Object(mut object) => {
                object.remove(&self.key).ok_or_else(|| ResultError::BadUnwrap {
                    key: self.key.clone(),
                })
            }
            _ => Err(ResultError::BadUnwrap {
                key: self.key.clone(),
            }),
        }
    }
}
