use crate::{IntermediateResult, ResultError};
use jsonld_query_model::{QuerySolution, Term, Variable};
use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;

/// Zero or more instances of a template, one per distinct term bound to the variable.
///
/// Members are materialized in the order in which their term was first seen. An empty set is a
/// valid result.
#[derive(Clone, Debug, PartialEq)]
pub struct SetResult {
    variable: Variable,
    template: Box<IntermediateResult>,
    members: Vec<IntermediateResult>,
    index: FxHashMap<Term, usize>,
}

impl SetResult {
    pub fn new(variable: Variable, template: IntermediateResult) -> Self {
        Self {
            variable,
            template: Box::new(template),
            members: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn fold(&mut self, solution: &QuerySolution) -> Result<(), ResultError> {
        let Some(term) = solution.get(self.variable.as_str()) else {
            return Ok(());
        };

        let position = match self.index.get(term) {
            Some(position) => *position,
            None => {
                self.members.push(self.template.as_ref().clone());
                self.index.insert(term.clone(), self.members.len() - 1);
                self.members.len() - 1
            }
        };
        self.members[position].fold(solution)
    }

    pub(crate) fn result(&self) -> Result<JsonValue, ResultError> {
        self.members
            .iter()
            .map(IntermediateResult::result)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array)
    }
}
