use crate::{IntermediateResult, ResultError};
use jsonld_query_model::vocab::rdf;
use jsonld_query_model::{QuerySolution, Term, Variable, decode_native};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// The number of missing slots an indexed list may fill with empty objects.
const MAX_MISSING_SLOTS: usize = 1024;

#[derive(Clone, Debug, PartialEq)]
struct IndexedSlot {
    index: Term,
    item: IntermediateResult,
}

/// A list whose slots carry an explicit integer index.
///
/// Slots that never received a solution materialize as empty objects. A list with more than
/// [MAX_MISSING_SLOTS] missing slots is rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedListResult {
    index: Variable,
    origin: i64,
    template: Box<IntermediateResult>,
    slots: BTreeMap<usize, IndexedSlot>,
}

impl IndexedListResult {
    /// Creates an empty list. The slot with index `origin` is the first element.
    pub fn new(index: Variable, origin: i64, template: IntermediateResult) -> Self {
        Self {
            index,
            origin,
            template: Box::new(template),
            slots: BTreeMap::new(),
        }
    }

    pub(crate) fn fold(&mut self, solution: &QuerySolution) -> Result<(), ResultError> {
        let Some(term) = solution.get(self.index.as_str()) else {
            return Ok(());
        };

        let position = decode_native(term.as_ref())
            .and_then(|value| value.as_i64())
            .and_then(|index| index.checked_sub(self.origin))
            .and_then(|position| usize::try_from(position).ok())
            .ok_or_else(|| ResultError::BadNativeValue {
                variable: self.index.clone(),
                term: term.clone(),
            })?;

        self.slots
            .entry(position)
            .or_insert_with(|| IndexedSlot {
                index: term.clone(),
                item: self.template.as_ref().clone(),
            })
            .item
            .fold(solution)
    }

    pub(crate) fn result(&self) -> Result<JsonValue, ResultError> {
        let Some((last, slot)) = self.slots.last_key_value() else {
            return Ok(JsonValue::Array(Vec::new()));
        };
        if last - (self.slots.len() - 1) > MAX_MISSING_SLOTS {
            return Err(ResultError::BadNativeValue {
                variable: self.index.clone(),
                term: slot.index.clone(),
            });
        }

        (0..=*last)
            .map(|position| match self.slots.get(&position) {
                Some(slot) => slot.item.result(),
                None => Ok(JsonValue::Object(Map::new())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct LinkedSlot {
    item: IntermediateResult,
    rest: Option<Term>,
}

/// An `rdf:first`/`rdf:rest` chain.
///
/// Solutions bind the list head, a slot of the chain, and the successor of that slot. The result
/// walks the chain from the head until `rdf:nil`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedListResult {
    list: Variable,
    slot: Variable,
    rest: Variable,
    template: Box<IntermediateResult>,
    head: Option<Term>,
    slots: FxHashMap<Term, LinkedSlot>,
}

impl LinkedListResult {
    pub fn new(list: Variable, slot: Variable, rest: Variable, template: IntermediateResult) -> Self {
        Self {
            list,
            slot,
            rest,
            template: Box::new(template),
            head: None,
            slots: FxHashMap::default(),
        }
    }

    pub(crate) fn fold(&mut self, solution: &QuerySolution) -> Result<(), ResultError> {
        if self.head.is_none() {
            self.head = solution.get(self.list.as_str()).cloned();
        }

        let Some(slot) = solution.get(self.slot.as_str()) else {
            return Ok(());
        };
        let entry = self
            .slots
            .entry(slot.clone())
            .or_insert_with(|| LinkedSlot {
                item: self.template.as_ref().clone(),
                rest: None,
            });
        if let Some(rest) = solution.get(self.rest.as_str()) {
            entry.rest = Some(rest.clone());
        }
        entry.item.fold(solution)
    }

    pub(crate) fn result(&self) -> Result<JsonValue, ResultError> {
        let mut current = self.head.as_ref().ok_or_else(|| ResultError::Incomplete {
            variable: self.list.clone(),
        })?;

        let mut items = Vec::new();
        loop {
            match current {
                Term::NamedNode(node) if *node == rdf::NIL => break,
                Term::Literal(_) => {
                    return Err(ResultError::BadName {
                        term: current.clone(),
                    })
                }
                _ => {}
            }

            let broken = || ResultError::BrokenChain {
                term: current.clone(),
            };
            let slot = self.slots.get(current).ok_or_else(broken)?;
            if items.len() == self.slots.len() {
                // Every slot has been visited, so the chain must be cyclic.
                return Err(broken());
            }
            items.push(slot.item.result()?);
            current = slot.rest.as_ref().ok_or_else(broken)?;
        }

        Ok(JsonValue::Array(items))
    }
}
