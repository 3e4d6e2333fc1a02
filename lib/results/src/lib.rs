//! Intermediate results turn a stream of query solutions into a JSON-LD document.
//!
//! The query compiler produces an [IntermediateResult] template that mirrors the shape of the
//! query. Every solution is folded into the template with [IntermediateResult::add_solution],
//! which consumes the old value and returns the new one. Once all solutions have been folded,
//! [IntermediateResult::result] materializes the JSON value.
//!
//! Containers key their members by the term bound to their variable. Hence, the materialized
//! value does not depend on the order in which solutions arrive.
//!
//! ```
//! use jsonld_query_model::{Literal, QuerySolution, Term, Variable};
//! use jsonld_query_results::{IntermediateResult, ObjectResult};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let name = Variable::new_unchecked("name");
//! let template: IntermediateResult = ObjectResult::new(None)
//!     .with_entry("ex:name", IntermediateResult::native_placeholder(name.clone()))
//!     .into();
//!
//! let solution = QuerySolution::from((
//!     Arc::<[Variable]>::from([name]),
//!     vec![Some(Term::from(Literal::new_simple_literal("Alice")))],
//! ));
//! let folded = template.add_solution(&solution)?;
//! assert_eq!(folded.result()?, json!({"ex:name": "Alice"}));
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod error;
mod list;
mod object;
mod set;
mod unwrapped;

pub use error::ResultError;
pub use list::{IndexedListResult, LinkedListResult};
pub use object::ObjectResult;
pub use set::SetResult;
pub use unwrapped::UnwrappedResult;

use jsonld_query_context::{ActiveContext, IriMode};
use jsonld_query_model::{NamedNode, QuerySolution, Term, Variable, decode_native};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A node of the result template.
#[derive(Clone, Debug, PartialEq)]
pub enum IntermediateResult {
    /// A constant value. Resolved placeholders also become literal values.
    Literal(JsonValue),
    /// A JSON scalar that is taken from the term bound to the variable.
    NativePlaceholder(Variable),
    /// A (compacted) IRI that is taken from the term bound to the variable.
    NamePlaceholder(NamePlaceholder),
    /// The lexical form of a literal of a fixed datatype that is bound to the variable.
    TypedPlaceholder(TypedPlaceholder),
    Object(ObjectResult),
    Set(SetResult),
    IndexedList(IndexedListResult),
    LinkedList(LinkedListResult),
    Unwrapped(UnwrappedResult),
}

/// See [IntermediateResult::NamePlaceholder].
#[derive(Clone, Debug, PartialEq)]
pub struct NamePlaceholder {
    variable: Variable,
    context: Arc<ActiveContext>,
    mode: IriMode,
}

/// See [IntermediateResult::TypedPlaceholder].
#[derive(Clone, Debug, PartialEq)]
pub struct TypedPlaceholder {
    variable: Variable,
    datatype: NamedNode,
}

impl IntermediateResult {
    pub fn literal(value: impl Into<JsonValue>) -> Self {
        IntermediateResult::Literal(value.into())
    }

    pub fn native_placeholder(variable: Variable) -> Self {
        IntermediateResult::NativePlaceholder(variable)
    }

    /// Creates a placeholder for an IRI that is compacted with `context` in the given `mode`.
    pub fn name_placeholder(variable: Variable, context: Arc<ActiveContext>, mode: IriMode) -> Self {
        IntermediateResult::NamePlaceholder(NamePlaceholder {
            variable,
            context,
            mode,
        })
    }

    /// Creates a placeholder for the lexical form of a literal with the given `datatype`.
    pub fn typed_placeholder(variable: Variable, datatype: NamedNode) -> Self {
        IntermediateResult::TypedPlaceholder(TypedPlaceholder { variable, datatype })
    }

    /// Folds a solution into this result.
    ///
    /// Solutions that do not bind the variables of this result leave it unchanged.
    ///
    /// # Errors
    ///
    /// If a bound term cannot be represented in the way the result requires.
    pub fn add_solution(mut self, solution: &QuerySolution) -> Result<Self, ResultError> {
        self.fold(solution)?;
        Ok(self)
    }

    pub(crate) fn fold(&mut self, solution: &QuerySolution) -> Result<(), ResultError> {
        match self {
            IntermediateResult::Literal(_) => {}
            IntermediateResult::NativePlaceholder(variable) => {
                if let Some(term) = solution.get(variable.as_str()) {
                    let value =
                        decode_native(term.as_ref()).ok_or_else(|| ResultError::BadNativeValue {
                            variable: variable.clone(),
                            term: term.clone(),
                        })?;
                    *self = IntermediateResult::Literal(value);
                }
            }
            IntermediateResult::NamePlaceholder(placeholder) => {
                if let Some(term) = solution.get(placeholder.variable.as_str()) {
                    let Term::NamedNode(iri) = term else {
                        return Err(ResultError::NotANamedNode {
                            variable: placeholder.variable.clone(),
                            term: term.clone(),
                        });
                    };
                    let name = placeholder.context.compact_iri(iri.as_str(), placeholder.mode);
                    *self = IntermediateResult::Literal(JsonValue::String(name));
                }
            }
            IntermediateResult::TypedPlaceholder(placeholder) => {
                if let Some(term) = solution.get(placeholder.variable.as_str()) {
                    let lexical = match term {
                        Term::Literal(literal) if literal.datatype() == placeholder.datatype => {
                            literal.value().to_owned()
                        }
                        _ => {
                            return Err(ResultError::BadNativeValue {
                                variable: placeholder.variable.clone(),
                                term: term.clone(),
                            })
                        }
                    };
                    *self = IntermediateResult::Literal(JsonValue::String(lexical));
                }
            }
            IntermediateResult::Object(inner) => inner.fold(solution)?,
            IntermediateResult::Set(inner) => inner.fold(solution)?,
            IntermediateResult::IndexedList(inner) => inner.fold(solution)?,
            IntermediateResult::LinkedList(inner) => inner.fold(solution)?,
            IntermediateResult::Unwrapped(inner) => inner.fold(solution)?,
        }
        Ok(())
    }

    /// Materializes the JSON value of this result.
    ///
    /// # Errors
    ///
    /// Returns [ResultError::Incomplete] if a placeholder has never been bound, and other variants
    /// of [ResultError] if the folded data does not fit the shape of the result.
    pub fn result(&self) -> Result<JsonValue, ResultError> {
        match self {
            IntermediateResult::Literal(value) => Ok(value.clone()),
            IntermediateResult::NativePlaceholder(variable) => Err(ResultError::Incomplete {
                variable: variable.clone(),
            }),
            IntermediateResult::NamePlaceholder(placeholder) => Err(ResultError::Incomplete {
                variable: placeholder.variable.clone(),
            }),
            IntermediateResult::TypedPlaceholder(placeholder) => Err(ResultError::Incomplete {
                variable: placeholder.variable.clone(),
            }),
            IntermediateResult::Object(inner) => inner.result(),
            IntermediateResult::Set(inner) => inner.result(),
            IntermediateResult::IndexedList(inner) => inner.result(),
            IntermediateResult::LinkedList(inner) => inner.result(),
            IntermediateResult::Unwrapped(inner) => inner.result(),
        }
    }
}

macro_rules! implement_from {
    ($variant:ident, $t:ty) => {
        impl From<$t> for IntermediateResult {
            fn from(value: $t) -> Self {
                IntermediateResult::$variant(value)
            }
        }
    };
}

implement_from!(Object, ObjectResult);
implement_from!(Set, SetResult);
implement_from!(IndexedList, IndexedListResult);
implement_from!(LinkedList, LinkedListResult);
implement_from!(Unwrapped, UnwrappedResult);
