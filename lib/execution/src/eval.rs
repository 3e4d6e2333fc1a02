//! A straightforward evaluator for the graph patterns produced by the query compiler.
//!
//! Patterns are evaluated one input solution at a time. The input bindings are substituted into
//! the pattern, so the right-hand side of a join only looks at the triples that are compatible
//! with the left-hand side.

use crate::QueryEvaluationError;
use jsonld_query_model::{
    Graph, GraphPattern, GroundTerm, NamedNodePattern, PropertyPathExpression, SubjectRef, Term,
    TermPattern, TermRef, TriplePattern, TripleRef, Variable,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// A partial solution.
pub(crate) type Bindings = FxHashMap<Variable, Term>;

pub(crate) struct Evaluator<'a> {
    graph: &'a Graph,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Returns all extensions of `input` that match `pattern`.
    pub(crate) fn evaluate(
        &self,
        pattern: &GraphPattern,
        input: &Bindings,
    ) -> Result<Vec<Bindings>, QueryEvaluationError> {
        match pattern {
            GraphPattern::Bgp { patterns } => Ok(patterns.iter().fold(
                vec![input.clone()],
                |solutions, pattern| {
                    solutions
                        .iter()
                        .flat_map(|solution| self.evaluate_triple(pattern, solution))
                        .collect()
                },
            )),
            GraphPattern::Path {
                subject,
                path,
                object,
            } => Ok(self.evaluate_path(subject, path, object, input)),
            GraphPattern::Join { left, right } => {
                let mut result = Vec::new();
                for solution in self.evaluate(left, input)? {
                    result.extend(self.evaluate(right, &solution)?);
                }
                Ok(result)
            }
            GraphPattern::LeftJoin {
                left,
                right,
                expression: None,
            } => {
                let mut result = Vec::new();
                for solution in self.evaluate(left, input)? {
                    let extended = self.evaluate(right, &solution)?;
                    if extended.is_empty() {
                        result.push(solution);
                    } else {
                        result.extend(extended);
                    }
                }
                Ok(result)
            }
            GraphPattern::Values {
                variables,
                bindings,
            } => Ok(bindings
                .iter()
                .filter_map(|row| {
                    let mut solution = input.clone();
                    for (variable, value) in variables.iter().zip(row) {
                        if let Some(value) = value {
                            if !bind(&mut solution, variable, ground_term(value)) {
                                return None;
                            }
                        }
                    }
                    Some(solution)
                })
                .collect()),
            GraphPattern::Project { inner, variables } => {
                let solutions = self.evaluate(inner, input)?;
                Ok(solutions
                    .into_iter()
                    .map(|solution| {
                        let mut projected = input.clone();
                        projected.extend(
                            solution
                                .into_iter()
                                .filter(|(variable, _)| variables.contains(variable)),
                        );
                        projected
                    })
                    .collect())
            }
            GraphPattern::Distinct { inner } => {
                let mut seen = FxHashSet::default();
                Ok(self
                    .evaluate(inner, input)?
                    .into_iter()
                    .filter(|solution| {
                        let mut key = solution
                            .iter()
                            .map(|(variable, term)| (variable.clone(), term.clone()))
                            .collect::<Vec<_>>();
                        key.sort_unstable_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
                        seen.insert(key)
                    })
                    .collect())
            }
            _ => Err(QueryEvaluationError::NotImplemented(format!(
                "Evaluation of {pattern}"
            ))),
        }
    }

    fn evaluate_triple(&self, pattern: &TriplePattern, input: &Bindings) -> Vec<Bindings> {
        let subject = resolve(&pattern.subject, input);
        let predicate = match &pattern.predicate {
            NamedNodePattern::NamedNode(node) => Some(node.clone()),
            NamedNodePattern::Variable(variable) => match input.get(variable) {
                Some(Term::NamedNode(node)) => Some(node.clone()),
                Some(_) => return Vec::new(),
                None => None,
            },
        };
        let object = resolve(&pattern.object, input);

        let candidates: Box<dyn Iterator<Item = TripleRef<'_>> + '_> = match (&subject, &object) {
            (Some(subject), _) => match as_subject(subject) {
                Some(subject) => Box::new(self.graph.triples_for_subject(subject)),
                None => return Vec::new(),
            },
            (None, Some(object)) => Box::new(self.graph.triples_for_object(object)),
            (None, None) => match &predicate {
                Some(predicate) => Box::new(self.graph.triples_for_predicate(predicate)),
                None => Box::new(self.graph.iter()),
            },
        };

        candidates
            .filter(|triple| predicate.as_ref().map_or(true, |p| triple.predicate == *p))
            .filter_map(|triple| {
                let mut solution = input.clone();
                let matches = unify(&mut solution, &pattern.subject, triple.subject.into())
                    && unify_predicate(&mut solution, &pattern.predicate, triple.predicate.into())
                    && unify(&mut solution, &pattern.object, triple.object);
                matches.then_some(solution)
            })
            .collect()
    }

    fn evaluate_path(
        &self,
        subject: &TermPattern,
        path: &PropertyPathExpression,
        object: &TermPattern,
        input: &Bindings,
    ) -> Vec<Bindings> {
        let pairs = match (resolve(subject, input), resolve(object, input)) {
            (Some(start), Some(end)) => {
                if self.path_from(path, &start).contains(&end) {
                    vec![(start, end)]
                } else {
                    Vec::new()
                }
            }
            (Some(start), None) => self
                .path_from(path, &start)
                .into_iter()
                .map(|end| (start.clone(), end))
                .collect(),
            (None, Some(end)) => self
                .path_to(path, &end)
                .into_iter()
                .map(|start| (start, end.clone()))
                .collect(),
            (None, None) => self.path_all(path),
        };

        pairs
            .into_iter()
            .filter_map(|(start, end)| {
                let mut solution = input.clone();
                let matches = unify(&mut solution, subject, start.as_ref())
                    && unify(&mut solution, object, end.as_ref());
                matches.then_some(solution)
            })
            .collect()
    }

    /// The terms reachable from `start` via `path`.
    fn path_from(&self, path: &PropertyPathExpression, start: &Term) -> Vec<Term> {
        match path {
            PropertyPathExpression::NamedNode(predicate) => match as_subject(start) {
                Some(subject) => self
                    .graph
                    .objects_for_subject_predicate(subject, predicate)
                    .map(TermRef::into_owned)
                    .collect(),
                None => Vec::new(),
            },
            PropertyPathExpression::Reverse(inner) => self.path_to(inner, start),
            PropertyPathExpression::Sequence(first, second) => distinct(
                self.path_from(first, start)
                    .iter()
                    .flat_map(|middle| self.path_from(second, middle)),
            ),
            PropertyPathExpression::Alternative(first, second) => distinct(
                self.path_from(first, start)
                    .into_iter()
                    .chain(self.path_from(second, start)),
            ),
            PropertyPathExpression::ZeroOrMore(inner) => {
                closure(vec![start.clone()], |term| self.path_from(inner, term))
            }
            PropertyPathExpression::OneOrMore(inner) => {
                closure(self.path_from(inner, start), |term| self.path_from(inner, term))
            }
            PropertyPathExpression::ZeroOrOne(inner) => distinct(
                std::iter::once(start.clone()).chain(self.path_from(inner, start)),
            ),
            PropertyPathExpression::NegatedPropertySet(excluded) => match as_subject(start) {
                Some(subject) => distinct(
                    self.graph
                        .triples_for_subject(subject)
                        .filter(|triple| !excluded.iter().any(|p| triple.predicate == *p))
                        .map(|triple| triple.object.into_owned()),
                ),
                None => Vec::new(),
            },
        }
    }

    /// The terms from which `end` is reachable via `path`.
    fn path_to(&self, path: &PropertyPathExpression, end: &Term) -> Vec<Term> {
        match path {
            PropertyPathExpression::NamedNode(predicate) => self
                .graph
                .subjects_for_predicate_object(predicate, end)
                .map(|subject| subject.into_owned().into())
                .collect(),
            PropertyPathExpression::Reverse(inner) => self.path_from(inner, end),
            PropertyPathExpression::Sequence(first, second) => distinct(
                self.path_to(second, end)
                    .iter()
                    .flat_map(|middle| self.path_to(first, middle)),
            ),
            PropertyPathExpression::Alternative(first, second) => distinct(
                self.path_to(first, end)
                    .into_iter()
                    .chain(self.path_to(second, end)),
            ),
            PropertyPathExpression::ZeroOrMore(inner) => {
                closure(vec![end.clone()], |term| self.path_to(inner, term))
            }
            PropertyPathExpression::OneOrMore(inner) => {
                closure(self.path_to(inner, end), |term| self.path_to(inner, term))
            }
            PropertyPathExpression::ZeroOrOne(inner) => {
                distinct(std::iter::once(end.clone()).chain(self.path_to(inner, end)))
            }
            PropertyPathExpression::NegatedPropertySet(excluded) => distinct(
                self.graph
                    .triples_for_object(end)
                    .filter(|triple| !excluded.iter().any(|p| triple.predicate == *p))
                    .map(|triple| triple.subject.into_owned().into()),
            ),
        }
    }

    /// All pairs of terms connected via `path`.
    fn path_all(&self, path: &PropertyPathExpression) -> Vec<(Term, Term)> {
        match path {
            PropertyPathExpression::NamedNode(predicate) => self
                .graph
                .triples_for_predicate(predicate)
                .map(|triple| (triple.subject.into_owned().into(), triple.object.into_owned()))
                .collect(),
            PropertyPathExpression::NegatedPropertySet(excluded) => self
                .graph
                .iter()
                .filter(|triple| !excluded.iter().any(|p| triple.predicate == *p))
                .map(|triple| (triple.subject.into_owned().into(), triple.object.into_owned()))
                .collect(),
            _ => self
                .nodes()
                .into_iter()
                .flat_map(|start| {
                    self.path_from(path, &start)
                        .into_iter()
                        .map(move |end| (start.clone(), end))
                })
                .collect(),
        }
    }

    /// All terms that occur as subject or object.
    fn nodes(&self) -> Vec<Term> {
        distinct(self.graph.iter().flat_map(|triple| {
            [
                triple.subject.into_owned().into(),
                triple.object.into_owned(),
            ]
        }))
    }
}

fn resolve(pattern: &TermPattern, input: &Bindings) -> Option<Term> {
    match pattern {
        TermPattern::NamedNode(node) => Some(node.clone().into()),
        TermPattern::BlankNode(node) => Some(node.clone().into()),
        TermPattern::Literal(literal) => Some(literal.clone().into()),
        TermPattern::Variable(variable) => input.get(variable).cloned(),
    }
}

/// Checks that `term` matches `pattern`, binding the variable of the pattern if necessary.
fn unify(solution: &mut Bindings, pattern: &TermPattern, term: TermRef<'_>) -> bool {
    match pattern {
        TermPattern::Variable(variable) => bind(solution, variable, term.into_owned()),
        TermPattern::NamedNode(node) => term == TermRef::from(node.as_ref()),
        TermPattern::BlankNode(node) => term == TermRef::from(node.as_ref()),
        TermPattern::Literal(literal) => term == TermRef::from(literal.as_ref()),
    }
}

fn unify_predicate(solution: &mut Bindings, pattern: &NamedNodePattern, term: TermRef<'_>) -> bool {
    match pattern {
        NamedNodePattern::Variable(variable) => bind(solution, variable, term.into_owned()),
        NamedNodePattern::NamedNode(node) => term == TermRef::from(node.as_ref()),
    }
}

fn bind(solution: &mut Bindings, variable: &Variable, term: Term) -> bool {
    match solution.get(variable) {
        Some(bound) => *bound == term,
        None => {
            solution.insert(variable.clone(), term);
            true
        }
    }
}

fn ground_term(term: &GroundTerm) -> Term {
    match term {
        GroundTerm::NamedNode(node) => node.clone().into(),
        GroundTerm::Literal(literal) => literal.clone().into(),
    }
}

fn as_subject(term: &Term) -> Option<SubjectRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(node.as_ref().into()),
        Term::BlankNode(node) => Some(node.as_ref().into()),
        Term::Literal(_) => None,
    }
}

/// Collects the terms reachable from `start` by applying `step` any number of times.
fn closure(start: Vec<Term>, step: impl Fn(&Term) -> Vec<Term>) -> Vec<Term> {
    let mut seen = FxHashSet::default();
    let mut result = Vec::new();
    let mut queue = start;
    while let Some(term) = queue.pop() {
        if seen.insert(term.clone()) {
            queue.extend(step(&term));
            result.push(term);
        }
    }
    result
}

/// Removes duplicates while keeping the first occurrence of each term.
fn distinct(terms: impl IntoIterator<Item = Term>) -> Vec<Term> {
    let mut seen = FxHashSet::default();
    terms
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonld_query_model::vocab::rdf;
    use jsonld_query_model::{BlankNode, Literal, NamedNode, Triple};

    fn iri(value: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{value}"))
    }

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    /// A list `ex:l = (a b c)` and a person with two names.
    fn graph() -> Graph {
        let mut graph = Graph::new();
        let nodes = ["n0", "n1", "n2"].map(BlankNode::new_unchecked);
        graph.insert(&Triple::new(iri("l"), iri("items"), nodes[0].clone()));
        for (i, (node, item)) in nodes.iter().zip(["a", "b", "c"]).enumerate() {
            graph.insert(&Triple::new(
                node.clone(),
                rdf::FIRST,
                Literal::new_simple_literal(item),
            ));
            let rest: Term = match nodes.get(i + 1) {
                Some(next) => next.clone().into(),
                None => rdf::NIL.into_owned().into(),
            };
            graph.insert(&Triple::new(node.clone(), rdf::REST, rest));
        }
        for name in ["Alice", "Alicia"] {
            graph.insert(&Triple::new(
                iri("p"),
                iri("name"),
                Literal::new_simple_literal(name),
            ));
        }
        graph
    }

    fn triple(
        subject: impl Into<TermPattern>,
        predicate: NamedNode,
        object: impl Into<TermPattern>,
    ) -> TriplePattern {
        TriplePattern {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    #[test]
    fn basic_graph_patterns_join_on_shared_variables() {
        let graph = graph();
        let pattern = GraphPattern::Bgp {
            patterns: vec![
                triple(var("s"), iri("name"), var("name")),
                triple(var("s"), iri("name"), Literal::new_simple_literal("Alice")),
            ],
        };
        let solutions = Evaluator::new(&graph)
            .evaluate(&pattern, &Bindings::default())
            .unwrap();
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|s| s[&var("s")] == Term::from(iri("p"))));
    }

    #[test]
    fn left_join_keeps_unmatched_solutions() {
        let graph = graph();
        let pattern = GraphPattern::LeftJoin {
            left: Box::new(GraphPattern::Bgp {
                patterns: vec![triple(iri("l"), iri("items"), var("list"))],
            }),
            right: Box::new(GraphPattern::Bgp {
                patterns: vec![triple(var("list"), iri("name"), var("name"))],
            }),
            expression: None,
        };
        let solutions = Evaluator::new(&graph)
            .evaluate(&pattern, &Bindings::default())
            .unwrap();
        assert_eq!(solutions.len(), 1);
        assert!(!solutions[0].contains_key(&var("name")));
    }

    #[test]
    fn zero_or_more_paths_include_the_start() {
        let graph = graph();
        let pattern = GraphPattern::Path {
            subject: BlankNode::new_unchecked("n0").into(),
            path: PropertyPathExpression::ZeroOrMore(Box::new(PropertyPathExpression::NamedNode(
                rdf::REST.into_owned(),
            ))),
            object: var("slot").into(),
        };
        let solutions = Evaluator::new(&graph)
            .evaluate(&pattern, &Bindings::default())
            .unwrap();
        let mut slots = solutions
            .iter()
            .map(|solution| solution[&var("slot")].to_string())
            .collect::<Vec<_>>();
        slots.sort();
        assert_eq!(
            slots,
            [
                "<http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>",
                "_:n0",
                "_:n1",
                "_:n2"
            ]
        );
    }

    #[test]
    fn reverse_and_sequence_paths() {
        let graph = graph();
        let first_item = PropertyPathExpression::Sequence(
            Box::new(PropertyPathExpression::NamedNode(iri("items"))),
            Box::new(PropertyPathExpression::NamedNode(rdf::FIRST.into_owned())),
        );
        let evaluator = Evaluator::new(&graph);
        assert_eq!(
            evaluator.path_from(&first_item, &iri("l").into()),
            [Term::from(Literal::new_simple_literal("a"))]
        );
        assert_eq!(
            evaluator.path_from(
                &PropertyPathExpression::Reverse(Box::new(first_item)),
                &Literal::new_simple_literal("a").into()
            ),
            [Term::from(iri("l"))]
        );
    }

    #[test]
    fn values_bind_compatible_rows() {
        let graph = graph();
        let mut input = Bindings::default();
        input.insert(var("a"), iri("x").into());
        let pattern = GraphPattern::Values {
            variables: vec![var("a"), var("b")],
            bindings: vec![
                vec![Some(GroundTerm::NamedNode(iri("x"))), None],
                vec![Some(GroundTerm::NamedNode(iri("y"))), None],
            ],
        };
        let solutions = Evaluator::new(&graph).evaluate(&pattern, &input).unwrap();
        assert_eq!(solutions, vec![input]);
    }

    #[test]
    fn unsupported_patterns_fail() {
        let graph = graph();
        let pattern = GraphPattern::Minus {
            left: Box::new(GraphPattern::Bgp { patterns: Vec::new() }),
            right: Box::new(GraphPattern::Bgp { patterns: Vec::new() }),
        };
        assert!(matches!(
            Evaluator::new(&graph).evaluate(&pattern, &Bindings::default()),
            Err(QueryEvaluationError::NotImplemented(_))
        ));
    }
}
