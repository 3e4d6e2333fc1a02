use jsonld_query_model::{GraphPattern, NamedNodePattern, TermPattern, TriplePattern, Variable};
use jsonld_query_results::IntermediateResult;
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter};

/// One step of the path from the document root to a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_owned())
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key:?}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A non-fatal problem found while compiling a query.
///
/// The path locates the offending value, starting at the document root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl Warning {
    /// Creates a warning about the value the compiler currently looks at.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Moves this warning one level down, below `segment`.
    #[must_use]
    pub fn nested(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.insert(0, segment.into());
        self
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at [", self.message)?;
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{segment}")?;
        }
        write!(f, "])")
    }
}

/// The algebra of a compiled subtree.
///
/// An operation consists of a required part and a list of groups that are joined optionally onto
/// the required part. Joining a required operation merges both required parts, while an optional
/// operation becomes one more optional group. The flag never affects [Operation::build]; it only
/// tells the parent how to join this operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Operation {
    patterns: Vec<TriplePattern>,
    required: Vec<GraphPattern>,
    optionals: Vec<GraphPattern>,
    optional: bool,
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple pattern to the required part.
    #[must_use]
    pub fn with_pattern(mut self, pattern: TriplePattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Adds the triple pattern that connects this operation to its parent.
    ///
    /// The link precedes all other patterns of the required part.
    #[must_use]
    pub fn with_link(mut self, pattern: TriplePattern) -> Self {
        self.patterns.insert(0, pattern);
        self
    }

    /// Adds an arbitrary pattern to the required part.
    #[must_use]
    pub fn with_required(mut self, pattern: GraphPattern) -> Self {
        self.required.push(pattern);
        self
    }

    /// Marks this operation as optional relative to its parent.
    #[must_use]
    pub fn into_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.required.is_empty() && self.optionals.is_empty()
    }

    /// Joins `other` into this operation.
    #[must_use]
    pub fn join(mut self, other: Operation) -> Self {
        if other.is_empty() {
            return self;
        }

        if other.optional {
            self.optionals.push(other.build());
        } else {
            self.patterns.extend(other.patterns);
            self.required.extend(other.required);
            self.optionals.extend(other.optionals);
        }
        self
    }

    /// Builds the graph pattern of this operation, ignoring whether it is optional.
    pub fn build(&self) -> GraphPattern {
        let bgp = (!self.patterns.is_empty()).then(|| GraphPattern::Bgp {
            patterns: self.patterns.clone(),
        });
        let required = bgp
            .into_iter()
            .chain(self.required.iter().cloned())
            .reduce(|left, right| GraphPattern::Join {
                left: Box::new(left),
                right: Box::new(right),
            })
            .unwrap_or_else(empty_pattern);

        self.optionals
            .iter()
            .cloned()
            .fold(required, |left, right| GraphPattern::LeftJoin {
                left: Box::new(left),
                right: Box::new(right),
                expression: None,
            })
    }

    /// Builds the graph pattern of a whole query.
    ///
    /// An optional operation still yields the empty solution if it has no match.
    pub fn to_graph_pattern(&self) -> GraphPattern {
        if self.optional && !self.is_empty() {
            GraphPattern::LeftJoin {
                left: Box::new(empty_pattern()),
                right: Box::new(self.build()),
                expression: None,
            }
        } else {
            self.build()
        }
    }
}

fn empty_pattern() -> GraphPattern {
    GraphPattern::Bgp {
        patterns: Vec::new(),
    }
}

/// Collects the variables mentioned by the patterns the compiler generates.
pub(crate) fn collect_variables<'a>(
    pattern: &'a GraphPattern,
    variables: &mut FxHashSet<&'a Variable>,
) {
    match pattern {
        GraphPattern::Bgp { patterns } => {
            for pattern in patterns {
                collect_term(&pattern.subject, variables);
                if let NamedNodePattern::Variable(variable) = &pattern.predicate {
                    variables.insert(variable);
                }
                collect_term(&pattern.object, variables);
            }
        }
        GraphPattern::Path {
            subject, object, ..
        } => {
            collect_term(subject, variables);
            collect_term(object, variables);
        }
        GraphPattern::Join { left, right } | GraphPattern::LeftJoin { left, right, .. } => {
            collect_variables(left, variables);
            collect_variables(right, variables);
        }
        GraphPattern::Values {
            variables: bound, ..
        } => variables.extend(bound),
        GraphPattern::Project { inner, .. } | GraphPattern::Distinct { inner } => {
            collect_variables(inner, variables);
        }
        _ => {}
    }
}

fn collect_term<'a>(term: &'a TermPattern, variables: &mut FxHashSet<&'a Variable>) {
    if let TermPattern::Variable(variable) = term {
        variables.insert(variable);
    }
}

/// The result of compiling one subtree of a query document.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedFragment {
    pub intermediate_result: IntermediateResult,
    pub operation: Operation,
    /// The variables the result template consumes, without duplicates.
    pub projections: Vec<Variable>,
    pub warnings: Vec<Warning>,
    /// The term that denotes the node of this subtree. Values that the compiler does not translate
    /// into patterns have no term.
    pub term: Option<TermPattern>,
}

impl ParsedFragment {
    pub fn new(intermediate_result: impl Into<IntermediateResult>, term: Option<TermPattern>) -> Self {
        Self {
            intermediate_result: intermediate_result.into(),
            operation: Operation::new(),
            projections: Vec::new(),
            warnings: Vec::new(),
            term,
        }
    }

    /// Echoes `value` into the result without generating any pattern.
    pub fn echo(value: JsonValue) -> Self {
        Self::new(IntermediateResult::Literal(value), None)
    }

    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    #[must_use]
    pub fn with_projection(mut self, variable: Variable) -> Self {
        self.project(variable);
        self
    }

    pub fn project(&mut self, variable: Variable) {
        if !self.projections.contains(&variable) {
            self.projections.push(variable);
        }
    }

    /// Adds the projections of a child fragment.
    pub fn project_all(&mut self, variables: impl IntoIterator<Item = Variable>) {
        for variable in variables {
            self.project(variable);
        }
    }
}
