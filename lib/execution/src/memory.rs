use crate::eval::{Bindings, Evaluator};
use crate::{LoaderError, QueryEvaluationError, QuerySolutionStream, SolutionSource};
use async_trait::async_trait;
use jsonld_query_model::{
    Graph, GraphName, GraphPattern, QuerySolution, Triple, TripleRef, Variable,
};
use oxrdfio::RdfParser;
use std::io::Read;
use std::sync::Arc;

/// A [SolutionSource] that evaluates patterns against an in-memory RDF graph.
///
/// Usage example:
/// ```
/// use futures::TryStreamExt;
/// use jsonld_query_execution::{MemorySource, SolutionSource};
/// use jsonld_query_model::{GraphPattern, NamedNode, TriplePattern, Variable};
/// use oxrdfio::RdfFormat;
///
/// # tokio_test::block_on(async {
/// let mut source = MemorySource::new();
/// source.load_from_reader(
///     RdfFormat::Turtle,
///     b"<http://example.com/a> <http://example.com/p> \"x\" .".as_ref(),
/// )?;
///
/// let pattern = GraphPattern::Bgp {
///     patterns: vec![TriplePattern {
///         subject: Variable::new("s")?.into(),
///         predicate: NamedNode::new("http://example.com/p")?.into(),
///         object: Variable::new("o")?.into(),
///     }],
/// };
/// let solutions = source.evaluate(&pattern).await?.try_collect::<Vec<_>>().await?;
/// assert_eq!(solutions.len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// # }).unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    graph: Graph,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Adds a triple. Returns `true` if the triple was not already present.
    pub fn insert<'a>(&mut self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.graph.insert(triple)
    }

    /// Loads a file into the source.
    ///
    /// The file must only contain triples in the default graph.
    ///
    /// # Errors
    ///
    /// If the file cannot be parsed or contains named graphs. Nothing is inserted in that case.
    pub fn load_from_reader(
        &mut self,
        parser: impl Into<RdfParser>,
        reader: impl Read,
    ) -> Result<(), LoaderError> {
        let quads = parser
            .into()
            .rename_blank_nodes()
            .for_reader(reader)
            .collect::<Result<Vec<_>, _>>()?;
        let triples = quads
            .into_iter()
            .map(|quad| match quad.graph_name {
                GraphName::DefaultGraph => Ok(Triple::from(quad)),
                graph_name => Err(LoaderError::NamedGraph(graph_name)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(triples = triples.len(), "Loaded triples into memory source");
        self.graph.extend(triples);
        Ok(())
    }

    /// Evaluates `pattern` synchronously.
    pub fn evaluate_sync(
        &self,
        pattern: &GraphPattern,
    ) -> Result<(Arc<[Variable]>, Vec<QuerySolution>), QueryEvaluationError> {
        let solutions = Evaluator::new(&self.graph).evaluate(pattern, &Bindings::default())?;

        let variables: Arc<[Variable]> = match pattern {
            GraphPattern::Project { variables, .. } => variables.clone().into(),
            _ => {
                let mut variables = solutions
                    .iter()
                    .flat_map(|solution| solution.keys().cloned())
                    .collect::<Vec<_>>();
                variables.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
                variables.dedup();
                variables.into()
            }
        };

        tracing::debug!(solutions = solutions.len(), "Evaluated graph pattern");
        let solutions = solutions
            .into_iter()
            .map(|mut solution| {
                let values = variables
                    .iter()
                    .map(|variable| solution.remove(variable))
                    .collect::<Vec<_>>();
                QuerySolution::from((Arc::clone(&variables), values))
            })
            .collect();
        Ok((variables, solutions))
    }
}

impl From<Graph> for MemorySource {
    fn from(graph: Graph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl SolutionSource for MemorySource {
    async fn evaluate(
        &self,
        pattern: &GraphPattern,
    ) -> Result<QuerySolutionStream, QueryEvaluationError> {
        let (variables, solutions) = self.evaluate_sync(pattern)?;
        Ok(QuerySolutionStream::from_solutions(variables, solutions))
    }
}
