use jsonld_query_model::GraphName;
use oxrdfio::RdfParseError;
use std::error::Error;

/// An error raised while evaluating a graph pattern.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    /// An error from the underlying RDF source.
    #[error(transparent)]
    Source(Box<dyn Error + Send + Sync>),
    /// The graph pattern uses a construct the source cannot evaluate.
    #[error("A feature has not yet been implemented: {0}")]
    NotImplemented(String),
}

/// An error raised while loading a file into a [`MemorySource`](crate::MemorySource).
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// An error raised while reading the file.
    #[error(transparent)]
    Parsing(#[from] RdfParseError),
    /// The file contains a quad outside of the default graph.
    #[error("The source only holds a default graph, found a quad in {0}")]
    NamedGraph(GraphName),
}
