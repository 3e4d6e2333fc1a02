#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod error;
mod query;

pub use error::QueryError;
pub use jsonld_query_parser::{
    CompileError, CompiledQuery, PLACEHOLDER, Parser, PathSegment, Warning, compile,
    compile_in_context,
};
pub use query::{QueryOptions, QueryResponse, query, query_opt};

pub mod model {
    pub use jsonld_query_model::*;
}

pub mod context {
    pub use jsonld_query_context::*;
}

pub mod parser {
    pub use jsonld_query_parser::*;
}

pub mod results {
    pub use jsonld_query_results::*;
}

pub mod execution {
    pub use jsonld_query_execution::*;
}
