mod representation;
pub mod vocab;

pub use representation::{decode_native, encode_native};

// Re-export some oxrdf types.
pub use oxiri::{Iri, IriParseError};
pub use oxrdf::{
    BlankNode, BlankNodeRef, Graph, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, Quad, QuadRef, Subject, SubjectRef, Term, TermRef, Triple, TripleRef, Variable,
    VariableRef,
};
pub use sparesults::QuerySolution;
pub use spargebra::algebra::{GraphPattern, PropertyPathExpression};
pub use spargebra::term::{GroundTerm, NamedNodePattern, TermPattern, TriplePattern};
