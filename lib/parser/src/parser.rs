use crate::naming::child_variable;
use crate::productions;
use crate::{CompileError, ParsedFragment};
use jsonld_query_context::{
    ActiveContext, ContextNormalizer, InlineContextNormalizer, TermDefinition,
};
use jsonld_query_model::vocab::co;
use jsonld_query_model::{NamedNode, Variable};
use serde_json::{Map, Value as JsonValue};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// The value that marks a position of the query document to be filled in from the data.
pub const PLACEHOLDER: &str = "?";

/// A production that compiles an arbitrary value.
pub type ValueProduction = fn(&Parser, &JsonValue, &Scope) -> Result<ParsedFragment, CompileError>;
/// A production that compiles an object.
pub type ObjectProduction =
    fn(&Parser, &Map<String, JsonValue>, &Scope) -> Result<ParsedFragment, CompileError>;
/// A production that compiles an array.
pub type ArrayProduction = fn(&Parser, &[JsonValue], &Scope) -> Result<ParsedFragment, CompileError>;

/// Where a production is applied in the query document.
#[derive(Clone, Debug)]
pub struct Scope {
    variable: Variable,
    context: Arc<ActiveContext>,
    definition: Option<TermDefinition>,
}

impl Scope {
    pub fn new(variable: Variable, context: Arc<ActiveContext>) -> Self {
        Self {
            variable,
            context,
            definition: None,
        }
    }

    /// The variable that denotes the node of the value.
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn context(&self) -> &Arc<ActiveContext> {
        &self.context
    }

    /// The definition of the term whose value is compiled, if any.
    pub fn definition(&self) -> Option<&TermDefinition> {
        self.definition.as_ref()
    }

    /// The scope of the value of the entry `key`.
    pub fn child(&self, key: &str) -> Scope {
        Scope {
            variable: child_variable(&self.variable, key),
            context: Arc::clone(&self.context),
            definition: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Arc<ActiveContext>) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_definition(mut self, definition: Option<TermDefinition>) -> Self {
        self.definition = definition;
        self
    }
}

/// The predicates of the indexed list encoding.
///
/// A list links to each of its slots via `item`. Every slot links to its position via `index`
/// and to its value via `content`. Positions start at `origin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedListVocabulary {
    pub item: NamedNode,
    pub index: NamedNode,
    pub content: NamedNode,
    pub origin: i64,
}

impl Default for IndexedListVocabulary {
    /// The encoding of the Collections Ontology.
    fn default() -> Self {
        Self {
            item: co::ITEM.into_owned(),
            index: co::INDEX.into_owned(),
            content: co::ITEM_CONTENT.into_owned(),
            origin: 1,
        }
    }
}

/// The grammar of query documents as a table of productions.
///
/// Productions call each other through the table, so replacing an entry changes how the
/// corresponding construct is compiled everywhere in the document. [Parser::with_indexed_lists]
/// uses this to switch the encoding of lists.
///
/// ```
/// use jsonld_query_parser::{Parser, compile};
/// use serde_json::json;
///
/// let query = json!({"@id": "ex:1", "ex:steps": {"@list": ["?"]}});
/// let linked = compile(&query, &Parser::default())?;
/// let indexed = compile(&query, &Parser::with_indexed_lists())?;
/// assert_ne!(linked.algebra, indexed.algebra);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone)]
pub struct Parser {
    pub document: ValueProduction,
    pub node_object: ObjectProduction,
    pub node_object_array: ArrayProduction,
    pub list_array: ArrayProduction,
    pub list_object: ObjectProduction,
    pub top_level_graph_container: ObjectProduction,
    pub graph_object: ObjectProduction,
    pub value_object: ObjectProduction,
    pub set_object: ObjectProduction,
    pub resource: ValueProduction,
    pub primitive: ValueProduction,
    pub type_entry: ValueProduction,
    pub contexts: Arc<dyn ContextNormalizer>,
    pub indexed_lists: IndexedListVocabulary,
}

impl Parser {
    /// A parser that matches lists as explicitly indexed slots instead of `rdf:first`/`rdf:rest`
    /// chains.
    pub fn with_indexed_lists() -> Self {
        Self {
            list_object: productions::list::indexed_list_object,
            ..Self::default()
        }
    }

    /// Replaces the processor for `@context` declarations.
    #[must_use]
    pub fn with_context_normalizer(mut self, contexts: Arc<dyn ContextNormalizer>) -> Self {
        self.contexts = contexts;
        self
    }

    #[must_use]
    pub fn with_indexed_list_vocabulary(mut self, vocabulary: IndexedListVocabulary) -> Self {
        self.indexed_lists = vocabulary;
        self
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            document: productions::document::document,
            node_object: productions::node::node_object,
            node_object_array: productions::array::node_object_array,
            list_array: productions::list::list_array,
            list_object: productions::list::linked_list_object,
            top_level_graph_container: productions::array::top_level_graph_container,
            graph_object: productions::unsupported::graph_object,
            value_object: productions::unsupported::value_object,
            set_object: productions::unsupported::set_object,
            resource: productions::value::resource,
            primitive: productions::value::primitive,
            type_entry: productions::value::type_entry,
            contexts: Arc::new(InlineContextNormalizer),
            indexed_lists: IndexedListVocabulary::default(),
        }
    }
}

impl Debug for Parser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("contexts", &self.contexts)
            .field("indexed_lists", &self.indexed_lists)
            .finish_non_exhaustive()
    }
}
