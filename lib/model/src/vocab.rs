//! Vocabularies used by the query compiler.

pub use oxrdf::vocab::{rdf, xsd};

/// [Collections Ontology](http://purl.org/co/) terms used to describe explicitly indexed lists.
pub mod co {
    use oxrdf::NamedNodeRef;

    /// Links a list to one of its slots.
    pub const ITEM: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://purl.org/co/item");
    /// The position of a slot within its list. Positions start at 1.
    pub const INDEX: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://purl.org/co/index");
    /// The resource held by a slot.
    pub const ITEM_CONTENT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/co/itemContent");
}
