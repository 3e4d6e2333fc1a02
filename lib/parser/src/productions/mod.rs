//! The default productions of [crate::Parser].

pub(crate) mod array;
pub(crate) mod document;
pub(crate) mod list;
pub(crate) mod node;
pub(crate) mod unsupported;
pub(crate) mod value;
