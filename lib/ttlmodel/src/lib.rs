#![doc = include_str!("../README.md")]

mod blank_node;
mod literal;
mod named_node;
mod triple;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeLabelParseError};
pub use crate::literal::Literal;
pub use crate::named_node::{NamedNode, NamedNodeRef};
pub use crate::triple::{NamedOrBlankNode, Term, Triple, TryFromTermError};
pub use oxiri::IriParseError;
