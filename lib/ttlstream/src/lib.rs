#![doc = include_str!("../README.md")]

mod context;
mod emitter;
mod error;
mod lexer;
mod machine;
mod source;
mod turtle;

pub use crate::context::Context;
pub use crate::emitter::{CollectingEmitter, Emitter, WriterEmitter};
pub use crate::error::{TtlParseError, TtlSyntaxError, TtlSyntaxErrorKind};
pub use crate::machine::State;
pub use crate::source::TextPosition;
pub use crate::turtle::{ParsedDocument, TtlParser};
