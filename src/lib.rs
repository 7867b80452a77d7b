//! A static rewriting framework for WebAssembly binaries: decode a module
//! into a typed model, edit its sections and function bodies with
//! invariant-preserving index fix-up, and re-emit a valid binary.

pub mod emitter;
pub mod leb128;
pub mod model;
pub mod opcode;
pub mod parser;
pub mod rewriter;

pub use emitter::{emit_binary, emit_file, EmitError};
pub use model::*;
pub use parser::{parse_binary, parse_file, ParseError};
pub use rewriter::{RewriteError, SemanticsRewriter};
