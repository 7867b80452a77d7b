//! The model of the WebAssembly syntax.

pub mod indices;
pub mod instruction;
pub mod module;
pub mod names;
pub mod types;

pub use indices::*;
pub use instruction::*;
pub use module::*;
pub use names::*;
pub use types::*;
