//! Definitions are referenced with zero-based indices.
//! Each class of definition has its own index space.
//!
//! The index spaces for functions, tables, memories and globals include the
//! respective imports declared in the same module; the indices of those
//! imports precede the indices of definitions contained in the module itself.
//!
//! See <https://webassembly.github.io/spec/core/syntax/modules.html#indices>

pub type TypeIndex = u32;
pub type FunctionIndex = u32;
pub type TableIndex = u32;
pub type MemoryIndex = u32;
pub type GlobalIndex = u32;
pub type ElementIndex = u32;
pub type DataIndex = u32;
pub type LocalIndex = u32;
pub type LabelIndex = u32;
