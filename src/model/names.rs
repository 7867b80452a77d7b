//! Model for custom sections, including the structured `name` section.
//!
//! The `name` section is the one custom section this crate understands: its
//! module-name subsection and the function/table/global/data name maps decode
//! into structured form, while the remaining subsections (locals, labels,
//! types, memories, elements) are retained as opaque bytes and re-emitted
//! verbatim.
//!
//! See <https://webassembly.github.io/spec/core/appendix/custom.html#name-section>

/// An uninterpreted custom section: a name and its raw contents.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#binary-customsec>
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Custom {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Custom {
    /// Creates a new custom section.
    pub fn new(name: String, bytes: Vec<u8>) -> Self {
        Custom { name, bytes }
    }
}

/// One entry of a name map: an index into the respective index space and the
/// UTF-8 name assigned to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameAssoc {
    pub index: u32,
    pub name: String,
}

impl NameAssoc {
    /// Creates a new name-map entry.
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        NameAssoc {
            index,
            name: name.into(),
        }
    }
}

/// Subsection ids of the `name` custom section.
pub mod subsection {
    pub const MODULE: u8 = 0;
    pub const FUNCTION: u8 = 1;
    pub const LOCAL: u8 = 2;
    pub const LABEL: u8 = 3;
    pub const TYPE: u8 = 4;
    pub const TABLE: u8 = 5;
    pub const MEMORY: u8 = 6;
    pub const GLOBAL: u8 = 7;
    pub const ELEMENT: u8 = 8;
    pub const DATA: u8 = 9;
}

/// The structured payload of the `name` custom section.
///
/// Name maps must be sorted by index on the wire; this model keeps them in
/// the decoded order and the emitter writes them back as stored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NameSection {
    /// Subsection 0: the module name, kept as raw bytes.
    pub module_name: Option<Vec<u8>>,
    /// Subsection 1: the function name map.
    pub functions: Vec<NameAssoc>,
    /// Subsection 2: local names, retained opaque.
    pub locals: Option<Vec<u8>>,
    /// Subsection 3: label names, retained opaque.
    pub labels: Option<Vec<u8>>,
    /// Subsection 4: type names, retained opaque.
    pub types: Option<Vec<u8>>,
    /// Subsection 5: the table name map.
    pub tables: Vec<NameAssoc>,
    /// Subsection 6: memory names, retained opaque.
    pub memories: Option<Vec<u8>>,
    /// Subsection 7: the global name map.
    pub globals: Vec<NameAssoc>,
    /// Subsection 8: element names, retained opaque.
    pub elements: Option<Vec<u8>>,
    /// Subsection 9: the data name map.
    pub data: Vec<NameAssoc>,
}

impl NameSection {
    /// Looks up the name assigned to the given function index.
    pub fn function_name(&self, index: u32) -> Option<&str> {
        lookup(&self.functions, index)
    }

    /// Looks up the name assigned to the given global index.
    pub fn global_name(&self, index: u32) -> Option<&str> {
        lookup(&self.globals, index)
    }

    /// Looks up the name assigned to the given data segment index.
    pub fn data_name(&self, index: u32) -> Option<&str> {
        lookup(&self.data, index)
    }

    /// True if no subsection carries any content.
    pub fn is_empty(&self) -> bool {
        self.module_name.is_none()
            && self.functions.is_empty()
            && self.locals.is_none()
            && self.labels.is_none()
            && self.types.is_none()
            && self.tables.is_empty()
            && self.memories.is_none()
            && self.globals.is_empty()
            && self.elements.is_none()
            && self.data.is_empty()
    }
}

fn lookup(map: &[NameAssoc], index: u32) -> Option<&str> {
    map.iter()
        .find(|assoc| assoc.index == index)
        .map(|assoc| assoc.name.as_str())
}

/// A custom section of a module: the structured `name` section or an
/// uninterpreted `(name, bytes)` pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CustomSection {
    Name(NameSection),
    Raw(Custom),
}

impl CustomSection {
    /// The name of the custom section on the wire.
    pub fn name(&self) -> &str {
        match self {
            CustomSection::Name(_) => "name",
            CustomSection::Raw(custom) => &custom.name,
        }
    }
}
