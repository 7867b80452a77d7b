//! WebAssembly model of modules and their sections.
//!
//! A module is the root aggregate: one typed bucket per standard section, an
//! ordered list of custom sections, and the byte ranges the decoder recorded
//! for each section of the source file. The buckets are plain public vectors;
//! the rewriters in this crate mutate them directly and keep the
//! cross-section indices consistent.
//!
//! See <https://webassembly.github.io/spec/core/syntax/modules.html#modules>

use crate::model::names::CustomSection;
use crate::model::{
    Expression, FuncType, FunctionIndex, GlobalType, Limits, MemoryIndex, NameSection, TableIndex,
    TableType, TypeIndex, ValType,
};
use std::ops::Range;
use std::path::PathBuf;

/// The magic constant identifying a WebAssembly binary: `\0asm`.
pub const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// The supported version of the binary format.
pub const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Size of a linear-memory page in bytes.
pub const PAGE_SIZE: u64 = 65536;

/// Identifiers of the module sections in the binary format.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#sections>
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
    DataCount = 12,
}

impl SectionId {
    /// Maps a wire id byte to a section identifier.
    pub fn from_id(id: u8) -> Option<Self> {
        let section = match id {
            0 => SectionId::Custom,
            1 => SectionId::Type,
            2 => SectionId::Import,
            3 => SectionId::Function,
            4 => SectionId::Table,
            5 => SectionId::Memory,
            6 => SectionId::Global,
            7 => SectionId::Export,
            8 => SectionId::Start,
            9 => SectionId::Element,
            10 => SectionId::Code,
            11 => SectionId::Data,
            12 => SectionId::DataCount,
            _ => return None,
        };

        Some(section)
    }

    /// The position of this section in the schema order of the binary format.
    /// The data-count section sorts between the element and code sections
    /// even though its id is larger.
    pub fn schema_order(self) -> u8 {
        match self {
            SectionId::DataCount => SectionId::Element as u8 + 1,
            SectionId::Element => SectionId::Element as u8,
            other if (other as u8) > SectionId::Element as u8 => other as u8 + 1,
            other => other as u8,
        }
    }
}

/// The byte range of one section in the source file, spanning the id byte,
/// the size, and the body.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SectionRange {
    pub start: usize,
    pub end: usize,
    /// Name of the custom section this range belongs to, if any.
    pub name: Option<String>,
}

impl SectionRange {
    /// Creates a range for a standard section.
    pub fn new(range: Range<usize>) -> Self {
        SectionRange {
            start: range.start,
            end: range.end,
            name: None,
        }
    }

    /// Creates a range for a custom section with the given name.
    pub fn custom(range: Range<usize>, name: impl Into<String>) -> Self {
        SectionRange {
            start: range.start,
            end: range.end,
            name: Some(name.into()),
        }
    }
}

/// The section byte ranges recorded by the decoder: one optional range per
/// standard section and one per custom section, in input order.
///
/// Ranges describe the file the module was decoded from. They are advisory
/// once the module has been mutated; the encoder recomputes them on emit.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SectionRanges {
    standard: [Option<SectionRange>; 12],
    customs: Vec<SectionRange>,
}

impl SectionRanges {
    /// The recorded range of the given standard section.
    pub fn standard(&self, id: SectionId) -> Option<&SectionRange> {
        match id {
            SectionId::Custom => None,
            _ => self.standard[id as usize - 1].as_ref(),
        }
    }

    /// The recorded ranges of the custom sections, in input order.
    pub fn customs(&self) -> &[SectionRange] {
        &self.customs
    }

    /// Records the range of a standard section.
    pub fn record_standard(&mut self, id: SectionId, range: SectionRange) {
        if id != SectionId::Custom {
            self.standard[id as usize - 1] = Some(range);
        }
    }

    /// Records the range of a custom section.
    pub fn record_custom(&mut self, range: SectionRange) {
        self.customs.push(range);
    }

    /// Drops every recorded range.
    pub fn clear(&mut self) {
        self.standard = Default::default();
        self.customs.clear();
    }
}

/// An import: a two-level name and a descriptor of the imported entity.
///
/// See <https://webassembly.github.io/spec/core/syntax/modules.html#imports>
#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub desc: ImportKind,
}

impl Import {
    /// Creates a new import.
    pub fn new(module: impl Into<String>, name: impl Into<String>, desc: ImportKind) -> Self {
        Import {
            module: module.into(),
            name: name.into(),
            desc,
        }
    }

    /// Creates a function import of the given type index.
    pub fn function(module: impl Into<String>, name: impl Into<String>, kind: TypeIndex) -> Self {
        Import::new(module, name, ImportKind::Function(kind))
    }
}

/// The descriptor of an import.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ImportKind {
    Function(TypeIndex),
    Table(TableType),
    Memory(Limits),
    Global(GlobalType),
}

/// An export: a unique name and the index of the exported entity.
///
/// See <https://webassembly.github.io/spec/core/syntax/modules.html#exports>
#[derive(Clone, Debug, PartialEq)]
pub struct Export {
    pub name: String,
    pub desc: ExportKind,
}

impl Export {
    /// Creates a new export.
    pub fn new(name: impl Into<String>, desc: ExportKind) -> Self {
        Export {
            name: name.into(),
            desc,
        }
    }

    /// Creates a function export of the given function index.
    pub fn function(name: impl Into<String>, index: FunctionIndex) -> Self {
        Export::new(name, ExportKind::Function(index))
    }
}

/// The descriptor of an export.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExportKind {
    Function(FunctionIndex),
    Table(TableIndex),
    Memory(MemoryIndex),
    Global(u32),
}

/// A global variable: its type and a constant initializer expression.
///
/// See <https://webassembly.github.io/spec/core/syntax/modules.html#globals>
#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    pub kind: GlobalType,
    pub init: Expression,
}

impl Global {
    /// Creates a new global variable.
    pub fn new(kind: GlobalType, init: Expression) -> Self {
        Global { kind, init }
    }
}

/// An element segment: a table index, an offset expression, and the function
/// indices used to initialize the table at that offset.
///
/// See <https://webassembly.github.io/spec/core/syntax/modules.html#element-segments>
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub table: TableIndex,
    pub offset: Expression,
    pub functions: Vec<FunctionIndex>,
}

impl Element {
    /// Creates a new active element segment.
    pub fn new(table: TableIndex, offset: Expression, functions: Vec<FunctionIndex>) -> Self {
        Element {
            table,
            offset,
            functions,
        }
    }
}

/// A run-length group of locals sharing one value type.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#code-section>
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Locals {
    pub count: u32,
    pub kind: ValType,
}

impl Locals {
    /// Creates a new group of locals.
    pub fn new(count: u32, kind: ValType) -> Self {
        Locals { count, kind }
    }
}

/// A function body: the declared locals and the instruction sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Code {
    pub locals: Vec<Locals>,
    pub body: Expression,
}

impl Code {
    /// Creates a new function body.
    pub fn new(locals: Vec<Locals>, body: Expression) -> Self {
        Code { locals, body }
    }

    /// The total number of declared locals.
    pub fn local_count(&self) -> u64 {
        self.locals.iter().map(|group| group.count as u64).sum()
    }
}

/// The mode of a data segment.
#[derive(Clone, Debug, PartialEq)]
pub enum DataMode {
    /// Copied into a memory during instantiation at the given offset.
    Active(MemoryIndex, Expression),
    /// Initialized only through `memory.init`.
    Passive,
}

/// A data segment: its mode and initialization bytes.
///
/// See <https://webassembly.github.io/spec/core/syntax/modules.html#data-segments>
#[derive(Clone, Debug, PartialEq)]
pub struct Data {
    pub mode: DataMode,
    pub init: Vec<u8>,
}

impl Data {
    /// Creates an active data segment.
    pub fn active(memory: MemoryIndex, offset: Expression, init: Vec<u8>) -> Self {
        Data {
            mode: DataMode::Active(memory, offset),
            init,
        }
    }

    /// Creates a passive data segment.
    pub fn passive(init: Vec<u8>) -> Self {
        Data {
            mode: DataMode::Passive,
            init,
        }
    }
}

/// A decoded WebAssembly module.
///
/// Function indices enumerate function imports first, then the entries of the
/// code section; global indices enumerate global imports first, then the
/// global section. The helpers below convert between that combined numbering
/// and section offsets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    /// Type indices of the module's own functions, one per code entry.
    pub functions: Vec<TypeIndex>,
    pub tables: Vec<TableType>,
    pub memories: Vec<Limits>,
    pub globals: Vec<Global>,
    pub exports: Vec<Export>,
    pub start: Option<FunctionIndex>,
    pub elements: Vec<Element>,
    pub code: Vec<Code>,
    pub data: Vec<Data>,
    pub data_count: Option<u32>,
    pub customs: Vec<CustomSection>,
    pub section_ranges: SectionRanges,
    /// The file this module was decoded from, if any.
    pub path: Option<PathBuf>,
}

impl Module {
    /// Creates a new empty module.
    pub fn empty() -> Self {
        Module::default()
    }

    /// The number of imported functions.
    pub fn imported_function_count(&self) -> u32 {
        self.imports
            .iter()
            .filter(|import| matches!(import.desc, ImportKind::Function(_)))
            .count() as u32
    }

    /// The number of imported globals.
    pub fn imported_global_count(&self) -> u32 {
        self.imports
            .iter()
            .filter(|import| matches!(import.desc, ImportKind::Global(_)))
            .count() as u32
    }

    /// The total number of functions in the combined numbering.
    pub fn function_count(&self) -> u32 {
        self.imported_function_count() + self.code.len() as u32
    }

    /// The total number of globals in the combined numbering.
    pub fn global_count(&self) -> u32 {
        self.imported_global_count() + self.globals.len() as u32
    }

    /// The structured `name` section, if the module carries one.
    pub fn name_section(&self) -> Option<&NameSection> {
        self.customs.iter().find_map(|custom| match custom {
            CustomSection::Name(names) => Some(names),
            CustomSection::Raw(_) => None,
        })
    }

    /// Mutable access to the structured `name` section.
    pub fn name_section_mut(&mut self) -> Option<&mut NameSection> {
        self.customs.iter_mut().find_map(|custom| match custom {
            CustomSection::Name(names) => Some(names),
            CustomSection::Raw(_) => None,
        })
    }

    /// Mutable access to the structured `name` section, appending an empty
    /// one if the module has none.
    pub fn name_section_mut_or_insert(&mut self) -> &mut NameSection {
        if self.name_section().is_none() {
            self.customs.push(CustomSection::Name(NameSection::default()));
        }

        // The section exists now.
        self.name_section_mut().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mutability;

    #[test]
    fn empty_module() {
        let module = Module::empty();

        assert_eq!(module.function_count(), 0);
        assert_eq!(module.global_count(), 0);
        assert!(module.name_section().is_none());
    }

    #[test]
    fn combined_counts() {
        let mut module = Module::empty();
        module.types.push(FuncType::runnable());
        module.imports.push(Import::function("env", "log", 0));
        module.imports.push(Import::new(
            "env",
            "flag",
            ImportKind::Global(GlobalType::new(ValType::I32, Mutability::Immutable)),
        ));
        module.functions.push(0);
        module.code.push(Code::default());

        assert_eq!(module.imported_function_count(), 1);
        assert_eq!(module.imported_global_count(), 1);
        assert_eq!(module.function_count(), 2);
        assert_eq!(module.global_count(), 1);
    }

    #[test]
    fn schema_order_places_data_count_before_code() {
        assert!(SectionId::Element.schema_order() < SectionId::DataCount.schema_order());
        assert!(SectionId::DataCount.schema_order() < SectionId::Code.schema_order());
        assert!(SectionId::Code.schema_order() < SectionId::Data.schema_order());
    }

    #[test]
    fn name_section_inserted_on_demand() {
        let mut module = Module::empty();
        module
            .name_section_mut_or_insert()
            .functions
            .push(crate::model::NameAssoc::new(0, "main"));

        assert_eq!(module.name_section().unwrap().function_name(0), Some("main"));
    }
}
