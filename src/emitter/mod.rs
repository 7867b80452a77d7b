//! Emitter of the WebAssembly binary format.
//!
//! The emitter is the exact dual of the parser: it performs a whole-file
//! rewrite of a module, carrying no layout over from the source file. Section
//! sizes are measured with a counting sink before the real write.

mod errors;
mod instruction;
mod module;
mod sections;
mod types;
mod values;

pub use errors::EmitError;
pub use instruction::{emit_expression, emit_instruction};

use crate::model::Module;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Emits the binary representation of a module to the given output.
///
/// # Examples
/// ```rust
/// use wasm_rewrite::{emit_binary, Module};
///
/// let mut buffer = Vec::new();
/// emit_binary(&Module::empty(), &mut buffer).unwrap();
///
/// assert_eq!(buffer, vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00]);
/// ```
pub fn emit_binary<O: Write>(module: &Module, output: &mut O) -> Result<usize, EmitError> {
    let (bytes, _) = sections::emit_module(module, output)?;

    Ok(bytes)
}

/// Emits a module to the given path and refreshes the module's section
/// ranges to describe the emitted file.
///
/// A pre-existing file at the output path is removed first, unless it is the
/// file the module was decoded from; the write itself truncates.
pub fn emit_file(module: &mut Module, path: impl AsRef<Path>) -> Result<usize, EmitError> {
    let path = path.as_ref();

    let mut buffer = Vec::new();
    let (bytes, ranges) = sections::emit_module(module, &mut buffer)?;

    if path.exists() && !is_module_source(module, path) {
        fs::remove_file(path)?;
    }

    let mut file = File::create(path)?;
    file.write_all(&buffer)?;
    drop(file);

    module.section_ranges = ranges;

    Ok(bytes)
}

/// True if the given path points at the file the module was decoded from.
fn is_module_source(module: &Module, path: &Path) -> bool {
    let source = match &module.path {
        Some(source) => source,
        None => return false,
    };

    match (fs::canonicalize(source), fs::canonicalize(path)) {
        (Ok(source), Ok(path)) => source == path,
        _ => false,
    }
}

/// Counts the number of bytes written, but does nothing else with them.
/// Used to measure section and code-entry sizes before the real write.
#[derive(Copy, Clone, Debug, Default, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) struct CountingWrite {
    bytes: usize,
}

impl CountingWrite {
    /// Creates a counting sink starting at zero.
    pub fn new() -> Self {
        CountingWrite { bytes: 0 }
    }

    /// The number of bytes written so far.
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Write for CountingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes += buf.len();

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.bytes += buf.len();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Code, Custom, CustomSection, Data, Element, Export, Expression, FuncType, Global,
        GlobalType, Import, Instruction, Limits, Locals, NameAssoc, TableType, ValType,
    };
    use crate::parser::parse_binary;

    fn round_trip(module: &Module) -> Module {
        let mut buffer = Vec::new();
        emit_binary(module, &mut buffer).unwrap();

        let mut parsed = parse_binary(&buffer).unwrap();
        // Ranges describe the emitted file, not the original; the comparison
        // below is about the structure.
        parsed.section_ranges = module.section_ranges.clone();
        parsed
    }

    #[test]
    fn empty_module_round_trips() {
        let module = Module::empty();

        assert_eq!(round_trip(&module), module);
    }

    #[test]
    fn full_module_round_trips() {
        let mut module = Module::empty();
        module.types.push(FuncType::new(vec![], vec![ValType::I32]));
        module.types.push(FuncType::runnable());
        module.imports.push(Import::function("env", "log", 1));
        module.functions.push(0);
        module.tables.push(TableType::new(Limits::bounded(2, 2)));
        module.memories.push(Limits::unbounded(1));
        module.globals.push(Global::new(
            GlobalType::mutable(ValType::I64),
            Expression::new(vec![Instruction::i64_const(0)]),
        ));
        module.exports.push(Export::function("f", 1));
        module.start = Some(1);
        module.elements.push(Element::new(
            0,
            Expression::new(vec![Instruction::i32_const(0)]),
            vec![1],
        ));
        module.code.push(Code::new(
            vec![Locals::new(1, ValType::I32)],
            Expression::new(vec![Instruction::i32_const(42)]),
        ));
        module.data.push(Data::active(
            0,
            Expression::new(vec![Instruction::i32_const(16)]),
            vec![1, 2, 3],
        ));
        module.data_count = Some(1);
        module.customs.push(CustomSection::Raw(Custom::new(
            "producers".to_string(),
            vec![0x01],
        )));

        assert_eq!(round_trip(&module), module);
    }

    #[test]
    fn name_section_round_trips() {
        let mut module = Module::empty();
        let names = module.name_section_mut_or_insert();
        names.functions.push(NameAssoc::new(0, "main"));
        names.globals.push(NameAssoc::new(1, "counter"));
        names.locals = Some(vec![0x00]);

        assert_eq!(round_trip(&module), module);
    }

    #[test]
    fn emit_file_writes_and_refreshes_ranges() {
        let directory = std::env::temp_dir().join("wasm-rewrite-emitter-test");
        std::fs::create_dir_all(&directory).unwrap();
        let path = directory.join("empty.wasm");

        let mut module = Module::empty();
        module.types.push(FuncType::runnable());

        let bytes = emit_file(&mut module, &path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap().len(), bytes);
        assert!(module
            .section_ranges
            .standard(crate::model::SectionId::Type)
            .is_some());

        std::fs::remove_file(&path).unwrap();
    }
}
