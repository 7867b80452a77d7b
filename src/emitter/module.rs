//! Emitters for the module components carried inside sections.
//!
//! See <https://webassembly.github.io/spec/core/binary/modules.html>

use crate::emitter::errors::EmitError;
use crate::emitter::instruction::emit_expression;
use crate::emitter::types::{
    emit_global_type, emit_memory_type, emit_table_type, emit_value_type,
};
use crate::emitter::values::{emit_byte, emit_bytes, emit_name, emit_u32, emit_usize, emit_vector};
use crate::emitter::CountingWrite;
use crate::model::{
    Code, Data, DataMode, Element, Export, ExportKind, Global, Import, ImportKind, Locals,
};
use std::io::Write;

/// Emits an import: two names and a descriptor.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#import-section>
pub fn emit_import<O: Write + ?Sized>(import: &Import, output: &mut O) -> Result<usize, EmitError> {
    let mut bytes = 0;

    bytes += emit_name(&import.module, output)?;
    bytes += emit_name(&import.name, output)?;

    match &import.desc {
        ImportKind::Function(kind) => {
            bytes += emit_byte(0x00, output)?;
            bytes += emit_u32(*kind, output)?;
        }
        ImportKind::Table(kind) => {
            bytes += emit_byte(0x01, output)?;
            bytes += emit_table_type(kind, output)?;
        }
        ImportKind::Memory(kind) => {
            bytes += emit_byte(0x02, output)?;
            bytes += emit_memory_type(kind, output)?;
        }
        ImportKind::Global(kind) => {
            bytes += emit_byte(0x03, output)?;
            bytes += emit_global_type(kind, output)?;
        }
    }

    Ok(bytes)
}

/// Emits an export: a name, a tag, and the exported index.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#export-section>
pub fn emit_export<O: Write + ?Sized>(export: &Export, output: &mut O) -> Result<usize, EmitError> {
    let (tag, index) = match export.desc {
        ExportKind::Function(index) => (0x00, index),
        ExportKind::Table(index) => (0x01, index),
        ExportKind::Memory(index) => (0x02, index),
        ExportKind::Global(index) => (0x03, index),
    };

    let mut bytes = 0;

    bytes += emit_name(&export.name, output)?;
    bytes += emit_byte(tag, output)?;
    bytes += emit_u32(index, output)?;

    Ok(bytes)
}

/// Emits a global: its type and initializer expression.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#global-section>
pub fn emit_global<O: Write + ?Sized>(global: &Global, output: &mut O) -> Result<usize, EmitError> {
    let mut bytes = 0;

    bytes += emit_global_type(&global.kind, output)?;
    bytes += emit_expression(&global.init, output)?;

    Ok(bytes)
}

/// Emits an element segment: flag 0 for table 0, flag 2 (with an explicit
/// table index and element kind) otherwise.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#element-section>
pub fn emit_element<O: Write + ?Sized>(
    element: &Element,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = 0;

    if element.table == 0 {
        bytes += emit_byte(0x00, output)?;
    } else {
        bytes += emit_byte(0x02, output)?;
        bytes += emit_u32(element.table, output)?;
    }

    bytes += emit_expression(&element.offset, output)?;

    if element.table != 0 {
        // Element kind: funcref.
        bytes += emit_byte(0x00, output)?;
    }

    bytes += emit_vector(&element.functions, output, |function, output| {
        emit_u32(*function, output)
    })?;

    Ok(bytes)
}

/// Emits a data segment of kind 0, 1, or 2.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#data-section>
pub fn emit_data<O: Write + ?Sized>(data: &Data, output: &mut O) -> Result<usize, EmitError> {
    let mut bytes = 0;

    match &data.mode {
        DataMode::Active(0, offset) => {
            bytes += emit_byte(0x00, output)?;
            bytes += emit_expression(offset, output)?;
        }
        DataMode::Passive => {
            bytes += emit_byte(0x01, output)?;
        }
        DataMode::Active(memory, offset) => {
            bytes += emit_byte(0x02, output)?;
            bytes += emit_u32(*memory, output)?;
            bytes += emit_expression(offset, output)?;
        }
    }

    bytes += emit_bytes(&data.init, output, true)?;

    Ok(bytes)
}

/// Emits one code entry: the size frame, the locals, and the body.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#code-section>
pub fn emit_code<O: Write + ?Sized>(code: &Code, output: &mut O) -> Result<usize, EmitError> {
    let mut counter = CountingWrite::new();
    emit_code_contents(code, &mut counter)?;

    let mut bytes = emit_usize(counter.bytes(), output)?;
    bytes += emit_code_contents(code, output)?;

    Ok(bytes)
}

/// Emits the locals and body of a code entry.
fn emit_code_contents<O: Write + ?Sized>(code: &Code, output: &mut O) -> Result<usize, EmitError> {
    let mut bytes = emit_vector(&code.locals, output, emit_locals)?;
    bytes += emit_expression(&code.body, output)?;

    Ok(bytes)
}

/// Emits one run-length group of locals.
fn emit_locals<O: Write + ?Sized>(locals: &Locals, output: &mut O) -> Result<usize, EmitError> {
    let mut bytes = emit_u32(locals.count, output)?;
    bytes += emit_value_type(&locals.kind, output)?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expression, Instruction, ValType};

    #[test]
    fn emit_function_import() {
        let import = Import::function("env", "log", 2);
        let mut buffer = Vec::new();

        emit_import(&import, &mut buffer).unwrap();

        assert_eq!(buffer, b"\x03env\x03log\x00\x02");
    }

    #[test]
    fn emit_function_export() {
        let export = Export::function("main", 1);
        let mut buffer = Vec::new();

        emit_export(&export, &mut buffer).unwrap();

        assert_eq!(buffer, b"\x04main\x00\x01");
    }

    #[test]
    fn emit_element_for_table_zero() {
        let element = Element::new(
            0,
            Expression::new(vec![Instruction::i32_const(1)]),
            vec![2, 3],
        );
        let mut buffer = Vec::new();

        emit_element(&element, &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x00, 0x41, 0x01, 0x0B, 0x02, 0x02, 0x03]);
    }

    #[test]
    fn emit_element_with_table_index() {
        let element = Element::new(
            1,
            Expression::new(vec![Instruction::i32_const(0)]),
            vec![4],
        );
        let mut buffer = Vec::new();

        emit_element(&element, &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x02, 0x01, 0x41, 0x00, 0x0B, 0x00, 0x01, 0x04]);
    }

    #[test]
    fn emit_code_frames_its_size() {
        let code = Code::new(vec![Locals::new(2, ValType::I64)], Expression::empty());
        let mut buffer = Vec::new();

        emit_code(&code, &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x04, 0x01, 0x02, 0x7E, 0x0B]);
    }
}
