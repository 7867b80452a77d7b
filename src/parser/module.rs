//! Parsers for the module components carried inside sections.
//!
//! See <https://webassembly.github.io/spec/core/binary/modules.html>

use crate::model::{
    Code, Data, Element, Export, ExportKind, FunctionIndex, Global, Import, ImportKind, Locals,
    SectionId,
};
use crate::parser::errors::{fail, ParseError};
use crate::parser::instructions::parse_expression;
use crate::parser::types::{
    parse_global_type, parse_memory_type, parse_table_type, parse_value_type,
};
use crate::parser::values::{
    parse_byte, parse_byte_vector, parse_name, parse_u32, parse_vector, take_bytes, Input,
    ParseResult,
};

/// Parses an import: two names and a descriptor.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#import-section>
pub fn parse_import(input: Input<'_>) -> ParseResult<'_, Import> {
    let (input, module) = parse_name(input)?;
    let (input, name) = parse_name(input)?;
    let (input, desc) = parse_import_kind(input)?;

    Ok((input, Import::new(module, name, desc)))
}

/// Parses an import descriptor.
fn parse_import_kind(input: Input<'_>) -> ParseResult<'_, ImportKind> {
    let (input, tag) = parse_byte(input)?;

    match tag {
        0x00 => {
            let (input, kind) = parse_u32(input)?;
            Ok((input, ImportKind::Function(kind)))
        }
        0x01 => {
            let (input, kind) = parse_table_type(input)?;
            Ok((input, ImportKind::Table(kind)))
        }
        0x02 => {
            let (input, kind) = parse_memory_type(input)?;
            Ok((input, ImportKind::Memory(kind)))
        }
        0x03 => {
            let (input, kind) = parse_global_type(input)?;
            Ok((input, ImportKind::Global(kind)))
        }
        other => Err(fail(ParseError::BadImportTag(other))),
    }
}

/// Parses an export: a name and a descriptor.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#export-section>
pub fn parse_export(input: Input<'_>) -> ParseResult<'_, Export> {
    let (input, name) = parse_name(input)?;
    let (input, tag) = parse_byte(input)?;
    let (input, index) = parse_u32(input)?;

    let desc = match tag {
        0x00 => ExportKind::Function(index),
        0x01 => ExportKind::Table(index),
        0x02 => ExportKind::Memory(index),
        0x03 => ExportKind::Global(index),
        other => return Err(fail(ParseError::BadExportTag(other))),
    };

    Ok((input, Export::new(name, desc)))
}

/// Parses a global: its type and the constant initializer expression.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#global-section>
pub fn parse_global(input: Input<'_>) -> ParseResult<'_, Global> {
    let (input, kind) = parse_global_type(input)?;
    let (input, init) = parse_expression(input)?;

    Ok((input, Global::new(kind, init)))
}

/// Parses the start component: a function index.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#start-section>
pub fn parse_start(input: Input<'_>) -> ParseResult<'_, FunctionIndex> {
    parse_u32(input)
}

/// Parses an element segment. Flags 0 and 2 (active `funcref` segments with
/// a function-index list) are covered; flag 2 carries an explicit table
/// index and an element-kind byte.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#element-section>
pub fn parse_element(input: Input<'_>) -> ParseResult<'_, Element> {
    let (input, flag) = parse_u32(input)?;

    match flag {
        0 => {
            let (input, offset) = parse_expression(input)?;
            let (input, functions) = parse_vector(parse_u32)(input)?;
            Ok((input, Element::new(0, offset, functions)))
        }
        2 => {
            let (input, table) = parse_u32(input)?;
            let (input, offset) = parse_expression(input)?;
            let (input, kind) = parse_byte(input)?;

            if kind != 0x00 {
                return Err(fail(ParseError::BadElemKind(kind as u32)));
            }

            let (input, functions) = parse_vector(parse_u32)(input)?;
            Ok((input, Element::new(table, offset, functions)))
        }
        other => Err(fail(ParseError::BadElemKind(other))),
    }
}

/// Parses a data segment of kind 0 (active), 1 (passive), or 2 (active with
/// an explicit memory index).
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#data-section>
pub fn parse_data(input: Input<'_>) -> ParseResult<'_, Data> {
    let (input, kind) = parse_u32(input)?;

    match kind {
        0 => {
            let (input, offset) = parse_expression(input)?;
            let (input, bytes) = parse_byte_vector(input)?;
            Ok((input, Data::active(0, offset, bytes.to_vec())))
        }
        1 => {
            let (input, bytes) = parse_byte_vector(input)?;
            Ok((input, Data::passive(bytes.to_vec())))
        }
        2 => {
            let (input, memory) = parse_u32(input)?;
            let (input, offset) = parse_expression(input)?;
            let (input, bytes) = parse_byte_vector(input)?;
            Ok((input, Data::active(memory, offset, bytes.to_vec())))
        }
        other => Err(fail(ParseError::BadDataKind(other))),
    }
}

/// Parses one code entry: a size-framed pair of locals and body.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#code-section>
pub fn parse_code(input: Input<'_>) -> ParseResult<'_, Code> {
    let (input, size) = parse_u32(input)?;
    let (remaining, body) = take_bytes(input, size as usize)?;

    let (rest, locals) = parse_vector(parse_locals)(body)?;
    let (rest, expression) = parse_expression(rest)?;

    if !rest.is_empty() {
        return Err(fail(ParseError::SectionSizeMismatch {
            id: SectionId::Code as u8,
            declared: size as usize,
            consumed: size as usize - rest.len(),
        }));
    }

    let code = Code::new(locals, expression);

    if code.local_count() > u32::MAX as u64 {
        return Err(fail(ParseError::TooManyLocals(code.local_count())));
    }

    Ok((remaining, code))
}

/// Parses one run-length group of locals.
fn parse_locals(input: Input<'_>) -> ParseResult<'_, Locals> {
    let (input, count) = parse_u32(input)?;
    let (input, kind) = parse_value_type(input)?;

    Ok((input, Locals::new(count, kind)))
}
