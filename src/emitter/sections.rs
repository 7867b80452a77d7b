//! Emitters for whole sections and modules.
//!
//! The module emitter performs a whole-file rewrite: header, every non-empty
//! standard section in canonical order (the data-count section immediately
//! before the code section), then the custom sections in their input order.
//! The byte range of every emitted section is recorded and returned so the
//! module's bookkeeping can be refreshed.
//!
//! See <https://webassembly.github.io/spec/core/binary/modules.html>

use crate::emitter::errors::EmitError;
use crate::emitter::module::{
    emit_code, emit_data, emit_element, emit_export, emit_global, emit_import,
};
use crate::emitter::types::{emit_function_type, emit_memory_type, emit_table_type};
use crate::emitter::values::{emit_byte, emit_bytes, emit_name, emit_u32, emit_usize, emit_vector};
use crate::emitter::CountingWrite;
use crate::model::names::subsection;
use crate::model::{
    CustomSection, Module, NameAssoc, NameSection, SectionId, SectionRange, SectionRanges, MAGIC,
    VERSION,
};
use log::debug;
use std::io::Write;

/// Emits a module in the binary format and returns the bytes written together
/// with the recomputed section ranges.
pub fn emit_module<O: Write>(
    module: &Module,
    output: &mut O,
) -> Result<(usize, SectionRanges), EmitError> {
    let mut ranges = SectionRanges::default();
    let mut offset = 0;

    output.write_all(&MAGIC)?;
    output.write_all(&VERSION)?;
    offset += MAGIC.len() + VERSION.len();

    offset += emit_standard_sections(module, output, &mut ranges, offset)?;

    for custom in &module.customs {
        let bytes = emit_custom_section(custom, output)?;
        ranges.record_custom(SectionRange::custom(offset..offset + bytes, custom.name()));
        offset += bytes;
    }

    Ok((offset, ranges))
}

/// Emits every non-empty standard section in canonical order.
fn emit_standard_sections<O: Write>(
    module: &Module,
    output: &mut O,
    ranges: &mut SectionRanges,
    start: usize,
) -> Result<usize, EmitError> {
    let mut offset = start;

    if !module.types.is_empty() {
        let bytes = emit_section(SectionId::Type, output, |output| {
            emit_vector(&module.types, output, emit_function_type)
        })?;
        record(ranges, SectionId::Type, offset, bytes);
        offset += bytes;
    }

    if !module.imports.is_empty() {
        let bytes = emit_section(SectionId::Import, output, |output| {
            emit_vector(&module.imports, output, emit_import)
        })?;
        record(ranges, SectionId::Import, offset, bytes);
        offset += bytes;
    }

    if !module.functions.is_empty() {
        let bytes = emit_section(SectionId::Function, output, |output| {
            emit_vector(&module.functions, output, |kind, output| {
                emit_u32(*kind, output)
            })
        })?;
        record(ranges, SectionId::Function, offset, bytes);
        offset += bytes;
    }

    if !module.tables.is_empty() {
        let bytes = emit_section(SectionId::Table, output, |output| {
            emit_vector(&module.tables, output, emit_table_type)
        })?;
        record(ranges, SectionId::Table, offset, bytes);
        offset += bytes;
    }

    if !module.memories.is_empty() {
        let bytes = emit_section(SectionId::Memory, output, |output| {
            emit_vector(&module.memories, output, emit_memory_type)
        })?;
        record(ranges, SectionId::Memory, offset, bytes);
        offset += bytes;
    }

    if !module.globals.is_empty() {
        let bytes = emit_section(SectionId::Global, output, |output| {
            emit_vector(&module.globals, output, emit_global)
        })?;
        record(ranges, SectionId::Global, offset, bytes);
        offset += bytes;
    }

    if !module.exports.is_empty() {
        let bytes = emit_section(SectionId::Export, output, |output| {
            emit_vector(&module.exports, output, emit_export)
        })?;
        record(ranges, SectionId::Export, offset, bytes);
        offset += bytes;
    }

    if let Some(start_function) = module.start {
        let bytes = emit_section(SectionId::Start, output, |output| {
            emit_u32(start_function, output)
        })?;
        record(ranges, SectionId::Start, offset, bytes);
        offset += bytes;
    }

    if !module.elements.is_empty() {
        let bytes = emit_section(SectionId::Element, output, |output| {
            emit_vector(&module.elements, output, emit_element)
        })?;
        record(ranges, SectionId::Element, offset, bytes);
        offset += bytes;
    }

    if let Some(count) = module.data_count {
        let bytes = emit_section(SectionId::DataCount, output, |output| {
            emit_u32(count, output)
        })?;
        record(ranges, SectionId::DataCount, offset, bytes);
        offset += bytes;
    }

    if !module.code.is_empty() {
        let bytes = emit_section(SectionId::Code, output, |output| {
            emit_vector(&module.code, output, emit_code)
        })?;
        record(ranges, SectionId::Code, offset, bytes);
        offset += bytes;
    }

    if !module.data.is_empty() {
        let bytes = emit_section(SectionId::Data, output, |output| {
            emit_vector(&module.data, output, emit_data)
        })?;
        record(ranges, SectionId::Data, offset, bytes);
        offset += bytes;
    }

    Ok(offset - start)
}

/// Records the range of an emitted standard section.
fn record(ranges: &mut SectionRanges, id: SectionId, offset: usize, bytes: usize) {
    debug!("emitted section {id:?}: {bytes} bytes at {offset}");
    ranges.record_standard(id, SectionRange::new(offset..offset + bytes));
}

/// Emits one section: id byte, LEB128 size, body. The body emitter runs
/// twice, first against a counting sink to measure the size.
fn emit_section<O, F>(id: SectionId, output: &mut O, emit_contents: F) -> Result<usize, EmitError>
where
    O: Write,
    F: Fn(&mut dyn Write) -> Result<usize, EmitError>,
{
    let mut counter = CountingWrite::new();
    emit_contents(&mut counter)?;

    let mut bytes = emit_byte(id as u8, output)?;
    bytes += emit_usize(counter.bytes(), output)?;
    bytes += emit_contents(output)?;

    Ok(bytes)
}

/// Emits one custom section, re-synthesizing the `name` section from its
/// structured payload.
fn emit_custom_section<O: Write>(
    custom: &CustomSection,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut contents = Vec::new();

    emit_name(custom.name(), &mut contents)?;
    match custom {
        CustomSection::Name(names) => {
            emit_name_section(names, &mut contents)?;
        }
        CustomSection::Raw(raw) => {
            contents.extend_from_slice(&raw.bytes);
        }
    }

    let mut bytes = emit_byte(SectionId::Custom as u8, output)?;
    bytes += emit_bytes(&contents, output, true)?;

    Ok(bytes)
}

/// Emits the subsections of the `name` section in subsection-id order.
/// Structured name maps are re-synthesized; opaque subsections are re-emitted
/// verbatim under their subid and size.
fn emit_name_section<O: Write + ?Sized>(
    names: &NameSection,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = 0;

    if let Some(module_name) = &names.module_name {
        bytes += emit_opaque_subsection(subsection::MODULE, module_name, output)?;
    }
    bytes += emit_name_map(subsection::FUNCTION, &names.functions, output)?;
    if let Some(locals) = &names.locals {
        bytes += emit_opaque_subsection(subsection::LOCAL, locals, output)?;
    }
    if let Some(labels) = &names.labels {
        bytes += emit_opaque_subsection(subsection::LABEL, labels, output)?;
    }
    if let Some(types) = &names.types {
        bytes += emit_opaque_subsection(subsection::TYPE, types, output)?;
    }
    bytes += emit_name_map(subsection::TABLE, &names.tables, output)?;
    if let Some(memories) = &names.memories {
        bytes += emit_opaque_subsection(subsection::MEMORY, memories, output)?;
    }
    bytes += emit_name_map(subsection::GLOBAL, &names.globals, output)?;
    if let Some(elements) = &names.elements {
        bytes += emit_opaque_subsection(subsection::ELEMENT, elements, output)?;
    }
    bytes += emit_name_map(subsection::DATA, &names.data, output)?;

    Ok(bytes)
}

/// Emits an opaque name subsection verbatim.
fn emit_opaque_subsection<O: Write + ?Sized>(
    id: u8,
    contents: &[u8],
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = emit_byte(id, output)?;
    bytes += emit_bytes(contents, output, true)?;

    Ok(bytes)
}

/// Emits one structured name map, skipping it entirely when empty.
fn emit_name_map<O: Write + ?Sized>(
    id: u8,
    map: &[NameAssoc],
    output: &mut O,
) -> Result<usize, EmitError> {
    if map.is_empty() {
        return Ok(0);
    }

    let mut contents = Vec::new();
    emit_vector(map, &mut contents, |assoc, output| {
        let mut bytes = emit_u32(assoc.index, output)?;
        bytes += emit_name(&assoc.name, output)?;
        Ok(bytes)
    })?;

    emit_opaque_subsection(id, &contents, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Custom;

    #[test]
    fn empty_module_is_header_only() {
        let mut buffer = Vec::new();
        let (bytes, _) = emit_module(&Module::empty(), &mut buffer).unwrap();

        assert_eq!(bytes, 8);
        assert_eq!(buffer, b"\x00\x61\x73\x6D\x01\x00\x00\x00");
    }

    #[test]
    fn custom_section_round_trips_bytes() {
        let mut module = Module::empty();
        module.customs.push(CustomSection::Raw(Custom::new(
            "version".to_string(),
            b"0.1.0".to_vec(),
        )));

        let mut buffer = Vec::new();
        emit_module(&module, &mut buffer).unwrap();

        let mut expected = b"\x00\x61\x73\x6D\x01\x00\x00\x00".to_vec();
        expected.push(0x00);
        expected.push(13);
        expected.push(7);
        expected.extend(b"version");
        expected.extend(b"0.1.0");

        assert_eq!(buffer, expected);
    }

    #[test]
    fn ranges_cover_emitted_sections() {
        let mut module = Module::empty();
        module.types.push(crate::model::FuncType::runnable());

        let mut buffer = Vec::new();
        let (bytes, ranges) = emit_module(&module, &mut buffer).unwrap();

        let range = ranges.standard(SectionId::Type).unwrap();
        assert_eq!(range.start, 8);
        assert_eq!(range.end, bytes);
        assert_eq!(buffer.len(), bytes);
    }

    #[test]
    fn name_section_is_synthesized() {
        let mut names = NameSection::default();
        names.functions.push(NameAssoc::new(0, "main"));

        let mut buffer = Vec::new();
        emit_name_section(&names, &mut buffer).unwrap();

        assert_eq!(buffer, vec![1, 7, 1, 0, 4, b'm', b'a', b'i', b'n']);
    }
}
