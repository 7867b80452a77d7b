//! Parser of the WebAssembly binary format.
//!
//! The decoder is a streaming pass over the input: header, then one section
//! at a time. Standard sections must appear in strictly ascending schema
//! order (the data-count section slots in before the code section); custom
//! sections may interleave anywhere. The byte range of every section is
//! recorded on the module for later localized work.
//!
//! See <https://webassembly.github.io/spec/core/binary/index.html>

mod errors;
mod instructions;
mod module;
mod sections;
mod types;
mod values;

pub use errors::ParseError;
pub use instructions::{parse_expression, parse_instruction};

use crate::model::{Module, SectionId, SectionRange, MAGIC, VERSION};
use crate::parser::sections::{
    parse_code_section, parse_custom_section, parse_data_count_section, parse_data_section,
    parse_element_section, parse_export_section, parse_function_section, parse_global_section,
    parse_import_section, parse_memory_section, parse_start_section, parse_table_section,
    parse_type_section,
};
use crate::parser::values::{parse_byte, parse_u32, take_bytes, Input, ParseResult};
use log::debug;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

/// Parses the given bytes into a WebAssembly module.
///
/// Requires the function and code sections to have matching lengths and
/// rejects trailing bytes after the last section.
///
/// # Examples
/// ```rust
/// use wasm_rewrite::parse_binary;
///
/// let module = parse_binary(b"\x00\x61\x73\x6D\x01\x00\x00\x00").unwrap();
///
/// assert!(module.types.is_empty());
/// assert!(module.code.is_empty());
/// assert!(module.start.is_none());
/// ```
pub fn parse_binary(input: &[u8]) -> Result<Module, ParseError> {
    let total = input.len();
    let input = expect_header(input, &MAGIC, ParseError::BadMagic)?;
    let mut input = expect_header(input, &VERSION, ParseError::BadVersion)?;

    let mut module = Module::empty();
    let mut last_order: Option<u8> = None;
    let mut data_seen = false;

    while !input.is_empty() {
        let start = total - input.len();
        let (rest, id) = parse_byte(input).map_err(ParseError::from)?;
        let section = SectionId::from_id(id).ok_or(ParseError::MalformedSectionId(id))?;
        let (rest, size) = parse_u32(rest).map_err(ParseError::from)?;
        let (rest, body) = take_bytes(rest, size as usize).map_err(ParseError::from)?;
        let end = total - rest.len();
        input = rest;

        debug!("section id {id}, {size} bytes at {start}..{end}");

        if section == SectionId::Custom {
            let custom = parse_custom_section(body)?;
            module
                .section_ranges
                .record_custom(SectionRange::custom(start..end, custom.name()));
            module.customs.push(custom);
            continue;
        }

        let order = section.schema_order();
        if let Some(previous) = last_order {
            if order <= previous {
                return Err(if data_seen {
                    ParseError::JunkAfterLastSection
                } else {
                    ParseError::SectionOutOfOrder {
                        id,
                        previous: previous_id(previous),
                    }
                });
            }
        }
        last_order = Some(order);
        data_seen |= section == SectionId::Data;

        parse_standard_section(&mut module, section, body)?;
        module
            .section_ranges
            .record_standard(section, SectionRange::new(start..end));
    }

    if module.functions.len() != module.code.len() {
        return Err(ParseError::InconsistentFuncCode {
            functions: module.functions.len(),
            bodies: module.code.len(),
        });
    }

    Ok(module)
}

/// Parses the WebAssembly module stored at the given path.
///
/// The file is opened read-write in binary mode, as rewritten modules are
/// commonly emitted over their source; the handle is released when the read
/// completes or fails.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Module, ParseError> {
    let path = path.as_ref();
    let mut contents = Vec::new();

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.read_to_end(&mut contents)?;
    drop(file);

    let mut module = parse_binary(&contents)?;
    module.path = Some(path.to_path_buf());

    Ok(module)
}

/// Dispatches a standard section body to its parser and stores the result.
/// The body must be consumed exactly.
fn parse_standard_section(
    module: &mut Module,
    section: SectionId,
    body: &[u8],
) -> Result<(), ParseError> {
    match section {
        SectionId::Type => module.types = section_body(section, body, parse_type_section)?,
        SectionId::Import => module.imports = section_body(section, body, parse_import_section)?,
        SectionId::Function => {
            module.functions = section_body(section, body, parse_function_section)?
        }
        SectionId::Table => module.tables = section_body(section, body, parse_table_section)?,
        SectionId::Memory => module.memories = section_body(section, body, parse_memory_section)?,
        SectionId::Global => module.globals = section_body(section, body, parse_global_section)?,
        SectionId::Export => module.exports = section_body(section, body, parse_export_section)?,
        SectionId::Start => {
            module.start = Some(section_body(section, body, parse_start_section)?)
        }
        SectionId::Element => {
            module.elements = section_body(section, body, parse_element_section)?
        }
        SectionId::Code => module.code = section_body(section, body, parse_code_section)?,
        SectionId::Data => module.data = section_body(section, body, parse_data_section)?,
        SectionId::DataCount => {
            module.data_count = Some(section_body(section, body, parse_data_count_section)?)
        }
        SectionId::Custom => unreachable!("custom sections are handled by the caller"),
    }

    Ok(())
}

/// Runs a section-body parser and verifies it consumed the declared size.
fn section_body<'a, T>(
    section: SectionId,
    body: Input<'a>,
    parser: impl Fn(Input<'a>) -> ParseResult<'a, T>,
) -> Result<T, ParseError> {
    let (rest, value) = parser(body).map_err(ParseError::from)?;

    if rest.is_empty() {
        Ok(value)
    } else {
        Err(ParseError::SectionSizeMismatch {
            id: section as u8,
            declared: body.len(),
            consumed: body.len() - rest.len(),
        })
    }
}

/// Matches a fixed header constant, mapping a mismatch to the given error.
fn expect_header<'a>(
    input: &'a [u8],
    expected: &[u8; 4],
    error: ParseError,
) -> Result<&'a [u8], ParseError> {
    if input.len() < expected.len() {
        return Err(ParseError::UnexpectedEnd);
    }

    let (actual, rest) = input.split_at(expected.len());
    if actual == expected {
        Ok(rest)
    } else {
        Err(error)
    }
}

/// Recovers the wire id that produced the given schema order, for error
/// reporting.
fn previous_id(order: u8) -> u8 {
    match order {
        10 => SectionId::DataCount as u8,
        11 => SectionId::Code as u8,
        12 => SectionId::Data as u8,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomSection, ExportKind, FuncType, ValType};

    fn header() -> Vec<u8> {
        b"\x00\x61\x73\x6D\x01\x00\x00\x00".to_vec()
    }

    #[test]
    fn empty_module() {
        let module = parse_binary(&header()).unwrap();

        assert_eq!(module, Module::empty());
    }

    #[test]
    fn bad_magic() {
        let result = parse_binary(b"\x00asm\x01\x00\x00\x00".map(|b| b ^ 0xFF).as_slice());

        assert!(matches!(result, Err(ParseError::BadMagic)));
    }

    #[test]
    fn bad_version() {
        let result = parse_binary(b"\x00\x61\x73\x6D\x02\x00\x00\x00");

        assert!(matches!(result, Err(ParseError::BadVersion)));
    }

    #[test]
    fn truncated_header() {
        let result = parse_binary(b"\x00\x61\x73");

        assert!(matches!(result, Err(ParseError::UnexpectedEnd)));
    }

    #[test]
    fn module_with_type_and_function() {
        let mut bytes = header();
        // Type section: one signature () -> i32.
        bytes.extend([0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F]);
        // Function section: one function of type 0.
        bytes.extend([0x03, 0x02, 0x01, 0x00]);
        // Export section: "f" -> function 0.
        bytes.extend([0x07, 0x05, 0x01, 0x01, 0x66, 0x00, 0x00]);
        // Code section: body `i32.const 7`.
        bytes.extend([0x0A, 0x06, 0x01, 0x04, 0x00, 0x41, 0x07, 0x0B]);

        let module = parse_binary(&bytes).unwrap();

        assert_eq!(module.types, vec![FuncType::new(vec![], vec![ValType::I32])]);
        assert_eq!(module.functions, vec![0]);
        assert_eq!(module.exports[0].desc, ExportKind::Function(0));
        assert_eq!(module.code.len(), 1);
    }

    #[test]
    fn records_section_ranges() {
        let mut bytes = header();
        bytes.extend([0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);

        let module = parse_binary(&bytes).unwrap();
        let range = module.section_ranges.standard(SectionId::Type).unwrap();

        assert_eq!(range.start, 8);
        assert_eq!(range.end, 14);
    }

    #[test]
    fn custom_sections_interleave() {
        let mut bytes = header();
        // Custom "a" before the type section.
        bytes.extend([0x00, 0x03, 0x01, 0x61, 0xFF]);
        // Type section.
        bytes.extend([0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);
        // Custom "b" after it.
        bytes.extend([0x00, 0x03, 0x01, 0x62, 0xEE]);

        let module = parse_binary(&bytes).unwrap();

        assert_eq!(module.customs.len(), 2);
        assert_eq!(module.customs[0].name(), "a");
        assert_eq!(module.customs[1].name(), "b");
        assert_eq!(module.section_ranges.customs().len(), 2);
    }

    #[test]
    fn rejects_out_of_order_sections() {
        let mut bytes = header();
        // Function section before the type section.
        bytes.extend([0x03, 0x02, 0x01, 0x00]);
        bytes.extend([0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);

        let result = parse_binary(&bytes);

        assert!(matches!(
            result,
            Err(ParseError::SectionOutOfOrder { id: 1, .. })
        ));
    }

    #[test]
    fn accepts_data_count_before_code() {
        let mut bytes = header();
        bytes.extend([0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F]);
        bytes.extend([0x03, 0x02, 0x01, 0x00]);
        // Data count: 0 segments.
        bytes.extend([0x0C, 0x01, 0x00]);
        bytes.extend([0x0A, 0x06, 0x01, 0x04, 0x00, 0x41, 0x07, 0x0B]);

        let module = parse_binary(&bytes).unwrap();

        assert_eq!(module.data_count, Some(0));
        assert_eq!(module.code.len(), 1);
    }

    #[test]
    fn rejects_standard_section_after_data() {
        let mut bytes = header();
        // Data section: empty.
        bytes.extend([0x0B, 0x01, 0x00]);
        // A type section cannot follow.
        bytes.extend([0x01, 0x04, 0x01, 0x60, 0x00, 0x00]);

        let result = parse_binary(&bytes);

        assert!(matches!(result, Err(ParseError::JunkAfterLastSection)));
    }

    #[test]
    fn rejects_malformed_section_id() {
        let mut bytes = header();
        bytes.extend([0x0D, 0x00]);

        let result = parse_binary(&bytes);

        assert!(matches!(result, Err(ParseError::MalformedSectionId(13))));
    }

    #[test]
    fn rejects_section_size_mismatch() {
        let mut bytes = header();
        // Type section declares 5 bytes but its vector only needs 4.
        bytes.extend([0x01, 0x05, 0x01, 0x60, 0x00, 0x00, 0x00]);

        let result = parse_binary(&bytes);

        assert!(matches!(
            result,
            Err(ParseError::SectionSizeMismatch { id: 1, .. })
        ));
    }

    #[test]
    fn rejects_inconsistent_function_counts() {
        let mut bytes = header();
        bytes.extend([0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F]);
        bytes.extend([0x03, 0x02, 0x01, 0x00]);

        let result = parse_binary(&bytes);

        assert!(matches!(
            result,
            Err(ParseError::InconsistentFuncCode {
                functions: 1,
                bodies: 0
            })
        ));
    }

    #[test]
    fn parses_name_custom_section() {
        let mut bytes = header();
        let mut payload = Vec::new();
        payload.push(4);
        payload.extend(b"name");
        payload.extend([1, 7, 1, 0, 4]);
        payload.extend(b"main");
        bytes.push(0);
        bytes.push(payload.len() as u8);
        bytes.extend(&payload);

        let module = parse_binary(&bytes).unwrap();

        match &module.customs[0] {
            CustomSection::Name(names) => assert_eq!(names.function_name(0), Some("main")),
            other => panic!("expected a name section, got {other:?}"),
        }
    }
}
