//! Parsers for section bodies, including the structured `name` custom
//! section.
//!
//! Each parser here consumes the body of one section; the driver in the
//! parent module frames the bodies and verifies that exactly the declared
//! number of bytes was consumed.
//!
//! See <https://webassembly.github.io/spec/core/binary/modules.html#sections>

use crate::model::names::subsection;
use crate::model::{
    Code, Custom, CustomSection, Data, Element, Export, FuncType, FunctionIndex, Global, Import,
    Limits, NameAssoc, NameSection, TableType, TypeIndex,
};
use crate::parser::errors::ParseError;
use crate::parser::module::{
    parse_code, parse_data, parse_element, parse_export, parse_global, parse_import, parse_start,
};
use crate::parser::types::{parse_function_type, parse_memory_type, parse_table_type};
use crate::parser::values::{
    parse_byte, parse_name, parse_u32, parse_vector, take_bytes, Input, ParseResult,
};

/// Parses the body of the type section.
pub fn parse_type_section(input: Input<'_>) -> ParseResult<'_, Vec<FuncType>> {
    parse_vector(parse_function_type)(input)
}

/// Parses the body of the import section.
pub fn parse_import_section(input: Input<'_>) -> ParseResult<'_, Vec<Import>> {
    parse_vector(parse_import)(input)
}

/// Parses the body of the function section: type indices.
pub fn parse_function_section(input: Input<'_>) -> ParseResult<'_, Vec<TypeIndex>> {
    parse_vector(parse_u32)(input)
}

/// Parses the body of the table section.
pub fn parse_table_section(input: Input<'_>) -> ParseResult<'_, Vec<TableType>> {
    parse_vector(parse_table_type)(input)
}

/// Parses the body of the memory section.
pub fn parse_memory_section(input: Input<'_>) -> ParseResult<'_, Vec<Limits>> {
    parse_vector(parse_memory_type)(input)
}

/// Parses the body of the global section.
pub fn parse_global_section(input: Input<'_>) -> ParseResult<'_, Vec<Global>> {
    parse_vector(parse_global)(input)
}

/// Parses the body of the export section.
pub fn parse_export_section(input: Input<'_>) -> ParseResult<'_, Vec<Export>> {
    parse_vector(parse_export)(input)
}

/// Parses the body of the start section.
pub fn parse_start_section(input: Input<'_>) -> ParseResult<'_, FunctionIndex> {
    parse_start(input)
}

/// Parses the body of the element section.
pub fn parse_element_section(input: Input<'_>) -> ParseResult<'_, Vec<Element>> {
    parse_vector(parse_element)(input)
}

/// Parses the body of the code section.
pub fn parse_code_section(input: Input<'_>) -> ParseResult<'_, Vec<Code>> {
    parse_vector(parse_code)(input)
}

/// Parses the body of the data section.
pub fn parse_data_section(input: Input<'_>) -> ParseResult<'_, Vec<Data>> {
    parse_vector(parse_data)(input)
}

/// Parses the body of the data-count section.
pub fn parse_data_count_section(input: Input<'_>) -> ParseResult<'_, u32> {
    parse_u32(input)
}

/// Parses the body of a custom section. The section named exactly `"name"`
/// decodes into the structured name-section payload; every other custom
/// section is retained as raw bytes.
///
/// See <https://webassembly.github.io/spec/core/binary/modules.html#binary-customsec>
pub fn parse_custom_section(input: Input<'_>) -> Result<CustomSection, ParseError> {
    let (contents, name) = parse_name(input)?;

    if name == "name" {
        Ok(CustomSection::Name(parse_name_section(contents)?))
    } else {
        Ok(CustomSection::Raw(Custom::new(name, contents.to_vec())))
    }
}

/// Parses the subsections of the `name` custom section. The function, table,
/// global, and data name maps decode into structured form; the other
/// subsections are kept opaque.
///
/// See <https://webassembly.github.io/spec/core/appendix/custom.html#name-section>
fn parse_name_section(mut input: Input<'_>) -> Result<NameSection, ParseError> {
    let mut names = NameSection::default();

    while !input.is_empty() {
        let (rest, id) = parse_byte(input)?;
        let (rest, size) = parse_u32(rest)?;
        let (rest, body) = take_bytes(rest, size as usize)?;
        input = rest;

        match id {
            subsection::MODULE => names.module_name = Some(body.to_vec()),
            subsection::FUNCTION => names.functions = parse_name_map(body, id)?,
            subsection::LOCAL => names.locals = Some(body.to_vec()),
            subsection::LABEL => names.labels = Some(body.to_vec()),
            subsection::TYPE => names.types = Some(body.to_vec()),
            subsection::TABLE => names.tables = parse_name_map(body, id)?,
            subsection::MEMORY => names.memories = Some(body.to_vec()),
            subsection::GLOBAL => names.globals = parse_name_map(body, id)?,
            subsection::ELEMENT => names.elements = Some(body.to_vec()),
            subsection::DATA => names.data = parse_name_map(body, id)?,
            other => return Err(ParseError::MalformedNameSubsection(other)),
        }
    }

    Ok(names)
}

/// Parses one name map: a vector of `(index, name)` associations.
fn parse_name_map(input: Input<'_>, id: u8) -> Result<Vec<NameAssoc>, ParseError> {
    let (rest, entries) = parse_vector(parse_name_assoc)(input)?;

    if rest.is_empty() {
        Ok(entries)
    } else {
        Err(ParseError::MalformedNameSubsection(id))
    }
}

/// Parses one `(index, name)` association.
fn parse_name_assoc(input: Input<'_>) -> ParseResult<'_, NameAssoc> {
    let (input, index) = parse_u32(input)?;
    let (input, name) = parse_name(input)?;

    Ok((input, NameAssoc::new(index, name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_section_with_raw_contents() {
        let mut input = Vec::new();
        input.push(7);
        input.extend(b"version");
        input.extend(b"0.1.0");

        let custom = parse_custom_section(input.as_slice()).unwrap();

        assert_eq!(
            custom,
            CustomSection::Raw(Custom::new("version".to_string(), b"0.1.0".to_vec()))
        );
    }

    #[test]
    fn name_section_with_function_map() {
        let mut input = Vec::new();
        input.push(4);
        input.extend(b"name");
        // Subsection 1, one entry: index 0 -> "main".
        input.push(subsection::FUNCTION);
        input.push(7);
        input.push(1);
        input.push(0);
        input.push(4);
        input.extend(b"main");

        let custom = parse_custom_section(input.as_slice()).unwrap();

        match custom {
            CustomSection::Name(names) => {
                assert_eq!(names.functions, vec![NameAssoc::new(0, "main")]);
            }
            other => panic!("expected a name section, got {other:?}"),
        }
    }

    #[test]
    fn name_section_keeps_opaque_subsections() {
        let mut input = Vec::new();
        input.push(4);
        input.extend(b"name");
        input.push(subsection::LOCAL);
        input.push(3);
        input.extend([1, 2, 3]);

        let custom = parse_custom_section(input.as_slice()).unwrap();

        match custom {
            CustomSection::Name(names) => assert_eq!(names.locals, Some(vec![1, 2, 3])),
            other => panic!("expected a name section, got {other:?}"),
        }
    }

    #[test]
    fn name_section_rejects_unknown_subsection() {
        let mut input = Vec::new();
        input.push(4);
        input.extend(b"name");
        input.push(10);
        input.push(0);

        let result = parse_custom_section(input.as_slice());

        assert!(matches!(result, Err(ParseError::MalformedNameSubsection(10))));
    }
}
