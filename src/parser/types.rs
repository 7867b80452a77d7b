//! Parsers for WebAssembly types encoded in the binary format.
//!
//! See <https://webassembly.github.io/spec/core/binary/types.html>

use crate::model::{BlockType, FuncType, GlobalType, Limits, Mutability, TableType, ValType};
use crate::parser::errors::{fail, ParseError};
use crate::parser::values::{parse_byte, parse_s33, parse_u32, parse_vector, Input, ParseResult};

/// Tag byte introducing a function type.
const FUNC_TYPE_TAG: u8 = 0x60;

/// The element type of a `funcref` table.
const FUNC_REF: u8 = 0x70;

/// Parses a WebAssembly value type.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#value-types>
pub fn parse_value_type(input: Input<'_>) -> ParseResult<'_, ValType> {
    let (input, tag) = parse_byte(input)?;

    match ValType::from_tag(tag) {
        Some(kind) => Ok((input, kind)),
        None => Err(fail(ParseError::MalformedValType(tag))),
    }
}

/// Parses a result type: a vector of value types.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#result-types>
pub fn parse_result_type(input: Input<'_>) -> ParseResult<'_, Vec<ValType>> {
    parse_vector(parse_value_type)(input)
}

/// Parses a function type, introduced by the `0x60` tag.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#function-types>
pub fn parse_function_type(input: Input<'_>) -> ParseResult<'_, FuncType> {
    let (input, tag) = parse_byte(input)?;

    if tag != FUNC_TYPE_TAG {
        return Err(fail(ParseError::BadFuncTypeTag(tag)));
    }

    let (input, params) = parse_result_type(input)?;
    let (input, results) = parse_result_type(input)?;

    Ok((input, FuncType::new(params, results)))
}

/// Parses limits. Tags 0 and 2 carry no maximum, tags 1 and 3 do;
/// tags 2 and 3 mark a shared memory.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#limits>
pub fn parse_limits(input: Input<'_>) -> ParseResult<'_, Limits> {
    let (input, tag) = parse_byte(input)?;

    if tag > 3 {
        return Err(fail(ParseError::BadLimitsTag(tag)));
    }

    let (input, min) = parse_u32(input)?;
    let (input, max) = if tag & 1 != 0 {
        let (input, max) = parse_u32(input)?;
        (input, Some(max))
    } else {
        (input, None)
    };

    let mut limits = Limits::new(min, max);
    limits.shared = tag & 2 != 0;

    Ok((input, limits))
}

/// Parses a table type: the `funcref` element type followed by limits.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#table-types>
pub fn parse_table_type(input: Input<'_>) -> ParseResult<'_, TableType> {
    let (input, element) = parse_byte(input)?;

    if element != FUNC_REF {
        return Err(fail(ParseError::BadElemType(element)));
    }

    let (input, limits) = parse_limits(input)?;

    Ok((input, TableType::new(limits)))
}

/// Parses a memory type: plain limits in units of pages.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#memory-types>
pub fn parse_memory_type(input: Input<'_>) -> ParseResult<'_, Limits> {
    parse_limits(input)
}

/// Parses a global type: a value type and a mutability flag.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#global-types>
pub fn parse_global_type(input: Input<'_>) -> ParseResult<'_, GlobalType> {
    let (input, kind) = parse_value_type(input)?;
    let (input, flag) = parse_byte(input)?;

    let mutability = match flag {
        0x00 => Mutability::Immutable,
        0x01 => Mutability::Mutable,
        other => return Err(fail(ParseError::MalformedMutability(other))),
    };

    Ok((input, GlobalType::new(kind, mutability)))
}

/// Parses a block type from its signed 33-bit tag.
///
/// See <https://webassembly.github.io/spec/core/binary/instructions.html#binary-blocktype>
pub fn parse_block_type(input: Input<'_>) -> ParseResult<'_, BlockType> {
    let (input, tag) = parse_s33(input)?;

    match BlockType::from_tag(tag) {
        Some(kind) => Ok((input, kind)),
        None => Err(fail(ParseError::MalformedBlockType(tag))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_result_type_with_all_types() {
        let mut input = vec![0x7F, 0x7E, 0x7D, 0x7C, 0x7B, 0x70, 0x6F];
        input.insert(0, input.len() as u8);

        let (remaining, types) = parse_result_type(input.as_slice()).unwrap();

        assert_eq!(
            types,
            vec![
                ValType::I32,
                ValType::I64,
                ValType::F32,
                ValType::F64,
                ValType::V128,
                ValType::FuncRef,
                ValType::ExternRef,
            ]
        );
        assert!(remaining.is_empty());
    }

    #[test]
    fn parse_simple_function_type() {
        let input = vec![0x60, 1, 0x7F, 1, 0x7D, 0xAA];
        let (remaining, signature) = parse_function_type(input.as_slice()).unwrap();

        assert_eq!(
            signature,
            FuncType::new(vec![ValType::I32], vec![ValType::F32])
        );
        assert_eq!(remaining, &[0xAA]);
    }

    #[test]
    fn parse_function_type_rejects_wrong_tag() {
        let result = parse_function_type(&[0x61, 0, 0]);

        assert!(matches!(
            result.map_err(ParseError::from),
            Err(ParseError::BadFuncTypeTag(0x61))
        ));
    }

    #[test]
    fn parse_bounded_limits() {
        let (remaining, limits) = parse_limits(&[0x01, 1, 42, 0xFF]).unwrap();

        assert_eq!(limits, Limits::bounded(1, 42));
        assert_eq!(remaining, &[0xFF]);
    }

    #[test]
    fn parse_shared_limits() {
        let (_, limits) = parse_limits(&[0x03, 1, 2]).unwrap();

        assert_eq!(limits.min, 1);
        assert_eq!(limits.max, Some(2));
        assert!(limits.shared);
    }

    #[test]
    fn parse_table_type_requires_funcref() {
        let result = parse_table_type(&[0x6F, 0x00, 0]);

        assert!(matches!(
            result.map_err(ParseError::from),
            Err(ParseError::BadElemType(0x6F))
        ));
    }

    #[test]
    fn parse_mutable_global_type() {
        let (_, kind) = parse_global_type(&[0x7C, 0x01]).unwrap();

        assert_eq!(kind, GlobalType::mutable(ValType::F64));
    }

    #[test]
    fn parse_global_type_rejects_bad_mutability() {
        let result = parse_global_type(&[0x7F, 0x02]);

        assert!(matches!(
            result.map_err(ParseError::from),
            Err(ParseError::MalformedMutability(0x02))
        ));
    }

    #[test]
    fn parse_empty_block_type() {
        let (_, kind) = parse_block_type(&[0x40]).unwrap();

        assert_eq!(kind, BlockType::Empty);
    }

    #[test]
    fn parse_indexed_block_type() {
        let (_, kind) = parse_block_type(&[0x00]).unwrap();

        assert_eq!(kind, BlockType::Type(0));
    }
}
