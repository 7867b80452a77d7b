//! Parsers for the value grammar of the binary format: bytes, integers,
//! floats, names, and vectors.
//!
//! See <https://webassembly.github.io/spec/core/binary/values.html>

use crate::leb128;
use crate::parser::errors::{fail, ParseError};
use nom::number::complete::{le_f32, le_f64, le_u128};
use nom::IResult;

/// The input of every parser in this module: a byte slice.
pub type Input<'a> = &'a [u8];

/// The result of every parser in this module.
pub type ParseResult<'a, T> = IResult<Input<'a>, T, ParseError>;

/// Parses a single byte.
pub fn parse_byte(input: Input<'_>) -> ParseResult<'_, u8> {
    match input.split_first() {
        Some((byte, remaining)) => Ok((remaining, *byte)),
        None => Err(fail(ParseError::UnexpectedEnd)),
    }
}

/// Parses a single byte that must be zero.
pub fn parse_zero_byte(input: Input<'_>) -> ParseResult<'_, u8> {
    let (input, byte) = parse_byte(input)?;

    if byte != 0 {
        return Err(fail(ParseError::BadZeroFlag(byte)));
    }

    Ok((input, byte))
}

/// Parses an unsigned 32-bit integer in LEB128 encoding.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#integers>
pub fn parse_u32(input: Input<'_>) -> ParseResult<'_, u32> {
    leb128::decode_unsigned(input).map_err(|error| fail(error.into()))
}

/// Parses a signed 32-bit integer in LEB128 encoding.
pub fn parse_s32(input: Input<'_>) -> ParseResult<'_, i32> {
    leb128::decode_signed(input).map_err(|error| fail(error.into()))
}

/// Parses a signed 64-bit integer in LEB128 encoding.
pub fn parse_s64(input: Input<'_>) -> ParseResult<'_, i64> {
    leb128::decode_signed(input).map_err(|error| fail(error.into()))
}

/// Parses the signed 33-bit integer used by block types.
pub fn parse_s33(input: Input<'_>) -> ParseResult<'_, i64> {
    leb128::decode_signed_bits(input, 33).map_err(|error| fail(error.into()))
}

/// Parses an IEEE-754 single precision value, little endian.
pub fn parse_f32(input: Input<'_>) -> ParseResult<'_, f32> {
    le_f32(input)
}

/// Parses an IEEE-754 double precision value, little endian.
pub fn parse_f64(input: Input<'_>) -> ParseResult<'_, f64> {
    le_f64(input)
}

/// Parses a 128-bit vector constant, little endian.
pub fn parse_v128(input: Input<'_>) -> ParseResult<'_, u128> {
    le_u128(input)
}

/// Takes exactly `length` bytes from the input.
pub fn take_bytes(input: Input<'_>, length: usize) -> ParseResult<'_, &[u8]> {
    if input.len() < length {
        return Err(fail(ParseError::UnexpectedEnd));
    }

    let (bytes, remaining) = input.split_at(length);
    Ok((remaining, bytes))
}

/// Parses a length-prefixed byte vector.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#bytes>
pub fn parse_byte_vector(input: Input<'_>) -> ParseResult<'_, &[u8]> {
    let (input, length) = parse_u32(input)?;
    take_bytes(input, length as usize)
}

/// Parses a UTF-8 validated WebAssembly name.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#names>
pub fn parse_name(input: Input<'_>) -> ParseResult<'_, String> {
    let (input, bytes) = parse_byte_vector(input)?;

    match std::str::from_utf8(bytes) {
        Ok(name) => Ok((input, name.to_string())),
        Err(_) => Err(fail(ParseError::MalformedUtf8)),
    }
}

/// Parses a length-prefixed vector of items with the given parser.
///
/// See <https://webassembly.github.io/spec/core/binary/conventions.html#vectors>
pub fn parse_vector<'a, T>(
    parser: impl Fn(Input<'a>) -> ParseResult<'a, T>,
) -> impl Fn(Input<'a>) -> ParseResult<'a, Vec<T>> {
    move |input| {
        let (mut input, length) = parse_u32(input)?;
        // A corrupt count must not drive a huge allocation before parsing fails.
        let mut items = Vec::with_capacity((length as usize).min(1024));

        for _ in 0..length {
            let (remaining, item) = parser(input)?;
            input = remaining;
            items.push(item);
        }

        Ok((input, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u32_with_remaining() {
        let input = vec![0xE5, 0x8E, 0x26, 0xFF];
        let (remaining, actual) = parse_u32(input.as_slice()).unwrap();

        assert_eq!(actual, 624485);
        assert_eq!(remaining, &[0xFF]);
    }

    #[test]
    fn parse_name_with_remaining() {
        let name = "Hello, World!";
        let mut input = Vec::from(name);
        input.insert(0, name.len() as u8);
        input.push(42);

        let (remaining, parsed) = parse_name(input.as_slice()).unwrap();

        assert_eq!(parsed, name);
        assert_eq!(remaining, &[42]);
    }

    #[test]
    fn parse_name_rejects_invalid_utf8() {
        let input = vec![2, 0xC0, 0x00];
        let result = parse_name(input.as_slice());

        assert!(matches!(
            result.map_err(ParseError::from),
            Err(ParseError::MalformedUtf8)
        ));
    }

    #[test]
    fn parse_vector_of_bytes() {
        let input = vec![3, 7, 8, 9, 42];
        let (remaining, items) = parse_vector(parse_byte)(input.as_slice()).unwrap();

        assert_eq!(items, vec![7, 8, 9]);
        assert_eq!(remaining, &[42]);
    }

    #[test]
    fn parse_zero_byte_rejects_non_zero() {
        let result = parse_zero_byte(&[1]);

        assert!(matches!(
            result.map_err(ParseError::from),
            Err(ParseError::BadZeroFlag(1))
        ));
    }

    #[test]
    fn exhausted_input() {
        let result = parse_u32(&[0x80]);

        assert!(matches!(
            result.map_err(ParseError::from),
            Err(ParseError::Int(crate::leb128::Leb128Error::UnexpectedEnd))
        ));
    }
}
