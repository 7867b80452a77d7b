//! Little-Endian Base 128 encoding and decoding of signed and unsigned integers.
//!
//! The decoders take an explicit bit width and enforce the WebAssembly rules for
//! over-long and over-large encodings; the encoders always emit the shortest
//! encoding that still carries the correct sign bit.
//!
//! See <https://webassembly.github.io/spec/core/binary/values.html#integers>

mod errors;

pub use errors::Leb128Error;

use std::convert::TryFrom;
use std::io::Write;
use std::mem::size_of;

/// The continuation bit of an LEB128 group.
const CONTINUATION: u8 = 0x80;

/// The value bits of an LEB128 group.
const PAYLOAD: u8 = 0x7F;

/// The sign bit within the final group of a signed encoding.
const SIGN: u8 = 0x40;

/// The number of value bits per LEB128 group.
const GROUP_BITS: usize = 7;

/// Maximum number of bytes an integer of the given width may occupy.
///
/// See <https://en.wikipedia.org/wiki/LEB128>
const fn max_leb128_size(bits: usize) -> usize {
    (bits / GROUP_BITS) + (bits % GROUP_BITS != 0) as usize
}

/// Decodes an unsigned integer of the given bit width.
/// Returns the remaining input and the decoded value.
///
/// Fails with `TooLong` when the continuation bit is still set after
/// `ceil(bits / 7)` bytes, and with `TooLarge` when the final group carries
/// value bits beyond the remaining width.
pub fn decode_unsigned_bits(input: &[u8], bits: usize) -> Result<(&[u8], u64), Leb128Error> {
    let max_size = max_leb128_size(bits);
    let mut result = 0u64;

    for index in 0..max_size {
        let byte = *input.get(index).ok_or(Leb128Error::UnexpectedEnd)?;

        if index + 1 == max_size {
            if byte & CONTINUATION != 0 {
                return Err(Leb128Error::TooLong(max_size));
            }

            let width = bits - (max_size - 1) * GROUP_BITS;
            if width < GROUP_BITS && (byte >> width) != 0 {
                return Err(Leb128Error::TooLarge(bits));
            }
        }

        result |= ((byte & PAYLOAD) as u64) << (index * GROUP_BITS);

        if byte & CONTINUATION == 0 {
            return Ok((&input[index + 1..], result));
        }
    }

    unreachable!("the final group either terminates or fails")
}

/// Decodes a signed integer of the given bit width, sign-extending the result
/// when the sign bit of the final group is set.
///
/// The final allowed group must be pure sign extension beyond the remaining
/// width, otherwise the decode fails with `TooLarge`.
pub fn decode_signed_bits(input: &[u8], bits: usize) -> Result<(&[u8], i64), Leb128Error> {
    let max_size = max_leb128_size(bits);
    let mut result = 0i64;

    for index in 0..max_size {
        let byte = *input.get(index).ok_or(Leb128Error::UnexpectedEnd)?;

        if index + 1 == max_size {
            if byte & CONTINUATION != 0 {
                return Err(Leb128Error::TooLong(max_size));
            }

            let width = bits - (max_size - 1) * GROUP_BITS;
            if width < GROUP_BITS {
                // Bits at and above the in-range sign position must all equal it.
                let extension = (byte & PAYLOAD) >> (width - 1);
                let ones = (1u8 << (GROUP_BITS - width + 1)) - 1;
                if extension != 0 && extension != ones {
                    return Err(Leb128Error::TooLarge(bits));
                }
            }
        }

        result |= ((byte & PAYLOAD) as i64) << (index * GROUP_BITS);

        if byte & CONTINUATION == 0 {
            let used = (index + 1) * GROUP_BITS;
            if used < 64 && byte & SIGN != 0 {
                result |= !0 << used;
            }

            return Ok((&input[index + 1..], result));
        }
    }

    unreachable!("the final group either terminates or fails")
}

/// Decodes an unsigned integer whose bit width is that of the target type.
/// Returns the decoded integer and the remaining input.
pub fn decode_unsigned<T>(input: &[u8]) -> Result<(&[u8], T), Leb128Error>
where
    T: TryFrom<u64>,
{
    let bits = size_of::<T>() * 8;
    let (remaining, value) = decode_unsigned_bits(input, bits)?;
    let value = T::try_from(value).map_err(|_| Leb128Error::TooLarge(bits))?;

    Ok((remaining, value))
}

/// Decodes a signed integer whose bit width is that of the target type.
/// Returns the decoded integer and the remaining input.
pub fn decode_signed<T>(input: &[u8]) -> Result<(&[u8], T), Leb128Error>
where
    T: TryFrom<i64>,
{
    let bits = size_of::<T>() * 8;
    let (remaining, value) = decode_signed_bits(input, bits)?;
    let value = T::try_from(value).map_err(|_| Leb128Error::TooLarge(bits))?;

    Ok((remaining, value))
}

/// Encodes an unsigned integer using the minimal number of groups.
/// Returns the number of bytes written.
pub fn encode_unsigned<I, O: Write + ?Sized>(input: I, output: &mut O) -> Result<usize, Leb128Error>
where
    I: Into<u64>,
{
    let mut value = input.into();
    let mut written = 0;

    loop {
        let mut byte = (value as u8) & PAYLOAD;
        value >>= GROUP_BITS;

        if value != 0 {
            byte |= CONTINUATION;
        }

        output.write_all(&[byte])?;
        written += 1;

        if value == 0 {
            return Ok(written);
        }
    }
}

/// Encodes a signed integer using the minimal number of groups that still
/// carries the correct sign bit.
/// Returns the number of bytes written.
pub fn encode_signed<I, O: Write + ?Sized>(input: I, output: &mut O) -> Result<usize, Leb128Error>
where
    I: Into<i64>,
{
    let mut value = input.into();
    let mut written = 0;

    loop {
        let byte = (value as u8) & PAYLOAD;
        value >>= GROUP_BITS;

        let done = (value == 0 && byte & SIGN == 0) || (value == -1 && byte & SIGN != 0);
        output.write_all(&[if done { byte } else { byte | CONTINUATION }])?;
        written += 1;

        if done {
            return Ok(written);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn decode_unsigned_large() {
        let input = vec![0xE5, 0x8E, 0x26];
        let (remaining, actual): (&[u8], u32) = decode_unsigned(input.as_slice()).unwrap();

        assert_eq!(actual, 624485);
        assert!(remaining.is_empty());
    }

    #[test]
    fn decode_unsigned_with_remaining() {
        let input = vec![64, 0xFF];
        let (remaining, actual): (&[u8], u32) = decode_unsigned(input.as_slice()).unwrap();

        assert_eq!(actual, 64);
        assert_eq!(remaining, &[0xFF]);
    }

    #[test]
    fn decode_unsigned_non_minimal_zero() {
        // Five groups of zero still decode to zero for a 32-bit width.
        let input = vec![0x80, 0x80, 0x80, 0x80, 0x00];
        let (remaining, actual): (&[u8], u32) = decode_unsigned(input.as_slice()).unwrap();

        assert_eq!(actual, 0);
        assert!(remaining.is_empty());
    }

    #[test]
    fn decode_unsigned_too_long() {
        let input = vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        let result: Result<(&[u8], u32), _> = decode_unsigned(input.as_slice());

        assert!(matches!(result, Err(Leb128Error::TooLong(5))));
    }

    #[test]
    fn decode_unsigned_too_large() {
        let input = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x10];
        let result: Result<(&[u8], u32), _> = decode_unsigned(input.as_slice());

        assert!(matches!(result, Err(Leb128Error::TooLarge(32))));
    }

    #[test]
    fn decode_unsigned_exhausted() {
        let input = vec![0x80, 0x80];
        let result: Result<(&[u8], u32), _> = decode_unsigned(input.as_slice());

        assert!(matches!(result, Err(Leb128Error::UnexpectedEnd)));
    }

    #[test]
    fn decode_signed_large_negative() {
        let input = vec![0xC0, 0xBB, 0x78];
        let (remaining, actual): (&[u8], i32) = decode_signed(input.as_slice()).unwrap();

        assert_eq!(actual, -123456);
        assert!(remaining.is_empty());
    }

    #[test]
    fn decode_signed_minus_one() {
        let input = vec![0x7F];
        let (_, actual): (&[u8], i32) = decode_signed(input.as_slice()).unwrap();

        assert_eq!(actual, -1);
    }

    #[test]
    fn decode_signed_full_width_minus_one() {
        // -1 spelled out over all five groups of a 32-bit width.
        let input = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let (_, actual): (&[u8], i32) = decode_signed(input.as_slice()).unwrap();

        assert_eq!(actual, -1);
    }

    #[test]
    fn decode_signed_too_large() {
        // Final group carries a positive bit beyond 32 bits.
        let input = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x08];
        let result: Result<(&[u8], i32), _> = decode_signed(input.as_slice());

        assert!(matches!(result, Err(Leb128Error::TooLarge(32))));
    }

    #[test]
    fn decode_signed_33_bits() {
        let (_, actual) = decode_signed_bits(&[0x40], 33).unwrap();
        assert_eq!(actual, -64);

        let (_, actual) = decode_signed_bits(&[0x00], 33).unwrap();
        assert_eq!(actual, 0);
    }

    #[test]
    fn encode_unsigned_large() {
        let mut output = Vec::new();
        let written = encode_unsigned(624485u32, &mut output).unwrap();

        assert_eq!(written, 3);
        assert_eq!(output, vec![0xE5, 0x8E, 0x26]);
    }

    #[test]
    fn encode_unsigned_zero() {
        let mut output = Vec::new();
        let written = encode_unsigned(0u32, &mut output).unwrap();

        assert_eq!(written, 1);
        assert_eq!(output, vec![0x00]);
    }

    #[test]
    fn encode_signed_negative() {
        let mut output = Vec::new();
        let written = encode_signed(-123456i32, &mut output).unwrap();

        assert_eq!(written, 3);
        assert_eq!(output, vec![0xC0, 0xBB, 0x78]);
    }

    #[test]
    fn encode_signed_sign_bit_padding() {
        // 64 does not fit a single signed group; the sign bit forces a second.
        let mut output = Vec::new();
        let written = encode_signed(64i32, &mut output).unwrap();

        assert_eq!(written, 2);
        assert_eq!(output, vec![0xC0, 0x00]);
    }

    #[quickcheck]
    fn unsigned_round_trip(value: u32) -> bool {
        let mut output = Vec::new();
        encode_unsigned(value, &mut output).unwrap();

        let (remaining, decoded): (&[u8], u32) = decode_unsigned(output.as_slice()).unwrap();
        remaining.is_empty() && decoded == value
    }

    #[quickcheck]
    fn signed_round_trip(value: i64) -> bool {
        let mut output = Vec::new();
        encode_signed(value, &mut output).unwrap();

        let (remaining, decoded): (&[u8], i64) = decode_signed(output.as_slice()).unwrap();
        remaining.is_empty() && decoded == value
    }
}
