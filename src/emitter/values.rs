//! Emitters for the value grammar: bytes, integers, floats, names, and
//! vectors.
//!
//! Every routine returns the number of bytes written.
//!
//! See <https://webassembly.github.io/spec/core/binary/values.html>

use crate::emitter::errors::EmitError;
use crate::leb128;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use std::mem::size_of;

/// Emits a single byte.
pub fn emit_byte<O: Write + ?Sized>(byte: u8, output: &mut O) -> Result<usize, EmitError> {
    output.write_u8(byte)?;

    Ok(size_of::<u8>())
}

/// Emits a slice of bytes, optionally prefixed with its length.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#bytes>
pub fn emit_bytes<O: Write + ?Sized>(
    value: &[u8],
    output: &mut O,
    include_length: bool,
) -> Result<usize, EmitError> {
    let prefix = if include_length {
        emit_usize(value.len(), output)?
    } else {
        0
    };

    output.write_all(value)?;

    Ok(prefix + value.len())
}

/// Emits an unsigned 32-bit integer in LEB128 encoding.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#integers>
pub fn emit_u32<O: Write + ?Sized>(value: u32, output: &mut O) -> Result<usize, EmitError> {
    Ok(leb128::encode_unsigned(value, output)?)
}

/// Emits a length or count as an unsigned LEB128 integer.
pub fn emit_usize<O: Write + ?Sized>(value: usize, output: &mut O) -> Result<usize, EmitError> {
    Ok(leb128::encode_unsigned(value as u64, output)?)
}

/// Emits a signed 32-bit integer in LEB128 encoding.
pub fn emit_i32<O: Write + ?Sized>(value: i32, output: &mut O) -> Result<usize, EmitError> {
    Ok(leb128::encode_signed(value, output)?)
}

/// Emits a signed 64-bit integer in LEB128 encoding.
pub fn emit_i64<O: Write + ?Sized>(value: i64, output: &mut O) -> Result<usize, EmitError> {
    Ok(leb128::encode_signed(value, output)?)
}

/// Emits an IEEE-754 single precision value, little endian.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#floating-point>
pub fn emit_f32<O: Write + ?Sized>(value: f32, output: &mut O) -> Result<usize, EmitError> {
    output.write_f32::<LittleEndian>(value)?;

    Ok(size_of::<f32>())
}

/// Emits an IEEE-754 double precision value, little endian.
pub fn emit_f64<O: Write + ?Sized>(value: f64, output: &mut O) -> Result<usize, EmitError> {
    output.write_f64::<LittleEndian>(value)?;

    Ok(size_of::<f64>())
}

/// Emits a 128-bit vector constant, little endian.
pub fn emit_v128<O: Write + ?Sized>(value: u128, output: &mut O) -> Result<usize, EmitError> {
    output.write_all(&value.to_le_bytes())?;

    Ok(size_of::<u128>())
}

/// Emits a WebAssembly name: a length-prefixed UTF-8 string.
///
/// See <https://webassembly.github.io/spec/core/binary/values.html#names>
pub fn emit_name<O: Write + ?Sized>(value: &str, output: &mut O) -> Result<usize, EmitError> {
    emit_bytes(value.as_bytes(), output, true)
}

/// Emits each item with the given function, prefixed with the item count.
///
/// See <https://webassembly.github.io/spec/core/binary/conventions.html#vectors>
pub fn emit_vector<'items, I, E, O>(
    items: &'items [I],
    output: &mut O,
    emit: E,
) -> Result<usize, EmitError>
where
    O: Write + ?Sized,
    E: Fn(&'items I, &mut O) -> Result<usize, EmitError>,
{
    let mut bytes = 0;

    bytes += emit_usize(items.len(), output)?;
    bytes += emit_repeated(items, output, emit)?;

    Ok(bytes)
}

/// Emits each item with the given function, without a count prefix.
pub fn emit_repeated<'items, I, E, O>(
    items: &'items [I],
    output: &mut O,
    emit: E,
) -> Result<usize, EmitError>
where
    O: Write + ?Sized,
    E: Fn(&'items I, &mut O) -> Result<usize, EmitError>,
{
    let mut bytes = 0;

    for item in items {
        bytes += emit(item, output)?;
    }

    Ok(bytes)
}
