//! Emitters for WebAssembly types.
//!
//! See <https://webassembly.github.io/spec/core/binary/types.html>

use crate::emitter::errors::EmitError;
use crate::emitter::values::{emit_byte, emit_u32, emit_vector};
use crate::leb128;
use crate::model::{BlockType, FuncType, GlobalType, Limits, Mutability, TableType, ValType};
use std::io::Write;

/// Tag byte introducing a function type.
const FUNC_TYPE_TAG: u8 = 0x60;

/// The element type of a `funcref` table.
const FUNC_REF: u8 = 0x70;

/// Emits a value type tag.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#value-types>
pub fn emit_value_type<O: Write + ?Sized>(
    kind: &ValType,
    output: &mut O,
) -> Result<usize, EmitError> {
    emit_byte(kind.tag(), output)
}

/// Emits a result type: a vector of value types.
pub fn emit_result_type<O: Write + ?Sized>(
    kinds: &[ValType],
    output: &mut O,
) -> Result<usize, EmitError> {
    emit_vector(kinds, output, emit_value_type)
}

/// Emits a function type.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#function-types>
pub fn emit_function_type<O: Write + ?Sized>(
    kind: &FuncType,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = 0;

    bytes += emit_byte(FUNC_TYPE_TAG, output)?;
    bytes += emit_result_type(&kind.params, output)?;
    bytes += emit_result_type(&kind.results, output)?;

    Ok(bytes)
}

/// Emits limits with the tag that encodes the presence of a maximum and
/// sharedness.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#limits>
pub fn emit_limits<O: Write + ?Sized>(limits: &Limits, output: &mut O) -> Result<usize, EmitError> {
    let mut bytes = 0;

    bytes += emit_byte(limits.tag(), output)?;
    bytes += emit_u32(limits.min, output)?;

    if let Some(max) = limits.max {
        bytes += emit_u32(max, output)?;
    }

    Ok(bytes)
}

/// Emits a table type: the `funcref` element type and limits.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#table-types>
pub fn emit_table_type<O: Write + ?Sized>(
    kind: &TableType,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = 0;

    bytes += emit_byte(FUNC_REF, output)?;
    bytes += emit_limits(&kind.limits, output)?;

    Ok(bytes)
}

/// Emits a memory type: plain limits.
pub fn emit_memory_type<O: Write + ?Sized>(
    kind: &Limits,
    output: &mut O,
) -> Result<usize, EmitError> {
    emit_limits(kind, output)
}

/// Emits a global type: a value type and the mutability flag.
///
/// See <https://webassembly.github.io/spec/core/binary/types.html#global-types>
pub fn emit_global_type<O: Write + ?Sized>(
    kind: &GlobalType,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = 0;

    bytes += emit_value_type(&kind.kind, output)?;
    bytes += emit_byte(
        match kind.mutability {
            Mutability::Immutable => 0x00,
            Mutability::Mutable => 0x01,
        },
        output,
    )?;

    Ok(bytes)
}

/// Emits a block type as its signed 33-bit tag.
///
/// See <https://webassembly.github.io/spec/core/binary/instructions.html#binary-blocktype>
pub fn emit_block_type<O: Write + ?Sized>(
    kind: &BlockType,
    output: &mut O,
) -> Result<usize, EmitError> {
    Ok(leb128::encode_signed(kind.tag(), output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_function_type_bytes() {
        let kind = FuncType::new(vec![ValType::I32], vec![ValType::F32]);
        let mut buffer = Vec::new();

        emit_function_type(&kind, &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x60, 0x01, 0x7F, 0x01, 0x7D]);
    }

    #[test]
    fn emit_bounded_limits() {
        let mut buffer = Vec::new();
        emit_limits(&Limits::bounded(1, 2), &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x01, 0x01, 0x02]);
    }

    #[test]
    fn emit_empty_block_type() {
        let mut buffer = Vec::new();
        emit_block_type(&BlockType::Empty, &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x40]);
    }

    #[test]
    fn emit_indexed_block_type() {
        let mut buffer = Vec::new();
        emit_block_type(&BlockType::Type(0), &mut buffer).unwrap();

        assert_eq!(buffer, vec![0x00]);
    }
}
