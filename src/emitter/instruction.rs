//! Emitters for WebAssembly instructions and expressions.
//!
//! Opcode bytes fall out of the normalized integer: opcodes below `0xFC` are
//! one byte, `0xFC00..=0xFD7F` two bytes, and larger SIMD opcodes three
//! bytes, most significant byte first. The immediates follow the shape the
//! opcode catalog assigns; an instruction whose arguments disagree with its
//! shape is rejected rather than emitted.
//!
//! See <https://webassembly.github.io/spec/core/binary/instructions.html>

use crate::emitter::errors::EmitError;
use crate::emitter::types::{emit_block_type, emit_result_type};
use crate::emitter::values::{
    emit_byte, emit_f32, emit_f64, emit_i32, emit_i64, emit_u32, emit_v128, emit_vector,
};
use crate::model::{Args, Expression, Instruction, MemArg};
use crate::opcode::{self, ArgShape};
use std::io::Write;

/// Emits an expression: its instructions followed by `end`.
///
/// See <https://webassembly.github.io/spec/core/binary/instructions.html#expressions>
pub fn emit_expression<O: Write + ?Sized>(
    expression: &Expression,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mut bytes = 0;

    for instruction in expression.instructions() {
        bytes += emit_instruction(instruction, output)?;
    }

    bytes += emit_byte(opcode::END as u8, output)?;

    Ok(bytes)
}

/// Emits a single instruction: opcode bytes, then immediates.
pub fn emit_instruction<O: Write + ?Sized>(
    instruction: &Instruction,
    output: &mut O,
) -> Result<usize, EmitError> {
    let code = instruction.opcode;
    let shape = opcode::shape(code).ok_or(EmitError::InvalidOpcode(code))?;

    let mut bytes = emit_opcode(code, output)?;
    bytes += emit_args(instruction, shape, output)?;

    Ok(bytes)
}

/// Emits the bytes of a normalized opcode, most significant first.
fn emit_opcode<O: Write + ?Sized>(code: u32, output: &mut O) -> Result<usize, EmitError> {
    if code < 0xFC {
        emit_byte(code as u8, output)
    } else if code <= 0xFD7F {
        output.write_all(&[(code >> 8) as u8, code as u8])?;
        Ok(2)
    } else if code <= 0xFDFFFF {
        output.write_all(&[(code >> 16) as u8, (code >> 8) as u8, code as u8])?;
        Ok(3)
    } else {
        Err(EmitError::InvalidOpcode(code))
    }
}

/// Emits the immediates of an instruction according to its shape.
fn emit_args<O: Write + ?Sized>(
    instruction: &Instruction,
    shape: ArgShape,
    output: &mut O,
) -> Result<usize, EmitError> {
    let mismatch = || EmitError::MismatchedArgs(instruction.opcode);

    let bytes = match (shape, &instruction.args) {
        (ArgShape::NoArgs, Args::None) => 0,
        (ArgShape::Block, Args::Block(args)) => {
            let mut bytes = emit_block_type(&args.kind, output)?;
            bytes += emit_expression(&args.body, output)?;
            bytes
        }
        (ArgShape::If, Args::If(args)) => {
            let mut bytes = emit_block_type(&args.kind, output)?;

            for instruction in args.then.instructions() {
                bytes += emit_instruction(instruction, output)?;
            }

            if let Some(otherwise) = &args.otherwise {
                bytes += emit_byte(opcode::ELSE as u8, output)?;

                for instruction in otherwise.instructions() {
                    bytes += emit_instruction(instruction, output)?;
                }
            }

            bytes + emit_byte(opcode::END as u8, output)?
        }
        (ArgShape::BrTable, Args::BrTable(args)) => {
            let mut bytes = emit_vector(&args.labels, output, |label, output| {
                emit_u32(*label, output)
            })?;
            bytes += emit_u32(args.default, output)?;
            bytes
        }
        (ArgShape::Index, Args::Index(index)) => emit_u32(*index, output)?,
        (ArgShape::IndexZero, Args::Index(index)) => {
            emit_u32(*index, output)? + emit_byte(0x00, output)?
        }
        (ArgShape::TablePair, Args::Table(pair)) => {
            emit_u32(pair.x, output)? + emit_u32(pair.y, output)?
        }
        (ArgShape::ZeroByte, Args::None) => emit_byte(0x00, output)?,
        (ArgShape::TwoZeroBytes, Args::None) => {
            emit_byte(0x00, output)? + emit_byte(0x00, output)?
        }
        (ArgShape::SelectTypes, Args::Types(kinds)) => emit_result_type(kinds, output)?,
        (ArgShape::I32, Args::I32(value)) => emit_i32(*value, output)?,
        (ArgShape::I64, Args::I64(value)) => emit_i64(*value, output)?,
        (ArgShape::F32, Args::F32(value)) => emit_f32(*value, output)?,
        (ArgShape::F64, Args::F64(value)) => emit_f64(*value, output)?,
        (ArgShape::V128, Args::V128(value)) => emit_v128(*value, output)?,
        (ArgShape::Lane, Args::Lane(lane)) => emit_byte(*lane, output)?,
        (ArgShape::MemArg, Args::Mem(mem)) => emit_mem_arg(mem, output)?,
        (ArgShape::MemLane, Args::MemLane(mem, lane)) => {
            emit_mem_arg(mem, output)? + emit_byte(*lane, output)?
        }
        _ => return Err(mismatch()),
    };

    Ok(bytes)
}

/// Emits the alignment and offset immediates of a memory access.
fn emit_mem_arg<O: Write + ?Sized>(mem: &MemArg, output: &mut O) -> Result<usize, EmitError> {
    Ok(emit_u32(mem.align, output)? + emit_u32(mem.offset, output)?)
}
