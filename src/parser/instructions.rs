//! Parsers for WebAssembly instructions and expressions.
//!
//! Opcodes are normalized as they are read: the `0xFC` family folds the
//! prefix and the id into two bytes, the `0xFD` SIMD family keeps the prefix
//! and the LEB128 bytes of the instruction id. The opcode catalog then
//! selects the reader for the immediates.
//!
//! See <https://webassembly.github.io/spec/core/binary/instructions.html>

use crate::model::{
    Args, BlockArgs, BrTableArgs, Expression, IfArgs, Instruction, MemArg, TableArg,
};
use crate::opcode::{self, ArgShape};
use crate::parser::errors::{fail, ParseError};
use crate::parser::types::{parse_block_type, parse_result_type};
use crate::parser::values::{
    parse_byte, parse_f32, parse_f64, parse_s32, parse_s64, parse_u32, parse_v128, parse_vector,
    parse_zero_byte, Input, ParseResult,
};

/// Parses an expression: instructions terminated by `end`.
///
/// See <https://webassembly.github.io/spec/core/binary/instructions.html#expressions>
pub fn parse_expression(input: Input<'_>) -> ParseResult<'_, Expression> {
    let (input, (instructions, terminator)) = parse_instructions(input)?;

    if terminator != opcode::END {
        return Err(fail(ParseError::InvalidExprEnd(terminator)));
    }

    Ok((input, Expression::new(instructions)))
}

/// Parses instructions until a terminator (`end` or `else`) and returns the
/// sequence together with the terminating opcode.
fn parse_instructions(mut input: Input<'_>) -> ParseResult<'_, (Vec<Instruction>, u32)> {
    let mut instructions = Vec::new();

    loop {
        let (remaining, code) = parse_opcode(input)?;

        if code == opcode::END || code == opcode::ELSE {
            return Ok((remaining, (instructions, code)));
        }

        let (remaining, instruction) = parse_instruction_args(remaining, code)?;
        input = remaining;
        instructions.push(instruction);
    }
}

/// Parses a single instruction.
pub fn parse_instruction(input: Input<'_>) -> ParseResult<'_, Instruction> {
    let (input, code) = parse_opcode(input)?;
    parse_instruction_args(input, code)
}

/// Reads an opcode, folding multi-byte opcodes into their normalized form.
fn parse_opcode(input: Input<'_>) -> ParseResult<'_, u32> {
    let (input, first) = parse_byte(input)?;

    match first {
        opcode::FC_PREFIX => {
            let (input, second) = parse_byte(input)?;
            Ok((input, 0xFC00 | second as u32))
        }
        opcode::SIMD_PREFIX => {
            let (input, second) = parse_byte(input)?;

            if second < 0x80 {
                Ok((input, 0xFD00 | second as u32))
            } else {
                let (input, third) = parse_byte(input)?;
                Ok((input, 0xFD0000 | (second as u32) << 8 | third as u32))
            }
        }
        _ => Ok((input, first as u32)),
    }
}

/// Parses the immediates of the given opcode according to its shape in the
/// catalog.
fn parse_instruction_args(input: Input<'_>, code: u32) -> ParseResult<'_, Instruction> {
    let shape = match opcode::shape(code) {
        Some(shape) => shape,
        None => return Err(fail(ParseError::UndefinedOpcode(code))),
    };

    let (input, args) = match shape {
        ArgShape::NoArgs => (input, Args::None),
        ArgShape::Block => {
            let (input, kind) = parse_block_type(input)?;
            let (input, (instructions, terminator)) = parse_instructions(input)?;

            if terminator != opcode::END {
                return Err(fail(ParseError::InvalidExprEnd(terminator)));
            }

            (
                input,
                Args::Block(BlockArgs {
                    kind,
                    body: Expression::new(instructions),
                }),
            )
        }
        ArgShape::If => {
            let (input, kind) = parse_block_type(input)?;
            let (input, (then, terminator)) = parse_instructions(input)?;

            let (input, otherwise) = if terminator == opcode::ELSE {
                let (input, (otherwise, terminator)) = parse_instructions(input)?;

                if terminator != opcode::END {
                    return Err(fail(ParseError::InvalidExprEnd(terminator)));
                }

                (input, Some(Expression::new(otherwise)))
            } else {
                (input, None)
            };

            (
                input,
                Args::If(IfArgs {
                    kind,
                    then: Expression::new(then),
                    otherwise,
                }),
            )
        }
        ArgShape::BrTable => {
            let (input, labels) = parse_vector(parse_u32)(input)?;
            let (input, default) = parse_u32(input)?;
            (input, Args::BrTable(BrTableArgs { labels, default }))
        }
        ArgShape::Index => {
            let (input, index) = parse_u32(input)?;
            (input, Args::Index(index))
        }
        ArgShape::IndexZero => {
            let (input, index) = parse_u32(input)?;
            let (input, _) = parse_zero_byte(input)?;
            (input, Args::Index(index))
        }
        ArgShape::TablePair => {
            let (input, x) = parse_u32(input)?;
            let (input, y) = parse_u32(input)?;
            (input, Args::Table(TableArg { x, y }))
        }
        ArgShape::ZeroByte => {
            let (input, _) = parse_zero_byte(input)?;
            (input, Args::None)
        }
        ArgShape::TwoZeroBytes => {
            let (input, _) = parse_zero_byte(input)?;
            let (input, _) = parse_zero_byte(input)?;
            (input, Args::None)
        }
        ArgShape::SelectTypes => {
            let (input, kinds) = parse_result_type(input)?;
            (input, Args::Types(kinds))
        }
        ArgShape::I32 => {
            let (input, value) = parse_s32(input)?;
            (input, Args::I32(value))
        }
        ArgShape::I64 => {
            let (input, value) = parse_s64(input)?;
            (input, Args::I64(value))
        }
        ArgShape::F32 => {
            let (input, value) = parse_f32(input)?;
            (input, Args::F32(value))
        }
        ArgShape::F64 => {
            let (input, value) = parse_f64(input)?;
            (input, Args::F64(value))
        }
        ArgShape::V128 => {
            let (input, value) = parse_v128(input)?;
            (input, Args::V128(value))
        }
        ArgShape::Lane => {
            let (input, lane) = parse_byte(input)?;
            (input, Args::Lane(lane))
        }
        ArgShape::MemArg => {
            let (input, mem) = parse_mem_arg(input)?;
            (input, Args::Mem(mem))
        }
        ArgShape::MemLane => {
            let (input, mem) = parse_mem_arg(input)?;
            let (input, lane) = parse_byte(input)?;
            (input, Args::MemLane(mem, lane))
        }
    };

    Ok((input, Instruction::new(code, args)))
}

/// Parses the alignment and offset immediates of a memory access.
fn parse_mem_arg(input: Input<'_>) -> ParseResult<'_, MemArg> {
    let (input, align) = parse_u32(input)?;
    let (input, offset) = parse_u32(input)?;

    Ok((input, MemArg::new(align, offset)))
}
