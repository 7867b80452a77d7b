//! WebAssembly instructions, keyed by normalized opcode.
//!
//! An instruction pairs a normalized opcode integer with the immediate
//! arguments of the shape the opcode catalog assigns to it. Structured
//! control instructions nest their bodies inside the arguments, so an
//! expression is naturally a tree.
//!
//! See <https://webassembly.github.io/spec/core/syntax/instructions.html>

use crate::model::{BlockType, LabelIndex, ValType};
use crate::opcode;
use std::fmt;

/// Memory-access immediates: an alignment exponent and an offset.
///
/// See <https://webassembly.github.io/spec/core/binary/instructions.html#memory-instructions>
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MemArg {
    pub align: u32,
    pub offset: u32,
}

impl MemArg {
    /// Creates a new memory argument.
    pub fn new(align: u32, offset: u32) -> Self {
        MemArg { align, offset }
    }
}

/// A pair of indices (`table.init`, `table.copy`).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TableArg {
    pub x: u32,
    pub y: u32,
}

/// Immediates of `block` and `loop`: a block type and the nested body.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockArgs {
    pub kind: BlockType,
    pub body: Expression,
}

/// Immediates of `if`: a block type, the consequent, and the optional
/// alternative.
#[derive(Clone, Debug, PartialEq)]
pub struct IfArgs {
    pub kind: BlockType,
    pub then: Expression,
    pub otherwise: Option<Expression>,
}

/// Immediates of `br_table`: a vector of labels and the default label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrTableArgs {
    pub labels: Vec<LabelIndex>,
    pub default: LabelIndex,
}

/// The immediate arguments of an instruction, keyed by the argument shape the
/// opcode catalog assigns to the opcode.
#[derive(Clone, Debug, PartialEq)]
pub enum Args {
    None,
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    V128(u128),
    Lane(u8),
    Index(u32),
    Mem(MemArg),
    MemLane(MemArg, u8),
    Table(TableArg),
    Types(Vec<ValType>),
    Block(BlockArgs),
    If(IfArgs),
    BrTable(BrTableArgs),
}

/// A single instruction: a normalized opcode and its immediates.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub opcode: u32,
    pub args: Args,
}

impl Instruction {
    /// Creates a new instruction from a normalized opcode and its arguments.
    pub fn new(opcode: u32, args: Args) -> Self {
        Instruction { opcode, args }
    }

    /// Creates an instruction with no immediates.
    pub fn plain(opcode: u32) -> Self {
        Instruction::new(opcode, Args::None)
    }

    /// A synthetic `end` marker for the flat instruction form.
    pub fn end() -> Self {
        Instruction::plain(opcode::END)
    }

    /// A synthetic `else` marker for the flat instruction form.
    pub fn else_marker() -> Self {
        Instruction::plain(opcode::ELSE)
    }

    /// An `i32.const` instruction.
    pub fn i32_const(value: i32) -> Self {
        Instruction::new(opcode::I32_CONST, Args::I32(value))
    }

    /// An `i64.const` instruction.
    pub fn i64_const(value: i64) -> Self {
        Instruction::new(opcode::I64_CONST, Args::I64(value))
    }

    /// An `f32.const` instruction.
    pub fn f32_const(value: f32) -> Self {
        Instruction::new(opcode::F32_CONST, Args::F32(value))
    }

    /// An `f64.const` instruction.
    pub fn f64_const(value: f64) -> Self {
        Instruction::new(opcode::F64_CONST, Args::F64(value))
    }

    /// A `call` of the given function index.
    pub fn call(function: u32) -> Self {
        Instruction::new(opcode::CALL, Args::Index(function))
    }

    /// A `global.get` of the given global index.
    pub fn global_get(global: u32) -> Self {
        Instruction::new(opcode::GLOBAL_GET, Args::Index(global))
    }

    /// A `global.set` of the given global index.
    pub fn global_set(global: u32) -> Self {
        Instruction::new(opcode::GLOBAL_SET, Args::Index(global))
    }

    /// The index immediate, if this instruction carries one.
    pub fn index(&self) -> Option<u32> {
        match self.args {
            Args::Index(index) => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = opcode::mnemonic(self.opcode).unwrap_or("<undefined>");

        match &self.args {
            Args::None | Args::Block(_) | Args::If(_) => f.write_str(name),
            Args::I32(value) => write!(f, "{name} {value}"),
            Args::I64(value) => write!(f, "{name} {value}"),
            Args::F32(value) => write!(f, "{name} {value}"),
            Args::F64(value) => write!(f, "{name} {value}"),
            Args::V128(value) => write!(f, "{name} {value:#034x}"),
            Args::Lane(lane) => write!(f, "{name} {lane}"),
            Args::Index(index) => write!(f, "{name} {index}"),
            Args::Mem(mem) => write!(f, "{name} align={} offset={}", mem.align, mem.offset),
            Args::MemLane(mem, lane) => {
                write!(f, "{name} align={} offset={} {lane}", mem.align, mem.offset)
            }
            Args::Table(pair) => write!(f, "{name} {} {}", pair.x, pair.y),
            Args::Types(kinds) => {
                f.write_str(name)?;
                for kind in kinds {
                    write!(f, " {kind}")?;
                }
                Ok(())
            }
            Args::BrTable(args) => {
                f.write_str(name)?;
                for label in &args.labels {
                    write!(f, " {label}")?;
                }
                write!(f, " {}", args.default)
            }
        }
    }
}

/// A sequence of instructions in the nested (folded) form: `block`, `loop`,
/// and `if` carry their bodies inside their arguments, and no terminator
/// markers appear in the sequence itself.
///
/// See <https://webassembly.github.io/spec/core/syntax/instructions.html#expressions>
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expression {
    instructions: Vec<Instruction>,
}

impl Expression {
    /// Creates a new expression from the given instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Expression { instructions }
    }

    /// Creates an empty expression.
    pub fn empty() -> Self {
        Expression {
            instructions: Vec::new(),
        }
    }

    /// The instructions of this expression.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Mutable access to the instructions of this expression.
    pub fn instructions_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instructions
    }

    /// The number of top-level instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if this expression contains no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Applies the function to every instruction in the expression,
    /// descending into `block`, `loop`, and `if` bodies.
    pub fn for_each(&self, f: &mut impl FnMut(&Instruction)) {
        for instruction in &self.instructions {
            f(instruction);

            match &instruction.args {
                Args::Block(block) => block.body.for_each(f),
                Args::If(args) => {
                    args.then.for_each(f);
                    if let Some(otherwise) = &args.otherwise {
                        otherwise.for_each(f);
                    }
                }
                _ => {}
            }
        }
    }

    /// Applies the function to every instruction in the expression,
    /// descending into `block`, `loop`, and `if` bodies.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Instruction)) {
        for instruction in &mut self.instructions {
            f(instruction);

            match &mut instruction.args {
                Args::Block(block) => block.body.for_each_mut(f),
                Args::If(args) => {
                    args.then.for_each_mut(f);
                    if let Some(otherwise) = &mut args.otherwise {
                        otherwise.for_each_mut(f);
                    }
                }
                _ => {}
            }
        }
    }

    /// Produces the flat form of this expression: a depth-first traversal
    /// where `block` and `loop` bodies are hoisted behind their header and
    /// delimited by a synthetic `end`, and `if` arms by `else`/`end`.
    /// The headers keep their block type but carry empty bodies.
    pub fn flatten(&self) -> Vec<Instruction> {
        let mut flat = Vec::new();
        self.flatten_into(&mut flat);
        flat
    }

    fn flatten_into(&self, flat: &mut Vec<Instruction>) {
        for instruction in &self.instructions {
            match &instruction.args {
                Args::Block(block) => {
                    flat.push(Instruction::new(
                        instruction.opcode,
                        Args::Block(BlockArgs {
                            kind: block.kind,
                            body: Expression::empty(),
                        }),
                    ));
                    block.body.flatten_into(flat);
                    flat.push(Instruction::end());
                }
                Args::If(args) => {
                    flat.push(Instruction::new(
                        instruction.opcode,
                        Args::If(IfArgs {
                            kind: args.kind,
                            then: Expression::empty(),
                            otherwise: None,
                        }),
                    ));
                    args.then.flatten_into(flat);
                    if let Some(otherwise) = &args.otherwise {
                        flat.push(Instruction::else_marker());
                        otherwise.flatten_into(flat);
                    }
                    flat.push(Instruction::end());
                }
                _ => flat.push(instruction.clone()),
            }
        }
    }
}

impl From<Vec<Instruction>> for Expression {
    fn from(instructions: Vec<Instruction>) -> Self {
        Expression { instructions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    #[test]
    fn display_mnemonics() {
        assert_eq!(Instruction::call(3).to_string(), "call 3");
        assert_eq!(Instruction::i32_const(-1).to_string(), "i32.const -1");
        assert_eq!(Instruction::plain(opcode::NOP).to_string(), "nop");
    }

    #[test]
    fn walks_nested_bodies() {
        let body = Expression::new(vec![Instruction::new(
            opcode::BLOCK,
            Args::Block(BlockArgs {
                kind: BlockType::Empty,
                body: Expression::new(vec![Instruction::new(
                    opcode::IF,
                    Args::If(IfArgs {
                        kind: BlockType::Empty,
                        then: Expression::new(vec![Instruction::call(1)]),
                        otherwise: Some(Expression::new(vec![Instruction::call(2)])),
                    }),
                )]),
            }),
        )]);

        let mut calls = Vec::new();
        body.for_each(&mut |instruction| {
            if instruction.opcode == opcode::CALL {
                calls.push(instruction.index().unwrap());
            }
        });

        assert_eq!(calls, vec![1, 2]);
    }

    #[test]
    fn flatten_emits_synthetic_terminators() {
        let body = Expression::new(vec![
            Instruction::new(
                opcode::BLOCK,
                Args::Block(BlockArgs {
                    kind: BlockType::Empty,
                    body: Expression::new(vec![Instruction::plain(opcode::NOP)]),
                }),
            ),
            Instruction::i32_const(7),
        ]);

        let flat = body.flatten();
        let opcodes: Vec<u32> = flat.iter().map(|i| i.opcode).collect();

        assert_eq!(
            opcodes,
            vec![opcode::BLOCK, opcode::NOP, opcode::END, opcode::I32_CONST]
        );
    }
}
