//! Catalog of WebAssembly opcodes.
//!
//! Opcodes are stored as normalized integers: plain instructions occupy one
//! byte, the `0xFC` family two bytes, and SIMD instructions two or three bytes
//! carrying the `0xFD` prefix and the LEB128 bytes of the instruction id.
//! The catalog maps every defined opcode to a stable mnemonic and to the shape
//! of its immediate arguments; both the parser and the emitter dispatch on it.
//!
//! See <https://webassembly.github.io/spec/core/binary/instructions.html>

/// Prefix byte of the saturating-truncation and bulk-memory family.
pub const FC_PREFIX: u8 = 0xFC;

/// Prefix byte of the 128-bit SIMD family.
pub const SIMD_PREFIX: u8 = 0xFD;

pub const UNREACHABLE: u32 = 0x00;
pub const NOP: u32 = 0x01;
pub const BLOCK: u32 = 0x02;
pub const LOOP: u32 = 0x03;
pub const IF: u32 = 0x04;
pub const ELSE: u32 = 0x05;
pub const END: u32 = 0x0B;
pub const BR: u32 = 0x0C;
pub const BR_IF: u32 = 0x0D;
pub const BR_TABLE: u32 = 0x0E;
pub const RETURN: u32 = 0x0F;
pub const CALL: u32 = 0x10;
pub const CALL_INDIRECT: u32 = 0x11;
pub const DROP: u32 = 0x1A;
pub const SELECT: u32 = 0x1B;
pub const SELECT_TYPED: u32 = 0x1C;
pub const LOCAL_GET: u32 = 0x20;
pub const LOCAL_SET: u32 = 0x21;
pub const LOCAL_TEE: u32 = 0x22;
pub const GLOBAL_GET: u32 = 0x23;
pub const GLOBAL_SET: u32 = 0x24;
pub const TABLE_GET: u32 = 0x25;
pub const TABLE_SET: u32 = 0x26;
pub const MEMORY_SIZE: u32 = 0x3F;
pub const MEMORY_GROW: u32 = 0x40;
pub const I32_CONST: u32 = 0x41;
pub const I64_CONST: u32 = 0x42;
pub const F32_CONST: u32 = 0x43;
pub const F64_CONST: u32 = 0x44;
pub const REF_NULL: u32 = 0xD0;
pub const REF_IS_NULL: u32 = 0xD1;
pub const REF_FUNC: u32 = 0xD2;
pub const MEMORY_INIT: u32 = 0xFC08;
pub const DATA_DROP: u32 = 0xFC09;
pub const MEMORY_COPY: u32 = 0xFC0A;
pub const MEMORY_FILL: u32 = 0xFC0B;
pub const TABLE_INIT: u32 = 0xFC0C;
pub const ELEM_DROP: u32 = 0xFC0D;
pub const TABLE_COPY: u32 = 0xFC0E;
pub const TABLE_GROW: u32 = 0xFC0F;
pub const TABLE_SIZE: u32 = 0xFC10;
pub const TABLE_FILL: u32 = 0xFC11;

/// The shape of an instruction's immediate arguments.
/// Selects the reader and writer routine for the immediates; the operand stack
/// is not described here.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ArgShape {
    /// No immediates.
    NoArgs,
    /// Block type followed by a nested expression (`block`, `loop`).
    Block,
    /// Block type, a consequent, and an optional alternative (`if`).
    If,
    /// Vector of label indices plus a default label (`br_table`).
    BrTable,
    /// A single LEB128-u32 index or heap-type immediate.
    Index,
    /// An index followed by a zero-checked byte (`call_indirect`, `memory.init`).
    IndexZero,
    /// Two LEB128-u32 indices (`table.init`, `table.copy`).
    TablePair,
    /// A single zero-checked byte (`memory.size`, `memory.grow`, `memory.fill`).
    ZeroByte,
    /// Two zero-checked bytes (`memory.copy`).
    TwoZeroBytes,
    /// Vector of value types (typed `select`).
    SelectTypes,
    /// Signed 32-bit constant.
    I32,
    /// Signed 64-bit constant.
    I64,
    /// IEEE-754 single precision constant.
    F32,
    /// IEEE-754 double precision constant.
    F64,
    /// 16 bytes (`v128.const`, `i8x16.shuffle`).
    V128,
    /// A single lane index byte.
    Lane,
    /// Alignment and offset immediates.
    MemArg,
    /// Alignment, offset, and a lane index.
    MemLane,
}

/// The SIMD instruction id carried by a normalized opcode, if the opcode
/// belongs to the `0xFD` family.
pub fn simd_id(opcode: u32) -> Option<u32> {
    match opcode {
        0xFD00..=0xFD7F => Some(opcode & 0x7F),
        0xFD0000..=0xFDFFFF => {
            let high = (opcode >> 8) & 0xFF;
            let low = opcode & 0xFF;
            // The stored bytes are the LEB128 encoding of the id.
            (high & 0x80 != 0 && low & 0x80 == 0).then(|| (high & 0x7F) | (low << 7))
        }
        _ => None,
    }
}

/// Builds the normalized opcode for a SIMD instruction id.
pub fn simd_opcode(id: u32) -> u32 {
    if id < 0x80 {
        0xFD00 | id
    } else {
        0xFD0000 | ((id & 0x7F) | 0x80) << 8 | (id >> 7)
    }
}

/// The argument shape of the given normalized opcode.
/// Returns `None` for opcodes the catalog does not define.
pub fn shape(opcode: u32) -> Option<ArgShape> {
    use ArgShape::*;

    let shape = match opcode {
        UNREACHABLE | NOP | RETURN | DROP | SELECT | REF_IS_NULL => NoArgs,
        ELSE | END => NoArgs,
        BLOCK | LOOP => Block,
        IF => If,
        BR | BR_IF => Index,
        BR_TABLE => BrTable,
        CALL => Index,
        CALL_INDIRECT => IndexZero,
        SELECT_TYPED => SelectTypes,
        LOCAL_GET | LOCAL_SET | LOCAL_TEE => Index,
        GLOBAL_GET | GLOBAL_SET => Index,
        TABLE_GET | TABLE_SET => Index,
        0x28..=0x3E => MemArg,
        MEMORY_SIZE | MEMORY_GROW => ZeroByte,
        I32_CONST => I32,
        I64_CONST => I64,
        F32_CONST => F32,
        F64_CONST => F64,
        0x45..=0xC4 => NoArgs,
        REF_NULL | REF_FUNC => Index,
        0xFC00..=0xFC07 => NoArgs,
        MEMORY_INIT => IndexZero,
        DATA_DROP | ELEM_DROP | TABLE_GROW | TABLE_SIZE | TABLE_FILL => Index,
        MEMORY_COPY => TwoZeroBytes,
        MEMORY_FILL => ZeroByte,
        TABLE_INIT | TABLE_COPY => TablePair,
        _ => return simd_shape(simd_id(opcode)?),
    };

    Some(shape)
}

/// The argument shape of a SIMD instruction id.
fn simd_shape(id: u32) -> Option<ArgShape> {
    use ArgShape::*;

    simd_mnemonic(id)?;

    let shape = match id {
        0x00..=0x0B | 0x5C | 0x5D => MemArg,
        0x0C | 0x0D => V128,
        0x15..=0x22 => Lane,
        0x54..=0x5B => MemLane,
        _ => NoArgs,
    };

    Some(shape)
}

/// The canonical mnemonic of the given normalized opcode.
/// Returns `None` for opcodes the catalog does not define.
pub fn mnemonic(opcode: u32) -> Option<&'static str> {
    match opcode {
        0x00..=0xFB => plain_mnemonic(opcode),
        0xFC00..=0xFCFF => fc_mnemonic(opcode & 0xFF),
        _ => simd_mnemonic(simd_id(opcode)?),
    }
}

/// Mnemonics of the one-byte opcode space.
fn plain_mnemonic(opcode: u32) -> Option<&'static str> {
    let name = match opcode {
        0x00 => "unreachable",
        0x01 => "nop",
        0x02 => "block",
        0x03 => "loop",
        0x04 => "if",
        0x05 => "else",
        0x0B => "end",
        0x0C => "br",
        0x0D => "br_if",
        0x0E => "br_table",
        0x0F => "return",
        0x10 => "call",
        0x11 => "call_indirect",
        0x1A => "drop",
        0x1B | 0x1C => "select",
        0x20 => "local.get",
        0x21 => "local.set",
        0x22 => "local.tee",
        0x23 => "global.get",
        0x24 => "global.set",
        0x25 => "table.get",
        0x26 => "table.set",
        0x28 => "i32.load",
        0x29 => "i64.load",
        0x2A => "f32.load",
        0x2B => "f64.load",
        0x2C => "i32.load8_s",
        0x2D => "i32.load8_u",
        0x2E => "i32.load16_s",
        0x2F => "i32.load16_u",
        0x30 => "i64.load8_s",
        0x31 => "i64.load8_u",
        0x32 => "i64.load16_s",
        0x33 => "i64.load16_u",
        0x34 => "i64.load32_s",
        0x35 => "i64.load32_u",
        0x36 => "i32.store",
        0x37 => "i64.store",
        0x38 => "f32.store",
        0x39 => "f64.store",
        0x3A => "i32.store8",
        0x3B => "i32.store16",
        0x3C => "i64.store8",
        0x3D => "i64.store16",
        0x3E => "i64.store32",
        0x3F => "memory.size",
        0x40 => "memory.grow",
        0x41 => "i32.const",
        0x42 => "i64.const",
        0x43 => "f32.const",
        0x44 => "f64.const",
        0x45 => "i32.eqz",
        0x46 => "i32.eq",
        0x47 => "i32.ne",
        0x48 => "i32.lt_s",
        0x49 => "i32.lt_u",
        0x4A => "i32.gt_s",
        0x4B => "i32.gt_u",
        0x4C => "i32.le_s",
        0x4D => "i32.le_u",
        0x4E => "i32.ge_s",
        0x4F => "i32.ge_u",
        0x50 => "i64.eqz",
        0x51 => "i64.eq",
        0x52 => "i64.ne",
        0x53 => "i64.lt_s",
        0x54 => "i64.lt_u",
        0x55 => "i64.gt_s",
        0x56 => "i64.gt_u",
        0x57 => "i64.le_s",
        0x58 => "i64.le_u",
        0x59 => "i64.ge_s",
        0x5A => "i64.ge_u",
        0x5B => "f32.eq",
        0x5C => "f32.ne",
        0x5D => "f32.lt",
        0x5E => "f32.gt",
        0x5F => "f32.le",
        0x60 => "f32.ge",
        0x61 => "f64.eq",
        0x62 => "f64.ne",
        0x63 => "f64.lt",
        0x64 => "f64.gt",
        0x65 => "f64.le",
        0x66 => "f64.ge",
        0x67 => "i32.clz",
        0x68 => "i32.ctz",
        0x69 => "i32.popcnt",
        0x6A => "i32.add",
        0x6B => "i32.sub",
        0x6C => "i32.mul",
        0x6D => "i32.div_s",
        0x6E => "i32.div_u",
        0x6F => "i32.rem_s",
        0x70 => "i32.rem_u",
        0x71 => "i32.and",
        0x72 => "i32.or",
        0x73 => "i32.xor",
        0x74 => "i32.shl",
        0x75 => "i32.shr_s",
        0x76 => "i32.shr_u",
        0x77 => "i32.rotl",
        0x78 => "i32.rotr",
        0x79 => "i64.clz",
        0x7A => "i64.ctz",
        0x7B => "i64.popcnt",
        0x7C => "i64.add",
        0x7D => "i64.sub",
        0x7E => "i64.mul",
        0x7F => "i64.div_s",
        0x80 => "i64.div_u",
        0x81 => "i64.rem_s",
        0x82 => "i64.rem_u",
        0x83 => "i64.and",
        0x84 => "i64.or",
        0x85 => "i64.xor",
        0x86 => "i64.shl",
        0x87 => "i64.shr_s",
        0x88 => "i64.shr_u",
        0x89 => "i64.rotl",
        0x8A => "i64.rotr",
        0x8B => "f32.abs",
        0x8C => "f32.neg",
        0x8D => "f32.ceil",
        0x8E => "f32.floor",
        0x8F => "f32.trunc",
        0x90 => "f32.nearest",
        0x91 => "f32.sqrt",
        0x92 => "f32.add",
        0x93 => "f32.sub",
        0x94 => "f32.mul",
        0x95 => "f32.div",
        0x96 => "f32.min",
        0x97 => "f32.max",
        0x98 => "f32.copysign",
        0x99 => "f64.abs",
        0x9A => "f64.neg",
        0x9B => "f64.ceil",
        0x9C => "f64.floor",
        0x9D => "f64.trunc",
        0x9E => "f64.nearest",
        0x9F => "f64.sqrt",
        0xA0 => "f64.add",
        0xA1 => "f64.sub",
        0xA2 => "f64.mul",
        0xA3 => "f64.div",
        0xA4 => "f64.min",
        0xA5 => "f64.max",
        0xA6 => "f64.copysign",
        0xA7 => "i32.wrap_i64",
        0xA8 => "i32.trunc_f32_s",
        0xA9 => "i32.trunc_f32_u",
        0xAA => "i32.trunc_f64_s",
        0xAB => "i32.trunc_f64_u",
        0xAC => "i64.extend_i32_s",
        0xAD => "i64.extend_i32_u",
        0xAE => "i64.trunc_f32_s",
        0xAF => "i64.trunc_f32_u",
        0xB0 => "i64.trunc_f64_s",
        0xB1 => "i64.trunc_f64_u",
        0xB2 => "f32.convert_i32_s",
        0xB3 => "f32.convert_i32_u",
        0xB4 => "f32.convert_i64_s",
        0xB5 => "f32.convert_i64_u",
        0xB6 => "f32.demote_f64",
        0xB7 => "f64.convert_i32_s",
        0xB8 => "f64.convert_i32_u",
        0xB9 => "f64.convert_i64_s",
        0xBA => "f64.convert_i64_u",
        0xBB => "f64.promote_f32",
        0xBC => "i32.reinterpret_f32",
        0xBD => "i64.reinterpret_f64",
        0xBE => "f32.reinterpret_i32",
        0xBF => "f64.reinterpret_i64",
        0xC0 => "i32.extend8_s",
        0xC1 => "i32.extend16_s",
        0xC2 => "i64.extend8_s",
        0xC3 => "i64.extend16_s",
        0xC4 => "i64.extend32_s",
        0xD0 => "ref.null",
        0xD1 => "ref.is_null",
        0xD2 => "ref.func",
        _ => return None,
    };

    Some(name)
}

/// Mnemonics of the `0xFC` family.
fn fc_mnemonic(id: u32) -> Option<&'static str> {
    let name = match id {
        0x00 => "i32.trunc_sat_f32_s",
        0x01 => "i32.trunc_sat_f32_u",
        0x02 => "i32.trunc_sat_f64_s",
        0x03 => "i32.trunc_sat_f64_u",
        0x04 => "i64.trunc_sat_f32_s",
        0x05 => "i64.trunc_sat_f32_u",
        0x06 => "i64.trunc_sat_f64_s",
        0x07 => "i64.trunc_sat_f64_u",
        0x08 => "memory.init",
        0x09 => "data.drop",
        0x0A => "memory.copy",
        0x0B => "memory.fill",
        0x0C => "table.init",
        0x0D => "elem.drop",
        0x0E => "table.copy",
        0x0F => "table.grow",
        0x10 => "table.size",
        0x11 => "table.fill",
        _ => return None,
    };

    Some(name)
}

/// Mnemonics of the `0xFD` 128-bit SIMD family, keyed by instruction id.
fn simd_mnemonic(id: u32) -> Option<&'static str> {
    let name = match id {
        0x00 => "v128.load",
        0x01 => "v128.load8x8_s",
        0x02 => "v128.load8x8_u",
        0x03 => "v128.load16x4_s",
        0x04 => "v128.load16x4_u",
        0x05 => "v128.load32x2_s",
        0x06 => "v128.load32x2_u",
        0x07 => "v128.load8_splat",
        0x08 => "v128.load16_splat",
        0x09 => "v128.load32_splat",
        0x0A => "v128.load64_splat",
        0x0B => "v128.store",
        0x0C => "v128.const",
        0x0D => "i8x16.shuffle",
        0x0E => "i8x16.swizzle",
        0x0F => "i8x16.splat",
        0x10 => "i16x8.splat",
        0x11 => "i32x4.splat",
        0x12 => "i64x2.splat",
        0x13 => "f32x4.splat",
        0x14 => "f64x2.splat",
        0x15 => "i8x16.extract_lane_s",
        0x16 => "i8x16.extract_lane_u",
        0x17 => "i8x16.replace_lane",
        0x18 => "i16x8.extract_lane_s",
        0x19 => "i16x8.extract_lane_u",
        0x1A => "i16x8.replace_lane",
        0x1B => "i32x4.extract_lane",
        0x1C => "i32x4.replace_lane",
        0x1D => "i64x2.extract_lane",
        0x1E => "i64x2.replace_lane",
        0x1F => "f32x4.extract_lane",
        0x20 => "f32x4.replace_lane",
        0x21 => "f64x2.extract_lane",
        0x22 => "f64x2.replace_lane",
        0x23 => "i8x16.eq",
        0x24 => "i8x16.ne",
        0x25 => "i8x16.lt_s",
        0x26 => "i8x16.lt_u",
        0x27 => "i8x16.gt_s",
        0x28 => "i8x16.gt_u",
        0x29 => "i8x16.le_s",
        0x2A => "i8x16.le_u",
        0x2B => "i8x16.ge_s",
        0x2C => "i8x16.ge_u",
        0x2D => "i16x8.eq",
        0x2E => "i16x8.ne",
        0x2F => "i16x8.lt_s",
        0x30 => "i16x8.lt_u",
        0x31 => "i16x8.gt_s",
        0x32 => "i16x8.gt_u",
        0x33 => "i16x8.le_s",
        0x34 => "i16x8.le_u",
        0x35 => "i16x8.ge_s",
        0x36 => "i16x8.ge_u",
        0x37 => "i32x4.eq",
        0x38 => "i32x4.ne",
        0x39 => "i32x4.lt_s",
        0x3A => "i32x4.lt_u",
        0x3B => "i32x4.gt_s",
        0x3C => "i32x4.gt_u",
        0x3D => "i32x4.le_s",
        0x3E => "i32x4.le_u",
        0x3F => "i32x4.ge_s",
        0x40 => "i32x4.ge_u",
        0x41 => "f32x4.eq",
        0x42 => "f32x4.ne",
        0x43 => "f32x4.lt",
        0x44 => "f32x4.gt",
        0x45 => "f32x4.le",
        0x46 => "f32x4.ge",
        0x47 => "f64x2.eq",
        0x48 => "f64x2.ne",
        0x49 => "f64x2.lt",
        0x4A => "f64x2.gt",
        0x4B => "f64x2.le",
        0x4C => "f64x2.ge",
        0x4D => "v128.not",
        0x4E => "v128.and",
        0x4F => "v128.andnot",
        0x50 => "v128.or",
        0x51 => "v128.xor",
        0x52 => "v128.bitselect",
        0x53 => "v128.any_true",
        0x54 => "v128.load8_lane",
        0x55 => "v128.load16_lane",
        0x56 => "v128.load32_lane",
        0x57 => "v128.load64_lane",
        0x58 => "v128.store8_lane",
        0x59 => "v128.store16_lane",
        0x5A => "v128.store32_lane",
        0x5B => "v128.store64_lane",
        0x5C => "v128.load32_zero",
        0x5D => "v128.load64_zero",
        0x5E => "f32x4.demote_f64x2_zero",
        0x5F => "f64x2.promote_low_f32x4",
        0x60 => "i8x16.abs",
        0x61 => "i8x16.neg",
        0x62 => "i8x16.popcnt",
        0x63 => "i8x16.all_true",
        0x64 => "i8x16.bitmask",
        0x65 => "i8x16.narrow_i16x8_s",
        0x66 => "i8x16.narrow_i16x8_u",
        0x67 => "f32x4.ceil",
        0x68 => "f32x4.floor",
        0x69 => "f32x4.trunc",
        0x6A => "f32x4.nearest",
        0x6B => "i8x16.shl",
        0x6C => "i8x16.shr_s",
        0x6D => "i8x16.shr_u",
        0x6E => "i8x16.add",
        0x6F => "i8x16.add_sat_s",
        0x70 => "i8x16.add_sat_u",
        0x71 => "i8x16.sub",
        0x72 => "i8x16.sub_sat_s",
        0x73 => "i8x16.sub_sat_u",
        0x74 => "f64x2.ceil",
        0x75 => "f64x2.floor",
        0x76 => "i8x16.min_s",
        0x77 => "i8x16.min_u",
        0x78 => "i8x16.max_s",
        0x79 => "i8x16.max_u",
        0x7A => "f64x2.trunc",
        0x7B => "i8x16.avgr_u",
        0x7C => "i16x8.extadd_pairwise_i8x16_s",
        0x7D => "i16x8.extadd_pairwise_i8x16_u",
        0x7E => "i32x4.extadd_pairwise_i16x8_s",
        0x7F => "i32x4.extadd_pairwise_i16x8_u",
        0x80 => "i16x8.abs",
        0x81 => "i16x8.neg",
        0x82 => "i16x8.q15mulr_sat_s",
        0x83 => "i16x8.all_true",
        0x84 => "i16x8.bitmask",
        0x85 => "i16x8.narrow_i32x4_s",
        0x86 => "i16x8.narrow_i32x4_u",
        0x87 => "i16x8.extend_low_i8x16_s",
        0x88 => "i16x8.extend_high_i8x16_s",
        0x89 => "i16x8.extend_low_i8x16_u",
        0x8A => "i16x8.extend_high_i8x16_u",
        0x8B => "i16x8.shl",
        0x8C => "i16x8.shr_s",
        0x8D => "i16x8.shr_u",
        0x8E => "i16x8.add",
        0x8F => "i16x8.add_sat_s",
        0x90 => "i16x8.add_sat_u",
        0x91 => "i16x8.sub",
        0x92 => "i16x8.sub_sat_s",
        0x93 => "i16x8.sub_sat_u",
        0x94 => "f64x2.nearest",
        0x95 => "i16x8.mul",
        0x96 => "i16x8.min_s",
        0x97 => "i16x8.min_u",
        0x98 => "i16x8.max_s",
        0x99 => "i16x8.max_u",
        0x9B => "i16x8.avgr_u",
        0x9C => "i16x8.extmul_low_i8x16_s",
        0x9D => "i16x8.extmul_high_i8x16_s",
        0x9E => "i16x8.extmul_low_i8x16_u",
        0x9F => "i16x8.extmul_high_i8x16_u",
        0xA0 => "i32x4.abs",
        0xA1 => "i32x4.neg",
        0xA3 => "i32x4.all_true",
        0xA4 => "i32x4.bitmask",
        0xA7 => "i32x4.extend_low_i16x8_s",
        0xA8 => "i32x4.extend_high_i16x8_s",
        0xA9 => "i32x4.extend_low_i16x8_u",
        0xAA => "i32x4.extend_high_i16x8_u",
        0xAB => "i32x4.shl",
        0xAC => "i32x4.shr_s",
        0xAD => "i32x4.shr_u",
        0xAE => "i32x4.add",
        0xB1 => "i32x4.sub",
        0xB5 => "i32x4.mul",
        0xB6 => "i32x4.min_s",
        0xB7 => "i32x4.min_u",
        0xB8 => "i32x4.max_s",
        0xB9 => "i32x4.max_u",
        0xBA => "i32x4.dot_i16x8_s",
        0xBC => "i32x4.extmul_low_i16x8_s",
        0xBD => "i32x4.extmul_high_i16x8_s",
        0xBE => "i32x4.extmul_low_i16x8_u",
        0xBF => "i32x4.extmul_high_i16x8_u",
        0xC0 => "i64x2.abs",
        0xC1 => "i64x2.neg",
        0xC3 => "i64x2.all_true",
        0xC4 => "i64x2.bitmask",
        0xC7 => "i64x2.extend_low_i32x4_s",
        0xC8 => "i64x2.extend_high_i32x4_s",
        0xC9 => "i64x2.extend_low_i32x4_u",
        0xCA => "i64x2.extend_high_i32x4_u",
        0xCB => "i64x2.shl",
        0xCC => "i64x2.shr_s",
        0xCD => "i64x2.shr_u",
        0xCE => "i64x2.add",
        0xD1 => "i64x2.sub",
        0xD5 => "i64x2.mul",
        0xD6 => "i64x2.eq",
        0xD7 => "i64x2.ne",
        0xD8 => "i64x2.lt_s",
        0xD9 => "i64x2.gt_s",
        0xDA => "i64x2.le_s",
        0xDB => "i64x2.ge_s",
        0xDC => "i64x2.extmul_low_i32x4_s",
        0xDD => "i64x2.extmul_high_i32x4_s",
        0xDE => "i64x2.extmul_low_i32x4_u",
        0xDF => "i64x2.extmul_high_i32x4_u",
        0xE0 => "f32x4.abs",
        0xE1 => "f32x4.neg",
        0xE3 => "f32x4.sqrt",
        0xE4 => "f32x4.add",
        0xE5 => "f32x4.sub",
        0xE6 => "f32x4.mul",
        0xE7 => "f32x4.div",
        0xE8 => "f32x4.min",
        0xE9 => "f32x4.max",
        0xEA => "f32x4.pmin",
        0xEB => "f32x4.pmax",
        0xEC => "f64x2.abs",
        0xED => "f64x2.neg",
        0xEF => "f64x2.sqrt",
        0xF0 => "f64x2.add",
        0xF1 => "f64x2.sub",
        0xF2 => "f64x2.mul",
        0xF3 => "f64x2.div",
        0xF4 => "f64x2.min",
        0xF5 => "f64x2.max",
        0xF6 => "f64x2.pmin",
        0xF7 => "f64x2.pmax",
        0xF8 => "i32x4.trunc_sat_f32x4_s",
        0xF9 => "i32x4.trunc_sat_f32x4_u",
        0xFA => "f32x4.convert_i32x4_s",
        0xFB => "f32x4.convert_i32x4_u",
        0xFC => "i32x4.trunc_sat_f64x2_s_zero",
        0xFD => "i32x4.trunc_sat_f64x2_u_zero",
        0xFE => "f64x2.convert_low_i32x4_s",
        0xFF => "f64x2.convert_low_i32x4_u",
        _ => return None,
    };

    Some(name)
}
