use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::isa::{compressed, standard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    #[default]
    Illegal,
    /// A valid encoding from an extension this decoder does not cover yet.
    Unimplemented,

    // RV64I loads and stores
    Lb,
    Lh,
    Lw,
    Ld,
    Lbu,
    Lhu,
    Lwu,
    Sb,
    Sh,
    Sw,
    Sd,

    // MISC-MEM
    Fence,
    FenceI,

    // OP-IMM / OP-IMM-32
    Addi,
    Slli,
    Slti,
    Sltiu,
    Xori,
    Srli,
    Srai,
    Ori,
    Andi,
    Addiw,
    Slliw,
    Srliw,
    Sraiw,

    // OP / OP-32
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
    Addw,
    Subw,
    Sllw,
    Srlw,
    Sraw,

    Lui,
    Auipc,

    // control transfer
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Jalr,
    Jal,

    // SYSTEM
    Ecall,
    Ebreak,
    Sret,
    Mret,
    Wfi,
    SfenceVma,
    Csrrw,
    Csrrs,
    Csrrc,
    Csrrwi,
    Csrrsi,
    Csrrci,

    // M extension
    Mul,
    Mulh,
    Mulhsu,
    Mulhu,
    Div,
    Divu,
    Rem,
    Remu,
    Mulw,
    Divw,
    Divuw,
    Remw,
    Remuw,

    // A extension
    LrW,
    ScW,
    AmoswapW,
    AmoaddW,
    AmoxorW,
    AmoandW,
    AmoorW,
    AmominW,
    AmomaxW,
    AmominuW,
    AmomaxuW,
    LrD,
    ScD,
    AmoswapD,
    AmoaddD,
    AmoxorD,
    AmoandD,
    AmoorD,
    AmominD,
    AmomaxD,
    AmominuD,
    AmomaxuD,

    // F extension
    Flw,
    Fsw,
    FaddS,
    FsubS,
    FmulS,
    FdivS,
    FsqrtS,
    FsgnjS,
    FsgnjnS,
    FsgnjxS,
    FminS,
    FmaxS,
    FcvtWS,
    FcvtWuS,
    FcvtLS,
    FcvtLuS,
    FmvXW,
    FclassS,
    FeqS,
    FltS,
    FleS,
    FcvtSW,
    FcvtSWu,
    FcvtSL,
    FcvtSLu,
    FmvWX,
    FmaddS,
    FmsubS,
    FnmsubS,
    FnmaddS,

    // D extension
    Fld,
    Fsd,
    FaddD,
    FsubD,
    FmulD,
    FdivD,
    FsqrtD,
    FsgnjD,
    FsgnjnD,
    FsgnjxD,
    FminD,
    FmaxD,
    FcvtSD,
    FcvtDS,
    FcvtWD,
    FcvtWuD,
    FcvtLD,
    FcvtLuD,
    FmvXD,
    FclassD,
    FeqD,
    FltD,
    FleD,
    FcvtDW,
    FcvtDWu,
    FcvtDL,
    FcvtDLu,
    FmvDX,
    FmaddD,
    FmsubD,
    FnmsubD,
    FnmaddD,
}

/// One decoded instruction. Fields an opcode does not use stay zero and
/// carry no meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub length: u8, // 2 or 4
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub rs3: u8,
    pub imm: i64,
    pub rm: u8,
}

impl Instruction {
    pub fn illegal(length: u8) -> Self {
        Self { length, ..Self::default() }
    }

    pub fn unimplemented(length: u8) -> Self {
        Self { opcode: Opcode::Unimplemented, length, ..Self::default() }
    }

    pub fn is_illegal(&self) -> bool {
        self.opcode == Opcode::Illegal
    }

    pub fn is_compressed(&self) -> bool {
        self.length == 2
    }

    /// Acquire/release bits of an atomic; empty for anything else.
    pub fn amo_ordering(&self) -> AmoOrdering {
        if self.opcode.is_atomic() {
            AmoOrdering::from_bits_truncate(self.imm as u8)
        } else {
            AmoOrdering::empty()
        }
    }

    pub fn rounding_mode(&self) -> Option<RoundingMode> {
        RoundingMode::from_bits(self.rm)
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmoOrdering: u8 {
const RL = 1 << 0; // release, funct7 bit 0
const AQ = 1 << 1; // acquire, funct7 bit 1
}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingMode {
    Rne,
    Rtz,
    Rdn,
    Rup,
    Rmm,
    Dyn,
}

impl RoundingMode {
    /// 5 and 6 are reserved.
    pub fn from_bits(rm: u8) -> Option<Self> {
        match rm {
            0b000 => Some(Self::Rne),
            0b001 => Some(Self::Rtz),
            0b010 => Some(Self::Rdn),
            0b011 => Some(Self::Rup),
            0b100 => Some(Self::Rmm),
            0b111 => Some(Self::Dyn),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rne => "rne",
            Self::Rtz => "rtz",
            Self::Rdn => "rdn",
            Self::Rup => "rup",
            Self::Rmm => "rmm",
            Self::Dyn => "dyn",
        }
    }
}

pub trait Decoder {
    fn decode(&self, bits: u32) -> Instruction;
}

/// RV64GC decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rv64Decoder;

impl Rv64Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Rv64Decoder {
    fn decode(&self, bits: u32) -> Instruction {
        decode(bits)
    }
}

/// Decode the instruction whose first half-word is the low 16 bits of
/// `bits`. Only the low 16 bits are read for compressed encodings.
pub fn decode(bits: u32) -> Instruction {
    if bits & 0b11 != 0b11 {
        return compressed::decode(bits as u16);
    }
    if bits & 0b11111 == 0b11111 {
        // Encodings longer than 32 bits are not supported.
        return Instruction::illegal(2);
    }
    standard::decode(bits)
}
