//! 32-bit standard encodings.

use crate::bits::{Bitfield, Seg};
use crate::decoder::{Instruction, Opcode};

pub const RD: Bitfield = Bitfield::unsigned(&[Seg::Bits(11, 7)]);
pub const RS1: Bitfield = Bitfield::unsigned(&[Seg::Bits(19, 15)]);
pub const RS2: Bitfield = Bitfield::unsigned(&[Seg::Bits(24, 20)]);
pub const FUNCT3: Bitfield = Bitfield::unsigned(&[Seg::Bits(14, 12)]);
pub const FUNCT7: Bitfield = Bitfield::unsigned(&[Seg::Bits(31, 25)]);
pub const FUNCT6: Bitfield = Bitfield::unsigned(&[Seg::Bits(31, 26)]);
pub const MAJOR: Bitfield = Bitfield::unsigned(&[Seg::Bits(6, 0)]);

pub const I_IMM: Bitfield = Bitfield::signed(&[Seg::Bits(31, 20)]);
pub const S_IMM: Bitfield = Bitfield::signed(&[Seg::Bits(31, 25), Seg::Bits(11, 7)]);
pub const B_IMM: Bitfield = Bitfield::signed(&[
    Seg::Bits(31, 31),
    Seg::Bits(7, 7),
    Seg::Bits(30, 25),
    Seg::Bits(11, 8),
    Seg::Zeros(1),
]);
pub const U_IMM: Bitfield = Bitfield::signed(&[Seg::Bits(31, 12), Seg::Zeros(12)]);
pub const J_IMM: Bitfield = Bitfield::signed(&[
    Seg::Bits(31, 31),
    Seg::Bits(19, 12),
    Seg::Bits(20, 20),
    Seg::Bits(30, 21),
    Seg::Zeros(1),
]);
pub const CSR: Bitfield = Bitfield::unsigned(&[Seg::Bits(31, 20)]);
pub const SHAMT: Bitfield = Bitfield::unsigned(&[Seg::Bits(25, 20)]);
pub const SHAMTW: Bitfield = Bitfield::unsigned(&[Seg::Bits(24, 20)]);

// Major opcodes (bits 6:0)
pub const LOAD: u32 = 0b0000011;
pub const LOAD_FP: u32 = 0b0000111;
pub const MISC_MEM: u32 = 0b0001111;
pub const OP_IMM: u32 = 0b0010011;
pub const AUIPC: u32 = 0b0010111;
pub const OP_IMM_32: u32 = 0b0011011;
pub const STORE: u32 = 0b0100011;
pub const STORE_FP: u32 = 0b0100111;
pub const AMO: u32 = 0b0101111;
pub const OP: u32 = 0b0110011;
pub const LUI: u32 = 0b0110111;
pub const OP_32: u32 = 0b0111011;
pub const MADD: u32 = 0b1000011;
pub const MSUB: u32 = 0b1000111;
pub const NMSUB: u32 = 0b1001011;
pub const NMADD: u32 = 0b1001111;
pub const OP_FP: u32 = 0b1010011;
pub const OP_V: u32 = 0b1010111;
pub const BRANCH: u32 = 0b1100011;
pub const JALR: u32 = 0b1100111;
pub const JAL: u32 = 0b1101111;
pub const SYSTEM: u32 = 0b1110011;

/// Fields shared by every class, pulled out once.
#[derive(Debug, Clone, Copy)]
struct Fields {
    rd: u8,
    rs1: u8,
    rs2: u8,
    funct3: u32,
    funct7: u32,
}

impl Fields {
    fn new(bits: u32) -> Self {
        Self {
            rd: RD.get(bits) as u8,
            rs1: RS1.get(bits) as u8,
            rs2: RS2.get(bits) as u8,
            funct3: FUNCT3.get(bits),
            funct7: FUNCT7.get(bits),
        }
    }

    fn insn(&self, opcode: Opcode, imm: i64) -> Instruction {
        Instruction {
            opcode,
            length: 4,
            rd: self.rd,
            rs1: self.rs1,
            rs2: self.rs2,
            rs3: 0,
            imm,
            rm: 0,
        }
    }
}

pub fn decode(bits: u32) -> Instruction {
    let f = Fields::new(bits);
    let decoded = match MAJOR.get(bits) {
        LOAD => load(bits, &f),
        LOAD_FP => load_fp(bits, &f),
        MISC_MEM => misc_mem(bits, &f),
        OP_IMM => op_imm(bits, &f),
        AUIPC => Some(f.insn(Opcode::Auipc, U_IMM.extract(bits))),
        OP_IMM_32 => op_imm_32(bits, &f),
        STORE => store(bits, &f),
        STORE_FP => store_fp(bits, &f),
        AMO => amo(&f),
        OP => op(&f),
        LUI => Some(f.insn(Opcode::Lui, U_IMM.extract(bits))),
        OP_32 => op_32(&f),
        MADD | MSUB | NMSUB | NMADD => fused(MAJOR.get(bits), &f),
        OP_FP => op_fp(&f),
        OP_V => return Instruction::unimplemented(4),
        BRANCH => branch(bits, &f),
        JALR => (f.funct3 == 0).then(|| f.insn(Opcode::Jalr, I_IMM.extract(bits))),
        JAL => Some(f.insn(Opcode::Jal, J_IMM.extract(bits))),
        SYSTEM => system(bits, &f),
        _ => None,
    };
    decoded.unwrap_or_else(|| Instruction::illegal(4))
}

fn load(bits: u32, f: &Fields) -> Option<Instruction> {
    let op = match f.funct3 {
        0b000 => Opcode::Lb,
        0b001 => Opcode::Lh,
        0b010 => Opcode::Lw,
        0b011 => Opcode::Ld,
        0b100 => Opcode::Lbu,
        0b101 => Opcode::Lhu,
        0b110 => Opcode::Lwu,
        _ => return None,
    };
    Some(f.insn(op, I_IMM.extract(bits)))
}

fn load_fp(bits: u32, f: &Fields) -> Option<Instruction> {
    let op = match f.funct3 {
        0b010 => Opcode::Flw,
        0b011 => Opcode::Fld,
        _ => return None,
    };
    Some(f.insn(op, I_IMM.extract(bits)))
}

fn store(bits: u32, f: &Fields) -> Option<Instruction> {
    let op = match f.funct3 {
        0b000 => Opcode::Sb,
        0b001 => Opcode::Sh,
        0b010 => Opcode::Sw,
        0b011 => Opcode::Sd,
        _ => return None,
    };
    Some(f.insn(op, S_IMM.extract(bits)))
}

fn store_fp(bits: u32, f: &Fields) -> Option<Instruction> {
    let op = match f.funct3 {
        0b010 => Opcode::Fsw,
        0b011 => Opcode::Fsd,
        _ => return None,
    };
    Some(f.insn(op, S_IMM.extract(bits)))
}

fn misc_mem(bits: u32, f: &Fields) -> Option<Instruction> {
    match f.funct3 {
        0b000 => Some(f.insn(Opcode::Fence, CSR.extract(bits))),
        0b001 => Some(f.insn(Opcode::FenceI, 0)),
        _ => None,
    }
}

fn op_imm(bits: u32, f: &Fields) -> Option<Instruction> {
    let imm = I_IMM.extract(bits);
    let shamt = SHAMT.extract(bits);
    let funct6 = FUNCT6.get(bits);
    match f.funct3 {
        0b000 => Some(f.insn(Opcode::Addi, imm)),
        0b010 => Some(f.insn(Opcode::Slti, imm)),
        0b011 => Some(f.insn(Opcode::Sltiu, imm)),
        0b100 => Some(f.insn(Opcode::Xori, imm)),
        0b110 => Some(f.insn(Opcode::Ori, imm)),
        0b111 => Some(f.insn(Opcode::Andi, imm)),
        0b001 if funct6 == 0 => Some(f.insn(Opcode::Slli, shamt)),
        0b101 if funct6 == 0 => Some(f.insn(Opcode::Srli, shamt)),
        0b101 if funct6 == 0b010000 => Some(f.insn(Opcode::Srai, shamt)),
        _ => None,
    }
}

fn op_imm_32(bits: u32, f: &Fields) -> Option<Instruction> {
    let shamt = SHAMTW.extract(bits);
    match (f.funct3, f.funct7) {
        (0b000, _) => Some(f.insn(Opcode::Addiw, I_IMM.extract(bits))),
        (0b001, 0b0000000) => Some(f.insn(Opcode::Slliw, shamt)),
        (0b101, 0b0000000) => Some(f.insn(Opcode::Srliw, shamt)),
        (0b101, 0b0100000) => Some(f.insn(Opcode::Sraiw, shamt)),
        _ => None,
    }
}

fn op(f: &Fields) -> Option<Instruction> {
    let op = match (f.funct7, f.funct3) {
        (0b0000000, 0b000) => Opcode::Add,
        (0b0000000, 0b001) => Opcode::Sll,
        (0b0000000, 0b010) => Opcode::Slt,
        (0b0000000, 0b011) => Opcode::Sltu,
        (0b0000000, 0b100) => Opcode::Xor,
        (0b0000000, 0b101) => Opcode::Srl,
        (0b0000000, 0b110) => Opcode::Or,
        (0b0000000, 0b111) => Opcode::And,
        (0b0100000, 0b000) => Opcode::Sub,
        (0b0100000, 0b101) => Opcode::Sra,
        (0b0000001, 0b000) => Opcode::Mul,
        (0b0000001, 0b001) => Opcode::Mulh,
        (0b0000001, 0b010) => Opcode::Mulhsu,
        (0b0000001, 0b011) => Opcode::Mulhu,
        (0b0000001, 0b100) => Opcode::Div,
        (0b0000001, 0b101) => Opcode::Divu,
        (0b0000001, 0b110) => Opcode::Rem,
        (0b0000001, 0b111) => Opcode::Remu,
        _ => return None,
    };
    Some(f.insn(op, 0))
}

fn op_32(f: &Fields) -> Option<Instruction> {
    let op = match (f.funct7, f.funct3) {
        (0b0000000, 0b000) => Opcode::Addw,
        (0b0000000, 0b001) => Opcode::Sllw,
        (0b0000000, 0b101) => Opcode::Srlw,
        (0b0100000, 0b000) => Opcode::Subw,
        (0b0100000, 0b101) => Opcode::Sraw,
        (0b0000001, 0b000) => Opcode::Mulw,
        (0b0000001, 0b100) => Opcode::Divw,
        (0b0000001, 0b101) => Opcode::Divuw,
        (0b0000001, 0b110) => Opcode::Remw,
        (0b0000001, 0b111) => Opcode::Remuw,
        _ => return None,
    };
    Some(f.insn(op, 0))
}

fn branch(bits: u32, f: &Fields) -> Option<Instruction> {
    let op = match f.funct3 {
        0b000 => Opcode::Beq,
        0b001 => Opcode::Bne,
        0b100 => Opcode::Blt,
        0b101 => Opcode::Bge,
        0b110 => Opcode::Bltu,
        0b111 => Opcode::Bgeu,
        _ => return None,
    };
    Some(f.insn(op, B_IMM.extract(bits)))
}

fn system(bits: u32, f: &Fields) -> Option<Instruction> {
    let csr = CSR.extract(bits);
    let op = match f.funct3 {
        0b000 => return privileged(bits, f),
        0b001 => Opcode::Csrrw,
        0b010 => Opcode::Csrrs,
        0b011 => Opcode::Csrrc,
        0b101 => Opcode::Csrrwi,
        0b110 => Opcode::Csrrsi,
        0b111 => Opcode::Csrrci,
        _ => return None,
    };
    Some(f.insn(op, csr))
}

fn privileged(bits: u32, f: &Fields) -> Option<Instruction> {
    if f.rd != 0 {
        return None;
    }
    if f.funct7 == 0b0001001 {
        return Some(f.insn(Opcode::SfenceVma, 0));
    }
    if f.rs1 != 0 {
        return None;
    }
    let op = match CSR.get(bits) {
        0x000 => Opcode::Ecall,
        0x001 => Opcode::Ebreak,
        0x102 => Opcode::Sret,
        0x302 => Opcode::Mret,
        0x105 => Opcode::Wfi,
        _ => return None,
    };
    Some(Instruction { opcode: op, length: 4, ..Instruction::default() })
}

/// A extension. The two low bits of funct7 (aq/rl) travel in `imm`.
fn amo(f: &Fields) -> Option<Instruction> {
    use Opcode::*;
    let word = match f.funct3 {
        0b010 => true,
        0b011 => false,
        _ => return None,
    };
    let pick = |w: Opcode, d: Opcode| if word { w } else { d };
    let op = match f.funct7 >> 2 {
        0b00010 if f.rs2 != 0 => return None,
        0b00010 => pick(LrW, LrD),
        0b00011 => pick(ScW, ScD),
        0b00001 => pick(AmoswapW, AmoswapD),
        0b00000 => pick(AmoaddW, AmoaddD),
        0b00100 => pick(AmoxorW, AmoxorD),
        0b01100 => pick(AmoandW, AmoandD),
        0b01000 => pick(AmoorW, AmoorD),
        0b10000 => pick(AmominW, AmominD),
        0b10100 => pick(AmomaxW, AmomaxD),
        0b11000 => pick(AmominuW, AmominuD),
        0b11100 => pick(AmomaxuW, AmomaxuD),
        _ => return None,
    };
    Some(f.insn(op, (f.funct7 & 0b11) as i64))
}

fn fused(major: u32, f: &Fields) -> Option<Instruction> {
    use Opcode::*;
    let double = match f.funct7 & 0b11 {
        0b00 => false,
        0b01 => true,
        _ => return None,
    };
    let (s, d) = match major {
        MADD => (FmaddS, FmaddD),
        MSUB => (FmsubS, FmsubD),
        NMSUB => (FnmsubS, FnmsubD),
        NMADD => (FnmaddS, FnmaddD),
        _ => return None,
    };
    let mut insn = f.insn(if double { d } else { s }, 0);
    insn.rs3 = (f.funct7 >> 2) as u8;
    insn.rm = f.funct3 as u8;
    Some(insn)
}

/// OP-FP selects on the whole funct7; rs2 and funct3 act as extra opcode
/// bits for the unary, sign-injection, min/max, compare and move groups.
fn op_fp(f: &Fields) -> Option<Instruction> {
    use Opcode::*;
    let (rs2, funct3) = (f.rs2, f.funct3);
    let op = match f.funct7 {
        0b0000000 => FaddS,
        0b0000001 => FaddD,
        0b0000100 => FsubS,
        0b0000101 => FsubD,
        0b0001000 => FmulS,
        0b0001001 => FmulD,
        0b0001100 => FdivS,
        0b0001101 => FdivD,
        0b0101100 if rs2 == 0 => FsqrtS,
        0b0101101 if rs2 == 0 => FsqrtD,
        0b0010000 => match funct3 {
            0b000 => FsgnjS,
            0b001 => FsgnjnS,
            0b010 => FsgnjxS,
            _ => return None,
        },
        0b0010001 => match funct3 {
            0b000 => FsgnjD,
            0b001 => FsgnjnD,
            0b010 => FsgnjxD,
            _ => return None,
        },
        0b0010100 => match funct3 {
            0b000 => FminS,
            0b001 => FmaxS,
            _ => return None,
        },
        0b0010101 => match funct3 {
            0b000 => FminD,
            0b001 => FmaxD,
            _ => return None,
        },
        0b0100000 if rs2 == 0b00001 => FcvtSD,
        0b0100001 if rs2 == 0b00000 => FcvtDS,
        0b1100000 => match rs2 {
            0b00000 => FcvtWS,
            0b00001 => FcvtWuS,
            0b00010 => FcvtLS,
            0b00011 => FcvtLuS,
            _ => return None,
        },
        0b1100001 => match rs2 {
            0b00000 => FcvtWD,
            0b00001 => FcvtWuD,
            0b00010 => FcvtLD,
            0b00011 => FcvtLuD,
            _ => return None,
        },
        0b1110000 if rs2 == 0 => match funct3 {
            0b000 => FmvXW,
            0b001 => FclassS,
            _ => return None,
        },
        0b1110001 if rs2 == 0 => match funct3 {
            0b000 => FmvXD,
            0b001 => FclassD,
            _ => return None,
        },
        0b1010000 => match funct3 {
            0b000 => FleS,
            0b001 => FltS,
            0b010 => FeqS,
            _ => return None,
        },
        0b1010001 => match funct3 {
            0b000 => FleD,
            0b001 => FltD,
            0b010 => FeqD,
            _ => return None,
        },
        0b1101000 => match rs2 {
            0b00000 => FcvtSW,
            0b00001 => FcvtSWu,
            0b00010 => FcvtSL,
            0b00011 => FcvtSLu,
            _ => return None,
        },
        0b1101001 => match rs2 {
            0b00000 => FcvtDW,
            0b00001 => FcvtDWu,
            0b00010 => FcvtDL,
            0b00011 => FcvtDLu,
            _ => return None,
        },
        0b1111000 if rs2 == 0 && funct3 == 0 => FmvWX,
        0b1111001 if rs2 == 0 && funct3 == 0 => FmvDX,
        _ => return None,
    };
    let mut insn = f.insn(op, 0);
    insn.rm = funct3 as u8;
    Some(insn)
}
