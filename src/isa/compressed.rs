//! 16-bit compressed encodings (RV64C).
//!
//! Each compressed instruction expands to the standard opcode it abbreviates,
//! with `length == 2`. Reserved encodings decode as illegal.

use crate::bits::{Bitfield, Seg};
use crate::decoder::{Instruction, Opcode};

pub const FUNCT3: Bitfield = Bitfield::unsigned(&[Seg::Bits(15, 13)]);
pub const RD: Bitfield = Bitfield::unsigned(&[Seg::Bits(11, 7)]);
pub const RS2: Bitfield = Bitfield::unsigned(&[Seg::Bits(6, 2)]);
/// rd'/rs2' (bits 4:2) and rs1'/rd' (bits 9:7) reach x8..x15 only.
pub const RDS: Bitfield = Bitfield::unsigned(&[Seg::Bits(4, 2)]);
pub const RS1S: Bitfield = Bitfield::unsigned(&[Seg::Bits(9, 7)]);
pub const RS2S: Bitfield = RDS;

// Quadrant 0 / memory displacements
pub const CIW_IMM: Bitfield = Bitfield::unsigned(&[
    Seg::Bits(10, 7),
    Seg::Bits(12, 11),
    Seg::Bits(5, 5),
    Seg::Bits(6, 6),
    Seg::Zeros(2),
]);
pub const CL_LW_IMM: Bitfield =
    Bitfield::unsigned(&[Seg::Bits(5, 5), Seg::Bits(12, 10), Seg::Bits(6, 6), Seg::Zeros(2)]);
pub const CL_LD_IMM: Bitfield = Bitfield::unsigned(&[Seg::Bits(6, 5), Seg::Bits(12, 10), Seg::Zeros(3)]);
pub const CS_SW_IMM: Bitfield = CL_LW_IMM;
pub const CS_SD_IMM: Bitfield = CL_LD_IMM;

// Quadrant 1
pub const CI_IMM: Bitfield = Bitfield::signed(&[Seg::Bits(12, 12), Seg::Bits(6, 2)]);
pub const CI_SHAMT: Bitfield = Bitfield::unsigned(&[Seg::Bits(12, 12), Seg::Bits(6, 2)]);
pub const CI_LUI_IMM: Bitfield = Bitfield::signed(&[Seg::Bits(12, 12), Seg::Bits(6, 2), Seg::Zeros(12)]);
pub const CI_ADDI16SP_IMM: Bitfield = Bitfield::signed(&[
    Seg::Bits(12, 12),
    Seg::Bits(4, 3),
    Seg::Bits(5, 5),
    Seg::Bits(2, 2),
    Seg::Bits(6, 6),
    Seg::Zeros(4),
]);
pub const CJ_IMM: Bitfield = Bitfield::signed(&[
    Seg::Bits(12, 12),
    Seg::Bits(8, 8),
    Seg::Bits(10, 9),
    Seg::Bits(6, 6),
    Seg::Bits(7, 7),
    Seg::Bits(2, 2),
    Seg::Bits(11, 11),
    Seg::Bits(5, 3),
    Seg::Zeros(1),
]);
pub const CB_IMM: Bitfield = Bitfield::signed(&[
    Seg::Bits(12, 12),
    Seg::Bits(6, 5),
    Seg::Bits(2, 2),
    Seg::Bits(11, 10),
    Seg::Bits(4, 3),
    Seg::Zeros(1),
]);

// Quadrant 2 / stack-pointer relative
pub const CI_LWSP_IMM: Bitfield =
    Bitfield::unsigned(&[Seg::Bits(3, 2), Seg::Bits(12, 12), Seg::Bits(6, 4), Seg::Zeros(2)]);
pub const CI_LDSP_IMM: Bitfield =
    Bitfield::unsigned(&[Seg::Bits(4, 2), Seg::Bits(12, 12), Seg::Bits(6, 5), Seg::Zeros(3)]);
pub const CSS_SWSP_IMM: Bitfield = Bitfield::unsigned(&[Seg::Bits(8, 7), Seg::Bits(12, 9), Seg::Zeros(2)]);
pub const CSS_SDSP_IMM: Bitfield = Bitfield::unsigned(&[Seg::Bits(9, 7), Seg::Bits(12, 10), Seg::Zeros(3)]);

const SP: u8 = 2;
const RA: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    Q0,
    Q1,
    Q2,
}

fn rd(bits: u32) -> u8 {
    RD.get(bits) as u8
}

fn rs2(bits: u32) -> u8 {
    RS2.get(bits) as u8
}

fn rds(bits: u32) -> u8 {
    RDS.get(bits) as u8 + 8
}

fn rs1s(bits: u32) -> u8 {
    RS1S.get(bits) as u8 + 8
}

fn rs2s(bits: u32) -> u8 {
    RS2S.get(bits) as u8 + 8
}

fn insn(opcode: Opcode, rd: u8, rs1: u8, rs2: u8, imm: i64) -> Instruction {
    Instruction { opcode, length: 2, rd, rs1, rs2, rs3: 0, imm, rm: 0 }
}

/// `raw` must not have both low bits set.
pub fn decode(raw: u16) -> Instruction {
    let bits = raw as u32;
    let quadrant = match bits & 0b11 {
        0b00 => Quadrant::Q0,
        0b01 => Quadrant::Q1,
        0b10 => Quadrant::Q2,
        _ => return Instruction::illegal(2),
    };
    let funct3 = FUNCT3.get(bits);
    let decoded = match quadrant {
        Quadrant::Q0 => quadrant0(bits, funct3),
        Quadrant::Q1 => quadrant1(bits, funct3),
        Quadrant::Q2 => quadrant2(bits, funct3),
    };
    decoded.unwrap_or_else(|| Instruction::illegal(2))
}

fn quadrant0(bits: u32, funct3: u32) -> Option<Instruction> {
    match funct3 {
        0b000 => {
            // C.ADDI4SPN; a zero immediate (including the all-zero word) is reserved
            let imm = CIW_IMM.extract(bits);
            (imm != 0).then(|| insn(Opcode::Addi, rds(bits), SP, 0, imm))
        }
        // C.FLD
        0b001 => Some(insn(Opcode::Fld, rds(bits), rs1s(bits), 0, CL_LD_IMM.extract(bits))),
        // C.LW
        0b010 => Some(insn(Opcode::Lw, rds(bits), rs1s(bits), 0, CL_LW_IMM.extract(bits))),
        // C.LD
        0b011 => Some(insn(Opcode::Ld, rds(bits), rs1s(bits), 0, CL_LD_IMM.extract(bits))),
        // C.FSD
        0b101 => Some(insn(Opcode::Fsd, 0, rs1s(bits), rs2s(bits), CS_SD_IMM.extract(bits))),
        // C.SW
        0b110 => Some(insn(Opcode::Sw, 0, rs1s(bits), rs2s(bits), CS_SW_IMM.extract(bits))),
        // C.SD
        0b111 => Some(insn(Opcode::Sd, 0, rs1s(bits), rs2s(bits), CS_SD_IMM.extract(bits))),
        _ => None,
    }
}

fn quadrant1(bits: u32, funct3: u32) -> Option<Instruction> {
    let rd = rd(bits);
    match funct3 {
        // C.ADDI, C.NOP when rd == 0
        0b000 => Some(insn(Opcode::Addi, rd, rd, 0, CI_IMM.extract(bits))),
        // C.ADDIW
        0b001 => (rd != 0).then(|| insn(Opcode::Addiw, rd, rd, 0, CI_IMM.extract(bits))),
        // C.LI
        0b010 => Some(insn(Opcode::Addi, rd, 0, 0, CI_IMM.extract(bits))),
        0b011 if rd == SP => {
            // C.ADDI16SP
            let imm = CI_ADDI16SP_IMM.extract(bits);
            (imm != 0).then(|| insn(Opcode::Addi, SP, SP, 0, imm))
        }
        0b011 => {
            // C.LUI
            let imm = CI_LUI_IMM.extract(bits);
            (imm != 0).then(|| insn(Opcode::Lui, rd, 0, 0, imm))
        }
        0b100 => misc_alu(bits),
        // C.J
        0b101 => Some(insn(Opcode::Jal, 0, 0, 0, CJ_IMM.extract(bits))),
        // C.BEQZ
        0b110 => Some(insn(Opcode::Beq, 0, rs1s(bits), 0, CB_IMM.extract(bits))),
        // C.BNEZ
        0b111 => Some(insn(Opcode::Bne, 0, rs1s(bits), 0, CB_IMM.extract(bits))),
        _ => None,
    }
}

/// Quadrant 1, funct3 100: shifts, andi and the register-register group.
fn misc_alu(bits: u32) -> Option<Instruction> {
    let rd = rs1s(bits);
    let funct2 = (bits >> 10) & 0b11;
    match funct2 {
        0b00 => Some(insn(Opcode::Srli, rd, rd, 0, CI_SHAMT.extract(bits))),
        0b01 => Some(insn(Opcode::Srai, rd, rd, 0, CI_SHAMT.extract(bits))),
        0b10 => Some(insn(Opcode::Andi, rd, rd, 0, CI_IMM.extract(bits))),
        _ => {
            let wide = bits & (1 << 12) != 0;
            let op = match (wide, (bits >> 5) & 0b11) {
                (false, 0b00) => Opcode::Sub,
                (false, 0b01) => Opcode::Xor,
                (false, 0b10) => Opcode::Or,
                (false, 0b11) => Opcode::And,
                (true, 0b00) => Opcode::Subw,
                (true, 0b01) => Opcode::Addw,
                _ => return None,
            };
            Some(insn(op, rd, rd, rs2s(bits), 0))
        }
    }
}

fn quadrant2(bits: u32, funct3: u32) -> Option<Instruction> {
    let rd = rd(bits);
    let rs2 = rs2(bits);
    match funct3 {
        // C.SLLI
        0b000 => Some(insn(Opcode::Slli, rd, rd, 0, CI_SHAMT.extract(bits))),
        // C.FLDSP
        0b001 => Some(insn(Opcode::Fld, rd, SP, 0, CI_LDSP_IMM.extract(bits))),
        // C.LWSP
        0b010 => (rd != 0).then(|| insn(Opcode::Lw, rd, SP, 0, CI_LWSP_IMM.extract(bits))),
        // C.LDSP
        0b011 => (rd != 0).then(|| insn(Opcode::Ld, rd, SP, 0, CI_LDSP_IMM.extract(bits))),
        0b100 => {
            let bit12 = bits & (1 << 12) != 0;
            match (bit12, rd, rs2) {
                // C.JR
                (false, 0, 0) => None,
                (false, rs1, 0) => Some(insn(Opcode::Jalr, 0, rs1, 0, 0)),
                // C.MV
                (false, rd, rs2) => Some(insn(Opcode::Add, rd, 0, rs2, 0)),
                // C.EBREAK
                (true, 0, 0) => Some(insn(Opcode::Ebreak, 0, 0, 0, 0)),
                // C.JALR
                (true, rs1, 0) => Some(insn(Opcode::Jalr, RA, rs1, 0, 0)),
                // C.ADD
                (true, rd, rs2) => Some(insn(Opcode::Add, rd, rd, rs2, 0)),
            }
        }
        // C.FSDSP
        0b101 => Some(insn(Opcode::Fsd, 0, SP, rs2, CSS_SDSP_IMM.extract(bits))),
        // C.SWSP
        0b110 => Some(insn(Opcode::Sw, 0, SP, rs2, CSS_SWSP_IMM.extract(bits))),
        // C.SDSP
        0b111 => Some(insn(Opcode::Sd, 0, SP, rs2, CSS_SDSP_IMM.extract(bits))),
        _ => None,
    }
}
