use pretty_assertions::assert_eq;
use riscv_decode::{decode, Instruction, Opcode};

fn c(opcode: Opcode, rd: u8, rs1: u8, rs2: u8, imm: i64) -> Instruction {
    Instruction { opcode, length: 2, rd, rs1, rs2, rs3: 0, imm, rm: 0 }
}

#[test]
fn c_fld_zero_displacement() {
    assert_eq!(decode(0x2000), c(Opcode::Fld, 8, 8, 0, 0));
}

#[test]
fn c_fldsp_zero_displacement() {
    assert_eq!(decode(0x2402), c(Opcode::Fld, 8, 2, 0, 0));
}

#[test]
fn float_loads_and_stores() {
    // c.fld fs1, 248(s0)
    assert_eq!(decode(0x3c64), c(Opcode::Fld, 9, 8, 0, 248));
    // c.fsd fa0, 16(a1)
    assert_eq!(decode(0xa988), c(Opcode::Fsd, 0, 11, 10, 16));
    // c.fldsp fa0, 504(sp)
    assert_eq!(decode(0x357e), c(Opcode::Fld, 10, 2, 0, 504));
    // c.fsdsp fs0, 504(sp)
    assert_eq!(decode(0xbfa2), c(Opcode::Fsd, 0, 2, 8, 504));
}

#[test]
fn quadrant0_integer_memory() {
    // c.addi4spn a0, sp, 16 / s0, sp, 1020
    assert_eq!(decode(0x0808), c(Opcode::Addi, 10, 2, 0, 16));
    assert_eq!(decode(0x1fe0), c(Opcode::Addi, 8, 2, 0, 1020));
    // c.lw a0, 0(a1) / 124(a1)
    assert_eq!(decode(0x4188), c(Opcode::Lw, 10, 11, 0, 0));
    assert_eq!(decode(0x5de8), c(Opcode::Lw, 10, 11, 0, 124));
    // c.ld a0, 248(a1)
    assert_eq!(decode(0x7de8), c(Opcode::Ld, 10, 11, 0, 248));
    // c.sw a0, 4(a1)
    assert_eq!(decode(0xc1c8), c(Opcode::Sw, 0, 11, 10, 4));
    // c.sd s1, 8(s0)
    assert_eq!(decode(0xe404), c(Opcode::Sd, 0, 8, 9, 8));
}

#[test]
fn quadrant1_immediates() {
    assert_eq!(decode(0x0505), c(Opcode::Addi, 10, 10, 0, 1));
    assert_eq!(decode(0x1501), c(Opcode::Addi, 10, 10, 0, -32));
    // c.nop
    assert_eq!(decode(0x0001), c(Opcode::Addi, 0, 0, 0, 0));
    // c.addiw a0, -1
    assert_eq!(decode(0x357d), c(Opcode::Addiw, 10, 10, 0, -1));
    // c.li a0, -1 and the x0 hint form
    assert_eq!(decode(0x557d), c(Opcode::Addi, 10, 0, 0, -1));
    assert_eq!(decode(0x4015), c(Opcode::Addi, 0, 0, 0, 5));
    // c.lui a0, 1 / s0, 0xfffff
    assert_eq!(decode(0x6505), c(Opcode::Lui, 10, 0, 0, 0x1000));
    assert_eq!(decode(0x747d), c(Opcode::Lui, 8, 0, 0, -4096));
    // c.addi16sp sp, -64 / 496
    assert_eq!(decode(0x7139), c(Opcode::Addi, 2, 2, 0, -64));
    assert_eq!(decode(0x617d), c(Opcode::Addi, 2, 2, 0, 496));
}

#[test]
fn quadrant1_alu() {
    assert_eq!(decode(0x8105), c(Opcode::Srli, 10, 10, 0, 1));
    assert_eq!(decode(0x957d), c(Opcode::Srai, 10, 10, 0, 63));
    assert_eq!(decode(0x997d), c(Opcode::Andi, 10, 10, 0, -1));
    assert_eq!(decode(0x8d0d), c(Opcode::Sub, 10, 10, 11, 0));
    assert_eq!(decode(0x8d2d), c(Opcode::Xor, 10, 10, 11, 0));
    assert_eq!(decode(0x8d4d), c(Opcode::Or, 10, 10, 11, 0));
    assert_eq!(decode(0x8d6d), c(Opcode::And, 10, 10, 11, 0));
    assert_eq!(decode(0x9d0d), c(Opcode::Subw, 10, 10, 11, 0));
    assert_eq!(decode(0x9d2d), c(Opcode::Addw, 10, 10, 11, 0));
}

#[test]
fn quadrant1_control_flow() {
    // c.j -2 / +2046 / -2048
    assert_eq!(decode(0xbffd), c(Opcode::Jal, 0, 0, 0, -2));
    assert_eq!(decode(0xaffd), c(Opcode::Jal, 0, 0, 0, 2046));
    assert_eq!(decode(0xb001), c(Opcode::Jal, 0, 0, 0, -2048));
    // c.beqz a0, -4
    assert_eq!(decode(0xdd75), c(Opcode::Beq, 0, 10, 0, -4));
    // c.bnez s0, +254 / -256
    assert_eq!(decode(0xec7d), c(Opcode::Bne, 0, 8, 0, 254));
    assert_eq!(decode(0xf001), c(Opcode::Bne, 0, 8, 0, -256));
}

#[test]
fn quadrant2() {
    assert_eq!(decode(0x157e), c(Opcode::Slli, 10, 10, 0, 63));
    // c.lwsp a0, 252(sp)
    assert_eq!(decode(0x557e), c(Opcode::Lw, 10, 2, 0, 252));
    // c.ldsp ra, 8(sp) / s0, 504(sp)
    assert_eq!(decode(0x60a2), c(Opcode::Ld, 1, 2, 0, 8));
    assert_eq!(decode(0x747e), c(Opcode::Ld, 8, 2, 0, 504));
    // c.jr ra
    assert_eq!(decode(0x8082), c(Opcode::Jalr, 0, 1, 0, 0));
    // c.mv a0, a1
    assert_eq!(decode(0x852e), c(Opcode::Add, 10, 0, 11, 0));
    assert_eq!(decode(0x9002), c(Opcode::Ebreak, 0, 0, 0, 0));
    // c.jalr a0
    assert_eq!(decode(0x9502), c(Opcode::Jalr, 1, 10, 0, 0));
    assert_eq!(decode(0x952e), c(Opcode::Add, 10, 10, 11, 0));
    // c.swsp a0, 252(sp)
    assert_eq!(decode(0xdfaa), c(Opcode::Sw, 0, 2, 10, 252));
    // c.sdsp ra, 8(sp)
    assert_eq!(decode(0xe406), c(Opcode::Sd, 0, 2, 1, 8));
}

#[test]
fn reserved_encodings_are_illegal() {
    let reserved = [
        (0x0000, "all-zero word"),
        (0x8004, "quadrant 0 funct3 100"),
        (0x2005, "c.addiw with rd = 0"),
        (0x6501, "c.lui with zero immediate"),
        (0x6101, "c.addi16sp with zero immediate"),
        (0x9d4d, "c.subw/c.addw reserved slot 10"),
        (0x9d6d, "c.subw/c.addw reserved slot 11"),
        (0x4012, "c.lwsp with rd = 0"),
        (0x6002, "c.ldsp with rd = 0"),
        (0x8002, "c.jr with rs1 = 0"),
    ];
    for (bits, what) in reserved {
        assert_eq!(decode(bits), Instruction::illegal(2), "{what}: {bits:#06x}");
    }
}

#[test]
fn upper_half_is_ignored() {
    assert_eq!(decode(0xdead_0505), decode(0x0505));
}
