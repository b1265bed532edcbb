use crate::decoder::{AmoOrdering, Instruction, RoundingMode};
use crate::instructions::AddrMode;

pub const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2",
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7",
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
];

pub const FREG_NAMES: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7",
    "fs0", "fs1", "fa0", "fa1", "fa2", "fa3", "fa4", "fa5",
    "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7",
    "fs8", "fs9", "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

pub fn register_name(reg: u8) -> &'static str {
    REG_NAMES[(reg & 31) as usize]
}

pub fn fp_register_name(reg: u8) -> &'static str {
    FREG_NAMES[(reg & 31) as usize]
}

/// Render without an address; pc-relative operands print as signed offsets.
pub fn fmt_instruction(d: &Instruction) -> String {
    render(d, None)
}

/// Render an instruction located at `pc`, resolving pc-relative targets.
pub fn fmt_at(pc: u64, d: &Instruction) -> String {
    render(d, Some(pc))
}

fn render(d: &Instruction, pc: Option<u64>) -> String {
    let x = register_name;
    let f = fp_register_name;
    let mn = mnemonic_with_suffix(d);
    let target = |imm: i64| match pc {
        Some(pc) => format!("{:#x}", pc.wrapping_add(imm as u64)),
        None => format!("{imm:+}"),
    };
    let operands = match d.opcode.mode() {
        AddrMode::None => String::new(),
        AddrMode::Reg => format!("{}, {}, {}", x(d.rd), x(d.rs1), x(d.rs2)),
        AddrMode::RegImm => format!("{}, {}, {}", x(d.rd), x(d.rs1), d.imm),
        AddrMode::Load => format!("{}, {}({})", x(d.rd), d.imm, x(d.rs1)),
        AddrMode::Store => format!("{}, {}({})", x(d.rs2), d.imm, x(d.rs1)),
        AddrMode::Upper => format!("{}, {:#x}", x(d.rd), (d.imm >> 12) & 0xF_FFFF),
        AddrMode::Jump => format!("{}, {}", x(d.rd), target(d.imm)),
        AddrMode::Branch => format!("{}, {}, {}", x(d.rs1), x(d.rs2), target(d.imm)),
        AddrMode::Csr => format!("{}, {:#x}, {}", x(d.rd), d.imm, x(d.rs1)),
        AddrMode::CsrImm => format!("{}, {:#x}, {}", x(d.rd), d.imm, d.rs1),
        AddrMode::Lr => format!("{}, ({})", x(d.rd), x(d.rs1)),
        AddrMode::Amo => format!("{}, {}, ({})", x(d.rd), x(d.rs2), x(d.rs1)),
        AddrMode::Fence => format!("{}, {}", fence_set(d.imm >> 4), fence_set(d.imm)),
        AddrMode::SfenceVma => format!("{}, {}", x(d.rs1), x(d.rs2)),
        AddrMode::FLoad => format!("{}, {}({})", f(d.rd), d.imm, x(d.rs1)),
        AddrMode::FStore => format!("{}, {}({})", f(d.rs2), d.imm, x(d.rs1)),
        AddrMode::FReg => format!("{}, {}, {}", f(d.rd), f(d.rs1), f(d.rs2)),
        AddrMode::FReg4 => format!("{}, {}, {}, {}", f(d.rd), f(d.rs1), f(d.rs2), f(d.rs3)),
        AddrMode::FUnary => format!("{}, {}", f(d.rd), f(d.rs1)),
        AddrMode::FToX => format!("{}, {}", x(d.rd), f(d.rs1)),
        AddrMode::XToF => format!("{}, {}", f(d.rd), x(d.rs1)),
        AddrMode::FCmp => format!("{}, {}, {}", x(d.rd), f(d.rs1), f(d.rs2)),
    };
    let mut out = if operands.is_empty() { mn } else { format!("{mn} {operands}") };
    if d.opcode.uses_rounding_mode() {
        match d.rounding_mode() {
            Some(RoundingMode::Dyn) => {}
            Some(rm) => {
                out.push_str(", ");
                out.push_str(rm.name());
            }
            None => out.push_str(&format!(", rm{}", d.rm)),
        }
    }
    out
}

fn mnemonic_with_suffix(d: &Instruction) -> String {
    let mut mn = d.opcode.mnemonic().to_string();
    if d.opcode.is_atomic() {
        let ord = d.amo_ordering();
        if ord.contains(AmoOrdering::AQ) {
            mn.push_str(".aq");
        }
        if ord.contains(AmoOrdering::RL) {
            mn.push_str(if ord.contains(AmoOrdering::AQ) { "rl" } else { ".rl" });
        }
    }
    mn
}

fn fence_set(bits: i64) -> String {
    let s: String = [(8, 'i'), (4, 'o'), (2, 'r'), (1, 'w')]
        .iter()
        .filter(|(mask, _)| bits & mask != 0)
        .map(|&(_, c)| c)
        .collect();
    if s.is_empty() { "0".to_string() } else { s }
}
