use serde::Serialize;

use crate::decoder::Opcode;

/// Operand layout, used to render and to reason about register usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddrMode {
    None,
    /// rd, rs1, rs2
    Reg,
    /// rd, rs1, imm
    RegImm,
    /// rd, imm(rs1)
    Load,
    /// rs2, imm(rs1)
    Store,
    /// rd, imm (upper immediate)
    Upper,
    /// rd, pc-relative target
    Jump,
    /// rs1, rs2, pc-relative target
    Branch,
    /// rd, csr, rs1
    Csr,
    /// rd, csr, uimm (in rs1)
    CsrImm,
    /// rd, (rs1)
    Lr,
    /// rd, rs2, (rs1)
    Amo,
    /// pred, succ
    Fence,
    /// rs1, rs2
    SfenceVma,
    /// frd, imm(rs1)
    FLoad,
    /// frs2, imm(rs1)
    FStore,
    /// frd, frs1, frs2
    FReg,
    /// frd, frs1, frs2, frs3
    FReg4,
    /// frd, frs1
    FUnary,
    /// rd, frs1
    FToX,
    /// frd, rs1
    XToF,
    /// rd, frs1, frs2
    FCmp,
}

/// How an instruction leaves the straight-line path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flow {
    Sequential,
    /// jal: statically known target.
    Jump,
    /// Conditional, statically known target plus fallthrough.
    Branch,
    /// jalr: target only known at run time.
    Indirect,
    /// Traps, privilege changes, CSR accesses and fences that invalidate
    /// translated code.
    System,
    /// Illegal or unimplemented: raises an exception when executed.
    Trap,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Opcode,
    pub mnemonic: &'static str,
    pub mode: AddrMode,
}

impl Opcode {
    pub fn desc(self) -> InstrDesc {
        let (mnemonic, mode) = describe(self);
        InstrDesc { op: self, mnemonic, mode }
    }

    pub fn mnemonic(self) -> &'static str {
        describe(self).0
    }

    pub fn mode(self) -> AddrMode {
        describe(self).1
    }

    pub fn flow(self) -> Flow {
        use Opcode::*;
        match self {
            Illegal | Unimplemented => Flow::Trap,
            Jal => Flow::Jump,
            Beq | Bne | Blt | Bge | Bltu | Bgeu => Flow::Branch,
            Jalr => Flow::Indirect,
            Ecall | Ebreak | Sret | Mret | Wfi | SfenceVma | FenceI | Csrrw | Csrrs | Csrrc
            | Csrrwi | Csrrsi | Csrrci => Flow::System,
            _ => Flow::Sequential,
        }
    }

    /// Whether executing this may leave the straight-line path.
    pub fn ends_block(self) -> bool {
        self.flow() != Flow::Sequential
    }

    pub fn is_atomic(self) -> bool {
        matches!(self.mode(), AddrMode::Lr | AddrMode::Amo)
    }

    /// Single- or double-precision FP data processing, i.e. opcodes whose
    /// `rm` field is meaningful.
    pub fn uses_rounding_mode(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            FaddS | FsubS | FmulS | FdivS | FsqrtS | FaddD | FsubD | FmulD | FdivD | FsqrtD
                | FcvtWS | FcvtWuS | FcvtLS | FcvtLuS | FcvtSW | FcvtSWu | FcvtSL | FcvtSLu
                | FcvtSD | FcvtDS | FcvtWD | FcvtWuD | FcvtLD | FcvtLuD | FcvtDW | FcvtDWu
                | FcvtDL | FcvtDLu | FmaddS | FmsubS | FnmsubS | FnmaddS | FmaddD | FmsubD
                | FnmsubD | FnmaddD
        )
    }
}

fn describe(op: Opcode) -> (&'static str, AddrMode) {
    use AddrMode as M;
    use Opcode::*;
    match op {
        Illegal => ("illegal", M::None),
        Unimplemented => ("unimplemented", M::None),

        Lb => ("lb", M::Load),
        Lh => ("lh", M::Load),
        Lw => ("lw", M::Load),
        Ld => ("ld", M::Load),
        Lbu => ("lbu", M::Load),
        Lhu => ("lhu", M::Load),
        Lwu => ("lwu", M::Load),
        Sb => ("sb", M::Store),
        Sh => ("sh", M::Store),
        Sw => ("sw", M::Store),
        Sd => ("sd", M::Store),

        Fence => ("fence", M::Fence),
        FenceI => ("fence.i", M::None),

        Addi => ("addi", M::RegImm),
        Slli => ("slli", M::RegImm),
        Slti => ("slti", M::RegImm),
        Sltiu => ("sltiu", M::RegImm),
        Xori => ("xori", M::RegImm),
        Srli => ("srli", M::RegImm),
        Srai => ("srai", M::RegImm),
        Ori => ("ori", M::RegImm),
        Andi => ("andi", M::RegImm),
        Addiw => ("addiw", M::RegImm),
        Slliw => ("slliw", M::RegImm),
        Srliw => ("srliw", M::RegImm),
        Sraiw => ("sraiw", M::RegImm),

        Add => ("add", M::Reg),
        Sub => ("sub", M::Reg),
        Sll => ("sll", M::Reg),
        Slt => ("slt", M::Reg),
        Sltu => ("sltu", M::Reg),
        Xor => ("xor", M::Reg),
        Srl => ("srl", M::Reg),
        Sra => ("sra", M::Reg),
        Or => ("or", M::Reg),
        And => ("and", M::Reg),
        Addw => ("addw", M::Reg),
        Subw => ("subw", M::Reg),
        Sllw => ("sllw", M::Reg),
        Srlw => ("srlw", M::Reg),
        Sraw => ("sraw", M::Reg),

        Lui => ("lui", M::Upper),
        Auipc => ("auipc", M::Upper),

        Beq => ("beq", M::Branch),
        Bne => ("bne", M::Branch),
        Blt => ("blt", M::Branch),
        Bge => ("bge", M::Branch),
        Bltu => ("bltu", M::Branch),
        Bgeu => ("bgeu", M::Branch),
        Jalr => ("jalr", M::Load),
        Jal => ("jal", M::Jump),

        Ecall => ("ecall", M::None),
        Ebreak => ("ebreak", M::None),
        Sret => ("sret", M::None),
        Mret => ("mret", M::None),
        Wfi => ("wfi", M::None),
        SfenceVma => ("sfence.vma", M::SfenceVma),
        Csrrw => ("csrrw", M::Csr),
        Csrrs => ("csrrs", M::Csr),
        Csrrc => ("csrrc", M::Csr),
        Csrrwi => ("csrrwi", M::CsrImm),
        Csrrsi => ("csrrsi", M::CsrImm),
        Csrrci => ("csrrci", M::CsrImm),

        Mul => ("mul", M::Reg),
        Mulh => ("mulh", M::Reg),
        Mulhsu => ("mulhsu", M::Reg),
        Mulhu => ("mulhu", M::Reg),
        Div => ("div", M::Reg),
        Divu => ("divu", M::Reg),
        Rem => ("rem", M::Reg),
        Remu => ("remu", M::Reg),
        Mulw => ("mulw", M::Reg),
        Divw => ("divw", M::Reg),
        Divuw => ("divuw", M::Reg),
        Remw => ("remw", M::Reg),
        Remuw => ("remuw", M::Reg),

        LrW => ("lr.w", M::Lr),
        ScW => ("sc.w", M::Amo),
        AmoswapW => ("amoswap.w", M::Amo),
        AmoaddW => ("amoadd.w", M::Amo),
        AmoxorW => ("amoxor.w", M::Amo),
        AmoandW => ("amoand.w", M::Amo),
        AmoorW => ("amoor.w", M::Amo),
        AmominW => ("amomin.w", M::Amo),
        AmomaxW => ("amomax.w", M::Amo),
        AmominuW => ("amominu.w", M::Amo),
        AmomaxuW => ("amomaxu.w", M::Amo),
        LrD => ("lr.d", M::Lr),
        ScD => ("sc.d", M::Amo),
        AmoswapD => ("amoswap.d", M::Amo),
        AmoaddD => ("amoadd.d", M::Amo),
        AmoxorD => ("amoxor.d", M::Amo),
        AmoandD => ("amoand.d", M::Amo),
        AmoorD => ("amoor.d", M::Amo),
        AmominD => ("amomin.d", M::Amo),
        AmomaxD => ("amomax.d", M::Amo),
        AmominuD => ("amominu.d", M::Amo),
        AmomaxuD => ("amomaxu.d", M::Amo),

        Flw => ("flw", M::FLoad),
        Fsw => ("fsw", M::FStore),
        FaddS => ("fadd.s", M::FReg),
        FsubS => ("fsub.s", M::FReg),
        FmulS => ("fmul.s", M::FReg),
        FdivS => ("fdiv.s", M::FReg),
        FsqrtS => ("fsqrt.s", M::FUnary),
        FsgnjS => ("fsgnj.s", M::FReg),
        FsgnjnS => ("fsgnjn.s", M::FReg),
        FsgnjxS => ("fsgnjx.s", M::FReg),
        FminS => ("fmin.s", M::FReg),
        FmaxS => ("fmax.s", M::FReg),
        FcvtWS => ("fcvt.w.s", M::FToX),
        FcvtWuS => ("fcvt.wu.s", M::FToX),
        FcvtLS => ("fcvt.l.s", M::FToX),
        FcvtLuS => ("fcvt.lu.s", M::FToX),
        FmvXW => ("fmv.x.w", M::FToX),
        FclassS => ("fclass.s", M::FToX),
        FeqS => ("feq.s", M::FCmp),
        FltS => ("flt.s", M::FCmp),
        FleS => ("fle.s", M::FCmp),
        FcvtSW => ("fcvt.s.w", M::XToF),
        FcvtSWu => ("fcvt.s.wu", M::XToF),
        FcvtSL => ("fcvt.s.l", M::XToF),
        FcvtSLu => ("fcvt.s.lu", M::XToF),
        FmvWX => ("fmv.w.x", M::XToF),
        FmaddS => ("fmadd.s", M::FReg4),
        FmsubS => ("fmsub.s", M::FReg4),
        FnmsubS => ("fnmsub.s", M::FReg4),
        FnmaddS => ("fnmadd.s", M::FReg4),

        Fld => ("fld", M::FLoad),
        Fsd => ("fsd", M::FStore),
        FaddD => ("fadd.d", M::FReg),
        FsubD => ("fsub.d", M::FReg),
        FmulD => ("fmul.d", M::FReg),
        FdivD => ("fdiv.d", M::FReg),
        FsqrtD => ("fsqrt.d", M::FUnary),
        FsgnjD => ("fsgnj.d", M::FReg),
        FsgnjnD => ("fsgnjn.d", M::FReg),
        FsgnjxD => ("fsgnjx.d", M::FReg),
        FminD => ("fmin.d", M::FReg),
        FmaxD => ("fmax.d", M::FReg),
        FcvtSD => ("fcvt.s.d", M::FUnary),
        FcvtDS => ("fcvt.d.s", M::FUnary),
        FcvtWD => ("fcvt.w.d", M::FToX),
        FcvtWuD => ("fcvt.wu.d", M::FToX),
        FcvtLD => ("fcvt.l.d", M::FToX),
        FcvtLuD => ("fcvt.lu.d", M::FToX),
        FmvXD => ("fmv.x.d", M::FToX),
        FclassD => ("fclass.d", M::FToX),
        FeqD => ("feq.d", M::FCmp),
        FltD => ("flt.d", M::FCmp),
        FleD => ("fle.d", M::FCmp),
        FcvtDW => ("fcvt.d.w", M::XToF),
        FcvtDWu => ("fcvt.d.wu", M::XToF),
        FcvtDL => ("fcvt.d.l", M::XToF),
        FcvtDLu => ("fcvt.d.lu", M::XToF),
        FmvDX => ("fmv.d.x", M::XToF),
        FmaddD => ("fmadd.d", M::FReg4),
        FmsubD => ("fmsub.d", M::FReg4),
        FnmsubD => ("fnmsub.d", M::FReg4),
        FnmaddD => ("fnmadd.d", M::FReg4),
    }
}
