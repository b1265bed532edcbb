use pretty_assertions::assert_eq;
use riscv_decode::{
    BlockBuilder, BlockConfig, Fault, Flow, LinearMemory, Opcode, Rv64Decoder, Terminator,
};

const NOP: u32 = 0x0000_0013;

fn memory(base: u64, halves: &[u16]) -> LinearMemory {
    let bytes: Vec<u8> = halves.iter().flat_map(|h| h.to_le_bytes()).collect();
    LinearMemory::with_bytes(base, &bytes)
}

fn words(w: &[u32]) -> Vec<u16> {
    w.iter().flat_map(|w| [*w as u16, (*w >> 16) as u16]).collect()
}

fn builder(cfg: BlockConfig) -> BlockBuilder<Rv64Decoder> {
    BlockBuilder::new(Rv64Decoder::new(), cfg)
}

#[test]
fn ends_on_branch_with_mixed_widths() {
    // addi a0, a0, 1 ; c.addi a0, 1 ; beq a0, zero, +8 ; nop
    let mut halves = words(&[0x0015_0513]);
    halves.push(0x0505);
    halves.extend(words(&[0x0005_0463, NOP]));
    let mut mem = memory(0x8000_0000, &halves);

    let block = builder(BlockConfig::default()).build(&mut mem, 0x8000_0000).unwrap();
    assert_eq!(block.terminator, Terminator::ControlFlow(Flow::Branch));
    assert_eq!(block.start, 0x8000_0000);
    assert_eq!(block.end, 0x8000_000a);
    let pcs: Vec<u64> = block.iter().map(|(pc, _)| pc).collect();
    assert_eq!(pcs, vec![0x8000_0000, 0x8000_0004, 0x8000_0006]);
    let ops: Vec<Opcode> = block.insns.iter().map(|i| i.opcode).collect();
    assert_eq!(ops, vec![Opcode::Addi, Opcode::Addi, Opcode::Beq]);
    assert_eq!(block.insns[1].length, 2);
}

#[test]
fn size_limit() {
    let mut mem = memory(0, &words(&[NOP; 8]));
    let cfg = BlockConfig { max_instructions: 3, ..BlockConfig::default() };
    let block = builder(cfg).build(&mut mem, 0).unwrap();
    assert_eq!(block.terminator, Terminator::SizeLimit);
    assert_eq!((block.len(), block.end), (3, 12));
}

#[test]
fn page_boundary() {
    let mut mem = memory(0xff8, &words(&[NOP; 4]));
    let block = builder(BlockConfig::default()).build(&mut mem, 0xff8).unwrap();
    assert_eq!(block.terminator, Terminator::PageBoundary);
    assert_eq!((block.len(), block.end), (2, 0x1000));

    let cfg = BlockConfig { stop_at_page_boundary: false, ..BlockConfig::default() };
    let block = builder(cfg).build(&mut mem, 0xff8).unwrap();
    assert_eq!(block.terminator, Terminator::FetchFault);
    assert_eq!(block.len(), 4);
}

#[test]
fn instruction_straddling_a_page_ends_the_block() {
    // c.nop at 0xffc, then a 4-byte nop covering 0xffe..0x1002
    let mut halves = vec![0x0001];
    halves.extend(words(&[NOP, NOP]));
    let mut mem = memory(0xffc, &halves);
    let block = builder(BlockConfig::default()).build(&mut mem, 0xffc).unwrap();
    assert_eq!(block.terminator, Terminator::PageBoundary);
    assert_eq!((block.len(), block.end), (2, 0x1002));
}

#[test]
fn illegal_word_terminates_as_trap() {
    let mut mem = memory(0, &words(&[NOP, 0xffff_ffff, NOP]));
    let block = builder(BlockConfig::default()).build(&mut mem, 0).unwrap();
    assert_eq!(block.terminator, Terminator::ControlFlow(Flow::Trap));
    assert_eq!(block.len(), 2);
    // the reserved long encoding is 2 bytes wide
    assert_eq!(block.end, 6);
    assert!(block.last().map_or(false, |(_, i)| i.is_illegal()));
}

#[test]
fn system_instructions_end_blocks() {
    let mut mem = LinearMemory::new(64);
    mem.write_u32(0, 0x3005_10f3).unwrap(); // csrrw ra, mstatus, a0
    mem.write_u16(4, 0x0001).unwrap(); // c.nop
    let block = builder(BlockConfig::default()).build(&mut mem, 0).unwrap();
    assert_eq!(block.terminator, Terminator::ControlFlow(Flow::System));
    assert_eq!(block.len(), 1);
}

#[test]
fn misaligned_pc_faults() {
    let mut mem = memory(0, &words(&[NOP]));
    let err = builder(BlockConfig::default()).build(&mut mem, 1).unwrap_err();
    assert!(matches!(err, Fault::Misaligned { pc: 1 }), "{err}");
}

#[test]
fn first_fetch_fault_is_an_error() {
    let mut mem = memory(0x1000, &words(&[NOP]));
    let err = builder(BlockConfig::default()).build(&mut mem, 0x2000).unwrap_err();
    assert!(matches!(err, Fault::Fetch { addr: 0x2000, .. }), "{err}");

    // upper half of a 32-bit instruction is missing
    let mut mem = memory(0x1000, &[0x0013]);
    let err = builder(BlockConfig::default()).build(&mut mem, 0x1000).unwrap_err();
    assert!(matches!(err, Fault::Fetch { addr: 0x1002, .. }), "{err}");
}

#[test]
fn compressed_at_end_of_memory_does_not_overfetch() {
    let mut mem = memory(0x1000, &[0x0505, 0x0001]);
    let block = builder(BlockConfig::default()).build(&mut mem, 0x1000).unwrap();
    assert_eq!(block.terminator, Terminator::FetchFault);
    assert_eq!((block.len(), block.end), (2, 0x1004));
}

#[test]
fn single_fetch() {
    let mut mem = memory(0, &words(&[0x0032_02D3]));
    let insn = builder(BlockConfig::default()).fetch(&mut mem, 0).unwrap();
    assert_eq!(insn.opcode, Opcode::FaddS);
}
