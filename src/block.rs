//! Basic-block assembly on top of the decoder.

use anyhow::Error;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::BlockConfig;
use crate::decoder::{Decoder, Instruction};
use crate::instructions::Flow;
use crate::memory::Bus;

#[derive(thiserror::Error, Debug)]
pub enum Fault {
    #[error("Instruction address misaligned at {pc:#x}")]
    Misaligned { pc: u64 },
    #[error("Fetch fault at {addr:#x}: {source}")]
    Fetch {
        addr: u64,
        #[source]
        source: Error,
    },
}

/// Why a block stopped growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Terminator {
    /// Last instruction may transfer control (see [`Flow`]).
    ControlFlow(Flow),
    SizeLimit,
    PageBoundary,
    /// The next instruction could not be fetched.
    FetchFault,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicBlock {
    pub start: u64,
    /// One past the last byte of the last instruction.
    pub end: u64,
    pub insns: Vec<Instruction>,
    pub terminator: Terminator,
}

impl BasicBlock {
    /// Instructions paired with their addresses.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Instruction)> + '_ {
        self.insns.iter().scan(self.start, |pc, insn| {
            let at = *pc;
            *pc = pc.wrapping_add(insn.length as u64);
            Some((at, insn))
        })
    }

    pub fn last(&self) -> Option<(u64, &Instruction)> {
        self.iter().last()
    }

    pub fn len(&self) -> usize {
        self.insns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }
}

pub struct BlockBuilder<D: Decoder> {
    dec: D,
    cfg: BlockConfig,
}

impl<D: Decoder> BlockBuilder<D> {
    pub fn new(dec: D, cfg: BlockConfig) -> Self {
        Self { dec, cfg }
    }

    /// Fetch one instruction. The upper half-word is only read for 32-bit
    /// encodings, so a compressed instruction at the end of mapped memory
    /// never faults on the bytes after it.
    pub fn fetch<B: Bus>(&self, bus: &mut B, pc: u64) -> Result<Instruction, Fault> {
        if pc & 1 != 0 {
            return Err(Fault::Misaligned { pc });
        }
        let lo = bus
            .fetch_u16(pc)
            .map_err(|source| Fault::Fetch { addr: pc, source })?;
        let mut bits = lo as u32;
        if lo & 0b11 == 0b11 && lo & 0b11111 != 0b11111 {
            let addr = pc.wrapping_add(2);
            let hi = bus
                .fetch_u16(addr)
                .map_err(|source| Fault::Fetch { addr, source })?;
            bits |= (hi as u32) << 16;
        }
        let insn = self.dec.decode(bits);
        trace!(pc = format_args!("{pc:#x}"), bits = format_args!("{bits:#010x}"), op = ?insn.opcode, "decoded");
        Ok(insn)
    }

    /// Decode straight-line code starting at `pc`.
    ///
    /// The block always holds at least one instruction. A fault on the first
    /// fetch is returned; a fault on a later fetch ends the block just before
    /// the faulting address, leaving the fault to be raised when execution
    /// actually reaches it.
    pub fn build<B: Bus>(&self, bus: &mut B, pc: u64) -> Result<BasicBlock, Fault> {
        let start = pc;
        let mut pc = pc;
        let mut insns = Vec::new();
        let page_mask = !(self.cfg.page_size.wrapping_sub(1));

        let terminator = loop {
            let insn = match self.fetch(bus, pc) {
                Ok(insn) => insn,
                Err(fault) if insns.is_empty() => return Err(fault),
                Err(fault) => {
                    debug!(%fault, "block cut short by fetch fault");
                    break Terminator::FetchFault;
                }
            };
            insns.push(insn);
            pc = pc.wrapping_add(insn.length as u64);

            let flow = insn.opcode.flow();
            if flow == Flow::Trap {
                warn!(pc = format_args!("{:#x}", pc.wrapping_sub(insn.length as u64)), op = ?insn.opcode, "block ends in undecodable instruction");
            }
            if insn.opcode.ends_block() {
                break Terminator::ControlFlow(flow);
            }
            if insns.len() >= self.cfg.max_instructions {
                break Terminator::SizeLimit;
            }
            if self.cfg.stop_at_page_boundary && (pc & page_mask) != (start & page_mask) {
                break Terminator::PageBoundary;
            }
        };

        debug!(
            start = format_args!("{start:#x}"),
            end = format_args!("{pc:#x}"),
            len = insns.len(),
            ?terminator,
            "built block"
        );
        Ok(BasicBlock { start, end: pc, insns, terminator })
    }
}
