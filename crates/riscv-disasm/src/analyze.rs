use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, info};

use riscv_decode::{BasicBlock, BlockBuilder, BlockConfig, Flow, Opcode, Rv64Decoder, Terminator};

use crate::model::{is_mapped, Image};

const RA: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Fallthrough,
    Branch,
    CondBranch,
    Call,
}

impl EdgeKind {
    pub fn short(self) -> &'static str {
        match self {
            EdgeKind::Fallthrough => "ft",
            EdgeKind::Branch => "br",
            EdgeKind::CondBranch => "cbr",
            EdgeKind::Call => "call",
        }
    }
}

/// Edge between block start addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: u64,
    pub to: u64,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionOut {
    pub entry: u64,
    pub blocks: Vec<u64>,
}

/// Result of exploring code reachable from a set of entry points.
///
/// Blocks are keyed by start address and may overlap when something jumps
/// into the middle of an already decoded run, the same way a translation
/// cache keys blocks by entry pc.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub blocks: BTreeMap<u64, BasicBlock>,
    pub edges: Vec<Edge>,
    /// Addresses of `ret`, `sret` and `mret`.
    pub returns: BTreeSet<u64>,
    /// Entry points plus every direct call target.
    pub roots: BTreeSet<u64>,
}

impl Analysis {
    pub fn instruction_count(&self) -> usize {
        self.blocks.values().map(BasicBlock::len).sum()
    }

    /// Blocks reachable from each root without following call edges.
    pub fn functions(&self) -> Vec<FunctionOut> {
        let mut adj: HashMap<u64, Vec<u64>> = HashMap::new();
        for e in self.edges.iter().filter(|e| e.kind != EdgeKind::Call) {
            adj.entry(e.from).or_default().push(e.to);
        }
        self.roots
            .iter()
            .filter(|r| self.blocks.contains_key(r))
            .map(|&entry| {
                let mut seen = BTreeSet::new();
                let mut q = VecDeque::from([entry]);
                while let Some(b) = q.pop_front() {
                    if !self.blocks.contains_key(&b) || !seen.insert(b) {
                        continue;
                    }
                    if let Some(nexts) = adj.get(&b) {
                        q.extend(nexts.iter().copied());
                    }
                }
                FunctionOut { entry, blocks: seen.into_iter().collect() }
            })
            .collect()
    }
}

/// Static successors of a finished block.
fn successors(block: &BasicBlock) -> Vec<Edge> {
    let from = block.start;
    let ft = Edge { from, to: block.end, kind: EdgeKind::Fallthrough };
    let Some((pc, last)) = block.last() else {
        return Vec::new();
    };
    let target = pc.wrapping_add(last.imm as u64);

    match block.terminator {
        Terminator::SizeLimit | Terminator::PageBoundary => vec![ft],
        Terminator::FetchFault => Vec::new(),
        Terminator::ControlFlow(Flow::Sequential) => vec![ft],
        Terminator::ControlFlow(Flow::Jump) if last.rd == 0 => {
            vec![Edge { from, to: target, kind: EdgeKind::Branch }]
        }
        Terminator::ControlFlow(Flow::Jump) => {
            vec![Edge { from, to: target, kind: EdgeKind::Call }, ft]
        }
        Terminator::ControlFlow(Flow::Branch) => {
            vec![Edge { from, to: target, kind: EdgeKind::CondBranch }, ft]
        }
        // Indirect call: callee unknown, execution resumes after it.
        Terminator::ControlFlow(Flow::Indirect) if last.rd != 0 => vec![ft],
        Terminator::ControlFlow(Flow::Indirect) => Vec::new(),
        Terminator::ControlFlow(Flow::System) => match last.opcode {
            Opcode::Sret | Opcode::Mret => Vec::new(),
            _ => vec![ft],
        },
        Terminator::ControlFlow(Flow::Trap) => Vec::new(),
    }
}

fn is_return(block: &BasicBlock) -> Option<u64> {
    let (pc, last) = block.last()?;
    let ret = match last.opcode {
        Opcode::Jalr => last.rd == 0 && last.rs1 == RA && last.imm == 0,
        Opcode::Sret | Opcode::Mret => true,
        _ => false,
    };
    ret.then_some(pc)
}

/// Worklist exploration from `entries`, decoding at most `max_blocks` blocks.
pub fn analyze_entries(img: &Image, entries: &[u64], cfg: &BlockConfig, max_blocks: usize) -> Analysis {
    let builder = BlockBuilder::new(Rv64Decoder::new(), *cfg);
    let mut bus = img;
    let mut out = Analysis::default();
    let mut queue: VecDeque<u64> = VecDeque::new();
    let mut queued: HashSet<u64> = HashSet::new();

    for &e in entries {
        out.roots.insert(e);
        if is_mapped(img, e) && queued.insert(e) {
            queue.push_back(e);
        }
    }

    while let Some(pc) = queue.pop_front() {
        if out.blocks.len() >= max_blocks {
            info!(max_blocks, "block limit reached, stopping");
            break;
        }
        let block = match builder.build(&mut bus, pc) {
            Ok(block) => block,
            Err(fault) => {
                debug!(%fault, "skipping undecodable block");
                continue;
            }
        };
        for edge in successors(&block) {
            if edge.kind == EdgeKind::Call {
                out.roots.insert(edge.to);
            }
            if is_mapped(img, edge.to) && queued.insert(edge.to) {
                queue.push_back(edge.to);
            }
            out.edges.push(edge);
        }
        if let Some(at) = is_return(&block) {
            out.returns.insert(at);
        }
        out.blocks.insert(block.start, block);
    }
    out
}
