pub mod bits;
pub mod block;
pub mod config;
pub mod decoder;
pub mod disasm;
pub mod instructions;
pub mod memory;

pub mod isa {
    pub mod compressed; // RV64C quadrants 0-2
    pub mod standard;
}

pub use block::{BasicBlock, BlockBuilder, Fault, Terminator};
pub use config::{BlockConfig, Config};
pub use decoder::{decode, AmoOrdering, Decoder, Instruction, Opcode, RoundingMode, Rv64Decoder};
pub use instructions::{AddrMode, Flow};
pub use memory::{Bus, LinearMemory};
