use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Instruction-fetch side of the memory system. Implementations perform any
/// translation; the block builder only asks for half-words.
pub trait Bus {
    fn fetch_u16(&mut self, addr: u64) -> Result<u16>;
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
    pub base: u64,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
            base: 0,
        }
    }

    pub fn with_bytes(base: u64, bytes: &[u8]) -> Self {
        Self {
            mem: bytes.to_vec(),
            base,
        }
    }

    fn offset(&self, addr: u64, len: usize) -> Result<usize> {
        let off = addr.wrapping_sub(self.base);
        ensure!(
            addr >= self.base && off.saturating_add(len as u64) <= self.mem.len() as u64,
            "address {addr:#x} outside [{:#x}, {:#x})",
            self.base,
            self.base.wrapping_add(self.mem.len() as u64)
        );
        Ok(off as usize)
    }

    pub fn write_u16(&mut self, addr: u64, val: u16) -> Result<()> {
        let off = self.offset(addr, 2)?;
        self.mem[off..off + 2].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    pub fn write_u32(&mut self, addr: u64, val: u32) -> Result<()> {
        let off = self.offset(addr, 4)?;
        self.mem[off..off + 4].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }
}

impl Bus for LinearMemory {
    fn fetch_u16(&mut self, addr: u64) -> Result<u16> {
        let off = self.offset(addr, 2)?;
        Ok(u16::from_le_bytes([self.mem[off], self.mem[off + 1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_is_little_endian_and_based() {
        let mut mem = LinearMemory::with_bytes(0x8000_0000, &[0x13, 0x05, 0xa0, 0x02]);
        assert_eq!(mem.fetch_u16(0x8000_0000).unwrap(), 0x0513);
        assert_eq!(mem.fetch_u16(0x8000_0002).unwrap(), 0x02a0);
    }

    #[test]
    fn out_of_range_fetch_is_an_error() {
        let mut mem = LinearMemory::new(4);
        assert!(mem.fetch_u16(3).is_err());
        assert!(mem.fetch_u16(u64::MAX).is_err());
        mem.base = 0x100;
        assert!(mem.fetch_u16(0).is_err());
    }
}
