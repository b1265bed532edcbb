//! Data-driven bitfield extraction.
//!
//! RISC-V scatters immediate bits across the instruction word in an order
//! unrelated to their significance. A [`Bitfield`] is an ordered list of
//! [`Seg`] descriptors: the first descriptor supplies the most significant
//! bits of the result. Every immediate shape in the decoder is one constant
//! descriptor list fed through the same routine.

use bitvec::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seg {
    /// Bits `hi..=lo` of the word.
    Bits(u8, u8),
    /// `n` zero bits, used for scaled displacements.
    Zeros(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitfield {
    segs: &'static [Seg],
    signed: bool,
}

impl Bitfield {
    pub const fn unsigned(segs: &'static [Seg]) -> Self {
        Self { segs, signed: false }
    }

    /// Sign-extends from the most significant assembled bit.
    pub const fn signed(segs: &'static [Seg]) -> Self {
        Self { segs, signed: true }
    }

    /// Number of bits in the assembled value, zero runs included.
    pub const fn width(&self) -> u32 {
        let mut total = 0;
        let mut i = 0;
        while i < self.segs.len() {
            total += match self.segs[i] {
                Seg::Bits(hi, lo) => (hi - lo + 1) as u32,
                Seg::Zeros(n) => n as u32,
            };
            i += 1;
        }
        total
    }

    pub fn extract(&self, word: u32) -> i64 {
        let bits = word.view_bits::<Lsb0>();
        let mut acc = 0u64;
        for seg in self.segs {
            match *seg {
                Seg::Bits(hi, lo) => {
                    let (hi, lo) = (hi as usize, lo as usize);
                    let part: u32 = bits[lo..=hi].load_le();
                    acc = (acc << (hi - lo + 1)) | part as u64;
                }
                Seg::Zeros(n) => acc <<= n,
            }
        }
        let width = self.width();
        if self.signed && width > 0 && width < 64 {
            let shift = 64 - width;
            ((acc << shift) as i64) >> shift
        } else {
            acc as i64
        }
    }

    /// Unsigned view for register indices and selector fields.
    pub fn get(&self, word: u32) -> u32 {
        self.extract(word) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW_NIBBLE: Bitfield = Bitfield::unsigned(&[Seg::Bits(3, 0)]);
    const SWAPPED: Bitfield = Bitfield::unsigned(&[Seg::Bits(3, 0), Seg::Bits(7, 4)]);
    const SCALED: Bitfield = Bitfield::unsigned(&[Seg::Bits(1, 0), Seg::Zeros(3)]);
    const SIGNED12: Bitfield = Bitfield::signed(&[Seg::Bits(31, 20)]);
    const SIGNED_SCALED: Bitfield = Bitfield::signed(&[Seg::Bits(7, 7), Seg::Bits(3, 0), Seg::Zeros(1)]);

    #[test]
    fn contiguous_range() {
        assert_eq!(LOW_NIBBLE.extract(0xABCD), 0xD);
        assert_eq!(LOW_NIBBLE.width(), 4);
    }

    #[test]
    fn first_descriptor_is_most_significant() {
        assert_eq!(SWAPPED.extract(0x12), 0x21);
    }

    #[test]
    fn zero_run_scales() {
        assert_eq!(SCALED.extract(0b11), 0b11000);
        assert_eq!(SCALED.width(), 5);
    }

    #[test]
    fn sign_extension_from_top_bit() {
        assert_eq!(SIGNED12.extract(0xFFF0_0000), -1);
        assert_eq!(SIGNED12.extract(0x8000_0000), -2048);
        assert_eq!(SIGNED12.extract(0x7FF0_0000), 2047);
    }

    #[test]
    fn sign_extension_after_zero_run() {
        // sign bit 7 set, low nibble 0x1, one zero bit: 0b1_0001_0 = -30
        assert_eq!(SIGNED_SCALED.extract(0x81), -30);
        assert_eq!(SIGNED_SCALED.extract(0x01), 2);
    }

    #[test]
    fn extraction_is_deterministic() {
        for w in [0u32, 1, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(SIGNED12.extract(w), SIGNED12.extract(w));
        }
    }
}
