use anyhow::{anyhow, Context, Result};
use riscv_decode::Bus;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: u64,
    pub bytes: Vec<u8>,
    pub perms: &'static str, // e.g., "r-x"
    pub kind: &'static str,  // e.g., "raw"
}

impl Segment {
    pub fn end(&self) -> u64 {
        self.base.wrapping_add(self.bytes.len() as u64)
    }

    fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    pub segments: Vec<Segment>,
}

impl Image {
    pub fn single(base: u64, bytes: Vec<u8>) -> Self {
        let seg = Segment { name: "segment0".into(), base, bytes, perms: "r-x", kind: "raw" };
        Image { segments: vec![seg] }
    }
}

pub fn load_raw_bin(path: &Path, base: u64, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    Ok(Image::single(base, payload.to_vec()))
}

pub fn read_u8(img: &Image, addr: u64) -> Option<u8> {
    img.segments
        .iter()
        .find(|s| s.contains(addr))
        .map(|s| s.bytes[(addr - s.base) as usize])
}

pub fn read_u16(img: &Image, addr: u64) -> Option<u16> {
    let b0 = read_u8(img, addr)?;
    let b1 = read_u8(img, addr.wrapping_add(1))?;
    Some(u16::from_le_bytes([b0, b1]))
}

pub fn is_mapped(img: &Image, addr: u64) -> bool {
    img.segments.iter().any(|s| s.contains(addr))
}

impl Bus for &Image {
    fn fetch_u16(&mut self, addr: u64) -> Result<u16> {
        read_u16(self, addr).ok_or_else(|| anyhow!("unmapped address {addr:#x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let path = std::env::temp_dir().join(format!("_riscv_disasm_{}.bin", std::process::id()));
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();
        let img = load_raw_bin(&path, 0x1000_0000, 2, Some(3)).unwrap();
        assert_eq!(img.segments.len(), 1);
        let s = &img.segments[0];
        assert_eq!(s.base, 0x1000_0000);
        assert_eq!(s.bytes, vec![2, 3, 4]);
        assert_eq!(read_u16(&img, 0x1000_0000).unwrap(), 0x0302);
        assert!(read_u16(&img, 0x1000_0002).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn image_is_a_fetch_bus() {
        let img = Image::single(0x80, vec![0x01, 0x00]);
        let mut bus = &img;
        assert_eq!(bus.fetch_u16(0x80).unwrap(), 0x0001);
        assert!(bus.fetch_u16(0x82).is_err());
        assert!(is_mapped(&img, 0x81));
        assert!(!is_mapped(&img, 0x7f));
    }
}
