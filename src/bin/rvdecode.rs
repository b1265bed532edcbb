use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use riscv_decode::disasm::fmt_at;
use riscv_decode::{Decoder, Rv64Decoder};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode RISC-V instruction words")]
struct Opts {
    /// Address of the first word, used to resolve pc-relative targets
    #[arg(long, default_value = "0")]
    pc: String,
    /// Print decoded records as JSON lines instead of assembly
    #[arg(long)]
    json: bool,
    /// Instruction words (hex with 0x prefix, or decimal). 16-bit words are
    /// decoded as compressed instructions.
    #[arg(value_name = "WORD", required = true)]
    words: Vec<String>,
}

fn parse_u64(s: &str) -> Result<u64> {
    let s = s.trim().replace('_', "");
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u64::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u64>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let dec = Rv64Decoder::new();
    let mut pc = parse_u64(&opts.pc).context("--pc")?;

    for word in &opts.words {
        let raw = parse_u64(word).with_context(|| format!("bad instruction word {word:?}"))?;
        anyhow::ensure!(raw <= u32::MAX as u64, "{word} does not fit in 32 bits");
        let bits = raw as u32;
        let d = dec.decode(bits);
        if opts.json {
            println!("{}", serde_json::to_string(&d)?);
        } else if d.is_compressed() {
            println!("{pc:#010x}: {:04x}      {}", bits & 0xFFFF, fmt_at(pc, &d));
        } else {
            println!("{pc:#010x}: {bits:08x}  {}", fmt_at(pc, &d));
        }
        pc = pc.wrapping_add(d.length as u64);
    }

    Ok(())
}
