use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use riscv_decode::disasm::fmt_at;
use riscv_decode::{BlockBuilder, BlockConfig, Config, Instruction, Rv64Decoder};

use riscv_disasm::analyze::{analyze_entries, Analysis, FunctionOut};
use riscv_disasm::model::{load_raw_bin, read_u8, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "RISC-V disassembler CLI", long_about=None)]
struct Cli {
    /// Load address for the binary in target address space (hex or dec)
    #[arg(long, default_value = "0")]
    base: String,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// JSON config file (block limits)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments (simple single-segment for raw .bin)
    Sections,
    /// Disassemble a range [start, end) in bytes
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Analyze code graph from entry points
    Analyze {
        /// Entry addresses (hex or dec). Repeat flag to add multiple entries.
        #[arg(long = "entry", value_name = "ADDR", num_args = 1..)]
        entries: Vec<String>,
        /// Maximum basic blocks to decode before stopping
        #[arg(long, default_value_t = 10_000usize)]
        max_blocks: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Emit a disassembly listing of analyzed blocks (text format only)
        #[arg(long)]
        listing: bool,
        /// Show instruction bytes in listings
        #[arg(long)]
        show_bytes: bool,
        /// Import labels from JSON (Vec<{ addr, name }>)
        #[arg(long, value_name = "FILE")]
        labels_in: Option<PathBuf>,
        /// Export labels to JSON (Vec<{ addr, name }>)
        #[arg(long, value_name = "FILE")]
        labels_out: Option<PathBuf>,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, serde::Serialize)]
struct BlockOut {
    start: u64,
    end: u64,
    terminator: String,
    insns: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct EdgeOut {
    from: u64,
    to: u64,
    kind: &'static str,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct LabelKV {
    addr: u64,
    name: String,
}

#[derive(Debug, Clone, serde::Serialize)]
struct Report {
    entries: Vec<u64>,
    blocks: Vec<BlockOut>,
    edges: Vec<EdgeOut>,
    functions: Vec<FunctionOut>,
    returns: Vec<u64>,
    labels: Vec<LabelKV>,
}

fn parse_u64(s: &str) -> Result<u64> {
    let s = s.trim().replace('_', "");
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u64::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u64>()?)
    }
}

fn insn_line(img: &Image, pc: u64, insn: &Instruction, show_bytes: bool) -> String {
    let mut s = format!("{pc:#010x}: ");
    if show_bytes {
        for i in 0..insn.length as u64 {
            let _ = write!(s, "{:02x} ", read_u8(img, pc + i).unwrap_or(0));
        }
        // Pad 2-byte encodings so mnemonics line up.
        if insn.length == 2 {
            s.push_str("      ");
        }
        s.push_str("  ");
    }
    if insn.is_illegal() {
        let raw = (0..insn.length as u64)
            .rev()
            .fold(0u32, |acc, i| (acc << 8) | read_u8(img, pc + i).unwrap_or(0) as u32);
        let dir = if insn.length == 2 { ".half" } else { ".word" };
        let _ = write!(s, "{dir} {raw:#x}");
    } else {
        s.push_str(&fmt_at(pc, insn));
    }
    s
}

fn disasm_range(img: &Image, cfg: &BlockConfig, start: u64, end: u64, show_bytes: bool) -> String {
    let builder = BlockBuilder::new(Rv64Decoder::new(), *cfg);
    let mut bus = img;
    let mut pc = start;
    let mut buf = String::new();
    while pc < end {
        match builder.fetch(&mut bus, pc) {
            Ok(insn) => {
                let _ = writeln!(buf, "{}", insn_line(img, pc, &insn, show_bytes));
                pc = pc.wrapping_add(insn.length as u64);
            }
            Err(fault) => {
                tracing::debug!(%fault, "range stopped");
                let _ = writeln!(buf, "{pc:#010x}: <oob>");
                break;
            }
        }
    }
    buf
}

fn load_labels(path: &Path) -> Result<Vec<LabelKV>> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("reading labels {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parsing labels {}", path.display()))
}

fn collect_labels(analysis: &Analysis, labels_in: Option<&Path>) -> Result<Vec<LabelKV>> {
    let mut labels: HashMap<u64, String> = HashMap::new();
    if let Some(path) = labels_in {
        for kv in load_labels(path)? {
            labels.insert(kv.addr, kv.name);
        }
    }
    for &r in &analysis.roots {
        labels.entry(r).or_insert_with(|| format!("sub_{r:08x}"));
    }
    for &b in analysis.blocks.keys() {
        labels.entry(b).or_insert_with(|| format!("loc_{b:08x}"));
    }
    let mut out: Vec<LabelKV> = labels.into_iter().map(|(addr, name)| LabelKV { addr, name }).collect();
    out.sort_by_key(|kv| kv.addr);
    Ok(out)
}

fn build_report(img: &Image, seeds: &[u64], analysis: &Analysis, labels: Vec<LabelKV>, show_bytes: bool) -> Report {
    let blocks = analysis
        .blocks
        .values()
        .map(|b| BlockOut {
            start: b.start,
            end: b.end,
            terminator: format!("{:?}", b.terminator),
            insns: b.iter().map(|(pc, insn)| insn_line(img, pc, insn, show_bytes)).collect(),
        })
        .collect();
    let edges = analysis
        .edges
        .iter()
        .map(|e| EdgeOut { from: e.from, to: e.to, kind: e.kind.short() })
        .collect();
    Report {
        entries: seeds.to_vec(),
        blocks,
        edges,
        functions: analysis.functions(),
        returns: analysis.returns.iter().copied().collect(),
        labels,
    }
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let base = parse_u64(&cli.base)?;
    let img = load_raw_bin(&cli.input, base, cli.skip, cli.len)?;
    tracing::info!(base = format_args!("{base:#x}"), segments = img.segments.len(), "loaded image");

    match cli.cmd {
        Command::Sections => {
            println!("{:<10} {:<18} {:<18} {:<6} {:<6}", "name", "start", "end", "perms", "kind");
            for s in &img.segments {
                println!(
                    "{:<10} {:#018x} {:#018x} {:<6} {:<6}",
                    s.name,
                    s.base,
                    s.end(),
                    s.perms,
                    s.kind
                );
            }
        }
        Command::Range { start, end, show_bytes, out } => {
            let start = parse_u64(&start)?;
            let end = parse_u64(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");
            let text = disasm_range(&img, &cfg.block, start, end, show_bytes);
            emit(&text, out.as_deref())?;
        }
        Command::Analyze { entries, max_blocks, format, listing, show_bytes, labels_in, labels_out, out } => {
            // default seed: start of first segment
            let mut seeds: Vec<u64> = if entries.is_empty() {
                img.segments.first().map(|s| s.base).into_iter().collect()
            } else {
                entries.iter().map(|e| parse_u64(e)).collect::<Result<_>>()?
            };
            seeds.sort_unstable();
            seeds.dedup();

            let analysis = analyze_entries(&img, &seeds, &cfg.block, max_blocks);
            let labels = collect_labels(&analysis, labels_in.as_deref())?;
            if let Some(path) = &labels_out {
                std::fs::write(path, serde_json::to_string_pretty(&labels)?)
                    .with_context(|| format!("writing labels {}", path.display()))?;
            }

            let text = match format {
                OutputFormat::Json => {
                    let report = build_report(&img, &seeds, &analysis, labels, show_bytes);
                    serde_json::to_string_pretty(&report)? + "\n"
                }
                OutputFormat::Text => {
                    let mut buf = String::new();
                    let _ = writeln!(buf, "Analysis summary:");
                    let _ = writeln!(
                        buf,
                        "  entries   : {:?}",
                        seeds.iter().map(|a| format!("{a:#010x}")).collect::<Vec<_>>()
                    );
                    let _ = writeln!(buf, "  insts     : {}", analysis.instruction_count());
                    let _ = writeln!(buf, "  blocks    : {}", analysis.blocks.len());
                    let _ = writeln!(buf, "  edges     : {}", analysis.edges.len());
                    let _ = writeln!(buf, "  functions : {}", analysis.functions().len());
                    let _ = writeln!(buf, "Edges:");
                    for e in &analysis.edges {
                        let _ = writeln!(buf, "  {:#010x} -> {:#010x} ({})", e.from, e.to, e.kind.short());
                    }
                    if listing {
                        let names: HashMap<u64, &str> =
                            labels.iter().map(|kv| (kv.addr, kv.name.as_str())).collect();
                        let _ = writeln!(buf, "\nListing (analyzed blocks):");
                        for block in analysis.blocks.values() {
                            if let Some(lbl) = names.get(&block.start) {
                                let _ = writeln!(buf, "{:#010x} <{lbl}>:", block.start);
                            }
                            for (pc, insn) in block.iter() {
                                let _ = writeln!(buf, "  {}", insn_line(&img, pc, insn, show_bytes));
                            }
                        }
                    }
                    buf
                }
            };
            emit(&text, out.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_u64_hex_and_dec() {
        assert_eq!(parse_u64("0x10").unwrap(), 0x10);
        assert_eq!(parse_u64("16").unwrap(), 16);
        assert_eq!(parse_u64("0x8000_0000").unwrap(), 0x8000_0000);
        assert!(parse_u64("zz").is_err());
    }

    #[test]
    fn range_mixes_widths_and_marks_illegal() {
        // c.addi a0, 1 ; addi a0, a0, 1 ; reserved c.addi4spn with zero immediate
        let mut bytes = vec![0x05, 0x05];
        bytes.extend_from_slice(&0x0015_0513u32.to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0x00]);
        let img = Image::single(0, bytes);
        let text = disasm_range(&img, &BlockConfig::default(), 0, 10, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "0x00000000: addi a0, a0, 1",
                "0x00000002: addi a0, a0, 1",
                "0x00000006: .half 0x0",
                "0x00000008: <oob>",
            ]
        );
    }

    #[test]
    fn labels_default_to_sub_and_loc() {
        let img = Image::single(0x1000, [0x0000_0463u32, 0x0000_8067].iter().flat_map(|w| w.to_le_bytes()).collect());
        let analysis = analyze_entries(&img, &[0x1000], &BlockConfig::default(), 10);
        let labels = collect_labels(&analysis, None).unwrap();
        let names: Vec<&str> = labels.iter().map(|kv| kv.name.as_str()).collect();
        // The branch target lies past the image, so only two blocks exist.
        assert_eq!(names, vec!["sub_00001000", "loc_00001004"]);
    }
}
