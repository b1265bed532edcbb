use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

fn default_max_instructions() -> usize {
    256
}
fn default_page_size() -> u64 {
    4096
}
fn default_stop_at_page_boundary() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Upper bound on instructions per basic block.
    #[serde(default = "default_max_instructions")]
    pub max_instructions: usize,

    /// End a block before the next pc enters a different page, so that a
    /// block never spans two translations.
    #[serde(default = "default_stop_at_page_boundary")]
    pub stop_at_page_boundary: bool,

    /// Page size in bytes, a power of two.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            max_instructions: default_max_instructions(),
            stop_at_page_boundary: default_stop_at_page_boundary(),
            page_size: default_page_size(),
        }
    }
}

impl BlockConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_instructions > 0, "max_instructions must be at least 1");
        ensure!(
            self.page_size.is_power_of_two(),
            "page_size {} is not a power of two",
            self.page_size
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub block: BlockConfig,
}

impl Config {
    /// Reads a JSON config file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.block.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_takes_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.block.max_instructions, 256);
        assert_eq!(cfg.block.page_size, 4096);
        assert!(cfg.block.stop_at_page_boundary);
    }

    #[test]
    fn partial_block_section() {
        let cfg = Config::from_json(r#"{ "block": { "max_instructions": 8 } }"#).unwrap();
        assert_eq!(cfg.block.max_instructions, 8);
        assert_eq!(cfg.block.page_size, 4096);
    }

    #[test]
    fn rejects_bad_page_size() {
        assert!(Config::from_json(r#"{ "block": { "page_size": 3000 } }"#).is_err());
        assert!(Config::from_json(r#"{ "block": { "max_instructions": 0 } }"#).is_err());
    }
}
