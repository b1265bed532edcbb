use pretty_assertions::assert_eq;
use riscv_decode::{BlockConfig, Config};

#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!("_riscv_decode_cfg_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "block": { "max_instructions": 32, "stop_at_page_boundary": false } }"#).unwrap();
    let cfg = Config::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(
        cfg.block,
        BlockConfig { max_instructions: 32, stop_at_page_boundary: false, page_size: 4096 }
    );
}

#[test]
fn missing_file_reports_path() {
    let err = Config::load(std::path::Path::new("/nonexistent/riscv.json")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/riscv.json"));
}
