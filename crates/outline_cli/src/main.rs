//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `outline_core` linkage by building and printing a small outline.
//! - Keep output deterministic apart from node ids.
//!
//! Usage: `outline_cli [--config <file.json>] [--log-dir <absolute dir>]`

use log::info;
use outline_core::{init_from_config, Outline, OutlineConfig, OutlineResult};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("outline_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let config = parse_config(&args)?;
    let logging = init_from_config(&config)?;

    println!("outline_core version={}", outline_core::core_version());
    println!("logging={}", if logging { "file" } else { "off" });

    let outline = build_demo(config).map_err(|err| err.to_string())?;
    print_outline(&outline).map_err(|err| err.to_string())?;
    let positions = outline.check_outline().map_err(|err| err.to_string())?;
    println!("check=ok positions={positions}");
    info!("event=cli_run module=cli status=ok positions={positions}");
    Ok(())
}

fn parse_config(args: &[String]) -> Result<OutlineConfig, String> {
    let mut config = OutlineConfig::default();
    let mut log_dir = None;
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for `{flag}`"))?;
        match flag.as_str() {
            "--config" => config = OutlineConfig::load(value).map_err(|err| err.to_string())?,
            "--log-dir" => log_dir = Some(PathBuf::from(value)),
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    if log_dir.is_some() {
        config.log_dir = log_dir;
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

/// A holds B and C; D sits under B and is cloned under C.
fn build_demo(config: OutlineConfig) -> OutlineResult<Outline> {
    let mut outline = Outline::with_config(config);
    let a = outline.create_node("A", "");
    let b = outline.create_node("B", "");
    let c = outline.create_node("C", "");
    let d = outline.create_node("D", "shared body");

    let a_pos = outline.insert_child(None, 0, a)?;
    let b_pos = outline.insert_child(Some(&a_pos), 0, b)?;
    let c_pos = outline.insert_child(Some(&a_pos), 1, c)?;
    outline.insert_child(Some(&b_pos), 0, d)?;
    outline.insert_child(Some(&c_pos), 0, d)?;
    outline.insert_as_last_child(&c_pos)?;
    Ok(outline)
}

fn print_outline(outline: &Outline) -> OutlineResult<()> {
    for position in outline.all_positions() {
        let record = outline.node_at(&position)?;
        let marker = if outline.is_cloned(record.id) { "*" } else { " " };
        println!(
            "{}{marker} {}  [{}]",
            "  ".repeat(position.level()),
            record.headline,
            outline.unl(&position)?
        );
    }
    Ok(())
}
