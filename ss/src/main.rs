use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use stepstore::cli::{Cli, Command};
use stepstore::config::Config;
use stepstore::{Build, HistoryStore, SectionKind};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).context(format!("Failed to read file: {}", path.display()))
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("stepstore starting");

    match cli.command {
        Command::Segment { file, json } => {
            let segmentation = stepstore::segment(&read_file(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(segmentation.sections())?);
                return Ok(());
            }

            let mut step = 0;
            for section in segmentation.sections() {
                let label = match section.kind {
                    SectionKind::Step => {
                        step += 1;
                        format!("step {}", step).green()
                    }
                    SectionKind::Preamble => "preamble".dimmed(),
                };
                println!("[{}]", label);
                println!("{}", section.text);
            }
            println!("{} {} step(s)", "✓".green(), segmentation.step_count());
        }
        Command::Chunk { file, max_size } => {
            let max_size = max_size.unwrap_or(config.max_chunk_size);
            let fragments = stepstore::chunk(&read_file(&file)?, max_size);
            for (i, fragment) in fragments.iter().enumerate() {
                println!(
                    "{} {}",
                    format!("--- fragment {} ({} chars)", i + 1, fragment.chars().count()).yellow(),
                    if fragment.chars().count() > max_size { "oversized".red() } else { "".normal() }
                );
                println!("{}", fragment);
            }
        }
        Command::Resolve { request, builds } => {
            let mut store = HistoryStore::new(config.history_capacity);
            for path in &builds {
                let segmentation = stepstore::segment(&read_file(path)?).map_text(stepstore::bold_units);
                store.push(Build::from_segmentation(&segmentation));
            }

            match stepstore::resolve_text(&request, &store) {
                Ok(Some(resolved)) => {
                    println!(
                        "{} step {} from {} build(s) ago",
                        "✓".green(),
                        resolved.reference.step_index.to_string().cyan(),
                        resolved.reference.build_offset.to_string().cyan()
                    );
                    println!("{}", resolved.target);
                }
                Ok(None) => {
                    return Err(eyre::eyre!("Not an elaboration request: {}", request));
                }
                Err(e) => {
                    return Err(e).context("Failed to resolve reference");
                }
            }
        }
    }

    Ok(())
}
