//! Shimeji desktop-mascot discovery and extraction.
//!
//! Given an archive (ZIP/TAR/7z/RAR, possibly nested one level deep), finds
//! every shimeji mascot package it contains and extracts its images,
//! sounds, and behavior configuration into a plain output tree.

pub mod actions_parser;
pub mod archive_formats;
pub mod archive_reader;
pub mod cli;
pub mod default_xmls;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod folder_tree;
pub mod io;
pub mod model;
pub mod orchestrator;
pub mod path_utils;
pub mod policy;
pub mod report;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;

use crate::cli::{AnalyzeArgs, Cli, Commands, ExtractArgs, ListArgs};
use crate::error::UserInputError;
use crate::orchestrator::AnalyzeConfig;
use crate::policy::SecurityPolicy;

/// Execute the command represented by the parsed CLI input.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args),
        Commands::Extract(args) => handle_extract(args),
        Commands::List(args) => handle_list(args),
    }
}

fn read_archive_bytes(path: &Utf8PathBuf) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(UserInputError::new(format!("archive not found: {path}")).into());
    }
    std::fs::read(path).with_context(|| format!("reading archive {path}"))
}

fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let bytes = read_archive_bytes(&args.archive)?;
    let config = AnalyzeConfig {
        fallback_name: args.fallback_name.unwrap_or_else(|| "Mascot".to_string()),
        only_thumbnails: false,
    };
    let analyzed = orchestrator::analyze(bytes, &config)?;
    let report = analyzed.report();
    if args.json {
        println!("{}", report.to_json().context("serializing report")?);
    } else {
        for mascot in &report.mascots {
            println!("{mascot}");
        }
        for mascot in &report.default_xml_mascots {
            println!("{mascot} (using default behaviors)");
        }
    }
    Ok(())
}

fn handle_extract(args: ExtractArgs) -> Result<()> {
    let bytes = read_archive_bytes(&args.archive)?;
    let dest = args.directory.unwrap_or_else(|| Utf8PathBuf::from("."));
    let config = AnalyzeConfig {
        fallback_name: args.fallback_name.unwrap_or_else(|| "Mascot".to_string()),
        only_thumbnails: args.thumbnails,
    };
    let mut analyzed = orchestrator::analyze(bytes, &config)?;
    let policy = SecurityPolicy::new();
    let report = orchestrator::extract(&mut analyzed, &dest, policy, &config)?;

    if args.verbose {
        for target in &report.targets {
            println!("extracted {} -> {}/{}", target.entry, target.mascot, target.output_name);
        }
    }
    if let Some(report_path) = args.report {
        std::fs::write(&report_path, report.to_json().context("serializing report")?)
            .with_context(|| format!("writing report to {report_path}"))?;
    }
    Ok(())
}

fn handle_list(args: ListArgs) -> Result<()> {
    let bytes = read_archive_bytes(&args.archive)?;
    let mut reader = archive_reader::open_best_reader(bytes).context("opening archive")?;
    let entries = reader.enumerate().context("enumerating archive entries")?;
    let guard = encoding::EncodingGuard::new();

    if args.json {
        let names: Vec<String> = entries
            .iter()
            .filter(|e| !e.is_dir)
            .filter_map(|e| guard.repair_entry_name(&e.raw_name))
            .collect();
        println!("{}", serde_json::to_string_pretty(&names).context("serializing entry list")?);
    } else {
        for entry in entries.iter().filter(|e| !e.is_dir) {
            if let Some(name) = guard.repair_entry_name(&entry.raw_name) {
                println!("{name}");
            }
        }
    }
    Ok(())
}
