use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use codefn::{declaration::FunctionDeclaration, node::CodeFunctionNode};
use log::error;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated function and node code for a JSON declaration.
    Generate {
        /// The JSON function declaration.
        input: String,
        /// The node instance used for non static functions.
        #[arg(long, default_value = "0")]
        instance: String,
    },
    /// Create a JSON report with generated code for all declarations in a folder.
    Batch {
        /// The folder containing JSON function declarations.
        input_folder: String,
        /// The output JSON file.
        output_file: String,
    },
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    file: String,
    #[serde(flatten)]
    result: ReportResult,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReportResult {
    Generated {
        name: String,
        header: String,
        body: String,
    },
    Error {
        error: String,
    },
}

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .context("failed to initialize logger")?;

    let cli = Cli::parse();

    let start = std::time::Instant::now();
    match cli.command {
        Commands::Generate { input, instance } => {
            let declaration = FunctionDeclaration::from_file(&input)
                .with_context(|| format!("failed to read declaration {input:?}"))?;
            let node = CodeFunctionNode::new(instance, declaration)
                .with_context(|| format!("invalid declaration {input:?}"))?;

            println!("{}", node.function_definition());
            println!();
            println!("{}", node.generate_code());
        }
        Commands::Batch {
            input_folder,
            output_file,
        } => {
            let entries = batch_report(&input_folder)?;
            let json = serde_json::to_string_pretty(&entries)?;
            std::fs::write(&output_file, json)
                .with_context(|| format!("failed to write {output_file:?}"))?;
        }
    }

    eprintln!("Finished in {:?}", start.elapsed());
    Ok(())
}

fn batch_report(input_folder: &str) -> anyhow::Result<Vec<ReportEntry>> {
    let mut entries: Vec<_> = globwalk::GlobWalkerBuilder::from_patterns(input_folder, &["*.json"])
        .build()?
        .filter_map(|e| e.ok())
        .par_bridge()
        .map(|entry| {
            let path = entry.path();
            let file = path.file_name().unwrap_or_default().to_string_lossy().to_string();
            let result = generate(path).unwrap_or_else(|e| {
                error!("error processing {path:?}: {e:#}");
                ReportResult::Error {
                    error: format!("{e:#}"),
                }
            });
            ReportEntry { file, result }
        })
        .collect();
    entries.sort_by(|a, b| a.file.cmp(&b.file));

    Ok(entries)
}

fn generate(path: &Path) -> anyhow::Result<ReportResult> {
    let declaration = FunctionDeclaration::from_file(path)?;

    // Use the file name as the instance to keep names unique across declarations.
    let instance = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let node = CodeFunctionNode::new(instance, declaration)?;

    Ok(ReportResult::Generated {
        name: node.function_name(),
        header: node.function_header(),
        body: node.function_body(),
    })
}
