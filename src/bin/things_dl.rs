use std::collections::HashMap;
use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use things_datasets::app::{Pipeline, RunResult};
use things_datasets::catalog::{Catalog, CatalogStore};
use things_datasets::error::ThingsError;
use things_datasets::figshare::FigshareHttpClient;
use things_datasets::openneuro::OpenNeuroCliClient;
use things_datasets::osf::OsfHttpClient;
use things_datasets::output::{JsonOutput, OutputMode, TextProgress};
use things_datasets::selection::SelectionResolver;

#[derive(Parser)]
#[command(name = "things-dl")]
#[command(about = "Download and package THINGS datasets into one archive")]
#[command(version, author)]
struct Cli {
    /// Directory for temporary state and the final archive
    output_dir: Utf8PathBuf,

    /// Directory holding datasets.csv and dataset_descriptions.csv
    #[arg(long, default_value = "static")]
    catalog_dir: Utf8PathBuf,

    /// Comma-separated selection tokens (e.g. "1.1,1.2"); skips the prompt
    #[arg(long)]
    select: Option<String>,

    /// Machine-readable output; requires --select
    #[arg(long)]
    non_interactive: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(things) = report.downcast_ref::<ThingsError>() {
            return ExitCode::from(map_exit_code(things));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ThingsError) -> u8 {
    match error {
        ThingsError::CatalogRead(_)
        | ThingsError::CatalogParse(_)
        | ThingsError::UnknownHost(_) => 2,
        ThingsError::Http(_)
        | ThingsError::Download { .. }
        | ThingsError::DownloadStatus { .. }
        | ThingsError::ExternalTool(_)
        | ThingsError::MissingTool(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let store = CatalogStore::new(cli.catalog_dir.clone());
    let catalog = store.load()?;
    let descriptions = store.load_descriptions()?;

    let tokens = match cli.select {
        Some(raw) => split_tokens(&raw),
        None => {
            if cli.non_interactive {
                return Err(miette::Report::msg(
                    "--select is required with --non-interactive",
                ));
            }
            print_catalog(&catalog, &descriptions);
            prompt_selection().into_diagnostic()?
        }
    };

    let selection = SelectionResolver::resolve(&tokens, &catalog);
    if selection.is_empty() {
        println!("No valid datasets selected. Exiting.");
        return Ok(());
    }

    let pipeline = Pipeline::new(
        FigshareHttpClient::new()?,
        OsfHttpClient::new()?,
        OpenNeuroCliClient::new(),
    );

    match output_mode {
        OutputMode::NonInteractive => {
            let result = pipeline.run(&selection, &descriptions, &cli.output_dir, &JsonOutput)?;
            JsonOutput::print_run(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result =
                pipeline.run(&selection, &descriptions, &cli.output_dir, &TextProgress)?;
            print_run_summary(&result);
        }
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog, descriptions: &HashMap<String, String>) {
    println!("Available Datasets:\n");
    for (idx, group) in catalog.groups().iter().enumerate() {
        let idx = idx + 1;
        println!("{idx}. {}", group.name);
        println!(
            "   Description: {}",
            descriptions
                .get(&group.name)
                .map(String::as_str)
                .unwrap_or("No description")
        );
        for (sub_idx, entry) in group.entries.iter().enumerate() {
            println!("      {idx}.{}. {}", sub_idx + 1, entry.sub_name);
            println!("         Size: {}", entry.size);
            println!("         Description: {}", entry.description);
        }
    }
    println!();
}

fn prompt_selection() -> io::Result<Vec<String>> {
    print!("Enter the numbers of the datasets you want to download (e.g., 1.1, 1.2): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(split_tokens(&line))
}

fn split_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn print_run_summary(result: &RunResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    let fetched = result
        .items
        .iter()
        .filter(|item| item.action == "fetched")
        .count();
    let failed = result.items.len() - fetched;

    println!("{cyan}things-dl summary{reset}");
    println!("{green}fetched: {fetched}{reset}");
    if failed > 0 {
        println!("{red}failed: {failed}{reset}");
    }
    for item in &result.items {
        let color = if item.action == "fetched" { green } else { red };
        println!(
            "{color}  {} / {} [{}] {}{reset}",
            item.dataset, item.sub_dataset, item.source, item.action
        );
        if let Some(error) = &item.error {
            println!("{red}    {error}{reset}");
        }
    }
    if let Some(archive) = &result.archive_path {
        println!("All selected datasets are packaged into {archive}.");
    }
}
