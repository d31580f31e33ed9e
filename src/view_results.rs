/*
cargo run --bin view_results

cargo run --bin view_results -- \
    --data-dir ../clin-summ-data/data \
    --choice 1 \
    --samples 5
*/

use anyhow::{Context, Result};
use clap::Parser;
use clin_summ_eval::{
    datasets,
    logging::init_file_logger,
    render::select_renderer,
    report::summarize,
    sample::{load_records, validate_records},
};
use log::{error, info};
use std::{
    io::{self, Write},
    path::PathBuf,
};

// CLI
#[derive(Parser, Debug)]
#[command(version, author, about = "Show the first samples of a dataset and basic length statistics.")]
struct Cli {
    // Directory holding <code>/test.jsonl for every dataset
    #[arg(long, env = "CLIN_SUMM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    // Menu key (1-3); asked interactively when omitted
    #[arg(long)]
    choice: Option<String>,

    // How many samples to print
    #[arg(long, default_value_t = 5)]
    samples: usize,

    // Plain text even on a terminal
    #[arg(long, default_value_t = false)]
    plain: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_file_logger(&cli.log_dir, "view_results")?;
    info!("Started - data_dir: {:?}", cli.data_dir);

    let renderer = select_renderer(cli.plain);
    let mut out = io::stdout().lock();
    renderer.title(&mut out, "Clinical Text Summarization - View Results", None)?;

    let picked = match &cli.choice {
        Some(key) => datasets::by_key(key),
        None => datasets::prompt_choice(&mut io::stdin().lock(), &mut out)?,
    };
    let Some(dataset) = picked else {
        writeln!(out, "Invalid choice!")?;
        return Ok(());
    };
    info!("Dataset: {} ({})", dataset.name, dataset.code);

    let test_file = dataset.test_file(&cli.data_dir);
    if !test_file.exists() {
        error!("{} not found", test_file.display());
        eprintln!("\nError: {} not found!", test_file.display());
        return Ok(());
    }

    let records = load_records(&test_file)?;
    writeln!(out, "\nDataset: {}", dataset.name)?;
    writeln!(out, "Total samples: {}", records.len())?;

    let shown = cli.samples.min(records.len());
    writeln!(out, "Showing first {shown} samples:")?;
    renderer.samples(
        &mut out,
        dataset.kind,
        &records[..shown],
        dataset.kind.display_limits(),
    )?;

    // statistics need every record complete
    let samples = validate_records(&records)
        .with_context(|| format!("Validating {}", test_file.display()))?;
    renderer.overall(&mut out, &summarize(&samples))?;

    info!("Finished - {} records", records.len());
    writeln!(out, "Done! Log: {}", log_path.display())?;
    Ok(())
}
