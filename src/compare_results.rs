/*
cargo run --bin compare_results

cargo run --bin compare_results -- \
    ../clin-summ-data/data/opi/test.jsonl \
    --count 5
*/

use anyhow::{Context, Result};
use clap::Parser;
use clin_summ_eval::{
    compute_pair_metrics, datasets, load_records, logging::init_file_logger,
    render::select_renderer, report::summarize, sample::validate_records,
};
use log::{error, info};
use std::{
    io::{self, Write},
    path::PathBuf,
};

// CLI
#[derive(Parser, Debug)]
#[command(version, author, about = "Side-by-side findings vs impression, with per-report metrics.")]
struct Cli {
    // JSONL file to compare (default: <data-dir>/opi/test.jsonl)
    file: Option<PathBuf>,

    #[arg(long, env = "CLIN_SUMM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    // Number of reports shown in detail
    #[arg(long, default_value_t = 5)]
    count: usize,

    // Plain text even on a terminal
    #[arg(long, default_value_t = false)]
    plain: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_file_logger(&cli.log_dir, "compare_results")?;

    let file = match &cli.file {
        Some(p) => p.clone(),
        None => datasets::by_code("opi")
            .context("opi missing from dataset table")?
            .test_file(&cli.data_dir),
    };
    info!("Started - file: {:?}", file);

    if !file.exists() {
        error!("{} not found", file.display());
        eprintln!("Error: File not found: {}", file.display());
        return Ok(());
    }

    let records = load_records(&file)?;
    let samples =
        validate_records(&records).with_context(|| format!("Validating {}", file.display()))?;

    let renderer = select_renderer(cli.plain);
    let mut out = io::stdout().lock();
    renderer.title(&mut out, "Clinical Text Summarization - Comparison View", None)?;

    for (i, sample) in samples.iter().take(cli.count).enumerate() {
        let metrics = compute_pair_metrics(&sample.input_text, &sample.target_text);
        info!(
            "report {}: {} -> {} words, {} key terms",
            i + 1,
            metrics.input_word_count,
            metrics.target_word_count,
            metrics.preserved_term_count
        );
        renderer.comparison(
            &mut out,
            i + 1,
            &sample.input_text,
            &sample.target_text,
            &metrics,
        )?;
    }

    renderer.overall(&mut out, &summarize(&samples))?;
    writeln!(out, "Log: {}", log_path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        assert!(Cli::command().get_about().is_some());
    }
}
