/*
cargo run --bin dashboard

cargo run --bin dashboard -- \
    --data-dir ../clin-summ-data/data \
    --choice 2 \
    --output reports/chq_dashboard.json
*/

use anyhow::{Context, Result};
use clap::Parser;
use clin_summ_eval::{
    build_report, datasets, load_records, logging::init_file_logger, render::select_renderer,
};
use log::{error, info};
use std::{
    fs::{self, File},
    io::{self, Write},
    path::PathBuf,
};

const SAMPLES_SHOWN: usize = 3;

// CLI
#[derive(Parser, Debug)]
#[command(version, author, about = "Dataset dashboard: overview, normal/abnormal split, frequent terms.")]
struct Cli {
    // Directory holding <code>/test.jsonl for every dataset
    #[arg(long, env = "CLIN_SUMM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    // Menu key (1-3); asked interactively when omitted
    #[arg(long)]
    choice: Option<String>,

    // Plain text even on a terminal
    #[arg(long, default_value_t = false)]
    plain: bool,

    // Also write the report as JSON here
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_file_logger(&cli.log_dir, "dashboard")?;
    info!("Started - data_dir: {:?}", cli.data_dir);

    let renderer = select_renderer(cli.plain);
    let mut out = io::stdout().lock();
    renderer.title(
        &mut out,
        "Clinical Text Summarization - Interactive Dashboard",
        None,
    )?;

    let picked = match &cli.choice {
        Some(key) => datasets::by_key(key),
        None => datasets::prompt_choice(&mut io::stdin().lock(), &mut out)?,
    };
    let Some(dataset) = picked else {
        writeln!(out, "Invalid choice!")?;
        return Ok(());
    };

    let test_file = dataset.test_file(&cli.data_dir);
    if !test_file.exists() {
        error!("{} not found", test_file.display());
        eprintln!("\nError: {} not found!", test_file.display());
        return Ok(());
    }

    let records = load_records(&test_file)?;
    let summary = build_report(&records)
        .with_context(|| format!("Building report for {}", test_file.display()))?;

    renderer.title(
        &mut out,
        "Clinical Text Summarization Dashboard",
        Some(dataset.name),
    )?;
    renderer.report(&mut out, dataset, &summary)?;

    writeln!(out, "SAMPLE REPORTS")?;
    let shown = SAMPLES_SHOWN.min(records.len());
    renderer.samples(
        &mut out,
        dataset.kind,
        &records[..shown],
        renderer.preview_limits(),
    )?;

    if let Some(path) = &cli.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        serde_json::to_writer_pretty(File::create(path)?, &summary)?;
        info!("Wrote report → {:?}", path);
    }

    info!("Finished - {} {} summarised", summary.total, dataset.code);
    writeln!(out, "Dashboard complete! Log: {}", log_path.display())?;
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
