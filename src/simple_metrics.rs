/*
cargo run --release --bin simple_metrics -- ../clin-summ-data/data/opi/result.jsonl

with BERTScore (downloads libtorch + bert-base-uncased on first run):
cargo run --release --features bertscore --bin simple_metrics -- \
    ../clin-summ-data/data/chq/result.jsonl \
    --output reports/chq_metrics.json
*/

use anyhow::{bail, Context, Result};
use clap::Parser;
use clin_summ_eval::{
    datasets, load_records,
    logging::init_file_logger,
    render::select_renderer,
    scorers::{run_scorers_with, BertScorer, BleuScorer, RougeScorer, Scorer},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::{
    fs::{self, File},
    io::{self, Write},
    path::PathBuf,
};

// CLI
#[derive(Parser, Debug)]
#[command(version, author, about = "Score a result file (target vs output) with BLEU, ROUGE and BERTScore.")]
struct Cli {
    // result.jsonl with `target` and `output` per line
    // (default: <data-dir>/opi/result.jsonl)
    result_file: Option<PathBuf>,

    #[arg(long, env = "CLIN_SUMM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    // Skip BERTScore
    #[arg(long, default_value_t = false)]
    no_bertscore: bool,

    // Report raw BERTScore F1 instead of the baseline-rescaled value
    #[arg(long, default_value_t = false)]
    no_rescale: bool,

    // Run BERTScore on GPU if available
    #[arg(long, default_value_t = false)]
    cuda: bool,

    // Also write the metrics as JSON here
    #[arg(long)]
    output: Option<PathBuf>,

    // Plain text even on a terminal
    #[arg(long, default_value_t = false)]
    plain: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_file_logger(&cli.log_dir, "simple_metrics")?;

    let result_file = match &cli.result_file {
        Some(p) => p.clone(),
        None => datasets::by_code("opi")
            .context("opi missing from dataset table")?
            .result_file(&cli.data_dir),
    };
    info!("Started - result_file: {:?}", result_file);

    if !result_file.exists() {
        error!("{} not found", result_file.display());
        eprintln!("Error: File not found: {}", result_file.display());
        eprintln!("\nUsage: simple_metrics <path_to_result.jsonl>");
        eprintln!("\nAvailable result files:");
        for p in datasets::available_result_files(&cli.data_dir) {
            eprintln!("  - {}", p.display());
        }
        return Ok(());
    }

    if let Some(d) = datasets::infer_from_path(&result_file) {
        info!("Dataset: {} ({})", d.name, d.code);
    }
    println!("\nLoading results from: {}", result_file.display());
    let records = load_records(&result_file)?;
    println!("Found {} samples", records.len());

    let mut references = Vec::with_capacity(records.len());
    let mut predictions = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        match (&rec.target, &rec.output) {
            (Some(t), Some(o)) => {
                references.push(t.clone());
                predictions.push(o.clone());
            }
            (None, _) => bail!("record {i} in {} has no `target`", result_file.display()),
            (_, None) => bail!("record {i} in {} has no `output`", result_file.display()),
        }
    }

    let mut scorers: Vec<Box<dyn Scorer>> =
        vec![Box::new(BleuScorer), Box::new(RougeScorer)];
    if !cli.no_bertscore {
        scorers.push(Box::new(BertScorer {
            rescale: !cli.no_rescale,
            ..BertScorer::new(cli.cuda)
        }));
    }

    println!("\nCalculating metrics...");
    let bar = ProgressBar::new(scorers.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )?);
    let mut started = 0;
    let summary = run_scorers_with(&scorers, &predictions, &references, |name| {
        if started > 0 {
            bar.inc(1);
        }
        started += 1;
        bar.set_message(name.to_owned());
    });
    bar.inc(1);
    bar.finish_with_message("done");

    for f in &summary.failures {
        println!("    {} calculation failed: {}", f.metric, f.reason);
    }

    let renderer = select_renderer(cli.plain);
    let mut out = io::stdout().lock();
    renderer.metrics(&mut out, &summary)?;

    if let Some(path) = &cli.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        serde_json::to_writer_pretty(File::create(path)?, &summary)?;
        info!("Wrote metrics → {:?}", path);
    }

    info!(
        "Finished - {} scores, {} failed metrics",
        summary.scores.len(),
        summary.failures.len()
    );
    writeln!(out, "Log: {}", log_path.display())?;
    Ok(())
}
