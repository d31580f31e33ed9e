//! Terminal output for the report tools.
//!
//! The statistics layer hands over plain values; a [`Renderer`] turns them
//! into text. [`RichRenderer`] draws boxed tables with colour,
//! [`PlainRenderer`] prints fixed-width lines. Pick one with
//! [`select_renderer`] at startup.

use crate::{
    datasets::{Dataset, DatasetKind},
    report::{share, ReportSummary, TermCount},
    sample::Record,
    scorers::MetricsSummary,
    text_metrics::PairMetrics,
};
use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, CellAlignment,
    ContentArrangement, Table,
};
use itertools::Itertools;
use std::{
    borrow::Cow,
    io::{self, IsTerminal, Write},
};

const RULE_WIDTH: usize = 70;
const TOP_SHOWN: usize = 5;

/// Character limits for (input, summary); `None` shows the full text.
pub type ClipLimits = (Option<usize>, Option<usize>);

/// `text` cut to `limit` characters, with "..." when something was cut.
pub fn clip(text: &str, limit: Option<usize>) -> Cow<'_, str> {
    match limit {
        Some(n) if text.chars().count() > n => {
            Cow::Owned(format!("{}...", text.chars().take(n).collect::<String>()))
        }
        _ => Cow::Borrowed(text),
    }
}

/// "12.3x" style ratio, "N/A" when undefined.
pub fn fmt_ratio(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_owned(), |r| format!("{r:.1}x"))
}

pub fn fmt_words(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_owned(), |w| format!("{w:.1} words"))
}

pub fn fmt_pct(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_owned(), |p| format!("{p:.1}%"))
}

/// "pneumothorax" -> "Pneumothorax", "side effects" -> "Side Effects"
pub fn title_case(term: &str) -> String {
    term.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

pub trait Renderer {
    /// Banner at the top of a tool's output.
    fn title(&self, out: &mut dyn Write, title: &str, subtitle: Option<&str>) -> io::Result<()>;

    /// Dashboard body: overview plus the frequency tables that fit the dataset.
    fn report(
        &self,
        out: &mut dyn Write,
        dataset: &Dataset,
        summary: &ReportSummary,
    ) -> io::Result<()>;

    /// First `records.len()` samples with dataset-specific labels, clipped
    /// to `limits` (input, summary).
    fn samples(
        &self,
        out: &mut dyn Write,
        kind: DatasetKind,
        records: &[Record],
        limits: ClipLimits,
    ) -> io::Result<()>;

    /// Clip limits for the short previews under a dashboard.
    fn preview_limits(&self) -> ClipLimits;

    /// One input/summary pair with its metrics. `number` is 1-based.
    fn comparison(
        &self,
        out: &mut dyn Write,
        number: usize,
        input: &str,
        target: &str,
        metrics: &PairMetrics,
    ) -> io::Result<()>;

    /// Dataset-level length statistics.
    fn overall(&self, out: &mut dyn Write, summary: &ReportSummary) -> io::Result<()>;

    /// BLEU/ROUGE/BERTScore results and the metrics that failed.
    fn metrics(&self, out: &mut dyn Write, summary: &MetricsSummary) -> io::Result<()>;
}

/// Plain output for pipes and `--plain`, boxes and colour otherwise.
pub fn select_renderer(force_plain: bool) -> Box<dyn Renderer> {
    if force_plain || !io::stdout().is_terminal() {
        Box::new(PlainRenderer)
    } else {
        Box::new(RichRenderer)
    }
}

// ---------------------------------------------------------------- plain

#[derive(Debug, Default)]
pub struct PlainRenderer;

impl PlainRenderer {
    fn heading(out: &mut dyn Write, text: &str) -> io::Result<()> {
        writeln!(out, "{text}")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))
    }

    fn ranked(
        out: &mut dyn Write,
        rows: &[TermCount],
        total: Option<usize>,
    ) -> io::Result<()> {
        for (i, row) in rows.iter().take(TOP_SHOWN).enumerate() {
            let label = format!("{} ", title_case(&row.term));
            write!(out, "  {}. {label:.<40} {:>3}", i + 1, row.count)?;
            match total {
                Some(t) => writeln!(out, " ({})", fmt_pct(share(row.count, t)))?,
                None => writeln!(out)?,
            }
        }
        writeln!(out)
    }
}

impl Renderer for PlainRenderer {
    fn title(&self, out: &mut dyn Write, title: &str, subtitle: Option<&str>) -> io::Result<()> {
        writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "  {}", title.to_uppercase())?;
        if let Some(sub) = subtitle {
            writeln!(out, "  {sub}")?;
        }
        writeln!(out, "{}\n", "=".repeat(RULE_WIDTH))
    }

    fn report(
        &self,
        out: &mut dyn Write,
        dataset: &Dataset,
        summary: &ReportSummary,
    ) -> io::Result<()> {
        let unit = dataset.kind.unit();
        Self::heading(out, "OVERVIEW STATISTICS")?;
        writeln!(out, "  {:<23}{}", format!("Total {unit}:"), summary.total)?;
        if dataset.kind == DatasetKind::Radiology {
            writeln!(
                out,
                "  {:<23}{} ({})",
                "Normal Findings:",
                summary.normal,
                fmt_pct(summary.normal_share())
            )?;
            writeln!(
                out,
                "  {:<23}{} ({})",
                "Abnormal Findings:",
                summary.abnormal,
                fmt_pct(summary.abnormal_share())
            )?;
        }
        writeln!(out, "  {:<23}{}", "Avg Input Length:", fmt_words(summary.avg_input_words))?;
        writeln!(out, "  {:<23}{}", "Avg Summary Length:", fmt_words(summary.avg_target_words))?;
        writeln!(out, "  {:<23}{}", "Compression Ratio:", fmt_ratio(summary.compression_ratio))?;
        writeln!(out)?;

        match dataset.kind {
            DatasetKind::Radiology => {
                if !summary.conditions.is_empty() {
                    Self::heading(out, "MOST COMMON CONDITIONS")?;
                    Self::ranked(out, &summary.conditions, Some(summary.total))?;
                }
                if !summary.anatomy.is_empty() {
                    Self::heading(out, "MOST REFERENCED ANATOMY")?;
                    Self::ranked(out, &summary.anatomy, None)?;
                }
            }
            DatasetKind::HealthQuestions => {
                if !summary.topics.is_empty() {
                    Self::heading(out, "QUESTION TOPICS")?;
                    Self::ranked(out, &summary.topics, Some(summary.total))?;
                }
            }
            DatasetKind::Dialogue => {}
        }
        Ok(())
    }

    fn samples(
        &self,
        out: &mut dyn Write,
        kind: DatasetKind,
        records: &[Record],
        (input_limit, summary_limit): ClipLimits,
    ) -> io::Result<()> {
        for (i, rec) in records.iter().enumerate() {
            writeln!(out, "\n{}", "─".repeat(RULE_WIDTH))?;
            writeln!(out, "Sample #{}", i + 1)?;
            writeln!(out, "{}", "─".repeat(RULE_WIDTH))?;
            writeln!(out, "\n{}:", kind.input_label())?;
            writeln!(out, "{}", clip(rec.input_or_missing(), input_limit))?;
            writeln!(out, "\n{}:", kind.summary_label())?;
            writeln!(out, "{}", clip(rec.target_or_missing(), summary_limit))?;
        }
        writeln!(out)
    }

    fn preview_limits(&self) -> ClipLimits {
        (Some(150), None)
    }

    fn comparison(
        &self,
        out: &mut dyn Write,
        number: usize,
        input: &str,
        target: &str,
        metrics: &PairMetrics,
    ) -> io::Result<()> {
        writeln!(out, "\n{}", "─".repeat(80))?;
        writeln!(out, "REPORT #{number}")?;
        writeln!(out, "{}", "─".repeat(80))?;
        writeln!(out, "\nFINDINGS ({} words):", metrics.input_word_count)?;
        writeln!(out, "   {input}")?;
        writeln!(out, "\nIMPRESSION ({} words):", metrics.target_word_count)?;
        writeln!(out, "   {target}")?;
        writeln!(out, "\nMETRICS:")?;
        writeln!(out, "   Compression: {:.1}x", metrics.compression_ratio)?;
        writeln!(out, "   Key terms preserved: {}", metrics.preserved_term_count)?;
        writeln!(out)
    }

    fn overall(&self, out: &mut dyn Write, summary: &ReportSummary) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "OVERALL STATISTICS")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Total samples: {}", summary.total)?;
        writeln!(out, "Average input length: {}", fmt_words(summary.avg_input_words))?;
        writeln!(out, "Average summary length: {}", fmt_words(summary.avg_target_words))?;
        writeln!(out, "Compression ratio: {}", fmt_ratio(summary.compression_ratio))?;
        writeln!(out)
    }

    fn metrics(&self, out: &mut dyn Write, summary: &MetricsSummary) -> io::Result<()> {
        writeln!(out, "\n{}", "=".repeat(60))?;
        writeln!(out, "METRICS SUMMARY ({} samples)", summary.samples)?;
        writeln!(out, "{}", "=".repeat(60))?;
        for s in &summary.scores {
            writeln!(out, "{:15}: {:.4}", s.name, s.value)?;
        }
        if !summary.failures.is_empty() {
            writeln!(out, "Missing metrics: {}", summary.absent().join(", "))?;
        }
        writeln!(out, "{}", "=".repeat(60))
    }
}

// ----------------------------------------------------------------- rich

#[derive(Debug, Default)]
pub struct RichRenderer;

impl RichRenderer {
    fn table(header: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header.iter().map(|h| {
                Cell::new(h)
                    .fg(comfy_table::Color::Magenta)
                    .add_attribute(Attribute::Bold)
            }));
        table
    }

    fn right_align(table: &mut Table, columns: &[usize]) {
        for &c in columns {
            if let Some(col) = table.column_mut(c) {
                col.set_cell_alignment(CellAlignment::Right);
            }
        }
    }

    fn ranked(
        out: &mut dyn Write,
        caption: &str,
        rows: &[TermCount],
        total: Option<usize>,
    ) -> io::Result<()> {
        let mut header = vec!["Term", "Count"];
        if total.is_some() {
            header.push("Percentage");
        }
        let mut table = Self::table(&header);
        for row in rows.iter().take(TOP_SHOWN) {
            let mut cells = vec![
                Cell::new(title_case(&row.term)).fg(comfy_table::Color::Yellow),
                Cell::new(row.count).fg(comfy_table::Color::Green),
            ];
            if let Some(t) = total {
                cells.push(Cell::new(fmt_pct(share(row.count, t))).fg(comfy_table::Color::Cyan));
            }
            table.add_row(cells);
        }
        Self::right_align(&mut table, &[1, 2]);
        writeln!(out, "{}", caption.bold())?;
        writeln!(out, "{table}\n")
    }
}

impl Renderer for RichRenderer {
    fn title(&self, out: &mut dyn Write, title: &str, subtitle: Option<&str>) -> io::Result<()> {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        let mut text = title.cyan().bold().to_string();
        if let Some(sub) = subtitle {
            text = format!("{text}\n{}", sub.yellow());
        }
        table.add_row(vec![Cell::new(text)]);
        writeln!(out, "\n{table}\n")
    }

    fn report(
        &self,
        out: &mut dyn Write,
        dataset: &Dataset,
        summary: &ReportSummary,
    ) -> io::Result<()> {
        let mut table = Self::table(&["Metric", "Value"]);
        table.add_row(vec![
            format!("Total {}", dataset.kind.unit()),
            summary.total.to_string(),
        ]);
        if dataset.kind == DatasetKind::Radiology {
            table.add_row(vec![
                "Normal Findings".to_owned(),
                format!("{} ({})", summary.normal, fmt_pct(summary.normal_share())),
            ]);
            table.add_row(vec![
                "Abnormal Findings".to_owned(),
                format!("{} ({})", summary.abnormal, fmt_pct(summary.abnormal_share())),
            ]);
        }
        table.add_row(vec!["Avg Input Length".to_owned(), fmt_words(summary.avg_input_words)]);
        table.add_row(vec!["Avg Summary Length".to_owned(), fmt_words(summary.avg_target_words)]);
        table.add_row(vec!["Compression Ratio".to_owned(), fmt_ratio(summary.compression_ratio)]);
        writeln!(out, "{}", "Overview Statistics".bold())?;
        writeln!(out, "{table}\n")?;

        match dataset.kind {
            DatasetKind::Radiology => {
                if !summary.conditions.is_empty() {
                    Self::ranked(out, "Most Common Conditions", &summary.conditions, Some(summary.total))?;
                }
                if !summary.anatomy.is_empty() {
                    Self::ranked(out, "Most Referenced Anatomy", &summary.anatomy, None)?;
                }
            }
            DatasetKind::HealthQuestions => {
                if !summary.topics.is_empty() {
                    Self::ranked(out, "Question Topics", &summary.topics, Some(summary.total))?;
                }
            }
            DatasetKind::Dialogue => {}
        }
        Ok(())
    }

    fn samples(
        &self,
        out: &mut dyn Write,
        kind: DatasetKind,
        records: &[Record],
        (input_limit, summary_limit): ClipLimits,
    ) -> io::Result<()> {
        for (i, rec) in records.iter().enumerate() {
            writeln!(out, "{}", format!("Sample #{}", i + 1).cyan().bold())?;
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.add_row(vec![
                Cell::new(kind.input_label()).fg(comfy_table::Color::Yellow),
                Cell::new(clip(rec.input_or_missing(), input_limit)),
            ]);
            table.add_row(vec![
                Cell::new(kind.summary_label()).fg(comfy_table::Color::Green),
                Cell::new(clip(rec.target_or_missing(), summary_limit)),
            ]);
            writeln!(out, "{table}\n")?;
        }
        Ok(())
    }

    fn preview_limits(&self) -> ClipLimits {
        (Some(200), None)
    }

    fn comparison(
        &self,
        out: &mut dyn Write,
        number: usize,
        input: &str,
        target: &str,
        metrics: &PairMetrics,
    ) -> io::Result<()> {
        writeln!(out, "{}\n", format!("Report #{number}").yellow().bold())?;
        let mut table = Self::table(&["", "Content"]);
        table.add_row(vec![Cell::new("FINDINGS").fg(comfy_table::Color::Yellow), Cell::new(input)]);
        table.add_row(vec![
            Cell::new("IMPRESSION").fg(comfy_table::Color::Green),
            Cell::new(target),
        ]);
        table.add_row(vec![
            Cell::new("STATS").fg(comfy_table::Color::Cyan),
            Cell::new(format!(
                "Input: {} words\nOutput: {} words\nCompression: {:.1}x\nKey terms preserved: {}",
                metrics.input_word_count,
                metrics.target_word_count,
                metrics.compression_ratio,
                metrics.preserved_term_count
            )),
        ]);
        writeln!(out, "{table}\n")
    }

    fn overall(&self, out: &mut dyn Write, summary: &ReportSummary) -> io::Result<()> {
        let mut table = Self::table(&["Overall Statistics", ""]);
        table.add_row(vec!["Total samples".to_owned(), summary.total.to_string()]);
        table.add_row(vec!["Average compression".to_owned(), fmt_ratio(summary.compression_ratio)]);
        table.add_row(vec!["Average input".to_owned(), fmt_words(summary.avg_input_words)]);
        table.add_row(vec!["Average summary".to_owned(), fmt_words(summary.avg_target_words)]);
        writeln!(out, "{table}\n")
    }

    fn metrics(&self, out: &mut dyn Write, summary: &MetricsSummary) -> io::Result<()> {
        let mut table = Self::table(&["Metric", "Score"]);
        for s in &summary.scores {
            table.add_row(vec![
                Cell::new(&s.name).fg(comfy_table::Color::Cyan),
                Cell::new(format!("{:.4}", s.value)).fg(comfy_table::Color::Green),
            ]);
        }
        for f in &summary.failures {
            table.add_row(vec![
                Cell::new(&f.metric).fg(comfy_table::Color::Red),
                Cell::new("failed").fg(comfy_table::Color::Red),
            ]);
        }
        Self::right_align(&mut table, &[1]);
        writeln!(out, "{}", format!("Metrics Summary ({} samples)", summary.samples).bold())?;
        writeln!(out, "{table}")?;
        if !summary.failures.is_empty() {
            writeln!(out, "{} {}", "Missing metrics:".red(), summary.absent().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{datasets::by_code, report::build_report, scorers::MetricScore};

    fn rec(input: &str, target: &str) -> Record {
        Record {
            inputs: Some(input.to_owned()),
            target: Some(target.to_owned()),
            ..Record::default()
        }
    }

    fn plain(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn clip_counts_characters() {
        assert_eq!(clip("abcdef", Some(3)), "abc...");
        assert_eq!(clip("abc", Some(3)), "abc");
        assert_eq!(clip("ééé", Some(2)), "éé...");
        assert_eq!(clip("abc", None), "abc");
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(fmt_ratio(None), "N/A");
        assert_eq!(fmt_ratio(Some(4.26)), "4.3x");
        assert_eq!(fmt_words(Some(12.0)), "12.0 words");
        assert_eq!(title_case("side effects"), "Side Effects");
    }

    #[test]
    fn plain_radiology_report() {
        let records = vec![
            rec("left lower lobe effusion", "Small effusion."),
            rec("heart size normal", "No acute disease."),
        ];
        let summary = build_report(&records).unwrap();
        let dataset = by_code("opi").unwrap();
        let text = plain(|out| PlainRenderer.report(out, dataset, &summary));
        assert!(text.contains("Total Reports:"));
        assert!(text.contains("Normal Findings:       1 (50.0%)"));
        assert!(text.contains("MOST COMMON CONDITIONS"));
        assert!(text.contains("Effusion"));
        assert!(!text.contains("QUESTION TOPICS"));
    }

    #[test]
    fn plain_report_on_empty_dataset_prints_na() {
        let summary = build_report(&[]).unwrap();
        let dataset = by_code("opi").unwrap();
        let text = plain(|out| PlainRenderer.report(out, dataset, &summary));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn plain_samples_use_dataset_labels() {
        let records = vec![Record {
            target: Some("Summary".into()),
            ..Record::default()
        }];
        let kind = DatasetKind::HealthQuestions;
        let text = plain(|out| PlainRenderer.samples(out, kind, &records, kind.display_limits()));
        assert!(text.contains("PATIENT QUESTION (Input):\nN/A"));
        assert!(text.contains("SUMMARIZED QUESTION:\nSummary"));
    }

    #[test]
    fn dashboard_previews_are_shorter_than_view_limits() {
        let records = vec![Record {
            inputs: Some("x".repeat(500)),
            target: Some("Impression".into()),
            ..Record::default()
        }];
        let kind = DatasetKind::Radiology;
        let preview = plain(|out| {
            PlainRenderer.samples(out, kind, &records, PlainRenderer.preview_limits())
        });
        assert!(preview.contains(&format!("{}...\n", "x".repeat(150))));
        assert!(!preview.contains(&"x".repeat(151)));

        let full = plain(|out| PlainRenderer.samples(out, kind, &records, kind.display_limits()));
        assert!(full.contains(&"x".repeat(400)));
        assert_eq!(RichRenderer.preview_limits(), (Some(200), None));
    }

    #[test]
    fn plain_metrics_list_missing() {
        let summary = MetricsSummary {
            samples: 2,
            scores: vec![MetricScore::new("BLEU", 0.25)],
            failures: vec![crate::scorers::MetricFailure {
                metric: "BERTScore".into(),
                reason: "nope".into(),
            }],
        };
        let text = plain(|out| PlainRenderer.metrics(out, &summary));
        assert!(text.contains("BLEU           : 0.2500"));
        assert!(text.contains("Missing metrics: BERTScore"));
    }

    #[test]
    fn rich_renderer_writes_tables() {
        colored::control::set_override(false);
        let summary = build_report(&[rec("pleural effusion", "effusion")]).unwrap();
        let text = plain(|out| RichRenderer.report(out, by_code("opi").unwrap(), &summary));
        assert!(text.contains("Overview Statistics"));
        assert!(text.contains("Total Reports"));
        assert!(text.contains('╭'));
    }
}
