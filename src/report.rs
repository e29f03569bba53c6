//! End-to-end analysis of a raw latency table and report rendering
//!
//! Shared by the `analyze-*` and `measure-*` commands so a freshly measured
//! table and one loaded from disk go through exactly the same path.

use crate::cli::OutputFormat;
use crate::csv_output::CsvTableOutput;
use crate::inference::{
    analyze_cache_levels, analyze_jumps_for_assoc, analyze_jumps_for_line_size,
    detect_jump_table, AnalysisConfig, ChangepointDetector, HardwareFact,
};
use crate::json_output::JsonReport;
use crate::result_table::ResultTable;
use anyhow::Result;

/// Which inference runs over the raw table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Assoc,
    LineSize,
    Levels,
}

impl AnalysisKind {
    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::Assoc => "assoc",
            AnalysisKind::LineSize => "line_size",
            AnalysisKind::Levels => "levels",
        }
    }
}

/// Facts plus the jump table they were derived from
#[derive(Debug, Clone)]
pub struct Outcome {
    pub kind: AnalysisKind,
    pub facts: Vec<HardwareFact>,
    /// Per-row jumps; absent for level analysis, which treats the table as one curve
    pub jumps: Option<ResultTable<usize, usize>>,
}

/// Run one analysis over a raw latency table
///
/// # Errors
/// Level analysis fails when the table is too short for the detector
/// windows. Row-wise analyses skip unusable rows instead.
pub fn analyze(
    kind: AnalysisKind,
    raw: &ResultTable<usize, f32>,
    config: &AnalysisConfig,
) -> Result<Outcome> {
    let detector = ChangepointDetector::from_config(config);

    let outcome = match kind {
        AnalysisKind::Assoc => {
            let jumps = detect_jump_table(raw, &detector);
            Outcome {
                kind,
                facts: analyze_jumps_for_assoc(&jumps, config),
                jumps: Some(jumps),
            }
        }
        AnalysisKind::LineSize => {
            let jumps = detect_jump_table(raw, &detector);
            Outcome {
                kind,
                facts: analyze_jumps_for_line_size(&jumps, config)
                    .into_iter()
                    .collect(),
                jumps: Some(jumps),
            }
        }
        AnalysisKind::Levels => Outcome {
            kind,
            facts: analyze_cache_levels(raw, &detector)?,
            jumps: None,
        },
    };

    tracing::info!(
        analysis = kind.name(),
        facts = outcome.facts.len(),
        "analysis complete"
    );
    Ok(outcome)
}

/// Render an outcome in the requested format
pub fn render(outcome: &Outcome, config: &AnalysisConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(outcome)),
        OutputFormat::Json => {
            let mut report =
                JsonReport::new(outcome.kind.name(), config).with_facts(outcome.facts.clone());
            if let Some(jumps) = &outcome.jumps {
                report = report.with_jumps(jumps);
            }
            let mut json = report.to_json()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => Ok(render_csv(outcome)),
    }
}

fn render_text(outcome: &Outcome) -> String {
    if outcome.facts.is_empty() {
        return format!("No {} facts inferred\n", outcome.kind.name());
    }

    outcome
        .facts
        .iter()
        .map(|fact| format!("{}\n", fact))
        .collect()
}

fn render_csv(outcome: &Outcome) -> String {
    let mut output = String::from("kind,value\n");
    for fact in &outcome.facts {
        output.push_str(&format!("{:?},{}\n", fact.kind(), fact.value()));
    }
    output
}

/// Jump table as header-less CSV, one row per key
pub fn jumps_csv(jumps: &ResultTable<usize, usize>) -> String {
    CsvTableOutput::new().without_header().to_csv(jumps)
}
