//! JSON output format for inference reports

use crate::inference::{AnalysisConfig, HardwareFact};
use crate::result_table::ResultTable;
use serde::Serialize;

/// Detected jumps for one swept key
#[derive(Debug, Clone, Serialize)]
pub struct JsonJumpRow {
    /// Sweep key (stride or working-set bytes)
    pub key: usize,
    /// Jump positions, strictly increasing
    pub jumps: Vec<usize>,
}

/// Complete analysis report
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Crate version that produced the report
    pub version: String,
    /// Which analysis ran ("assoc", "line_size", "levels")
    pub analysis: String,
    /// Inferred facts in emission order
    pub facts: Vec<HardwareFact>,
    /// Per-row jump positions (empty for level analysis)
    pub jumps: Vec<JsonJumpRow>,
    /// Parameters used
    pub config: AnalysisConfig,
}

impl JsonReport {
    pub fn new(analysis: &str, config: &AnalysisConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            analysis: analysis.to_string(),
            facts: Vec::new(),
            jumps: Vec::new(),
            config: config.clone(),
        }
    }

    pub fn with_facts(mut self, facts: Vec<HardwareFact>) -> Self {
        self.facts = facts;
        self
    }

    pub fn with_jumps(mut self, table: &ResultTable<usize, usize>) -> Self {
        self.jumps = table
            .rows()
            .iter()
            .map(|row| JsonJumpRow {
                key: row.key,
                jumps: row.values.clone(),
            })
            .collect();
        self
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
