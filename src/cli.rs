//! CLI argument parsing for cachescope

use crate::harness::{LevelSweepConfig, StrideSchedule, SweepConfig};
use crate::inference::{AnalysisConfig, ScanDirection};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// Row scan order for the correlation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanArg {
    Descending,
    Ascending,
}

impl From<ScanArg> for ScanDirection {
    fn from(arg: ScanArg) -> Self {
        match arg {
            ScanArg::Descending => ScanDirection::Descending,
            ScanArg::Ascending => ScanDirection::Ascending,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cachescope")]
#[command(version)]
#[command(about = "Infer CPU cache geometry from pointer-chasing latency curves", long_about = None)]
pub struct Cli {
    /// Enable debug tracing to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// TOML configuration file ([analysis], [sweep], [levels] sections)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json or csv)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub detection: DetectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Detector and correlator overrides (take precedence over the config file)
#[derive(Args, Debug, Default)]
pub struct DetectionArgs {
    /// Width of the before/after comparison windows
    #[arg(long = "window-size", value_name = "N", global = true)]
    pub window_size: Option<usize>,

    /// Minimum mean ratio that counts as a jump
    #[arg(long = "jump-scale", value_name = "RATIO", global = true)]
    pub jump_scale: Option<f64>,

    /// Noise gate as a fraction of the first sample
    #[arg(long = "std-dev-scale", value_name = "FRACTION", global = true)]
    pub std_dev_scale: Option<f64>,

    /// Jumps closer than this collapse into one
    #[arg(long = "min-separation", value_name = "N", global = true)]
    pub min_separation: Option<usize>,

    /// Row scan order for associativity inference
    #[arg(long = "scan", value_enum, global = true)]
    pub scan: Option<ScanArg>,
}

impl DetectionArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(window_size) = self.window_size {
            config.window_size = window_size;
        }
        if let Some(jump_scale) = self.jump_scale {
            config.jump_scale = jump_scale;
        }
        if let Some(std_dev_scale) = self.std_dev_scale {
            config.std_dev_scale = std_dev_scale;
        }
        if let Some(min_separation) = self.min_separation {
            config.min_separation = min_separation;
        }
        if let Some(scan) = self.scan {
            config.scan_direction = scan.into();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Infer associativity from a raw stride x spots latency table
    AnalyzeAssoc(AnalyzeArgs),
    /// Infer the cache line size from an interleaved stride table
    AnalyzeLineSize(AnalyzeArgs),
    /// Infer cache level sizes from a working-set latency table
    AnalyzeLevels(AnalyzeArgs),
    /// Print the detected jump table of a raw latency table
    Jumps(AnalyzeArgs),
    /// Measure a stride x spots table, then infer associativity
    MeasureAssoc(MeasureArgs),
    /// Measure an interleaved stride table, then infer the line size
    MeasureLineSize(MeasureArgs),
    /// Measure working-set latencies, then infer cache level sizes
    MeasureLevels(LevelArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Raw latency table (CSV)
    pub input: PathBuf,

    /// Also write the jump table (CSV, no header) to this file
    #[arg(long = "jumps-out", value_name = "FILE")]
    pub jumps_out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct MeasureArgs {
    /// Probe arena size in bytes
    #[arg(long = "max-memory", value_name = "BYTES")]
    pub max_memory: Option<usize>,

    /// Largest probe count per stride
    #[arg(long = "max-ways", value_name = "N")]
    pub max_ways: Option<usize>,

    #[arg(long = "min-stride", value_name = "BYTES")]
    pub min_stride: Option<usize>,

    #[arg(long = "max-stride", value_name = "BYTES")]
    pub max_stride: Option<usize>,

    /// Dependent loads per timed walk
    #[arg(long = "repeats", value_name = "N")]
    pub repeats: Option<u64>,

    /// CPU to pin the measuring thread to
    #[arg(long = "cpu", value_name = "ID")]
    pub cpu: Option<usize>,

    /// Do not pin the measuring thread
    #[arg(long = "no-pin", conflicts_with = "cpu")]
    pub no_pin: bool,

    /// RNG seed for chain permutations
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Write the raw latency table (CSV) to this file
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Display scale for the written table (e.g. 10 or 100, values rounded)
    #[arg(long = "scale", value_name = "FACTOR")]
    pub scale: Option<f64>,
}

impl MeasureArgs {
    /// Sweep parameters for one run: `base` from the config file, overridden
    /// by these flags; `schedule` replaces the configured stride schedule
    /// when the command needs a specific one
    pub fn sweep_config(
        &self,
        base: &SweepConfig,
        schedule: Option<StrideSchedule>,
    ) -> SweepConfig {
        let mut config = base.clone();
        if let Some(schedule) = schedule {
            config.schedule = schedule;
        }
        self.apply(&mut config);
        config
    }

    pub fn apply(&self, config: &mut SweepConfig) {
        if let Some(max_memory) = self.max_memory {
            config.max_memory = max_memory;
        }
        if let Some(max_ways) = self.max_ways {
            config.max_ways = max_ways;
        }
        if let Some(min_stride) = self.min_stride {
            config.min_stride = min_stride;
        }
        if let Some(max_stride) = self.max_stride {
            config.max_stride = max_stride;
        }
        if let Some(repeats) = self.repeats {
            config.repeats = repeats;
        }
        if self.cpu.is_some() {
            config.cpu = self.cpu;
        }
        if self.no_pin {
            config.cpu = None;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct LevelArgs {
    #[arg(long = "min-bytes", value_name = "BYTES")]
    pub min_bytes: Option<usize>,

    #[arg(long = "max-bytes", value_name = "BYTES")]
    pub max_bytes: Option<usize>,

    /// Timed walks per working-set size
    #[arg(long = "experiments", value_name = "N")]
    pub experiments: Option<usize>,

    /// Warm-up laps before each timed lap
    #[arg(long = "warmup-passes", value_name = "N")]
    pub warmup_passes: Option<u64>,

    #[arg(long = "cpu", value_name = "ID")]
    pub cpu: Option<usize>,

    #[arg(long = "no-pin", conflicts_with = "cpu")]
    pub no_pin: bool,

    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Write the working-set table (CSV) to this file
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Display scale for the written table (e.g. 10 or 100, values rounded)
    #[arg(long = "scale", value_name = "FACTOR")]
    pub scale: Option<f64>,
}

impl LevelArgs {
    pub fn apply(&self, config: &mut LevelSweepConfig) {
        if let Some(min_bytes) = self.min_bytes {
            config.min_bytes = min_bytes;
        }
        if let Some(max_bytes) = self.max_bytes {
            config.max_bytes = max_bytes;
        }
        if let Some(experiments) = self.experiments {
            config.experiments = experiments;
        }
        if let Some(warmup_passes) = self.warmup_passes {
            config.warmup_passes = warmup_passes;
        }
        if self.cpu.is_some() {
            config.cpu = self.cpu;
        }
        if self.no_pin {
            config.cpu = None;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}
