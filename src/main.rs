use anyhow::{Context, Result};
use cachescope::cli::{AnalyzeArgs, Cli, Command, LevelArgs, MeasureArgs, OutputFormat};
use cachescope::config::Config;
use cachescope::csv_output::{parse_table, CsvTableOutput};
use cachescope::harness::{
    assoc_sweep, level_sweep, try_pin, LevelSweepConfig, ProbeArena, StrideSchedule,
};
use cachescope::inference::{detect_jump_table, AnalysisConfig, ChangepointDetector};
use cachescope::report::{analyze, jumps_csv, render, AnalysisKind};
use cachescope::result_table::ResultTable;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber: everything with --debug, warnings otherwise
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_toml(path)?,
        None => Config::default(),
    };
    cli.detection.apply(&mut config.analysis);
    config.analysis.validate()?;
    Ok(config)
}

fn read_raw_table(path: &Path) -> Result<ResultTable<usize, f32>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read table: {}", path.display()))?;
    let table = parse_table(&text).with_context(|| format!("Invalid table: {}", path.display()))?;
    tracing::debug!(rows = table.len(), "table loaded");
    Ok(table)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn table_writer(scale: Option<f64>) -> CsvTableOutput {
    match scale {
        Some(scale) => CsvTableOutput::new().with_scale(scale),
        None => CsvTableOutput::new(),
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn report(
    kind: AnalysisKind,
    raw: &ResultTable<usize, f32>,
    config: &AnalysisConfig,
    format: OutputFormat,
    jumps_out: Option<&Path>,
) -> Result<()> {
    let outcome = analyze(kind, raw, config)?;

    if let (Some(path), Some(jumps)) = (jumps_out, &outcome.jumps) {
        write_output(path, &jumps_csv(jumps))?;
    }

    print!("{}", render(&outcome, config, format)?);
    Ok(())
}

fn run_analyze(
    kind: AnalysisKind,
    args: &AnalyzeArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let raw = read_raw_table(&args.input)?;
    report(kind, &raw, &config.analysis, format, args.jumps_out.as_deref())
}

fn run_jumps(args: &AnalyzeArgs, config: &Config) -> Result<()> {
    let raw = read_raw_table(&args.input)?;
    let detector = ChangepointDetector::from_config(&config.analysis);
    let csv = jumps_csv(&detect_jump_table(&raw, &detector));

    match &args.jumps_out {
        Some(path) => write_output(path, &csv),
        None => {
            print!("{}", csv);
            Ok(())
        }
    }
}

fn run_measure(
    kind: AnalysisKind,
    args: &MeasureArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    // line-size rules need S, S + S/2 pairs; other runs keep [sweep] schedule
    let forced = (kind == AnalysisKind::LineSize).then_some(StrideSchedule::Interleaved);
    let sweep = args.sweep_config(&config.sweep, forced);
    sweep.validate()?;

    try_pin(sweep.cpu);
    let mut rng = seeded_rng(sweep.seed);
    let mut arena = ProbeArena::new(sweep.max_memory)
        .with_context(|| format!("Failed to map {} bytes", sweep.max_memory))?;

    tracing::info!(schedule = ?sweep.schedule, max_ways = sweep.max_ways, "starting stride sweep");
    let raw = assoc_sweep(&mut arena, &sweep, &mut rng)?;

    if let Some(path) = &args.out {
        write_output(path, &table_writer(args.scale).to_csv(&raw))?;
    }

    report(kind, &raw, &config.analysis, format, None)
}

fn run_measure_levels(args: &LevelArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut levels: LevelSweepConfig = config.levels.clone();
    args.apply(&mut levels);
    levels.validate()?;

    try_pin(levels.cpu);
    let mut rng = seeded_rng(levels.seed);
    let mut arena = ProbeArena::new(levels.max_bytes)
        .with_context(|| format!("Failed to map {} bytes", levels.max_bytes))?;

    tracing::info!(max_bytes = levels.max_bytes, "starting working-set sweep");
    let raw = level_sweep(&mut arena, &levels, &mut rng)?;

    if let Some(path) = &args.out {
        write_output(path, &table_writer(args.scale).to_csv(&raw))?;
    }

    report(AnalysisKind::Levels, &raw, &config.analysis, format, None)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    let format = cli.format;

    match &cli.command {
        Command::AnalyzeAssoc(args) => run_analyze(AnalysisKind::Assoc, args, &config, format),
        Command::AnalyzeLineSize(args) => {
            run_analyze(AnalysisKind::LineSize, args, &config, format)
        }
        Command::AnalyzeLevels(args) => run_analyze(AnalysisKind::Levels, args, &config, format),
        Command::Jumps(args) => run_jumps(args, &config),
        Command::MeasureAssoc(args) => run_measure(AnalysisKind::Assoc, args, &config, format),
        Command::MeasureLineSize(args) => {
            run_measure(AnalysisKind::LineSize, args, &config, format)
        }
        Command::MeasureLevels(args) => run_measure_levels(args, &config, format),
    }
}
