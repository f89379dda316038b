/*!
# goreduce CLI

Command-line interface for reducing a Go source file against a command
oracle.
*/

use anyhow::{Context, Result};
use clap::Parser;
use goreduce::cli_common::{
    init_logging, print_error, print_success, print_warning, validate_path, CommonArgs,
    OracleArgs, OutputArgs, OutputFormat, OutputWriter, ReductionProgress,
};
use goreduce::{CommandOracle, GoParser, Reducer, ReducerConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "goreduce",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reduce a Go program while a check keeps matching its output"
)]
struct Cli {
    /// Go source file to reduce
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    oracle: OracleArgs,

    /// Configuration file (TOML, or YAML for .yaml/.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many passes
    #[arg(long)]
    max_passes: Option<usize>,

    /// Wall-clock budget in seconds, checked between passes
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.log_level())?;

    validate_path(&cli.file, "Input file")?;
    let format: OutputFormat = cli.output.format.parse()?;

    let mut config = match &cli.config {
        Some(path) => ReducerConfig::load_from_file(path)?,
        None => ReducerConfig::default(),
    };
    cli.oracle.apply(&mut config);
    if let Some(max_passes) = cli.max_passes {
        config.max_passes = Some(max_passes);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    for warning in config.validate() {
        print_warning(&warning);
    }
    if config.oracle.pattern.is_none() {
        anyhow::bail!("No match pattern given; pass --match or set `match` in the [oracle] config table");
    }

    let tree = GoParser::new()
        .parse_file(&cli.file)
        .with_context(|| format!("Failed to parse {}", cli.file.display()))?;
    let oracle = CommandOracle::new(&config.oracle)?;
    info!("Oracle: {}", oracle.command_line().join(" "));
    let mut reducer = Reducer::with_config(tree, oracle, config);

    let mut progress = ReductionProgress::new(cli.common.should_print());
    if let Err(e) = reducer.check_initial() {
        progress.finish();
        return Err(e).context("Refusing to reduce");
    }

    progress.set_message("Reducing...");
    let report = reducer.run_with(|change| progress.record(change));
    progress.finish();
    let report = report.context("Reduction aborted")?;

    let target = cli.output.output.as_ref().unwrap_or(&cli.file);
    std::fs::write(target, reducer.source())
        .with_context(|| format!("Failed to write {}", target.display()))?;

    if cli.common.should_print() || format == OutputFormat::Json {
        let mut writer = OutputWriter::stdout(format).with_pretty(cli.output.pretty);
        writer.write_report(&report)?;
        writer.flush()?;
    }
    if cli.common.should_print() {
        print_success(&format!("Reduced program written to {}", target.display()));
    }
    Ok(())
}
