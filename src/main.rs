// Command-line entry point. The library in lib.rs carries the pipeline.

use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use console::style;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use image_batch_lib::core::{
    parse_structured_literal, EncoderOption, FailurePolicy, RunConfig,
    DEFAULT_BUTTERAUGLI_TARGET, DEFAULT_MAX_OPTIMIZER_ROUNDS,
};
use image_batch_lib::processing::codecs::check_options;
use image_batch_lib::processing::{BatchMetrics, BatchScheduler, ImagePool};
use image_batch_lib::utils::{
    create_output_dir, expand_inputs, ConvertError, ConvertResult, ENCODERS, PREPROCESSORS,
};

const EXAMPLES: &str = "\
Examples:
  image-batch --webp auto --avif '{cqLevel: 30}' -d out photos/
  image-batch --resize '{width: 800}' --mozjpeg auto -s _small a.png b.png
  image-batch --jpg '{quality: 80}' --on-error skip -c 8 scans/";

/// Converts images into one or more formats, a bounded batch at a time.
///
/// Codec flags take an optional value: omit it (or pass `auto`) for automatic
/// settings, or pass a relaxed JSON object. Put codec flags with an omitted
/// value after the input files, or use `--flag=value`.
#[derive(Debug, Parser)]
#[command(name = "image-batch", version, about, long_about = None, after_help = EXAMPLES)]
struct Cli {
    /// Image files or directories to convert
    files: Vec<PathBuf>,

    /// Directory the converted files are written to
    #[arg(short = 'd', long, default_value = ".", env = "IMAGE_BATCH_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Appended to every output file name before the extension
    #[arg(short, long, env = "IMAGE_BATCH_SUFFIX")]
    suffix: Option<String>,

    /// Files converted at once; also the worker count of every batch
    #[arg(short = 'c', long, env = "IMAGE_BATCH_MAX_CONCURRENT_FILES", default_value_t = num_cpus::get())]
    max_concurrent_files: usize,

    /// Upper bound on quality-search rounds for `auto` encoders
    #[arg(long, default_value_t = DEFAULT_MAX_OPTIMIZER_ROUNDS)]
    max_optimizer_rounds: u32,

    /// Target distance for the `auto` quality search
    #[arg(long, default_value_t = DEFAULT_BUTTERAUGLI_TARGET)]
    optimizer_butteraugli_target: f64,

    /// What to do when a single file fails to convert
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    on_error: FailurePolicy,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Adds one optional-value flag per preprocessor and encoder descriptor.
fn command() -> clap::Command {
    let mut command = Cli::command();

    for descriptor in &PREPROCESSORS {
        command = command.arg(
            Arg::new(descriptor.name)
                .long(descriptor.name)
                .value_name("CONFIG")
                .num_args(0..=1)
                .default_missing_value("{}")
                .help_heading("Preprocessors")
                .help(descriptor.description),
        );
    }

    for descriptor in &ENCODERS {
        let mut arg = Arg::new(descriptor.name)
            .long(descriptor.name)
            .value_name("CONFIG")
            .num_args(0..=1)
            .default_missing_value("auto")
            .help_heading("Encoders")
            .help(format!(
                "Use {} to generate a .{} file with the given configuration",
                descriptor.description, descriptor.extension
            ));
        if descriptor.extension != descriptor.name {
            arg = arg.visible_alias(descriptor.extension);
        }
        command = command.arg(arg);
    }

    command
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr)
        .compact();               // Use compact formatter instead of pretty

    subscriber.init();
}

/// Snapshot of every option, checked before any file is touched.
fn build_config(cli: &Cli, matches: &ArgMatches) -> ConvertResult<RunConfig> {
    let mut config = RunConfig {
        output_dir: std::path::absolute(&cli.output_dir)?,
        suffix: cli.suffix.clone().unwrap_or_default(),
        concurrency: cli.max_concurrent_files,
        max_optimizer_rounds: cli.max_optimizer_rounds,
        butteraugli_target: cli.optimizer_butteraugli_target,
        failure_policy: cli.on_error,
        ..RunConfig::default()
    };

    for descriptor in &PREPROCESSORS {
        if let Some(raw) = matches.get_one::<String>(descriptor.name) {
            config = config.with_preprocessor(descriptor.kind, parse_structured_literal(raw)?);
        }
    }
    for descriptor in &ENCODERS {
        if let Some(raw) = matches.get_one::<String>(descriptor.name) {
            config = config.with_encoder(descriptor.kind, EncoderOption::parse(raw)?);
        }
    }

    config.validate()?;
    check_options(&config)?;
    Ok(config)
}

async fn run(config: RunConfig, paths: &[PathBuf]) -> anyhow::Result<BatchMetrics> {
    create_output_dir(&config.output_dir)
        .await
        .context("Cannot prepare the output directory")?;
    let files = expand_inputs(paths)
        .await
        .context("Cannot resolve the input files")?;
    debug!("Resolved {} input files", files.len());

    let scheduler = BatchScheduler::new(config);
    let metrics = scheduler
        .run::<ImagePool>(&files)
        .await
        .context("Batch processing failed")?;
    Ok(metrics)
}

/// Only failures to set the run up (output directory, input resolution,
/// configuration) change the exit status.
fn ends_run_with_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ConvertError>()
        .is_some_and(ConvertError::is_fatal_setup)
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut command = command();
    let matches = command.clone().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(cli.verbose);

    if cli.files.is_empty() {
        println!("{}", style("No input files specified. Showing help...").yellow());
        let _ = command.print_help();
        return ExitCode::SUCCESS;
    }

    let config = match build_config(&cli, &matches) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if config.encoders.is_empty() {
        info!("No encoders enabled, files are decoded and preprocessed only");
    }

    match run(config, &cli.files).await {
        Ok(metrics) => {
            println!("{}", style(&metrics).bold());
            ExitCode::SUCCESS
        }
        Err(e) if ends_run_with_failure(&e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
        Err(e) => {
            // In-chunk failures are reported, not turned into an exit status
            error!("{e:#}");
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_batch_lib::utils::EncoderKind;

    fn parse(args: &[&str]) -> (Cli, ArgMatches) {
        let matches = command().try_get_matches_from(args).unwrap();
        (Cli::from_arg_matches(&matches).unwrap(), matches)
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn bare_codec_flags_default_to_auto_and_empty_options() {
        let (cli, matches) = parse(&["image-batch", "a.png", "--webp", "--resize"]);
        let config = build_config(&cli, &matches).unwrap();
        assert_eq!(config.encoders, vec![(EncoderKind::WebP, EncoderOption::Auto)]);
        assert_eq!(config.preprocessors.len(), 1);
    }

    #[test]
    fn extension_aliases_select_encoders() {
        let (cli, matches) = parse(&["image-batch", "--jpg", "{quality: 60}", "--png=auto", "a.png"]);
        let config = build_config(&cli, &matches).unwrap();
        let kinds: Vec<EncoderKind> = config.encoders.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![EncoderKind::MozJpeg, EncoderKind::OxiPng]);
    }

    #[tokio::test]
    async fn only_setup_failures_change_the_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"not an image").unwrap();

        let config = RunConfig {
            output_dir: blocker.join("out"),
            concurrency: 1,
            ..RunConfig::default()
        };
        let err = run(config, &[broken.clone()]).await.unwrap_err();
        assert!(ends_run_with_failure(&err));

        let config = RunConfig {
            output_dir: dir.path().join("out"),
            concurrency: 1,
            ..RunConfig::default()
        }
        .with_encoder(EncoderKind::OxiPng, EncoderOption::Auto);
        let err = run(config, &[broken]).await.unwrap_err();
        assert!(!ends_run_with_failure(&err), "{err:#}");
    }

    #[test]
    fn invalid_literal_is_a_configuration_error() {
        let (cli, matches) = parse(&["image-batch", "--avif", "{cqLevel: ", "a.png"]);
        assert!(build_config(&cli, &matches).unwrap_err().is_fatal_setup());

        let (cli, matches) = parse(&["image-batch", "-c", "0", "a.png"]);
        assert!(build_config(&cli, &matches).is_err());
    }

    #[test]
    fn global_options_reach_the_config() {
        let (cli, matches) = parse(&[
            "image-batch", "-d", "out", "-s", "_x", "-c", "3",
            "--max-optimizer-rounds", "2", "--on-error", "skip", "a.png",
        ]);
        let config = build_config(&cli, &matches).unwrap();
        assert!(config.output_dir.ends_with("out"));
        assert!(config.output_dir.is_absolute());
        assert_eq!(config.suffix, "_x");
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_optimizer_rounds, 2);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
    }
}
