use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gocompare_common::{
    ensure_config, load_config, AppConfig, HashAlgorithm, Phase, ProgressEvent, ProgressSink,
    SortOrder,
};
use gocompare_core::{format_json, format_text, summary_line, write_report, ComparisonEngine};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status when the trees differ
const EXIT_DIFFERENCES: i32 = 2;

#[derive(Parser)]
#[command(name = "gocompare")]
#[command(author = "GoCompare Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Compare the contents of a pair of directories using checksums", long_about = None)]
struct Cli {
    /// Use the configuration file next to the executable
    #[arg(long, global = true)]
    portable: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a source directory against a target directory
    Compare {
        /// Source ("from") directory
        from: PathBuf,

        /// Target ("to") directory
        to: PathBuf,

        /// Write the report here instead of stdout
        output: Option<PathBuf>,

        /// Ordering of listed paths: default, locale or natural
        #[arg(short, long, value_parser = parse_sort_order)]
        sort: Option<SortOrder>,

        /// Shorthand for --sort natural
        #[arg(short = 'n', long, conflicts_with = "sort")]
        natural: bool,

        /// Checksum algorithm: blake3, sha256 or md5
        #[arg(short, long, value_parser = parse_algorithm)]
        algorithm: Option<HashAlgorithm>,

        /// Report progress every N files
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        report_every: Option<u64>,

        /// Show a progress bar on stderr
        #[arg(short, long)]
        progress: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },
    /// Create the configuration file if needed and print it
    Config,
}

fn parse_sort_order(value: &str) -> Result<SortOrder, String> {
    value.parse().map_err(|e: gocompare_common::GoCompareError| e.to_string())
}

fn parse_algorithm(value: &str) -> Result<HashAlgorithm, String> {
    value.parse().map_err(|e: gocompare_common::GoCompareError| e.to_string())
}

struct CompareArgs {
    from: PathBuf,
    to: PathBuf,
    output: Option<PathBuf>,
    sort: Option<SortOrder>,
    algorithm: Option<HashAlgorithm>,
    report_every: Option<usize>,
    progress: bool,
    json: bool,
    force: bool,
}

fn main() {
    // Initialize tracing to stderr (so reports can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Compare {
            from,
            to,
            output,
            sort,
            natural,
            algorithm,
            report_every,
            progress,
            json,
            force,
        } => {
            let args = CompareArgs {
                from,
                to,
                output,
                sort: if natural { Some(SortOrder::Natural) } else { sort },
                algorithm,
                report_every: report_every.map(|n| n as usize),
                progress,
                json,
                force,
            };
            run_compare(args, cli.portable)
        }
        Commands::Config => run_config(cli.portable).map(|_| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_DIFFERENCES),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn run_config(portable: bool) -> anyhow::Result<()> {
    let loaded = ensure_config(portable)?;
    println!("# {}", loaded.path.display());
    print!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

/// Merge command-line overrides into the loaded configuration
fn effective_config(mut config: AppConfig, args: &CompareArgs) -> AppConfig {
    if let Some(sort) = args.sort {
        config.sort_order = sort;
    }
    if let Some(algorithm) = args.algorithm {
        config.hash_algorithm = algorithm;
    }
    if args.report_every.is_some() {
        config.report_every = args.report_every;
    }
    config
}

fn check_output(output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() {
        if !force {
            bail!(
                "Output file {} already exists (use --force to overwrite)",
                output.display()
            );
        }
        warn!("Overwriting existing report {}", output.display());
    }
    Ok(())
}

/// Returns whether the comparison passed
fn run_compare(args: CompareArgs, portable: bool) -> anyhow::Result<bool> {
    if let Some(output) = &args.output {
        check_output(output, args.force)?;
    }

    let loaded = load_config(portable).context("Failed to load configuration")?;
    let config = effective_config(loaded.config, &args);

    info!("Comparing:");
    info!("  From: {}", args.from.display());
    info!("  To:   {}", args.to.display());

    let engine = ComparisonEngine::from_config(&config);
    let bar = args.progress.then(BarSink::new);
    let sink = bar.as_ref().map(|b| b as &dyn ProgressSink);

    let result = engine.run(&args.from, &args.to, sink);
    if let Some(bar) = &bar {
        bar.finish();
    }
    let result = result?;

    if args.json {
        let rendered = format_json(&result)?;
        match &args.output {
            Some(path) => std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?,
            None => println!("{rendered}"),
        }
    } else {
        match &args.output {
            Some(path) => write_report(&result, path)?,
            None => print!("{}", format_text(&result)),
        }
    }

    info!("{}", summary_line(&result));
    Ok(result.is_success())
}

/// Progress sink that drives a terminal progress bar
struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.yellow} [{elapsed_precise}] [{bar:40.blue/grey}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarSink {
    fn on_event(&self, event: &ProgressEvent) {
        match event.phase {
            Phase::Examining => {
                self.bar.set_length(event.total as u64);
                self.bar.set_position(event.processed as u64);
                if let Some(path) = &event.current_path {
                    self.bar.set_message(path.to_string());
                }
            }
            _ => self.bar.set_message(event.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args() -> CompareArgs {
        CompareArgs {
            from: PathBuf::from("from"),
            to: PathBuf::from("to"),
            output: None,
            sort: None,
            algorithm: None,
            report_every: None,
            progress: false,
            json: false,
            force: false,
        }
    }

    #[test]
    fn test_effective_config_keeps_file_values() {
        let config = AppConfig {
            sort_order: SortOrder::Locale,
            report_every: Some(4),
            ..AppConfig::default()
        };
        let merged = effective_config(config.clone(), &args());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_effective_config_applies_overrides() {
        let mut overrides = args();
        overrides.sort = Some(SortOrder::Natural);
        overrides.algorithm = Some(HashAlgorithm::Sha256);
        overrides.report_every = Some(10);

        let merged = effective_config(AppConfig::default(), &overrides);
        assert_eq!(merged.sort_order, SortOrder::Natural);
        assert_eq!(merged.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(merged.report_every, Some(10));
    }

    #[test]
    fn test_check_output_refuses_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.txt");
        assert!(check_output(&path, false).is_ok());

        std::fs::write(&path, "old").unwrap();
        assert!(check_output(&path, false).is_err());
        assert!(check_output(&path, true).is_ok());
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_sort_order("natural").unwrap(), SortOrder::Natural);
        assert!(parse_sort_order("zigzag").is_err());
        assert_eq!(parse_algorithm("sha256").unwrap(), HashAlgorithm::Sha256);
        assert_eq!(parse_algorithm("md5").unwrap(), HashAlgorithm::Md5);
        assert!(parse_algorithm("md4").is_err());
    }
}
