//! Facade flatness CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facade_flatness::{
    image_io, inspect_image, report,
    types::{BorderSegmentationConfig, InspectionConfig, MatchMethod},
};
use std::path::PathBuf;

/// Facade flatness: detect misaligned glass panes from reflection continuity
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect a curtain-wall photograph and annotate the evaluated panes
    Inspect {
        /// Input facade image (JPEG, PNG, TIFF)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Annotated output image (default: INPUT_inspected.EXT)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Edge matching strategy: chroma or contours (default: from config, else chroma)
        #[arg(short, long, value_name = "METHOD")]
        method: Option<MatchMethod>,

        /// Write the {edgePair, isMatch} result list as JSON
        #[arg(short, long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Write the full inspection report (panes, boxes, results) as JSON
        #[arg(long, value_name = "FILE")]
        full_report: Option<PathBuf>,

        /// JSON configuration file; flags below override it
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Contour boundary tolerance in pixels (default: 20)
        #[arg(short, long, value_name = "PIXELS")]
        tolerance: Option<u32>,

        /// Minimum distance between vertical grid lines (default: 1800)
        #[arg(long, value_name = "PIXELS")]
        vertical_separation: Option<u32>,

        /// Minimum distance between horizontal grid lines (default: 500)
        #[arg(long, value_name = "PIXELS")]
        horizontal_separation: Option<u32>,

        /// External border segmentation program
        #[arg(long, value_name = "PROGRAM", requires = "border_config")]
        border_program: Option<PathBuf>,

        /// Configuration file passed to the border segmentation program
        #[arg(long, value_name = "FILE", requires = "border_program")]
        border_config: Option<PathBuf>,

        /// Directory the border segmentation program writes masks to
        #[arg(long, value_name = "DIR", requires = "border_program")]
        border_save_dir: Option<PathBuf>,

        /// Decompose the raw photograph without reflection extraction
        #[arg(long)]
        no_preprocess: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,

        /// Show detailed timing information
        #[arg(long)]
        benchmark: bool,
    },

    /// Print the default configuration as JSON
    DefaultConfig,
}

/// Options of the `inspect` subcommand after parsing
struct InspectArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    method: Option<MatchMethod>,
    report: Option<PathBuf>,
    full_report: Option<PathBuf>,
    config: Option<PathBuf>,
    tolerance: Option<u32>,
    vertical_separation: Option<u32>,
    horizontal_separation: Option<u32>,
    border_program: Option<PathBuf>,
    border_config: Option<PathBuf>,
    border_save_dir: Option<PathBuf>,
    no_preprocess: bool,
    benchmark: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect {
            input,
            output,
            method,
            report,
            full_report,
            config,
            tolerance,
            vertical_separation,
            horizontal_separation,
            border_program,
            border_config,
            border_save_dir,
            no_preprocess,
            quiet,
            benchmark,
        } => {
            init_logging(quiet);
            run_inspect(InspectArgs {
                input,
                output,
                method,
                report,
                full_report,
                config,
                tolerance,
                vertical_separation,
                horizontal_separation,
                border_program,
                border_config,
                border_save_dir,
                no_preprocess,
                benchmark,
            })
        }

        Command::DefaultConfig => {
            let json = serde_json::to_string_pretty(&InspectionConfig::default())
                .context("Failed to serialize default configuration")?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

fn build_config(args: &InspectArgs) -> Result<InspectionConfig> {
    let mut config = match &args.config {
        Some(path) => InspectionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => InspectionConfig::default(),
    };

    if let Some(method) = args.method {
        config.method = method;
    }
    if let Some(tolerance) = args.tolerance {
        config.contours.tolerance = tolerance;
    }
    if let Some(separation) = args.vertical_separation {
        config.lines.vertical_min_separation = separation;
    }
    if let Some(separation) = args.horizontal_separation {
        config.lines.horizontal_min_separation = separation;
    }
    if let (Some(program), Some(config_file)) = (&args.border_program, &args.border_config) {
        let previous = config.border.take();
        config.border = Some(BorderSegmentationConfig {
            program: program.clone(),
            args: previous.as_ref().map(|b| b.args.clone()).unwrap_or_default(),
            config_file: config_file.clone(),
            save_dir: args
                .border_save_dir
                .clone()
                .or_else(|| previous.map(|b| b.save_dir))
                .unwrap_or_else(|| PathBuf::from("output")),
        });
    }
    if args.no_preprocess {
        config.skip_preprocess = true;
    }
    if args.benchmark {
        config.benchmark = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let output_path = match &args.output {
        Some(out) => out.clone(),
        None => image_io::generate_output_path(&args.input, None)
            .context("Failed to generate output path")?,
    };
    let config = build_config(&args)?;

    log::info!("Facade flatness v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Input:  {}", args.input.display());
    log::info!("Output: {}", output_path.display());
    log::info!("Method: {}", config.method);

    let inspection = inspect_image(&args.input, &output_path, &config)
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    for result in &inspection.results {
        println!(
            "{:>3} {:<5} {:>3}  {}",
            result.pane_a,
            result.direction,
            result.pane_b,
            if result.is_match { "match" } else { "MISMATCH" }
        );
    }
    println!(
        "{} panes, {} pairs, {} mismatched",
        inspection.panes.len(),
        inspection.results.len(),
        inspection.mismatched()
    );
    let suspects = inspection.suspect_panes();
    if !suspects.is_empty() {
        println!("Panes mismatching on every seam: {:?}", suspects);
    }

    if let Some(path) = &args.report {
        let entries = report::consumer_entries(&inspection);
        let json = serde_json::to_string_pretty(&entries).context("Failed to serialize results")?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Results written to {}", path.display());
    }
    if let Some(path) = &args.full_report {
        report::write_json(path, &inspection)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
