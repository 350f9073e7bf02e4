#![deny(unsafe_code)]
//! CLI binary for the flowtrail particle-trail simulator.
//!
//! Subcommands:
//! - `run <source>`: bake a procedural field, run N ticks, print a summary
//! - `list`: print available field sources and engine tunables
//! - `replay <file>`: run a saved `RunSpec`

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flowtrail_core::RunSpec;
use flowtrail_host::pixel::Rgba8;
use flowtrail_host::{replay, snapshot, FieldKind, RunReport};
use flowtrail_lines::FlowLinesParams;
use log::{info, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const BACKGROUND: Rgba8 = [255, 255, 255, 255];

#[derive(Parser)]
#[command(name = "flowtrail", about = "Headless flow-lines particle simulator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Snapshot options shared by `run` and `replay`.
#[derive(clap::Args)]
struct SnapshotArgs {
    /// Write the last frame's points to this PNG.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Snapshot width in pixels.
    #[arg(long, default_value_t = 800)]
    png_width: usize,

    /// Snapshot height in pixels.
    #[arg(long, default_value_t = 400)]
    png_height: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Bake a procedural field and run the simulation for N ticks.
    Run {
        /// Field source name (curl, perlin, vortex, uniform).
        source: String,

        /// Field width in cells.
        #[arg(short = 'W', long, default_value_t = 160)]
        width: usize,

        /// Field height in cells.
        #[arg(short = 'H', long, default_value_t = 80)]
        height: usize,

        /// Number of ticks.
        #[arg(short, long, default_value_t = 500)]
        ticks: usize,

        /// Elapsed time per tick.
        #[arg(long, default_value_t = 1.0)]
        dt: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Engine tunables and source knobs as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Save the run description for `replay`.
        #[arg(long)]
        save: Option<PathBuf>,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
    /// List field sources and engine tunables.
    List,
    /// Run a saved run description.
    Replay {
        /// Path to a `RunSpec` JSON file.
        file: PathBuf,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
}

fn load_spec(path: &Path) -> Result<RunSpec, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid run file {}: {e}", path.display())))
}

fn save_spec(spec: &RunSpec, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(spec)?;
    fs::write(path, text)
        .map_err(|e| CliError::Io(format!("cannot write {}: {e}", path.display())))?;
    info!("saved run description to {}", path.display());
    Ok(())
}

/// Runs the described session, writes the optional snapshot, and returns the report.
fn execute(spec: &RunSpec, shot: &SnapshotArgs) -> Result<RunReport, CliError> {
    let (report, frame) = replay(spec)?;
    if let Some(path) = &shot.png {
        snapshot::write_png(&frame, shot.png_width, shot.png_height, BACKGROUND, path)?;
    }
    Ok(report)
}

fn print_report(report: &RunReport, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!(
        "{} ({} ticks, seed {}): {} particles, {} spawned, {} points",
        report.source, report.ticks, report.seed, report.particles, report.spawned, report.points
    );
    match report.bounds {
        Some([x0, y0, x1, y1]) => {
            println!("bounds: x [{x0:.3}, {x1:.3}], y [{y0:.3}, {y1:.3}]")
        }
        None => println!("bounds: empty frame"),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let sources: Vec<serde_json::Value> = FieldKind::list_names()
                .iter()
                .map(|name| -> Result<serde_json::Value, CliError> {
                    let kind = FieldKind::from_name(name)?;
                    let knobs: serde_json::Map<String, serde_json::Value> = kind
                        .knobs()
                        .iter()
                        .map(|(knob, default)| ((*knob).to_string(), serde_json::json!(default)))
                        .collect();
                    Ok(serde_json::json!({"name": name, "knobs": knobs}))
                })
                .collect::<Result<_, _>>()?;
            let tunables = FlowLinesParams::schema();
            if cli.json {
                let info = serde_json::json!({
                    "sources": sources,
                    "tunables": tunables,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Sources:");
                for source in &sources {
                    let name = source["name"].as_str().unwrap_or_default();
                    println!("  {name}  {}", source["knobs"]);
                }
                println!("Tunables:");
                if let Some(entries) = tunables.as_object() {
                    for (name, entry) in entries {
                        println!(
                            "  {name} (default {}): {}",
                            entry["default"],
                            entry["description"].as_str().unwrap_or_default()
                        );
                    }
                }
            }
        }
        Command::Run {
            source,
            width,
            height,
            ticks,
            dt,
            seed,
            params,
            save,
            snapshot,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            if !params.is_object() {
                return Err(CliError::Input("--params must be a JSON object".into()));
            }

            let mut spec = RunSpec::new(&source, width, height, seed);
            spec.params = params;
            spec.ticks = ticks;
            spec.dt = dt;

            let report = execute(&spec, &snapshot)?;
            if let Some(path) = &save {
                save_spec(&spec, path)?;
            }
            print_report(&report, cli.json)?;
        }
        Command::Replay { file, snapshot } => {
            let spec = load_spec(&file)?;
            info!("replaying {}", file.display());
            let report = execute(&spec, &snapshot)?;
            print_report(&report, cli.json)?;
        }
    }

    Ok(())
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level_for(cli.verbose).as_str()),
    )
    .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
