/*!
# Six-Circle Diffractometer Tool

Command-line front end for the IUCr six-circle (Lohmeier & Vlieg) with the
`gamma` axis driven by the `gamscrew` translation.

## Features

- Simulated assembly built from a TOML configuration file
- Position and limits report for every real axis and the gamma screw
- Gamma moves converted to screw moves through the lever radius
- EPICS motor record names for the hardware assembly
- Default configuration file generation

## Usage

```bash
sixc config --output sixc.toml
sixc --config sixc.toml wh
sixc --config sixc.toml mv gamma 10 --json
sixc --config sixc.toml pvs
```
*/

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{warn, Level};

mod config;

use config::AppConfig;
use shared::{MoveOptions, Radius, Sixc};

#[derive(Parser)]
#[command(name = "sixc")]
#[command(about = "Six-circle diffractometer with screw-driven gamma")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "sixc.toml")]
    config: PathBuf,

    /// Override the gamma lever radius from the configuration
    #[arg(long)]
    radius: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show axis positions
    Wh {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move one axis, then show positions
    Mv {
        /// Axis name (e.g. gamma, delta, gamscrew)
        axis: String,

        /// Target position
        #[arg(allow_hyphen_values = true)]
        target: f64,

        /// Return without waiting for the move to complete
        #[arg(long)]
        no_wait: bool,

        /// Move timeout in seconds
        #[arg(long)]
        timeout: Option<f64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show axis limits and solver constraints
    Limits,

    /// List operating modes of the geometry
    Modes,

    /// Show EPICS motor records of the hardware assembly
    Pvs,

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "sixc.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return generate_config_file(output);
    }

    let mut config = AppConfig::load_from_file(&cli.config).unwrap_or_else(|e| {
        eprintln!("⚠️ {:#}, using defaults", e);
        AppConfig::new()
    });

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.logging.level).unwrap_or(Level::INFO)
    };

    // Log to stderr to keep stdout clean for JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if let Some(radius) = cli.radius {
        config.diffractometer.gamma.radius = Radius::new(radius)?;
    }

    match cli.command {
        Commands::Wh { json } => {
            let sixc = build(&config)?;
            print_positions(&sixc, json)
        }

        Commands::Mv { axis, target, no_wait, timeout, json } => {
            let sixc = build(&config)?;
            let options = MoveOptions {
                wait: !no_wait,
                timeout: timeout.map(Duration::from_secs_f64),
                ..MoveOptions::default()
            };
            sixc.move_axis(&axis, target, &options)
                .with_context(|| format!("Failed to move {} to {}", axis, target))?;
            print_positions(&sixc, json)
        }

        Commands::Limits => {
            let sixc = build(&config)?;
            print_limits(&sixc);
            Ok(())
        }

        Commands::Modes => {
            let sixc = build(&config)?;
            for mode in &sixc.geometry().modes {
                let marker = if mode == sixc.mode() { "*" } else { " " };
                println!("{} {}", marker, mode);
            }
            Ok(())
        }

        Commands::Pvs => {
            let pvs = config.hardware.pv_names(&config.diffractometer)?;
            for (axis, pv) in pvs {
                println!("{:>10}  {}", axis, pv);
            }
            Ok(())
        }

        Commands::Config { .. } => Ok(()),
    }
}

/// Build the simulated assembly from configuration
fn build(config: &AppConfig) -> Result<Sixc> {
    let sixc = Sixc::simulated(&config.diffractometer, &config.simulation)
        .with_context(|| format!("Failed to build diffractometer '{}'", config.diffractometer.name))?;

    if !sixc.is_ready() {
        warn!("{}: not all axes are ready", sixc.name());
    }
    Ok(sixc)
}

/// Print positions of the reals and the gamma screw
fn print_positions(sixc: &Sixc, json: bool) -> Result<()> {
    let readings = sixc.positions();

    if json {
        println!("{}", serde_json::to_string_pretty(&readings)?);
        return Ok(());
    }

    println!("{} ({}, radius {})", sixc.name(), sixc.geometry().geometry, sixc.radius());
    for reading in readings {
        match reading.position {
            Some(position) => println!("{:>10} = {:>12.4}", reading.name, position),
            None => println!("{:>10} = {:>12}", reading.name, "not ready"),
        }
    }
    Ok(())
}

/// Print axis limits next to the solver constraints
fn print_limits(sixc: &Sixc) {
    println!("gamma: {:?}", sixc.gamma_status());
    println!("{:>10}  {:>24}  {:>24}", "axis", "limits", "constraint");

    for reading in sixc.positions() {
        let limits = reading
            .limits
            .map(|l| format!("({:.4}, {:.4})", l.low, l.high))
            .unwrap_or_else(|| "-".to_string());
        let constraint = sixc
            .constraints()
            .get(&reading.name)
            .map(|l| format!("({:.4}, {:.4})", l.low, l.high))
            .unwrap_or_else(|_| "-".to_string());
        println!("{:>10}  {:>24}  {:>24}", reading.name, limits, constraint);
    }
}

/// Generate a default configuration file
fn generate_config_file(output_path: &Path) -> Result<()> {
    let config = AppConfig::new();
    config.save_to_file(output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   sixc --config {} wh", output_path.display());

    Ok(())
}
