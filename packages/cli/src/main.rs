#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the site planner.
//!
//! Runs buildable area calculations from request files, lists the embedded
//! council tables, and starts the API server. With no subcommand the user
//! picks an action from an interactive menu.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use site_planner_council::CouncilRegistry;
use site_planner_server::overlay::feature_collection;
use site_planner_setback::{CalculationOptions, RequirementsResolver as _, calculate};
use site_planner_setback_models::{BuildableAreaRequest, NullRolePolicy};

#[derive(Parser)]
#[command(name = "site_planner", about = "Buildable area calculator for residential lots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the buildable area for a JSON request
    Calculate {
        /// Request file, or `-` to read standard input
        #[arg(long, short)]
        input: PathBuf,

        /// Print a `GeoJSON` overlay instead of the raw result
        #[arg(long)]
        geojson: bool,

        /// Reject explicit classifications that leave edges without a role
        #[arg(long)]
        strict: bool,
    },
    /// List the embedded council setback tables
    Councils,
    /// Show the setbacks that apply to a council and zone
    Requirements {
        /// Council id, name, or alias
        #[arg(long)]
        council: String,

        /// Zone id or zone code
        #[arg(long)]
        zoning: Option<String>,
    },
    /// Start the API server
    Serve {
        /// Prompt for bind address and port
        #[arg(long)]
        interactive: bool,
    },
}

/// Actions offered by the interactive menu.
enum Action {
    Calculate,
    Councils,
    Requirements,
    Server,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Calculate,
        Self::Councils,
        Self::Requirements,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Calculate => "Calculate buildable area from a request file",
            Self::Councils => "List councils",
            Self::Requirements => "Look up council requirements",
            Self::Server => "Start server",
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    pretty_env_logger::init();

    match cli.command {
        Some(command) => run_command(command),
        None => run_menu(),
    }
}

fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Calculate {
            input,
            geojson,
            strict,
        } => run_calculate(&input, geojson, strict),
        Commands::Councils => list_councils(),
        Commands::Requirements { council, zoning } => {
            show_requirements(&council, zoning.as_deref())
        }
        Commands::Serve { interactive } => serve(interactive),
    }
}

fn run_menu() -> Result<(), Box<dyn std::error::Error>> {
    println!("Site Planner");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let command = match Action::ALL[idx] {
        Action::Calculate => {
            let input: String = Input::new()
                .with_prompt("Request file")
                .default("request.json".to_string())
                .interact_text()?;
            let geojson = Confirm::new()
                .with_prompt("Print a GeoJSON overlay?")
                .default(false)
                .interact()?;
            Commands::Calculate {
                input: PathBuf::from(input),
                geojson,
                strict: false,
            }
        }
        Action::Councils => Commands::Councils,
        Action::Requirements => {
            let council: String = Input::new().with_prompt("Council").interact_text()?;
            let zoning: String = Input::new()
                .with_prompt("Zone (blank for the council default)")
                .allow_empty(true)
                .interact_text()?;
            Commands::Requirements {
                council,
                zoning: Some(zoning).filter(|z| !z.trim().is_empty()),
            }
        }
        Action::Server => Commands::Serve { interactive: true },
    };

    run_command(command)
}

fn run_calculate(
    input: &Path,
    geojson: bool,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(input)?;
    let councils = CouncilRegistry::embedded()?;

    let options = CalculationOptions {
        null_role_policy: if strict {
            NullRolePolicy::Reject
        } else {
            NullRolePolicy::DefaultToSide
        },
        ..CalculationOptions::default()
    };

    let result = calculate(&request, &councils, &options)?;

    if result.is_degenerate() {
        log::warn!("No buildable area remains under current setbacks");
    } else {
        log::info!(
            "Buildable area {:.1} m² of {:.1} m² ({:.1}% coverage)",
            result.buildable_area_m2,
            result.site_area_m2,
            result.coverage_ratio * 100.0
        );
    }
    if let Some(warnings) = &result.error {
        log::warn!("{warnings}");
    }

    let output = if geojson {
        serde_json::to_string_pretty(&feature_collection(&request, &result))?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{output}");

    Ok(())
}

fn read_request(input: &Path) -> Result<BuildableAreaRequest, Box<dyn std::error::Error>> {
    let contents = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| format!("Failed to read {}: {e}", input.display()))?
    };

    Ok(serde_json::from_str(&contents)?)
}

fn list_councils() -> Result<(), Box<dyn std::error::Error>> {
    let councils = CouncilRegistry::embedded()?;

    for council in councils.councils() {
        println!("{} ({}, {})", council.name, council.id, council.state);
        for (id, zone) in &council.zones {
            let marker = if *id == council.default_zone { "*" } else { " " };
            let water = zone
                .water
                .map_or_else(String::new, |w| format!(", water {w} m"));
            println!(
                "  {marker} {id}: front {} m, side {} m, rear {} m{water}",
                zone.front, zone.side, zone.rear
            );
        }
    }

    Ok(())
}

fn show_requirements(
    council: &str,
    zoning: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let councils = CouncilRegistry::embedded()?;
    let resolved = councils.resolve(council, zoning);

    println!("{}", serde_json::to_string_pretty(&resolved)?);

    Ok(())
}

fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    actix_web::rt::System::new().block_on(async {
        if interactive {
            site_planner_server::interactive::run().await
        } else {
            site_planner_server::run_server().await
        }
    })?;

    Ok(())
}
