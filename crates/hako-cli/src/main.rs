//! Hako CLI - Command-line interface for scene export

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hako_core::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hako")]
#[command(about = "Export node-based material scenes to renderer XML", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene description to a renderer XML document
    Export {
        /// Scene description file (JSON)
        #[arg(short, long)]
        scene: PathBuf,

        /// Mapping configuration (TOML); built-in tables when omitted
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Output XML file
        #[arg(short, long, default_value = "scene.xml")]
        output: PathBuf,
    },

    /// Validate a mapping configuration without exporting
    Check {
        /// Mapping configuration (TOML)
        #[arg(short, long)]
        mappings: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            scene,
            mappings,
            output,
        } => {
            run_export(&scene, mappings.as_deref(), &output)?;
        }
        Commands::Check { mappings } => {
            run_check(&mappings)?;
        }
    }

    Ok(())
}

fn load_tables(mappings: Option<&Path>) -> Result<MappingTables> {
    match mappings {
        Some(path) => MappingTables::from_path(path)
            .with_context(|| format!("loading mapping tables from {}", path.display())),
        None => Ok(MappingTables::builtin()),
    }
}

fn run_export(scene_path: &Path, mappings: Option<&Path>, output: &Path) -> Result<()> {
    let tables = load_tables(mappings)?;
    let overrides = OverrideRegistry::builtin();

    let scene = SceneDescription::from_path(scene_path)
        .with_context(|| format!("loading scene description from {}", scene_path.display()))?;

    let result = export_scene(&scene, &tables, &overrides)?;

    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }

    std::fs::write(output, &result.xml)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("{} -> {}", result, output.display());
    Ok(())
}

fn run_check(mappings: &Path) -> Result<()> {
    let _tables = load_tables(Some(mappings))?;
    let _overrides = OverrideRegistry::builtin();
    println!("Mapping configuration OK: {}", mappings.display());
    Ok(())
}
