//! partgen - generate, validate and inspect part recipes.
//!
//! Recipes are written to stdout (or `--out`) as JSON documents; logs go to
//! stderr and are controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use part_generator::{parse_difficulty, parse_seed, GeneratorConfig, RecipeBuilder};
use recipe_format::load::RecipeFileRaw;
use recipe_format::{load_recipe, save_recipe, validate_recipe, LoadError};
use test_harness::RecipeReport;

#[derive(Parser)]
#[command(name = "partgen")]
#[command(about = "Deterministic generator of mechanical part recipes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe from a seed and difficulty
    Generate {
        /// Seed, decimal or 0x-prefixed hex
        #[arg(short, long)]
        seed: String,
        /// beginner, intermediate or expert
        #[arg(short, long, default_value = "beginner")]
        difficulty: String,
        /// JSON file overriding generator settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the document here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check a recipe document against the schema
    Validate {
        /// Recipe document
        file: PathBuf,
    },
    /// Print a readable summary of a recipe document
    Report {
        /// Recipe document
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            seed,
            difficulty,
            config,
            out,
        } => generate(&seed, &difficulty, config.as_deref(), out.as_deref()),
        Commands::Validate { file } => validate(&file),
        Commands::Report { file } => report(&file),
    }
}

fn generate(
    seed: &str,
    difficulty: &str,
    config: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let seed = parse_seed(seed)?;
    let difficulty = parse_difficulty(difficulty)?;

    let mut builder = RecipeBuilder::new(seed, difficulty);
    if let Some(path) = config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = GeneratorConfig::from_json(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        builder = builder.config(config);
    }

    let recipe = builder.build()?;
    let doc = save_recipe(&recipe);

    match out {
        Some(path) => {
            fs::write(path, doc).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), id = %recipe.id, "recipe written");
        }
        None => println!("{}", doc),
    }
    Ok(())
}

fn validate(file: &Path) -> Result<()> {
    let json = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    match load_recipe(&json) {
        Ok(recipe) => {
            println!(
                "{}: valid ({} primitives, {} operations)",
                file.display(),
                recipe.primitives.len(),
                recipe.operations.len()
            );
            Ok(())
        }
        Err(LoadError::SchemaViolation { count, .. }) => {
            let raw: RecipeFileRaw = serde_json::from_str(&json)?;
            for issue in validate_recipe(&raw.recipe).issues {
                println!("  {}", issue);
            }
            anyhow::bail!("{}: {} schema issue(s)", file.display(), count)
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", file.display())),
    }
}

fn report(file: &Path) -> Result<()> {
    let json = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let recipe = load_recipe(&json).with_context(|| format!("loading {}", file.display()))?;
    print!("{}", RecipeReport::from_recipe(&recipe));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_arguments_parse() {
        let cli = Cli::try_parse_from([
            "partgen",
            "generate",
            "--seed",
            "0x3039",
            "--difficulty",
            "expert",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                seed, difficulty, ..
            } => {
                assert_eq!(parse_seed(&seed).unwrap(), 12345);
                assert_eq!(difficulty, "expert");
            }
            _ => panic!("expected generate"),
        }
    }
}
