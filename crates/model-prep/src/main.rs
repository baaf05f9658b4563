//! Used-Car Price Pipeline - Batch Preparation CLI

use anyhow::Result;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use listing_data::{CleaningConfig, MissingInflationPolicy};
use model_prep::{
    assemble_bundle, derive_listings, evaluate_bundle, prepare_training_set, SplitConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Used-car price data preparation
#[derive(Parser, Debug)]
#[command(name = "carprice-prep")]
#[command(version)]
#[command(about = "Clean listings, derive depreciation features, and build model bundles", long_about = None)]
struct Args {
    /// Year car ages are measured against (defaults to the current year)
    #[arg(long, global = true)]
    current_year: Option<i32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean raw listings, join inflation and write depreciation features
    Derive {
        #[arg(long)]
        listings: PathBuf,
        #[arg(long)]
        inflation: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Drop listings whose year has no inflation rate instead of failing
        #[arg(long)]
        drop_missing_inflation: bool,
    },
    /// Encode, split and scale the derived table
    Prepare {
        #[arg(long)]
        derived: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 0.3)]
        test_fraction: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Combine preprocessing artifacts and a trained regressor into a bundle
    Assemble {
        #[arg(long)]
        preprocessing: PathBuf,
        #[arg(long)]
        regressor: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Report MAE / MAPE of a bundle on the held-out split
    Evaluate {
        #[arg(long)]
        bundle: PathBuf,
        #[arg(long)]
        derived: PathBuf,
        #[arg(long, default_value_t = 0.3)]
        test_fraction: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let current_year = args
        .current_year
        .unwrap_or_else(|| chrono::Utc::now().year());
    info!("carprice-prep v{} (current year {})", env!("CARGO_PKG_VERSION"), current_year);

    match args.command {
        Command::Derive {
            listings,
            inflation,
            out,
            drop_missing_inflation,
        } => {
            let mut config = CleaningConfig::for_year(current_year);
            if drop_missing_inflation {
                config.missing_inflation = MissingInflationPolicy::Drop;
            }
            let summary = derive_listings(&listings, &inflation, &out, &config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Prepare {
            derived,
            out_dir,
            test_fraction,
            seed,
        } => {
            let split = SplitConfig {
                test_fraction,
                seed,
            };
            let summary = prepare_training_set(&derived, &out_dir, current_year, &split)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Assemble {
            preprocessing,
            regressor,
            out,
        } => {
            let bundle = assemble_bundle(&preprocessing, &regressor, &out)?;
            println!(
                "Bundle written to {} ({} features)",
                out.display(),
                bundle.schema().len()
            );
        }
        Command::Evaluate {
            bundle,
            derived,
            test_fraction,
            seed,
        } => {
            let split = SplitConfig {
                test_fraction,
                seed,
            };
            let report = evaluate_bundle(&bundle, &derived, current_year, &split)?;
            println!("MAE (Rp): {:.0}", report.mae);
            println!("MAPE: {:.2}%", report.mape_percent);
        }
    }

    Ok(())
}
