// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use medimg_core::{
    ConfigOverrides, ConfigRegistry, DatasetLocator, DatasetTable, ExperimentConfig,
    ModelExecutionMode,
};
use ndarray::Array5;
use std::path::{Path, PathBuf};
use tracing::info;

/// medimg – prepare datasets for scalar classification experiments
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered experiment configs
    List,
    /// Print an experiment config as YAML (or JSON)
    Show {
        /// Config name, e.g. HelloWorldClassification
        name: String,

        /// YAML file with per-run overrides
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Validate an experiment config without touching any data
    Validate {
        /// Registered config name
        #[arg(required_unless_present = "file")]
        name: Option<String>,

        /// Validate a YAML config (e.g. one written by `show`) instead of a registered name
        #[arg(long, conflicts_with = "name")]
        file: Option<PathBuf>,

        #[arg(long)]
        overrides: Option<PathBuf>,
    },
    /// Load the dataset, run preprocessing, split by subject and write train/val/test CSVs
    Prepare {
        name: String,

        /// Dataset CSV to use instead of the one under the dataset root
        #[arg(long, conflicts_with = "dataset_root")]
        csv: Option<PathBuf>,

        /// Folder holding the dataset folders (defaults to $MEDIMG_DATASET_ROOT)
        #[arg(long)]
        dataset_root: Option<PathBuf>,

        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Where to write train.csv, val.csv and test.csv
        #[arg(short, long, default_value = "splits")]
        out_dir: PathBuf,
    },
    /// Build the model and run one forward pass on zeros
    Smoke {
        name: String,

        /// Batch size for the forward pass
        #[arg(long, default_value_t = 2)]
        batch: usize,
    },
}

fn main() -> Result<()> {
    // Load .env early so MEDIMG_DATASET_ROOT can live there
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("medimg={0},medimg_core={0}", log_level))
        .with_writer(std::io::stderr)
        .init();

    info!("medimg v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = ConfigRegistry::builtin();
    match args.command {
        Commands::List => list_configs(&registry),
        Commands::Show { name, overrides, json } => {
            show_config(&registry, &name, overrides.as_deref(), json)
        }
        Commands::Validate {
            name,
            file,
            overrides,
        } => validate_config(
            &registry,
            name.as_deref(),
            file.as_deref(),
            overrides.as_deref(),
        ),
        Commands::Prepare {
            name,
            csv,
            dataset_root,
            overrides,
            out_dir,
        } => prepare_dataset(
            &registry,
            &name,
            csv.as_deref(),
            dataset_root.as_deref(),
            overrides.as_deref(),
            &out_dir,
        ),
        Commands::Smoke { name, batch } => smoke_test_model(&registry, &name, batch),
    }
}

/// Build the named config and apply an optional overrides file.
fn load_config(
    registry: &ConfigRegistry,
    name: &str,
    overrides_path: Option<&Path>,
) -> Result<ExperimentConfig> {
    let cfg = registry
        .create(name)
        .with_context(|| format!("Failed to build config {}", name))?;
    apply_overrides(cfg, overrides_path)
}

fn apply_overrides(cfg: ExperimentConfig, overrides_path: Option<&Path>) -> Result<ExperimentConfig> {
    match overrides_path {
        Some(path) => {
            info!("Loading overrides from: {:?}", path);
            let overrides = ConfigOverrides::from_yaml_file(path)
                .with_context(|| format!("Failed to read overrides from {:?}", path))?;
            cfg.with_overrides(&overrides)
                .with_context(|| format!("Overrides in {:?} are not valid for {}", path, cfg.name))
        }
        None => Ok(cfg),
    }
}

fn list_configs(registry: &ConfigRegistry) -> Result<()> {
    for entry in registry.entries() {
        println!("{:<28} {}", entry.name, entry.description);
    }
    Ok(())
}

fn show_config(
    registry: &ConfigRegistry,
    name: &str,
    overrides_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let cfg = load_config(registry, name, overrides_path)?;
    let text = if json { cfg.to_json()? } else { cfg.to_yaml()? };
    println!("{}", text.trim_end());
    Ok(())
}

fn validate_config(
    registry: &ConfigRegistry,
    name: Option<&str>,
    file: Option<&Path>,
    overrides_path: Option<&Path>,
) -> Result<()> {
    let cfg = match (file, name) {
        (Some(path), _) => {
            info!("Loading config from: {:?}", path);
            let cfg = ExperimentConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?;
            apply_overrides(cfg, overrides_path)?
        }
        (None, Some(name)) => load_config(registry, name, overrides_path)?,
        (None, None) => bail!("Either a config name or --file is required"),
    };

    println!("✅ Config: {}", cfg.name);
    println!("✅ Dataset: {:?}", cfg.base.kaggle_dataset);
    println!("✅ Subject column: {}", cfg.base.subject_column);
    println!("✅ Label column: {} ({:?})", cfg.base.label_value_column, cfg.label_preprocessing);
    println!("✅ Loss: {:?}", cfg.base.loss_type);
    println!(
        "✅ Epochs: {} (test from epoch {})",
        cfg.base.num_epochs, cfg.base.test_start_epoch
    );
    println!(
        "✅ Split: train={} val={} test={} (shuffle={}, seed={})",
        cfg.split.train,
        cfg.split.val,
        cfg.split.test,
        cfg.split_options.shuffle,
        cfg.split_options.random_seed
    );
    println!(
        "✅ Model: {:?}, image {:?}, kernel {:?}",
        cfg.model.architecture, cfg.base.expected_image_size_zyx, cfg.model.kernel_size
    );
    println!("🎉 {} is valid", cfg.name);
    Ok(())
}

fn prepare_dataset(
    registry: &ConfigRegistry,
    name: &str,
    csv: Option<&Path>,
    dataset_root: Option<&Path>,
    overrides_path: Option<&Path>,
    out_dir: &Path,
) -> Result<()> {
    let mut cfg = load_config(registry, name, overrides_path)?;

    match (csv, dataset_root) {
        (Some(path), _) => {
            let table = DatasetTable::from_csv_file(path)
                .with_context(|| format!("Failed to load dataset CSV {:?}", path))?;
            cfg.set_dataset_table(table);
        }
        (None, Some(root)) => {
            let dataset = cfg.base.kaggle_dataset;
            cfg.load_dataset_table(&DatasetLocator::new(root))
                .with_context(|| format!("Failed to load {:?} from {:?}", dataset, root))?;
        }
        (None, None) => {
            let locator = DatasetLocator::from_env()
                .context("No --csv or --dataset-root given and MEDIMG_DATASET_ROOT is not set")?;
            let dataset = cfg.base.kaggle_dataset;
            cfg.load_dataset_table(&locator)
                .with_context(|| format!("Failed to load {:?} from {:?}", dataset, locator.root()))?;
        }
    }

    cfg.pre_process_dataset_table()
        .context("Dataset preprocessing failed")?;

    let Some(table) = cfg.dataset_table() else {
        bail!("No dataset table after preprocessing");
    };
    let splits = cfg.dataset_splits(table).context("Dataset split failed")?;
    splits
        .write_csvs(out_dir)
        .with_context(|| format!("Failed to write splits to {:?}", out_dir))?;

    println!("Split by '{}'", splits.subject_column());
    println!("{}", splits);
    for mode in ModelExecutionMode::ALL {
        println!("  - {}", out_dir.join(format!("{}.csv", mode)).display());
    }
    Ok(())
}

fn smoke_test_model(registry: &ConfigRegistry, name: &str, batch: usize) -> Result<()> {
    if batch == 0 {
        bail!("--batch must be > 0");
    }
    let cfg = load_config(registry, name, None)?;

    // The model is only built here, never when configs are listed or shown
    let model = cfg
        .create_model()
        .with_context(|| format!("Failed to create model for {}", name))?;

    let [z, y, x] = model.expected_image_size_zyx();
    let input = Array5::<f32>::zeros((batch, 1, z, y, x));
    let output = model
        .forward(input.view())
        .context("Forward pass failed")?;

    println!("✅ Model: {:?}", cfg.model.architecture);
    println!("✅ Parameters: {}", model.num_parameters());
    println!("✅ Input shape: {:?}", input.shape());
    println!("✅ Output shape: {:?}", output.shape());
    Ok(())
}
