// SPDX-License-Identifier: GPL-3.0-or-later

// src/dataset/locator.rs
//
// Resolves a dataset identifier to its dataset.csv on local storage.
//
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::table::DatasetTable;
use crate::error::{MedimgError, Result};

/// Every dataset folder carries its index under this name.
pub const DATASET_CSV_FILE_NAME: &str = "dataset.csv";

/// Environment variable naming the folder that holds all dataset folders.
pub const DATASET_ROOT_ENV: &str = "MEDIMG_DATASET_ROOT";

/// Public datasets that experiment configs can refer to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KaggleDataset {
    MedMnist,
}

impl KaggleDataset {
    /// Folder name under the dataset root.
    pub fn folder_name(&self) -> &'static str {
        match self {
            KaggleDataset::MedMnist => "medmnist",
        }
    }
}

/// Locates and loads datasets below a root folder:
/// `<root>/<folder_name>/dataset.csv`.
#[derive(Debug, Clone)]
pub struct DatasetLocator {
    root: PathBuf,
}

impl DatasetLocator {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Build from `MEDIMG_DATASET_ROOT`.
    pub fn from_env() -> Result<Self> {
        std::env::var(DATASET_ROOT_ENV)
            .map(Self::new)
            .map_err(|_| {
                MedimgError::invalid(format!("{} is not set", DATASET_ROOT_ENV))
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_csv_path(&self, dataset: KaggleDataset) -> PathBuf {
        self.root.join(dataset.folder_name()).join(DATASET_CSV_FILE_NAME)
    }

    pub fn load(&self, dataset: KaggleDataset) -> Result<DatasetTable> {
        let path = self.dataset_csv_path(dataset);
        if !path.is_file() {
            return Err(MedimgError::invalid(format!(
                "dataset file not found: {}",
                path.display()
            )));
        }
        let table = DatasetTable::from_csv_file(&path)?;
        info!("Loaded {:?} from {:?}: {} rows", dataset, path, table.len());
        Ok(table)
    }
}
