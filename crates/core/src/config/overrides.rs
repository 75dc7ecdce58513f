// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/overrides.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::experiment::ExperimentConfig;
use crate::error::Result;
use crate::split::SplitProportions;

/// Per-run adjustments read from a YAML file. Unset fields leave the
/// experiment's value alone.
///
/// ```yaml
/// num_epochs: 5
/// split:
///   train: 0.8
///   val: 0.1
///   test: 0.1
/// random_seed: 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub num_epochs: Option<u32>,
    pub test_start_epoch: Option<u32>,
    pub num_dataload_workers: Option<usize>,
    pub use_mixed_precision: Option<bool>,
    pub subject_column: Option<String>,
    pub label_value_column: Option<String>,
    pub split: Option<SplitProportions>,
    pub shuffle: Option<bool>,
    pub random_seed: Option<u64>,
    pub group_column: Option<String>,
}

impl ConfigOverrides {
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        // An empty file means "no overrides"
        if yaml_str.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every set field into `cfg`. Validation is left to the caller.
    pub fn apply_to(&self, cfg: &mut ExperimentConfig) {
        if self.is_empty() {
            return;
        }
        info!("{}: applying overrides {:?}", cfg.name, self);

        let base = &mut cfg.base;
        if let Some(v) = self.num_epochs {
            base.num_epochs = v;
        }
        if let Some(v) = self.test_start_epoch {
            base.test_start_epoch = v;
        }
        if let Some(v) = self.num_dataload_workers {
            base.num_dataload_workers = v;
        }
        if let Some(v) = self.use_mixed_precision {
            base.use_mixed_precision = v;
        }
        if let Some(v) = &self.subject_column {
            base.subject_column = v.clone();
        }
        if let Some(v) = &self.label_value_column {
            base.label_value_column = v.clone();
        }

        if let Some(v) = self.split {
            cfg.split = v;
        }
        if let Some(v) = self.shuffle {
            cfg.split_options.shuffle = v;
        }
        if let Some(v) = self.random_seed {
            cfg.split_options.random_seed = v;
        }
        if let Some(v) = &self.group_column {
            cfg.split_options.group_column = Some(v.clone());
        }
    }
}
