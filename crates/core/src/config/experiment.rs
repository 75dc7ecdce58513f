// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/experiment.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::overrides::ConfigOverrides;
use super::scalar::{KernelSize, ScalarModelBase};
use crate::dataset::{DatasetLocator, DatasetTable};
use crate::error::{MedimgError, Result};
use crate::preprocess::binarize_labels;
use crate::split::{DatasetSplits, SplitOptions, SplitProportions};

#[cfg(feature = "model")]
use crate::model::{DummyScalarModel, ScalarModel};

/// Model architectures an experiment can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelArchitecture {
    /// One 3D convolution and one linear layer, for smoke tests.
    DummyScalar,
}

/// What to build when training starts. Plain data; nothing is built at config time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub architecture: ModelArchitecture,
    pub kernel_size: KernelSize,
}

/// Preprocessing applied to the dataset table before it is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPreprocessing {
    #[default]
    None,
    /// Label "0" stays negative, every other label becomes "1".
    BinarizeZeroVsRest,
}

/// A complete experiment: shared scalar options plus the experiment's own
/// split, preprocessing and model choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name: String,
    pub description: String,
    pub base: ScalarModelBase,
    pub split: SplitProportions,
    #[serde(default)]
    pub split_options: SplitOptions,
    pub model: ModelSpec,
    #[serde(default)]
    pub label_preprocessing: LabelPreprocessing,

    /// Table loaded for this experiment; replaced by preprocessing.
    #[serde(skip)]
    dataset_table: Option<DatasetTable>,
}

impl ExperimentConfig {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        base: ScalarModelBase,
        split: SplitProportions,
        model: ModelSpec,
        label_preprocessing: LabelPreprocessing,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            base,
            split,
            split_options: SplitOptions::default(),
            model,
            label_preprocessing,
            dataset_table: None,
        }
    }

    /// Check every option this crate relies on.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.split.validate()?;

        let kernel = self.model.kernel_size;
        let image = self.base.expected_image_size_zyx;
        if kernel.iter().any(|&k| k == 0) {
            return Err(MedimgError::invalid(format!(
                "kernel_size must be positive in every dimension, got {:?}",
                kernel
            )));
        }
        if kernel.iter().zip(image.iter()).any(|(k, i)| k > i) {
            return Err(MedimgError::invalid(format!(
                "kernel_size {:?} does not fit expected_image_size_zyx {:?}",
                kernel, image
            )));
        }
        if let Some(group) = &self.split_options.group_column {
            if group.trim().is_empty() {
                return Err(MedimgError::invalid("group_column must not be empty when set"));
            }
        }
        Ok(())
    }

    /// Apply overrides to a copy of this config and re-validate it.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Result<Self> {
        let mut cfg = self.clone();
        overrides.apply_to(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a full config from YAML and validate it.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    pub fn dataset_table(&self) -> Option<&DatasetTable> {
        self.dataset_table.as_ref()
    }

    pub fn set_dataset_table(&mut self, table: DatasetTable) {
        debug!("{}: dataset table set ({} rows)", self.name, table.len());
        self.dataset_table = Some(table);
    }

    /// Load this experiment's dataset through `locator` and keep it on the config.
    pub fn load_dataset_table(&mut self, locator: &DatasetLocator) -> Result<()> {
        let table = locator.load(self.base.kaggle_dataset)?;
        self.set_dataset_table(table);
        Ok(())
    }

    /// Run the configured label preprocessing, replacing the held table.
    ///
    /// After binarization the table lists all "0" rows before all rewritten rows.
    pub fn pre_process_dataset_table(&mut self) -> Result<()> {
        let table = self.dataset_table.as_ref().ok_or_else(|| {
            MedimgError::invalid(format!("{}: no dataset table loaded", self.name))
        })?;
        match self.label_preprocessing {
            LabelPreprocessing::None => Ok(()),
            LabelPreprocessing::BinarizeZeroVsRest => {
                let processed = binarize_labels(table, &self.base.label_value_column)?;
                self.dataset_table = Some(processed);
                Ok(())
            }
        }
    }

    /// Subject-level train/val/test split of `table` with this experiment's proportions.
    pub fn dataset_splits(&self, table: &DatasetTable) -> Result<DatasetSplits> {
        DatasetSplits::from_proportions(
            table,
            &self.base.subject_column,
            self.split,
            &self.split_options,
        )
    }

    /// Build the model. Only called when training actually runs.
    #[cfg(feature = "model")]
    pub fn create_model(&self) -> Result<Box<dyn ScalarModel>> {
        tracing::info!(
            "{}: creating {:?} model for image size {:?}",
            self.name, self.model.architecture, self.base.expected_image_size_zyx
        );
        match self.model.architecture {
            ModelArchitecture::DummyScalar => Ok(Box::new(DummyScalarModel::new(
                self.base.expected_image_size_zyx,
                self.model.kernel_size,
            )?)),
        }
    }
}
