// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/scalar.rs
use serde::{Deserialize, Serialize};

use crate::dataset::KaggleDataset;
use crate::error::{MedimgError, Result};

/// Image size as (z, y, x).
pub type ImageShape = [usize; 3];

/// Convolution kernel size as (z, y, x).
pub type KernelSize = [usize; 3];

/// Loss functions the training framework offers for scalar models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarLoss {
    BinaryCrossEntropyWithLogits,
    WeightedCrossEntropyWithLogits,
    MeanSquaredError,
    CustomClassification,
    CustomRegression,
}

/// Options shared by every scalar (classification/regression) experiment.
///
/// Concrete experiments populate this record instead of extending it; see
/// [`hello_world_classification`](super::hello_world_classification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarModelBase {
    pub kaggle_dataset: KaggleDataset,
    pub image_channels: Vec<String>,
    /// Column holding the image path for each row.
    pub image_file_column: String,
    pub label_channels: Vec<String>,
    pub label_value_column: String,
    pub non_image_feature_channels: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub loss_type: ScalarLoss,
    pub num_epochs: u32,
    /// First epoch whose checkpoint is evaluated on the test set.
    pub test_start_epoch: u32,
    pub num_dataload_workers: usize,
    pub use_mixed_precision: bool,
    pub subject_column: String,
    pub conv_in_3d: bool,
    pub expected_image_size_zyx: ImageShape,
}

impl Default for ScalarModelBase {
    fn default() -> Self {
        Self {
            kaggle_dataset: KaggleDataset::MedMnist,
            image_channels: Vec::new(),
            image_file_column: "filePath".to_string(),
            label_channels: Vec::new(),
            label_value_column: "value".to_string(),
            non_image_feature_channels: Vec::new(),
            numerical_columns: Vec::new(),
            loss_type: ScalarLoss::BinaryCrossEntropyWithLogits,
            num_epochs: 100,
            test_start_epoch: 100,
            num_dataload_workers: 8,
            use_mixed_precision: false,
            subject_column: "subject".to_string(),
            conv_in_3d: false,
            expected_image_size_zyx: [1, 1, 1],
        }
    }
}

impl ScalarModelBase {
    /// Validate option values that this crate depends on.
    pub fn validate(&self) -> Result<()> {
        if self.subject_column.trim().is_empty() {
            return Err(MedimgError::invalid("subject_column must not be empty"));
        }
        if self.label_value_column.trim().is_empty() {
            return Err(MedimgError::invalid("label_value_column must not be empty"));
        }
        if self.num_epochs == 0 {
            return Err(MedimgError::invalid("num_epochs must be > 0"));
        }
        if self.test_start_epoch > self.num_epochs {
            return Err(MedimgError::invalid(format!(
                "test_start_epoch ({}) must not exceed num_epochs ({})",
                self.test_start_epoch, self.num_epochs
            )));
        }
        if self.expected_image_size_zyx.iter().any(|&d| d == 0) {
            return Err(MedimgError::invalid(format!(
                "expected_image_size_zyx must be positive in every dimension, got {:?}",
                self.expected_image_size_zyx
            )));
        }
        if !self.conv_in_3d && self.expected_image_size_zyx[0] != 1 {
            return Err(MedimgError::invalid(format!(
                "2D convolutions need a single z slice, got expected_image_size_zyx {:?}",
                self.expected_image_size_zyx
            )));
        }
        Ok(())
    }
}
