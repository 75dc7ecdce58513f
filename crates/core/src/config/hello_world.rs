// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/hello_world.rs
use super::experiment::{ExperimentConfig, LabelPreprocessing, ModelArchitecture, ModelSpec};
use super::scalar::{ScalarLoss, ScalarModelBase};
use crate::dataset::KaggleDataset;
use crate::split::SplitProportions;

pub const NAME: &str = "HelloWorldClassification";

/// Dummy image classification on MedMNIST, for debugging the pipeline.
///
/// Labels are collapsed to "0" vs rest, subjects are split 70/10/20
/// (train/val/test) and the model is a single 1x3x3 convolution.
pub fn hello_world_classification() -> ExperimentConfig {
    let num_epochs = 2;
    let base = ScalarModelBase {
        kaggle_dataset: KaggleDataset::MedMnist,
        image_channels: vec!["image".to_string()],
        image_file_column: "path".to_string(),
        label_channels: vec!["image".to_string()],
        label_value_column: "label".to_string(),
        non_image_feature_channels: Vec::new(),
        numerical_columns: Vec::new(),
        loss_type: ScalarLoss::MeanSquaredError,
        num_epochs,
        test_start_epoch: num_epochs,
        num_dataload_workers: 0,
        use_mixed_precision: true,
        subject_column: "subjectID".to_string(),
        conv_in_3d: true,
        expected_image_size_zyx: [1, 64, 64],
    };

    ExperimentConfig::new(
        NAME,
        "Dummy image classification model for debugging purposes",
        base,
        SplitProportions { train: 0.7, val: 0.1, test: 0.2 },
        ModelSpec {
            architecture: ModelArchitecture::DummyScalar,
            kernel_size: [1, 3, 3],
        },
        LabelPreprocessing::BinarizeZeroVsRest,
    )
}
