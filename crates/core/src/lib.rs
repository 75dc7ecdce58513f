// SPDX-License-Identifier: GPL-3.0-or-later

//! Core library for medimg ─ scalar classification experiment configs.
//!
//! An experiment is plain data ([`ExperimentConfig`]) built by populating the
//! shared [`ScalarModelBase`] record. On top of it sit the two operations the
//! training framework calls before it starts: the label preprocessing hook
//! and the subject-level train/val/test split. The placeholder model is only
//! built on request, and only with the `model` feature.

pub mod config;
pub mod dataset;
pub mod error;
pub mod preprocess;
pub mod registry;
pub mod split;

#[cfg(feature = "model")]
pub mod model;

pub use config::{
    hello_world_classification, ConfigOverrides, ExperimentConfig, ImageShape, KernelSize,
    LabelPreprocessing, ModelArchitecture, ModelSpec, ScalarLoss, ScalarModelBase,
};
pub use dataset::{DatasetLocator, DatasetTable, KaggleDataset};
pub use error::{MedimgError, Result};
pub use preprocess::binarize_labels;
pub use registry::{ConfigEntry, ConfigRegistry};
pub use split::{DatasetSplits, ModelExecutionMode, SplitOptions, SplitProportions};

#[cfg(feature = "model")]
pub use model::{DummyScalarModel, ScalarModel};
