// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/mod.rs
pub mod experiment;
pub mod hello_world;
pub mod overrides;
pub mod scalar;

pub use experiment::{ExperimentConfig, LabelPreprocessing, ModelArchitecture, ModelSpec};
pub use hello_world::hello_world_classification;
pub use overrides::ConfigOverrides;
pub use scalar::{ImageShape, KernelSize, ScalarLoss, ScalarModelBase};
