// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/dataset/mod.rs
pub mod locator;
pub mod table;

pub use locator::{DatasetLocator, KaggleDataset, DATASET_CSV_FILE_NAME, DATASET_ROOT_ENV};
pub use table::DatasetTable;
