// SPDX-License-Identifier: GPL-3.0-or-later

// src/preprocess.rs
//
// Label preprocessing applied to the dataset table before splitting
//
use tracing::info;

use crate::dataset::DatasetTable;
use crate::error::Result;

/// Label value of the negative class.
pub const NEGATIVE_LABEL: &str = "0";
/// Label value every other class is rewritten to.
pub const POSITIVE_LABEL: &str = "1";

/// Collapse a multi-class label column to negative ("0") vs positive ("1").
///
/// The output holds exactly the input rows: all "0" rows first, then all
/// other rows with their label rewritten to "1". Each group keeps its
/// original relative order. Fails with `MissingColumn` before touching any
/// row if `label_column` is absent.
pub fn binarize_labels(table: &DatasetTable, label_column: &str) -> Result<DatasetTable> {
    let label_idx = table.require_column(label_column)?;

    let mut zero_class = Vec::new();
    let mut non_zero_class = Vec::new();
    for row in table.rows() {
        if row[label_idx] == NEGATIVE_LABEL {
            zero_class.push(row.clone());
        } else {
            let mut row = row.clone();
            row[label_idx] = POSITIVE_LABEL.to_string();
            non_zero_class.push(row);
        }
    }

    info!(
        "Binarized '{}': {} negative rows, {} rows relabelled to {}",
        label_column,
        zero_class.len(),
        non_zero_class.len(),
        POSITIVE_LABEL
    );

    zero_class.extend(non_zero_class);
    Ok(DatasetTable::from_parts_unchecked(table.columns().to_vec(), zero_class))
}
