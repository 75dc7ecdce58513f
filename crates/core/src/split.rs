// SPDX-License-Identifier: GPL-3.0-or-later

// src/split.rs
//
// Subject-level train/val/test splitting
//
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dataset::DatasetTable;
use crate::error::{MedimgError, Result};

const PROPORTION_TOLERANCE: f64 = 1e-6;

// Keeps 10 * 0.7 at 7 subjects despite float representation.
const COUNT_EPSILON: f64 = 1e-9;

/// Which of the three subsets a subject or row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelExecutionMode {
    Train,
    Val,
    Test,
}

impl ModelExecutionMode {
    pub const ALL: [ModelExecutionMode; 3] =
        [ModelExecutionMode::Train, ModelExecutionMode::Val, ModelExecutionMode::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelExecutionMode::Train => "train",
            ModelExecutionMode::Val => "val",
            ModelExecutionMode::Test => "test",
        }
    }
}

impl fmt::Display for ModelExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target share of subjects for each subset. Must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitProportions {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitProportions {
    pub fn validate(&self) -> Result<()> {
        for (name, p) in [("train", self.train), ("val", self.val), ("test", self.test)] {
            if !p.is_finite() || p < 0.0 {
                return Err(MedimgError::invalid(format!(
                    "{} proportion must be a non-negative number, got {}",
                    name, p
                )));
            }
        }
        let sum = self.train + self.val + self.test;
        if (sum - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(MedimgError::invalid(format!(
                "split proportions must sum to 1.0, got {} (train {}, val {}, test {})",
                sum, self.train, self.val, self.test
            )));
        }
        Ok(())
    }

    /// Subject counts for `n` subjects: train and test are floored, val takes the rest.
    pub fn subject_counts(&self, n: usize) -> (usize, usize, usize) {
        let n_train = floor_count(n, self.train).min(n);
        let n_test = floor_count(n, self.test).min(n - n_train);
        (n_train, n - n_train - n_test, n_test)
    }
}

fn floor_count(n: usize, proportion: f64) -> usize {
    (n as f64 * proportion + COUNT_EPSILON).floor() as usize
}

/// How subjects are ordered and grouped before they are cut into subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Shuffle subjects with a seeded RNG before cutting.
    pub shuffle: bool,
    pub random_seed: u64,
    /// Assign whole groups (e.g. a hospital) instead of single subjects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_column: Option<String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            shuffle: true,
            random_seed: 0,
            group_column: None,
        }
    }
}

/// A dataset table partitioned into train, val and test by subject.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplits {
    pub train: DatasetTable,
    pub val: DatasetTable,
    pub test: DatasetTable,
    subject_column: String,
}

impl DatasetSplits {
    /// Assign every unique subject to one subset according to `proportions`.
    ///
    /// The result depends only on the table, the proportions and the options,
    /// so calling this twice gives the same split.
    pub fn from_proportions(
        table: &DatasetTable,
        subject_column: &str,
        proportions: SplitProportions,
        options: &SplitOptions,
    ) -> Result<Self> {
        proportions.validate()?;
        let subject_idx = table.require_column(subject_column)?;
        let grouping_column = options.group_column.as_deref().unwrap_or(subject_column);
        let group_idx = table.require_column(grouping_column)?;

        if group_idx != subject_idx {
            check_subjects_in_single_group(table, subject_idx, group_idx, grouping_column)?;
        }

        let mut groups = table.unique_values(grouping_column)?;
        if options.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(options.random_seed);
            groups.shuffle(&mut rng);
        }

        let (n_train, n_val, _n_test) = proportions.subject_counts(groups.len());
        let mut assignment: HashMap<&str, ModelExecutionMode> =
            HashMap::with_capacity(groups.len());
        for (i, g) in groups.iter().enumerate() {
            let mode = if i < n_train {
                ModelExecutionMode::Train
            } else if i < n_train + n_val {
                ModelExecutionMode::Val
            } else {
                ModelExecutionMode::Test
            };
            assignment.insert(g.as_str(), mode);
        }

        let splits = Self::partition(table, subject_column, |row| {
            assignment.get(row[group_idx].as_str()).copied()
        });
        info!(
            "Split {} {} into train/val/test = {}/{}/{} ({} rows)",
            groups.len(),
            if group_idx == subject_idx { "subjects" } else { "groups" },
            n_train,
            n_val,
            groups.len() - n_train - n_val,
            table.len()
        );
        Ok(splits)
    }

    /// Split by explicit subject lists. Subjects in none of the lists are dropped.
    pub fn from_subject_ids(
        table: &DatasetTable,
        subject_column: &str,
        train_ids: &[String],
        val_ids: &[String],
        test_ids: &[String],
    ) -> Result<Self> {
        let subject_idx = table.require_column(subject_column)?;

        let mut assignment: HashMap<&str, ModelExecutionMode> = HashMap::new();
        for (mode, ids) in [
            (ModelExecutionMode::Train, train_ids),
            (ModelExecutionMode::Val, val_ids),
            (ModelExecutionMode::Test, test_ids),
        ] {
            for id in ids {
                if let Some(prev) = assignment.insert(id.as_str(), mode) {
                    if prev != mode {
                        return Err(MedimgError::invalid(format!(
                            "subject '{}' is listed for both {} and {}",
                            id, prev, mode
                        )));
                    }
                }
            }
        }

        let known: HashSet<String> = table.unique_values(subject_column)?.into_iter().collect();
        for id in assignment.keys().filter(|id| !known.contains(**id)) {
            warn!("Subject '{}' is not present in the dataset, ignoring", id);
        }

        Ok(Self::partition(table, subject_column, |row| {
            assignment.get(row[subject_idx].as_str()).copied()
        }))
    }

    fn partition<F>(table: &DatasetTable, subject_column: &str, mut mode_of: F) -> Self
    where
        F: FnMut(&[String]) -> Option<ModelExecutionMode>,
    {
        let mut train = Vec::new();
        let mut val = Vec::new();
        let mut test = Vec::new();
        for row in table.rows() {
            match mode_of(row.as_slice()) {
                Some(ModelExecutionMode::Train) => train.push(row.clone()),
                Some(ModelExecutionMode::Val) => val.push(row.clone()),
                Some(ModelExecutionMode::Test) => test.push(row.clone()),
                None => {}
            }
        }
        let columns = table.columns().to_vec();
        Self {
            train: DatasetTable::from_parts_unchecked(columns.clone(), train),
            val: DatasetTable::from_parts_unchecked(columns.clone(), val),
            test: DatasetTable::from_parts_unchecked(columns, test),
            subject_column: subject_column.to_string(),
        }
    }

    pub fn subject_column(&self) -> &str {
        &self.subject_column
    }

    pub fn table(&self, mode: ModelExecutionMode) -> &DatasetTable {
        match mode {
            ModelExecutionMode::Train => &self.train,
            ModelExecutionMode::Val => &self.val,
            ModelExecutionMode::Test => &self.test,
        }
    }

    /// Unique subjects of one subset, in row order.
    pub fn subject_ids(&self, mode: ModelExecutionMode) -> Vec<String> {
        // the subject column was validated when the split was built
        self.table(mode)
            .unique_values(&self.subject_column)
            .unwrap_or_default()
    }

    /// Number of unique subjects per subset as (train, val, test).
    pub fn number_of_subjects(&self) -> (usize, usize, usize) {
        (
            self.subject_ids(ModelExecutionMode::Train).len(),
            self.subject_ids(ModelExecutionMode::Val).len(),
            self.subject_ids(ModelExecutionMode::Test).len(),
        )
    }

    /// Write `train.csv`, `val.csv` and `test.csv` into `dir`, creating it if needed.
    pub fn write_csvs<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for mode in ModelExecutionMode::ALL {
            let path = dir.join(format!("{}.csv", mode));
            self.table(mode).write_csv(&path)?;
            info!("Wrote {} rows to {:?}", self.table(mode).len(), path);
        }
        Ok(())
    }
}

impl fmt::Display for DatasetSplits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n_train, n_val, n_test) = self.number_of_subjects();
        writeln!(f, "Train: {} subjects, {} rows", n_train, self.train.len())?;
        writeln!(f, "Val:   {} subjects, {} rows", n_val, self.val.len())?;
        write!(f, "Test:  {} subjects, {} rows", n_test, self.test.len())
    }
}

fn check_subjects_in_single_group(
    table: &DatasetTable,
    subject_idx: usize,
    group_idx: usize,
    group_column: &str,
) -> Result<()> {
    let mut group_of: HashMap<&str, &str> = HashMap::new();
    for row in table.rows() {
        let subject = row[subject_idx].as_str();
        let group = row[group_idx].as_str();
        if let Some(prev) = group_of.insert(subject, group) {
            if prev != group {
                return Err(MedimgError::invalid(format!(
                    "subject '{}' appears in more than one {} ('{}' and '{}')",
                    subject, group_column, prev, group
                )));
            }
        }
    }
    Ok(())
}
