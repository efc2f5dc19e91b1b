//! Feature extraction for injury classifiers
//!
//! The column names and their order are a fixed contract with downstream
//! training code: seven numeric features and a 0/1 label.

use serde::{Deserialize, Serialize};

use crate::dataset::InjuryDataset;
use crate::error::{Result, WorkloadError};
use crate::models::WorkloadRow;

/// Feature columns, in matrix order
pub const FEATURE_COLUMNS: [&str; 7] = [
    "Acute",
    "Chronic",
    "ACWR",
    "Intensity",
    "Workload",
    "HighIntensityStreak",
    "Fatigue",
];

/// Label column
pub const LABEL_COLUMN: &str = "Injury";

/// Number of features per row
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// One row of features
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Extract the feature vector for a single row
pub fn feature_vector(row: &WorkloadRow) -> FeatureVector {
    [
        row.acute,
        row.chronic,
        row.acwr,
        f64::from(row.intensity),
        f64::from(row.workload),
        f64::from(row.high_intensity_streak),
        row.fatigue,
    ]
}

/// Row-major feature matrix with aligned labels
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<u8>,
}

/// Count of each label value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBalance {
    pub positive: usize,
    pub negative: usize,
}

impl ClassBalance {
    /// Positive share of all labels
    pub fn positive_rate(&self) -> f64 {
        let total = self.positive + self.negative;
        if total == 0 {
            0.0
        } else {
            self.positive as f64 / total as f64
        }
    }
}

/// Build the feature matrix and label vector from a dataset
pub fn build_features(dataset: &InjuryDataset) -> FeatureMatrix {
    FeatureMatrix {
        features: dataset.rows.iter().map(feature_vector).collect(),
        labels: dataset.rows.iter().map(|r| u8::from(r.injury)).collect(),
    }
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn class_balance(&self) -> ClassBalance {
        let positive = self.labels.iter().filter(|&&l| l == 1).count();
        ClassBalance {
            positive,
            negative: self.labels.len() - positive,
        }
    }

    /// The most recent feature row, which reporting scores
    pub fn last(&self) -> Option<&FeatureVector> {
        self.features.last()
    }

    /// Chronological split into train, validation and test slices
    pub fn split(&self, config: &SplitConfig) -> Result<TrainTestSplit> {
        config.validate()?;
        let (train_end, val_end) = config.boundaries(self.len());

        let slice = |start: usize, end: usize| FeatureMatrix {
            features: self.features[start..end].to_vec(),
            labels: self.labels[start..end].to_vec(),
        };

        Ok(TrainTestSplit {
            train: slice(0, train_end),
            validation: slice(train_end, val_end),
            test: slice(val_end, self.len()),
        })
    }
}

/// Data split type for ML training
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitType {
    Train,
    Validation,
    Test,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Train => "train",
            SplitType::Validation => "validation",
            SplitType::Test => "test",
        }
    }
}

/// Configuration for chronological data splitting
///
/// Rows are never shuffled: earlier days train, later days test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Training set fraction (0.0-1.0)
    pub train_pct: f64,
    /// Validation set fraction (0.0-1.0)
    pub val_pct: f64,
    /// Test set fraction (0.0-1.0)
    pub test_pct: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_pct: 0.70,
            val_pct: 0.0,
            test_pct: 0.30,
        }
    }
}

impl SplitConfig {
    /// Validate split fractions are non-negative and sum to 1.0
    pub fn validate(&self) -> Result<()> {
        let parts = [self.train_pct, self.val_pct, self.test_pct];
        if parts.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(WorkloadError::invalid(format!(
                "Split fractions must lie in [0, 1], got {:?}",
                parts
            )));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 0.001 {
            return Err(WorkloadError::invalid(format!(
                "Split fractions must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }

    /// End index (exclusive) of the train and validation slices
    pub fn boundaries(&self, total: usize) -> (usize, usize) {
        let train_end = ((total as f64 * self.train_pct) as usize).min(total);
        let val_end =
            ((total as f64 * (self.train_pct + self.val_pct)) as usize).clamp(train_end, total);
        (train_end, val_end)
    }

    /// Determine split type for a row based on its index
    pub fn determine_split(&self, index: usize, total: usize) -> SplitType {
        let (train_end, val_end) = self.boundaries(total);
        if index < train_end {
            SplitType::Train
        } else if index < val_end {
            SplitType::Validation
        } else {
            SplitType::Test
        }
    }
}

/// Result of [`FeatureMatrix::split`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: FeatureMatrix,
    pub validation: FeatureMatrix,
    pub test: FeatureMatrix,
}
