//! The generated table and summary statistics over it

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use statrs::statistics::Statistics;

use crate::error::Result;
use crate::export::csv::write_dataset;
use crate::models::WorkloadRow;
use crate::rolling::quantile;

/// Complete simulated history for one player, ordered by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryDataset {
    pub player: String,
    pub seed: u64,
    pub injury_proneness: f64,
    pub rows: Vec<WorkloadRow>,
}

/// Aggregate view of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub player: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub days: usize,
    pub active_days: usize,
    pub match_days: usize,
    pub rest_days: usize,
    pub injuries: usize,
    /// Share of days labelled as injuries
    pub injury_rate: f64,
    pub mean_workload: f64,
    pub mean_acwr: f64,
    pub max_acwr: f64,
    pub mean_fatigue: f64,
    pub fatigue_p75: f64,
}

impl InjuryDataset {
    pub fn new(player: String, seed: u64, injury_proneness: f64, rows: Vec<WorkloadRow>) -> Self {
        Self {
            player,
            seed,
            injury_proneness,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row
    pub fn latest(&self) -> Option<&WorkloadRow> {
        self.rows.last()
    }

    /// The last `days` rows, or all rows when fewer exist
    pub fn recent(&self, days: usize) -> &[WorkloadRow] {
        let start = self.rows.len().saturating_sub(days);
        &self.rows[start..]
    }

    pub fn injury_count(&self) -> usize {
        self.rows.iter().filter(|r| r.injury).count()
    }

    /// Compute the aggregate summary
    pub fn summary(&self) -> DatasetSummary {
        let days = self.rows.len();
        let active_days = self.rows.iter().filter(|r| r.total_hours() > 0).count();
        let match_days = self.rows.iter().filter(|r| r.match_hours > 0).count();
        let injuries = self.injury_count();

        let workloads: Vec<f64> = self.rows.iter().map(|r| f64::from(r.workload)).collect();
        let acwrs: Vec<f64> = self.rows.iter().map(|r| r.acwr).collect();
        let fatigues: Vec<f64> = self.rows.iter().map(|r| r.fatigue).collect();

        let or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };

        DatasetSummary {
            player: self.player.clone(),
            first_date: self.rows.first().map(|r| r.date),
            last_date: self.rows.last().map(|r| r.date),
            days,
            active_days,
            match_days,
            rest_days: days - active_days,
            injuries,
            injury_rate: if days == 0 {
                0.0
            } else {
                injuries as f64 / days as f64
            },
            mean_workload: or_zero(workloads.iter().mean()),
            mean_acwr: or_zero(acwrs.iter().mean()),
            max_acwr: or_zero(Statistics::max(acwrs.iter())),
            mean_fatigue: or_zero(fatigues.iter().mean()),
            fatigue_p75: quantile(&fatigues, 0.75).unwrap_or(0.0),
        }
    }

    /// SHA-256 of the CSV rendering, hex encoded
    ///
    /// Two runs with the same parameters produce the same fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let mut buffer = Vec::new();
        write_dataset(self, &mut buffer)?;
        let digest = Sha256::digest(&buffer);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }
}
