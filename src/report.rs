//! Coach-facing daily status report
//!
//! The report reads the latest row of a dataset and asks a [`RiskPredictor`]
//! for its injury probability. Any trained classifier can sit behind the
//! trait; [`ExpectedRiskPredictor`] uses the simulator's own risk model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::dataset::InjuryDataset;
use crate::features::{feature_vector, FeatureVector};
use crate::risk::{InjuryRiskModel, RiskFactors};
use crate::rolling::quantile;

/// Probability above which the report recommends rest
pub const ACTION_PROBABILITY_THRESHOLD: f64 = 0.30;

/// Number of trailing days shown alongside a report
pub const RECENT_WINDOW_DAYS: usize = 31;

/// Load classification from the acute:chronic ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// ACWR below 0.8
    Undertrained,
    /// ACWR between 0.8 and 1.3 inclusive
    Optimal,
    /// ACWR above 1.3
    HighRisk,
}

impl LoadStatus {
    pub fn from_acwr(acwr: f64) -> Self {
        if acwr < 0.8 {
            LoadStatus::Undertrained
        } else if acwr <= 1.3 {
            LoadStatus::Optimal
        } else {
            LoadStatus::HighRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Undertrained => "Undertrained",
            LoadStatus::Optimal => "Optimal Load",
            LoadStatus::HighRisk => "High Injury Risk",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A model that scores a feature row with an injury probability
pub trait RiskPredictor {
    /// Probability in [0, 1] that the row is an injury day
    fn predict_probability(&self, features: &FeatureVector) -> f64;
}

/// Scores rows with the simulator's noise-free risk model
#[derive(Debug, Clone)]
pub struct ExpectedRiskPredictor {
    model: InjuryRiskModel,
    injury_proneness: f64,
    fatigue_reference: f64,
}

impl ExpectedRiskPredictor {
    pub fn new(model: InjuryRiskModel, injury_proneness: f64, fatigue_reference: f64) -> Self {
        Self {
            model,
            injury_proneness,
            fatigue_reference,
        }
    }

    /// Calibrate the fatigue reference against a dataset's whole fatigue column
    pub fn from_dataset(model: InjuryRiskModel, dataset: &InjuryDataset) -> Self {
        let fatigues: Vec<f64> = dataset.rows.iter().map(|r| r.fatigue).collect();
        let fatigue_reference = quantile(&fatigues, model.fatigue_quantile).unwrap_or(0.0);
        Self::new(model, dataset.injury_proneness, fatigue_reference)
    }
}

impl RiskPredictor for ExpectedRiskPredictor {
    fn predict_probability(&self, features: &FeatureVector) -> f64 {
        // Order follows FEATURE_COLUMNS
        let factors = RiskFactors {
            acwr: features[2],
            fatigue: features[6],
            fatigue_reference: self.fatigue_reference,
            intensity: features[3] as u32,
            high_intensity_streak: features[5] as u32,
        };
        self.model
            .expected_probability(&factors, self.injury_proneness)
    }
}

/// Recommended action for the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoachAction {
    RestOrRecovery,
    Cleared,
}

impl CoachAction {
    pub fn message(&self) -> &'static str {
        match self {
            CoachAction::RestOrRecovery => {
                "ACTION REQUIRED: High risk detected. Recommend rest or light recovery."
            }
            CoachAction::Cleared => "ACTION: Athlete is cleared for full participation.",
        }
    }
}

/// Daily report for the latest simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachReport {
    pub player: String,
    pub date: NaiveDate,
    pub status: LoadStatus,
    pub risk_probability: f64,
    pub fatigue: f64,
    pub acwr: f64,
    pub action: CoachAction,
}

impl CoachReport {
    /// Build the report from a dataset's latest row, or None for an empty dataset
    pub fn from_latest<P: RiskPredictor + ?Sized>(
        dataset: &InjuryDataset,
        predictor: &P,
    ) -> Option<Self> {
        let latest = dataset.latest()?;
        let status = LoadStatus::from_acwr(latest.acwr);
        let risk_probability = predictor
            .predict_probability(&feature_vector(latest))
            .clamp(0.0, 1.0);

        let action = if risk_probability > ACTION_PROBABILITY_THRESHOLD
            || status == LoadStatus::HighRisk
        {
            CoachAction::RestOrRecovery
        } else {
            CoachAction::Cleared
        };

        Some(Self {
            player: latest.player.clone(),
            date: latest.date,
            status,
            risk_probability,
            fatigue: latest.fatigue,
            acwr: latest.acwr,
            action,
        })
    }

    pub fn requires_action(&self) -> bool {
        self.action == CoachAction::RestOrRecovery
    }
}

impl fmt::Display for CoachReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "COACH'S DAILY REPORT: {} ({})", self.player, self.date)?;
        writeln!(f, "{:-<40}", "")?;
        writeln!(f, "Current Status:     {}", self.status)?;
        writeln!(f, "Injury Risk Score:  {:.2}%", self.risk_probability * 100.0)?;
        writeln!(f, "Fatigue Level:      {:.2}", self.fatigue)?;
        writeln!(f, "ACWR:               {:.2}", self.acwr)?;
        writeln!(f, "{:-<40}", "")?;
        writeln!(f, "{}", self.action.message())?;
        write!(f, "{:-<40}", "")
    }
}

/// One line of the recent-history table
#[derive(Debug, Clone, Tabled)]
pub struct RecentDay {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Workload")]
    pub workload: u32,
    #[tabled(rename = "Acute")]
    pub acute: String,
    #[tabled(rename = "Chronic")]
    pub chronic: String,
    #[tabled(rename = "ACWR")]
    pub acwr: String,
    #[tabled(rename = "Fatigue")]
    pub fatigue: String,
    #[tabled(rename = "Injury")]
    pub injury: &'static str,
}

/// Render the last `days` rows as a table
pub fn recent_table(dataset: &InjuryDataset, days: usize) -> String {
    let rows: Vec<RecentDay> = dataset
        .recent(days)
        .iter()
        .map(|r| RecentDay {
            date: r.date.to_string(),
            workload: r.workload,
            acute: format!("{:.1}", r.acute),
            chronic: format!("{:.1}", r.chronic),
            acwr: format!("{:.2}", r.acwr),
            fatigue: format!("{:.2}", r.fatigue),
            injury: if r.injury { "yes" } else { "" },
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}
