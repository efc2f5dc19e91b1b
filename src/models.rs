use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::risk::RiskAssessment;

/// Mutable per-player state carried from one simulated day to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Player this state belongs to
    pub player_id: String,

    /// Set after a match day; the next day is idle
    pub rest_day_flag: bool,

    /// Remaining injury-enforced idle days
    pub forced_rest_remaining: u32,

    /// Exponential moving average of daily workload
    pub fatigue: f64,

    /// Individual susceptibility added to the base injury risk every day
    pub injury_proneness: f64,

    /// Seed the run's random stream was created from
    pub rng_seed: u64,
}

impl SimulationState {
    /// Fresh state for a player who has not trained yet
    pub fn new(player_id: impl Into<String>, injury_proneness: f64, rng_seed: u64) -> Self {
        Self {
            player_id: player_id.into(),
            rest_day_flag: false,
            forced_rest_remaining: 0,
            fatigue: 0.0,
            injury_proneness,
            rng_seed,
        }
    }

    /// True when the next generated day must be idle
    pub fn is_resting(&self) -> bool {
        self.rest_day_flag || self.forced_rest_remaining > 0
    }
}

/// Raw activity emitted for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub practice_hours: u32,
    pub gym_hours: u32,
    pub match_hours: u32,

    /// Session intensity on a 1-9 scale
    pub intensity: u32,

    /// Total active hours multiplied by intensity
    pub workload: u32,

    /// Fatigue after this day's update
    pub fatigue: f64,
}

impl DayRecord {
    /// Sum of practice, gym and match hours
    pub fn total_hours(&self) -> u32 {
        self.practice_hours + self.gym_hours + self.match_hours
    }

    pub fn is_match_day(&self) -> bool {
        self.match_hours > 0
    }

    pub fn is_active(&self) -> bool {
        self.total_hours() > 0
    }
}

/// Rolling features and injury label computed for a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    /// 7-day trailing mean workload
    pub acute: f64,

    /// 28-day trailing mean workload
    pub chronic: f64,

    /// Acute:chronic workload ratio
    pub acwr: f64,

    /// High-intensity days within the trailing 3-day window
    pub high_intensity_streak: u32,

    /// Risk breakdown the label was drawn with
    pub risk: RiskAssessment,

    pub injury: bool,
}

/// One row of the output table, columns named for downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRow {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Practice")]
    pub practice_hours: u32,
    #[serde(rename = "Gym")]
    pub gym_hours: u32,
    #[serde(rename = "Match")]
    pub match_hours: u32,
    #[serde(rename = "Intensity")]
    pub intensity: u32,
    #[serde(rename = "Workload")]
    pub workload: u32,
    #[serde(rename = "Fatigue")]
    pub fatigue: f64,
    #[serde(rename = "Acute")]
    pub acute: f64,
    #[serde(rename = "Chronic")]
    pub chronic: f64,
    #[serde(rename = "ACWR")]
    pub acwr: f64,
    #[serde(rename = "HighIntensityStreak")]
    pub high_intensity_streak: u32,
    #[serde(rename = "Injury", with = "bool_as_int")]
    pub injury: bool,
}

impl WorkloadRow {
    /// Join a day's raw activity with its derived features
    pub fn from_parts(player: &str, day: &DayRecord, derived: &DerivedRecord) -> Self {
        Self {
            player: player.to_string(),
            date: day.date,
            practice_hours: day.practice_hours,
            gym_hours: day.gym_hours,
            match_hours: day.match_hours,
            intensity: day.intensity,
            workload: day.workload,
            fatigue: day.fatigue,
            acute: derived.acute,
            chronic: derived.chronic,
            acwr: derived.acwr,
            high_intensity_streak: derived.high_intensity_streak,
            injury: derived.injury,
        }
    }

    pub fn total_hours(&self) -> u32 {
        self.practice_hours + self.gym_hours + self.match_hours
    }
}

// Labels go out as 0/1 so classifiers can read them as numeric targets
mod bool_as_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Ok(value != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_day() -> DayRecord {
        DayRecord {
            date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            practice_hours: 1,
            gym_hours: 0,
            match_hours: 3,
            intensity: 7,
            workload: 28,
            fatigue: 2.8,
        }
    }

    #[test]
    fn test_state_resting() {
        let mut state = SimulationState::new("Alex", 0.05, 35);
        assert!(!state.is_resting());

        state.rest_day_flag = true;
        assert!(state.is_resting());

        state.rest_day_flag = false;
        state.forced_rest_remaining = 3;
        assert!(state.is_resting());
    }

    #[test]
    fn test_day_record_hours() {
        let day = sample_day();
        assert_eq!(day.total_hours(), 4);
        assert!(day.is_match_day());
        assert!(day.is_active());
    }

    #[test]
    fn test_row_serializes_injury_as_int() {
        let day = sample_day();
        let derived = DerivedRecord {
            acute: 28.0,
            chronic: 28.0,
            acwr: 1.0,
            high_intensity_streak: 0,
            risk: RiskAssessment {
                baseline: 0.05,
                acwr_bonus: 0.0,
                fatigue_bonus: 0.0,
                intensity_bonus: 0.0,
                streak_bonus: 0.0,
                probability: 0.05,
            },
            injury: true,
        };
        let row = WorkloadRow::from_parts("Alex", &day, &derived);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Injury"], 1);
        assert_eq!(json["ACWR"], 1.0);
        assert_eq!(json["Player"], "Alex");

        let back: WorkloadRow = serde_json::from_value(json).unwrap();
        assert!(back.injury);
    }
}
