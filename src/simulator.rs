//! Day-by-day workload and injury simulator
//!
//! Each step advances a player's activity, fatigue and rest state, derives the
//! rolling features from the history emitted so far, and draws the injury
//! label. An injury schedules forced rest that idles the days that follow, so
//! generation and labelling happen in the same forward pass.
//!
//! Random draws happen in a fixed order per day: practice, gym, match (only
//! when both are at most one hour) and intensity on active days, then the risk
//! noise, the injury trial and, on injury days, the forced-rest length.

use chrono::{Days, NaiveDate};
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::ops::{Range, RangeInclusive};
use tracing::{debug, info, trace};

use crate::dataset::InjuryDataset;
use crate::error::{Result, WorkloadError};
use crate::models::{DayRecord, DerivedRecord, SimulationState, WorkloadRow};
use crate::risk::{InjuryRiskModel, RiskFactors};
use crate::rolling::{RollingHistory, RollingSnapshot};

/// Seed used when the caller does not pick one
pub const DEFAULT_SEED: u64 = 35;

/// Weight kept from yesterday's fatigue
pub const FATIGUE_DECAY: f64 = 0.9;

/// Weight given to today's workload in the fatigue average
pub const FATIGUE_GAIN: f64 = 0.1;

/// Range `injury_proneness` is drawn from
pub const PRONENESS_RANGE: Range<f64> = 0.0..0.15;

/// Longest horizon accepted, one hundred years of days
///
/// The fatigue history is kept sorted, so a day costs time linear in the days
/// before it.
pub const MAX_HORIZON_DAYS: i64 = 36_525;

/// Forced rest length after an injury, in days
pub const FORCED_REST_DAYS: RangeInclusive<u32> = 7..=13;

const SESSION_HOURS: RangeInclusive<u32> = 0..=2;
const MATCH_HOURS: RangeInclusive<u32> = 2..=3;
const ACTIVE_INTENSITY: RangeInclusive<u32> = 4..=9;
const IDLE_INTENSITY: RangeInclusive<u32> = 1..=2;
const REST_INTENSITY: u32 = 1;

/// Accepted start date layouts
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m-%d-%Y", "%Y/%m/%d"];

/// Construction parameters for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub player_id: String,
    pub start_date: NaiveDate,
    pub horizon_days: i64,
    pub seed: u64,
}

impl SimulationParams {
    pub fn new(
        player_id: impl Into<String>,
        start_date: NaiveDate,
        horizon_days: i64,
        seed: u64,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            start_date,
            horizon_days,
            seed,
        }
    }

    /// Build parameters from a textual start date
    pub fn parse(
        player_id: impl Into<String>,
        start_date: &str,
        horizon_days: i64,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self::new(player_id, parse_start_date(start_date)?, horizon_days, seed))
    }

    pub fn validate(&self) -> Result<()> {
        if self.player_id.trim().is_empty() {
            return Err(WorkloadError::invalid("player id must not be empty"));
        }
        if self.horizon_days <= 0 {
            return Err(WorkloadError::invalid(format!(
                "horizon must be a positive number of days, got {}",
                self.horizon_days
            )));
        }
        if self.horizon_days > MAX_HORIZON_DAYS {
            return Err(WorkloadError::invalid(format!(
                "horizon of {} days exceeds the {} day limit",
                self.horizon_days, MAX_HORIZON_DAYS
            )));
        }
        let last_offset = (self.horizon_days - 1) as u64;
        if self.start_date.checked_add_days(Days::new(last_offset)).is_none() {
            return Err(WorkloadError::invalid(format!(
                "a {} day horizon from {} runs past the supported calendar",
                self.horizon_days, self.start_date
            )));
        }
        Ok(())
    }
}

/// Parse a start date in any of the accepted layouts
pub fn parse_start_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| WorkloadError::invalid(format!("malformed start date '{}'", input)))
}

// Always the first draw of a run's stream
fn draw_injury_proneness(rng: &mut ChaCha8Rng) -> f64 {
    rng.gen_range(PRONENESS_RANGE)
}

/// Proneness a run seeded with `seed` draws for its player
///
/// Lets a table saved without its proneness be scored as it was simulated.
pub fn injury_proneness_for_seed(seed: u64) -> f64 {
    draw_injury_proneness(&mut ChaCha8Rng::seed_from_u64(seed))
}

/// Sequential workload simulator for a single player
///
/// Iterating yields one [`WorkloadRow`] per day of the horizon; [`run`](Self::run)
/// drives the iteration to completion.
#[derive(Debug, Clone)]
pub struct WorkloadSimulator {
    params: SimulationParams,
    state: SimulationState,
    risk_model: InjuryRiskModel,
    rng: ChaCha8Rng,
    standard_normal: Normal,
    history: RollingHistory,
    day_index: i64,
}

impl WorkloadSimulator {
    /// Validate parameters, seed the random stream and draw the player's proneness
    pub fn new(params: SimulationParams) -> Result<Self> {
        params.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let injury_proneness = draw_injury_proneness(&mut rng);
        let standard_normal =
            Normal::new(0.0, 1.0).map_err(|e| WorkloadError::invalid(e.to_string()))?;

        let state = SimulationState::new(params.player_id.clone(), injury_proneness, params.seed);
        let history = RollingHistory::with_capacity(params.horizon_days as usize);

        Ok(Self {
            params,
            state,
            risk_model: InjuryRiskModel::default(),
            rng,
            standard_normal,
            history,
            day_index: 0,
        })
    }

    /// Replace the default risk model
    pub fn with_risk_model(mut self, risk_model: InjuryRiskModel) -> Result<Self> {
        risk_model.validate()?;
        self.risk_model = risk_model;
        Ok(self)
    }

    /// Override the drawn proneness, e.g. to model a known-robust player
    pub fn with_injury_proneness(mut self, proneness: f64) -> Self {
        self.state.injury_proneness = proneness.max(0.0);
        self
    }

    /// Start the run in the middle of an injury layoff
    pub fn with_forced_rest(mut self, days: u32) -> Self {
        self.state.forced_rest_remaining = days;
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn risk_model(&self) -> &InjuryRiskModel {
        &self.risk_model
    }

    /// Days still to be simulated
    pub fn remaining_days(&self) -> usize {
        (self.params.horizon_days - self.day_index).max(0) as usize
    }

    /// Generate one day's activity and advance rest and fatigue state
    pub fn generate_day(&mut self, date: NaiveDate) -> DayRecord {
        let (practice_hours, gym_hours, match_hours, intensity) = if self.state.is_resting() {
            if self.state.forced_rest_remaining > 0 {
                self.state.forced_rest_remaining -= 1;
            }
            self.state.rest_day_flag = false;
            (0, 0, 0, REST_INTENSITY)
        } else {
            let practice = self.rng.gen_range(SESSION_HOURS);
            let gym = self.rng.gen_range(SESSION_HOURS);
            let match_hours = if practice <= 1 && gym <= 1 {
                self.rng.gen_range(MATCH_HOURS)
            } else {
                0
            };

            let intensity = if practice + gym + match_hours > 0 {
                self.rng.gen_range(ACTIVE_INTENSITY)
            } else {
                self.rng.gen_range(IDLE_INTENSITY)
            };

            if match_hours > 0 {
                self.state.rest_day_flag = true;
            }
            (practice, gym, match_hours, intensity)
        };

        let workload = (practice_hours + gym_hours + match_hours) * intensity;
        self.state.fatigue =
            FATIGUE_DECAY * self.state.fatigue + FATIGUE_GAIN * f64::from(workload);

        DayRecord {
            date,
            practice_hours,
            gym_hours,
            match_hours,
            intensity,
            workload,
            fatigue: self.state.fatigue,
        }
    }

    /// Evaluate the day's injury risk, draw the label and schedule forced rest
    fn label_day(&mut self, day: &DayRecord, snapshot: &RollingSnapshot) -> DerivedRecord {
        let factors = RiskFactors {
            acwr: snapshot.acwr,
            fatigue: day.fatigue,
            fatigue_reference: snapshot.fatigue_reference,
            intensity: day.intensity,
            high_intensity_streak: snapshot.high_intensity_streak,
        };

        let noise = self.risk_model.noise_std_dev * self.standard_normal.sample(&mut self.rng);
        let assessment = self
            .risk_model
            .assess(&factors, self.state.injury_proneness, noise);
        let injury = self.rng.gen::<f64>() < assessment.probability;

        if injury {
            let rest_days = self.rng.gen_range(FORCED_REST_DAYS);
            self.state.forced_rest_remaining = rest_days;
            debug!(
                player = %self.state.player_id,
                date = %day.date,
                risk = assessment.probability,
                acwr = snapshot.acwr,
                rest_days,
                "Injury drawn, forced rest scheduled"
            );
        }

        DerivedRecord {
            acute: snapshot.acute,
            chronic: snapshot.chronic,
            acwr: snapshot.acwr,
            high_intensity_streak: snapshot.high_intensity_streak,
            risk: assessment,
            injury,
        }
    }

    /// Advance one full day and return its activity alongside the derived
    /// features and the risk breakdown the label was drawn with
    pub fn step_day(&mut self) -> Option<(DayRecord, DerivedRecord)> {
        if self.day_index >= self.params.horizon_days {
            return None;
        }
        let date = self
            .params
            .start_date
            .checked_add_days(Days::new(self.day_index as u64))?;
        self.day_index += 1;

        let day = self.generate_day(date);
        let snapshot = self.history.push(
            f64::from(day.workload),
            self.risk_model.is_high_intensity(day.intensity),
            day.fatigue,
            self.risk_model.fatigue_quantile,
        );
        let derived = self.label_day(&day, &snapshot);

        trace!(
            date = %day.date,
            workload = day.workload,
            fatigue = day.fatigue,
            acwr = derived.acwr,
            risk = derived.risk.probability,
            injury = derived.injury,
            "Simulated day"
        );

        Some((day, derived))
    }

    /// Advance one full day: activity, rolling features, injury label
    pub fn step(&mut self) -> Option<WorkloadRow> {
        let (day, derived) = self.step_day()?;
        Some(WorkloadRow::from_parts(&self.state.player_id, &day, &derived))
    }

    /// Simulate the whole horizon
    pub fn run(mut self) -> InjuryDataset {
        info!(
            player = %self.params.player_id,
            start = %self.params.start_date,
            horizon = self.params.horizon_days,
            seed = self.params.seed,
            proneness = self.state.injury_proneness,
            "Starting workload simulation"
        );

        let mut rows = Vec::with_capacity(self.remaining_days());
        while let Some(row) = self.step() {
            rows.push(row);
        }

        let dataset = InjuryDataset::new(
            self.params.player_id.clone(),
            self.params.seed,
            self.state.injury_proneness,
            rows,
        );

        info!(
            player = %dataset.player,
            days = dataset.len(),
            injuries = dataset.injury_count(),
            "Simulation complete"
        );
        dataset
    }
}

impl Iterator for WorkloadSimulator {
    type Item = WorkloadRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_days();
        (remaining, Some(remaining))
    }
}

/// Convenience wrapper: validate, simulate and return the full dataset
pub fn simulate(params: SimulationParams, risk_model: InjuryRiskModel) -> Result<InjuryDataset> {
    Ok(WorkloadSimulator::new(params)?
        .with_risk_model(risk_model)?
        .run())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(days: i64) -> SimulationParams {
        SimulationParams::new(
            "Alex",
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            days,
            DEFAULT_SEED,
        )
    }

    #[test]
    fn test_rejects_empty_player() {
        let mut p = params(10);
        p.player_id = "  ".to_string();
        assert!(matches!(
            WorkloadSimulator::new(p),
            Err(WorkloadError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_horizon() {
        assert!(WorkloadSimulator::new(params(0)).is_err());
        assert!(WorkloadSimulator::new(params(-5)).is_err());
    }

    #[test]
    fn test_horizon_upper_bound() {
        assert!(params(MAX_HORIZON_DAYS).validate().is_ok());
        assert!(matches!(
            WorkloadSimulator::new(params(MAX_HORIZON_DAYS + 1)),
            Err(WorkloadError::InvalidConfiguration(_))
        ));
        assert!(params(i64::MAX).validate().is_err());
    }

    #[test]
    fn test_parse_start_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert_eq!(parse_start_date("2022-01-01").unwrap(), expected);
        assert_eq!(parse_start_date("01-01-2022").unwrap(), expected);
        assert!(matches!(
            parse_start_date("first of january"),
            Err(WorkloadError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_proneness_in_range() {
        for seed in 0..50 {
            let mut p = params(1);
            p.seed = seed;
            let sim = WorkloadSimulator::new(p).unwrap();
            assert!(PRONENESS_RANGE.contains(&sim.state().injury_proneness));
        }
    }

    #[test]
    fn test_proneness_recovered_from_seed() {
        for seed in [0, 35, 99, u64::MAX] {
            let mut p = params(1);
            p.seed = seed;
            let sim = WorkloadSimulator::new(p).unwrap();
            assert_eq!(sim.state().injury_proneness, injury_proneness_for_seed(seed));
        }
    }

    #[test]
    fn test_rest_flag_after_match() {
        let mut sim = WorkloadSimulator::new(params(400)).unwrap();
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let mut previous_was_match = false;

        for offset in 0..400 {
            let day = sim.generate_day(start + Days::new(offset));
            if previous_was_match {
                assert_eq!(day.workload, 0);
                assert_eq!(day.total_hours(), 0);
                assert_eq!(day.intensity, REST_INTENSITY);
            }
            previous_was_match = day.is_match_day();
        }
    }

    #[test]
    fn test_match_only_when_sessions_are_short() {
        let sim = WorkloadSimulator::new(params(500)).unwrap();
        for row in sim {
            if row.match_hours > 0 {
                assert!(row.practice_hours <= 1 && row.gym_hours <= 1);
                assert!(MATCH_HOURS.contains(&row.match_hours));
            }
        }
    }

    #[test]
    fn test_intensity_bands() {
        let sim = WorkloadSimulator::new(params(500)).unwrap();
        for row in sim {
            if row.total_hours() > 0 {
                assert!(ACTIVE_INTENSITY.contains(&row.intensity));
            } else {
                assert!(row.intensity <= 2);
            }
        }
    }

    #[test]
    fn test_forced_rest_idles_days_and_counts_down() {
        let mut sim = WorkloadSimulator::new(params(30))
            .unwrap()
            .with_injury_proneness(0.0)
            .with_forced_rest(5);
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

        for offset in 0..5u64 {
            assert_eq!(sim.state().forced_rest_remaining, 5 - offset as u32);
            let day = sim.generate_day(start + Days::new(offset));
            assert_eq!(day.workload, 0);
        }
        assert_eq!(sim.state().forced_rest_remaining, 0);
    }

    #[test]
    fn test_fatigue_decays_on_rest() {
        let mut sim = WorkloadSimulator::new(params(30)).unwrap();
        sim.state.fatigue = 10.0;
        sim.state.forced_rest_remaining = 3;
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

        let day = sim.generate_day(start);
        assert!((day.fatigue - 9.0).abs() < 1e-12);
        let day = sim.generate_day(start + Days::new(1));
        assert!((day.fatigue - 8.1).abs() < 1e-12);
    }

    #[test]
    fn test_injury_schedules_forced_rest() {
        // Probability 1.0 makes every trial an injury
        let model = InjuryRiskModel {
            base_risk: 1.0,
            noise_std_dev: 0.0,
            max_risk: 1.0,
            ..InjuryRiskModel::default()
        };
        let mut sim = WorkloadSimulator::new(params(40))
            .unwrap()
            .with_risk_model(model)
            .unwrap();

        let first = sim.step().unwrap();
        assert!(first.injury);
        let rest = sim.state().forced_rest_remaining;
        assert!(FORCED_REST_DAYS.contains(&rest));

        for _ in 0..rest {
            let row = sim.step().unwrap();
            assert_eq!(row.workload, 0);
            assert_eq!(row.total_hours(), 0);
        }
    }

    #[test]
    fn test_iterator_size_hint() {
        let mut sim = WorkloadSimulator::new(params(12)).unwrap();
        assert_eq!(sim.size_hint(), (12, Some(12)));
        sim.next();
        assert_eq!(sim.remaining_days(), 11);
        assert_eq!(sim.count(), 11);
    }
}
