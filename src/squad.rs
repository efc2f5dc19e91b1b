//! Parallel simulation of several players
//!
//! Players are independent of each other, so each runs on its own rayon task.
//! A single player's days are still simulated strictly in order. Player `i`
//! is seeded with `base_seed + i`, which keeps every dataset reproducible
//! regardless of scheduling.

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::dataset::InjuryDataset;
use crate::error::{Result, WorkloadError};
use crate::risk::InjuryRiskModel;
use crate::simulator::{SimulationParams, WorkloadSimulator};

/// Configuration for squad simulation
#[derive(Debug, Clone)]
pub struct SquadConfig {
    pub start_date: NaiveDate,
    pub horizon_days: i64,
    /// Seed of the first player; later players add their index
    pub base_seed: u64,
    pub risk_model: InjuryRiskModel,
    /// Show progress bar while simulating
    pub show_progress: bool,
}

/// Summary of a squad run
#[derive(Debug, Clone)]
pub struct SquadSummary {
    pub players: usize,
    pub total_days: usize,
    pub total_injuries: usize,
    pub duration_ms: u128,
}

impl SquadSummary {
    /// Get human-readable summary
    pub fn to_string_pretty(&self) -> String {
        format!(
            "Squad Simulation Summary\n  \
             Players: {}\n  \
             Simulated Days: {}\n  \
             Injuries: {}\n  \
             Total Time: {:.2}s",
            self.players,
            self.total_days,
            self.total_injuries,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// Seed assigned to the player at `index`
pub fn player_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// Simulate every player and return datasets in input order
pub fn simulate_squad(
    players: &[String],
    config: &SquadConfig,
) -> Result<(Vec<InjuryDataset>, SquadSummary)> {
    if players.is_empty() {
        return Err(WorkloadError::invalid("squad must contain at least one player"));
    }
    config.risk_model.validate()?;

    // Fail before any work starts if one player is misconfigured
    let params: Vec<SimulationParams> = players
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            let params = SimulationParams::new(
                player.clone(),
                config.start_date,
                config.horizon_days,
                player_seed(config.base_seed, idx),
            );
            params.validate().map(|_| params)
        })
        .collect::<Result<_>>()?;

    let start_time = std::time::Instant::now();
    info!("Starting squad simulation of {} players", players.len());

    let progress = if config.show_progress {
        let pb = ProgressBar::new(players.len() as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Falling back to default progress style: {}", e),
        }
        Some(pb)
    } else {
        None
    };

    let datasets = params
        .into_par_iter()
        .map(|params| {
            let dataset = WorkloadSimulator::new(params)?
                .with_risk_model(config.risk_model.clone())?
                .run();
            if let Some(pb) = &progress {
                pb.set_message(dataset.player.clone());
                pb.inc(1);
            }
            Ok(dataset)
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(pb) = progress {
        pb.finish_with_message("Complete");
    }

    let summary = SquadSummary {
        players: datasets.len(),
        total_days: datasets.iter().map(InjuryDataset::len).sum(),
        total_injuries: datasets.iter().map(InjuryDataset::injury_count).sum(),
        duration_ms: start_time.elapsed().as_millis(),
    };

    info!("{}", summary.to_string_pretty());
    Ok((datasets, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::DEFAULT_SEED;

    fn config(horizon_days: i64) -> SquadConfig {
        SquadConfig {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            horizon_days,
            base_seed: DEFAULT_SEED,
            risk_model: InjuryRiskModel::default(),
            show_progress: false,
        }
    }

    fn players() -> Vec<String> {
        ["Alex", "Sam", "Jordan"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_squad_matches_individual_runs() {
        let (datasets, summary) = simulate_squad(&players(), &config(120)).unwrap();
        assert_eq!(summary.players, 3);
        assert_eq!(summary.total_days, 360);

        for (idx, dataset) in datasets.iter().enumerate() {
            assert_eq!(dataset.player, players()[idx]);
            let solo = WorkloadSimulator::new(SimulationParams::new(
                players()[idx].clone(),
                NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                120,
                player_seed(DEFAULT_SEED, idx),
            ))
            .unwrap()
            .run();
            assert_eq!(dataset, &solo);
        }
    }

    #[test]
    fn test_empty_squad_rejected() {
        assert!(simulate_squad(&[], &config(10)).is_err());
    }

    #[test]
    fn test_invalid_player_rejected_up_front() {
        let mut names = players();
        names.push(String::new());
        assert!(matches!(
            simulate_squad(&names, &config(10)),
            Err(WorkloadError::InvalidConfiguration(_))
        ));
    }
}
