//! Layered daily injury-risk model
//!
//! Risk starts from a base rate plus the player's proneness and a noise draw,
//! then picks up additive bonuses for high ACWR, accumulated fatigue and
//! high-intensity work before being clamped to a probability ceiling.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkloadError};

/// ACWR threshold paired with the bonus added once it is exceeded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcwrTier {
    pub threshold: f64,
    pub bonus: f64,
}

/// Risk model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjuryRiskModel {
    /// Risk every day carries before any bonus
    pub base_risk: f64,

    /// Standard deviation of the daily Gaussian noise
    pub noise_std_dev: f64,

    /// Cumulative ACWR tiers, ascending by threshold
    pub acwr_tiers: Vec<AcwrTier>,

    /// Quantile of the fatigue history that counts as "high fatigue"
    pub fatigue_quantile: f64,
    pub fatigue_bonus: f64,

    /// Intensity at or above which a day counts as high intensity
    pub high_intensity_threshold: u32,
    pub intensity_bonus: f64,

    /// Streak length at or above which the streak bonus applies
    pub streak_threshold: u32,
    pub streak_bonus: f64,

    /// Ceiling on the daily injury probability
    pub max_risk: f64,
}

impl Default for InjuryRiskModel {
    fn default() -> Self {
        Self {
            base_risk: 0.01,
            noise_std_dev: 0.02,
            acwr_tiers: vec![
                AcwrTier { threshold: 1.3, bonus: 0.05 },
                AcwrTier { threshold: 1.5, bonus: 0.10 },
                AcwrTier { threshold: 1.8, bonus: 0.15 },
            ],
            fatigue_quantile: 0.75,
            fatigue_bonus: 0.10,
            high_intensity_threshold: 8,
            intensity_bonus: 0.05,
            streak_threshold: 3,
            streak_bonus: 0.10,
            max_risk: 0.7,
        }
    }
}

/// Per-day inputs to the risk model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFactors {
    pub acwr: f64,
    pub fatigue: f64,
    /// Fatigue level above which the fatigue bonus applies
    pub fatigue_reference: f64,
    pub intensity: u32,
    pub high_intensity_streak: u32,
}

/// Breakdown of a single day's risk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Base risk plus proneness plus noise
    pub baseline: f64,
    pub acwr_bonus: f64,
    pub fatigue_bonus: f64,
    pub intensity_bonus: f64,
    pub streak_bonus: f64,
    /// Clamped probability used for the Bernoulli draw
    pub probability: f64,
}

impl RiskAssessment {
    /// Sum of all bonuses before clamping
    pub fn total_bonus(&self) -> f64 {
        self.acwr_bonus + self.fatigue_bonus + self.intensity_bonus + self.streak_bonus
    }
}

impl InjuryRiskModel {
    /// Check the parameters describe a usable probability model
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_risk) {
            return Err(WorkloadError::invalid(format!(
                "max_risk must be within [0, 1], got {}",
                self.max_risk
            )));
        }
        if !self.noise_std_dev.is_finite() || self.noise_std_dev < 0.0 {
            return Err(WorkloadError::invalid(format!(
                "noise_std_dev must be non-negative, got {}",
                self.noise_std_dev
            )));
        }
        if !(0.0..=1.0).contains(&self.fatigue_quantile) {
            return Err(WorkloadError::invalid(format!(
                "fatigue_quantile must be within [0, 1], got {}",
                self.fatigue_quantile
            )));
        }
        if self
            .acwr_tiers
            .windows(2)
            .any(|pair| pair[0].threshold >= pair[1].threshold)
        {
            return Err(WorkloadError::invalid(
                "acwr_tiers must be sorted by strictly increasing threshold",
            ));
        }
        if self.acwr_tiers.iter().any(|tier| tier.bonus < 0.0) {
            return Err(WorkloadError::invalid("acwr tier bonuses must be non-negative"));
        }
        Ok(())
    }

    /// Risk for one day given the player's proneness and that day's noise draw
    pub fn assess(&self, factors: &RiskFactors, proneness: f64, noise: f64) -> RiskAssessment {
        let baseline = self.base_risk + proneness + noise;

        let acwr_bonus = self
            .acwr_tiers
            .iter()
            .filter(|tier| factors.acwr > tier.threshold)
            .map(|tier| tier.bonus)
            .sum();

        let fatigue_bonus = if factors.fatigue > factors.fatigue_reference {
            self.fatigue_bonus
        } else {
            0.0
        };

        let intensity_bonus = if factors.intensity >= self.high_intensity_threshold {
            self.intensity_bonus
        } else {
            0.0
        };

        let streak_bonus = if factors.high_intensity_streak >= self.streak_threshold {
            self.streak_bonus
        } else {
            0.0
        };

        let raw = baseline + acwr_bonus + fatigue_bonus + intensity_bonus + streak_bonus;

        RiskAssessment {
            baseline,
            acwr_bonus,
            fatigue_bonus,
            intensity_bonus,
            streak_bonus,
            probability: raw.clamp(0.0, self.max_risk),
        }
    }

    /// Noise-free probability, the expectation of the daily draw's center
    pub fn expected_probability(&self, factors: &RiskFactors, proneness: f64) -> f64 {
        self.assess(factors, proneness, 0.0).probability
    }

    pub fn is_high_intensity(&self, intensity: u32) -> bool {
        intensity >= self.high_intensity_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm_factors() -> RiskFactors {
        RiskFactors {
            acwr: 1.0,
            fatigue: 1.0,
            fatigue_reference: 2.0,
            intensity: 5,
            high_intensity_streak: 0,
        }
    }

    #[test]
    fn test_baseline_only() {
        let model = InjuryRiskModel::default();
        let assessment = model.assess(&calm_factors(), 0.05, 0.0);
        assert!((assessment.probability - 0.06).abs() < 1e-12);
        assert_eq!(assessment.total_bonus(), 0.0);
    }

    #[test]
    fn test_acwr_tiers_are_cumulative() {
        let model = InjuryRiskModel::default();
        let mut factors = calm_factors();

        factors.acwr = 1.4;
        assert!((model.assess(&factors, 0.0, 0.0).acwr_bonus - 0.05).abs() < 1e-12);

        factors.acwr = 1.6;
        assert!((model.assess(&factors, 0.0, 0.0).acwr_bonus - 0.15).abs() < 1e-12);

        factors.acwr = 2.0;
        assert!((model.assess(&factors, 0.0, 0.0).acwr_bonus - 0.30).abs() < 1e-12);

        // Thresholds are strict
        factors.acwr = 1.3;
        assert_eq!(model.assess(&factors, 0.0, 0.0).acwr_bonus, 0.0);
    }

    #[test]
    fn test_all_bonuses_clamped() {
        let model = InjuryRiskModel::default();
        let factors = RiskFactors {
            acwr: 2.5,
            fatigue: 10.0,
            fatigue_reference: 5.0,
            intensity: 9,
            high_intensity_streak: 3,
        };
        let assessment = model.assess(&factors, 0.15, 0.04);
        assert!((assessment.total_bonus() - 0.55).abs() < 1e-12);
        assert_eq!(assessment.probability, 0.7);
    }

    #[test]
    fn test_negative_noise_floors_at_zero() {
        let model = InjuryRiskModel::default();
        let assessment = model.assess(&calm_factors(), 0.0, -0.2);
        assert_eq!(assessment.probability, 0.0);
    }

    #[test]
    fn test_fatigue_equal_to_reference_gets_no_bonus() {
        let model = InjuryRiskModel::default();
        let mut factors = calm_factors();
        factors.fatigue = 2.0;
        assert_eq!(model.assess(&factors, 0.0, 0.0).fatigue_bonus, 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(InjuryRiskModel::default().validate().is_ok());

        let model = InjuryRiskModel {
            max_risk: 1.5,
            ..InjuryRiskModel::default()
        };
        assert!(model.validate().is_err());

        let model = InjuryRiskModel {
            acwr_tiers: vec![
                AcwrTier { threshold: 1.5, bonus: 0.1 },
                AcwrTier { threshold: 1.3, bonus: 0.05 },
            ],
            ..InjuryRiskModel::default()
        };
        assert!(model.validate().is_err());
    }
}
