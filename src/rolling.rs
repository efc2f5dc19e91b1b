//! Trailing-window statistics over the day-by-day history
//!
//! Windows at the start of a series use whatever days exist so far instead of
//! failing, so day one has acute = chronic = its own workload.

/// 7-day window for acute load
pub const ACUTE_WINDOW_DAYS: usize = 7;

/// 28-day window for chronic load
pub const CHRONIC_WINDOW_DAYS: usize = 28;

/// 3-day window for the high-intensity streak
pub const STREAK_WINDOW_DAYS: usize = 3;

/// Keeps ACWR finite when chronic load is zero
pub const ACWR_EPSILON: f64 = 1e-6;

/// Mean of the last `window` values, or of all values when fewer exist
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let tail = trailing(values, window);
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Number of true flags among the last `window` entries
pub fn trailing_count(flags: &[bool], window: usize) -> u32 {
    trailing(flags, window).iter().filter(|&&f| f).count() as u32
}

/// Acute:chronic workload ratio with an epsilon-guarded denominator
pub fn acwr(acute: f64, chronic: f64) -> f64 {
    acute / (chronic + ACWR_EPSILON)
}

/// Quantile of an ascending-sorted slice using linear interpolation between
/// the closest ranks
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Quantile of an unsorted slice
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

fn trailing<T>(values: &[T], window: usize) -> &[T] {
    let start = values.len().saturating_sub(window);
    &values[start..]
}

/// Running history the simulator consults when deriving a day's features
#[derive(Debug, Clone, Default)]
pub struct RollingHistory {
    workloads: Vec<f64>,
    high_intensity: Vec<bool>,
    sorted_fatigue: Vec<f64>,
}

/// Rolling features for the most recently pushed day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingSnapshot {
    pub acute: f64,
    pub chronic: f64,
    pub acwr: f64,
    pub high_intensity_streak: u32,
    pub fatigue_reference: f64,
}

impl RollingHistory {
    pub fn with_capacity(days: usize) -> Self {
        Self {
            workloads: Vec::with_capacity(days),
            high_intensity: Vec::with_capacity(days),
            sorted_fatigue: Vec::with_capacity(days),
        }
    }

    /// Record a day and return the features as of that day
    pub fn push(
        &mut self,
        workload: f64,
        high_intensity: bool,
        fatigue: f64,
        fatigue_quantile: f64,
    ) -> RollingSnapshot {
        self.workloads.push(workload);
        self.high_intensity.push(high_intensity);
        let idx = self.sorted_fatigue.partition_point(|&f| f < fatigue);
        self.sorted_fatigue.insert(idx, fatigue);

        let acute = trailing_mean(&self.workloads, ACUTE_WINDOW_DAYS);
        let chronic = trailing_mean(&self.workloads, CHRONIC_WINDOW_DAYS);

        RollingSnapshot {
            acute,
            chronic,
            acwr: acwr(acute, chronic),
            high_intensity_streak: trailing_count(&self.high_intensity, STREAK_WINDOW_DAYS),
            fatigue_reference: quantile_sorted(&self.sorted_fatigue, fatigue_quantile)
                .unwrap_or(fatigue),
        }
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}
