//! Short-horizon heart-rate forecasting.
//!
//! A moving average of the latest samples plus a linear slope, projected
//! forward and clamped to a plausible heart-rate band. Deliberately a
//! closed-form heuristic rather than a learned sequence model.

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

/// Fewest samples a forecast accepts
pub const MIN_HISTORY: usize = 5;
/// Samples considered when fitting the trend
pub const FORECAST_WINDOW: usize = 10;
/// Number of future values produced
pub const FORECAST_HORIZON: usize = 10;

pub const HR_FLOOR: f64 = 40.0;
pub const HR_CEILING: f64 = 180.0;

const TREND_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_THRESHOLD {
            Trend::Increasing
        } else if slope < -TREND_THRESHOLD {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

/// Average level and per-step slope over a window of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub average: f64,
    pub slope: f64,
}

impl TrendLine {
    /// Slope is (last - first) / len, zero for fewer than two samples.
    pub fn fit(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                average: 0.0,
                slope: 0.0,
            };
        }
        let n = samples.len() as f64;
        let average = samples.iter().sum::<f64>() / n;
        let slope = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if samples.len() > 1 => (last - first) / n,
            _ => 0.0,
        };
        Self { average, slope }
    }

    pub fn project(&self, steps_ahead: usize) -> f64 {
        self.average + self.slope * steps_ahead as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_hr: [u16; FORECAST_HORIZON],
    pub trend: Trend,
}

/// Extrapolate the next [`FORECAST_HORIZON`] heart-rate values.
///
/// `history` is chronological, most recent last.
pub fn forecast(history: &[f64]) -> Result<ForecastResult, AssessmentError> {
    if history.len() < MIN_HISTORY {
        return Err(AssessmentError::InsufficientHistory {
            len: history.len(),
        });
    }

    let recent = &history[history.len().saturating_sub(FORECAST_WINDOW)..];
    let line = TrendLine::fit(recent);
    log::trace!(
        "trend over {} samples: average={:.2} slope={:.3}",
        recent.len(),
        line.average,
        line.slope
    );

    let mut predicted_hr = [0u16; FORECAST_HORIZON];
    for (i, slot) in predicted_hr.iter_mut().enumerate() {
        *slot = clamp_heart_rate(line.project(i + 1));
    }

    Ok(ForecastResult {
        predicted_hr,
        trend: Trend::from_slope(line.slope),
    })
}

// NaN lands on the ceiling, the same as a min-then-max clamp.
fn clamp_heart_rate(value: f64) -> u16 {
    value.min(HR_CEILING).max(HR_FLOOR).round_ties_even() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn four_samples_are_rejected() {
        let err = forecast(&[70.0, 71.0, 72.0, 73.0]).unwrap_err();
        assert_eq!(err, AssessmentError::InsufficientHistory { len: 4 });
    }

    #[test]
    fn five_identical_samples_are_flat() {
        let result = forecast(&[72.0; 5]).unwrap();
        assert_eq!(result.predicted_hr, [72; FORECAST_HORIZON]);
        assert_eq!(result.trend, Trend::Stable);
    }

    #[test]
    fn rising_history_projects_upward() {
        // average 80, slope (88 - 72) / 5 = 3.2
        let result = forecast(&[72.0, 76.0, 80.0, 84.0, 88.0]).unwrap();
        assert_eq!(
            result.predicted_hr,
            [83, 86, 90, 93, 96, 99, 102, 106, 109, 112]
        );
        assert_eq!(result.trend, Trend::Increasing);
    }

    #[test]
    fn only_the_last_ten_samples_count() {
        let mut history = vec![150.0; 20];
        history.extend([60.0; 10]);
        let result = forecast(&history).unwrap();
        assert_eq!(result.predicted_hr, [60; FORECAST_HORIZON]);
    }

    #[test]
    fn falling_history_is_decreasing() {
        let result = forecast(&[100.0, 97.0, 94.0, 91.0, 88.0]).unwrap();
        assert_eq!(result.trend, Trend::Decreasing);
    }

    #[test]
    fn small_slope_is_stable() {
        // slope (72 - 70) / 5 = 0.4
        let result = forecast(&[70.0, 71.0, 70.0, 71.0, 72.0]).unwrap();
        assert_eq!(result.trend, Trend::Stable);
    }

    #[test]
    fn oscillating_extremes_stay_in_band() {
        let result = forecast(&[40.0, 180.0, 40.0, 180.0, 40.0]).unwrap();
        assert!(result
            .predicted_hr
            .iter()
            .all(|&hr| (40..=180).contains(&hr)));
    }

    #[test]
    fn values_are_clamped_at_both_ends() {
        assert_eq!(forecast(&[300.0; 5]).unwrap().predicted_hr, [180; 10]);
        assert_eq!(forecast(&[10.0; 5]).unwrap().predicted_hr, [40; 10]);
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(clamp_heart_rate(82.5), 82);
        assert_eq!(clamp_heart_rate(83.5), 84);
        assert_eq!(clamp_heart_rate(f64::NAN), 180);
    }

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Trend::Increasing).unwrap(),
            "\"increasing\""
        );
    }
}
