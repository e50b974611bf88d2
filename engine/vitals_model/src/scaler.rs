use serde::{Deserialize, Serialize};
use vitals_core::{FeatureVector, N_FEATURES};

/// Per-feature standardization to zero mean and unit variance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: FeatureVector,
    pub std: FeatureVector,
}

impl StandardScaler {
    /// Population mean and standard deviation of each column.
    pub fn fit(rows: &[FeatureVector]) -> Self {
        let mut mean = [0.0; N_FEATURES];
        let mut std = [0.0; N_FEATURES];
        if rows.is_empty() {
            return Self { mean, std };
        }

        let n = rows.len() as f64;
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        for row in rows {
            for ((s, x), m) in std.iter_mut().zip(row).zip(&mean) {
                let d = x - m;
                *s += d * d;
            }
        }
        for s in std.iter_mut() {
            *s = (*s / n).sqrt();
        }

        Self { mean, std }
    }

    /// Constant columns map to zero.
    pub fn transform(&self, x: &FeatureVector) -> FeatureVector {
        let mut z = [0.0; N_FEATURES];
        for (i, out) in z.iter_mut().enumerate() {
            *out = if self.std[i] == 0.0 {
                0.0
            } else {
                (x[i] - self.mean[i]) / self.std[i]
            };
        }
        z
    }
}
