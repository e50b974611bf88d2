use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use vitals_core::{FeatureVector, N_FEATURES};

use crate::error::ModelError;
use crate::scaler::StandardScaler;

/// Intercept plus one coefficient per feature
const DIM: usize = N_FEATURES + 1;

/// Sufficient-decrease constant for the backtracking line search
const ARMIJO: f64 = 1e-4;
const MIN_STEP: f64 = 1e-12;

/// Solver settings for [`LogisticRegression::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Inverse L2 regularisation strength; smaller means stronger penalty
    pub c: f64,
    /// Upper bound on Newton steps
    pub max_iter: usize,
    /// Stop once every gradient component is below this
    pub tol: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-8,
        }
    }
}

/// Binary logistic regression over a fixed-width feature vector.
///
/// P(y=1|x) = 1 / (1 + exp(-(w·x + b)))
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: FeatureVector,
    pub intercept: f64,
}

impl LogisticRegression {
    /// Minimise `||w||² / 2 + C · Σ logloss` over raw features. The intercept
    /// is not penalised.
    ///
    /// Solved by damped Newton steps on standardized columns, with the
    /// penalty rescaled so the optimum is the raw-feature one.
    pub fn fit(xs: &[FeatureVector], ys: &[bool], params: &FitParams) -> Result<Self, ModelError> {
        if xs.len() != ys.len() {
            return Err(ModelError::LengthMismatch {
                rows: xs.len(),
                labels: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if let Some(row) = xs.iter().position(|x| x.iter().any(|v| !v.is_finite())) {
            return Err(ModelError::NonFiniteFeature { row });
        }
        if ys.iter().all(|&y| y) || ys.iter().all(|&y| !y) {
            return Err(ModelError::SingleClass);
        }
        if params.c.partial_cmp(&0.0) != Some(Ordering::Greater)
            || params.tol.partial_cmp(&0.0) != Some(Ordering::Greater)
            || params.max_iter == 0
        {
            return Err(ModelError::InvalidParameter(format!(
                "c={}, tol={}, max_iter={}",
                params.c, params.tol, params.max_iter
            )));
        }

        let scaler = StandardScaler::fit(xs);
        let objective = Objective::new(&scaler, xs, ys, params.c);

        let mut theta = [0.0; DIM];
        let mut converged = false;
        for iteration in 0..params.max_iter {
            let (grad, hessian) = objective.gradient_and_hessian(&theta);
            if grad.iter().all(|g| g.abs() < params.tol) {
                log::debug!("logistic regression converged after {} Newton steps", iteration);
                converged = true;
                break;
            }
            let direction = solve(hessian, grad).ok_or(ModelError::SingularHessian)?;

            let current = objective.value(&theta);
            let decrease: f64 = grad.iter().zip(&direction).map(|(g, d)| g * d).sum();
            let mut step = 1.0;
            let mut next = advance(&theta, &direction, step);
            while objective.value(&next) > current - ARMIJO * step * decrease && step > MIN_STEP {
                step *= 0.5;
                next = advance(&theta, &direction, step);
            }
            theta = next;
        }
        if !converged {
            log::warn!(
                "logistic regression stopped after {} Newton steps without converging",
                params.max_iter
            );
        }

        Ok(objective.unscale(&theta))
    }

    pub fn decision_function(&self, x: &FeatureVector) -> f64 {
        dot(&self.weights, x) + self.intercept
    }

    /// P(y=1|x)
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        sigmoid(self.decision_function(x))
    }

    pub fn predict(&self, x: &FeatureVector) -> bool {
        self.predict_proba(x) > 0.5
    }
}

/// Penalised log-loss in standardized coordinates.
///
/// `theta[0]` is the intercept, `theta[1..]` the standardized coefficients
/// `v`. The raw weight is `v / std`, so its penalty is `v² / (2·std²)`.
struct Objective<'a> {
    scaler: &'a StandardScaler,
    rows: Vec<[f64; DIM]>,
    targets: Vec<f64>,
    penalty: [f64; DIM],
    c: f64,
}

impl<'a> Objective<'a> {
    fn new(scaler: &'a StandardScaler, xs: &[FeatureVector], ys: &[bool], c: f64) -> Self {
        let rows = xs
            .iter()
            .map(|x| {
                let mut row = [1.0; DIM];
                row[1..].copy_from_slice(&scaler.transform(x));
                row
            })
            .collect();
        let targets = ys.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();

        // Constant columns are all zero after scaling, so any positive
        // penalty pins their coefficient at zero.
        let mut penalty = [0.0; DIM];
        for (p, s) in penalty[1..].iter_mut().zip(&scaler.std) {
            *p = if *s > 0.0 { 1.0 / (s * s) } else { 1.0 };
        }

        Self {
            scaler,
            rows,
            targets,
            penalty,
            c,
        }
    }

    fn value(&self, theta: &[f64; DIM]) -> f64 {
        let loss: f64 = self
            .rows
            .iter()
            .zip(&self.targets)
            .map(|(row, t)| {
                let eta = dot(row, theta);
                softplus(eta) - t * eta
            })
            .sum();
        let reg: f64 = self
            .penalty
            .iter()
            .zip(theta)
            .map(|(p, v)| 0.5 * p * v * v)
            .sum();
        reg + self.c * loss
    }

    fn gradient_and_hessian(&self, theta: &[f64; DIM]) -> ([f64; DIM], [[f64; DIM]; DIM]) {
        let mut grad = [0.0; DIM];
        let mut hessian = [[0.0; DIM]; DIM];
        for (row, t) in self.rows.iter().zip(&self.targets) {
            let p = sigmoid(dot(row, theta));
            let curvature = p * (1.0 - p);
            for a in 0..DIM {
                grad[a] += self.c * (p - t) * row[a];
                for b in 0..DIM {
                    hessian[a][b] += self.c * curvature * row[a] * row[b];
                }
            }
        }
        for a in 0..DIM {
            grad[a] += self.penalty[a] * theta[a];
            hessian[a][a] += self.penalty[a];
        }
        (grad, hessian)
    }

    /// Map standardized coefficients back to raw-feature weights.
    fn unscale(&self, theta: &[f64; DIM]) -> LogisticRegression {
        let mut weights = [0.0; N_FEATURES];
        let mut intercept = theta[0];
        for (j, w) in weights.iter_mut().enumerate() {
            let std = self.scaler.std[j];
            if std > 0.0 {
                *w = theta[j + 1] / std;
                intercept -= *w * self.scaler.mean[j];
            }
        }
        LogisticRegression { weights, intercept }
    }
}

/// Gaussian elimination with partial pivoting. `None` when singular.
fn solve(mut a: [[f64; DIM]; DIM], mut b: [f64; DIM]) -> Option<[f64; DIM]> {
    for col in 0..DIM {
        let pivot = (col..DIM).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < f64::EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..DIM {
            let factor = a[row][col] / a[col][col];
            for k in col..DIM {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; DIM];
    for row in (0..DIM).rev() {
        let tail: f64 = (row + 1..DIM).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

fn advance(theta: &[f64; DIM], direction: &[f64; DIM], step: f64) -> [f64; DIM] {
    let mut next = *theta;
    for (t, d) in next.iter_mut().zip(direction) {
        *t -= step * d;
    }
    next
}

fn dot<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// ln(1 + e^x) without overflow
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}
