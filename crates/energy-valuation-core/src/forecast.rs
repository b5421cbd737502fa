use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EnergyValuationError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::EnergyValuationResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for the in-sample price trend fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInput {
    /// Year numbers, the sole explanatory variable
    pub years: Vec<u32>,
    /// Simulated price per year, same length and order
    pub prices: Vec<Money>,
    /// Number of bagged trees in the ensemble (minimum 1).
    #[serde(default = "default_num_trees")]
    pub num_trees: u32,
    /// Maximum tree depth. Effectively unbounded for annual horizons.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Optional seed for reproducible bootstrap resampling.
    pub seed: Option<u64>,
}

fn default_num_trees() -> u32 {
    100
}

fn default_max_depth() -> u32 {
    16
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Fitted ordinary-least-squares line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination on the fitted sample
    pub r_squared: f64,
}

/// In-sample predictions from both regressors, same length as the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOutput {
    /// OLS line evaluated at each input year
    pub linear: Vec<Money>,
    /// Bagged-tree ensemble evaluated at each input year
    pub ensemble: Vec<Money>,
    pub linear_fit: LinearFit,
    pub num_trees: u32,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Fit a linear model and a bagged-tree ensemble against (year, price)
/// pairs and predict the price at every input year.
///
/// Both models are fitted and evaluated on the same observations: the
/// curves are descriptive trend fits for side-by-side comparison, not
/// held-out forecasts. No model state survives the call; every invocation
/// refits from scratch.
pub fn fit_and_predict(
    input: &ForecastInput,
) -> EnergyValuationResult<ComputationOutput<ForecastOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let xs: Vec<f64> = input.years.iter().map(|&y| y as f64).collect();
    let ys = &input.prices;

    let linear_fit = fit_ols(&xs, ys)?;
    let linear: Vec<Money> = xs
        .iter()
        .map(|&x| linear_fit.intercept + linear_fit.slope * x)
        .collect();

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let ensemble = fit_bagged_trees(
        &xs,
        ys,
        input.num_trees as usize,
        input.max_depth as usize,
        &mut rng,
    );

    let output = ForecastOutput {
        linear,
        ensemble,
        linear_fit,
        num_trees: input.num_trees,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Price Trend Regression (OLS + Bagged Trees)",
        &serde_json::json!({
            "num_observations": input.years.len(),
            "num_trees": input.num_trees,
            "max_depth": input.max_depth,
            "seed": input.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Fit slope and intercept by minimizing squared residuals.
fn fit_ols(xs: &[f64], ys: &[Money]) -> EnergyValuationResult<LinearFit> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut ss_xx = 0.0_f64;
    let mut ss_xy = 0.0_f64;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        ss_xx += (x - mean_x) * (x - mean_x);
        ss_xy += (x - mean_x) * (y - mean_y);
    }

    if ss_xx == 0.0 {
        return Err(EnergyValuationError::FittingError {
            model: "linear".into(),
            reason: "All year values are identical; the slope is undefined".into(),
        });
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0_f64;
    let mut ss_tot = 0.0_f64;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let e = y - (intercept + slope * x);
        ss_res += e * e;
        let d = y - mean_y;
        ss_tot += d * d;
    }
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        // Constant prices: the flat line reproduces them exactly
        1.0
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

// ---------------------------------------------------------------------------
// Bagged regression trees
// ---------------------------------------------------------------------------

/// A binary regression tree over the single year feature.
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, x: f64) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                threshold,
                left,
                right,
            } => {
                if x <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

/// Fit `num_trees` trees, each on a bootstrap resample of the data, and
/// average their predictions at every input year.
fn fit_bagged_trees(
    xs: &[f64],
    ys: &[Money],
    num_trees: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Vec<Money> {
    let n = xs.len();
    let mut totals = vec![0.0_f64; n];

    for _ in 0..num_trees {
        let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        let tree = grow_tree(xs, ys, &sample, 0, max_depth);
        for (i, &x) in xs.iter().enumerate() {
            totals[i] += tree.predict(x);
        }
    }

    totals.iter().map(|t| t / num_trees as f64).collect()
}

/// Recursively split on the variance-minimizing year threshold.
fn grow_tree(
    xs: &[f64],
    ys: &[Money],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
) -> TreeNode {
    let mean = node_mean(ys, indices);

    if depth >= max_depth || indices.len() < 2 {
        return TreeNode::Leaf { value: mean };
    }

    let Some(threshold) = best_split(xs, ys, indices) else {
        return TreeNode::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
        indices.iter().copied().partition(|&i| xs[i] <= threshold);

    TreeNode::Split {
        threshold,
        left: Box::new(grow_tree(xs, ys, &left_idx, depth + 1, max_depth)),
        right: Box::new(grow_tree(xs, ys, &right_idx, depth + 1, max_depth)),
    }
}

/// Candidate thresholds are midpoints between adjacent distinct year
/// values present in the node. Returns None when the node holds a single
/// distinct value and cannot split.
fn best_split(xs: &[f64], ys: &[Money], indices: &[usize]) -> Option<f64> {
    let mut distinct: Vec<f64> = indices.iter().map(|&i| xs[i]).collect();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();

    if distinct.len() < 2 {
        return None;
    }

    let mut best: Option<(f64, f64)> = None; // (sse, threshold)
    for pair in distinct.windows(2) {
        let threshold = (pair[0] + pair[1]) / 2.0;
        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.iter().copied().partition(|&i| xs[i] <= threshold);
        let sse = node_sse(ys, &left) + node_sse(ys, &right);
        match best {
            Some((best_sse, _)) if sse >= best_sse => {}
            _ => best = Some((sse, threshold)),
        }
    }

    best.map(|(_, threshold)| threshold)
}

fn node_mean(ys: &[Money], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| ys[i]).sum::<f64>() / indices.len() as f64
}

fn node_sse(ys: &[Money], indices: &[usize]) -> f64 {
    let mean = node_mean(ys, indices);
    indices.iter().map(|&i| (ys[i] - mean) * (ys[i] - mean)).sum()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &ForecastInput) -> EnergyValuationResult<()> {
    if input.years.len() != input.prices.len() {
        return Err(EnergyValuationError::InvalidParameter {
            field: "prices".into(),
            reason: format!(
                "Price series length ({}) does not match year series length ({})",
                input.prices.len(),
                input.years.len()
            ),
        });
    }

    let mut distinct = input.years.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(EnergyValuationError::FittingError {
            model: "linear".into(),
            reason: format!(
                "At least 2 distinct year values are required, got {}",
                distinct.len()
            ),
        });
    }

    if input.num_trees < 1 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "num_trees".into(),
            reason: "Ensemble needs at least 1 tree".into(),
        });
    }

    if input.max_depth < 1 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "max_depth".into(),
            reason: "Trees need at least depth 1".into(),
        });
    }

    if input.prices.iter().any(|p| !p.is_finite()) {
        return Err(EnergyValuationError::InvalidParameter {
            field: "prices".into(),
            reason: "Prices must be finite numbers".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
