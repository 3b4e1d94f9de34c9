use crate::model::Series;
use crate::stats::compute_mean;
use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionModel {
    #[default]
    Additive,
    Multiplicative,
}

/// Classical decomposition of a regularly sampled series.
///
/// `trend` and `resid` are `None` where the centred moving average has no full window.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub timestamps: Vec<NaiveDateTime>,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<Option<f64>>,
}

/// Split `series` into trend, seasonal and residual components.
///
/// Readings are taken as equally spaced. At least two full periods are required.
pub fn decompose(
    series: &Series,
    model: DecompositionModel,
    period: usize,
) -> Result<Decomposition> {
    if period < 2 {
        bail!("period must be at least 2, but is {period}");
    }
    let observed = series.values();
    let n_vals = observed.len();
    if n_vals < 2 * period {
        bail!("decomposition needs at least {} readings, but has {n_vals}", 2 * period);
    }
    if model == DecompositionModel::Multiplicative && observed.iter().any(|&val| val <= 0.0) {
        bail!("multiplicative decomposition needs strictly positive values");
    }

    let trend = centred_moving_average(&observed, period);

    let detrended: Vec<Option<f64>> = observed
        .iter()
        .zip(&trend)
        .map(|(&obs, tr)| {
            tr.map(|tr| match model {
                DecompositionModel::Additive => obs - tr,
                DecompositionModel::Multiplicative => obs / tr,
            })
        })
        .collect();

    let mut period_avgs: Vec<f64> = (0..period)
        .map(|phase| {
            let vals: Vec<f64> = detrended
                .iter()
                .skip(phase)
                .step_by(period)
                .flatten()
                .copied()
                .collect();
            compute_mean(&vals)
        })
        .collect();

    // Centre the seasonal pattern so it carries no level of its own.
    let avg_mean = compute_mean(&period_avgs);
    for avg in &mut period_avgs {
        match model {
            DecompositionModel::Additive => *avg -= avg_mean,
            DecompositionModel::Multiplicative => *avg /= avg_mean,
        }
    }

    let seasonal: Vec<f64> = (0..n_vals).map(|t| period_avgs[t % period]).collect();

    let resid = observed
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((&obs, tr), &sea)| {
            tr.map(|tr| match model {
                DecompositionModel::Additive => obs - tr - sea,
                DecompositionModel::Multiplicative => obs / (tr * sea),
            })
        })
        .collect();

    Ok(Decomposition {
        timestamps: series.iter().map(|r| r.timestamp).collect(),
        observed,
        trend,
        seasonal,
        resid,
    })
}

/// Centred moving average over one period.
///
/// Even periods use a `2 x period` average: `period + 1` points with half weight at both ends.
fn centred_moving_average(vals: &[f64], period: usize) -> Vec<Option<f64>> {
    let half = period / 2;
    let n_vals = vals.len();
    (0..n_vals)
        .map(|t| {
            if t < half || t + half >= n_vals {
                return None;
            }
            let window = &vals[t - half..=t + half];
            let sum = if period % 2 == 0 {
                let inner: f64 = window[1..period].iter().sum();
                inner + 0.5 * (window[0] + window[period])
            } else {
                window.iter().sum()
            };
            Some(sum / period as f64)
        })
        .collect()
}
