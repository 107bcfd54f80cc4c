//! Derived statistics over finished record sequences. Nothing here feeds
//! back into the engine; it consumes logs the way the offline analysis
//! scripts consume result CSVs.

use super::TimestepRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mean total throughput over the run.
pub fn efficiency(records: &[TimestepRecord]) -> f64 {
    mean(records.iter().map(|r| r.total_throughput))
}

/// Mean total loss over the run.
pub fn mean_total_loss(records: &[TimestepRecord]) -> f64 {
    mean(records.iter().map(|r| r.total_loss))
}

/// Oscillation: mean over paths of the per-path load standard deviation
/// (sample std, matching the reference analysis). The stability proxy.
pub fn oscillation(records: &[TimestepRecord]) -> f64 {
    let stds = per_path_load_std(records);
    if stds.is_empty() {
        return 0.0;
    }
    mean(stds.iter().map(|(_, s)| *s))
}

/// Standard deviation of each path's load time series.
pub fn per_path_load_std(records: &[TimestepRecord]) -> Vec<(String, f64)> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .path_loads
        .iter()
        .map(|(id, _)| {
            let series: Vec<f64> = records
                .iter()
                .map(|r| {
                    r.path_loads
                        .iter()
                        .find(|(p, _)| p == id)
                        .map(|(_, v)| *v)
                        .unwrap_or(0.0)
                })
                .collect();
            (id.clone(), sample_std(&series))
        })
        .collect()
}

/// Jain's fairness index over the per-timestep total load series, as the
/// reference analysis computes it: (Σx)² / (n · Σx²), 0 when degenerate.
pub fn jain_fairness(records: &[TimestepRecord]) -> f64 {
    let totals: Vec<f64> = records
        .iter()
        .map(|r| r.path_loads.iter().map(|(_, v)| v).sum())
        .collect();
    let numerator = totals.iter().sum::<f64>().powi(2);
    let denominator = totals.len() as f64 * totals.iter().map(|x| x * x).sum::<f64>();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// One line of the sweep summary, all scores rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub strategy: String,
    pub agents: u32,
    pub oscillation: f64,
    pub loss: f64,
    pub fairness: f64,
    pub efficiency: f64,
    pub stability: f64,
    pub loss_avoidance: f64,
}

pub fn summarize(records: &[TimestepRecord], strategy: &str, agents: u32) -> SummaryRow {
    let osc = oscillation(records);
    let loss = mean_total_loss(records);
    SummaryRow {
        strategy: strategy.to_string(),
        agents,
        oscillation: round4(osc),
        loss: round4(loss),
        fairness: round4(jain_fairness(records)),
        efficiency: round4(efficiency(records)),
        // high oscillation maps to low stability, bounded to (0, 1]
        stability: round4(1.0 / (1.0 + osc)),
        // 1 when lossless, shrinking as mean loss grows
        loss_avoidance: round4(1.0 / (1.0 + loss)),
    }
}

pub fn write_summary_csv(rows: &[SummaryRow], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn sample_std(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    let var = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    var.sqrt()
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
