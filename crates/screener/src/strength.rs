//! Relative Strength engine.
//!
//! Turns raw period returns into benchmark-relative returns and 1-99
//! percentile scores. Scores are cross-sectional: each depends on the whole
//! universe, so adding or removing one security can move every other score.
//! A reload of the input data therefore recomputes everything; no
//! incremental path exists.

use crate::benchmark::Benchmark;
use crate::error::Result;
use crate::fields::Timeframe;
use polars::prelude::*;
use std::cmp::Ordering;

/// Lowest possible RS score.
pub const RS_MIN: f64 = 1.0;
/// Highest possible RS score.
pub const RS_MAX: f64 = 99.0;

/// Compounding-consistent excess return of a security over the benchmark:
/// `(1 + r) / (1 + b) - 1`.
///
/// Exact regardless of the sign or magnitude of the benchmark move, unlike a
/// plain subtraction. Zero exactly when the security matched the benchmark.
pub fn relative_return(r: f64, b: f64) -> f64 {
    (1.0 + r) / (1.0 + b) - 1.0
}

/// Attach relative-return (`rr_*`) and RS score (`rs_*`) columns for every
/// ranked timeframe.
///
/// A timeframe whose benchmark return is unavailable yields all-null columns
/// for that timeframe only; the others are unaffected.
pub fn with_relative_strength(frame: DataFrame, benchmark: &Benchmark) -> Result<DataFrame> {
    let mut frame = frame;

    for tf in Timeframe::RANKED {
        let raw = frame.column(tf.return_column())?.f64()?;
        let rel = match benchmark.period_return(tf) {
            Some(b) => {
                let values = raw
                    .into_iter()
                    .map(|r| r.map(|r| relative_return(r, b)))
                    .collect::<Vec<Option<f64>>>();
                Float64Chunked::from_iter_options(tf.rel_column().into(), values.into_iter())
            }
            None => Float64Chunked::full_null(tf.rel_column().into(), frame.height()),
        };
        let scores = percentile_scores(&rel, tf.rs_column());

        frame.with_column(rel.into_column())?;
        frame.with_column(scores.into_column())?;
    }

    Ok(frame)
}

/// Rank values ascending into 1-99 integral percentile scores.
///
/// Ranking runs over the non-missing values only; missing inputs keep a
/// missing score rather than a rank. Ties take the average rank of the tied
/// block, so all peers sharing a raw value receive the same score. The
/// percentile `rank / n` maps to `round(pct * 99)` clamped to `[1, 99]`.
pub fn percentile_scores(values: &Float64Chunked, name: &str) -> Float64Chunked {
    let raw: Vec<Option<f64>> = values.into_iter().collect();

    let mut present: Vec<(usize, f64)> = raw
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i, v)))
        .collect();
    present.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let n = present.len();
    let mut scores: Vec<Option<f64>> = vec![None; raw.len()];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && present[end + 1].1 == present[start].1 {
            end += 1;
        }
        // 1-based average rank of the tied block
        let rank = (start + end + 2) as f64 / 2.0;
        let score = (rank / n as f64 * RS_MAX).round().clamp(RS_MIN, RS_MAX);
        for &(idx, _) in &present[start..=end] {
            scores[idx] = Some(score);
        }
        start = end + 1;
    }

    Float64Chunked::from_iter_options(name.into(), scores.into_iter())
}
