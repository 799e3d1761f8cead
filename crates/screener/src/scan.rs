//! Scan evaluation over the ranked universe.
//!
//! A [`ScanConfig`] is an immutable snapshot of every active parameter for
//! one evaluation; the interaction layer rebuilds it on each change and the
//! evaluator never mutates it. Evaluation is a pure function of
//! (frame, config): derive the RS gap, apply the mode's predicate
//! conjunction, stable-sort, truncate.
//!
//! Missing values have one rule everywhere: a comparison against null is
//! false, so a row with a missing field never passes an active predicate.
//! The only exception is an auxiliary field whose column is *entirely*
//! missing from the source; a predicate on such a field is skipped as a
//! no-op instead of wiping the result set.

use crate::error::{Result, ScreenError};
use crate::fields::Timeframe;
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// The five mutually exclusive scan modes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanMode {
    /// Primary-timeframe RS at or above the threshold
    #[default]
    #[display("Primary timeframe only")]
    Primary,
    /// Every ranked timeframe's RS at or above the threshold
    #[display("All timeframes >= threshold")]
    AllTimeframes,
    /// Short-horizon RS running ahead of long-horizon RS
    #[display("Accelerating")]
    Accelerating,
    /// Short-horizon RS falling behind long-horizon RS
    #[display("Decelerating")]
    Decelerating,
    /// Threshold plus an arbitrary conjunction of custom predicates
    #[display("Custom")]
    Custom,
}

/// Result ordering for accelerating/decelerating scans.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortPreference {
    /// Order by the size of the RS gap
    #[default]
    #[display("RS Gap (shift)")]
    GapShift,
    /// Order by the primary timeframe's RS
    #[display("Primary timeframe")]
    PrimaryTimeframe,
}

/// Optional predicates for custom scans.
///
/// A numeric threshold of zero, an unset sector, or an unchecked flag means
/// "ignore this filter", so zero can never be an active threshold.
/// Percent-like thresholds are fractional, matching the canonical columns
/// they compare against (`0.15` = 15%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFilters {
    /// Minimum market capitalization
    pub min_mkt_cap: f64,
    /// Minimum free float
    pub min_free_float: f64,
    /// Minimum one-day volume
    pub min_volume: f64,
    /// Minimum 30-day average volume
    pub min_avg_vol_30d: f64,
    /// Minimum one-day volume change (fraction)
    pub min_vol_chg_1d: f64,
    /// Minimum one-week volume change (fraction)
    pub min_vol_chg_1w: f64,
    /// Minimum one-month volume change (fraction)
    pub min_vol_chg_1m: f64,
    /// Minimum one-day relative volume
    pub min_rel_vol_1d: f64,
    /// Minimum one-week relative volume
    pub min_rel_vol_1w: f64,
    /// Minimum one-month relative volume
    pub min_rel_vol_1m: f64,
    /// Minimum quarterly YoY EPS growth (fraction)
    pub min_eps_qtr_yoy: f64,
    /// Minimum annual YoY EPS growth (fraction)
    pub min_eps_ann_yoy: f64,
    /// Minimum quarterly YoY revenue growth (fraction)
    pub min_rev_qtr_yoy: f64,
    /// Minimum annual YoY revenue growth (fraction)
    pub min_rev_ann_yoy: f64,
    /// Minimum trailing-12-month return on equity (fraction)
    pub min_roe_ttm: f64,
    /// Minimum trailing-12-month pre-tax margin (fraction)
    pub min_pretax_margin_ttm: f64,
    /// Maximum distance below the 52-week high (fraction, `0.15` = within 15%)
    pub max_from_52w_high: f64,
    /// Maximum distance below the all-time high (fraction)
    pub max_from_ath: f64,
    /// Minimum average daily range (fraction)
    pub min_adr: f64,
    /// Minimum average true range (fraction)
    pub min_atr: f64,
    /// Exact sector match; `None` admits every sector
    pub sector: Option<String>,
    /// Require price above the 200-day moving average
    pub price_above_200: bool,
    /// Require price above the 50-day moving average
    pub price_above_50: bool,
    /// Require price above the 20-day moving average
    pub price_above_20: bool,
    /// Require price above the 10-day moving average
    pub price_above_10: bool,
    /// Trend template: price above the 200- and 50-day moving averages,
    /// 50-day above 200-day
    pub trend_template: bool,
}

impl CustomFilters {
    /// Whether every predicate sits at its inert default.
    pub fn is_inert(&self) -> bool {
        *self == Self::default()
    }

    fn min_thresholds(&self) -> [(&'static str, f64); 18] {
        [
            ("mkt_cap", self.min_mkt_cap),
            ("free_float", self.min_free_float),
            ("volume", self.min_volume),
            ("avg_vol_30d", self.min_avg_vol_30d),
            ("vol_chg_1d", self.min_vol_chg_1d),
            ("vol_chg_1w", self.min_vol_chg_1w),
            ("vol_chg_1m", self.min_vol_chg_1m),
            ("rel_vol_1d", self.min_rel_vol_1d),
            ("rel_vol_1w", self.min_rel_vol_1w),
            ("rel_vol_1m", self.min_rel_vol_1m),
            ("eps_qtr_yoy", self.min_eps_qtr_yoy),
            ("eps_ann_yoy", self.min_eps_ann_yoy),
            ("rev_qtr_yoy", self.min_rev_qtr_yoy),
            ("rev_ann_yoy", self.min_rev_ann_yoy),
            ("roe_ttm", self.min_roe_ttm),
            ("pretax_margin_ttm", self.min_pretax_margin_ttm),
            ("adr_pct", self.min_adr),
            ("atr_pct", self.min_atr),
        ]
    }
}

/// Immutable snapshot of one scan's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Scan mode
    pub mode: ScanMode,
    /// Primary ranked timeframe (drives the threshold and default sort)
    pub primary: Timeframe,
    /// Minimum primary RS score, 1-99
    pub min_rs: u8,
    /// Minimum RS gap magnitude for accelerating/decelerating scans
    pub min_gap: f64,
    /// Require a monotonic RS chain across timeframes (accel/decel only)
    pub smooth_chain: bool,
    /// Result ordering for accelerating/decelerating scans
    pub sort: SortPreference,
    /// Custom-mode predicate set
    pub custom: CustomFilters,
    /// Result cap applied after sorting
    pub max_results: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Primary,
            primary: Timeframe::OneMonth,
            min_rs: 70,
            min_gap: 15.0,
            smooth_chain: true,
            sort: SortPreference::GapShift,
            custom: CustomFilters::default(),
            max_results: 200,
        }
    }
}

impl ScanConfig {
    /// "Super Performers" preset: strong RS plus growth and trend
    /// requirements.
    pub fn super_performers() -> Self {
        Self {
            mode: ScanMode::Custom,
            min_rs: 87,
            custom: CustomFilters {
                min_rev_qtr_yoy: 0.15,
                min_rev_ann_yoy: 0.15,
                min_eps_qtr_yoy: 0.20,
                min_eps_ann_yoy: 0.25,
                price_above_200: true,
                price_above_50: true,
                ..CustomFilters::default()
            },
            ..Self::default()
        }
    }
}

/// One evaluated scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Matching rows, sorted and truncated to the configured cap
    pub frame: DataFrame,
    /// Match count before truncation
    pub matches: usize,
    /// Size of the scanned universe
    pub universe_size: usize,
}

/// Evaluate a scan over the RS-augmented universe frame.
///
/// The frame must carry the canonical `rs_*` score columns; the RS gap
/// (`rs_1m - rs_1y`) is derived here on every evaluation. Sorting is stable
/// with nulls last, so rows tied on every sort key keep the frame's
/// ticker-ascending base order and results reproduce across runs.
/// Truncation to `max_results` happens after sorting and never affects which
/// rows match.
pub fn run_scan(universe: &DataFrame, config: &ScanConfig) -> Result<ScanResult> {
    if !(1..=99).contains(&config.min_rs) {
        return Err(ScreenError::InvalidThreshold(config.min_rs));
    }

    let threshold = f64::from(config.min_rs);
    let primary_rs = config.primary.rs_column();
    let gap = col(Timeframe::OneMonth.rs_column()) - col(Timeframe::OneYear.rs_column());

    let mut predicate = at_least(col(primary_rs), threshold);
    match config.mode {
        ScanMode::Primary => {}
        ScanMode::AllTimeframes => {
            for tf in Timeframe::RANKED {
                predicate = predicate.and(at_least(col(tf.rs_column()), threshold));
            }
        }
        ScanMode::Accelerating => {
            predicate = predicate.and(at_least(col("rs_gap"), config.min_gap));
            if config.smooth_chain {
                predicate = predicate.and(rs_chain(&[
                    Timeframe::OneYear,
                    Timeframe::SixMonths,
                    Timeframe::ThreeMonths,
                    Timeframe::OneMonth,
                ]));
            }
        }
        ScanMode::Decelerating => {
            predicate = predicate.and(
                col("rs_gap")
                    .lt_eq(lit(-config.min_gap))
                    .fill_null(lit(false)),
            );
            if config.smooth_chain {
                predicate = predicate.and(rs_chain(&[
                    Timeframe::OneMonth,
                    Timeframe::ThreeMonths,
                    Timeframe::SixMonths,
                    Timeframe::OneYear,
                ]));
            }
        }
        ScanMode::Custom => {
            predicate = custom_predicate(universe, &config.custom, predicate);
        }
    }

    let (by, descending) = sort_keys(config);
    let sorted = universe
        .clone()
        .lazy()
        .with_column(gap.alias("rs_gap"))
        .filter(predicate)
        .sort(
            by,
            SortMultipleOptions::default()
                .with_order_descending_multi(descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let matches = sorted.height();
    Ok(ScanResult {
        frame: sorted.head(Some(config.max_results)),
        matches,
        universe_size: universe.height(),
    })
}

/// `value >= threshold`, with missing values failing.
fn at_least(value: Expr, threshold: f64) -> Expr {
    value.gt_eq(lit(threshold)).fill_null(lit(false))
}

/// Non-decreasing RS across `order`; any missing link fails.
fn rs_chain(order: &[Timeframe; 4]) -> Expr {
    let mut chain = lit(true);
    for pair in order.windows(2) {
        chain = chain.and(
            col(pair[0].rs_column())
                .lt_eq(col(pair[1].rs_column()))
                .fill_null(lit(false)),
        );
    }
    chain
}

fn sort_keys(config: &ScanConfig) -> (Vec<&'static str>, Vec<bool>) {
    match (config.mode, config.sort) {
        (ScanMode::Accelerating, SortPreference::GapShift) => (
            vec!["rs_gap", Timeframe::OneMonth.rs_column()],
            vec![true, true],
        ),
        (ScanMode::Decelerating, SortPreference::GapShift) => (
            vec!["rs_gap", Timeframe::OneYear.rs_column()],
            vec![false, true],
        ),
        _ => {
            let primary = config.primary.rs_column();
            let tie = Timeframe::OneYear.rs_column();
            if primary == tie {
                (vec![primary], vec![true])
            } else {
                (vec![primary, tie], vec![true, true])
            }
        }
    }
}

fn custom_predicate(universe: &DataFrame, filters: &CustomFilters, base: Expr) -> Expr {
    let mut predicate = base;

    for (column, threshold) in filters.min_thresholds() {
        if threshold <= 0.0 {
            continue;
        }
        if field_available(universe, column) {
            predicate = predicate.and(at_least(col(column), threshold));
        } else {
            log::warn!("filter on '{column}' skipped: field absent from the source");
        }
    }

    for (column, max_distance) in [
        ("pct_from_52w_high", filters.max_from_52w_high),
        ("pct_from_ath", filters.max_from_ath),
    ] {
        if max_distance <= 0.0 {
            continue;
        }
        if field_available(universe, column) {
            predicate = predicate.and(at_least(col(column), -max_distance));
        } else {
            log::warn!("filter on '{column}' skipped: field absent from the source");
        }
    }

    if let Some(sector) = &filters.sector {
        if field_available(universe, "sector") {
            predicate = predicate.and(col("sector").eq(lit(sector.clone())).fill_null(lit(false)));
        } else {
            log::warn!("sector filter skipped: field absent from the source");
        }
    }

    // trend flags are computed columns and always present
    if filters.price_above_200 {
        predicate = predicate.and(col("price_above_200"));
    }
    if filters.price_above_50 {
        predicate = predicate.and(col("price_above_50"));
    }
    if filters.price_above_20 {
        predicate = predicate.and(col("price_above_20"));
    }
    if filters.price_above_10 {
        predicate = predicate.and(col("price_above_10"));
    }
    if filters.trend_template {
        predicate = predicate
            .and(col("price_above_200"))
            .and(col("price_above_50"))
            .and(col("sma50_above_200"));
    }

    predicate
}

/// An auxiliary field is available when its column exists and holds at least
/// one value. An entirely-missing field turns its predicates into no-ops.
fn field_available(frame: &DataFrame, column: &str) -> bool {
    frame
        .column(column)
        .map(|c| c.null_count() < c.len())
        .unwrap_or(false)
}
