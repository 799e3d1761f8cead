//! Benchmark Record extraction.
//!
//! The benchmark dataset carries a single reference row (SPY by default).
//! Its per-timeframe returns are individually optional: an unresolved or
//! unparsable column disables RS for that timeframe only, while a missing
//! benchmark row is fatal because no relative ranking is possible without a
//! reference.

use crate::columns::resolve_column;
use crate::error::{Result, ScreenError};
use crate::fields::Timeframe;
use crate::normalize::{normalize_ticker, percent_values};
use polars::prelude::*;

/// The reference security all relative returns are measured against.
#[derive(Debug, Clone)]
pub struct Benchmark {
    symbol: String,
    returns: [Option<f64>; Timeframe::RANKED.len()],
}

impl Benchmark {
    /// Extract the benchmark record for `symbol` from a raw snapshot.
    ///
    /// The row is matched on normalized tickers. Returns
    /// [`ScreenError::BenchmarkNotFound`] when no row matches.
    pub fn from_frame(raw: &DataFrame, symbol: &str) -> Result<Self> {
        if raw.height() == 0 {
            return Err(ScreenError::EmptyDataset("benchmark".to_string()));
        }

        let target = normalize_ticker(symbol);
        let ticker_col = resolve_column(raw, &["Symbol"])
            .ok_or_else(|| ScreenError::MissingTickerColumn("benchmark".to_string()))?;
        let tickers = raw.column(&ticker_col)?.cast(&DataType::String)?;
        let row = tickers
            .str()?
            .into_iter()
            .position(|t| t.is_some_and(|t| normalize_ticker(t) == target))
            .ok_or_else(|| ScreenError::BenchmarkNotFound(target.clone()))?;

        let mut returns = [None; Timeframe::RANKED.len()];
        for (i, tf) in Timeframe::RANKED.iter().enumerate() {
            returns[i] = match resolve_column(raw, tf.candidates()) {
                Some(col) => percent_values(raw.column(&col)?, tf.return_column()).get(row),
                None => None,
            };
            if returns[i].is_none() {
                log::warn!("benchmark return for {tf} unavailable; RS {tf} disabled");
            }
        }

        Ok(Self {
            symbol: target,
            returns,
        })
    }

    /// Normalized benchmark ticker.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Fractional benchmark return for a ranked timeframe, if available.
    /// Always `None` for 1D, which is never ranked.
    pub fn period_return(&self, tf: Timeframe) -> Option<f64> {
        tf.ranked_index().and_then(|i| self.returns[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::df;

    fn raw_frame() -> DataFrame {
        df! {
            "Symbol" => ["QQQ", " spy "],
            "Performance % 1 month" => ["3.0%", "2.5%"],
            "Performance % 1 year" => [18.0, 22.0],
        }
        .unwrap()
    }

    #[test]
    fn test_row_matched_on_normalized_ticker() {
        let bench = Benchmark::from_frame(&raw_frame(), "SPY").unwrap();
        assert_eq!(bench.symbol(), "SPY");
        assert_relative_eq!(bench.period_return(Timeframe::OneMonth).unwrap(), 0.025);
        assert_relative_eq!(bench.period_return(Timeframe::OneYear).unwrap(), 0.22);
    }

    #[test]
    fn test_unresolved_timeframe_degrades() {
        let bench = Benchmark::from_frame(&raw_frame(), "SPY").unwrap();
        assert!(bench.period_return(Timeframe::OneWeek).is_none());
        assert!(bench.period_return(Timeframe::ThreeMonths).is_none());
        // other timeframes stay intact
        assert!(bench.period_return(Timeframe::OneMonth).is_some());
    }

    #[test]
    fn test_one_day_never_ranked() {
        let bench = Benchmark::from_frame(&raw_frame(), "SPY").unwrap();
        assert!(bench.period_return(Timeframe::OneDay).is_none());
    }

    #[test]
    fn test_missing_row_is_fatal() {
        let err = Benchmark::from_frame(&raw_frame(), "IWM").unwrap_err();
        assert!(matches!(err, ScreenError::BenchmarkNotFound(s) if s == "IWM"));
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let df = df! { "Symbol" => Vec::<String>::new() }.unwrap();
        let err = Benchmark::from_frame(&df, "SPY").unwrap_err();
        assert!(matches!(err, ScreenError::EmptyDataset(_)));
    }
}
