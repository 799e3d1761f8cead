//! Screening session: load once, evaluate many.
//!
//! One [`Screener`] holds the RS-augmented universe for a session. The frame
//! is built eagerly at load time and read-only afterwards; every evaluation
//! takes a fresh [`ScanConfig`] snapshot and runs to completion. Because RS
//! scores are universe-relative, reloading the inputs means building a new
//! `Screener`, never patching an existing one.

use crate::benchmark::Benchmark;
use crate::error::Result;
use crate::normalize::normalize_ticker;
use crate::scan::{ScanConfig, ScanResult, run_scan};
use crate::strength::with_relative_strength;
use crate::universe::build_universe;
use polars::prelude::*;

/// Maximum number of tickers suggested for a near-miss lookup.
const MAX_SUGGESTIONS: usize = 15;

/// An in-memory screening session over one universe snapshot.
#[derive(Debug, Clone)]
pub struct Screener {
    universe: DataFrame,
    benchmark: Benchmark,
}

impl Screener {
    /// Build a session from raw universe and benchmark snapshots.
    ///
    /// Resolves and normalizes the universe, removes the benchmark's own row
    /// (the reference never ranks against itself), and attaches relative
    /// returns and RS scores for every ranked timeframe.
    pub fn from_frames(
        universe_raw: &DataFrame,
        benchmark_raw: &DataFrame,
        benchmark_symbol: &str,
    ) -> Result<Self> {
        let benchmark = Benchmark::from_frame(benchmark_raw, benchmark_symbol)?;
        let universe = build_universe(universe_raw, "universe")?;

        let keep: Vec<bool> = universe
            .column("ticker")?
            .str()?
            .into_iter()
            .map(|t| t != Some(benchmark.symbol()))
            .collect();
        let universe = universe.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;

        let universe = with_relative_strength(universe, &benchmark)?;
        Ok(Self {
            universe,
            benchmark,
        })
    }

    /// The ranked universe frame, ordered by ticker ascending.
    pub fn universe(&self) -> &DataFrame {
        &self.universe
    }

    /// The reference record RS is measured against.
    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    /// Number of securities in the universe.
    pub fn universe_size(&self) -> usize {
        self.universe.height()
    }

    /// Evaluate one scan configuration.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanResult> {
        run_scan(&self.universe, config)
    }

    /// Look up a single ticker in the ranked universe.
    ///
    /// The query is normalized before matching. Without an exact match,
    /// tickers sharing the query as a prefix are offered as suggestions.
    pub fn lookup(&self, ticker: &str) -> Result<Lookup> {
        let query = normalize_ticker(ticker);
        if query.is_empty() {
            return Ok(Lookup::NotFound);
        }

        let tickers = self.universe.column("ticker")?.str()?;
        if let Some(row) = tickers.into_iter().position(|t| t == Some(query.as_str())) {
            return Ok(Lookup::Match(self.universe.slice(row as i64, 1)));
        }

        let suggestions: Vec<String> = tickers
            .into_iter()
            .flatten()
            .filter(|t| t.starts_with(query.as_str()))
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect();
        if suggestions.is_empty() {
            Ok(Lookup::NotFound)
        } else {
            Ok(Lookup::Suggestions(suggestions))
        }
    }
}

/// Outcome of a ticker lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Single-row frame for the exact match
    Match(DataFrame),
    /// No exact match; tickers sharing the query as a prefix
    Suggestions(Vec<String>),
    /// Nothing resembles the query
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Timeframe;
    use crate::scan::ScanMode;
    use polars::df;

    fn universe_raw() -> DataFrame {
        df! {
            "Symbol" => ["NVDA", "AMD", "INTC", "SPY"],
            "Description" => ["Nvidia", "AMD", "Intel", "S&P 500 ETF"],
            "Price" => [900.0, 150.0, 30.0, 500.0],
            "Performance % 1 month" => [10.0, 5.0, -2.0, 3.0],
        }
        .unwrap()
    }

    fn benchmark_raw() -> DataFrame {
        df! {
            "Symbol" => ["SPY"],
            "Performance % 1 month" => [3.0],
        }
        .unwrap()
    }

    fn screener() -> Screener {
        Screener::from_frames(&universe_raw(), &benchmark_raw(), "SPY").unwrap()
    }

    #[test]
    fn test_benchmark_row_excluded_from_universe() {
        let s = screener();
        assert_eq!(s.universe_size(), 3);
        let tickers: Vec<&str> = s
            .universe()
            .column("ticker")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(tickers, vec!["AMD", "INTC", "NVDA"]);
    }

    #[test]
    fn test_rs_scores_match_worked_example() {
        // 1M returns 10% / 5% / -2% against a 3% benchmark rank 99 / 66 / 33
        let s = screener();
        let rs = s.universe().column("rs_1m").unwrap().f64().unwrap();

        assert_eq!(rs.get(0), Some(66.0)); // AMD
        assert_eq!(rs.get(1), Some(33.0)); // INTC
        assert_eq!(rs.get(2), Some(99.0)); // NVDA
    }

    #[test]
    fn test_scan_end_to_end() {
        let s = screener();
        let cfg = ScanConfig {
            mode: ScanMode::Primary,
            min_rs: 60,
            ..ScanConfig::default()
        };

        let result = s.scan(&cfg).unwrap();
        assert_eq!(result.universe_size, 3);
        assert_eq!(result.matches, 2);

        let tickers: Vec<&str> = result
            .frame
            .column("ticker")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(tickers, vec!["NVDA", "AMD"]);
    }

    #[test]
    fn test_lookup_exact_match_is_normalized() {
        let s = screener();
        match s.lookup(" nvda ").unwrap() {
            Lookup::Match(row) => {
                assert_eq!(row.height(), 1);
                let ticker = row.column("ticker").unwrap().str().unwrap().get(0);
                assert_eq!(ticker, Some("NVDA"));
            }
            other => panic!("expected exact match, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_prefix_suggestions() {
        let s = screener();
        match s.lookup("N").unwrap() {
            Lookup::Suggestions(tickers) => assert_eq!(tickers, vec!["NVDA"]),
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_not_found() {
        let s = screener();
        assert!(matches!(s.lookup("ZZZZ").unwrap(), Lookup::NotFound));
        assert!(matches!(s.lookup("  ").unwrap(), Lookup::NotFound));
    }

    #[test]
    fn test_one_week_rs_disabled_without_benchmark_column() {
        let s = screener();
        let rs_1w = s.universe().column(Timeframe::OneWeek.rs_column()).unwrap();
        assert_eq!(rs_1w.null_count(), 3);
    }
}
