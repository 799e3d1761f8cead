//! Universe Frame construction from a raw snapshot.
//!
//! Maps the loosely-named vendor columns onto the canonical schema, converts
//! every value into canonical units, derives distance-from-high and trend
//! fields, and enforces the row invariants: tickers are normalized, unique
//! (first occurrence wins), non-empty, and ordered ascending. Unresolved
//! optional columns degrade to all-missing fields; only a missing ticker
//! column or an empty dataset is fatal.

use crate::columns::resolve_column;
use crate::error::{Result, ScreenError};
use crate::fields::Timeframe;
use crate::normalize::{normalize_ticker, numeric_values, percent_values};
use polars::prelude::*;
use std::collections::HashSet;

const TICKER_CANDIDATES: &[&str] = &["Symbol"];
const NAME_CANDIDATES: &[&str] = &["Description", "Name"];
const PRICE_CANDIDATES: &[&str] = &["Price", "Last"];
const SECTOR_CANDIDATES: &[&str] = &["Sector"];

const MKT_CAP_CANDIDATES: &[&str] = &["Market capitalization"];
const VOLUME_CANDIDATES: &[&str] = &["Volume 1 day", "Volume"];
const AVG_VOL_30D_CANDIDATES: &[&str] = &["Average Volume 30 days"];
const FREE_FLOAT_CANDIDATES: &[&str] = &["Free float"];

const VOL_CHG_1D_CANDIDATES: &[&str] = &["Volume Change % 1 day"];
const VOL_CHG_1W_CANDIDATES: &[&str] = &["Volume Change % 1 week"];
const VOL_CHG_1M_CANDIDATES: &[&str] = &["Volume Change % 1 month"];
const REL_VOL_1D_CANDIDATES: &[&str] = &["Relative Volume 1 day"];
const REL_VOL_1W_CANDIDATES: &[&str] = &["Relative Volume 1 week"];
const REL_VOL_1M_CANDIDATES: &[&str] = &["Relative Volume 1 month"];

const EPS_QTR_CANDIDATES: &[&str] = &["Earnings per share diluted growth %, Quarterly YoY"];
const EPS_ANN_CANDIDATES: &[&str] = &["Earnings per share diluted growth %, Annual YoY"];
const REV_QTR_CANDIDATES: &[&str] = &["Revenue growth %, Quarterly YoY"];
const REV_ANN_CANDIDATES: &[&str] = &["Revenue growth %, Annual YoY"];
const ROE_CANDIDATES: &[&str] = &["Return on equity %, Trailing 12 months"];
const PRETAX_CANDIDATES: &[&str] = &["Pretax margin %, Trailing 12 months"];

const HIGH_52W_CANDIDATES: &[&str] = &["High 52 weeks"];
const HIGH_ATH_CANDIDATES: &[&str] = &["High All Time"];

const ADR_CANDIDATES: &[&str] = &["Average Daily Range %"];
const ATR_CANDIDATES: &[&str] = &["Average True Range % (14) 1 day", "Average True Range %"];

const SMA_200_CANDIDATES: &[&str] = &["Simple Moving Average (200) 1 day"];
const SMA_50_CANDIDATES: &[&str] = &["Simple Moving Average (50) 1 day"];
const SMA_20_CANDIDATES: &[&str] = &["Simple Moving Average (20) 1 day"];
const SMA_10_CANDIDATES: &[&str] = &["Simple Moving Average (10) 1 day"];

/// Build the canonical universe frame from a raw snapshot.
///
/// `source_name` identifies the dataset in error messages. Returns the
/// canonical frame ordered by ticker ascending, one row per unique ticker.
pub fn build_universe(raw: &DataFrame, source_name: &str) -> Result<DataFrame> {
    if raw.height() == 0 {
        return Err(ScreenError::EmptyDataset(source_name.to_string()));
    }

    let ticker_col = resolve_column(raw, TICKER_CANDIDATES)
        .ok_or_else(|| ScreenError::MissingTickerColumn(source_name.to_string()))?;
    let tickers = string_field(raw, &ticker_col)?
        .iter()
        .map(|opt| opt.as_deref().map(normalize_ticker).unwrap_or_default())
        .collect::<Vec<String>>();

    let price = numeric_field(raw, PRICE_CANDIDATES, "price")?;
    let high_52w = numeric_field(raw, HIGH_52W_CANDIDATES, "high_52w")?;
    let high_ath = numeric_field(raw, HIGH_ATH_CANDIDATES, "high_ath")?;
    let sma_200 = numeric_field(raw, SMA_200_CANDIDATES, "sma_200")?;
    let sma_50 = numeric_field(raw, SMA_50_CANDIDATES, "sma_50")?;
    let sma_20 = numeric_field(raw, SMA_20_CANDIDATES, "sma_20")?;
    let sma_10 = numeric_field(raw, SMA_10_CANDIDATES, "sma_10")?;

    let mut columns: Vec<Column> = Vec::with_capacity(40);
    columns.push(Column::new("ticker".into(), tickers.clone()));
    columns.push(name_column(raw, &tickers)?);
    columns.push(sector_column(raw)?);
    columns.push(price.clone().into_column());

    for tf in Timeframe::ALL {
        columns.push(percent_field(raw, tf.candidates(), tf.return_column())?.into_column());
    }

    columns.push(numeric_field(raw, MKT_CAP_CANDIDATES, "mkt_cap")?.into_column());
    columns.push(numeric_field(raw, VOLUME_CANDIDATES, "volume")?.into_column());
    columns.push(numeric_field(raw, AVG_VOL_30D_CANDIDATES, "avg_vol_30d")?.into_column());
    columns.push(numeric_field(raw, FREE_FLOAT_CANDIDATES, "free_float")?.into_column());

    columns.push(percent_field(raw, VOL_CHG_1D_CANDIDATES, "vol_chg_1d")?.into_column());
    columns.push(percent_field(raw, VOL_CHG_1W_CANDIDATES, "vol_chg_1w")?.into_column());
    columns.push(percent_field(raw, VOL_CHG_1M_CANDIDATES, "vol_chg_1m")?.into_column());
    columns.push(numeric_field(raw, REL_VOL_1D_CANDIDATES, "rel_vol_1d")?.into_column());
    columns.push(numeric_field(raw, REL_VOL_1W_CANDIDATES, "rel_vol_1w")?.into_column());
    columns.push(numeric_field(raw, REL_VOL_1M_CANDIDATES, "rel_vol_1m")?.into_column());

    columns.push(percent_field(raw, EPS_QTR_CANDIDATES, "eps_qtr_yoy")?.into_column());
    columns.push(percent_field(raw, EPS_ANN_CANDIDATES, "eps_ann_yoy")?.into_column());
    columns.push(percent_field(raw, REV_QTR_CANDIDATES, "rev_qtr_yoy")?.into_column());
    columns.push(percent_field(raw, REV_ANN_CANDIDATES, "rev_ann_yoy")?.into_column());
    columns.push(percent_field(raw, ROE_CANDIDATES, "roe_ttm")?.into_column());
    columns.push(percent_field(raw, PRETAX_CANDIDATES, "pretax_margin_ttm")?.into_column());

    columns.push(percent_field(raw, ADR_CANDIDATES, "adr_pct")?.into_column());
    columns.push(percent_field(raw, ATR_CANDIDATES, "atr_pct")?.into_column());

    columns.push(distance_from_high(&price, &high_52w, "pct_from_52w_high").into_column());
    columns.push(distance_from_high(&price, &high_ath, "pct_from_ath").into_column());

    columns.push(sma_200.clone().into_column());
    columns.push(sma_50.clone().into_column());
    columns.push(sma_20.clone().into_column());
    columns.push(sma_10.clone().into_column());

    columns.push(above_flag(&price, &sma_200, "price_above_200").into_column());
    columns.push(above_flag(&price, &sma_50, "price_above_50").into_column());
    columns.push(above_flag(&price, &sma_20, "price_above_20").into_column());
    columns.push(above_flag(&price, &sma_10, "price_above_10").into_column());
    columns.push(above_flag(&sma_50, &sma_200, "sma50_above_200").into_column());

    let frame = DataFrame::new(columns)?;

    // drop empty tickers, keep first occurrence of duplicates
    let mut seen = HashSet::new();
    let keep: Vec<bool> = tickers
        .iter()
        .map(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let frame = frame.filter(&mask)?;

    Ok(frame.sort(["ticker"], SortMultipleOptions::default())?)
}

fn string_field(raw: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let cast = raw.column(name)?.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|opt| opt.map(str::to_string))
        .collect())
}

fn name_column(raw: &DataFrame, tickers: &[String]) -> Result<Column> {
    let values = match resolve_column(raw, NAME_CANDIDATES) {
        Some(col) => string_field(raw, &col)?
            .into_iter()
            .zip(tickers)
            .map(|(name, ticker)| name.unwrap_or_else(|| ticker.clone()))
            .collect::<Vec<String>>(),
        None => tickers.to_vec(),
    };
    Ok(Column::new("name".into(), values))
}

fn sector_column(raw: &DataFrame) -> Result<Column> {
    match resolve_column(raw, SECTOR_CANDIDATES) {
        Some(col) => {
            let values = string_field(raw, &col)?;
            Ok(Column::new("sector".into(), values))
        }
        None => {
            log::warn!("sector column not resolved; sector filter disabled");
            Ok(StringChunked::full_null("sector".into(), raw.height()).into_column())
        }
    }
}

fn numeric_field(raw: &DataFrame, candidates: &[&str], name: &str) -> Result<Float64Chunked> {
    match resolve_column(raw, candidates) {
        Some(col) => Ok(numeric_values(raw.column(&col)?, name)),
        None => {
            log::warn!("column '{name}' not resolved; field will be missing");
            Ok(Float64Chunked::full_null(name.into(), raw.height()))
        }
    }
}

fn percent_field(raw: &DataFrame, candidates: &[&str], name: &str) -> Result<Float64Chunked> {
    match resolve_column(raw, candidates) {
        Some(col) => Ok(percent_values(raw.column(&col)?, name)),
        None => {
            log::warn!("column '{name}' not resolved; field will be missing");
            Ok(Float64Chunked::full_null(name.into(), raw.height()))
        }
    }
}

/// `price / high - 1`, missing unless both operands are present and the high
/// is positive. Usually negative; zero means the security sits at its high.
fn distance_from_high(price: &Float64Chunked, high: &Float64Chunked, name: &str) -> Float64Chunked {
    let values = price
        .into_iter()
        .zip(high)
        .map(|(p, h)| match (p, h) {
            (Some(p), Some(h)) if h > 0.0 => Some(p / h - 1.0),
            _ => None,
        })
        .collect::<Vec<Option<f64>>>();
    Float64Chunked::from_iter_options(name.into(), values.into_iter())
}

/// `true` iff both operands are present and `a > b`. Never missing: without a
/// clean signal the condition counts as not met.
fn above_flag(a: &Float64Chunked, b: &Float64Chunked, name: &str) -> BooleanChunked {
    let values = a
        .into_iter()
        .zip(b)
        .map(|(a, b)| matches!((a, b), (Some(a), Some(b)) if a > b))
        .collect::<Vec<bool>>();
    BooleanChunked::from_slice(name.into(), &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::df;

    fn raw_frame() -> DataFrame {
        df! {
            "Symbol" => [" aapl ", "BRK/B", "", "AAPL", "msft"],
            "Description" => ["Apple", "Berkshire B", "Ghost", "Apple dup", "Microsoft"],
            "Price" => [Some(150.0), Some(420.0), Some(1.0), Some(151.0), None],
            "Performance % 1 month" => [10.0, 5.0, 0.0, 11.0, -2.0],
            "High 52 weeks" => [Some(200.0), Some(400.0), None, Some(200.0), Some(330.0)],
            "Simple Moving Average (200) 1 day" => [Some(140.0), Some(430.0), None, Some(140.0), Some(300.0)],
            "Simple Moving Average (50) 1 day" => [Some(145.0), Some(425.0), None, Some(145.0), Some(310.0)],
            "Sector" => ["Tech", "Finance", "", "Tech", "Tech"],
        }
        .unwrap()
    }

    #[test]
    fn test_tickers_normalized_deduped_sorted() {
        let df = build_universe(&raw_frame(), "universe").unwrap();
        let tickers: Vec<&str> = df
            .column("ticker")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        // empty ticker dropped, duplicate AAPL keeps its first row,
        // slashes map to dashes, order is ascending
        assert_eq!(tickers, vec!["AAPL", "BRK-B", "MSFT"]);

        let names: Vec<&str> = df
            .column("name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(names, vec!["Apple", "Berkshire B", "Microsoft"]);
    }

    #[test]
    fn test_returns_are_fractional() {
        let df = build_universe(&raw_frame(), "universe").unwrap();
        let r_1m = df.column("r_1m").unwrap().f64().unwrap();

        assert_relative_eq!(r_1m.get(0).unwrap(), 0.10); // AAPL
        assert_relative_eq!(r_1m.get(1).unwrap(), 0.05); // BRK-B
        assert_relative_eq!(r_1m.get(2).unwrap(), -0.02); // MSFT
    }

    #[test]
    fn test_unresolved_columns_are_all_missing() {
        let df = build_universe(&raw_frame(), "universe").unwrap();
        let mkt_cap = df.column("mkt_cap").unwrap();
        assert_eq!(mkt_cap.null_count(), df.height());
        let r_1y = df.column("r_1y").unwrap();
        assert_eq!(r_1y.null_count(), df.height());
    }

    #[test]
    fn test_trend_flags_conservative_on_missing() {
        let df = build_universe(&raw_frame(), "universe").unwrap();
        let p200 = df.column("price_above_200").unwrap().bool().unwrap();

        assert_eq!(p200.get(0), Some(true)); // AAPL 150 > 140
        assert_eq!(p200.get(1), Some(false)); // BRK-B 420 < 430
        assert_eq!(p200.get(2), Some(false)); // MSFT price missing -> false

        let cross = df.column("sma50_above_200").unwrap().bool().unwrap();
        assert_eq!(cross.get(0), Some(true)); // 145 > 140
        assert_eq!(cross.get(2), Some(true)); // MSFT 310 > 300, operands present
    }

    #[test]
    fn test_distance_from_high() {
        let df = build_universe(&raw_frame(), "universe").unwrap();
        let dist = df.column("pct_from_52w_high").unwrap().f64().unwrap();

        assert_relative_eq!(dist.get(0).unwrap(), 150.0 / 200.0 - 1.0);
        assert!(dist.get(2).is_none()); // MSFT price missing
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let df = df! { "Symbol" => Vec::<String>::new() }.unwrap();
        let err = build_universe(&df, "universe").unwrap_err();
        assert!(matches!(err, ScreenError::EmptyDataset(_)));
    }

    #[test]
    fn test_missing_ticker_column_is_fatal() {
        let df = df! { "Price" => [1.0] }.unwrap();
        let err = build_universe(&df, "universe").unwrap_err();
        assert!(matches!(err, ScreenError::MissingTickerColumn(_)));
    }
}
