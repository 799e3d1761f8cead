//! Canonical field identifiers, timeframes, and semantic classification.
//!
//! The source schema is open-ended, so displayable fields are modeled as an
//! explicit enum with typed accessors instead of free-form string dispatch.
//! Each [`Field`] knows its canonical frame column and its [`FieldKind`], so
//! a formatter can render values without re-deriving type information.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Lookback timeframe for performance and relative-strength fields.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// One trading day (raw return only; never ranked)
    #[display("1D")]
    OneDay,
    /// One week
    #[display("1W")]
    OneWeek,
    /// One month
    #[display("1M")]
    OneMonth,
    /// Three months
    #[display("3M")]
    ThreeMonths,
    /// Six months
    #[display("6M")]
    SixMonths,
    /// One year
    #[display("1Y")]
    OneYear,
}

impl Timeframe {
    /// Every timeframe carrying a raw return column.
    pub const ALL: [Self; 6] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
    ];

    /// Timeframes that receive a relative return and an RS score.
    /// 1D is quoted for display but never ranked.
    pub const RANKED: [Self; 5] = [
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
    ];

    /// Canonical column holding the raw fractional return.
    pub const fn return_column(self) -> &'static str {
        match self {
            Self::OneDay => "r_1d",
            Self::OneWeek => "r_1w",
            Self::OneMonth => "r_1m",
            Self::ThreeMonths => "r_3m",
            Self::SixMonths => "r_6m",
            Self::OneYear => "r_1y",
        }
    }

    /// Canonical column holding the benchmark-relative fractional return.
    pub const fn rel_column(self) -> &'static str {
        match self {
            Self::OneDay => "rr_1d",
            Self::OneWeek => "rr_1w",
            Self::OneMonth => "rr_1m",
            Self::ThreeMonths => "rr_3m",
            Self::SixMonths => "rr_6m",
            Self::OneYear => "rr_1y",
        }
    }

    /// Canonical column holding the 1-99 RS score.
    pub const fn rs_column(self) -> &'static str {
        match self {
            Self::OneDay => "rs_1d",
            Self::OneWeek => "rs_1w",
            Self::OneMonth => "rs_1m",
            Self::ThreeMonths => "rs_3m",
            Self::SixMonths => "rs_6m",
            Self::OneYear => "rs_1y",
        }
    }

    /// Ordered header candidates for resolving this timeframe's performance
    /// column in a raw snapshot. Names follow the TradingView export.
    pub const fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::OneDay => &["Price Change % 1 day", "1 day", "daily"],
            Self::OneWeek => &["Performance % 1 week", "1 week", "weekly"],
            Self::OneMonth => &["Performance % 1 month", "1 month", "monthly"],
            Self::ThreeMonths => &["Performance % 3 months", "3 months", "quarter"],
            Self::SixMonths => &["Performance % 6 months", "6 months", "half"],
            Self::OneYear => &["Performance % 1 year", "1 year", "annual"],
        }
    }

    /// Position within [`Self::RANKED`], or `None` for 1D.
    pub fn ranked_index(self) -> Option<usize> {
        Self::RANKED.iter().position(|tf| *tf == self)
    }
}

/// Semantic value class of a display field.
///
/// Classifies each cell so a presentation layer can render it without
/// inspecting the underlying data again.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Monetary value (price, moving-average level)
    Currency,
    /// Fractional return or ratio rendered as a percentage
    Percent,
    /// 1-99 relative-strength score (the RS gap shares this class)
    Score,
    /// Boolean trend condition
    Flag,
    /// Large-magnitude count (volume, market cap, float)
    Count,
    /// Free text
    Text,
}

/// A displayable field of the screened universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Normalized ticker symbol
    Ticker,
    /// Company name (falls back to the ticker)
    Name,
    /// Vendor sector classification
    Sector,
    /// Last price
    Price,
    /// Raw fractional return for a timeframe
    Return(Timeframe),
    /// 1-99 RS score for a ranked timeframe
    Rs(Timeframe),
    /// RS 1M minus RS 1Y
    RsGap,
    /// Market capitalization
    MktCap,
    /// One-day share volume
    Volume,
    /// 30-day average volume
    AvgVol30,
    /// Free float
    FreeFloat,
    /// Volume change vs the prior day
    VolChg1d,
    /// Volume change vs the prior week
    VolChg1w,
    /// Volume change vs the prior month
    VolChg1m,
    /// Relative volume, 1 day
    RelVol1d,
    /// Relative volume, 1 week
    RelVol1w,
    /// Relative volume, 1 month
    RelVol1m,
    /// Diluted EPS growth, quarterly YoY
    EpsQtrYoy,
    /// Diluted EPS growth, annual YoY
    EpsAnnYoy,
    /// Revenue growth, quarterly YoY
    RevQtrYoy,
    /// Revenue growth, annual YoY
    RevAnnYoy,
    /// Return on equity, trailing 12 months
    RoeTtm,
    /// Pre-tax margin, trailing 12 months
    PretaxMarginTtm,
    /// Average daily range
    AdrPct,
    /// Average true range
    AtrPct,
    /// Distance from the 52-week high (usually negative)
    PctFrom52wHigh,
    /// Distance from the all-time high
    PctFromAth,
    /// 200-day simple moving average level
    Sma200,
    /// 50-day simple moving average level
    Sma50,
    /// 20-day simple moving average level
    Sma20,
    /// 10-day simple moving average level
    Sma10,
    /// Price above the 200-day moving average
    PriceAbove200,
    /// Price above the 50-day moving average
    PriceAbove50,
    /// Price above the 20-day moving average
    PriceAbove20,
    /// Price above the 10-day moving average
    PriceAbove10,
    /// 50-day moving average above the 200-day
    Sma50Above200,
}

impl Field {
    /// Every displayable field, in canonical frame order.
    pub const ALL: [Self; 45] = [
        Self::Ticker,
        Self::Name,
        Self::Sector,
        Self::Price,
        Self::Return(Timeframe::OneDay),
        Self::Return(Timeframe::OneWeek),
        Self::Return(Timeframe::OneMonth),
        Self::Return(Timeframe::ThreeMonths),
        Self::Return(Timeframe::SixMonths),
        Self::Return(Timeframe::OneYear),
        Self::Rs(Timeframe::OneWeek),
        Self::Rs(Timeframe::OneMonth),
        Self::Rs(Timeframe::ThreeMonths),
        Self::Rs(Timeframe::SixMonths),
        Self::Rs(Timeframe::OneYear),
        Self::RsGap,
        Self::MktCap,
        Self::Volume,
        Self::AvgVol30,
        Self::FreeFloat,
        Self::VolChg1d,
        Self::VolChg1w,
        Self::VolChg1m,
        Self::RelVol1d,
        Self::RelVol1w,
        Self::RelVol1m,
        Self::EpsQtrYoy,
        Self::EpsAnnYoy,
        Self::RevQtrYoy,
        Self::RevAnnYoy,
        Self::RoeTtm,
        Self::PretaxMarginTtm,
        Self::AdrPct,
        Self::AtrPct,
        Self::PctFrom52wHigh,
        Self::PctFromAth,
        Self::Sma200,
        Self::Sma50,
        Self::Sma20,
        Self::Sma10,
        Self::PriceAbove200,
        Self::PriceAbove50,
        Self::PriceAbove20,
        Self::PriceAbove10,
        Self::Sma50Above200,
    ];

    /// Canonical column name backing this field in the screened frame.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::Name => "name",
            Self::Sector => "sector",
            Self::Price => "price",
            Self::Return(tf) => tf.return_column(),
            Self::Rs(tf) => tf.rs_column(),
            Self::RsGap => "rs_gap",
            Self::MktCap => "mkt_cap",
            Self::Volume => "volume",
            Self::AvgVol30 => "avg_vol_30d",
            Self::FreeFloat => "free_float",
            Self::VolChg1d => "vol_chg_1d",
            Self::VolChg1w => "vol_chg_1w",
            Self::VolChg1m => "vol_chg_1m",
            Self::RelVol1d => "rel_vol_1d",
            Self::RelVol1w => "rel_vol_1w",
            Self::RelVol1m => "rel_vol_1m",
            Self::EpsQtrYoy => "eps_qtr_yoy",
            Self::EpsAnnYoy => "eps_ann_yoy",
            Self::RevQtrYoy => "rev_qtr_yoy",
            Self::RevAnnYoy => "rev_ann_yoy",
            Self::RoeTtm => "roe_ttm",
            Self::PretaxMarginTtm => "pretax_margin_ttm",
            Self::AdrPct => "adr_pct",
            Self::AtrPct => "atr_pct",
            Self::PctFrom52wHigh => "pct_from_52w_high",
            Self::PctFromAth => "pct_from_ath",
            Self::Sma200 => "sma_200",
            Self::Sma50 => "sma_50",
            Self::Sma20 => "sma_20",
            Self::Sma10 => "sma_10",
            Self::PriceAbove200 => "price_above_200",
            Self::PriceAbove50 => "price_above_50",
            Self::PriceAbove20 => "price_above_20",
            Self::PriceAbove10 => "price_above_10",
            Self::Sma50Above200 => "sma50_above_200",
        }
    }

    /// Semantic class used by presentation layers.
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Ticker | Self::Name | Self::Sector => FieldKind::Text,
            Self::Price | Self::Sma200 | Self::Sma50 | Self::Sma20 | Self::Sma10 => {
                FieldKind::Currency
            }
            Self::Rs(_) | Self::RsGap => FieldKind::Score,
            Self::MktCap | Self::Volume | Self::AvgVol30 | Self::FreeFloat => FieldKind::Count,
            Self::RelVol1d | Self::RelVol1w | Self::RelVol1m => FieldKind::Count,
            Self::PriceAbove200
            | Self::PriceAbove50
            | Self::PriceAbove20
            | Self::PriceAbove10
            | Self::Sma50Above200 => FieldKind::Flag,
            _ => FieldKind::Percent,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ticker => write!(f, "Ticker"),
            Self::Name => write!(f, "Name"),
            Self::Sector => write!(f, "Sector"),
            Self::Price => write!(f, "Price"),
            Self::Return(tf) => write!(f, "% {tf}"),
            Self::Rs(tf) => write!(f, "RS {tf}"),
            Self::RsGap => write!(f, "RS GAP"),
            Self::MktCap => write!(f, "Mkt Cap"),
            Self::Volume => write!(f, "Volume"),
            Self::AvgVol30 => write!(f, "Avg Vol 30D"),
            Self::FreeFloat => write!(f, "Float"),
            Self::VolChg1d => write!(f, "Vol Chg 1D"),
            Self::VolChg1w => write!(f, "Vol Chg 1W"),
            Self::VolChg1m => write!(f, "Vol Chg 1M"),
            Self::RelVol1d => write!(f, "Rel Vol 1D"),
            Self::RelVol1w => write!(f, "Rel Vol 1W"),
            Self::RelVol1m => write!(f, "Rel Vol 1M"),
            Self::EpsQtrYoy => write!(f, "EPS Qtr YoY"),
            Self::EpsAnnYoy => write!(f, "EPS Ann YoY"),
            Self::RevQtrYoy => write!(f, "Rev Qtr YoY"),
            Self::RevAnnYoy => write!(f, "Rev Ann YoY"),
            Self::RoeTtm => write!(f, "ROE TTM"),
            Self::PretaxMarginTtm => write!(f, "PreTax Mgn TTM"),
            Self::AdrPct => write!(f, "ADR%"),
            Self::AtrPct => write!(f, "ATR%"),
            Self::PctFrom52wHigh => write!(f, "% From 52W High"),
            Self::PctFromAth => write!(f, "% From ATH"),
            Self::Sma200 => write!(f, "SMA200"),
            Self::Sma50 => write!(f, "SMA50"),
            Self::Sma20 => write!(f, "SMA20"),
            Self::Sma10 => write!(f, "SMA10"),
            Self::PriceAbove200 => write!(f, "P>200"),
            Self::PriceAbove50 => write!(f, "P>50"),
            Self::PriceAbove20 => write!(f, "P>20"),
            Self::PriceAbove10 => write!(f, "P>10"),
            Self::Sma50Above200 => write!(f, "50>200"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_excludes_one_day() {
        assert!(!Timeframe::RANKED.contains(&Timeframe::OneDay));
        assert_eq!(Timeframe::RANKED.len(), 5);
        assert_eq!(Timeframe::OneDay.ranked_index(), None);
        assert_eq!(Timeframe::OneYear.ranked_index(), Some(4));
    }

    #[test]
    fn test_field_headers() {
        assert_eq!(Field::Rs(Timeframe::OneMonth).to_string(), "RS 1M");
        assert_eq!(Field::Return(Timeframe::OneDay).to_string(), "% 1D");
        assert_eq!(Field::RsGap.to_string(), "RS GAP");
        assert_eq!(Field::PctFrom52wHigh.to_string(), "% From 52W High");
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(Field::Price.kind(), FieldKind::Currency);
        assert_eq!(Field::Rs(Timeframe::OneYear).kind(), FieldKind::Score);
        assert_eq!(Field::Return(Timeframe::OneWeek).kind(), FieldKind::Percent);
        assert_eq!(Field::MktCap.kind(), FieldKind::Count);
        assert_eq!(Field::PriceAbove200.kind(), FieldKind::Flag);
        assert_eq!(Field::Name.kind(), FieldKind::Text);
        assert_eq!(Field::VolChg1w.kind(), FieldKind::Percent);
    }

    #[test]
    fn test_columns_are_distinct() {
        let mut all: Vec<&str> = Field::ALL.into_iter().map(Field::column).collect();
        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count);
    }
}
