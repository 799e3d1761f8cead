//! Presentation interface: display field selection and cell formatting.
//!
//! Consumers receive an ordered field subset plus pre-classified values, so
//! rendering never re-derives type information from the frame. Formatting is
//! keyed on [`Field`]; missing cells render as empty strings, never as zero,
//! since zero is a legitimate value for most fields.

use crate::error::Result;
use crate::fields::{Field, FieldKind, Timeframe};
use crate::scan::{CustomFilters, ScanConfig, ScanMode};
use polars::prelude::*;

/// Base display set: identity, price, RS scores, raw performance.
pub fn base_fields() -> Vec<Field> {
    let mut fields = vec![Field::Ticker, Field::Name, Field::Price];
    fields.extend(Timeframe::RANKED.map(Field::Rs));
    fields.extend(Timeframe::ALL.map(Field::Return));
    fields
}

/// Ordered display fields for one scan's result table.
///
/// Accelerating/decelerating scans show the RS gap right after RS 1Y; custom
/// scans surface each active predicate's column after the price so the
/// filtered values are visible alongside the scores.
pub fn scan_fields(config: &ScanConfig) -> Vec<Field> {
    let mut fields = base_fields();
    match config.mode {
        ScanMode::Accelerating | ScanMode::Decelerating => {
            let after_rs_1y = fields
                .iter()
                .position(|f| *f == Field::Rs(Timeframe::OneYear))
                .map_or(fields.len(), |i| i + 1);
            fields.insert(after_rs_1y, Field::RsGap);
        }
        ScanMode::Custom => {
            let after_price = fields
                .iter()
                .position(|f| *f == Field::Price)
                .map_or(fields.len(), |i| i + 1);
            let extras: Vec<Field> = custom_extras(&config.custom)
                .into_iter()
                .filter(|f| !fields.contains(f))
                .collect();
            for (offset, field) in extras.into_iter().enumerate() {
                fields.insert(after_price + offset, field);
            }
        }
        _ => {}
    }
    fields
}

/// Display columns earned by the active custom predicates, in filter-panel
/// order, possibly with duplicates (the caller dedups against the base set).
fn custom_extras(filters: &CustomFilters) -> Vec<Field> {
    let mut extras = Vec::new();
    let mut push = |active: bool, field: Field| {
        if active && !extras.contains(&field) {
            extras.push(field);
        }
    };

    push(filters.min_mkt_cap > 0.0, Field::MktCap);
    push(filters.min_free_float > 0.0, Field::FreeFloat);
    push(filters.min_volume > 0.0, Field::Volume);
    push(filters.min_avg_vol_30d > 0.0, Field::AvgVol30);
    push(filters.min_vol_chg_1d > 0.0, Field::VolChg1d);
    push(filters.min_vol_chg_1w > 0.0, Field::VolChg1w);
    push(filters.min_vol_chg_1m > 0.0, Field::VolChg1m);
    push(filters.min_rel_vol_1d > 0.0, Field::RelVol1d);
    push(filters.min_rel_vol_1w > 0.0, Field::RelVol1w);
    push(filters.min_rel_vol_1m > 0.0, Field::RelVol1m);
    push(filters.min_rev_qtr_yoy > 0.0, Field::RevQtrYoy);
    push(filters.min_rev_ann_yoy > 0.0, Field::RevAnnYoy);
    push(filters.min_eps_qtr_yoy > 0.0, Field::EpsQtrYoy);
    push(filters.min_eps_ann_yoy > 0.0, Field::EpsAnnYoy);
    push(filters.min_roe_ttm > 0.0, Field::RoeTtm);
    push(filters.min_pretax_margin_ttm > 0.0, Field::PretaxMarginTtm);
    push(filters.min_adr > 0.0, Field::AdrPct);
    push(filters.min_atr > 0.0, Field::AtrPct);
    push(filters.max_from_52w_high > 0.0, Field::PctFrom52wHigh);
    push(filters.max_from_ath > 0.0, Field::PctFromAth);
    push(filters.sector.is_some(), Field::Sector);

    push(filters.price_above_200, Field::PriceAbove200);
    push(filters.price_above_200, Field::Sma200);
    push(filters.price_above_50, Field::PriceAbove50);
    push(filters.price_above_50, Field::Sma50);
    push(filters.price_above_20, Field::PriceAbove20);
    push(filters.price_above_20, Field::Sma20);
    push(filters.price_above_10, Field::PriceAbove10);
    push(filters.price_above_10, Field::Sma10);
    push(filters.trend_template, Field::PriceAbove200);
    push(filters.trend_template, Field::PriceAbove50);
    push(filters.trend_template, Field::Sma50Above200);
    push(filters.trend_template, Field::Sma200);
    push(filters.trend_template, Field::Sma50);

    extras
}

/// Column headers for a field subset.
pub fn headers(fields: &[Field]) -> Vec<String> {
    fields.iter().map(ToString::to_string).collect()
}

/// Render a frame restricted to `fields` into formatted rows.
pub fn render_rows(frame: &DataFrame, fields: &[Field]) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        let mut cells = Vec::with_capacity(fields.len());
        for field in fields {
            cells.push(format_cell(frame, *field, row)?);
        }
        rows.push(cells);
    }
    Ok(rows)
}

/// Format one cell; missing values become empty strings.
pub fn format_cell(frame: &DataFrame, field: Field, row: usize) -> Result<String> {
    let column = frame.column(field.column())?;

    // ratio fields and the signed gap escape their kind's default rendering
    let text = match field {
        Field::RelVol1d | Field::RelVol1w | Field::RelVol1m => column
            .f64()?
            .get(row)
            .map(|v| format!("{v:.2}"))
            .unwrap_or_default(),
        Field::RsGap => column
            .f64()?
            .get(row)
            .map(|v| format!("{v:+.0}"))
            .unwrap_or_default(),
        _ => match field.kind() {
            FieldKind::Text => column.str()?.get(row).unwrap_or_default().to_string(),
            FieldKind::Flag => match column.bool()?.get(row) {
                Some(true) => "✓".to_string(),
                _ => String::new(),
            },
            FieldKind::Currency => column
                .f64()?
                .get(row)
                .map(format_currency)
                .unwrap_or_default(),
            FieldKind::Percent => column
                .f64()?
                .get(row)
                .map(format_percent)
                .unwrap_or_default(),
            FieldKind::Score => column
                .f64()?
                .get(row)
                .map(|v| format!("{v:.0}"))
                .unwrap_or_default(),
            FieldKind::Count => column.f64()?.get(row).map(format_count).unwrap_or_default(),
        },
    };
    Ok(text)
}

/// `1234.5` renders as `$1,234.50`.
pub fn format_currency(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", format_grouped(value, 2))
    } else {
        format!("${}", format_grouped(value, 2))
    }
}

/// Fractional `0.1234` renders as `12.34%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Large magnitudes collapse to `K`/`M`/`B`/`T` with two decimals.
pub fn format_count(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else if value < 0.0 {
        format!("-{}", format_grouped(value, 0))
    } else {
        format_grouped(value, 0)
    }
}

/// Absolute value with thousands separators.
fn format_grouped(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
