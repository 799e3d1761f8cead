//! Normalization of raw vendor values into canonical units.
//!
//! The input snapshots come from external exports whose cell formats drift:
//! percent fields arrive either as numbers in percent units (`12.3`) or as
//! decorated strings (`"12.3%"`, `"1,234.5 %"`), and numeric fields may be
//! typed as text. Everything here degrades to a missing value on malformed
//! input; normalization never fails a load.

use polars::prelude::*;

/// Normalize a raw ticker symbol into its canonical form.
///
/// Upper-cases, strips all whitespace, and maps `/` to `-` so that share
/// classes compare consistently (`"brk/b"` becomes `BRK-B`).
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .replace(' ', "")
        .replace('/', "-")
}

/// Parse a decorated numeric string, tolerating `%`, thousands separators,
/// currency symbols, and other stray characters.
///
/// Keeps only digits, `.`, `-`, and `+` before parsing. Returns `None` for
/// anything that still fails to parse, or parses to a non-finite value.
pub fn parse_lenient(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a plain numeric string strictly (no cleanup beyond trimming).
pub fn parse_strict(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert a percent-like column into fractional form.
///
/// Numeric values are percent units (`12.3` means 12.3%) and are divided by
/// 100; string values are cleaned with [`parse_lenient`] first. `"12.3%"`
/// and `12.3` both normalize to `0.123`. Unparsable cells become null.
pub fn percent_values(column: &Column, name: &str) -> Float64Chunked {
    let raw = numeric_or_lenient(column, name, parse_lenient);
    raw.apply_values(|v| v / 100.0)
}

/// Convert a plain numeric column (price, volume, market cap) to nullable
/// floats. String cells are parsed strictly; unparsable cells become null.
pub fn numeric_values(column: &Column, name: &str) -> Float64Chunked {
    numeric_or_lenient(column, name, parse_strict)
}

fn numeric_or_lenient(
    column: &Column,
    name: &str,
    parse: fn(&str) -> Option<f64>,
) -> Float64Chunked {
    match column.dtype() {
        DataType::String => {
            let parsed = column
                .str()
                .map(|ca| {
                    ca.into_iter()
                        .map(|opt| opt.and_then(parse))
                        .collect::<Vec<Option<f64>>>()
                })
                .unwrap_or_else(|_| vec![None; column.len()]);
            Float64Chunked::from_iter_options(name.into(), parsed.into_iter())
        }
        _ => match column.cast(&DataType::Float64) {
            Ok(cast) => {
                let values = cast
                    .f64()
                    .map(|ca| {
                        ca.into_iter()
                            .map(|opt| opt.filter(|v| v.is_finite()))
                            .collect::<Vec<Option<f64>>>()
                    })
                    .unwrap_or_else(|_| vec![None; column.len()]);
                Float64Chunked::from_iter_options(name.into(), values.into_iter())
            }
            Err(_) => Float64Chunked::full_null(name.into(), column.len()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(" nvda ", "NVDA")]
    #[case("BRK/B", "BRK-B")]
    #[case("brk.b", "BRK.B")]
    #[case("  msft", "MSFT")]
    #[case("B R K", "BRK")]
    fn test_normalize_ticker(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_ticker(raw), expected);
    }

    #[rstest]
    #[case("12.3%", Some(12.3))]
    #[case("1,234.5", Some(1234.5))]
    #[case("-4.85 %", Some(-4.85))]
    #[case("+3.0", Some(3.0))]
    #[case("n/a", None)]
    #[case("", None)]
    fn test_parse_lenient(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_lenient(raw), expected);
    }

    #[test]
    fn test_parse_strict_rejects_decorations() {
        assert_eq!(parse_strict("12.3"), Some(12.3));
        assert_eq!(parse_strict("12.3%"), None);
        assert_eq!(parse_strict("1,234"), None);
    }

    #[test]
    fn test_percent_values_numeric_column() {
        let col = Column::new("perf".into(), &[Some(12.3f64), Some(-2.0), None]);
        let out = percent_values(&col, "r_1m");

        assert_relative_eq!(out.get(0).unwrap(), 0.123);
        assert_relative_eq!(out.get(1).unwrap(), -0.02);
        assert!(out.get(2).is_none());
    }

    #[test]
    fn test_percent_values_string_column() {
        let col = Column::new(
            "perf".into(),
            &[Some("12.3%"), Some("1,050"), Some("garbage"), None],
        );
        let out = percent_values(&col, "r_1m");

        assert_relative_eq!(out.get(0).unwrap(), 0.123);
        assert_relative_eq!(out.get(1).unwrap(), 10.5);
        assert!(out.get(2).is_none());
        assert!(out.get(3).is_none());
    }

    #[test]
    fn test_numeric_values_string_column_is_strict() {
        let col = Column::new("price".into(), &[Some("101.5"), Some("$101.5")]);
        let out = numeric_values(&col, "price");

        assert_relative_eq!(out.get(0).unwrap(), 101.5);
        assert!(out.get(1).is_none());
    }

    #[test]
    fn test_unsupported_dtype_degrades_to_null() {
        let col = Column::new("when".into(), &[Some("a"), Some("b")]);
        // a string column full of non-numbers parses to all-null, not an error
        let out = numeric_values(&col, "x");
        assert_eq!(out.null_count(), 2);
    }
}
