//! Column resolution against drifting vendor schemas.
//!
//! The universe snapshot is produced by an external export whose exact column
//! headers change over time (vendor renames, localization). Each logical
//! field carries an ordered list of candidate names; resolution tries an
//! exact case-insensitive match first and falls back to a substring match.

use polars::prelude::*;

/// Resolve a logical field to a raw column name.
///
/// Matching runs in two passes over the candidate list:
///
/// 1. the first raw column whose trimmed, lower-cased name equals a
///    candidate wins;
/// 2. failing that, the first raw column (in frame column order) whose
///    lower-cased name contains any candidate as a substring wins.
///
/// When several raw columns substring-match, frame column order is the
/// tie-break; callers may rely on it. Returns `None` when nothing matches,
/// which downstream turns into an all-missing field rather than an error.
pub fn resolve_column(frame: &DataFrame, candidates: &[&str]) -> Option<String> {
    let names: Vec<&str> = frame.get_column_names().iter().map(|n| n.as_str()).collect();

    for cand in candidates {
        let cand_l = cand.trim().to_lowercase();
        if let Some(name) = names
            .iter()
            .find(|n| n.trim().to_lowercase() == cand_l)
        {
            return Some((*name).to_string());
        }
    }

    for name in &names {
        let name_l = name.to_lowercase();
        if candidates
            .iter()
            .any(|cand| name_l.contains(&cand.to_lowercase()))
        {
            return Some((*name).to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn frame() -> DataFrame {
        df! {
            "Symbol" => ["AAPL"],
            "Performance % 1 month" => [5.0],
            "Performance % 1 week" => [1.0],
            "Average Volume 30 days" => [1_000_000.0],
        }
        .unwrap()
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let df = frame();
        assert_eq!(
            resolve_column(&df, &["symbol"]),
            Some("Symbol".to_string())
        );
    }

    #[test]
    fn test_exact_match_beats_substring() {
        // "1 week" substring-matches the month column name's sibling, but an
        // exact candidate later in the list must not outrank an earlier
        // exact one; exact pass runs fully before the substring pass
        let df = frame();
        assert_eq!(
            resolve_column(&df, &["Performance % 1 week", "1 month"]),
            Some("Performance % 1 week".to_string())
        );
    }

    #[test]
    fn test_substring_fallback() {
        let df = frame();
        assert_eq!(
            resolve_column(&df, &["1 month"]),
            Some("Performance % 1 month".to_string())
        );
    }

    #[test]
    fn test_substring_tie_break_is_frame_order() {
        let df = df! {
            "Volume 1 day" => [1.0],
            "Volume 1 week" => [2.0],
        }
        .unwrap();
        // both contain "volume"; the first frame column wins
        assert_eq!(
            resolve_column(&df, &["volume"]),
            Some("Volume 1 day".to_string())
        );
    }

    #[test]
    fn test_absent_field() {
        let df = frame();
        assert_eq!(resolve_column(&df, &["Free float"]), None);
    }
}
