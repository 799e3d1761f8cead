#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rs-screener/rs-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod columns;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod scan;
pub mod screener;
pub mod strength;
pub mod universe;
pub mod view;

// Re-export core types
pub use benchmark::Benchmark;
pub use error::{Result, ScreenError};
pub use fields::{Field, FieldKind, Timeframe};
pub use scan::{CustomFilters, ScanConfig, ScanMode, ScanResult, SortPreference, run_scan};
pub use screener::{Lookup, Screener};
pub use strength::{percentile_scores, relative_return, with_relative_strength};
pub use universe::build_universe;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
