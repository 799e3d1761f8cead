//! CLI for the relative-strength stock screener.
//!
//! Loads the universe and benchmark CSV snapshots, builds one in-memory
//! screening session, and runs a single scan or ticker lookup against it.
//! Each invocation is one full recomputation; nothing persists between runs.

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use rs_screener::{
    CustomFilters, Field, Lookup, ScanConfig, ScanMode, Screener, SortPreference, Timeframe, view,
};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rs-screener")]
#[command(about = "Relative-strength stock screener", long_about = None)]
#[command(version)]
struct Cli {
    /// Universe snapshot CSV
    #[arg(long, global = true, default_value = "Data/Screener_Data.csv")]
    universe: PathBuf,

    /// Benchmark snapshot CSV
    #[arg(long, global = true, default_value = "Data/SPY_Data.csv")]
    benchmark_data: PathBuf,

    /// Benchmark ticker the universe is ranked against
    #[arg(long, global = true, default_value = "SPY")]
    benchmark: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe with a filter configuration
    Scan(ScanArgs),
    /// Show one ticker's dashboard row
    Lookup {
        /// Ticker symbol (ex: NVDA)
        ticker: String,
    },
    /// List the displayable fields and their semantic classes
    Fields,
}

#[derive(Args)]
struct ScanArgs {
    /// Scan mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Primary timeframe to rank by
    #[arg(long, value_enum)]
    rank_by: Option<RankByArg>,

    /// Minimum primary RS score, 1-99
    #[arg(long)]
    min_rs: Option<u8>,

    /// Minimum RS gap for accelerating/decelerating scans
    #[arg(long)]
    gap: Option<f64>,

    /// Require the smooth RS chain for accelerating/decelerating scans
    #[arg(long)]
    smooth: Option<bool>,

    /// Sort accelerating/decelerating results by gap or by primary RS
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Cap on displayed results
    #[arg(long)]
    max_results: Option<usize>,

    /// Sector filter (custom mode)
    #[arg(long)]
    sector: Option<String>,

    /// JSON file with custom filter thresholds (custom mode)
    #[arg(long)]
    filters: Option<PathBuf>,

    /// Start from the Super Performers preset (growth + trend)
    #[arg(long)]
    super_performers: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum ModeArg {
    Primary,
    AllTimeframes,
    Accelerating,
    Decelerating,
    Custom,
}

impl From<ModeArg> for ScanMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Primary => Self::Primary,
            ModeArg::AllTimeframes => Self::AllTimeframes,
            ModeArg::Accelerating => Self::Accelerating,
            ModeArg::Decelerating => Self::Decelerating,
            ModeArg::Custom => Self::Custom,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum RankByArg {
    #[value(name = "1w")]
    OneWeek,
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
}

impl From<RankByArg> for Timeframe {
    fn from(arg: RankByArg) -> Self {
        match arg {
            RankByArg::OneWeek => Self::OneWeek,
            RankByArg::OneMonth => Self::OneMonth,
            RankByArg::ThreeMonths => Self::ThreeMonths,
            RankByArg::SixMonths => Self::SixMonths,
            RankByArg::OneYear => Self::OneYear,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum SortArg {
    Gap,
    Primary,
}

impl From<SortArg> for SortPreference {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Gap => Self::GapShift,
            SortArg::Primary => Self::PrimaryTimeframe,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Fields => {
            list_fields();
            Ok(())
        }
        Commands::Scan(ref args) => {
            let screener = load_session(&cli)?;
            let file_filters = args.filters.as_deref().map(load_filters).transpose()?;
            let config = build_config(args, file_filters);
            run_scan_command(&screener, &cli.benchmark, &config)
        }
        Commands::Lookup { ref ticker } => {
            let screener = load_session(&cli)?;
            run_lookup_command(&screener, ticker)
        }
    }
}

fn load_session(cli: &Cli) -> Result<Screener, Box<dyn Error>> {
    let universe_raw = read_csv(&cli.universe)?;
    let benchmark_raw = read_csv(&cli.benchmark_data)?;
    let screener = Screener::from_frames(&universe_raw, &benchmark_raw, &cli.benchmark)?;
    log::info!(
        "loaded universe of {} securities against {}",
        screener.universe_size(),
        screener.benchmark().symbol()
    );
    Ok(screener)
}

fn read_csv(path: &Path) -> Result<DataFrame, Box<dyn Error>> {
    if !path.exists() {
        return Err(format!("could not find input file at: {}", path.display()).into());
    }
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(frame)
}

fn load_filters(path: &Path) -> Result<CustomFilters, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Assemble the scan configuration: preset first, then the filter file,
/// then explicit flags, so anything the user typed wins.
fn build_config(args: &ScanArgs, file_filters: Option<CustomFilters>) -> ScanConfig {
    let mut config = if args.super_performers {
        ScanConfig::super_performers()
    } else {
        ScanConfig::default()
    };

    if let Some(filters) = file_filters {
        config.custom = filters;
        config.mode = ScanMode::Custom;
    }
    if let Some(sector) = &args.sector {
        config.custom.sector = Some(sector.clone());
        config.mode = ScanMode::Custom;
    }

    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(rank_by) = args.rank_by {
        config.primary = rank_by.into();
    }
    if let Some(min_rs) = args.min_rs {
        config.min_rs = min_rs;
    }
    if let Some(gap) = args.gap {
        config.min_gap = gap;
    }
    if let Some(smooth) = args.smooth {
        config.smooth_chain = smooth;
    }
    if let Some(sort) = args.sort {
        config.sort = sort.into();
    }
    if let Some(max_results) = args.max_results {
        config.max_results = max_results;
    }

    config
}

fn run_scan_command(
    screener: &Screener,
    benchmark: &str,
    config: &ScanConfig,
) -> Result<(), Box<dyn Error>> {
    let result = screener.scan(config)?;
    let fields = view::scan_fields(config);
    let headers = view::headers(&fields);
    let rows = view::render_rows(&result.frame, &fields)?;

    println!("Relative Strength Stock Screener");
    println!(
        "As of: {} • RS Benchmark: {}",
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        benchmark
    );
    println!("Mode: {} • Rank by: RS {}", config.mode, config.primary);
    println!(
        "Universe: {} • Matches: {}",
        result.universe_size, result.matches
    );
    println!();
    print_table(&headers, &rows);
    Ok(())
}

fn run_lookup_command(screener: &Screener, ticker: &str) -> Result<(), Box<dyn Error>> {
    match screener.lookup(ticker)? {
        Lookup::Match(row) => {
            let fields = view::base_fields();
            let headers = view::headers(&fields);
            let rows = view::render_rows(&row, &fields)?;
            print_table(&headers, &rows);
        }
        Lookup::Suggestions(tickers) => {
            println!("No exact match for {ticker}. Closest tickers:");
            println!("{}", tickers.join(", "));
        }
        Lookup::NotFound => println!("No match found for {ticker}."),
    }
    Ok(())
}

fn list_fields() {
    println!("Displayable fields ({} total)\n", Field::ALL.len());
    for field in Field::ALL {
        println!("  {:<18} {:<10} {}", field.column(), field.kind().to_string(), field);
    }
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", render(headers));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!("{}", render(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_args() -> ScanArgs {
        ScanArgs {
            mode: None,
            rank_by: None,
            min_rs: None,
            gap: None,
            smooth: None,
            sort: None,
            max_results: None,
            sector: None,
            filters: None,
            super_performers: false,
        }
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = build_config(&scan_args(), None);
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_preset_sets_custom_mode_and_threshold() {
        let mut args = scan_args();
        args.super_performers = true;

        let config = build_config(&args, None);
        assert_eq!(config.mode, ScanMode::Custom);
        assert_eq!(config.min_rs, 87);
        assert!(config.custom.price_above_200);
    }

    #[test]
    fn test_explicit_flags_override_preset() {
        let mut args = scan_args();
        args.super_performers = true;
        args.min_rs = Some(90);
        args.mode = Some(ModeArg::Primary);

        let config = build_config(&args, None);
        assert_eq!(config.min_rs, 90);
        assert_eq!(config.mode, ScanMode::Primary);
    }

    #[test]
    fn test_sector_flag_implies_custom_mode() {
        let mut args = scan_args();
        args.sector = Some("Tech".to_string());

        let config = build_config(&args, None);
        assert_eq!(config.mode, ScanMode::Custom);
        assert_eq!(config.custom.sector.as_deref(), Some("Tech"));
    }

    #[test]
    fn test_filter_file_populates_custom_set() {
        let filters: CustomFilters =
            serde_json::from_str(r#"{"min_mkt_cap": 1000000000.0, "min_rel_vol_1d": 1.5}"#)
                .unwrap();
        let config = build_config(&scan_args(), Some(filters));

        assert_eq!(config.mode, ScanMode::Custom);
        assert_eq!(config.custom.min_mkt_cap, 1.0e9);
        assert_eq!(config.custom.min_rel_vol_1d, 1.5);
    }
}
