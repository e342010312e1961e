//! CLI interface for realized-vol
//!
//! Provides subcommands for:
//! - `analyze`: Fetch prices and estimate volatility
//! - `inspect`: Summarize an exported Parquet file
//! - `tickers`: List the S&P 500 constituents
//! - `config`: Show the effective configuration

mod analyze;
mod inspect;
mod tickers;

pub use analyze::{AnalyzeArgs, OutputFormat};
pub use inspect::InspectArgs;
pub use tickers::TickersArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "realized-vol")]
#[command(about = "Rolling realized volatility estimates and spike detection for equities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch daily prices and estimate volatility
    Analyze(AnalyzeArgs),
    /// Summarize an exported Parquet file
    Inspect(InspectArgs),
    /// List the current S&P 500 constituents
    Tickers(TickersArgs),
    /// Show the effective configuration
    Config,
}

/// `{:.4}` or a dash for undefined values
pub(crate) fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VolatilityKind;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "realized-vol",
            "analyze",
            "aapl,msft",
            "--window",
            "30",
            "--kinds",
            "rv,gk",
            "--start",
            "2023-01-01",
            "--format",
            "json",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.tickers.as_deref(), Some("aapl,msft"));
        assert!(!args.sp500);
        assert_eq!(args.window, Some(30));
        assert_eq!(
            args.kinds,
            vec![VolatilityKind::Realized, VolatilityKind::GarmanKlass]
        );
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.export);
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let result = Cli::try_parse_from(["realized-vol", "analyze", "SPY", "--kinds", "vix"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_inspect() {
        let cli =
            Cli::try_parse_from(["realized-vol", "-c", "alt.toml", "inspect", "out.parquet"])
                .unwrap();
        assert_eq!(cli.config, "alt.toml");
        assert!(matches!(cli.command, Commands::Inspect(_)));
    }

    #[test]
    fn test_parse_tickers() {
        let cli = Cli::try_parse_from(["realized-vol", "tickers", "--limit", "50", "--joined"]).unwrap();
        let Commands::Tickers(args) = cli.command else {
            panic!("expected tickers");
        };
        assert_eq!(args.limit, Some(50));
        assert!(args.joined);
    }

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(Some(0.123456)), "0.1235");
        assert_eq!(fmt_value(None), "-");
    }
}
