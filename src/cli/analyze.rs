//! Analyze command implementation

use super::fmt_value;
use super::tickers::sp500_symbols;
use crate::analysis::{analyze_all, AnalysisError, AnalysisSettings, TickerReport};
use crate::config::Config;
use crate::data::{VolatilityTable, VolatilityWriter};
use crate::feed::{CachedFetcher, FetchRequest, PriceFetcher, YahooConfig, YahooFetcher};
use crate::model::VolatilityKind;
use chrono::{Duration, Local, Months, NaiveDate};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

/// Default lookback when `--start` is not given
const DEFAULT_LOOKBACK_MONTHS: u32 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Comma-separated tickers, e.g. "AAPL,MSFT"
    #[arg(required_unless_present = "sp500")]
    pub tickers: Option<String>,

    /// Analyze the current S&P 500 constituents instead
    #[arg(long, conflicts_with = "tickers")]
    pub sp500: bool,

    /// With --sp500, keep only the first N constituents
    #[arg(long, value_name = "N", requires = "sp500")]
    pub limit: Option<usize>,

    /// First date (YYYY-MM-DD); defaults to three years before `end`
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date, exclusive (YYYY-MM-DD); defaults to tomorrow
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Rolling window in trading days
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Spike threshold in standard deviations
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Estimators to compute, comma-separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub kinds: Vec<VolatilityKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write each ticker's table to Parquet under the data output dir
    #[arg(long)]
    pub export: bool,

    /// Re-run every SECS seconds until Ctrl-C
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

impl AnalyzeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let settings = self.settings(config)?;
        let tickers = self.resolve_tickers(config).await?;
        let yahoo = YahooFetcher::with_config(YahooConfig::from(&config.feed))?;
        let fetcher = CachedFetcher::from_config(yahoo, &config.feed);
        let writer = self.export.then(|| VolatilityWriter::new(&config.data.output_dir));

        let Some(secs) = self.watch else {
            return self.run_once(&tickers, &fetcher, &settings, writer.as_ref()).await;
        };

        let mut interval = tokio::time::interval(std::time::Duration::from_secs(secs.max(1)));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // A failed refresh is reported and the next tick retries
                    if let Err(e) = self.run_once(&tickers, &fetcher, &settings, writer.as_ref()).await {
                        tracing::error!(error = %e, "Refresh failed");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl-C, stopping");
                    return Ok(());
                }
            }
        }
    }

    fn settings(&self, config: &Config) -> anyhow::Result<AnalysisSettings> {
        let mut config = config.clone();
        if let Some(window) = self.window {
            config.engine.window = window;
        }
        if let Some(threshold) = self.threshold {
            config.spikes.threshold = threshold;
        }
        Ok(AnalysisSettings::from_config(&config)?.with_kinds(self.kinds.clone()))
    }

    /// Listed tickers, or the constituent list with --sp500
    async fn resolve_tickers(&self, config: &Config) -> anyhow::Result<Vec<String>> {
        if self.sp500 {
            return sp500_symbols(config, self.limit).await;
        }
        Ok(FetchRequest::parse_tickers(self.tickers.as_deref().unwrap_or_default()))
    }

    /// Request for the configured range, resolved against `today`
    fn request(&self, tickers: &[String], today: NaiveDate) -> anyhow::Result<FetchRequest> {
        let end = self.end.unwrap_or(today + Duration::days(1));
        let start = match self.start {
            Some(start) => start,
            None => end
                .checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
                .ok_or_else(|| anyhow::anyhow!("Cannot compute start date from {}", end))?,
        };
        Ok(FetchRequest::new(tickers, start, end)?)
    }

    async fn run_once<F: PriceFetcher>(
        &self,
        tickers: &[String],
        fetcher: &F,
        settings: &AnalysisSettings,
        writer: Option<&VolatilityWriter>,
    ) -> anyhow::Result<()> {
        let request = self.request(tickers, Local::now().date_naive())?;
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze", %run_id);

        async {
            tracing::info!(
                tickers = request.tickers.len(),
                start = %request.start,
                end = %request.end,
                window = settings.engine.window(),
                "Starting analysis"
            );

            let response = fetcher.fetch(&request).await?;
            let results = analyze_all(&request, response, settings);

            match self.format {
                OutputFormat::Table => print_table(&results),
                OutputFormat::Json => println!("{}", to_json(&results)?),
            }

            if let Some(writer) = writer {
                for report in results.iter().flatten() {
                    let table = VolatilityTable {
                        ticker: report.symbol.clone(),
                        result: report.result.clone(),
                    };
                    let path = writer.export(&table, request.start, request.end)?;
                    tracing::info!(ticker = %report.symbol, path = ?path, "Exported volatility");
                }
            }

            let ok = results.iter().filter(|r| r.is_ok()).count();
            tracing::info!(analyzed = ok, failed = results.len() - ok, "Analysis complete");

            if ok == 0 {
                anyhow::bail!("No ticker could be analyzed");
            }
            Ok::<(), anyhow::Error>(())
        }
        .instrument(span)
        .await
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonEntry<'a> {
    Report(&'a TickerReport),
    Failure { symbol: &'a str, error: String },
}

fn to_json(results: &[Result<TickerReport, AnalysisError>]) -> anyhow::Result<String> {
    let entries: Vec<JsonEntry<'_>> = results
        .iter()
        .map(|r| match r {
            Ok(report) => JsonEntry::Report(report),
            Err(e) => JsonEntry::Failure {
                symbol: e.symbol(),
                error: e.to_string(),
            },
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

fn print_table(results: &[Result<TickerReport, AnalysisError>]) {
    for result in results {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                println!("{}: error: {}", e.symbol(), e);
                println!();
                continue;
            }
        };

        let dates = report.result.dates();
        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => println!(
                "{} ({} bars, {} to {})",
                report.symbol,
                dates.len(),
                first,
                last
            ),
            _ => println!("{} (no bars)", report.symbol),
        }

        println!("  {:<22} {:>10} {:>10} {:>12}", "Estimator", "Latest", "Max", "As of");
        for kind in report.result.kinds() {
            let series = report.result.series(kind);
            let latest = series.as_ref().and_then(|s| s.latest());
            let max = series.as_ref().and_then(|s| s.max());
            println!(
                "  {:<22} {:>10} {:>10} {:>12}",
                kind.label(),
                fmt_value(latest.map(|(_, v)| v)),
                fmt_value(max),
                latest.map_or_else(|| "-".to_string(), |(d, _)| d.to_string())
            );
        }

        if !report.flagged.is_empty() {
            println!("  {} bar(s) with open/close outside high-low", report.flagged.len());
        }

        if report.spikes.is_empty() {
            println!("  No spikes");
        } else {
            for spike in &report.spikes {
                println!("  {}  {}", spike.date, spike.label);
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::RawBar;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: AnalyzeArgs,
    }

    fn args(extra: &[&str]) -> AnalyzeArgs {
        let mut argv = vec!["analyze", "AAPL, msft"];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    fn listed() -> Vec<String> {
        vec!["AAPL".to_string(), "MSFT".to_string()]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_is_three_years() {
        let request = args(&[]).request(&listed(), date(2024, 6, 14)).unwrap();
        assert_eq!(request.end, date(2024, 6, 15));
        assert_eq!(request.start, date(2021, 6, 15));
        assert!(request.tickers.contains("MSFT"));
    }

    #[test]
    fn test_explicit_range() {
        let request = args(&["--start", "2020-01-01", "--end", "2020-07-01"])
            .request(&listed(), date(2024, 6, 14))
            .unwrap();
        assert_eq!(request.start, date(2020, 1, 1));
        assert_eq!(request.end, date(2020, 7, 1));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = args(&["--start", "2024-01-01", "--end", "2023-01-01"])
            .request(&listed(), date(2024, 6, 14));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let settings = args(&["--window", "10", "--threshold", "3", "--kinds", "parkinson"])
            .settings(&Config::default())
            .unwrap();
        assert_eq!(settings.engine.window(), 10);
        assert_eq!(settings.detector.threshold(), 3.0);
        assert_eq!(settings.kinds, vec![VolatilityKind::Parkinson]);
    }

    #[tokio::test]
    async fn test_listed_tickers_are_parsed() {
        let tickers = args(&[]).resolve_tickers(&Config::default()).await.unwrap();
        assert_eq!(tickers, listed());
    }

    #[test]
    fn test_sp500_replaces_ticker_list() {
        let parsed = Harness::try_parse_from(["analyze", "--sp500", "--limit", "25"])
            .unwrap()
            .args;
        assert!(parsed.sp500);
        assert_eq!(parsed.tickers, None);
        assert_eq!(parsed.limit, Some(25));

        assert!(Harness::try_parse_from(["analyze"]).is_err());
        assert!(Harness::try_parse_from(["analyze", "AAPL", "--sp500"]).is_err());
        assert!(Harness::try_parse_from(["analyze", "AAPL", "--limit", "5"]).is_err());
    }

    #[test]
    fn test_invalid_window_rejected() {
        assert!(args(&["--window", "1"]).settings(&Config::default()).is_err());
    }

    #[test]
    fn test_json_output() {
        let settings = AnalysisSettings::new(3).unwrap();
        let start = date(2024, 1, 1);
        let bars: Vec<RawBar> = (0..6)
            .map(|i| {
                let c = 100.0 + (i % 2) as f64;
                RawBar::new(start + Duration::days(i), c, c + 1.0, c - 1.0, c)
            })
            .collect();
        let results = vec![
            crate::analysis::analyze_ticker("AAPL", bars, &settings),
            Err(AnalysisError::MissingTicker("GONE".to_string())),
        ];

        let json: serde_json::Value = serde_json::from_str(&to_json(&results).unwrap()).unwrap();
        assert_eq!(json[0]["symbol"], "AAPL");
        assert_eq!(json[0]["closes"].as_array().unwrap().len(), 6);
        assert_eq!(json[1]["symbol"], "GONE");
        assert!(json[1]["error"].as_str().unwrap().contains("GONE"));
    }
}
