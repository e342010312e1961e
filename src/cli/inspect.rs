//! Inspect command implementation

use super::fmt_value;
use crate::config::Config;
use crate::data::{VolatilityReader, VolatilityTable};
use crate::model::VolatilityKind;
use crate::signal::SpikeDetector;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Parquet file written by `analyze --export`
    pub file: PathBuf,

    /// Spike threshold in standard deviations
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Series to scan for spikes
    #[arg(long)]
    pub source: Option<VolatilityKind>,
}

impl InspectArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let tables = VolatilityReader::new(&self.file).read()?;
        tracing::info!(path = ?self.file, tickers = tables.len(), "Read volatility export");

        let mut detector = SpikeDetector::from_config(&config.spikes);
        if let Some(threshold) = self.threshold {
            detector = SpikeDetector::new(threshold).with_max_annotations(config.spikes.max_annotations);
        }
        let source = self.source.unwrap_or(config.spikes.source);

        for table in &tables {
            for line in summarize(table, &detector, source) {
                println!("{}", line);
            }
            println!();
        }
        Ok(())
    }
}

/// Printable summary: per-series stats, then spikes in `source`
fn summarize(table: &VolatilityTable, detector: &SpikeDetector, source: VolatilityKind) -> Vec<String> {
    let result = &table.result;
    let mut lines = vec![format!("{} ({} rows)", table.ticker, result.len())];

    lines.push(format!(
        "  {:<22} {:>8} {:>10} {:>10} {:>10}",
        "Estimator", "Defined", "Mean", "Max", "Latest"
    ));
    for kind in result.kinds() {
        let Some(series) = result.series(kind) else {
            continue;
        };
        let values: Vec<f64> = series.defined().map(|(_, v)| v).collect();
        let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
        lines.push(format!(
            "  {:<22} {:>8} {:>10} {:>10} {:>10}",
            kind.label(),
            values.len(),
            fmt_value(mean),
            fmt_value(series.max()),
            fmt_value(series.latest().map(|(_, v)| v))
        ));
    }

    match result.series(source) {
        Some(series) => {
            let spikes = detector.detect(&series);
            lines.push(format!("  {} spike(s) in {}", spikes.len(), source));
            lines.extend(spikes.iter().map(|s| format!("    {}  {}", s.date, s.label)));
        }
        None => lines.push(format!("  {} not in file", source)),
    }

    lines
}
