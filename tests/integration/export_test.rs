//! Integration tests for Parquet export

use crate::{ranged_bars, wave};
use chrono::NaiveDate;
use realized_vol::analysis::{analyze_ticker, AnalysisSettings};
use realized_vol::data::{VolatilityReader, VolatilityTable, VolatilityWriter};
use realized_vol::model::VolatilityKind;
use tempfile::TempDir;

#[test]
fn test_analysis_export_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let writer = VolatilityWriter::new(temp_dir.path());
    let settings = AnalysisSettings::new(10).unwrap();

    let tables: Vec<VolatilityTable> = ["QQQ", "IWM"]
        .into_iter()
        .enumerate()
        .map(|(i, symbol)| {
            let report = analyze_ticker(symbol, ranged_bars(&wave(50 + i * 10)), &settings).unwrap();
            VolatilityTable {
                ticker: report.symbol,
                result: report.result,
            }
        })
        .collect();

    let path = temp_dir.path().join("batch.parquet");
    assert_eq!(writer.write(&path, &tables).unwrap(), 110);

    let read = VolatilityReader::new(&path).read().unwrap();
    assert_eq!(read, tables);
    // Leading undefined values come back as undefined, not zero
    assert!(read[0].result.column(VolatilityKind::Realized).unwrap()[..9]
        .iter()
        .all(Option::is_none));
}

#[test]
fn test_export_per_ticker_file() {
    let temp_dir = TempDir::new().unwrap();
    let writer = VolatilityWriter::new(temp_dir.path().join("out"));
    let settings = AnalysisSettings::new(5)
        .unwrap()
        .with_kinds(vec![VolatilityKind::HodgesTompkins]);

    let report = analyze_ticker("TLT", ranged_bars(&wave(30)), &settings).unwrap();
    let table = VolatilityTable {
        ticker: report.symbol.clone(),
        result: report.result.clone(),
    };
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();

    let path = writer.export(&table, start, end).unwrap();
    assert!(path.exists());

    let read = VolatilityReader::new(path).read().unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].ticker, "TLT");
    assert_eq!(
        read[0].result.kinds().collect::<Vec<_>>(),
        vec![VolatilityKind::HodgesTompkins]
    );
    assert_eq!(read[0].result, report.result);
}
