//! Parquet export of volatility tables

use crate::model::{VolatilityKind, VolatilityResult};
use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One ticker's computed volatility
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityTable {
    pub ticker: String,
    pub result: VolatilityResult,
}

/// Export schema for the given volatility columns.
///
/// `ticker` and `date` are always present; estimator columns are nullable
/// and appear in display order.
pub fn volatility_schema(kinds: &[VolatilityKind]) -> Schema {
    let mut fields = vec![
        Field::new("ticker", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
    ];
    for kind in VolatilityKind::ALL {
        if kinds.contains(&kind) {
            fields.push(Field::new(kind.column_name(), DataType::Float64, true));
        }
    }
    Schema::new(fields)
}

/// Writes volatility tables to Snappy-compressed Parquet
pub struct VolatilityWriter {
    output_dir: PathBuf,
}

impl VolatilityWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// File path for one ticker's export over a date range
    pub fn file_path(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> PathBuf {
        let filename = format!(
            "{}_{}_{}.parquet",
            ticker,
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        );
        self.output_dir.join(filename)
    }

    /// Write one table to its default path and return that path
    pub fn export(
        &self,
        table: &VolatilityTable,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<PathBuf> {
        let path = self.file_path(&table.ticker, start, end);
        self.write(&path, std::slice::from_ref(table))?;
        Ok(path)
    }

    /// Write tables to `path`, one row per ticker and date.
    ///
    /// Columns are the union of kinds across tables; a kind missing from one
    /// table is null for its rows. Returns the row count. Nothing is written
    /// when there are no rows.
    pub fn write(&self, path: &Path, tables: &[VolatilityTable]) -> anyhow::Result<usize> {
        let rows: usize = tables.iter().map(|t| t.result.len()).sum();
        if rows == 0 {
            return Ok(0);
        }

        self.ensure_dir()?;

        let kinds: Vec<VolatilityKind> = VolatilityKind::ALL
            .into_iter()
            .filter(|kind| tables.iter().any(|t| t.result.column(*kind).is_some()))
            .collect();
        let schema = Arc::new(volatility_schema(&kinds));
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        // Build arrays
        let tickers: Vec<&str> = tables
            .iter()
            .flat_map(|t| std::iter::repeat(t.ticker.as_str()).take(t.result.len()))
            .collect();
        let dates: Vec<i32> = tables
            .iter()
            .flat_map(|t| t.result.dates().iter().map(to_date32))
            .collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(tickers)),
            Arc::new(Date32Array::from(dates)),
        ];

        for &kind in &kinds {
            let values: Vec<Option<f64>> = tables
                .iter()
                .flat_map(|t| match t.result.column(kind) {
                    Some(column) => column.to_vec(),
                    None => vec![None; t.result.len()],
                })
                .collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        let batch = RecordBatch::try_new(schema, columns)?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, tables = tables.len(), rows, "Wrote volatility to Parquet");

        Ok(rows)
    }
}

/// Reader for exported volatility files
pub struct VolatilityReader {
    path: PathBuf,
}

impl VolatilityReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every table in the file, in the order tickers first appear
    pub fn read(&self) -> anyhow::Result<Vec<VolatilityTable>> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let reader = builder.build()?;

        let mut order: Vec<String> = Vec::new();
        let mut partial: HashMap<String, PartialTable> = HashMap::new();

        for batch_result in reader {
            let batch = batch_result?;

            let tickers = batch
                .column_by_name("ticker")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow::anyhow!("Invalid ticker column"))?;

            let dates = batch
                .column_by_name("date")
                .and_then(|c| c.as_any().downcast_ref::<Date32Array>())
                .ok_or_else(|| anyhow::anyhow!("Invalid date column"))?;

            let mut value_columns = Vec::new();
            for field in batch.schema().fields() {
                let Some(kind) = VolatilityKind::from_column_name(field.name()) else {
                    continue;
                };
                let values = batch
                    .column_by_name(field.name())
                    .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
                    .ok_or_else(|| anyhow::anyhow!("Invalid {} column", field.name()))?;
                value_columns.push((kind, values.clone()));
            }

            for i in 0..batch.num_rows() {
                let ticker = tickers.value(i);
                let date = dates
                    .value_as_date(i)
                    .ok_or_else(|| anyhow::anyhow!("Invalid date at row {}", i))?;

                if !partial.contains_key(ticker) {
                    order.push(ticker.to_string());
                }
                let table = partial.entry(ticker.to_string()).or_default();

                table.dates.push(date);
                for (kind, values) in &value_columns {
                    let value = (!values.is_null(i)).then(|| values.value(i));
                    table.columns.entry(*kind).or_default().push(value);
                }
            }
        }

        order
            .into_iter()
            .map(|ticker| {
                let table = partial.remove(&ticker).unwrap_or_default();
                let result = VolatilityResult::from_columns(table.dates, table.columns)
                    .ok_or_else(|| anyhow::anyhow!("Misaligned columns for {}", ticker))?;
                Ok(VolatilityTable { ticker, result })
            })
            .collect()
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Default)]
struct PartialTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<VolatilityKind, Vec<Option<f64>>>,
}

fn to_date32(date: &NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}
