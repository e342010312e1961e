//! Volatility result types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The four estimator kinds, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityKind {
    /// Close-to-close standard deviation of log returns
    Realized,
    /// High/low range estimator
    Parkinson,
    /// Open/high/low/close estimator
    GarmanKlass,
    /// Close-to-close with small-sample bias correction
    HodgesTompkins,
}

impl VolatilityKind {
    pub const ALL: [VolatilityKind; 4] = [
        VolatilityKind::Realized,
        VolatilityKind::Parkinson,
        VolatilityKind::GarmanKlass,
        VolatilityKind::HodgesTompkins,
    ];

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            VolatilityKind::Realized => "Realized VOL",
            VolatilityKind::Parkinson => "Parkinson VOL",
            VolatilityKind::GarmanKlass => "Garman-Klass VOL",
            VolatilityKind::HodgesTompkins => "Hodges-Tompkins VOL",
        }
    }

    /// Column name used in exports
    pub fn column_name(&self) -> &'static str {
        match self {
            VolatilityKind::Realized => "realized_vol",
            VolatilityKind::Parkinson => "parkinson_vol",
            VolatilityKind::GarmanKlass => "garman_klass_vol",
            VolatilityKind::HodgesTompkins => "hodges_tompkins_vol",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.column_name() == name)
    }
}

impl fmt::Display for VolatilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VolatilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(&['-', ' '][..], "_").as_str() {
            "realized" | "realized_vol" | "rv" => Ok(VolatilityKind::Realized),
            "parkinson" | "parkinson_vol" => Ok(VolatilityKind::Parkinson),
            "garman_klass" | "garman_klass_vol" | "gk" => Ok(VolatilityKind::GarmanKlass),
            "hodges_tompkins" | "hodges_tompkins_vol" | "ht" => Ok(VolatilityKind::HodgesTompkins),
            other => Err(format!("unknown volatility kind: {}", other)),
        }
    }
}

/// One dated volatility reading; `value` is `None` where the estimator is
/// undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A single named volatility series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySeries {
    pub kind: VolatilityKind,
    pub points: Vec<VolPoint>,
}

impl VolatilitySeries {
    pub fn new(kind: VolatilityKind, points: Vec<VolPoint>) -> Self {
        Self { kind, points }
    }

    /// Zip dates with values; extra entries on either side are dropped
    pub fn from_values(kind: VolatilityKind, dates: &[NaiveDate], values: &[Option<f64>]) -> Self {
        let points = dates
            .iter()
            .zip(values)
            .map(|(&date, &value)| VolPoint { date, value })
            .collect();
        Self { kind, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with a defined value
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Largest defined value
    pub fn max(&self) -> Option<f64> {
        self.defined().map(|(_, v)| v).reduce(f64::max)
    }

    /// Most recent defined reading
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.defined().last()
    }
}

/// Column-aligned volatility table sharing the price series' date index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityResult {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<VolatilityKind, Vec<Option<f64>>>,
}

impl VolatilityResult {
    /// Empty table over the given dates
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
        }
    }

    /// Build from columns; `None` if any column is misaligned with `dates`
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: impl IntoIterator<Item = (VolatilityKind, Vec<Option<f64>>)>,
    ) -> Option<Self> {
        let mut result = Self::new(dates);
        for (kind, values) in columns {
            if values.len() != result.dates.len() {
                return None;
            }
            result.columns.insert(kind, values);
        }
        Some(result)
    }

    pub(crate) fn insert(&mut self, kind: VolatilityKind, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.insert(kind, values);
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Kinds present, in display order
    pub fn kinds(&self) -> impl Iterator<Item = VolatilityKind> + '_ {
        self.columns.keys().copied()
    }

    pub fn column(&self, kind: VolatilityKind) -> Option<&[Option<f64>]> {
        self.columns.get(&kind).map(Vec::as_slice)
    }

    /// Dated view of one column
    pub fn series(&self, kind: VolatilityKind) -> Option<VolatilitySeries> {
        self.column(kind)
            .map(|values| VolatilitySeries::from_values(kind, &self.dates, values))
    }

    /// Copy of the table restricted to `kinds`
    pub fn select(&self, kinds: &[VolatilityKind]) -> Self {
        let columns = self
            .columns
            .iter()
            .filter(|(kind, _)| kinds.contains(*kind))
            .map(|(kind, values)| (*kind, values.clone()))
            .collect();
        Self {
            dates: self.dates.clone(),
            columns,
        }
    }
}
