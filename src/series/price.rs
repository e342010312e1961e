//! Validated, gap-filled daily price series

use super::{Bar, FillPolicy, PriceField, RawBar};
use crate::error::{Result, VolError};
use chrono::NaiveDate;

/// An immutable OHLC table indexed by strictly increasing trading dates.
///
/// Stored column-wise so the estimators can walk aligned slices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    fill_policy: FillPolicy,
    flagged: Vec<NaiveDate>,
}

impl PriceSeries {
    /// Normalize raw bars into a price series.
    ///
    /// Sorts by date, keeps the first bar of each date, applies the fill
    /// policy per column and then validates every bar. `high < low` and
    /// non-positive prices are errors; an open or close outside the day's
    /// range is kept but flagged.
    pub fn normalize(raw: impl IntoIterator<Item = RawBar>, fill_policy: FillPolicy) -> Result<Self> {
        let mut bars: Vec<RawBar> = raw.into_iter().collect();
        // Stable sort keeps the source order among equal dates
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);

        if bars.is_empty() {
            return Err(VolError::EmptyData);
        }

        let mut dates = Vec::with_capacity(bars.len());
        let mut open = Vec::with_capacity(bars.len());
        let mut high = Vec::with_capacity(bars.len());
        let mut low = Vec::with_capacity(bars.len());
        let mut close = Vec::with_capacity(bars.len());

        for bar in &bars {
            dates.push(bar.date);
            open.push(finite(bar.open));
            high.push(finite(bar.high));
            low.push(finite(bar.low));
            close.push(finite(bar.close));
        }

        if fill_policy == FillPolicy::ForwardBackward {
            for column in [&mut open, &mut high, &mut low, &mut close] {
                forward_fill(column);
                back_fill(column);
            }
        }

        let mut series = Self {
            dates,
            open,
            high,
            low,
            close,
            fill_policy,
            flagged: Vec::new(),
        };
        series.validate()?;

        Ok(series)
    }

    fn validate(&mut self) -> Result<()> {
        let mut flagged = Vec::new();

        for bar in self.bars() {
            for value in [bar.open, bar.high, bar.low, bar.close].into_iter().flatten() {
                if value <= 0.0 {
                    return Err(VolError::MalformedBar {
                        date: bar.date,
                        reason: format!("non-positive price {}", value),
                    });
                }
            }

            let (Some(high), Some(low)) = (bar.high, bar.low) else {
                continue;
            };

            if high < low {
                return Err(VolError::MalformedBar {
                    date: bar.date,
                    reason: format!("high {} below low {}", high, low),
                });
            }

            let outside = |v: Option<f64>| v.is_some_and(|v| v > high || v < low);
            if outside(bar.open) || outside(bar.close) {
                tracing::warn!(
                    date = %bar.date,
                    open = ?bar.open,
                    close = ?bar.close,
                    high,
                    low,
                    "Open/close outside daily range"
                );
                flagged.push(bar.date);
            }
        }

        self.flagged = flagged;
        Ok(())
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a constructed series
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Trading dates, strictly increasing
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// One price column, aligned with [`dates`](Self::dates)
    pub fn column(&self, field: PriceField) -> &[Option<f64>] {
        match field {
            PriceField::Open => &self.open,
            PriceField::High => &self.high,
            PriceField::Low => &self.low,
            PriceField::Close => &self.close,
        }
    }

    pub fn opens(&self) -> &[Option<f64>] {
        &self.open
    }

    pub fn highs(&self) -> &[Option<f64>] {
        &self.high
    }

    pub fn lows(&self) -> &[Option<f64>] {
        &self.low
    }

    pub fn closes(&self) -> &[Option<f64>] {
        &self.close
    }

    /// Iterate bars in date order
    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).map(|i| Bar {
            date: self.dates[i],
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
        })
    }

    /// Number of bars with all four prices present
    pub fn valid_len(&self) -> usize {
        self.bars().filter(Bar::is_complete).count()
    }

    /// Fill policy the series was built with
    pub fn fill_policy(&self) -> FillPolicy {
        self.fill_policy
    }

    /// Dates whose open or close lies outside the high/low range
    pub fn flagged_dates(&self) -> &[NaiveDate] {
        &self.flagged
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn forward_fill(column: &mut [Option<f64>]) {
    let mut last = None;
    for value in column.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
}

fn back_fill(column: &mut [Option<f64>]) {
    let Some(first) = column.iter().flatten().next().copied() else {
        return;
    };
    for value in column.iter_mut().take_while(|v| v.is_none()) {
        *value = Some(first);
    }
}
