//! Merge, repair, and schema-map raw batches into a canonical series.
//!
//! The processing order is a contract, not an implementation detail:
//! timestamps to UTC, labels to canonical fields, numeric coercion, sort,
//! dedup (keep first), truncate to the requested window, defect repair,
//! then forward/backward gap filling. Anything still missing after all of
//! that surfaces as a non-finite cell for the validator to reject.

use chrono::{DateTime, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use log::{info, warn};

use crate::errors::FeedError;
use crate::models::{CanonicalBar, CanonicalSeries, RawBatch, RawTimestamp};
use crate::provider::MarketDataProvider;

use super::schema::{coerce_numeric, CanonicalField, FieldMap};

/// A row mid-normalization: canonical fields, cells still optional.
#[derive(Clone, Copy, Debug, Default)]
struct WorkingRow {
    timestamp: DateTime<Utc>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    amount: Option<f64>,
}

impl WorkingRow {
    fn get(&self, field: CanonicalField) -> Option<f64> {
        match field {
            CanonicalField::Open => self.open,
            CanonicalField::High => self.high,
            CanonicalField::Low => self.low,
            CanonicalField::Close => self.close,
            CanonicalField::Volume => self.volume,
            CanonicalField::Amount => self.amount,
        }
    }

    fn set(&mut self, field: CanonicalField, value: Option<f64>) {
        match field {
            CanonicalField::Open => self.open = value,
            CanonicalField::High => self.high = value,
            CanonicalField::Low => self.low = value,
            CanonicalField::Close => self.close = value,
            CanonicalField::Volume => self.volume = value,
            CanonicalField::Amount => self.amount = value,
        }
    }
}

const FILLABLE: [CanonicalField; 6] = [
    CanonicalField::Open,
    CanonicalField::High,
    CanonicalField::Low,
    CanonicalField::Close,
    CanonicalField::Volume,
    CanonicalField::Amount,
];

/// Turns one provider's raw batches into a canonical series.
pub struct Normalizer {
    provider: String,
    timezone: Tz,
    field_map: FieldMap,
}

impl Normalizer {
    pub fn new(provider: impl Into<String>, timezone: Tz, field_map: FieldMap) -> Self {
        Self {
            provider: provider.into(),
            timezone,
            field_map,
        }
    }

    /// Configure from the provider whose batches are being merged.
    pub fn for_provider(provider: &dyn MarketDataProvider) -> Self {
        Self::new(provider.id(), provider.source_timezone(), provider.field_map())
    }

    /// Merge `batches` into a candidate series, keeping at most the most
    /// recent `max_rows` rows when set.
    ///
    /// Rejects with [`FeedError::MissingRequiredField`] when the
    /// provider's field map leaves open/high/low/close uncovered.
    pub fn normalize(
        &self,
        batches: &[RawBatch],
        max_rows: Option<usize>,
    ) -> Result<CanonicalSeries, FeedError> {
        if let Some(field) = self.field_map.missing_required() {
            return Err(FeedError::MissingRequiredField {
                provider: self.provider.clone(),
                field,
            });
        }

        let mut rows = self.collect_rows(batches);

        // Stable sort: equal timestamps keep concatenation order, so the
        // keep-first dedup below keeps the earliest-arrived row.
        rows.sort_by_key(|row| row.timestamp);
        rows.dedup_by_key(|row| row.timestamp);

        if let Some(max) = max_rows {
            if rows.len() > max {
                rows.drain(..rows.len() - max);
            }
        }

        repair_open(&mut rows);
        repair_volume(&mut rows);
        repair_amount(&mut rows);
        fill_gaps(&mut rows);

        let bars = rows
            .into_iter()
            .map(|row| CanonicalBar {
                timestamp: row.timestamp,
                open: row.open.unwrap_or(f64::NAN),
                high: row.high.unwrap_or(f64::NAN),
                low: row.low.unwrap_or(f64::NAN),
                close: row.close.unwrap_or(f64::NAN),
                volume: row.volume.unwrap_or(f64::NAN),
                amount: row.amount.unwrap_or(f64::NAN),
            })
            .collect();

        Ok(CanonicalSeries::new(bars))
    }

    fn collect_rows(&self, batches: &[RawBatch]) -> Vec<WorkingRow> {
        let mut rows = Vec::with_capacity(batches.iter().map(|b| b.rows.len()).sum());

        for batch in batches {
            for raw in &batch.rows {
                let Some(timestamp) = self.to_utc(raw.timestamp) else {
                    continue;
                };

                let mut row = WorkingRow {
                    timestamp,
                    ..WorkingRow::default()
                };
                for (label, value) in &raw.cells {
                    if let Some(field) = self.field_map.target(label) {
                        row.set(field, coerce_numeric(value));
                    }
                }
                rows.push(row);
            }
        }

        rows
    }

    /// Convert a raw timestamp to a UTC instant, applying the provider's
    /// declared source timezone to naive stamps.
    fn to_utc(&self, raw: RawTimestamp) -> Option<DateTime<Utc>> {
        match raw {
            RawTimestamp::Utc(instant) => Some(instant),
            RawTimestamp::Naive(naive) => match self.timezone.from_local_datetime(&naive) {
                LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
                LocalResult::None => {
                    warn!(
                        "'{}': dropping row at {} with no valid {} mapping",
                        self.provider, naive, self.timezone
                    );
                    None
                }
            },
        }
    }
}

/// A zero or missing open is replaced by the previous bar's close; the
/// first row falls back to its own close.
fn repair_open(rows: &mut [WorkingRow]) {
    let mut repaired = 0usize;
    let mut prev_close: Option<f64> = None;

    for row in rows.iter_mut() {
        let bad = match row.open {
            None => true,
            Some(open) => open == 0.0 || !open.is_finite(),
        };
        if bad {
            row.open = prev_close.or(row.close);
            repaired += 1;
        }
        prev_close = row.close;
    }

    if repaired > 0 {
        info!("repaired {} invalid opening price(s)", repaired);
    }
}

/// Missing volume defaults to zero.
fn repair_volume(rows: &mut [WorkingRow]) {
    for row in rows.iter_mut() {
        if row.volume.is_none() {
            row.volume = Some(0.0);
        }
    }
}

/// A missing or all-zero amount column is derived as close * volume.
fn repair_amount(rows: &mut [WorkingRow]) {
    let all_zero_or_missing = rows
        .iter()
        .all(|row| matches!(row.amount, None | Some(0.0)));
    if !all_zero_or_missing {
        return;
    }

    for row in rows.iter_mut() {
        row.amount = match (row.close, row.volume) {
            (Some(close), Some(volume)) => Some(close * volume),
            _ => None,
        };
    }
}

/// Forward-fill then back-fill every column so no gaps reach the caller.
fn fill_gaps(rows: &mut [WorkingRow]) {
    for field in FILLABLE {
        let mut last: Option<f64> = None;
        for row in rows.iter_mut() {
            match row.get(field) {
                Some(value) => last = Some(value),
                None => row.set(field, last),
            }
        }

        let mut next: Option<f64> = None;
        for row in rows.iter_mut().rev() {
            match row.get(field) {
                Some(value) => next = Some(value),
                None => row.set(field, next),
            }
        }
    }
}
