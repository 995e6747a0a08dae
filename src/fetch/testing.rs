//! Shared test doubles for the fetch layer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::ProviderError;
use crate::models::{Interval, RawRow, RawTimestamp, TimeRange};
use crate::normalize::FieldMap;
use crate::provider::{FetchProfile, MarketDataProvider};

/// Provider that replays a scripted sequence of responses. Once the
/// script runs out it keeps answering with empty row sets.
pub(crate) struct ScriptedProvider {
    pub id: &'static str,
    pub priority: u8,
    pub profile: FetchProfile,
    pub timezone: Tz,
    pub field_map: FieldMap,
    pub script: Mutex<VecDeque<Result<Vec<RawRow>, ProviderError>>>,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(id: &'static str, script: Vec<Result<Vec<RawRow>, ProviderError>>) -> Self {
        Self {
            id,
            priority: 10,
            profile: fast_profile(3),
            timezone: Tz::UTC,
            field_map: FieldMap::yahoo_style(),
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_profile(mut self, profile: FetchProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn source_timezone(&self) -> Tz {
        self.timezone
    }

    fn field_map(&self) -> FieldMap {
        self.field_map.clone()
    }

    fn profile(&self) -> FetchProfile {
        self.profile.clone()
    }

    async fn fetch(
        &self,
        _symbol: &str,
        _range: TimeRange,
        _interval: Interval,
    ) -> Result<Vec<RawRow>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }
}

/// A profile with all waits collapsed so scenarios run fast in real time.
pub(crate) fn fast_profile(max_retries: u32) -> FetchProfile {
    FetchProfile {
        max_batch_span: ChronoDuration::days(180),
        max_retries,
        base_backoff: Duration::from_millis(1),
        backoff_cap: Duration::from_millis(10),
        transient_delay: Duration::from_millis(1),
        inter_batch_delay: (Duration::ZERO, Duration::ZERO),
        min_request_spacing: Duration::ZERO,
    }
}

/// Yahoo-labeled daily rows starting at `start_day` of 2024-01.
pub(crate) fn sample_rows_from(start_day: u32, n: usize) -> Vec<RawRow> {
    (0..n)
        .map(|i| {
            let ts = Utc
                .with_ymd_and_hms(2024, 1, start_day + i as u32, 0, 0, 0)
                .unwrap();
            RawRow::new(RawTimestamp::Utc(ts))
                .with_cell("Open", 100.0 + i as f64)
                .with_cell("High", 101.0 + i as f64)
                .with_cell("Low", 99.0 + i as f64)
                .with_cell("Close", 100.5 + i as f64)
                .with_cell("Volume", 1000.0)
        })
        .collect()
}

pub(crate) fn sample_rows(n: usize) -> Vec<RawRow> {
    sample_rows_from(1, n)
}

pub(crate) fn rate_limited(provider: &str) -> ProviderError {
    ProviderError::RateLimited {
        provider: provider.to_string(),
    }
}
