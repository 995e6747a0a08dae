use std::fmt;

use chrono::Duration;

/// Native cadence of a series.
///
/// Daily bars step one calendar day; minute bars step their own width.
/// This is also what the future timestamp index for the forecasting
/// consumer is generated from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Interval {
    Daily,
    /// N-minute bars (1, 5, 15, 30, 60 are what upstreams commonly serve).
    Minutes(u32),
}

impl Interval {
    /// The step between consecutive bars at this cadence.
    pub fn step(&self) -> Duration {
        match self {
            Interval::Daily => Duration::days(1),
            Interval::Minutes(n) => Duration::minutes(i64::from(*n)),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => write!(f, "daily"),
            Interval::Minutes(n) => write!(f, "{}m", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step() {
        assert_eq!(Interval::Daily.step(), Duration::days(1));
        assert_eq!(Interval::Minutes(5).step(), Duration::minutes(5));
        assert_eq!(Interval::Minutes(60).step(), Duration::hours(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::Daily.to_string(), "daily");
        assert_eq!(Interval::Minutes(15).to_string(), "15m");
    }
}
