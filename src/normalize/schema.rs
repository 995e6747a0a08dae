//! Canonical schema and per-provider field mapping.
//!
//! Every provider labels its columns differently (English, abbreviated,
//! Chinese). Each provider declares a fixed [`FieldMap`] from its own
//! labels to the canonical fields; the mapping is applied exactly once,
//! in the normalizer. A provider whose map does not cover a required
//! field is rejected outright rather than silently defaulted.

use std::collections::HashMap;

use serde_json::Value;

/// The fixed canonical column set every source is mapped into.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CanonicalField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Amount,
}

impl CanonicalField {
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Open => "open",
            CanonicalField::High => "high",
            CanonicalField::Low => "low",
            CanonicalField::Close => "close",
            CanonicalField::Volume => "volume",
            CanonicalField::Amount => "amount",
        }
    }

    /// Fields a provider must map; volume and amount are repairable.
    pub const REQUIRED: [CanonicalField; 4] = [
        CanonicalField::Open,
        CanonicalField::High,
        CanonicalField::Low,
        CanonicalField::Close,
    ];
}

/// Fixed mapping from provider-native labels to canonical fields.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    entries: HashMap<String, CanonicalField>,
}

impl FieldMap {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, CanonicalField)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(l, f)| (l.into(), f)).collect(),
        }
    }

    /// Yahoo-style English labels.
    pub fn yahoo_style() -> Self {
        Self::from_pairs([
            ("Open", CanonicalField::Open),
            ("High", CanonicalField::High),
            ("Low", CanonicalField::Low),
            ("Close", CanonicalField::Close),
            ("Volume", CanonicalField::Volume),
        ])
    }

    /// Chinese-label daily feeds (开盘/收盘/最高/最低/成交量/成交额).
    pub fn chinese_daily() -> Self {
        Self::from_pairs([
            ("开盘", CanonicalField::Open),
            ("收盘", CanonicalField::Close),
            ("最高", CanonicalField::High),
            ("最低", CanonicalField::Low),
            ("成交量", CanonicalField::Volume),
            ("成交额", CanonicalField::Amount),
        ])
    }

    /// The canonical field a provider label maps to, if any.
    pub fn target(&self, label: &str) -> Option<CanonicalField> {
        self.entries.get(label).copied()
    }

    /// First required canonical field this map does not cover, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        CanonicalField::REQUIRED
            .iter()
            .find(|field| !self.entries.values().any(|f| f == *field))
            .map(|field| field.name())
    }
}

/// Coerce a loosely-typed provider cell to a finite number.
///
/// Recognized missing-value sentinels ("--", "", "nan") and embedded
/// thousand-separators map to `None`; so do non-finite numbers and
/// anything unparseable.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            if cleaned.is_empty()
                || cleaned == "--"
                || cleaned.eq_ignore_ascii_case("nan")
                || cleaned.eq_ignore_ascii_case("null")
            {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}
