//! Permissive decoding of ledger values.
//!
//! Ledger snapshots come from a data-entry UI, so numeric fields may be
//! missing, `null`, strings, or outright garbage. All of these decode to zero
//! instead of failing the whole snapshot. Callers that care about data quality
//! must inspect the raw input themselves; see the loader's check report.
//!
//! Amounts are capped at [`MAX_AMOUNT`] in magnitude so that sums and products
//! over a month of figures stay inside `Decimal` range.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::month::Month;

/// Parse a decimal from user-entered text, returning `None` if it isn't numeric.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

/// Largest magnitude a decoded amount may have (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Cap `value` to `-MAX_AMOUNT..=MAX_AMOUNT`.
#[must_use]
pub fn clamp_amount(value: Decimal) -> Decimal {
    value.clamp(-MAX_AMOUNT, MAX_AMOUNT)
}

/// Whether `value` sits on the cap, i.e. was probably clamped while decoding.
#[must_use]
pub fn at_amount_limit(value: Decimal) -> bool {
    value.abs() >= MAX_AMOUNT
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Ok(Decimal::from_f64(v).unwrap_or(Decimal::ZERO))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(parse_decimal(v).unwrap_or(Decimal::ZERO))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(Self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Decimal, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Decimal, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }
}

/// Decode a currency value, treating anything non-numeric as zero.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor).map(clamp_amount)
}

/// A decimal that decodes permissively; used for map values and sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LenientDecimal(pub Decimal);

impl<'de> Deserialize<'de> for LenientDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decimal(deserializer).map(Self)
    }
}

/// Sentinel for a month number that could not be decoded.
pub const INVALID_MONTH: u32 = 0;

struct MonthNumberVisitor;

impl<'de> Visitor<'de> for MonthNumberVisitor {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a month number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
        Ok(u32::try_from(v).unwrap_or(INVALID_MONTH))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
        Ok(u32::try_from(v).unwrap_or(INVALID_MONTH))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
        if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
            Ok(v as u32)
        } else {
            Ok(INVALID_MONTH)
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
        Ok(v.trim().parse().unwrap_or(INVALID_MONTH))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<u32, E> {
        Ok(INVALID_MONTH)
    }

    fn visit_unit<E: de::Error>(self) -> Result<u32, E> {
        Ok(INVALID_MONTH)
    }

    fn visit_none<E: de::Error>(self) -> Result<u32, E> {
        Ok(INVALID_MONTH)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<u32, D::Error> {
        deserializer.deserialize_any(Self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<u32, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(INVALID_MONTH)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<u32, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(INVALID_MONTH)
    }
}

/// Decode the month number of a ledger row.
///
/// Rows keep the raw number so that out-of-range months can be reported;
/// anything undecodable becomes [`INVALID_MONTH`].
pub fn month_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(MonthNumberVisitor)
}

/// A month number that decodes permissively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenientMonth(pub u32);

impl<'de> Deserialize<'de> for LenientMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        month_number(deserializer).map(Self)
    }
}

struct IdentifierVisitor;

impl<'de> Visitor<'de> for IdentifierVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or number identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.trim().to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    // 100.0 is car "100", not "100.0"
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(Decimal::from_f64(v).map_or_else(|| v.to_string(), |d| d.normalize().to_string()))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(Self)
    }
}

/// Decode an identifier written either as a string or as a number.
pub fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IdentifierVisitor)
}

struct MonthMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for MonthMapVisitor<V> {
    type Value = BTreeMap<Month, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by month number")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut months = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            match key.trim().parse::<Month>() {
                Ok(month) => {
                    months.insert(month, map.next_value()?);
                }
                Err(_) => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(months)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(BTreeMap::new())
    }

    fn visit_str<E: de::Error>(self, _v: &str) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(BTreeMap::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// Decode a `{ "<month>": value }` object, dropping keys that aren't months.
///
/// Anything other than an object (`[]`, `null`, a scalar) decodes as empty.
pub fn month_map<'de, D, V>(deserializer: D) -> Result<BTreeMap<Month, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    deserializer.deserialize_any(MonthMapVisitor(PhantomData))
}
