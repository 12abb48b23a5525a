//! Formula selection: year regimes, split modes and ski-rack ownership.

use rust_decimal::Decimal;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::lenient;
use crate::month::Month;

/// The family of split formulas in force for a year.
///
/// Derived from the year alone, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearRegime {
    /// Before 2019: no split is computed, the payable is always zero.
    NoCalculation,
    /// 2019 through 2025.
    Legacy,
    /// 2026 onwards.
    Current,
}

impl YearRegime {
    /// First year with a computed split.
    pub const FIRST_LEGACY_YEAR: i32 = 2019;
    /// First year governed by the current formulas.
    pub const FIRST_CURRENT_YEAR: i32 = 2026;

    /// The regime for a year.
    #[must_use]
    pub const fn for_year(year: i32) -> Self {
        if year < Self::FIRST_LEGACY_YEAR {
            Self::NoCalculation
        } else if year < Self::FIRST_CURRENT_YEAR {
            Self::Legacy
        } else {
            Self::Current
        }
    }
}

impl fmt::Display for YearRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCalculation => write!(f, "none (before {})", Self::FIRST_LEGACY_YEAR),
            Self::Legacy => write!(
                f,
                "legacy ({}-{})",
                Self::FIRST_LEGACY_YEAR,
                Self::FIRST_CURRENT_YEAR - 1
            ),
            Self::Current => write!(f, "current ({}+)", Self::FIRST_CURRENT_YEAR),
        }
    }
}

/// Owner/operator split convention, selectable per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SplitMode {
    /// 50/50 convention (the default).
    #[default]
    Mode50,
    /// 70/30 convention; the owner carries the category expenses.
    Mode70,
}

impl SplitMode {
    /// The numeric tag used in ledger snapshots.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Mode50 => 50,
            Self::Mode70 => 70,
        }
    }

    /// Map a numeric tag to a mode; anything but 70 is the default mode.
    #[must_use]
    pub fn from_tag(tag: Decimal) -> Self {
        if tag == Decimal::from(Self::Mode70.tag()) {
            Self::Mode70
        } else {
            Self::Mode50
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Serialize for SplitMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.tag())
    }
}

impl<'de> Deserialize<'de> for SplitMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::decimal(deserializer).map(Self::from_tag)
    }
}

/// Who owns the ski racks rented out with the car in a given month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SkiRacksOwner {
    /// The operator (tag `"GLA"`, the default).
    #[default]
    Gla,
    /// Anyone else, usually the car owner.
    Other(String),
}

impl SkiRacksOwner {
    /// The operator's owner tag.
    pub const GLA_TAG: &'static str = "GLA";

    /// Interpret an owner tag. Only the exact tag `"GLA"` selects the operator.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag == Self::GLA_TAG {
            Self::Gla
        } else {
            Self::Other(tag.to_string())
        }
    }

    /// The owner tag as stored.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Gla => Self::GLA_TAG,
            Self::Other(tag) => tag,
        }
    }

    /// Whether the operator owns the racks.
    #[must_use]
    pub const fn is_gla(&self) -> bool {
        matches!(self, Self::Gla)
    }
}

impl fmt::Display for SkiRacksOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for SkiRacksOwner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

struct OwnerVisitor;

impl<'de> Visitor<'de> for OwnerVisitor {
    type Value = SkiRacksOwner;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an owner tag")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::from_tag(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::Other(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::Other(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::Other(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::Other(v.to_string()))
    }

    // An unset tag means the default owner.
    fn visit_unit<E: de::Error>(self) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::Gla)
    }

    fn visit_none<E: de::Error>(self) -> Result<SkiRacksOwner, E> {
        Ok(SkiRacksOwner::Gla)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<SkiRacksOwner, D::Error> {
        deserializer.deserialize_any(Self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SkiRacksOwner, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(SkiRacksOwner::Gla)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SkiRacksOwner, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(SkiRacksOwner::Gla)
    }
}

impl<'de> Deserialize<'de> for SkiRacksOwner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OwnerVisitor)
    }
}

/// Per-car, per-year formula configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaSettings {
    /// Split mode by month; absent months use [`SplitMode::Mode50`].
    #[serde(default, deserialize_with = "lenient::month_map")]
    pub month_modes: BTreeMap<Month, SplitMode>,
    /// Ski-rack owner by month; absent months use [`SkiRacksOwner::Gla`].
    #[serde(default, deserialize_with = "lenient::month_map")]
    pub ski_racks_owner: BTreeMap<Month, SkiRacksOwner>,
}

impl FormulaSettings {
    /// Create settings with every month at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode for a month.
    #[must_use]
    pub fn with_mode(mut self, month: Month, mode: SplitMode) -> Self {
        self.month_modes.insert(month, mode);
        self
    }

    /// Set the ski-rack owner for a month.
    #[must_use]
    pub fn with_ski_racks_owner(mut self, month: Month, owner: SkiRacksOwner) -> Self {
        self.ski_racks_owner.insert(month, owner);
        self
    }

    /// The split mode in force for `month`.
    #[must_use]
    pub fn mode(&self, month: Month) -> SplitMode {
        self.month_modes.get(&month).copied().unwrap_or_default()
    }

    /// The ski-rack owner for `month`.
    #[must_use]
    pub fn ski_racks_owner(&self, month: Month) -> &SkiRacksOwner {
        const DEFAULT: &SkiRacksOwner = &SkiRacksOwner::Gla;
        self.ski_racks_owner.get(&month).unwrap_or(DEFAULT)
    }
}
