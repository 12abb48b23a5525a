//! Workspace options parsing and storage.

use rust_decimal::RoundingStrategy;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Known option names.
const KNOWN_OPTIONS: &[&str] = &["title", "currency", "display_precision", "rounding"];

/// Decimal places shown when `display_precision` is not set.
const DEFAULT_DISPLAY_PRECISION: u32 = 2;

/// Largest accepted display precision.
const MAX_DISPLAY_PRECISION: u32 = 8;

/// Option validation warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionWarning {
    /// Warning code (O001, O002, O003).
    pub code: &'static str,
    /// Warning message.
    pub message: String,
    /// Option name.
    pub option: String,
    /// Option value.
    pub value: String,
}

impl fmt::Display for OptionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// How amounts are rounded for presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rounding {
    /// Round half away from zero (0.125 -> 0.13).
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding (0.125 -> 0.12).
    HalfEven,
}

impl Rounding {
    /// The `rust_decimal` strategy for this mode.
    #[must_use]
    pub const fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "half-away-from-zero" | "half_up" | "half-up" => Some(Self::HalfAwayFromZero),
            "half-even" | "half_even" | "bankers" => Some(Self::HalfEven),
            _ => None,
        }
    }
}

/// Workspace options.
///
/// Read from `options.json` beside the ledger snapshots, or from the
/// `options` object of a bundle file.
#[derive(Debug, Clone)]
pub struct Options {
    /// Title for reports.
    pub title: Option<String>,

    /// Currency code shown next to amounts.
    pub currency: String,

    /// Decimal places shown for amounts.
    pub display_precision: u32,

    /// Rounding used for presentation.
    pub rounding: Rounding,

    /// Options that have been set (for duplicate detection).
    #[doc(hidden)]
    pub set_options: HashSet<String>,

    /// Validation warnings collected during parsing.
    pub warnings: Vec<OptionWarning>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Create new options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            currency: "USD".to_string(),
            display_precision: DEFAULT_DISPLAY_PRECISION,
            rounding: Rounding::default(),
            set_options: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Apply every entry of a JSON options object.
    pub fn apply_json(&mut self, object: &BTreeMap<String, serde_json::Value>) {
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.set(key, &text);
        }
    }

    /// Set an option by name.
    ///
    /// Validates the option and collects any warnings in `self.warnings`.
    pub fn set(&mut self, key: &str, value: &str) {
        // Check for unknown options (O001)
        let is_known = KNOWN_OPTIONS.contains(&key);
        if !is_known {
            self.warn("O001", format!("Unknown option \"{key}\""), key, value);
        }

        // Check for options set more than once (O003)
        if is_known && self.set_options.contains(key) {
            self.warn(
                "O003",
                format!("Option \"{key}\" can only be specified once"),
                key,
                value,
            );
        }

        self.set_options.insert(key.to_string());

        match key {
            "title" => self.title = Some(value.to_string()),
            "currency" => {
                let code = value.trim();
                if code.is_empty() {
                    self.warn(
                        "O002",
                        format!("Invalid value \"{value}\" for option \"{key}\": expected a currency code"),
                        key,
                        value,
                    );
                } else {
                    self.currency = code.to_string();
                }
            }
            "display_precision" => match value.trim().parse::<u32>() {
                Ok(dp) if dp <= MAX_DISPLAY_PRECISION => self.display_precision = dp,
                _ => self.warn(
                    "O002",
                    format!(
                        "Invalid value \"{value}\" for option \"{key}\": expected 0-{MAX_DISPLAY_PRECISION}"
                    ),
                    key,
                    value,
                ),
            },
            "rounding" => match Rounding::parse(value.trim()) {
                Some(rounding) => self.rounding = rounding,
                None => self.warn(
                    "O002",
                    format!(
                        "Invalid value \"{value}\" for option \"{key}\": expected half-away-from-zero or half-even"
                    ),
                    key,
                    value,
                ),
            },
            _ => {}
        }
    }

    fn warn(&mut self, code: &'static str, message: String, key: &str, value: &str) {
        tracing::warn!(code, option = key, "{message}");
        self.warnings.push(OptionWarning {
            code,
            message,
            option: key.to_string(),
            value: value.to_string(),
        });
    }
}
