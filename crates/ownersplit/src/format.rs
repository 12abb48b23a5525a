//! Amount formatting for CLI output.

use ownersplit_engine::round_for_display;
use ownersplit_loader::Options;
use rust_decimal::{Decimal, RoundingStrategy};

/// How amounts are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountFormat {
    /// Decimal places shown.
    pub precision: u32,
    /// Rounding applied before printing.
    pub strategy: RoundingStrategy,
}

impl AmountFormat {
    /// Format settings from workspace options, with an optional precision override.
    #[must_use]
    pub fn from_options(options: &Options, precision: Option<u32>) -> Self {
        Self {
            precision: precision.unwrap_or(options.display_precision),
            strategy: options.rounding.strategy(),
        }
    }

    /// Round an amount for presentation.
    #[must_use]
    pub fn round(&self, amount: Decimal) -> Decimal {
        let rounded = round_for_display(amount, self.precision, self.strategy);
        // No "-0.00"
        if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        }
    }

    /// Round and pad an amount to the configured precision.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format!(
            "{:.prec$}",
            self.round(amount),
            prec = self.precision as usize
        )
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::from_options(&Options::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownersplit_loader::Rounding;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_pads() {
        let fmt = AmountFormat::default();
        assert_eq!(fmt.format(dec!(500)), "500.00");
        assert_eq!(fmt.format(dec!(0)), "0.00");
        assert_eq!(fmt.format(dec!(12.3)), "12.30");
    }

    #[test]
    fn test_format_rounding_strategy() {
        let mut options = Options::default();
        assert_eq!(AmountFormat::from_options(&options, None).format(dec!(2.675)), "2.68");

        options.rounding = Rounding::HalfEven;
        assert_eq!(AmountFormat::from_options(&options, None).format(dec!(2.665)), "2.66");
    }

    #[test]
    fn test_precision_override() {
        let options = Options::default();
        let fmt = AmountFormat::from_options(&options, Some(0));
        assert_eq!(fmt.format(dec!(1234.5)), "1235");
        let fmt = AmountFormat::from_options(&options, Some(4));
        assert_eq!(fmt.format(dec!(1.5)), "1.5000");
    }

    #[test]
    fn test_negative_zero() {
        let fmt = AmountFormat::default();
        assert_eq!(fmt.format(dec!(-0.001)), "0.00");
        assert_eq!(fmt.format(dec!(-3.125)), "-3.13");
    }
}
