//! Money formatting
//!
//! All arithmetic happens on exact [`Decimal`] values. Amounts are only rounded
//! to the currency's minor unit when they are displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::Currency;

/// Round an amount to two decimal places for display.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders amounts as `R$ 27,89`: symbol, space, decimal comma, no thousands separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: &'static str,
    decimal_separator: char,
}

impl CurrencyFormat {
    /// Comma-decimal format using the currency's symbol.
    pub fn for_currency(currency: &'static Currency) -> Self {
        Self {
            symbol: currency.symbol,
            decimal_separator: ',',
        }
    }

    /// Override the decimal separator.
    #[must_use]
    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    /// Format an amount, rounding to two places.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = round_for_display(amount);
        let digits = format!("{rounded:.2}");

        let digits = if self.decimal_separator == '.' {
            digits
        } else {
            digits.replace('.', &self.decimal_separator.to_string())
        };

        format!("{} {digits}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::iso::BRL;

    use super::*;

    #[test]
    fn formats_with_decimal_comma() {
        let format = CurrencyFormat::for_currency(BRL);

        assert_eq!(format.format(dec!(27.89325)), "R$ 27,89");
        assert_eq!(format.format(dec!(13.8)), "R$ 13,80");
        assert_eq!(format.format(dec!(0)), "R$ 0,00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let format = CurrencyFormat::for_currency(BRL);

        assert_eq!(format.format(dec!(1.035)), "R$ 1,04");
        assert_eq!(format.format(dec!(26.565)), "R$ 26,57");
    }

    #[test]
    fn never_inserts_thousands_separator() {
        let format = CurrencyFormat::for_currency(BRL);

        assert_eq!(format.format(dec!(12345.6)), "R$ 12345,60");
    }

    #[test]
    fn separator_can_be_overridden() {
        let format = CurrencyFormat::for_currency(BRL).with_decimal_separator('.');

        assert_eq!(format.format(dec!(7.9)), "R$ 7.90");
    }
}
