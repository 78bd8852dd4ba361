//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol prefixed to every displayed price.
const CURRENCY_SYMBOL: &str = "$";

/// A price in US dollars, the storefront's only display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in dollars, not cents.
    pub amount: Decimal,
}

impl Price {
    /// Create a price in US dollars.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Format for display with two decimal places (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let mut amount = self.amount.round_dp(2);
        amount.rescale(2);
        format!("{CURRENCY_SYMBOL}{amount}")
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::usd(Decimal::from(20)).display(), "$20.00");
        assert_eq!(Price::usd(Decimal::new(1095, 1)).display(), "$109.50");
    }

    #[test]
    fn test_display_rounds_extra_precision() {
        assert_eq!(Price::usd(Decimal::new(22_995, 3)).display(), "$23.00");
    }

    #[test]
    fn test_display_trait_matches_display() {
        assert_eq!(Price::usd(Decimal::new(5, 0)).to_string(), "$5.00");
    }
}
