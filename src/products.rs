//! Products

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Stable catalog identifier (e.g. `cookies`)
    pub id: String,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'static, Currency>,

    /// Short marketing description
    pub description: String,
}

impl Product {
    /// Unit price as an exact decimal in major units (e.g. `7.90`).
    pub fn unit_price(&self) -> Decimal {
        Decimal::new(self.price.to_minor_units(), self.price.currency().exponent)
    }

    /// Currency the product is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.price.currency()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::iso::BRL;

    use super::*;

    #[test]
    fn unit_price_is_exact_major_units() {
        let product = Product {
            id: "cookies".to_string(),
            name: "Cookies".to_string(),
            price: Money::from_minor(790, BRL),
            description: String::new(),
        };

        assert_eq!(product.unit_price(), dec!(7.90));
        assert_eq!(product.currency(), BRL);
    }
}
