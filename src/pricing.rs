//! Pricing
//!
//! Computes the totals shown during checkout. The steps run in a fixed order and
//! each one works on the output of the previous:
//!
//! 1. cart subtotal
//! 2. upsell subtotal
//! 3. raw subtotal
//! 4. upsell discount (every upsell unit after the first)
//! 5. discounted subtotal
//! 6. payment surcharge on the discounted subtotal
//! 7. final total
//! 8. optional upfront confirmation share of the final total
//!
//! Nothing is rounded here; see [`crate::money`] for display rounding.

use std::fmt;

use clap::ValueEnum;
use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{cart::Cart, money::round_for_display, upsell::UpsellOffer};

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PaymentMethod {
    /// Instant bank transfer
    Pix,

    /// Credit or debit card
    Card,
}

impl PaymentMethod {
    /// Label shown to customers.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Card => "Cartão",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rates applied by the pricing engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    /// Discount on each upsell unit after the first
    pub upsell_discount: Percentage,

    /// Surcharge added when paying by card
    pub card_surcharge: Percentage,

    /// Share of the final total due upfront to confirm the order, if any
    pub confirmation_share: Option<Percentage>,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            upsell_discount: Percentage::from(Decimal::new(15, 2)),
            card_surcharge: Percentage::from(Decimal::new(5, 2)),
            confirmation_share: None,
        }
    }
}

impl PricingRules {
    /// Require an upfront confirmation payment of the given share.
    #[must_use]
    pub fn with_confirmation(mut self, share: Percentage) -> Self {
        self.confirmation_share = Some(share);
        self
    }
}

/// Totals for a cart, upsell choice and payment method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Sum of cart lines
    pub cart_subtotal: Decimal,

    /// Price of the accepted upsell units
    pub upsell_subtotal: Decimal,

    /// `cart_subtotal + upsell_subtotal`
    pub raw_subtotal: Decimal,

    /// Savings from the upsell discount
    pub discount: Decimal,

    /// `raw_subtotal - discount`
    pub discounted_subtotal: Decimal,

    /// Payment surcharge on the discounted subtotal
    pub surcharge: Decimal,

    /// `discounted_subtotal + surcharge`
    pub total: Decimal,

    /// Upfront amount needed to confirm the order
    pub confirmation_amount: Option<Decimal>,

    /// Rates the quote was computed with
    pub rules: PricingRules,
}

impl Quote {
    /// Amount left to pay on delivery once the confirmation amount is paid.
    pub fn remaining_balance(&self) -> Option<Decimal> {
        self.confirmation_amount.map(|upfront| self.total - upfront)
    }

    /// Upfront and on-delivery amounts as displayed, in cents.
    ///
    /// The delivery half is the displayed total minus the displayed upfront
    /// amount, so the two always add up to the displayed total.
    pub fn display_split(&self) -> Option<(Decimal, Decimal)> {
        self.confirmation_amount.map(|upfront| {
            let upfront = round_for_display(upfront);

            (upfront, round_for_display(self.total) - upfront)
        })
    }

    /// Whether a discount applies.
    pub fn has_discount(&self) -> bool {
        self.discount > Decimal::ZERO
    }

    /// Whether a surcharge applies.
    pub fn has_surcharge(&self) -> bool {
        self.surcharge > Decimal::ZERO
    }
}

/// Price a cart.
///
/// The upsell offer contributes only when its selected quantity is positive.
/// An unselected payment method carries no surcharge.
pub fn quote(
    cart: &Cart<'_>,
    offer: Option<&UpsellOffer<'_>>,
    payment: Option<PaymentMethod>,
    rules: &PricingRules,
) -> Quote {
    let cart_subtotal = cart.total_price();

    let upsell_subtotal = offer
        .filter(|offer| offer.is_accepted())
        .map_or(Decimal::ZERO, |offer| {
            offer.product.unit_price() * Decimal::from(offer.selected_quantity)
        });

    let raw_subtotal = cart_subtotal + upsell_subtotal;

    let discount = offer.map_or(Decimal::ZERO, |offer| upsell_discount(offer, rules));
    let discounted_subtotal = raw_subtotal - discount;

    let surcharge = surcharge(discounted_subtotal, payment, rules);
    let total = discounted_subtotal + surcharge;

    let confirmation_amount = rules.confirmation_share.map(|share| share * total);

    Quote {
        cart_subtotal,
        upsell_subtotal,
        raw_subtotal,
        discount,
        discounted_subtotal,
        surcharge,
        total,
        confirmation_amount,
        rules: *rules,
    }
}

/// Discount on the upsell: the first unit is full price, every further unit
/// gets the configured rate.
pub fn upsell_discount(offer: &UpsellOffer<'_>, rules: &PricingRules) -> Decimal {
    if offer.selected_quantity < 2 {
        return Decimal::ZERO;
    }

    let discounted_units = Decimal::from(offer.selected_quantity - 1);

    rules.upsell_discount * (offer.product.unit_price() * discounted_units)
}

/// Surcharge for the payment method, applied to the already discounted amount.
pub fn surcharge(
    discounted_subtotal: Decimal,
    payment: Option<PaymentMethod>,
    rules: &PricingRules,
) -> Decimal {
    match payment {
        Some(PaymentMethod::Card) => rules.card_surcharge * discounted_subtotal,
        Some(PaymentMethod::Pix) | None => Decimal::ZERO,
    }
}
