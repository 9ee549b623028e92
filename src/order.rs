//! Priced orders
//!
//! A [`PricedOrder`] is the snapshot taken when a checkout is submitted. It owns
//! all of its data so it can outlive the session and the catalog.

use std::io;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    customer::CustomerInfo,
    money::CurrencyFormat,
    order_id::OrderId,
    pricing::{PaymentMethod, Quote},
    upsell::UpsellOffer,
};

/// Errors raised while printing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Writing to the output failed.
    #[error("failed to write order: {0}")]
    Io(#[from] io::Error),
}

/// One product line of the final order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Catalog id
    pub product_id: String,

    /// Product name
    pub name: String,

    /// Units ordered
    pub quantity: u32,

    /// Price of one unit
    pub unit_price: Decimal,

    /// `unit_price × quantity`
    pub line_total: Decimal,
}

/// Final, immutable order handed to the messaging channel.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    id: OrderId,
    lines: SmallVec<[LineItem; 4]>,
    quote: Quote,
    upsell_product: Option<String>,
    payment: PaymentMethod,
    customer: CustomerInfo,
    currency: &'static Currency,
}

impl PricedOrder {
    /// Build an order from the cart, the accepted upsell and the computed quote.
    ///
    /// Upsell units are merged into the cart line when the promoted product is
    /// already in the cart, otherwise they become a new trailing line.
    pub fn new(
        id: OrderId,
        cart: &Cart<'_>,
        offer: Option<&UpsellOffer<'_>>,
        quote: Quote,
        payment: PaymentMethod,
        customer: CustomerInfo,
    ) -> Self {
        let mut lines: SmallVec<[LineItem; 4]> = cart
            .lines()
            .map(|(product, quantity)| LineItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity,
                unit_price: product.unit_price(),
                line_total: product.unit_price() * Decimal::from(quantity),
            })
            .collect();

        let accepted = offer.filter(|offer| offer.is_accepted());

        if let Some(offer) = accepted {
            let product = offer.product;

            if let Some(line) = lines.iter_mut().find(|line| line.product_id == product.id) {
                line.quantity = line.quantity.saturating_add(offer.selected_quantity);
                line.line_total = line.unit_price * Decimal::from(line.quantity);
            } else {
                lines.push(LineItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    quantity: offer.selected_quantity,
                    unit_price: product.unit_price(),
                    line_total: product.unit_price() * Decimal::from(offer.selected_quantity),
                });
            }
        }

        Self {
            id,
            lines,
            quote,
            upsell_product: accepted.map(|offer| offer.product.name.clone()),
            payment,
            customer,
            currency: cart.catalog().currency(),
        }
    }

    /// Order id.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Product lines in order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Computed totals.
    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    /// Subtotal before the discount.
    pub fn subtotal(&self) -> Decimal {
        self.quote.raw_subtotal
    }

    /// Upsell discount.
    pub fn discount(&self) -> Decimal {
        self.quote.discount
    }

    /// Payment surcharge.
    pub fn surcharge(&self) -> Decimal {
        self.quote.surcharge
    }

    /// Final total.
    pub fn total(&self) -> Decimal {
        self.quote.total
    }

    /// Upfront confirmation amount, when the flow asks for one.
    pub fn confirmation_amount(&self) -> Option<Decimal> {
        self.quote.confirmation_amount
    }

    /// Name of the accepted upsell product.
    pub fn upsell_product(&self) -> Option<&str> {
        self.upsell_product.as_deref()
    }

    /// Chosen payment method.
    pub fn payment(&self) -> PaymentMethod {
        self.payment
    }

    /// Customer details.
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Currency of every amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Print the order as a table followed by a totals summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), OrderError> {
        let format = CurrencyFormat::for_currency(self.currency);
        let mut builder = Builder::default();

        builder.push_record(["Qty", "Item", "Unit", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.quantity.to_string(),
                line.name.clone(),
                format.format(line.unit_price),
                format.format(line.line_total),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..4), Alignment::right());

        writeln!(out, "\nOrder {}", self.id)?;
        writeln!(out, "{table}")?;

        for (label, value) in self.summary_rows(&format) {
            writeln!(out, " {label:<14}{value:>14}")?;
        }

        Ok(())
    }

    fn summary_rows(&self, format: &CurrencyFormat) -> SmallVec<[(&'static str, String); 8]> {
        let quote = &self.quote;
        let mut rows = SmallVec::new();

        rows.push(("Subtotal:", format.format(quote.raw_subtotal)));

        if quote.has_discount() {
            rows.push(("Discount:", format!("-{}", format.format(quote.discount))));
        }

        if quote.has_surcharge() {
            rows.push(("Surcharge:", format.format(quote.surcharge)));
        }

        rows.push(("Total:", format.format(quote.total)));

        if let Some((upfront, remaining)) = quote.display_split() {
            rows.push(("Upfront:", format.format(upfront)));
            rows.push(("On delivery:", format.format(remaining)));
        }

        rows.push(("Payment:", self.payment.label().to_string()));

        rows
    }
}
