//! Upsell selection
//!
//! Chooses at most one product to promote during checkout. The choice is a pure
//! function of the cart and must be recomputed after every cart change.

use tracing::debug;

use crate::{
    cart::Cart,
    products::{Product, ProductKey},
};

/// A promoted product together with the quantity the customer picked for it.
#[derive(Debug, Clone, Copy)]
pub struct UpsellOffer<'c> {
    /// Catalog key of the promoted product
    pub key: ProductKey,

    /// The promoted product
    pub product: &'c Product,

    /// Units chosen by the customer; zero means the offer was declined
    pub selected_quantity: u32,
}

impl<'c> UpsellOffer<'c> {
    /// Pair a selected product with a chosen quantity.
    pub fn new(key: ProductKey, product: &'c Product, selected_quantity: u32) -> Self {
        Self {
            key,
            product,
            selected_quantity,
        }
    }

    /// Whether the customer accepted at least one unit.
    pub fn is_accepted(&self) -> bool {
        self.selected_quantity > 0
    }
}

/// Pick the product to promote for the current cart.
///
/// - Empty cart: nothing.
/// - One distinct product: the first catalog product not already in the cart.
/// - Several distinct products: the one with the lowest quantity, ties going to
///   the product that comes first in the catalog.
pub fn select_upsell<'c>(cart: &Cart<'c>) -> Option<(ProductKey, &'c Product)> {
    let catalog = cart.catalog();

    let selected = match cart.len() {
        0 => None,
        1 => catalog.iter().find(|(key, _)| !cart.contains(*key)),
        _ => catalog
            .iter()
            .filter(|(key, _)| cart.contains(*key))
            .min_by_key(|(key, _)| cart.quantity(*key)),
    };

    debug!(
        distinct = cart.len(),
        product = selected.map(|(_, product)| product.id.as_str()),
        "upsell selected"
    );

    selected
}

/// Build the offer for a cart using the customer's chosen quantity.
pub fn offer_for<'c>(cart: &Cart<'c>, selected_quantity: u32) -> Option<UpsellOffer<'c>> {
    select_upsell(cart).map(|(key, product)| UpsellOffer::new(key, product, selected_quantity))
}
