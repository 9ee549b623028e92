//! Cart

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    products::{Product, ProductKey},
};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product id is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// The product exists but has no entry in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(String),
}

/// A cart entry. Quantities are always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry {
    /// Catalog key of the product
    pub product: ProductKey,

    /// Units in the cart
    pub quantity: u32,
}

/// Cart
///
/// Entries keep the order in which products were first added.
#[derive(Debug, Clone)]
pub struct Cart<'c> {
    catalog: &'c Catalog,
    entries: SmallVec<[CartEntry; 4]>,
}

impl<'c> Cart<'c> {
    /// Create an empty cart over the given catalog.
    pub fn new(catalog: &'c Catalog) -> Self {
        Cart {
            catalog,
            entries: SmallVec::new(),
        }
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if the id is not in the catalog.
    pub fn add(&mut self, id: &str) -> Result<u32, CartError> {
        let key = self.resolve(id)?;

        let quantity = if let Some(entry) = self.entry_mut(key) {
            entry.quantity = entry.quantity.saturating_add(1);
            entry.quantity
        } else {
            self.entries.push(CartEntry {
                product: key,
                quantity: 1,
            });
            1
        };

        debug!(product = id, quantity, "added to cart");

        Ok(quantity)
    }

    /// Remove one unit of a product, dropping the entry when it reaches zero.
    ///
    /// Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownProduct`]: the id is not in the catalog.
    /// - [`CartError::NotInCart`]: the product has no entry in the cart.
    pub fn remove(&mut self, id: &str) -> Result<u32, CartError> {
        let key = self.resolve(id)?;

        let position = self
            .entries
            .iter()
            .position(|entry| entry.product == key)
            .ok_or_else(|| CartError::NotInCart(id.to_string()))?;

        let remaining = match self.entries.get_mut(position) {
            Some(entry) if entry.quantity > 1 => {
                entry.quantity -= 1;
                entry.quantity
            }
            _ => {
                self.entries.remove(position);
                0
            }
        };

        debug!(product = id, quantity = remaining, "removed from cart");

        Ok(remaining)
    }

    /// Quantity of a product in the cart, zero when absent.
    pub fn quantity(&self, key: ProductKey) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.product == key)
            .map_or(0, |entry| entry.quantity)
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |total, entry| total.saturating_add(entry.quantity))
    }

    /// Sum of `quantity × unit price` over all entries.
    pub fn total_price(&self) -> Decimal {
        self.lines()
            .map(|(product, quantity)| product.unit_price() * Decimal::from(quantity))
            .sum()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.iter()
    }

    /// Iterate over products and quantities in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = (&'c Product, u32)> + '_ {
        let catalog = self.catalog;

        self.entries.iter().filter_map(move |entry| {
            catalog
                .get(entry.product)
                .map(|product| (product, entry.quantity))
        })
    }

    /// Whether a product has an entry in the cart.
    pub fn contains(&self, key: ProductKey) -> bool {
        self.entries.iter().any(|entry| entry.product == key)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Catalog the cart draws products from.
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    fn resolve(&self, id: &str) -> Result<ProductKey, CartError> {
        self.catalog
            .key(id)
            .ok_or_else(|| CartError::UnknownProduct(id.to_string()))
    }

    fn entry_mut(&mut self, key: ProductKey) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|entry| entry.product == key)
    }
}
