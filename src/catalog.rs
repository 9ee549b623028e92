//! Catalog
//!
//! The fixed, read-only list of products a storefront sells. Products keep the
//! order they were loaded in; that order is used to break ties during upsell
//! selection.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Product, ProductKey};

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Two products share the same id.
    #[error("duplicate product id: {0}")]
    DuplicateId(String),

    /// A product price is not strictly positive.
    #[error("product {0} must have a price greater than zero")]
    NonPositivePrice(String),

    /// A product is priced in a different currency to the rest of the catalog.
    #[error("product {id} has currency {found}, but catalog has currency {expected}")]
    CurrencyMismatch {
        /// Offending product id
        id: String,

        /// Catalog currency
        expected: &'static str,

        /// Product currency
        found: &'static str,
    },

    /// No products were provided.
    #[error("catalog has no products")]
    Empty,
}

/// Catalog
#[derive(Debug)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    keys: FxHashMap<String, ProductKey>,
    order: Vec<ProductKey>,
    currency: &'static Currency,
}

impl Catalog {
    /// Build a catalog from products in display order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the list is empty, ids repeat, a price is not
    /// positive, or currencies are mixed.
    pub fn new(products: impl IntoIterator<Item = Product>) -> Result<Self, CatalogError> {
        let mut products = products.into_iter().peekable();

        let currency = products
            .peek()
            .map(Product::currency)
            .ok_or(CatalogError::Empty)?;

        let mut catalog = Catalog {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            order: Vec::new(),
            currency,
        };

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    fn insert(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateId(product.id));
        }

        if product.price.to_minor_units() <= 0 {
            return Err(CatalogError::NonPositivePrice(product.id));
        }

        if product.currency() != self.currency {
            return Err(CatalogError::CurrencyMismatch {
                expected: self.currency.iso_alpha_code,
                found: product.currency().iso_alpha_code,
                id: product.id,
            });
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);
        self.order.push(key);

        Ok(())
    }

    /// Look up the key for a product id.
    pub fn key(&self, id: &str) -> Option<ProductKey> {
        self.keys.get(id).copied()
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Get a product by id.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.key(id).and_then(|key| self.get(key))
    }

    /// Iterate over products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product)> {
        self.order
            .iter()
            .filter_map(|&key| self.products.get(key).map(|product| (key, product)))
    }

    /// Product keys in catalog order.
    pub fn keys(&self) -> &[ProductKey] {
        &self.order
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency shared by every product.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rusty_money::{
        Money,
        iso::{BRL, USD},
    };
    use testresult::TestResult;

    use super::*;

    pub(crate) fn product(id: &str, minor: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("{id} name"),
            price: Money::from_minor(minor, BRL),
            description: format!("{id} description"),
        }
    }

    pub(crate) fn test_catalog() -> Result<Catalog, CatalogError> {
        Catalog::new([product("cookies", 690), product("brownies", 690)])
    }

    #[test]
    fn preserves_insertion_order() -> TestResult {
        let catalog = Catalog::new([
            product("c", 100),
            product("a", 100),
            product("b", 100),
        ])?;

        let ids: Vec<&str> = catalog.iter().map(|(_, p)| p.id.as_str()).collect();

        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.currency(), BRL);

        Ok(())
    }

    #[test]
    fn lookup_by_id_and_key() -> TestResult {
        let catalog = test_catalog()?;

        let key = catalog.key("brownies").ok_or("missing brownies")?;

        assert_eq!(catalog.get(key).map(|p| p.id.as_str()), Some("brownies"));
        assert_eq!(
            catalog.product("cookies").map(|p| p.name.as_str()),
            Some("cookies name")
        );
        assert!(catalog.key("muffins").is_none());

        Ok(())
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert_eq!(
            Catalog::new(Vec::<Product>::new()).err(),
            Some(CatalogError::Empty)
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::new([product("cookies", 100), product("cookies", 200)]);

        assert_eq!(
            result.err(),
            Some(CatalogError::DuplicateId("cookies".to_string()))
        );
    }

    #[test]
    fn zero_price_is_rejected() {
        let result = Catalog::new([product("free", 0)]);

        assert_eq!(
            result.err(),
            Some(CatalogError::NonPositivePrice("free".to_string()))
        );
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let mut dollars = product("dollars", 100);
        dollars.price = Money::from_minor(100, USD);

        let result = Catalog::new([product("cookies", 100), dollars]);

        assert_eq!(
            result.err(),
            Some(CatalogError::CurrencyMismatch {
                id: "dollars".to_string(),
                expected: "BRL",
                found: "USD",
            })
        );
    }
}
