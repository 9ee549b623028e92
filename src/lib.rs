//! Vitrine
//!
//! Vitrine is the pricing and checkout core of a small storefront: a product
//! catalog, a cart, a single-product upsell with a quantity discount, payment
//! surcharges, order ids and the text message a submitted order is sent as.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod customer;
pub mod messaging;
pub mod money;
pub mod order;
pub mod order_id;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod upsell;
pub mod utils;
