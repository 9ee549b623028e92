//! Vitrine prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartEntry, CartError},
    catalog::{Catalog, CatalogError},
    checkout::{CheckoutError, CheckoutSession, CheckoutView, Dispatch},
    config::{ConfigError, StoreConfig},
    customer::{CustomerField, CustomerInfo, CustomerRequirements, ValidationError},
    messaging::{
        DeepLink, MessageChannel, MessageTemplate, MessagingEndpoint, OrderSerializer,
        TracingChannel,
    },
    money::{CurrencyFormat, round_for_display},
    order::{LineItem, OrderError, PricedOrder},
    order_id::{Clock, OrderId, OrderIdError, OrderIdGenerator, RandomSource, SystemClock, ThreadRandom},
    pricing::{PaymentMethod, PricingRules, Quote, quote},
    products::{Product, ProductKey},
    upsell::{UpsellOffer, offer_for, select_upsell},
};
