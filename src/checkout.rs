//! Checkout session
//!
//! Owns the state of one checkout: the cart, the chosen upsell quantity, the
//! payment method and the customer form. Everything derived from that state (the
//! upsell offer, the quote, what to render) is recomputed on demand.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::{Cart, CartError},
    catalog::Catalog,
    customer::{self, CustomerInfo, CustomerRequirements, ValidationError},
    messaging::{MessageChannel, MessagingEndpoint, OrderSerializer},
    order::PricedOrder,
    order_id::{Clock, OrderIdGenerator, RandomSource},
    pricing::{self, PaymentMethod, PricingRules, Quote},
    products::Product,
    upsell::{self, UpsellOffer},
};

/// Errors surfaced by checkout operations.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// A cart mutation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The checkout is not ready to submit.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// What the checkout page should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckoutView<'c> {
    /// Nothing in the cart; there is nothing to price or offer.
    EmptyCart,

    /// Cart has items.
    Review {
        /// Product to promote, if any
        offer: Option<&'c Product>,

        /// Current totals
        quote: Quote,

        /// Show the discount breakdown
        show_discount: bool,

        /// Show the payment surcharge
        show_surcharge: bool,

        /// Enable the submit button
        submittable: bool,
    },
}

/// Collaborators needed to send an order.
#[derive(Debug)]
pub struct Dispatch<'a, C, R, M: ?Sized> {
    /// Order id source
    pub ids: &'a mut OrderIdGenerator<C, R>,

    /// Message renderer
    pub serializer: &'a OrderSerializer,

    /// Messaging destination
    pub endpoint: &'a MessagingEndpoint,

    /// Channel that opens the link
    pub channel: &'a M,
}

/// One checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession<'c> {
    cart: Cart<'c>,
    upsell_quantity: u32,
    payment: Option<PaymentMethod>,
    customer: CustomerInfo,
    rules: PricingRules,
    requirements: CustomerRequirements,
}

impl<'c> CheckoutSession<'c> {
    /// Start a session with an empty cart.
    pub fn new(
        catalog: &'c Catalog,
        rules: PricingRules,
        requirements: CustomerRequirements,
    ) -> Self {
        Self {
            cart: Cart::new(catalog),
            upsell_quantity: 0,
            payment: None,
            customer: CustomerInfo::default(),
            rules,
            requirements,
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Cart`] if the product is unknown.
    pub fn add_item(&mut self, id: &str) -> Result<u32, CheckoutError> {
        Ok(self.cart.add(id)?)
    }

    /// Remove one unit of a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Cart`] if the product is unknown or not in the cart.
    pub fn remove_item(&mut self, id: &str) -> Result<u32, CheckoutError> {
        Ok(self.cart.remove(id)?)
    }

    /// The cart.
    pub fn cart(&self) -> &Cart<'c> {
        &self.cart
    }

    /// Set how many units of the offered product the customer wants.
    pub fn set_upsell_quantity(&mut self, quantity: u32) {
        self.upsell_quantity = quantity;
    }

    /// Units of the offered product the customer wants.
    pub fn upsell_quantity(&self) -> u32 {
        self.upsell_quantity
    }

    /// Choose, change or clear the payment method.
    pub fn set_payment_method(&mut self, payment: Option<PaymentMethod>) {
        self.payment = payment;
    }

    /// Chosen payment method.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment
    }

    /// Customer form.
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Customer form, for editing.
    pub fn customer_mut(&mut self) -> &mut CustomerInfo {
        &mut self.customer
    }

    /// Pricing rules in effect.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Current upsell offer, recomputed from the cart.
    pub fn offer(&self) -> Option<UpsellOffer<'c>> {
        upsell::offer_for(&self.cart, self.upsell_quantity)
    }

    /// Current totals.
    pub fn quote(&self) -> Quote {
        pricing::quote(
            &self.cart,
            self.offer().as_ref(),
            self.payment,
            &self.rules,
        )
    }

    /// Whether the form and payment choice allow submission. An empty cart never does.
    pub fn is_submittable(&self) -> bool {
        !self.cart.is_empty()
            && customer::is_submittable(&self.customer, self.payment, self.requirements)
    }

    /// Check whether the session can be submitted.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found: empty cart, missing fields,
    /// then missing payment method.
    pub fn validate(&self) -> Result<PaymentMethod, ValidationError> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        customer::validate(&self.customer, self.payment, self.requirements)
    }

    /// What the checkout page should render.
    pub fn view(&self) -> CheckoutView<'c> {
        if self.cart.is_empty() {
            return CheckoutView::EmptyCart;
        }

        let quote = self.quote();

        CheckoutView::Review {
            offer: self.offer().map(|offer| offer.product),
            show_discount: quote.has_discount(),
            show_surcharge: quote.has_surcharge(),
            submittable: self.is_submittable(),
            quote,
        }
    }

    /// Snapshot the session into an order without sending it.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the session cannot be submitted.
    pub fn place_order<C: Clock, R: RandomSource>(
        &self,
        ids: &mut OrderIdGenerator<C, R>,
    ) -> Result<PricedOrder, ValidationError> {
        let payment = self.validate()?;
        let offer = self.offer();

        Ok(PricedOrder::new(
            ids.generate(),
            &self.cart,
            offer.as_ref(),
            self.quote(),
            payment,
            self.customer.clone(),
        ))
    }

    /// Price, serialize and send the order, then reset the session.
    ///
    /// The session is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] if the session cannot be submitted.
    #[tracing::instrument(skip_all, fields(items = self.cart.total_quantity()))]
    pub fn submit<C, R, M>(
        &mut self,
        dispatch: Dispatch<'_, C, R, M>,
    ) -> Result<PricedOrder, CheckoutError>
    where
        C: Clock,
        R: RandomSource,
        M: MessageChannel + ?Sized,
    {
        let order = self.place_order(dispatch.ids).inspect_err(|error| {
            warn!(%error, "checkout rejected");
        })?;

        let message = dispatch.serializer.render(&order);
        let link = dispatch.endpoint.link_for(&message);

        info!(
            order_id = %order.id(),
            total = %order.total(),
            payment = %order.payment(),
            "order submitted"
        );

        dispatch.channel.open(&link);

        self.reset();

        Ok(order)
    }

    /// Discard the cart and form state.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.upsell_quantity = 0;
        self.payment = None;
        self.customer = CustomerInfo::default();
    }
}
