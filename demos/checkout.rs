//! Checkout Example
//!
//! Runs one checkout against a store file and prints the receipt, the message
//! sent to the store and the deep link that would be opened.
//!
//! Use `-f` to load a store file by name
//! Use `-i` once per unit to add to the cart
//! Use `-u` to accept units of the offered product
//! Use `-p` to choose `pix` or `card`
//!
//! Set `RUST_LOG=vitrine=debug` to see cart and upsell decisions.

use std::io;

use anyhow::Result;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vitrine::{
    checkout::{CheckoutSession, CheckoutView, Dispatch},
    config::StoreConfig,
    customer::CustomerInfo,
    messaging::{DeepLink, MessageChannel},
    utils::CheckoutArgs,
};

/// Prints links instead of opening them.
struct StdoutChannel;

impl MessageChannel for StdoutChannel {
    #[expect(clippy::print_stdout, reason = "Example code")]
    fn open(&self, link: &DeepLink) {
        println!("\nLink: {link}");
    }
}

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .init();

    let args = CheckoutArgs::parse();

    let store = StoreConfig::from_set(&args.fixture)?;
    let catalog = store.catalog()?;
    let serializer = store.serializer();
    let mut ids = store.id_generator()?;

    let mut session = CheckoutSession::new(&catalog, store.rules(), store.requirements());

    for item in &args.items {
        session.add_item(item)?;
    }

    if let CheckoutView::Review {
        offer: Some(product),
        ..
    } = session.view()
    {
        println!("Offer: {} ({})", product.name, product.description);
    }

    session.set_upsell_quantity(args.upsell);
    session.set_payment_method(Some(args.payment));

    let mut customer = CustomerInfo::new(args.name, args.phone);
    customer.address = args.address;
    customer.notes = args.notes;
    *session.customer_mut() = customer;

    let order = session.submit(Dispatch {
        ids: &mut ids,
        serializer: &serializer,
        endpoint: store.endpoint(),
        channel: &StdoutChannel,
    })?;

    order.write_to(io::stdout().lock())?;

    println!("\nMessage to {}:\n\n{}", store.name(), serializer.render(&order));

    Ok(())
}
