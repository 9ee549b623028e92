//! Utils

use clap::Parser;

use crate::pricing::PaymentMethod;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct CheckoutArgs {
    /// Store file to load from `./fixtures`
    #[clap(short, long, default_value = "doces-da-paixao")]
    pub fixture: String,

    /// Product ids to add, one unit per occurrence
    #[clap(short, long = "item", default_values = ["cookies", "cookies"])]
    pub items: Vec<String>,

    /// Units of the offered product to add
    #[clap(short, long, default_value_t = 0)]
    pub upsell: u32,

    /// Payment method
    #[clap(short, long, value_enum, default_value_t = PaymentMethod::Pix)]
    pub payment: PaymentMethod,

    /// Customer name
    #[clap(long, default_value = "Maria Silva")]
    pub name: String,

    /// Customer phone
    #[clap(long, default_value = "(32) 99999-0000")]
    pub phone: String,

    /// Delivery address
    #[clap(long, default_value = "Rua das Flores, 10 - Centro")]
    pub address: Option<String>,

    /// Order notes
    #[clap(long)]
    pub notes: Option<String>,
}
