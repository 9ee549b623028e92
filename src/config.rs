//! Store configuration
//!
//! A store is described by one YAML file under `./fixtures`:
//!
//! ```yaml
//! name: Doces da Paixão
//! order_prefix: DP
//! messaging:
//!   base_url: https://wa.me
//!   destination: "5532984218936"
//! pricing:
//!   upsell_discount: 15%
//!   card_surcharge: 5%
//!   confirmation: 50%
//! products:
//!   - id: cookies
//!     name: Cookies Artesanais
//!     price: 7.90 BRL
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    customer::CustomerRequirements,
    messaging::{MessageTemplate, MessagingEndpoint, OrderSerializer},
    order_id::{OrderIdError, OrderIdGenerator},
    pricing::PricingRules,
    products::Product,
};

/// Default directory holding store files.
pub const DEFAULT_BASE_PATH: &str = "./fixtures";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the store file
    #[error("Failed to read store file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The product list does not form a valid catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The order id prefix is invalid
    #[error(transparent)]
    OrderId(#[from] OrderIdError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    name: String,
    order_prefix: String,
    messaging: MessagingFile,
    #[serde(default)]
    message: MessageFile,
    #[serde(default)]
    pricing: PricingFile,
    #[serde(default = "default_collect_address")]
    collect_address: bool,
    products: Vec<ProductFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessagingFile {
    base_url: String,
    destination: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageFile {
    banner: Option<String>,
    #[serde(default)]
    footer: Vec<String>,
    closing: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PricingFile {
    upsell_discount: Option<String>,
    card_surcharge: Option<String>,
    confirmation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProductFile {
    id: String,
    name: String,
    price: String,
    #[serde(default)]
    description: String,
}

fn default_collect_address() -> bool {
    true
}

impl TryFrom<ProductFile> for Product {
    type Error = ConfigError;

    fn try_from(file: ProductFile) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&file.price)?;

        Ok(Product {
            id: file.id,
            name: file.name,
            price: Money::from_minor(minor_units, currency),
            description: file.description,
        })
    }
}

/// A loaded store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    name: String,
    order_prefix: String,
    endpoint: MessagingEndpoint,
    template: MessageTemplate,
    rules: PricingRules,
    requirements: CustomerRequirements,
    products: Vec<Product>,
}

impl StoreConfig {
    /// Load `<name>.yml` from [`DEFAULT_BASE_PATH`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, ConfigError> {
        Self::from_path(PathBuf::from(DEFAULT_BASE_PATH).join(format!("{name}.yml")))
    }

    /// Load a store file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds an invalid
    /// price or percentage.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        debug!(path = %path.display(), "loading store file");

        Self::from_yaml(&contents)
    }

    /// Parse a store file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or holds an invalid price or
    /// percentage.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let file: StoreFile = serde_norway::from_str(contents)?;
        let defaults = PricingRules::default();
        let template_defaults = MessageTemplate::default();

        let rules = PricingRules {
            upsell_discount: parse_optional_percentage(file.pricing.upsell_discount.as_deref())?
                .unwrap_or(defaults.upsell_discount),
            card_surcharge: parse_optional_percentage(file.pricing.card_surcharge.as_deref())?
                .unwrap_or(defaults.card_surcharge),
            confirmation_share: parse_optional_percentage(file.pricing.confirmation.as_deref())?,
        };

        let products = file
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: file.name,
            order_prefix: file.order_prefix,
            endpoint: MessagingEndpoint {
                base_url: file.messaging.base_url,
                destination: file.messaging.destination,
            },
            template: MessageTemplate {
                banner: file.message.banner.unwrap_or(template_defaults.banner),
                footer: file.message.footer,
                closing: file.message.closing.unwrap_or(template_defaults.closing),
            },
            rules,
            requirements: CustomerRequirements {
                address: file.collect_address,
            },
            products,
        })
    }

    /// Store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Build the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Catalog`] for duplicate ids, non-positive prices,
    /// mixed currencies or an empty product list.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        Ok(Catalog::new(self.products.iter().cloned())?)
    }

    /// Pricing rates.
    pub fn rules(&self) -> PricingRules {
        self.rules
    }

    /// Customer fields the store requires.
    pub fn requirements(&self) -> CustomerRequirements {
        self.requirements
    }

    /// Message template.
    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    /// Serializer for this store's messages.
    pub fn serializer(&self) -> OrderSerializer {
        OrderSerializer::new(self.template.clone())
    }

    /// Where orders are sent.
    pub fn endpoint(&self) -> &MessagingEndpoint {
        &self.endpoint
    }

    /// Id generator using the store's prefix and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OrderId`] if the prefix is not two ASCII letters.
    pub fn id_generator(&self) -> Result<OrderIdGenerator, ConfigError> {
        Ok(OrderIdGenerator::system(&self.order_prefix)?)
    }
}

/// Parse a price string (e.g. `"7.90 BRL"`) into minor units and currency.
///
/// # Errors
///
/// Returns an error if the format is wrong, the amount has more decimal places
/// than the currency allows, or the currency code is unknown.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), ConfigError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency =
        Currency::find(code).ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    if amount.normalize().scale() > currency.exponent {
        return Err(ConfigError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.to_i64())
        .ok_or_else(|| ConfigError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a percentage string (`"15%"` or `"0.15"`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPercentage`] if the value is not a number or is
/// negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();
    let invalid = || ConfigError::InvalidPercentage(s.to_string());

    let value = if let Some(points) = trimmed.strip_suffix('%') {
        points.trim().parse::<Decimal>().map_err(|_err| invalid())? / Decimal::ONE_HUNDRED
    } else {
        trimmed.parse::<Decimal>().map_err(|_err| invalid())?
    };

    if value.is_sign_negative() {
        return Err(invalid());
    }

    Ok(Percentage::from(value))
}

fn parse_optional_percentage(s: Option<&str>) -> Result<Option<Percentage>, ConfigError> {
    s.map(parse_percentage).transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal_macros::dec;
    use rusty_money::iso::{BRL, JPY, USD};
    use testresult::TestResult;

    use super::*;

    const STORE: &str = r#"
name: Doces
order_prefix: dp
messaging:
  base_url: https://wa.me
  destination: "5532984218936"
message:
  banner: "*PEDIDO*"
  footer:
    - "📅 Sábados"
pricing:
  confirmation: 50%
products:
  - id: cookies
    name: Cookies
    price: 7.90 BRL
    description: Crocantes
  - id: brownies
    name: Brownies
    price: 10.90 BRL
"#;

    #[test]
    fn parse_price_uses_currency_exponent() -> TestResult {
        assert_eq!(parse_price("7.90 BRL")?, (790, BRL));
        assert_eq!(parse_price("12 USD")?, (1200, USD));
        assert_eq!(parse_price("500 JPY")?, (500, JPY));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert!(matches!(parse_price("7.90BRL"), Err(ConfigError::InvalidPrice(_))));
        assert!(matches!(parse_price("7.90 BRL x"), Err(ConfigError::InvalidPrice(_))));
        assert!(matches!(parse_price("7.905 BRL"), Err(ConfigError::InvalidPrice(_))));
        assert!(matches!(parse_price("abc BRL"), Err(ConfigError::InvalidPrice(_))));
        assert!(
            matches!(parse_price("7.90 XYZ"), Err(ConfigError::UnknownCurrency(code)) if code == "XYZ")
        );
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("15%")?, Percentage::from(dec!(0.15)));
        assert_eq!(parse_percentage(" 0.05 ")?, Percentage::from(dec!(0.05)));
        assert_eq!(parse_percentage("100%")?, Percentage::from(dec!(1)));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_bad_input() {
        for input in ["", "%", "abc", "-5%"] {
            assert!(
                matches!(parse_percentage(input), Err(ConfigError::InvalidPercentage(_))),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn loads_store_from_yaml() -> TestResult {
        let store = StoreConfig::from_yaml(STORE)?;

        assert_eq!(store.name(), "Doces");
        assert_eq!(store.template().banner, "*PEDIDO*");
        assert_eq!(store.template().footer, ["📅 Sábados"]);
        assert_eq!(store.template().closing, MessageTemplate::default().closing);
        assert_eq!(store.endpoint().destination, "5532984218936");
        assert_eq!(store.requirements(), CustomerRequirements::default());

        let rules = store.rules();
        assert_eq!(rules.upsell_discount, PricingRules::default().upsell_discount);
        assert_eq!(rules.confirmation_share, Some(Percentage::from(dec!(0.5))));

        let catalog = store.catalog()?;
        let ids: Vec<&str> = catalog.iter().map(|(_, product)| product.id.as_str()).collect();

        assert_eq!(ids, ["cookies", "brownies"]);
        assert_eq!(
            catalog.product("brownies").map(Product::unit_price),
            Some(dec!(10.90))
        );

        Ok(())
    }

    #[test]
    fn id_generator_uses_prefix() -> TestResult {
        let store = StoreConfig::from_yaml(STORE)?;
        let id = store.id_generator()?.generate();

        assert!(id.as_str().starts_with("DP"));

        Ok(())
    }

    #[test]
    fn loads_store_from_path() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(STORE.as_bytes())?;

        let store = StoreConfig::from_path(file.path())?;

        assert_eq!(store.products().len(), 2);

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            StoreConfig::from_path("./does-not-exist.yml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = STORE.replace("order_prefix: dp", "order_prefix: dp\nmystery: 1");

        assert!(matches!(StoreConfig::from_yaml(&yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn duplicate_products_surface_as_catalog_errors() -> TestResult {
        let yaml = STORE.replace("id: brownies", "id: cookies");
        let store = StoreConfig::from_yaml(&yaml)?;

        assert!(matches!(
            store.catalog(),
            Err(ConfigError::Catalog(CatalogError::DuplicateId(_)))
        ));

        Ok(())
    }

    #[test]
    fn bundled_store_loads() -> TestResult {
        let store = StoreConfig::from_set("doces-da-paixao")?;
        let catalog = store.catalog()?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.currency(), BRL);
        assert!(store.requirements().address);

        Ok(())
    }
}
