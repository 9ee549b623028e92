//! Outbound order messages
//!
//! Renders a [`PricedOrder`] into the text sent to the store, wraps it in a
//! messaging deep link and hands the link to a [`MessageChannel`]. The handoff is
//! one-way: nothing is read back and delivery is never confirmed.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use tracing::info;

use crate::{money::CurrencyFormat, order::PricedOrder};

/// Store-specific text around the generated order details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    /// First line of every message
    pub banner: String,

    /// Fixed informational lines printed before the closing sentence
    pub footer: Vec<String>,

    /// Last line of every message
    pub closing: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            banner: "*NOVO PEDIDO*".to_string(),
            footer: Vec::new(),
            closing: "✅ Cliente confirma o pedido e aguarda instruções de pagamento.".to_string(),
        }
    }
}

/// Turns priced orders into message text.
#[derive(Debug, Clone)]
pub struct OrderSerializer {
    template: MessageTemplate,
}

impl OrderSerializer {
    /// Serializer using the given template.
    pub fn new(template: MessageTemplate) -> Self {
        Self { template }
    }

    /// Render the order.
    ///
    /// Sections, separated by blank lines: banner, order and customer, products,
    /// discount (only with savings), surcharge (only when charged) or a plain
    /// total, confirmation split (only when required), payment and notes, footer,
    /// closing sentence. Rates are labelled with the rules the order was priced
    /// with.
    pub fn render(&self, order: &PricedOrder) -> String {
        let format = CurrencyFormat::for_currency(order.currency());
        let quote = order.quote();
        let rules = quote.rules;

        let mut sections: Vec<Vec<String>> = vec![
            vec![self.template.banner.clone()],
            header(order),
            products(order, &format),
        ];

        if quote.has_discount() {
            sections.push(vec![
                format!(
                    "🎉 *DESCONTO ESPECIAL:* {}% a partir da 2ª unidade de {}!",
                    percent_points(rules.upsell_discount),
                    order.upsell_product().unwrap_or_default()
                ),
                format!("💰 *Valor original:* {}", format.format(quote.raw_subtotal)),
                format!(
                    "💰 *Valor com desconto:* {}",
                    format.format(quote.discounted_subtotal)
                ),
                format!("💚 *Economia:* {}", format.format(quote.discount)),
            ]);
        }

        if quote.has_surcharge() {
            sections.push(vec![
                format!(
                    "💳 *Acréscimo cartão ({}%):* {}",
                    percent_points(rules.card_surcharge),
                    format.format(quote.surcharge)
                ),
                format!("💰 *Total com acréscimo:* {}", format.format(quote.total)),
            ]);
        }

        if !quote.has_discount() && !quote.has_surcharge() {
            sections.push(vec![format!("💰 *Total:* {}", format.format(quote.total))]);
        }

        if let Some((upfront, remaining)) = quote.display_split() {
            let share = rules
                .confirmation_share
                .map_or(String::new(), |share| format!(" ({}%)", percent_points(share)));

            sections.push(vec![
                format!("💳 *Valor para confirmar{share}:* {}", format.format(upfront)),
                format!("💳 *Restante na entrega:* {}", format.format(remaining)),
            ]);
        }

        let mut payment = vec![format!("💳 *Pagamento:* {}", order.payment().label())];

        if let Some(notes) = order.customer().notes() {
            payment.push(format!("📝 *Observações:* {notes}"));
        }

        sections.push(payment);
        sections.push(self.template.footer.clone());
        sections.push(vec![self.template.closing.clone()]);

        sections
            .into_iter()
            .filter(|section| !section.is_empty())
            .map(|section| section.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn header(order: &PricedOrder) -> Vec<String> {
    let customer = order.customer();

    let mut lines = vec![
        format!("📋 *Pedido:* {}", order.id()),
        format!("👤 *Cliente:* {}", customer.name.trim()),
        format!("📱 *WhatsApp:* {}", customer.phone.trim()),
    ];

    if let Some(address) = customer
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty())
    {
        lines.push(format!("📍 *Endereço:* {address}"));
    }

    lines
}

fn products(order: &PricedOrder, format: &CurrencyFormat) -> Vec<String> {
    let mut lines = vec!["🛒 *PRODUTOS:*".to_string()];

    lines.extend(order.lines().iter().map(|line| {
        format!(
            "• {}x {} - {}",
            line.quantity,
            line.name,
            format.format(line.line_total)
        )
    }));

    lines
}

/// A rate as percentage points, e.g. `15` for 15%.
fn percent_points(percent: Percentage) -> Decimal {
    (percent * Decimal::ONE_HUNDRED).normalize()
}

/// Where order messages are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingEndpoint {
    /// Messaging service base, e.g. `https://wa.me`
    pub base_url: String,

    /// Store's phone-number-like destination
    pub destination: String,
}

impl MessagingEndpoint {
    /// Build the deep link carrying `text`.
    pub fn link_for(&self, text: &str) -> DeepLink {
        DeepLink(format!(
            "{}/{}?text={}",
            self.base_url.trim_end_matches('/'),
            self.destination,
            urlencoding::encode(text)
        ))
    }
}

/// A messaging deep link, `<base>/<destination>?text=<percent-encoded text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink(String);

impl DeepLink {
    /// The link as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opens messaging links. Fire-and-forget: no result, no retries.
pub trait MessageChannel {
    /// Hand the link to whatever opens it.
    fn open(&self, link: &DeepLink);
}

/// Channel that only records the link in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChannel;

impl MessageChannel for TracingChannel {
    fn open(&self, link: &DeepLink) {
        info!(link = %link, "opening messaging link");
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        catalog::tests::test_catalog,
        customer::CustomerInfo,
        order_id::OrderId,
        pricing::{PaymentMethod, PricingRules, quote},
        upsell::offer_for,
    };

    use super::*;

    fn render(
        upsell: u32,
        payment: PaymentMethod,
        rules: PricingRules,
        customer: CustomerInfo,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let catalog = test_catalog()?;
        let mut cart = Cart::new(&catalog);
        cart.add("cookies")?;
        cart.add("cookies")?;

        let offer = offer_for(&cart, upsell).ok_or("expected offer")?;
        let quote = quote(&cart, Some(&offer), Some(payment), &rules);
        let id = OrderId::parse("DP48291304").ok_or("invalid id")?;
        let order = crate::order::PricedOrder::new(id, &cart, Some(&offer), quote, payment, customer);

        let template = MessageTemplate {
            banner: "🍪 *NOVO PEDIDO - DOCES* 🍫".to_string(),
            footer: vec!["📅 *Entrega:* Sábados e Domingos".to_string()],
            ..MessageTemplate::default()
        };

        Ok(OrderSerializer::new(template).render(&order))
    }

    fn customer() -> CustomerInfo {
        CustomerInfo::new("Ana", "(32) 99999-0000").with_address("Rua A, 1")
    }

    #[test]
    fn renders_every_section_in_order() -> TestResult {
        let rules = PricingRules::default().with_confirmation(Percentage::from(dec!(0.5)));
        let message = render(
            2,
            PaymentMethod::Card,
            rules,
            customer().with_notes("sem nozes"),
        )?;

        let expected = [
            "🍪 *NOVO PEDIDO - DOCES* 🍫",
            "📋 *Pedido:* DP48291304",
            "👤 *Cliente:* Ana",
            "📱 *WhatsApp:* (32) 99999-0000",
            "📍 *Endereço:* Rua A, 1",
            "• 2x cookies name - R$ 13,80",
            "• 2x brownies name - R$ 13,80",
            "🎉 *DESCONTO ESPECIAL:* 15% a partir da 2ª unidade de brownies name!",
            "💰 *Valor original:* R$ 27,60",
            "💰 *Valor com desconto:* R$ 26,57",
            "💚 *Economia:* R$ 1,04",
            "💳 *Acréscimo cartão (5%):* R$ 1,33",
            "💰 *Total com acréscimo:* R$ 27,89",
            "💳 *Valor para confirmar (50%):* R$ 13,95",
            "💳 *Restante na entrega:* R$ 13,94",
            "💳 *Pagamento:* Cartão",
            "📝 *Observações:* sem nozes",
            "📅 *Entrega:* Sábados e Domingos",
            "✅ Cliente confirma o pedido e aguarda instruções de pagamento.",
        ];

        let mut cursor = 0;

        for line in expected {
            let found = message
                .get(cursor..)
                .and_then(|rest| rest.find(line))
                .ok_or_else(|| format!("missing or out of order: {line}\n{message}"))?;

            cursor += found + line.len();
        }

        assert!(!message.contains("💰 *Total:*"));

        Ok(())
    }

    #[test]
    fn rate_labels_follow_the_rules_the_order_was_priced_with() -> TestResult {
        let rules = PricingRules {
            upsell_discount: Percentage::from(dec!(0.2)),
            card_surcharge: Percentage::from(dec!(0.1)),
            confirmation_share: Some(Percentage::from(dec!(0.3))),
        };
        let message = render(2, PaymentMethod::Card, rules, customer())?;

        assert!(message.contains("🎉 *DESCONTO ESPECIAL:* 20% a partir da 2ª unidade"));
        assert!(message.contains("💚 *Economia:* R$ 1,38"));
        assert!(message.contains("💳 *Acréscimo cartão (10%):*"));
        assert!(message.contains("💳 *Valor para confirmar (30%):*"));
        assert!(!message.contains("15%"));

        Ok(())
    }

    #[test]
    fn plain_total_without_discount_or_surcharge() -> TestResult {
        let message = render(1, PaymentMethod::Pix, PricingRules::default(), customer())?;

        assert!(message.contains("💰 *Total:* R$ 20,70"));
        assert!(!message.contains("DESCONTO"));
        assert!(!message.contains("Acréscimo"));
        assert!(!message.contains("Valor para confirmar"));
        assert!(!message.contains("Observações"));
        assert!(message.contains("💳 *Pagamento:* PIX"));

        Ok(())
    }

    #[test]
    fn address_is_omitted_when_not_collected() -> TestResult {
        let message = render(
            0,
            PaymentMethod::Pix,
            PricingRules::default(),
            CustomerInfo::new("Ana", "123").with_notes("   "),
        )?;

        assert!(!message.contains("Endereço"));
        assert!(!message.contains("Observações"));
        assert!(!message.contains("brownies"));

        Ok(())
    }

    #[test]
    fn sections_are_separated_by_blank_lines() -> TestResult {
        let message = render(0, PaymentMethod::Pix, PricingRules::default(), customer())?;

        assert!(message.starts_with("🍪 *NOVO PEDIDO - DOCES* 🍫\n\n📋 *Pedido:*"));
        assert!(!message.contains("\n\n\n"));

        Ok(())
    }

    #[test]
    fn deep_link_percent_encodes_text() {
        let endpoint = MessagingEndpoint {
            base_url: "https://wa.me/".to_string(),
            destination: "5532984218936".to_string(),
        };

        let link = endpoint.link_for("*Pedido:* R$ 1,00\nÃ");

        assert_eq!(
            link.as_str(),
            "https://wa.me/5532984218936?text=%2APedido%3A%2A%20R%24%201%2C00%0A%C3%83"
        );
    }

    #[test]
    fn percent_points_are_normalised() {
        assert_eq!(percent_points(Percentage::from(dec!(0.15))).to_string(), "15");
        assert_eq!(percent_points(Percentage::from(dec!(0.125))).to_string(), "12.5");
    }
}
