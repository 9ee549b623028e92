//! Customer details and submission checks

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::PaymentMethod;

/// Contact details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    /// Full name
    pub name: String,

    /// Phone / messaging number
    pub phone: String,

    /// Delivery address, for flows that deliver
    pub address: Option<String>,

    /// Free-text notes
    pub notes: Option<String>,
}

impl CustomerInfo {
    /// Customer with a name and phone number.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: None,
            notes: None,
        }
    }

    /// Set the delivery address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Value of a field, trimmed; `None` when absent or blank.
    pub fn field(&self, field: CustomerField) -> Option<&str> {
        let value = match field {
            CustomerField::Name => Some(self.name.as_str()),
            CustomerField::Phone => Some(self.phone.as_str()),
            CustomerField::Address => self.address.as_deref(),
        };

        value.map(str::trim).filter(|value| !value.is_empty())
    }

    /// Notes, trimmed; `None` when absent or blank.
    pub fn notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }
}

/// Fields a checkout flow may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    /// Customer name
    Name,

    /// Customer phone
    Phone,

    /// Delivery address
    Address,
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CustomerField::Name => "name",
            CustomerField::Phone => "phone",
            CustomerField::Address => "address",
        })
    }
}

/// Which customer fields a flow variant requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerRequirements {
    /// Whether the flow delivers and needs an address
    pub address: bool,
}

impl Default for CustomerRequirements {
    fn default() -> Self {
        Self { address: true }
    }
}

impl CustomerRequirements {
    /// Requirements for flows without delivery.
    pub const fn without_address() -> Self {
        Self { address: false }
    }

    /// Required fields in form order.
    pub fn fields(self) -> SmallVec<[CustomerField; 3]> {
        let mut fields = SmallVec::new();

        fields.push(CustomerField::Name);
        fields.push(CustomerField::Phone);

        if self.address {
            fields.push(CustomerField::Address);
        }

        fields
    }

    /// Required fields that are missing or blank.
    pub fn missing(self, customer: &CustomerInfo) -> SmallVec<[CustomerField; 3]> {
        self.fields()
            .into_iter()
            .filter(|field| customer.field(*field).is_none())
            .collect()
    }
}

/// Reasons a checkout cannot be submitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// There is nothing to order.
    #[error("the cart is empty")]
    EmptyCart,

    /// Required customer fields are missing or blank.
    #[error("please fill in all required fields: {}", join_fields(.0))]
    MissingFields(SmallVec<[CustomerField; 3]>),

    /// No payment method was chosen.
    #[error("please choose a payment method")]
    NoPaymentMethod,
}

fn join_fields(fields: &[CustomerField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether the customer form and payment choice allow submission.
pub fn is_submittable(
    customer: &CustomerInfo,
    payment: Option<PaymentMethod>,
    requirements: CustomerRequirements,
) -> bool {
    validate(customer, payment, requirements).is_ok()
}

/// Check the customer form and payment choice.
///
/// # Errors
///
/// - [`ValidationError::MissingFields`]: a required field is empty after trimming.
/// - [`ValidationError::NoPaymentMethod`]: no payment method has been chosen.
pub fn validate(
    customer: &CustomerInfo,
    payment: Option<PaymentMethod>,
    requirements: CustomerRequirements,
) -> Result<PaymentMethod, ValidationError> {
    let missing = requirements.missing(customer);

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    payment.ok_or(ValidationError::NoPaymentMethod)
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    fn complete() -> CustomerInfo {
        CustomerInfo::new("Ana", "(32) 99999-0000").with_address("Rua A, 1")
    }

    #[test]
    fn complete_form_with_payment_is_submittable() {
        assert!(is_submittable(
            &complete(),
            Some(PaymentMethod::Pix),
            CustomerRequirements::default()
        ));
    }

    #[test]
    fn whitespace_phone_is_not_submittable() {
        let mut customer = complete();
        customer.phone = "   \t".to_string();

        assert!(!is_submittable(
            &customer,
            Some(PaymentMethod::Card),
            CustomerRequirements::default()
        ));
        assert_eq!(
            validate(
                &customer,
                Some(PaymentMethod::Card),
                CustomerRequirements::default()
            ),
            Err(ValidationError::MissingFields(smallvec![
                CustomerField::Phone
            ]))
        );
    }

    #[test]
    fn missing_payment_method_blocks_submission() {
        assert_eq!(
            validate(&complete(), None, CustomerRequirements::default()),
            Err(ValidationError::NoPaymentMethod)
        );
    }

    #[test]
    fn address_only_required_when_flow_delivers() {
        let customer = CustomerInfo::new("Ana", "123");

        assert_eq!(
            validate(
                &customer,
                Some(PaymentMethod::Pix),
                CustomerRequirements::default()
            ),
            Err(ValidationError::MissingFields(smallvec![
                CustomerField::Address
            ]))
        );
        assert_eq!(
            validate(
                &customer,
                Some(PaymentMethod::Pix),
                CustomerRequirements::without_address()
            ),
            Ok(PaymentMethod::Pix)
        );
    }

    #[test]
    fn missing_fields_are_listed_in_form_order() {
        let error = validate(
            &CustomerInfo::default(),
            None,
            CustomerRequirements::default(),
        )
        .err();

        assert_eq!(
            error.map(|error| error.to_string()),
            Some("please fill in all required fields: name, phone, address".to_string())
        );
    }

    #[test]
    fn blank_notes_are_dropped() {
        let customer = complete().with_notes("  ");

        assert_eq!(customer.notes(), None);
        assert_eq!(
            complete().with_notes(" sem açúcar ").notes(),
            Some("sem açúcar")
        );
    }
}
