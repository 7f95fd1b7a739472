//! Checkout form data and per-field validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use sofahub_core::{Email, EmailError, KenyanPhone, PhoneError, PhoneRule};

/// Counties offered by the shipping step.
pub const KENYAN_COUNTIES: [&str; 24] = [
    "Nairobi",
    "Mombasa",
    "Kisumu",
    "Nakuru",
    "Eldoret",
    "Thika",
    "Malindi",
    "Kitale",
    "Garissa",
    "Kakamega",
    "Machakos",
    "Meru",
    "Nyeri",
    "Kericho",
    "Embu",
    "Migori",
    "Homa Bay",
    "Naivasha",
    "Kitui",
    "Kapenguria",
    "Moyale",
    "Chuka",
    "Kiambu",
    "Kajiado",
];

// =============================================================================
// Validation Errors
// =============================================================================

/// A checkout form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Street,
    City,
    County,
    MpesaPhone,
}

impl Field {
    /// Form field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Street => "street",
            Self::City => "city",
            Self::County => "county",
            Self::MpesaPhone => "mpesa_phone",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<(Field, &'static str)>);

impl ValidationErrors {
    fn add(&mut self, field: Field, message: &'static str) {
        self.0.push((field, message));
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().copied()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn require(errors: &mut ValidationErrors, value: &str, field: Field, message: &'static str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn check_phone(errors: &mut ValidationErrors, value: &str, field: Field, required: &'static str) {
    match KenyanPhone::parse(value, PhoneRule::Step) {
        Ok(_) => {}
        Err(PhoneError::Empty) => errors.add(field, required),
        Err(PhoneError::Invalid(_)) => errors.add(field, "Please enter a valid Kenyan phone number"),
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Step 1: contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerInfo {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        require(&mut errors, &self.name, Field::Name, "Full name is required");

        match Email::parse(&self.email) {
            Ok(_) => {}
            Err(EmailError::Empty) => errors.add(Field::Email, "Email is required"),
            Err(EmailError::Invalid(_)) => errors.add(Field::Email, "Please enter a valid email"),
        }

        check_phone(&mut errors, &self.phone, Field::Phone, "Phone number is required");

        errors.into_result()
    }
}

/// Step 2: delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub county: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl ShippingAddress {
    /// Validate the required fields. The postal code is optional.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require(&mut errors, &self.street, Field::Street, "Street address is required");
        require(&mut errors, &self.city, Field::City, "City is required");
        require(&mut errors, &self.county, Field::County, "County is required");
        errors.into_result()
    }

    /// Postal code as sent to the order endpoint; empty when absent.
    #[must_use]
    pub fn zip_code(&self) -> String {
        self.postal_code
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }
}

/// Step 3: the number that receives the M-Pesa prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub mpesa_phone: String,
}

impl PaymentInfo {
    /// Validate the M-Pesa number.
    ///
    /// # Errors
    ///
    /// Returns the failing field with its message.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_phone(
            &mut errors,
            &self.mpesa_phone,
            Field::MpesaPhone,
            "M-Pesa phone number is required",
        );
        errors.into_result()
    }
}

/// Payment methods accepted at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Mpesa,
}

/// Details committed by completed checkout steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutData {
    pub customer: Option<CustomerInfo>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub mpesa_phone: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn customer(name: &str, email: &str, phone: &str) -> CustomerInfo {
        CustomerInfo {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_valid_customer() {
        assert!(
            customer("Amina Otieno", "amina@example.co.ke", "0712 345 678")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_customer_required_messages() {
        let errors = customer("  ", "", "").validate().unwrap_err();
        assert_eq!(errors.get(Field::Name), Some("Full name is required"));
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.get(Field::Phone), Some("Phone number is required"));
    }

    #[test]
    fn test_customer_format_messages() {
        let errors = customer("Amina", "amina@example", "0812345678")
            .validate()
            .unwrap_err();
        assert_eq!(errors.get(Field::Name), None);
        assert_eq!(errors.get(Field::Email), Some("Please enter a valid email"));
        assert_eq!(
            errors.get(Field::Phone),
            Some("Please enter a valid Kenyan phone number")
        );
    }

    #[test]
    fn test_step_phone_rule() {
        for ok in ["0712345678", "+254712345678", "0112345678"] {
            let info = PaymentInfo {
                mpesa_phone: ok.to_string(),
            };
            assert!(info.validate().is_ok(), "{ok} should pass");
        }
        for bad in ["25471234567", "0812345678", "254712345678"] {
            let info = PaymentInfo {
                mpesa_phone: bad.to_string(),
            };
            assert!(info.validate().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_mpesa_required() {
        let errors = PaymentInfo::default().validate().unwrap_err();
        assert_eq!(
            errors.get(Field::MpesaPhone),
            Some("M-Pesa phone number is required")
        );
    }

    #[test]
    fn test_shipping_validation() {
        let errors = ShippingAddress::default().validate().unwrap_err();
        assert_eq!(errors.get(Field::Street), Some("Street address is required"));
        assert_eq!(errors.get(Field::City), Some("City is required"));
        assert_eq!(errors.get(Field::County), Some("County is required"));
        assert_eq!(errors.iter().count(), 3);

        let address = ShippingAddress {
            street: "Ngong Road".to_string(),
            city: "Nairobi".to_string(),
            county: "Nairobi".to_string(),
            postal_code: None,
        };
        assert!(address.validate().is_ok());
        assert_eq!(address.zip_code(), "");
    }

    #[test]
    fn test_validation_errors_display() {
        let errors = customer("", "x@y.z", "0712345678").validate().unwrap_err();
        assert_eq!(errors.to_string(), "name: Full name is required");
    }

    #[test]
    fn test_counties_start_with_nairobi() {
        assert_eq!(KENYAN_COUNTIES.first(), Some(&"Nairobi"));
        assert!(KENYAN_COUNTIES.contains(&"Homa Bay"));
    }
}
