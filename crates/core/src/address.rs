//! Shipping address snapshot.
//!
//! The same shape is used for address-book entries and for the denormalised
//! copy stored on each order. The order copy is never a live reference: later
//! address edits do not touch historical orders.

use serde::{Deserialize, Serialize};

/// Default country for new addresses.
pub const DEFAULT_COUNTRY: &str = "India";

/// Address validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// One or more required fields are blank.
    #[error("missing required fields: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    /// A field is present but too short to be valid.
    #[error("{0}")]
    Invalid(&'static str),
}

/// A postal address.
///
/// Absent fields deserialise as blank so completeness is reported by
/// [`ShippingAddress::ensure_complete`], not by the JSON decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_owned()
}

impl ShippingAddress {
    /// Check that every required field carries a value.
    ///
    /// This is the only check the checkout performs.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Incomplete` listing the blank fields.
    pub fn ensure_complete(&self) -> Result<(), AddressError> {
        let required = [
            ("fullName", &self.full_name),
            ("addressLine1", &self.address_line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("phone", &self.phone),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressError::Incomplete(missing))
        }
    }

    /// Field-level rules applied when saving to the address book.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), AddressError> {
        self.ensure_complete()?;

        let rules: [(&str, usize, &'static str); 6] = [
            (self.full_name.as_str(), 2, "Full name is required"),
            (self.address_line1.as_str(), 5, "Address is required"),
            (self.city.as_str(), 2, "City is required"),
            (self.state.as_str(), 2, "State is required"),
            (self.postal_code.as_str(), 5, "Valid postal code is required"),
            (self.phone.as_str(), 10, "Valid phone number is required"),
        ];

        for (value, min, message) in rules {
            if value.trim().chars().count() < min {
                return Err(AddressError::Invalid(message));
            }
        }
        Ok(())
    }

    /// Trim whitespace, drop an empty second line and default the country.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_owned();
        self.address_line1 = self.address_line1.trim().to_owned();
        self.address_line2 = self
            .address_line2
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty());
        self.city = self.city.trim().to_owned();
        self.state = self.state.trim().to_owned();
        self.postal_code = self.postal_code.trim().to_owned();
        self.phone = self.phone.trim().to_owned();
        let country = self.country.trim();
        self.country = if country.is_empty() {
            default_country()
        } else {
            country.to_owned()
        };
        self
    }
}
