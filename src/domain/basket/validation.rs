use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::value_objects::Basket;

// ============================================================================
// Basket Validation - Results of re-evaluating a basket against scopes
// ============================================================================

/// Checkout area a validation run or a validation error pertains to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationScope {
    Products,
    Value,
    Promotion,
    Addresses,
    InvoiceAddress,
    ShippingAddress,
    Shipping,
    Payment,
    All,
    Other(String),
}

impl ValidationScope {
    pub fn as_str(&self) -> &str {
        match self {
            ValidationScope::Products => "Products",
            ValidationScope::Value => "Value",
            ValidationScope::Promotion => "Promotion",
            ValidationScope::Addresses => "Addresses",
            ValidationScope::InvoiceAddress => "InvoiceAddress",
            ValidationScope::ShippingAddress => "ShippingAddress",
            ValidationScope::Shipping => "Shipping",
            ValidationScope::Payment => "Payment",
            ValidationScope::All => "All",
            ValidationScope::Other(name) => name,
        }
    }
}

impl From<String> for ValidationScope {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Products" => ValidationScope::Products,
            "Value" => ValidationScope::Value,
            "Promotion" => ValidationScope::Promotion,
            "Addresses" => ValidationScope::Addresses,
            "InvoiceAddress" => ValidationScope::InvoiceAddress,
            "ShippingAddress" => ValidationScope::ShippingAddress,
            "Shipping" => ValidationScope::Shipping,
            "Payment" => ValidationScope::Payment,
            "All" => ValidationScope::All,
            _ => ValidationScope::Other(name),
        }
    }
}

impl From<&str> for ValidationScope {
    fn from(name: &str) -> Self {
        ValidationScope::from(name.to_string())
    }
}

impl From<ValidationScope> for String {
    fn from(scope: ValidationScope) -> Self {
        match scope {
            ValidationScope::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ValidationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorParameters {
    #[serde(default)]
    pub scopes: BTreeSet<ValidationScope>,
}

/// Business issue reported by a validation run; not a transport failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub parameters: ValidationErrorParameters,
}

impl ValidationError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        scopes: impl IntoIterator<Item = ValidationScope>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            parameters: ValidationErrorParameters {
                scopes: scopes.into_iter().collect(),
            },
        }
    }

    pub fn scopes(&self) -> &BTreeSet<ValidationScope> {
        &self.parameters.scopes
    }
}

/// `errors` is non-empty only when `valid` is false
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub adjusted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

impl ValidationResults {
    pub fn valid(adjusted: bool) -> Self {
        Self {
            valid: true,
            adjusted,
            errors: Vec::new(),
        }
    }

    pub fn invalid(adjusted: bool, errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            adjusted,
            errors,
        }
    }

    pub fn is_consistent(&self) -> bool {
        !self.valid || self.errors.is_empty()
    }

    /// Valid and untouched by the server: safe to skip ahead
    pub fn is_clean(&self) -> bool {
        self.valid && !self.adjusted
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketValidation {
    pub basket: Basket,
    pub results: ValidationResults,
}

impl BasketValidation {
    pub fn new(basket: Basket, results: ValidationResults) -> Self {
        Self { basket, results }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
