use serde::{Deserialize, Serialize};

// ============================================================================
// Basket Value Objects
// ============================================================================
//
// Read-only snapshots of the basket and the server configuration as held by
// the external state container. Nothing here is persisted by this crate.
//
// ============================================================================

/// Basket identifier as issued by the commerce backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasketId(pub String);

impl BasketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BasketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketApproval {
    pub approval_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub id: BasketId,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub invoice_to_address: Option<String>,
    #[serde(default)]
    pub common_ship_to_address: Option<String>,
    #[serde(default)]
    pub common_shipping_method: Option<String>,
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub approval: Option<BasketApproval>,
}

impl Basket {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: BasketId::new(id),
            line_items: Vec::new(),
            invoice_to_address: None,
            common_ship_to_address: None,
            common_shipping_method: None,
            payment: None,
            approval: None,
        }
    }

    /// Order creation must go through the approval submission instead
    pub fn approval_required(&self) -> bool {
        self.approval
            .as_ref()
            .map(|approval| approval.approval_required)
            .unwrap_or(false)
    }

    pub fn has_addresses(&self) -> bool {
        self.invoice_to_address.is_some() && self.common_ship_to_address.is_some()
    }

    pub fn has_shipping_method(&self) -> bool {
        self.common_shipping_method.is_some()
    }

    pub fn has_payment(&self) -> bool {
        self.payment.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketServerConfig {
    /// Validate proactively before the first checkout step is shown
    #[serde(default)]
    pub acceleration: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub basket: BasketServerConfig,
}

impl ServerConfig {
    pub fn with_acceleration(acceleration: bool) -> Self {
        Self {
            basket: BasketServerConfig { acceleration },
        }
    }

    pub fn acceleration(&self) -> bool {
        self.basket.acceleration
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
