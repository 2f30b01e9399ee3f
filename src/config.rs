use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CheckoutError, Result};

// ============================================================================
// Engine Configuration
// ============================================================================
//
// Defaults match the storefront's routes. Loaded from JSON or from
// CHECKOUT_* environment variables and validated before the engine starts.
//
// ============================================================================

/// Shortest settle delay the navigation gate accepts
pub const MIN_SETTLE_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub addresses: String,
    pub shipping: String,
    pub payment: String,
    pub review: String,
    /// Basket overview; also the fallback for issues no step owns
    pub basket: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            addresses: "/checkout/address".to_string(),
            shipping: "/checkout/shipping".to_string(),
            payment: "/checkout/payment".to_string(),
            review: "/checkout/review".to_string(),
            basket: "/basket".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Wait before navigating so in-flight state updates can settle
    pub settle_delay_ms: u64,
    /// Buffered commands before slow subscribers start lagging
    pub bus_capacity: usize,
    /// Concurrent validation calls per handler
    pub max_in_flight: usize,
    pub routes: RouteTable,
    pub metrics_port: u16,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: MIN_SETTLE_DELAY_MS,
            bus_capacity: 1024,
            max_in_flight: 16,
            routes: RouteTable::default(),
            metrics_port: 9090,
        }
    }
}

impl CheckoutConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by CHECKOUT_* environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, "CHECKOUT_SETTLE_DELAY_MS")? {
            config.settle_delay_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "CHECKOUT_BUS_CAPACITY")? {
            config.bus_capacity = value;
        }
        if let Some(value) = parse_var(&lookup, "CHECKOUT_MAX_IN_FLIGHT")? {
            config.max_in_flight = value;
        }
        if let Some(value) = parse_var(&lookup, "CHECKOUT_METRICS_PORT")? {
            config.metrics_port = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.settle_delay_ms < MIN_SETTLE_DELAY_MS {
            return Err(CheckoutError::InvalidConfig(format!(
                "settle_delay_ms must be at least {MIN_SETTLE_DELAY_MS}, got {}",
                self.settle_delay_ms
            )));
        }
        if self.bus_capacity == 0 {
            return Err(CheckoutError::InvalidConfig("bus_capacity must be positive".to_string()));
        }
        if self.max_in_flight == 0 {
            return Err(CheckoutError::InvalidConfig("max_in_flight must be positive".to_string()));
        }
        for path in [
            &self.routes.addresses,
            &self.routes.shipping,
            &self.routes.payment,
            &self.routes.review,
            &self.routes.basket,
        ] {
            if !path.starts_with('/') {
                return Err(CheckoutError::InvalidConfig(format!(
                    "route {path:?} must be absolute"
                )));
            }
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CheckoutError::InvalidEnv { key, value }),
    }
}
