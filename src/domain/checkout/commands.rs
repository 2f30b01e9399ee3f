use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::basket::{Basket, BasketValidation, ServerConfig, ValidationScope};
use super::errors::ApiError;
use super::steps::CheckoutStep;

// ============================================================================
// Target Routes
// ============================================================================

/// Where an outcome wants the user to land next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRoute {
    /// Concrete path, already resolved from a step
    Path(String),
    /// Resolve from the first validation error once navigation happens
    Auto,
}

impl TargetRoute {
    pub fn path(path: impl Into<String>) -> Self {
        TargetRoute::Path(path.into())
    }
}

impl std::fmt::Display for TargetRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetRoute::Path(path) => f.write_str(path),
            TargetRoute::Auto => f.write_str("auto"),
        }
    }
}

// ============================================================================
// Checkout Commands - Everything that travels on the command stream
// ============================================================================
//
// Commands are immutable and carry all data a downstream consumer needs.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CheckoutCommand {
    StartCheckout,
    StartCheckoutSuccess {
        validation: BasketValidation,
    },
    StartCheckoutFail {
        error: ApiError,
    },
    ContinueCheckout {
        target_step: CheckoutStep,
    },
    ContinueCheckoutSuccess {
        target_route: Option<TargetRoute>,
        validation: BasketValidation,
    },
    ContinueCheckoutWithIssues {
        target_route: Option<TargetRoute>,
        validation: BasketValidation,
    },
    ContinueCheckoutFail {
        error: ApiError,
    },
    ValidateBasket {
        scopes: BTreeSet<ValidationScope>,
    },
    SubmitBasket,
    CreateOrder,

    // State container notifications
    LoadServerConfigSuccess {
        config: ServerConfig,
    },
    LoadBasketSuccess {
        basket: Basket,
    },
    LoadBasketFail {
        error: ApiError,
    },
}

impl CheckoutCommand {
    pub fn command_type(&self) -> &'static str {
        match self {
            CheckoutCommand::StartCheckout => "StartCheckout",
            CheckoutCommand::StartCheckoutSuccess { .. } => "StartCheckoutSuccess",
            CheckoutCommand::StartCheckoutFail { .. } => "StartCheckoutFail",
            CheckoutCommand::ContinueCheckout { .. } => "ContinueCheckout",
            CheckoutCommand::ContinueCheckoutSuccess { .. } => "ContinueCheckoutSuccess",
            CheckoutCommand::ContinueCheckoutWithIssues { .. } => "ContinueCheckoutWithIssues",
            CheckoutCommand::ContinueCheckoutFail { .. } => "ContinueCheckoutFail",
            CheckoutCommand::ValidateBasket { .. } => "ValidateBasket",
            CheckoutCommand::SubmitBasket => "SubmitBasket",
            CheckoutCommand::CreateOrder => "CreateOrder",
            CheckoutCommand::LoadServerConfigSuccess { .. } => "LoadServerConfigSuccess",
            CheckoutCommand::LoadBasketSuccess { .. } => "LoadBasketSuccess",
            CheckoutCommand::LoadBasketFail { .. } => "LoadBasketFail",
        }
    }

    pub fn validate_basket(scopes: impl IntoIterator<Item = ValidationScope>) -> Self {
        CheckoutCommand::ValidateBasket {
            scopes: scopes.into_iter().collect(),
        }
    }

    /// Failure carried by either of the two `*Fail` outcomes
    pub fn checkout_failure(&self) -> Option<&ApiError> {
        match self {
            CheckoutCommand::StartCheckoutFail { error }
            | CheckoutCommand::ContinueCheckoutFail { error } => Some(error),
            _ => None,
        }
    }
}
