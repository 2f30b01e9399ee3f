pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod messaging;
pub mod metrics;
pub mod navigation;
pub mod orchestrator;
pub mod routing;
pub mod services;
pub mod state;
pub mod utils;

pub use config::CheckoutConfig;
pub use engine::{CheckoutEngine, EngineHandle};
pub use error::{CheckoutError, Result};
