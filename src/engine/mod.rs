mod coordinator;

pub use coordinator::{CheckoutEngine, EngineHandle};
