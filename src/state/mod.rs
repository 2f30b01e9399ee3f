// ============================================================================
// State Container - Snapshots the engine reads
// ============================================================================
//
// The engine only reads from the state container. Writes happen by
// publishing commands; `InMemoryStore` applies them as a reducer.
//
// ============================================================================

mod in_memory;

pub use in_memory::{InMemoryStore, StoreSnapshot};

use crate::domain::basket::{Basket, ServerConfig};

pub trait StateContainer: Send + Sync {
    fn server_config(&self) -> ServerConfig;

    fn current_basket(&self) -> Option<Basket>;
}
