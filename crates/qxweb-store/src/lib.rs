pub mod backend;
pub mod database;
pub mod error;
pub mod schema;
pub mod selection;

pub use backend::{DurableStore, MemoryStore};
pub use database::Database;
pub use error::StoreError;
pub use selection::SelectionStore;
