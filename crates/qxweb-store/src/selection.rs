use std::sync::Arc;

use tracing::instrument;

use qxweb_core::Company;

use crate::backend::DurableStore;
use crate::error::StoreError;

/// Key holding the JSON-serialized selection (full company objects, in
/// order). The record itself carries no versioning field; unreadable
/// old-shaped records are discarded by the caller.
pub const SELECTION_KEY: &str = "compare.companies";
/// Derived count, stored after every mutation.
pub const COUNT_KEY: &str = "compare.count";
/// Derived floating-panel visibility flag.
pub const VISIBLE_KEY: &str = "compare.visible";

/// Typed access to the persisted selection record. The selection manager
/// is the sole writer of these keys.
pub struct SelectionStore {
    store: Arc<dyn DurableStore>,
}

impl SelectionStore {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Serialize the full selection plus the derived count and visibility
    /// flag, replacing any prior record.
    #[instrument(skip(self, selection), fields(count = selection.len(), visible))]
    pub fn save(&self, selection: &[Company], visible: bool) -> Result<(), StoreError> {
        let json = serde_json::to_string(selection)?;
        self.store.write(SELECTION_KEY, &json)?;
        self.store.write(COUNT_KEY, &selection.len().to_string())?;
        self.store.write(VISIBLE_KEY, if visible { "true" } else { "false" })?;
        Ok(())
    }

    /// Load the persisted selection. An absent record is an empty
    /// selection; a malformed one is a `Serialization` error the caller
    /// turns into an empty selection.
    pub fn load(&self) -> Result<Vec<Company>, StoreError> {
        match self.store.read(SELECTION_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}
