use std::collections::HashMap;

use parking_lot::RwLock;

/// The tab's URL query string, as seen by the selection manager. The
/// manager is the sole writer; `replace_query_param` is a silent replace
/// with no history push, so back-navigation stays clean.
pub trait AddressBar: Send + Sync {
    fn query_param(&self, key: &str) -> Option<String>;
    fn replace_query_param(&self, key: &str, value: &str);
    fn remove_query_param(&self, key: &str);
}

/// In-process address bar used by tests and the HTTP surface, which
/// simulates one browser tab per process.
#[derive(Default)]
pub struct MemoryAddressBar {
    params: RwLock<HashMap<String, String>>,
}

impl MemoryAddressBar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressBar for MemoryAddressBar {
    fn query_param(&self, key: &str) -> Option<String> {
        self.params.read().get(key).cloned()
    }

    fn replace_query_param(&self, key: &str, value: &str) {
        self.params.write().insert(key.to_string(), value.to_string());
    }

    fn remove_query_param(&self, key: &str) {
        self.params.write().remove(key);
    }
}
