use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use url::Url;

use qxweb_core::{Catalog, Company, Route};
use qxweb_store::{DurableStore, SelectionStore};

use crate::address::AddressBar;
use crate::share::{self, QUERY_PARAM};

/// Hard cap on how many companies can be compared at once.
pub const MAX_SELECTION: usize = 4;

/// What an `add` call did. Externally all three are silent (the listing
/// UI disables the control instead of surfacing a message), but callers
/// and tests can tell the cases apart without diffing before/after state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
    CapacityExceeded,
}

struct Inner {
    selection: Vec<Company>,
    route: Route,
    visible: bool,
}

/// The per-tab comparison selection: an ordered, duplicate-free sequence
/// of at most four companies, persisted to durable storage after every
/// mutation and mirrored into the URL query string on the comparison
/// page. Constructed once per session and shared by reference with every
/// rendering surface; the manager is the sole writer of both channels.
///
/// Storage is written first, then the URL is derived from the
/// now-consistent state, never the reverse. Storage failures are logged
/// and the selection keeps working in memory for the rest of the session.
pub struct SelectionManager {
    catalog: Arc<dyn Catalog>,
    store: SelectionStore,
    address_bar: Arc<dyn AddressBar>,
    origin: Url,
    inner: Mutex<Inner>,
}

impl SelectionManager {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn DurableStore>,
        address_bar: Arc<dyn AddressBar>,
        origin: Url,
    ) -> Self {
        Self {
            catalog,
            store: SelectionStore::new(store),
            address_bar,
            origin,
            inner: Mutex::new(Inner {
                selection: Vec::new(),
                route: Route::default(),
                visible: false,
            }),
        }
    }

    /// Append a company unless the selection is full or already holds it.
    pub fn add(&self, company: Company) -> AddOutcome {
        let mut inner = self.inner.lock();
        if inner.selection.iter().any(|c| c.id == company.id) {
            return AddOutcome::AlreadyPresent;
        }
        if inner.selection.len() >= MAX_SELECTION {
            return AddOutcome::CapacityExceeded;
        }
        debug!(company_id = %company.id, "company added to comparison");
        inner.selection.push(company);
        self.persist(&mut inner);
        AddOutcome::Added
    }

    /// Remove by identifier; false if the company was not selected.
    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.selection.len();
        inner.selection.retain(|c| c.id.as_str() != id);
        if inner.selection.len() == before {
            return false;
        }
        self.persist(&mut inner);
        true
    }

    /// Empty the selection unconditionally. The persisted record remains,
    /// as an empty list.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.selection.clear();
        self.persist(&mut inner);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().selection.iter().any(|c| c.id.as_str() == id)
    }

    pub fn count(&self) -> usize {
        self.inner.lock().selection.len()
    }

    /// Snapshot of the current selection, in insertion order.
    pub fn selection(&self) -> Vec<Company> {
        self.inner.lock().selection.clone()
    }

    /// True iff at least two companies are selected and the tab is not on
    /// the comparison page itself.
    pub fn is_panel_visible(&self) -> bool {
        self.inner.lock().visible
    }

    pub fn route(&self) -> Route {
        self.inner.lock().route.clone()
    }

    /// Absolute URL to the comparison page carrying the current selection,
    /// or an empty string when nothing is selected.
    pub fn sharing_link(&self) -> String {
        let inner = self.inner.lock();
        let ids: Vec<&str> = inner.selection.iter().map(|c| c.id.as_str()).collect();
        share::sharing_link(&self.origin, &ids)
    }

    /// Replace the selection by re-resolving the given ids against the
    /// catalog: truncated to four before resolution, unknown ids and
    /// duplicates silently dropped. Does not write back to either channel.
    pub fn hydrate_from_ids<S: AsRef<str>>(&self, ids: &[S]) {
        let mut inner = self.inner.lock();
        inner.selection = self.resolve(ids);
        Self::recompute_visibility(&mut inner);
    }

    /// Route-change protocol. On the comparison page a non-empty URL
    /// parameter wins; otherwise (and on every other page) the durable
    /// record supplies the ids, with a malformed record resetting to an
    /// empty selection instead of propagating.
    pub fn navigate(&self, route: Route) {
        let mut inner = self.inner.lock();
        inner.route = route;

        let url_ids = if inner.route.is_compare() {
            self.address_bar
                .query_param(QUERY_PARAM)
                .map(|value| share::split_ids(&value))
                .filter(|ids| !ids.is_empty())
        } else {
            None
        };

        let ids = match url_ids {
            Some(ids) => ids,
            None => match self.store.load() {
                Ok(stored) => stored.iter().map(|c| c.id.as_str().to_string()).collect(),
                Err(e) => {
                    warn!(error = %e, "selection hydration failed; starting empty");
                    Vec::new()
                }
            },
        };

        inner.selection = self.resolve(&ids);
        Self::recompute_visibility(&mut inner);
        debug!(route = %inner.route.path(), count = inner.selection.len(), "selection hydrated");
    }

    fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Company> {
        let mut resolved: Vec<Company> = Vec::new();
        for id in ids.iter().take(MAX_SELECTION) {
            let id = id.as_ref();
            if resolved.iter().any(|c| c.id.as_str() == id) {
                continue;
            }
            match self.catalog.find_by_id(id) {
                Some(company) => resolved.push(company),
                None => debug!(company_id = id, "dropping unresolvable id"),
            }
        }
        resolved
    }

    fn recompute_visibility(inner: &mut Inner) {
        inner.visible = inner.selection.len() >= 2 && !inner.route.is_compare();
    }

    /// Persistence protocol: recompute the visibility flag, write the full
    /// record (storage failures are logged, in-memory state continues),
    /// then mirror the id list into the URL when on the comparison page
    /// with a non-empty selection.
    fn persist(&self, inner: &mut Inner) {
        Self::recompute_visibility(inner);
        if let Err(e) = self.store.save(&inner.selection, inner.visible) {
            warn!(error = %e, "selection persistence failed; continuing in memory");
        }
        if inner.route.is_compare() && !inner.selection.is_empty() {
            let ids: Vec<&str> = inner.selection.iter().map(|c| c.id.as_str()).collect();
            self.address_bar.replace_query_param(QUERY_PARAM, &ids.join(","));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::MemoryAddressBar;
    use qxweb_core::{CompanyId, InMemoryCatalog};
    use qxweb_store::selection::SELECTION_KEY;
    use qxweb_store::{MemoryStore, StoreError};

    fn company(id: &str, name: &str) -> Company {
        Company {
            id: CompanyId::from_raw(id),
            name: name.to_string(),
            logo: String::new(),
            location: "Sydney, NSW".into(),
            services: vec!["Web Development".into()],
            team_size: None,
            founded: None,
            hourly_rate: None,
            min_project_size: None,
            avg_project_length: None,
            industry: None,
        }
    }

    fn catalog() -> Arc<InMemoryCatalog> {
        Arc::new(InMemoryCatalog::new(vec![
            company("acme", "Acme"),
            company("globex", "Globex"),
            company("initech", "Initech"),
            company("umbrella", "Umbrella"),
            company("hooli", "Hooli"),
        ]))
    }

    fn origin() -> Url {
        Url::parse("https://qx.net.au").unwrap()
    }

    struct Harness {
        manager: SelectionManager,
        store: Arc<MemoryStore>,
        bar: Arc<MemoryAddressBar>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let bar = Arc::new(MemoryAddressBar::new());
        let manager = SelectionManager::new(catalog(), store.clone(), bar.clone(), origin());
        Harness { manager, store, bar }
    }

    /// Storage backend that fails every call, simulating disabled storage.
    struct FailingStore;

    impl DurableStore for FailingStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("storage disabled".into()))
        }
        fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("storage disabled".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("storage disabled".into()))
        }
    }

    #[test]
    fn add_and_count() {
        let h = harness();
        assert_eq!(h.manager.add(company("acme", "Acme")), AddOutcome::Added);
        assert_eq!(h.manager.add(company("globex", "Globex")), AddOutcome::Added);
        assert_eq!(h.manager.count(), 2);
        assert!(h.manager.contains("acme"));
        assert!(!h.manager.contains("initech"));
    }

    #[test]
    fn add_is_idempotent() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        assert_eq!(h.manager.add(company("acme", "Acme")), AddOutcome::AlreadyPresent);
        assert_eq!(h.manager.count(), 1);
    }

    #[test]
    fn capacity_rejects_fifth_add() {
        let h = harness();
        for id in ["acme", "globex", "initech", "umbrella"] {
            assert_eq!(h.manager.add(company(id, id)), AddOutcome::Added);
        }
        assert_eq!(h.manager.add(company("hooli", "Hooli")), AddOutcome::CapacityExceeded);
        assert_eq!(h.manager.count(), 4);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme", "globex", "initech", "umbrella"]);
    }

    #[test]
    fn capacity_never_exceeded_under_any_add_sequence() {
        let h = harness();
        for _ in 0..3 {
            for id in ["acme", "globex", "initech", "umbrella", "hooli"] {
                h.manager.add(company(id, id));
                assert!(h.manager.count() <= MAX_SELECTION);
            }
        }
    }

    #[test]
    fn remove_then_readd_moves_to_end() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        h.manager.add(company("globex", "Globex"));
        assert!(h.manager.remove("acme"));
        h.manager.add(company("acme", "Acme"));

        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["globex", "acme"]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        assert!(!h.manager.remove("globex"));
        assert_eq!(h.manager.count(), 1);
    }

    #[test]
    fn clear_empties_but_record_persists_as_empty_list() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        h.manager.clear();
        assert_eq!(h.manager.count(), 0);
        assert_eq!(h.store.read(SELECTION_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn visibility_flag_truth_table() {
        let h = harness();
        h.manager.navigate(Route::Other("/companies".into()));
        assert!(!h.manager.is_panel_visible());

        h.manager.add(company("acme", "Acme"));
        assert!(!h.manager.is_panel_visible());

        h.manager.add(company("globex", "Globex"));
        assert!(h.manager.is_panel_visible());

        // Never visible on the comparison page itself
        h.manager.navigate(Route::Compare);
        assert!(!h.manager.is_panel_visible());
    }

    #[test]
    fn sharing_link_orders_ids() {
        let h = harness();
        h.manager.navigate(Route::Other("/companies".into()));
        h.manager.add(company("acme", "Acme"));
        h.manager.add(company("globex", "Globex"));
        assert_eq!(h.manager.count(), 2);
        assert!(h.manager.is_panel_visible());
        assert!(h.manager.sharing_link().ends_with("?companies=acme,globex"));
    }

    #[test]
    fn sharing_link_empty_selection() {
        let h = harness();
        assert_eq!(h.manager.sharing_link(), "");
    }

    #[test]
    fn sharing_link_roundtrip() {
        let h = harness();
        h.manager.add(company("globex", "Globex"));
        h.manager.add(company("acme", "Acme"));
        h.manager.add(company("initech", "Initech"));

        let link = h.manager.sharing_link();
        let ids = share::ids_from_url(&link);
        h.manager.hydrate_from_ids(&ids);

        let hydrated: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(hydrated, vec!["globex", "acme", "initech"]);
    }

    #[test]
    fn hydration_truncates_to_four_before_resolution() {
        let h = harness();
        h.manager.hydrate_from_ids(&["acme", "globex", "initech", "umbrella", "hooli"]);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme", "globex", "initech", "umbrella"]);
    }

    #[test]
    fn hydration_drops_unknown_ids_silently() {
        let h = harness();
        h.manager.hydrate_from_ids(&["unknown-id"]);
        assert_eq!(h.manager.count(), 0);

        h.manager.hydrate_from_ids(&["acme", "unknown", "globex"]);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme", "globex"]);
    }

    #[test]
    fn hydration_dedupes_ids() {
        let h = harness();
        h.manager.hydrate_from_ids(&["acme", "acme", "globex"]);
        assert_eq!(h.manager.count(), 2);
    }

    #[test]
    fn hydrate_replaces_prior_selection() {
        let h = harness();
        h.manager.add(company("umbrella", "Umbrella"));
        h.manager.hydrate_from_ids(&["acme"]);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme"]);
    }

    #[test]
    fn mutation_persists_to_durable_store() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        let record = h.store.read(SELECTION_KEY).unwrap().unwrap();
        assert!(record.contains("\"acme\""));
    }

    #[test]
    fn navigation_off_compare_hydrates_from_store() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        h.manager.add(company("globex", "Globex"));

        // Fresh manager over the same store: a new tab mount.
        let manager2 =
            SelectionManager::new(catalog(), h.store.clone(), Arc::new(MemoryAddressBar::new()), origin());
        manager2.navigate(Route::Other("/companies".into()));
        let ids: Vec<String> = manager2.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme", "globex"]);
    }

    #[test]
    fn compare_route_prefers_url_over_store() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        h.bar.replace_query_param(QUERY_PARAM, "initech,umbrella");

        h.manager.navigate(Route::Compare);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["initech", "umbrella"]);
    }

    #[test]
    fn compare_route_falls_back_to_store_when_param_absent() {
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        h.manager.navigate(Route::Compare);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme"]);
    }

    #[test]
    fn compare_route_falls_back_when_param_empty() {
        let h = harness();
        h.manager.add(company("globex", "Globex"));
        h.bar.replace_query_param(QUERY_PARAM, "");
        h.manager.navigate(Route::Compare);
        let ids: Vec<String> = h.manager.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["globex"]);
    }

    #[test]
    fn off_compare_route_never_consults_url() {
        let h = harness();
        h.bar.replace_query_param(QUERY_PARAM, "acme,globex");
        h.manager.navigate(Route::Other("/blog".into()));
        assert_eq!(h.manager.count(), 0);
    }

    #[test]
    fn mutations_on_compare_route_rewrite_url() {
        let h = harness();
        h.manager.navigate(Route::Compare);
        h.manager.add(company("acme", "Acme"));
        h.manager.add(company("globex", "Globex"));
        assert_eq!(h.bar.query_param(QUERY_PARAM).as_deref(), Some("acme,globex"));

        h.manager.remove("acme");
        assert_eq!(h.bar.query_param(QUERY_PARAM).as_deref(), Some("globex"));
    }

    #[test]
    fn mutations_off_compare_route_leave_url_alone() {
        let h = harness();
        h.manager.navigate(Route::Other("/companies".into()));
        h.manager.add(company("acme", "Acme"));
        assert!(h.bar.query_param(QUERY_PARAM).is_none());
    }

    #[test]
    fn clearing_on_compare_route_leaves_last_url_value() {
        // Empty selections are never written to the URL; the stale
        // parameter stays until the next non-empty write.
        let h = harness();
        h.manager.navigate(Route::Compare);
        h.manager.add(company("acme", "Acme"));
        h.manager.clear();
        assert_eq!(h.bar.query_param(QUERY_PARAM).as_deref(), Some("acme"));
        assert_eq!(h.manager.count(), 0);
    }

    #[test]
    fn malformed_storage_recovers_to_empty() {
        let h = harness();
        h.store.write(SELECTION_KEY, "{garbage").unwrap();
        h.manager.navigate(Route::Other("/companies".into()));
        assert_eq!(h.manager.count(), 0);
    }

    #[test]
    fn storage_failure_keeps_selection_in_memory() {
        let manager = SelectionManager::new(
            catalog(),
            Arc::new(FailingStore),
            Arc::new(MemoryAddressBar::new()),
            origin(),
        );
        assert_eq!(manager.add(company("acme", "Acme")), AddOutcome::Added);
        assert_eq!(manager.add(company("globex", "Globex")), AddOutcome::Added);
        assert_eq!(manager.count(), 2);
        assert!(manager.remove("acme"));
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn storage_failure_on_navigation_starts_empty() {
        let manager = SelectionManager::new(
            catalog(),
            Arc::new(FailingStore),
            Arc::new(MemoryAddressBar::new()),
            origin(),
        );
        manager.navigate(Route::Other("/companies".into()));
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn stored_ids_are_reresolved_against_catalog() {
        // A company that disappeared from the catalog since the record was
        // written is dropped at hydration, not resurrected from storage.
        let h = harness();
        h.manager.add(company("acme", "Acme"));
        h.manager.add(company("ghost", "Ghost")); // not in the catalog

        let manager2 =
            SelectionManager::new(catalog(), h.store.clone(), h.bar.clone(), origin());
        manager2.navigate(Route::Other("/companies".into()));
        let ids: Vec<String> = manager2.selection().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["acme"]);
    }
}
