//! crates/fieldtest_core/src/store.rs
//!
//! Remote-state slices and the root container that composes them.
//!
//! Each slice tracks one remote resource through the fetch lifecycle
//! `Idle -> Loading -> {Success | Error}`. There is no deduplication or
//! cancellation: whichever response is applied last wins.

use crate::domain::{
    AcbReport, Admin, AuthState, Client, Company, ContactUs, DashboardCounts, EarthPitReport,
    HtBreakerReport, OilReport, Page, PageQuery,
};
use crate::ports::PortResult;

//=========================================================================================
// RemoteSlice
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// `{entity, loading, error}` for a single remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSlice<T> {
    pub entity: Option<T>,
    pub loading: bool,
    pub error: bool,
    stale: bool,
    /// The page whose fetch raised `error`, for paginated slices.
    failed_page: Option<PageQuery>,
}

impl<T> Default for RemoteSlice<T> {
    fn default() -> Self {
        Self {
            entity: None,
            loading: false,
            error: false,
            stale: false,
            failed_page: None,
        }
    }
}

impl<T> RemoteSlice<T> {
    pub fn begin(&mut self) {
        self.loading = true;
    }

    pub fn succeed(&mut self, payload: T) {
        self.loading = false;
        self.error = false;
        self.stale = false;
        self.failed_page = None;
        self.entity = Some(payload);
    }

    /// Marks the fetch as failed. The previously loaded entity stays visible.
    pub fn fail(&mut self) {
        self.loading = false;
        self.error = true;
    }

    /// Folds a fetch result into the slice, handing the error back to the caller.
    pub fn apply(&mut self, result: PortResult<T>) -> PortResult<()> {
        match result {
            Ok(payload) => {
                self.succeed(payload);
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// A loaded resource is never refreshed on its own; callers check this first.
    pub fn needs_fetch(&self) -> bool {
        self.entity.is_none() || self.stale
    }

    /// Forces the next `needs_fetch` to report true, e.g. after a successful create.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn phase(&self) -> FetchPhase {
        if self.loading {
            FetchPhase::Loading
        } else if self.error {
            FetchPhase::Error
        } else if self.entity.is_some() {
            FetchPhase::Success
        } else {
            FetchPhase::Idle
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<T> RemoteSlice<Page<T>> {
    /// Paginated slices also refetch when a different page is requested.
    pub fn needs_page(&self, query: PageQuery) -> bool {
        match &self.entity {
            Some(page) => self.stale || page.query() != query,
            None => true,
        }
    }

    /// `apply` for one page: a failure is remembered against `query`.
    pub fn apply_page(&mut self, query: PageQuery, result: PortResult<Page<T>>) -> PortResult<()> {
        let failed = result.is_err();
        let outcome = self.apply(result);
        if failed {
            self.failed_page = Some(query);
        }
        outcome
    }

    /// Called when `query` is served from the cache. An error raised by a different
    /// page does not apply to the one already loaded.
    pub fn prepare_page(&mut self, query: PageQuery) {
        let showing = self.entity.as_ref().is_some_and(|page| page.query() == query);
        if self.error && showing && self.failed_page != Some(query) {
            self.error = false;
            self.failed_page = None;
        }
    }
}

//=========================================================================================
// ConsoleState (root container)
//=========================================================================================

/// Everything one logged-in console session has fetched so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleState {
    pub auth: Option<AuthState>,
    pub dashboard: RemoteSlice<DashboardCounts>,
    pub admins: RemoteSlice<Vec<Admin>>,
    pub contact_us: RemoteSlice<Vec<ContactUs>>,
    pub companies: RemoteSlice<Page<Company>>,
    pub clients: RemoteSlice<Page<Client>>,
    pub oil_reports: RemoteSlice<Page<OilReport>>,
    pub ht_breaker_reports: RemoteSlice<Page<HtBreakerReport>>,
    pub acb_reports: RemoteSlice<Page<AcbReport>>,
    pub earth_pit_reports: RemoteSlice<Page<EarthPitReport>>,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logout: every slice and the auth state go back to their initial values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn login(&mut self, auth: AuthState) {
        self.auth = Some(auth);
    }

    // --- Selectors ---

    pub fn auth(&self) -> Option<&AuthState> {
        self.auth.as_ref()
    }

    pub fn is_master_admin(&self) -> bool {
        self.auth.as_ref().is_some_and(|a| a.role.is_master_admin())
    }

    pub fn dashboard_counts(&self) -> Option<&DashboardCounts> {
        self.dashboard.entity.as_ref()
    }

    pub fn admins(&self) -> &[Admin] {
        self.admins.entity.as_deref().unwrap_or(&[])
    }

    pub fn companies(&self) -> Option<&Page<Company>> {
        self.companies.entity.as_ref()
    }

    pub fn company(&self, id: i64) -> Option<&Company> {
        self.companies()
            .and_then(|page| page.content.iter().find(|c| c.id == id))
    }

    pub fn clients(&self) -> Option<&Page<Client>> {
        self.clients.entity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pageable, Role};
    use crate::ports::PortError;

    fn company_page(page_number: u32, names: &[&str]) -> Page<Company> {
        Page {
            content: names
                .iter()
                .enumerate()
                .map(|(i, name)| Company {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    address: "Ring Road".to_string(),
                })
                .collect(),
            pageable: Pageable {
                page_number,
                page_size: 10,
                offset: page_number as u64 * 10,
            },
            total_pages: 3,
            total_elements: 25,
            number_of_elements: names.len() as u32,
            first: page_number == 0,
            last: page_number == 2,
        }
    }

    #[test]
    fn success_clears_flags_and_stores_payload() {
        let mut slice = RemoteSlice::default();
        slice.begin();
        assert_eq!(slice.phase(), FetchPhase::Loading);
        let payload = company_page(0, &["Acme"]);
        slice.apply(Ok(payload.clone())).unwrap();
        assert!(!slice.loading);
        assert!(!slice.error);
        assert_eq!(slice.entity, Some(payload));
        assert_eq!(slice.phase(), FetchPhase::Success);
    }

    #[test]
    fn failure_keeps_previous_entity() {
        let mut slice = RemoteSlice::default();
        let previous = company_page(0, &["Acme", "Volta"]);
        slice.succeed(previous.clone());
        slice.begin();
        let err = slice
            .apply(Err(PortError::Unexpected("boom".into())))
            .unwrap_err();
        assert_eq!(err, PortError::Unexpected("boom".into()));
        assert!(!slice.loading);
        assert!(slice.error);
        assert_eq!(slice.entity, Some(previous));
    }

    #[test]
    fn failure_from_idle_leaves_entity_empty() {
        let mut slice: RemoteSlice<Vec<Admin>> = RemoteSlice::default();
        slice.begin();
        let _ = slice.apply(Err(PortError::Unauthorized));
        assert_eq!(slice.entity, None);
        assert_eq!(slice.phase(), FetchPhase::Error);
    }

    #[test]
    fn loaded_slice_is_not_refetched_until_invalidated() {
        let mut slice = RemoteSlice::default();
        assert!(slice.needs_fetch());
        slice.succeed(DashboardCounts::default());
        assert!(!slice.needs_fetch());
        slice.invalidate();
        assert!(slice.needs_fetch());
        slice.succeed(DashboardCounts::default());
        assert!(!slice.needs_fetch());
    }

    #[test]
    fn paged_slice_refetches_other_pages() {
        let mut slice = RemoteSlice::default();
        slice.succeed(company_page(1, &["Acme"]));
        assert!(!slice.needs_page(PageQuery::new(1, 10)));
        assert!(slice.needs_page(PageQuery::new(2, 10)));
        assert!(slice.needs_page(PageQuery::new(1, 20)));
    }

    #[test]
    fn failed_page_does_not_taint_the_loaded_one() {
        let mut slice = RemoteSlice::default();
        let first = PageQuery::new(0, 10);
        let second = PageQuery::new(1, 10);
        slice.apply_page(first, Ok(company_page(0, &["Acme"]))).unwrap();

        slice.begin();
        let _ = slice.apply_page(second, Err(PortError::Unexpected("boom".into())));
        assert!(slice.error);

        // Back on page 0: cached, so no refetch, and no stale error either.
        assert!(!slice.needs_page(first));
        slice.prepare_page(first);
        assert_eq!(slice.phase(), FetchPhase::Success);

        // Page 1 still has nothing loaded and is fetched again.
        assert!(slice.needs_page(second));
    }

    #[test]
    fn failed_page_keeps_its_error_when_revisited() {
        let mut slice = RemoteSlice::default();
        let first = PageQuery::new(0, 10);
        slice.succeed(company_page(0, &["Acme"]));
        slice.invalidate();
        let _ = slice.apply_page(first, Err(PortError::Unexpected("boom".into())));
        slice.prepare_page(first);
        assert!(slice.error);
    }

    #[test]
    fn later_response_overwrites_earlier_one() {
        let mut slice = RemoteSlice::default();
        slice.begin();
        slice.begin();
        slice.apply(Ok(company_page(2, &["Late"]))).unwrap();
        slice.apply(Ok(company_page(0, &["Early"]))).unwrap();
        assert_eq!(slice.entity.unwrap().content[0].name, "Early");
    }

    #[test]
    fn reset_restores_every_slice() {
        let mut state = ConsoleState::new();
        state.login(AuthState {
            role: Role::MasterAdmin,
            role_id: 1,
            username: "root".into(),
            email: "root@example.com".into(),
        });
        state.companies.succeed(company_page(0, &["Acme"]));
        state.admins.begin();
        let _ = state.contact_us.apply(Err(PortError::Unexpected("x".into())));
        state.dashboard.succeed(DashboardCounts {
            companies: 4,
            ..Default::default()
        });
        state.reset();
        assert_eq!(state, ConsoleState::default());
        assert!(state.auth().is_none());
    }

    #[test]
    fn selectors_read_loaded_entities() {
        let mut state = ConsoleState::new();
        assert!(state.admins().is_empty());
        assert!(state.dashboard_counts().is_none());
        state.companies.succeed(company_page(0, &["Acme", "Volta"]));
        assert_eq!(state.company(2).map(|c| c.name.as_str()), Some("Volta"));
        assert!(state.company(9).is_none());
        assert!(!state.is_master_admin());
    }
}
