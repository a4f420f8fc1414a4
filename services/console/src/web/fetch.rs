//! services/console/src/web/fetch.rs
//!
//! Drives remote fetches through the session's slices.
//!
//! The session lock is released while the remote call is in flight, so two
//! overlapping requests both reach the API and whichever response lands last
//! is what the slice keeps.

use fieldtest_core::domain::{
    AcbReport, Admin, Client, Company, ContactUs, DashboardCounts, EarthPitReport,
    HtBreakerReport, OilReport, Page, PageQuery,
};
use fieldtest_core::ports::{PortError, PortResult};
use fieldtest_core::store::{ConsoleState, RemoteSlice};
use std::future::Future;
use tracing::{debug, info, warn};

use crate::web::responses::WebError;
use crate::web::state::{AppState, UserSession};

/// Picks one slice out of the root container.
pub type Selector<T> = fn(&mut ConsoleState) -> &mut RemoteSlice<T>;

pub mod slices {
    use super::*;

    pub fn dashboard(s: &mut ConsoleState) -> &mut RemoteSlice<DashboardCounts> {
        &mut s.dashboard
    }
    pub fn admins(s: &mut ConsoleState) -> &mut RemoteSlice<Vec<Admin>> {
        &mut s.admins
    }
    pub fn contact_us(s: &mut ConsoleState) -> &mut RemoteSlice<Vec<ContactUs>> {
        &mut s.contact_us
    }
    pub fn companies(s: &mut ConsoleState) -> &mut RemoteSlice<Page<Company>> {
        &mut s.companies
    }
    pub fn clients(s: &mut ConsoleState) -> &mut RemoteSlice<Page<Client>> {
        &mut s.clients
    }
    pub fn oil_reports(s: &mut ConsoleState) -> &mut RemoteSlice<Page<OilReport>> {
        &mut s.oil_reports
    }
    pub fn ht_breaker_reports(s: &mut ConsoleState) -> &mut RemoteSlice<Page<HtBreakerReport>> {
        &mut s.ht_breaker_reports
    }
    pub fn acb_reports(s: &mut ConsoleState) -> &mut RemoteSlice<Page<AcbReport>> {
        &mut s.acb_reports
    }
    pub fn earth_pit_reports(s: &mut ConsoleState) -> &mut RemoteSlice<Page<EarthPitReport>> {
        &mut s.earth_pit_reports
    }
}

/// A request-scoped handle tying the shared app state to one browser session.
pub struct Loader<'a> {
    pub app: &'a AppState,
    pub session: &'a UserSession,
}

impl<'a> Loader<'a> {
    pub fn new(app: &'a AppState, session: &'a UserSession) -> Self {
        Self { app, session }
    }

    /// Fetches into `select` unless it already holds data. `force` comes from a retry link.
    pub async fn ensure<T, F, Fut>(
        &self,
        select: Selector<T>,
        force: bool,
        what: &'static str,
        fetch: F,
    ) -> Result<(), WebError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PortResult<T>>,
    {
        let needed = {
            let mut state = self.session.state.lock().await;
            force || select(&mut state).needs_fetch()
        };
        if !needed {
            debug!("{} already loaded", what);
            return Ok(());
        }
        self.run(select, what, fetch(), RemoteSlice::apply).await
    }

    /// Like `ensure`, but also refetches when a different page is asked for.
    pub async fn ensure_page<T, F, Fut>(
        &self,
        select: Selector<Page<T>>,
        query: PageQuery,
        force: bool,
        what: &'static str,
        fetch: F,
    ) -> Result<(), WebError>
    where
        F: FnOnce(PageQuery) -> Fut,
        Fut: Future<Output = PortResult<Page<T>>>,
    {
        let needed = {
            let mut state = self.session.state.lock().await;
            let slice = select(&mut state);
            let needed = force || slice.needs_page(query);
            if !needed {
                slice.prepare_page(query);
            }
            needed
        };
        if !needed {
            debug!("{} page {} already loaded", what, query.page);
            return Ok(());
        }
        self.run(select, what, fetch(query), move |slice, result| {
            slice.apply_page(query, result)
        })
        .await
    }

    /// Marks the slice loading, awaits `call` unlocked, then folds the result in.
    async fn run<T, Fut, A>(
        &self,
        select: Selector<T>,
        what: &'static str,
        call: Fut,
        fold: A,
    ) -> Result<(), WebError>
    where
        Fut: Future<Output = PortResult<T>>,
        A: FnOnce(&mut RemoteSlice<T>, PortResult<T>) -> PortResult<()>,
    {
        {
            let mut state = self.session.state.lock().await;
            select(&mut state).begin();
        }

        let result = call.await;

        let outcome = {
            let mut state = self.session.state.lock().await;
            fold(select(&mut state), result)
        };
        match outcome {
            Ok(()) => Ok(()),
            Err(PortError::Unauthorized) => Err(self.expire().await),
            Err(e) => {
                // The slice's error flag drives the retry UI.
                warn!("Fetching {} failed: {}", what, e);
                Ok(())
            }
        }
    }

    /// Passes a one-off call result through, clearing the session on 401.
    pub async fn settle<T>(&self, result: PortResult<T>) -> Result<T, WebError> {
        match result {
            Ok(value) => Ok(value),
            Err(PortError::Unauthorized) => Err(self.expire().await),
            Err(e) => Err(e.into()),
        }
    }

    /// Drops the session so the next request starts from nothing.
    pub async fn expire(&self) -> WebError {
        self.session.state.lock().await.reset();
        if self.app.sessions.remove(&self.session.bearer) {
            info!("Session cleared after an unauthorized response");
        }
        WebError::Unauthorized
    }
}
