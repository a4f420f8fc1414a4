//! crates/fieldtest_core/src/ports.rs
//!
//! Defines the service contracts (traits) the console core depends on.
//! The remote business API and the PDF renderer sit behind these traits,
//! so the core never knows about HTTP or PDF libraries.

use crate::domain::{
    AcbReport, Admin, Bearer, Client, Company, ContactUs, DashboardCounts, EarthPitReport,
    HtBreakerReport, OilReport, Page, PageQuery,
};
use crate::forms::{AdminDraft, ClientDraft, CompanyDraft, LoginOutcome, LoginRequest};
use crate::report_doc::ReportDocument;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The remote API refused a submission and said why.
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote business API. Every call except `login` is authenticated.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    // --- Auth ---
    async fn login(&self, request: &LoginRequest) -> PortResult<LoginOutcome>;

    // --- Dashboard ---
    async fn dashboard_counts(&self, bearer: &Bearer) -> PortResult<DashboardCounts>;

    // --- Admins ---
    async fn list_admins(&self, bearer: &Bearer) -> PortResult<Vec<Admin>>;

    async fn create_admin(&self, bearer: &Bearer, draft: &AdminDraft) -> PortResult<()>;

    async fn delete_admin(&self, bearer: &Bearer, id: i64) -> PortResult<()>;

    // --- Contact Us ---
    async fn list_contact_us(&self, bearer: &Bearer) -> PortResult<Vec<ContactUs>>;

    // --- Companies ---
    async fn list_companies(&self, bearer: &Bearer, query: PageQuery)
        -> PortResult<Page<Company>>;

    async fn get_company(&self, bearer: &Bearer, id: i64) -> PortResult<Company>;

    /// Creates the company when `draft.id` is empty, updates it otherwise.
    async fn save_company(&self, bearer: &Bearer, draft: &CompanyDraft) -> PortResult<()>;

    async fn delete_company(&self, bearer: &Bearer, id: i64) -> PortResult<()>;

    // --- Clients ---
    async fn list_clients(&self, bearer: &Bearer, query: PageQuery) -> PortResult<Page<Client>>;

    async fn save_client(&self, bearer: &Bearer, draft: &ClientDraft) -> PortResult<()>;

    async fn delete_client(&self, bearer: &Bearer, id: i64) -> PortResult<()>;

    // --- Reports ---
    async fn list_oil_reports(&self, bearer: &Bearer, query: PageQuery)
        -> PortResult<Page<OilReport>>;

    async fn get_oil_report(&self, bearer: &Bearer, id: i64) -> PortResult<OilReport>;

    async fn list_ht_breaker_reports(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<HtBreakerReport>>;

    async fn get_ht_breaker_report(&self, bearer: &Bearer, id: i64)
        -> PortResult<HtBreakerReport>;

    async fn list_acb_reports(&self, bearer: &Bearer, query: PageQuery)
        -> PortResult<Page<AcbReport>>;

    async fn list_earth_pit_reports(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<EarthPitReport>>;
}

/// Turns a laid-out report document into printable bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument) -> PortResult<Vec<u8>>;
}
