//! services/console/src/web/screens.rs
//!
//! Handlers for the protected screens: dashboard, directories, reports and PDFs.
//!
//! Every handler receives the browser's `UserSession` from the `require_token`
//! middleware and loads what it shows through a `Loader`.

use axum::{
    extract::{Extension, Form, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use fieldtest_core::domain::{
    AcbReport, Admin, Client, Company, ContactUs, EarthPitReport, HtBreakerReport, OilReport,
    Page, PageQuery, Role,
};
use fieldtest_core::forms::{AdminForm, ClientForm, CompanyForm};
use fieldtest_core::guard::{active_tab, tabs_for, Route, Tab};
use fieldtest_core::ports::PortError;
use fieldtest_core::report_doc::{ht_breaker_document, oil_report_document, ReportDocument, MISSING};
use fieldtest_core::store::ConsoleState;
use fieldtest_core::table::{CallToAction, Column, RetryTarget, TableView};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::web::fetch::{slices, Loader, Selector};
use crate::web::responses::WebError;
use crate::web::state::{AppState, UserSession};
use crate::web::views::{self, escape, FormValues};

type Screen = Result<Response, WebError>;

//=========================================================================================
// Query and Form Payloads
//=========================================================================================

/// Query string shared by list screens.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub retry: Option<String>,
    pub tab: Option<String>,
    /// Record to edit on the create tab.
    pub id: Option<i64>,
}

impl ListParams {
    fn query(&self, default_size: u32) -> PageQuery {
        PageQuery::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(default_size).min(100),
        )
    }

    fn force(&self) -> bool {
        matches!(self.retry.as_deref(), Some("1") | Some("true"))
    }

    fn tab(&self) -> Option<Tab> {
        Tab::from_query(self.tab.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub company_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub password: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

//=========================================================================================
// Columns
//=========================================================================================

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| MISSING.to_string())
}

fn cell_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

fn company_columns(master: bool) -> Vec<Column<Company>> {
    let mut columns = vec![
        Column::text("ID", |c: &Company| c.id.to_string()),
        Column::text("Name", |c: &Company| c.name.clone()),
        Column::text("Address", |c: &Company| c.address.clone()),
    ];
    if master {
        columns.push(Column::custom(
            "Actions",
            |c: &Company| c.id.to_string(),
            |c: &Company| {
                format!(
                    "<a href=\"/companies?tab=create&amp;id={}\">Edit</a> {}",
                    c.id,
                    views::delete_button(&format!("/companies/{}/delete", c.id))
                )
            },
        ));
    }
    columns
}

fn client_columns(master: bool) -> Vec<Column<Client>> {
    let mut columns = vec![
        Column::text("ID", |c: &Client| c.id.to_string()),
        Column::text("Name", |c: &Client| c.name.clone()),
        Column::text("Email", |c: &Client| c.email.clone()),
        Column::text("Phone", |c: &Client| c.phone.clone()),
        Column::text("Designation", |c: &Client| c.designation.clone()),
        Column::text("Company", |c: &Client| {
            c.company_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| MISSING.to_string())
        }),
    ];
    if master {
        columns.push(Column::custom(
            "Actions",
            |c: &Client| c.id.to_string(),
            |c: &Client| {
                format!(
                    "<a href=\"/clients?tab=create&amp;id={}\">Edit</a> {}",
                    c.id,
                    views::delete_button(&format!("/clients/{}/delete", c.id))
                )
            },
        ));
    }
    columns
}

fn admin_columns() -> Vec<Column<Admin>> {
    vec![
        Column::text("ID", |a: &Admin| a.id.to_string()),
        Column::text("Name", |a: &Admin| a.name.clone()),
        Column::text("Email", |a: &Admin| a.email.clone()),
        Column::text("Phone", |a: &Admin| a.phone.clone()),
        Column::text("Designation", |a: &Admin| a.designation.clone()),
        Column::text("Role", |a: &Admin| a.role.label().to_string()),
        Column::custom(
            "Actions",
            |a: &Admin| a.id.to_string(),
            |a: &Admin| views::delete_button(&format!("/admins/{}/delete", a.id)),
        ),
    ]
}

fn contact_columns() -> Vec<Column<ContactUs>> {
    vec![
        Column::text("Name", |m: &ContactUs| m.name.clone()),
        Column::text("Email", |m: &ContactUs| m.email.clone()),
        Column::text("Phone", |m: &ContactUs| m.phone.clone()),
        Column::text("Message", |m: &ContactUs| m.message.clone()),
        Column::text("Received", |m: &ContactUs| cell_date(m.created_at)),
    ]
}

fn oil_columns() -> Vec<Column<OilReport>> {
    vec![
        Column::text("Report No", |r: &OilReport| cell(&r.header.report_no)),
        Column::text("Date", |r: &OilReport| cell_date(r.header.report_date)),
        Column::text("Next Due", |r: &OilReport| cell_date(r.header.next_due_date)),
        Column::text("Equipment", |r: &OilReport| cell(&r.equipment)),
        Column::text("Serial No", |r: &OilReport| cell(&r.serial_no)),
        Column::text("Location", |r: &OilReport| cell(&r.location)),
        Column::custom(
            "PDF",
            |r: &OilReport| r.header.id.to_string(),
            |r: &OilReport| {
                format!("<a href=\"/reports/oil/{}/pdf\">Download</a>", r.header.id)
            },
        ),
    ]
}

fn ht_breaker_columns() -> Vec<Column<HtBreakerReport>> {
    vec![
        Column::text("Report No", |r: &HtBreakerReport| cell(&r.header.report_no)),
        Column::text("Date", |r: &HtBreakerReport| cell_date(r.header.report_date)),
        Column::text("Next Due", |r: &HtBreakerReport| {
            cell_date(r.header.next_due_date)
        }),
        Column::text("Make", |r: &HtBreakerReport| cell(&r.make)),
        Column::text("Type", |r: &HtBreakerReport| cell(&r.breaker_type)),
        Column::text("Panel", |r: &HtBreakerReport| cell(&r.panel)),
        Column::custom(
            "PDF",
            |r: &HtBreakerReport| r.header.id.to_string(),
            |r: &HtBreakerReport| {
                format!(
                    "<a href=\"/reports/ht-breaker/{}/pdf\">Download</a>",
                    r.header.id
                )
            },
        ),
    ]
}

fn acb_columns() -> Vec<Column<AcbReport>> {
    vec![
        Column::text("Report No", |r: &AcbReport| cell(&r.header.report_no)),
        Column::text("Date", |r: &AcbReport| cell_date(r.header.report_date)),
        Column::text("Next Due", |r: &AcbReport| cell_date(r.header.next_due_date)),
        Column::text("Make", |r: &AcbReport| cell(&r.make)),
        Column::text("Serial No", |r: &AcbReport| cell(&r.serial_no)),
        Column::text("Rating", |r: &AcbReport| cell(&r.rating)),
        Column::text("Location", |r: &AcbReport| cell(&r.location)),
    ]
}

fn earth_pit_columns() -> Vec<Column<EarthPitReport>> {
    vec![
        Column::text("Report No", |r: &EarthPitReport| cell(&r.header.report_no)),
        Column::text("Date", |r: &EarthPitReport| cell_date(r.header.report_date)),
        Column::text("Next Due", |r: &EarthPitReport| {
            cell_date(r.header.next_due_date)
        }),
        Column::text("Pit No", |r: &EarthPitReport| cell(&r.pit_no)),
        Column::text("Location", |r: &EarthPitReport| cell(&r.location)),
        Column::text("Resistance (Ohm)", |r: &EarthPitReport| {
            cell(&r.resistance_ohms)
        }),
    ]
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// The caller's role, or an unprivileged one when the session has no login recorded.
async fn current_role(session: &UserSession) -> Role {
    session
        .state
        .lock()
        .await
        .auth()
        .map(|a| a.role.clone())
        .unwrap_or_else(|| Role::Other(String::new()))
}

async fn require_master(session: &UserSession) -> Result<Role, WebError> {
    let role = current_role(session).await;
    if role.is_master_admin() {
        Ok(role)
    } else {
        Err(WebError::Forbidden)
    }
}

async fn render(session: &UserSession, route: Route, title: &str, body: &str) -> Response {
    let state = session.state.lock().await;
    Html(views::layout(title, state.auth(), route, None, body)).into_response()
}

/// A directory screen: tab strip plus the active tab's body.
async fn directory(session: &UserSession, route: Route, role: &Role, tab: Tab, body: &str) -> Response {
    let html = format!(
        "{}{}",
        views::tabs(route.path(), &tabs_for(role, route), tab),
        body
    );
    render(session, route, route.title(), &html).await
}

async fn invalidate(session: &UserSession, apply: fn(&mut ConsoleState)) {
    let mut state = session.state.lock().await;
    apply(&mut state);
}

/// Turns a failed submission into the message shown above the form.
async fn submission_failure(loader: &Loader<'_>, err: PortError, what: &str) -> Result<String, WebError> {
    match err {
        PortError::Unauthorized => Err(loader.expire().await),
        PortError::Rejected(reason) => Ok(reason),
        other => {
            warn!("Saving the {} failed: {}", what, other);
            Ok(format!("Could not save the {}. Please try again.", what))
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn paged_table<T, F, Fut>(
    loader: &Loader<'_>,
    select: Selector<Page<T>>,
    params: &ListParams,
    path: &str,
    what: &'static str,
    columns: &[Column<T>],
    empty: Option<CallToAction>,
    fetch: F,
) -> Result<String, WebError>
where
    F: FnOnce(PageQuery) -> Fut,
    Fut: Future<Output = Result<Page<T>, PortError>>,
{
    let query = params.query(loader.app.config.page_size);
    loader
        .ensure_page(select, query, params.force(), what, fetch)
        .await?;
    let mut state = loader.session.state.lock().await;
    let view = TableView::from_paged(
        columns,
        select(&mut state),
        &RetryTarget::new(path, Some(query)),
        empty,
    );
    Ok(views::table(&view))
}

#[allow(clippy::too_many_arguments)]
async fn list_table<T, F, Fut>(
    loader: &Loader<'_>,
    select: Selector<Vec<T>>,
    params: &ListParams,
    path: &str,
    what: &'static str,
    columns: &[Column<T>],
    empty: Option<CallToAction>,
    fetch: F,
) -> Result<String, WebError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, PortError>>,
{
    let query = params.query(loader.app.config.page_size);
    loader.ensure(select, params.force(), what, fetch).await?;
    let mut state = loader.session.state.lock().await;
    let view = TableView::from_list(
        columns,
        select(&mut state),
        query,
        &RetryTarget::new(path, Some(query)),
        empty,
    );
    Ok(views::table(&view))
}

//=========================================================================================
// Dashboard
//=========================================================================================

pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Query(params): Query<ListParams>,
) -> Screen {
    let loader = Loader::new(&app_state, &session);
    loader
        .ensure(slices::dashboard, params.force(), "dashboard", || {
            app_state.api.dashboard_counts(&session.bearer)
        })
        .await?;
    let body = {
        let state = session.state.lock().await;
        views::dashboard(&state)
    };
    Ok(render(&session, Route::Dashboard, "Dashboard", &body).await)
}

//=========================================================================================
// Companies
//=========================================================================================

pub async fn companies_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Query(params): Query<ListParams>,
) -> Screen {
    let loader = Loader::new(&app_state, &session);
    let role = current_role(&session).await;
    let tab = active_tab(&role, Route::Companies, params.tab());

    let body = match tab {
        Tab::Create => {
            let values = match params.id {
                Some(id) => company_values(&loader, id).await?,
                None => FormValues::default(),
            };
            views::company_form(&values, None, None)
        }
        Tab::View => {
            let master = role.is_master_admin();
            let empty = master.then(|| CallToAction::new("Add company", "/companies?tab=create"));
            paged_table(
                &loader,
                slices::companies,
                &params,
                "/companies",
                "companies",
                &company_columns(master),
                empty,
                |q| app_state.api.list_companies(&session.bearer, q),
            )
            .await?
        }
    };
    Ok(directory(&session, Route::Companies, &role, tab, &body).await)
}

async fn company_values(loader: &Loader<'_>, id: i64) -> Result<FormValues, WebError> {
    let cached = loader.session.state.lock().await.company(id).cloned();
    let company = match cached {
        Some(company) => company,
        None => {
            let result = loader
                .app
                .api
                .get_company(&loader.session.bearer, id)
                .await;
            loader.settle(result).await?
        }
    };
    Ok(FormValues {
        id: company.id.to_string(),
        name: company.name,
        address: company.address,
        ..FormValues::default()
    })
}

pub async fn save_company_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Form(input): Form<CompanyInput>,
) -> Screen {
    let role = require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let form = CompanyForm {
        id: non_empty(input.id),
        name: input.name,
        address: input.address,
    };
    let values = FormValues {
        id: form.id.clone().unwrap_or_default(),
        name: form.name.clone(),
        address: form.address.clone(),
        ..FormValues::default()
    };

    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            let body = views::company_form(&values, Some(&errors), None);
            return Ok(directory(&session, Route::Companies, &role, Tab::Create, &body).await);
        }
    };

    match app_state.api.save_company(&session.bearer, &draft).await {
        Ok(()) => {
            info!("Saved company '{}'", draft.name);
            invalidate(&session, |s| {
                s.companies.invalidate();
                s.dashboard.invalidate();
            })
            .await;
            Ok(Redirect::to("/companies?tab=view").into_response())
        }
        Err(e) => {
            let notice = submission_failure(&loader, e, "company").await?;
            let body = views::company_form(&values, None, Some(&notice));
            Ok(directory(&session, Route::Companies, &role, Tab::Create, &body).await)
        }
    }
}

pub async fn delete_company_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(id): Path<i64>,
) -> Screen {
    require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let result = app_state.api.delete_company(&session.bearer, id).await;
    loader.settle(result).await?;
    info!("Deleted company {}", id);
    invalidate(&session, |s| {
        s.companies.invalidate();
        s.dashboard.invalidate();
    })
    .await;
    Ok(Redirect::to("/companies").into_response())
}

//=========================================================================================
// Clients
//=========================================================================================

/// Companies offered in the client form's picker.
async fn company_options(loader: &Loader<'_>) -> Result<Vec<Company>, WebError> {
    match loader
        .app
        .api
        .list_companies(&loader.session.bearer, PageQuery::first(100))
        .await
    {
        Ok(page) => Ok(page.content),
        Err(PortError::Unauthorized) => Err(loader.expire().await),
        Err(e) => {
            warn!("Could not load companies for the client form: {}", e);
            Ok(Vec::new())
        }
    }
}

fn client_values(client: &Client) -> FormValues {
    FormValues {
        id: client.id.to_string(),
        name: client.name.clone(),
        email: client.email.clone(),
        phone: client.phone.clone(),
        designation: client.designation.clone(),
        company_id: client.company_id.map(|id| id.to_string()).unwrap_or_default(),
        ..FormValues::default()
    }
}

pub async fn clients_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Query(params): Query<ListParams>,
) -> Screen {
    let loader = Loader::new(&app_state, &session);
    let role = current_role(&session).await;
    let tab = active_tab(&role, Route::Clients, params.tab());

    let body = match tab {
        Tab::Create => {
            let values = match params.id {
                Some(id) => {
                    let state = session.state.lock().await;
                    let found = state
                        .clients()
                        .and_then(|page| page.content.iter().find(|c| c.id == id))
                        .map(client_values);
                    found.ok_or_else(|| WebError::NotFound(format!("Client {}", id)))?
                }
                None => FormValues::default(),
            };
            let companies = company_options(&loader).await?;
            views::client_form(&values, &companies, None, None)
        }
        Tab::View => {
            let master = role.is_master_admin();
            let empty = master.then(|| CallToAction::new("Add client", "/clients?tab=create"));
            paged_table(
                &loader,
                slices::clients,
                &params,
                "/clients",
                "clients",
                &client_columns(master),
                empty,
                |q| app_state.api.list_clients(&session.bearer, q),
            )
            .await?
        }
    };
    Ok(directory(&session, Route::Clients, &role, tab, &body).await)
}

pub async fn save_client_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Form(input): Form<ClientInput>,
) -> Screen {
    let role = require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let form = ClientForm {
        id: non_empty(input.id),
        name: input.name,
        email: input.email,
        phone: input.phone,
        designation: input.designation,
        company_id: non_empty(input.company_id),
    };
    let values = FormValues {
        id: form.id.clone().unwrap_or_default(),
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        designation: form.designation.clone(),
        company_id: form.company_id.clone().unwrap_or_default(),
        ..FormValues::default()
    };

    let (errors, notice) = match form.to_draft() {
        Err(errors) => (Some(errors), None),
        Ok(draft) => match app_state.api.save_client(&session.bearer, &draft).await {
            Ok(()) => {
                info!("Saved client '{}'", draft.name);
                invalidate(&session, |s| {
                    s.clients.invalidate();
                    s.dashboard.invalidate();
                })
                .await;
                return Ok(Redirect::to("/clients?tab=view").into_response());
            }
            Err(e) => (None, Some(submission_failure(&loader, e, "client").await?)),
        },
    };

    let companies = company_options(&loader).await?;
    let body = views::client_form(&values, &companies, errors.as_ref(), notice.as_deref());
    Ok(directory(&session, Route::Clients, &role, Tab::Create, &body).await)
}

pub async fn delete_client_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(id): Path<i64>,
) -> Screen {
    require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let result = app_state.api.delete_client(&session.bearer, id).await;
    loader.settle(result).await?;
    info!("Deleted client {}", id);
    invalidate(&session, |s| {
        s.clients.invalidate();
        s.dashboard.invalidate();
    })
    .await;
    Ok(Redirect::to("/clients").into_response())
}

//=========================================================================================
// Admins (Master Admin only)
//=========================================================================================

pub async fn admins_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Query(params): Query<ListParams>,
) -> Screen {
    let role = require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let tab = active_tab(&role, Route::Admins, params.tab());

    let body = match tab {
        Tab::Create => views::admin_form(&FormValues::default(), None, None),
        Tab::View => {
            list_table(
                &loader,
                slices::admins,
                &params,
                "/admins",
                "admins",
                &admin_columns(),
                Some(CallToAction::new("Add admin", "/admins?tab=create")),
                || app_state.api.list_admins(&session.bearer),
            )
            .await?
        }
    };
    Ok(directory(&session, Route::Admins, &role, tab, &body).await)
}

pub async fn create_admin_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Form(input): Form<AdminInput>,
) -> Screen {
    let role = require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let form = AdminForm {
        name: input.name,
        email: input.email,
        phone: input.phone,
        designation: input.designation,
        password: input.password,
    };
    let values = FormValues {
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        designation: form.designation.clone(),
        ..FormValues::default()
    };

    let (errors, notice) = match form.to_draft() {
        Err(errors) => (Some(errors), None),
        Ok(draft) => match app_state.api.create_admin(&session.bearer, &draft).await {
            Ok(()) => {
                info!("Created admin '{}'", draft.email);
                invalidate(&session, |s| s.admins.invalidate()).await;
                return Ok(Redirect::to("/admins?tab=view").into_response());
            }
            Err(e) => (None, Some(submission_failure(&loader, e, "admin").await?)),
        },
    };

    let body = views::admin_form(&values, errors.as_ref(), notice.as_deref());
    Ok(directory(&session, Route::Admins, &role, Tab::Create, &body).await)
}

pub async fn delete_admin_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(id): Path<i64>,
) -> Screen {
    require_master(&session).await?;
    let loader = Loader::new(&app_state, &session);
    let result = app_state.api.delete_admin(&session.bearer, id).await;
    loader.settle(result).await?;
    info!("Deleted admin {}", id);
    invalidate(&session, |s| s.admins.invalidate()).await;
    Ok(Redirect::to("/admins").into_response())
}

//=========================================================================================
// Contact Us
//=========================================================================================

pub async fn contact_us_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Query(params): Query<ListParams>,
) -> Screen {
    let loader = Loader::new(&app_state, &session);
    let body = list_table(
        &loader,
        slices::contact_us,
        &params,
        "/contact-us",
        "contact messages",
        &contact_columns(),
        None,
        || app_state.api.list_contact_us(&session.bearer),
    )
    .await?;
    Ok(render(&session, Route::ContactUs, "Contact Us", &body).await)
}

//=========================================================================================
// Reports
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Oil,
    HtBreaker,
    Acb,
    EarthPit,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Oil,
        ReportKind::HtBreaker,
        ReportKind::Acb,
        ReportKind::EarthPit,
    ];

    pub fn from_slug(slug: &str) -> Option<ReportKind> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::Oil => "oil",
            ReportKind::HtBreaker => "ht-breaker",
            ReportKind::Acb => "acb",
            ReportKind::EarthPit => "earth-pit",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Oil => "Oil Reports",
            ReportKind::HtBreaker => "HT Breaker Reports",
            ReportKind::Acb => "ACB Reports",
            ReportKind::EarthPit => "Earth Pit Reports",
        }
    }
}

fn report_nav(active: ReportKind) -> String {
    let links: Vec<String> = ReportKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "<a href=\"/reports/{}\"{}>{}</a>",
                kind.slug(),
                if *kind == active { " class=\"active\"" } else { "" },
                escape(kind.title())
            )
        })
        .collect();
    format!("<div class=\"tabs\">{}</div>", links.join(""))
}

pub async fn reports_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> Screen {
    let kind = ReportKind::from_slug(&slug)
        .ok_or_else(|| WebError::NotFound(format!("Report type '{}'", slug)))?;
    let loader = Loader::new(&app_state, &session);
    let path = format!("/reports/{}", kind.slug());
    let api = &app_state.api;
    let bearer = &session.bearer;

    let table = match kind {
        ReportKind::Oil => {
            paged_table(
                &loader,
                slices::oil_reports,
                &params,
                &path,
                "oil reports",
                &oil_columns(),
                None,
                |q| api.list_oil_reports(bearer, q),
            )
            .await?
        }
        ReportKind::HtBreaker => {
            paged_table(
                &loader,
                slices::ht_breaker_reports,
                &params,
                &path,
                "HT breaker reports",
                &ht_breaker_columns(),
                None,
                |q| api.list_ht_breaker_reports(bearer, q),
            )
            .await?
        }
        ReportKind::Acb => {
            paged_table(
                &loader,
                slices::acb_reports,
                &params,
                &path,
                "ACB reports",
                &acb_columns(),
                None,
                |q| api.list_acb_reports(bearer, q),
            )
            .await?
        }
        ReportKind::EarthPit => {
            paged_table(
                &loader,
                slices::earth_pit_reports,
                &params,
                &path,
                "earth pit reports",
                &earth_pit_columns(),
                None,
                |q| api.list_earth_pit_reports(bearer, q),
            )
            .await?
        }
    };

    let body = format!("{}{}", report_nav(kind), table);
    Ok(render(&session, Route::Reports, kind.title(), &body).await)
}

//=========================================================================================
// PDF Downloads
//=========================================================================================

/// The customer block's company: the loaded page if it has it, the API otherwise.
async fn report_company(loader: &Loader<'_>, id: Option<i64>) -> Result<Option<Company>, WebError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let cached = loader.session.state.lock().await.company(id).cloned();
    if cached.is_some() {
        return Ok(cached);
    }
    match loader.app.api.get_company(&loader.session.bearer, id).await {
        Ok(company) => Ok(Some(company)),
        Err(PortError::Unauthorized) => Err(loader.expire().await),
        Err(e) => {
            warn!("Company {} for the report header is unavailable: {}", id, e);
            Ok(None)
        }
    }
}

fn pdf_response(app_state: &AppState, document: &ReportDocument) -> Screen {
    let bytes = app_state.renderer.render(document)?;
    info!("Serving {} ({} bytes)", document.file_name, bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn oil_pdf_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(id): Path<i64>,
) -> Screen {
    let loader = Loader::new(&app_state, &session);
    let result = app_state.api.get_oil_report(&session.bearer, id).await;
    let report = loader.settle(result).await?;
    let company = report_company(&loader, report.header.company_id).await?;
    let document = oil_report_document(&report, company.as_ref(), app_state.config.stamp_offset);
    pdf_response(&app_state, &document)
}

pub async fn ht_breaker_pdf_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(id): Path<i64>,
) -> Screen {
    let loader = Loader::new(&app_state, &session);
    let result = app_state.api.get_ht_breaker_report(&session.bearer, id).await;
    let report = loader.settle(result).await?;
    let company = report_company(&loader, report.header.company_id).await?;
    let document = ht_breaker_document(&report, company.as_ref(), app_state.config.stamp_offset);
    pdf_response(&app_state, &document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_kinds_round_trip_their_slugs() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(ReportKind::from_slug("transformer"), None);
    }

    #[test]
    fn list_params_clamp_size_and_detect_retry() {
        let params = ListParams {
            page: Some(3),
            size: Some(500),
            retry: Some("1".into()),
            ..ListParams::default()
        };
        assert_eq!(params.query(10), PageQuery::new(3, 100));
        assert!(params.force());
        assert_eq!(ListParams::default().query(10), PageQuery::first(10));
        assert!(!ListParams::default().force());
    }

    #[test]
    fn missing_report_cells_use_placeholder() {
        assert_eq!(cell(&None), MISSING);
        assert_eq!(cell_date(None), MISSING);
        assert_eq!(
            cell_date(NaiveDate::from_ymd_opt(2024, 3, 9)),
            "09-03-2024"
        );
    }

    #[test]
    fn action_columns_are_master_only() {
        assert_eq!(company_columns(true).len(), company_columns(false).len() + 1);
        assert_eq!(client_columns(true).len(), client_columns(false).len() + 1);
    }
}
