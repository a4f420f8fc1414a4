//! services/console/src/adapters/http.rs
//!
//! The HTTP adapter, the concrete implementation of the `RemoteApi` port.
//! It attaches the bearer token, runs the response layers and parses bodies
//! into wire records. No retries, no backoff, no timeout.

use crate::adapters::layers::{run_layers, CallInfo, ResponseLayer};
use crate::adapters::records::{
    AcbReportRecord, AdminRecord, AdminSubmission, ClientRecord, ClientSubmission, CompanyRecord,
    CompanySubmission, ContactUsRecord, DashboardRecord, EarthPitReportRecord,
    HtBreakerReportRecord, LoginRecord, LoginResponseRecord, OilReportRecord, PageRecord,
};
use async_trait::async_trait;
use fieldtest_core::domain::{
    AcbReport, Admin, Bearer, Client, Company, ContactUs, DashboardCounts, EarthPitReport,
    HtBreakerReport, OilReport, Page, PageQuery,
};
use fieldtest_core::forms::{AdminDraft, ClientDraft, CompanyDraft, LoginOutcome, LoginRequest};
use fieldtest_core::ports::{PortError, PortResult, RemoteApi};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// The body the login endpoint sends for an unknown account.
const USERNAME_NOT_FOUND: &str = "Username Not Found";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpApiAdapter {
    client: reqwest::Client,
    base_url: String,
    layers: Vec<Arc<dyn ResponseLayer>>,
}

impl HttpApiAdapter {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            layers: Vec::new(),
        })
    }

    /// Appends a response layer. Layers run in the order they were added.
    pub fn with_layer(mut self, layer: Arc<dyn ResponseLayer>) -> Self {
        self.layers.push(layer);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&Bearer>,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> PortResult<reqwest::Response> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(bearer) = bearer {
            request = request.bearer_auth(bearer.as_str());
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", path, e);
            PortError::Unexpected(e.to_string())
        })?;

        let status = response.status();
        let call = CallInfo {
            method: &method,
            path,
            bearer,
        };
        if let Some(err) = run_layers(&self.layers, &call, status) {
            return Err(err);
        }
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        Err(status_error(status, path, detail))
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        bearer: &Bearer,
        query: &[(&str, String)],
    ) -> PortResult<R> {
        let response = self
            .send::<()>(Method::GET, path, Some(bearer), query, None)
            .await?;
        response.json::<R>().await.map_err(|e| {
            error!("Could not parse response from {}: {}", path, e);
            PortError::Unexpected(format!("Malformed response from {}: {}", path, e))
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        bearer: &Bearer,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> PortResult<()> {
        self.send(Method::POST, path, Some(bearer), query, body)
            .await
            .map(|_| ())
    }

    async fn get_page<R: DeserializeOwned, T>(
        &self,
        path: &str,
        bearer: &Bearer,
        query: PageQuery,
        convert: impl Fn(R) -> T,
    ) -> PortResult<Page<T>> {
        let record: PageRecord<R> = self.get_json(path, bearer, &page_params(query)).await?;
        Ok(record.to_domain(convert))
    }
}

fn page_params(query: PageQuery) -> Vec<(&'static str, String)> {
    vec![("page", query.page.to_string()), ("size", query.size.to_string())]
}

fn id_param(id: i64) -> Vec<(&'static str, String)> {
    vec![("id", id.to_string())]
}

/// Maps a non-success status that no layer claimed to a port error.
fn status_error(status: StatusCode, path: &str, detail: String) -> PortError {
    let detail = detail.trim().trim_matches('"').to_string();
    match status {
        StatusCode::NOT_FOUND => PortError::NotFound(path.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            PortError::Rejected(if detail.is_empty() {
                status.to_string()
            } else {
                detail
            })
        }
        _ => PortError::Unexpected(format!("{} returned {}", path, status)),
    }
}

/// The login endpoint answers either with a session JSON object or with the bare
/// string `Username Not Found` (sometimes JSON-quoted).
pub(crate) fn parse_login_body(body: &str) -> PortResult<LoginOutcome> {
    let trimmed = body.trim();
    if trimmed.trim_matches('"') == USERNAME_NOT_FOUND {
        return Ok(LoginOutcome::UsernameNotFound);
    }
    let record: LoginResponseRecord = serde_json::from_str(trimmed)
        .map_err(|e| PortError::Unexpected(format!("Malformed login response: {}", e)))?;
    Ok(LoginOutcome::Authenticated(record.to_domain()))
}

//=========================================================================================
// `RemoteApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteApi for HttpApiAdapter {
    async fn login(&self, request: &LoginRequest) -> PortResult<LoginOutcome> {
        let body = LoginRecord::from(request);
        let response = self
            .send(Method::POST, "API/Auth/Login", None, &[], Some(&body))
            .await?;
        let text = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        parse_login_body(&text)
    }

    async fn dashboard_counts(&self, bearer: &Bearer) -> PortResult<DashboardCounts> {
        let record: DashboardRecord = self
            .get_json("API/Dashboard/GetCounts", bearer, &[])
            .await?;
        Ok(record.to_domain())
    }

    async fn list_admins(&self, bearer: &Bearer) -> PortResult<Vec<Admin>> {
        let records: Vec<AdminRecord> = self.get_json("API/Admin/GetAll", bearer, &[]).await?;
        Ok(records.into_iter().map(AdminRecord::to_domain).collect())
    }

    async fn create_admin(&self, bearer: &Bearer, draft: &AdminDraft) -> PortResult<()> {
        self.post("API/Admin/Create", bearer, &[], Some(&AdminSubmission::from(draft)))
            .await
    }

    async fn delete_admin(&self, bearer: &Bearer, id: i64) -> PortResult<()> {
        self.post::<()>("API/Admin/Delete", bearer, &id_param(id), None)
            .await
    }

    async fn list_contact_us(&self, bearer: &Bearer) -> PortResult<Vec<ContactUs>> {
        let records: Vec<ContactUsRecord> =
            self.get_json("API/ContactUs/GetAll", bearer, &[]).await?;
        Ok(records.into_iter().map(ContactUsRecord::to_domain).collect())
    }

    async fn list_companies(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<Company>> {
        self.get_page("API/Company/GetAll", bearer, query, CompanyRecord::to_domain)
            .await
    }

    async fn get_company(&self, bearer: &Bearer, id: i64) -> PortResult<Company> {
        let record: CompanyRecord = self
            .get_json("API/Company/GetById", bearer, &id_param(id))
            .await?;
        Ok(record.to_domain())
    }

    async fn save_company(&self, bearer: &Bearer, draft: &CompanyDraft) -> PortResult<()> {
        let path = if draft.id.is_some() {
            "API/Company/Update"
        } else {
            "API/Company/Create"
        };
        self.post(path, bearer, &[], Some(&CompanySubmission::from(draft)))
            .await
    }

    async fn delete_company(&self, bearer: &Bearer, id: i64) -> PortResult<()> {
        self.post::<()>("API/Company/Delete", bearer, &id_param(id), None)
            .await
    }

    async fn list_clients(&self, bearer: &Bearer, query: PageQuery) -> PortResult<Page<Client>> {
        self.get_page("API/Client/GetAll", bearer, query, ClientRecord::to_domain)
            .await
    }

    async fn save_client(&self, bearer: &Bearer, draft: &ClientDraft) -> PortResult<()> {
        let path = if draft.id.is_some() {
            "API/Client/Update"
        } else {
            "API/Client/Create"
        };
        self.post(path, bearer, &[], Some(&ClientSubmission::from(draft)))
            .await
    }

    async fn delete_client(&self, bearer: &Bearer, id: i64) -> PortResult<()> {
        self.post::<()>("API/Client/Delete", bearer, &id_param(id), None)
            .await
    }

    async fn list_oil_reports(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<OilReport>> {
        self.get_page("API/OilReport/GetAll", bearer, query, OilReportRecord::to_domain)
            .await
    }

    async fn get_oil_report(&self, bearer: &Bearer, id: i64) -> PortResult<OilReport> {
        let record: OilReportRecord = self
            .get_json("API/OilReport/GetById", bearer, &id_param(id))
            .await?;
        Ok(record.to_domain())
    }

    async fn list_ht_breaker_reports(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<HtBreakerReport>> {
        self.get_page(
            "API/HtBreakerReport/GetAll",
            bearer,
            query,
            HtBreakerReportRecord::to_domain,
        )
        .await
    }

    async fn get_ht_breaker_report(
        &self,
        bearer: &Bearer,
        id: i64,
    ) -> PortResult<HtBreakerReport> {
        let record: HtBreakerReportRecord = self
            .get_json("API/HtBreakerReport/GetById", bearer, &id_param(id))
            .await?;
        Ok(record.to_domain())
    }

    async fn list_acb_reports(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<AcbReport>> {
        self.get_page("API/AcbReport/GetAll", bearer, query, AcbReportRecord::to_domain)
            .await
    }

    async fn list_earth_pit_reports(
        &self,
        bearer: &Bearer,
        query: PageQuery,
    ) -> PortResult<Page<EarthPitReport>> {
        self.get_page(
            "API/EarthPitReport/GetAll",
            bearer,
            query,
            EarthPitReportRecord::to_domain,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::layers::{LoggingLayer, UnauthorizedLayer};
    use crate::web::state::SessionRegistry;
    use axum::{
        extract::Query,
        http::{header, HeaderMap},
        routing::{get, post},
        Json, Router,
    };
    use fieldtest_core::domain::{AuthState, Role};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn username_not_found_is_recognised_raw_or_quoted() {
        assert_eq!(
            parse_login_body("Username Not Found").unwrap(),
            LoginOutcome::UsernameNotFound
        );
        assert_eq!(
            parse_login_body("\"Username Not Found\"\n").unwrap(),
            LoginOutcome::UsernameNotFound
        );
    }

    #[test]
    fn login_json_becomes_authenticated() {
        let body = r#"{"token":"t-1","role":"Admin","roleId":2,"username":"ops","email":"ops@example.com"}"#;
        match parse_login_body(body).unwrap() {
            LoginOutcome::Authenticated(success) => {
                assert_eq!(success.bearer.as_str(), "t-1");
                assert_eq!(success.auth.role, Role::Admin);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn garbage_login_body_is_an_error() {
        assert!(matches!(
            parse_login_body("<html>oops</html>"),
            Err(PortError::Unexpected(_))
        ));
    }

    #[test]
    fn validation_statuses_surface_server_message() {
        assert_eq!(
            status_error(StatusCode::CONFLICT, "API/Company/Create", "\"Company exists\"".into()),
            PortError::Rejected("Company exists".into())
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, "API/OilReport/GetById", String::new()),
            PortError::NotFound("API/OilReport/GetById".into())
        );
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "API/Admin/GetAll", String::new()),
            PortError::Unexpected(_)
        ));
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let adapter = HttpApiAdapter::new("http://api.local/").unwrap();
        assert_eq!(
            adapter.url("/API/Company/GetAll"),
            "http://api.local/API/Company/GetAll"
        );
    }

    /// A stand-in remote API that reflects what it received back into its answers.
    fn remote_api() -> Router {
        Router::new()
            .route(
                "/API/Company/GetAll",
                get(
                    |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                        let auth = headers
                            .get(header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(99);
                        let size: u32 = params.get("size").and_then(|p| p.parse().ok()).unwrap_or(99);
                        Json(json!({
                            "content": [{ "id": 1, "name": auth, "address": "Ring Road" }],
                            "pageable": { "pageNumber": page, "pageSize": size, "offset": page * size },
                            "totalPages": 3,
                            "totalElements": 11,
                            "numberOfElements": 1,
                            "first": false,
                            "last": false
                        }))
                    },
                ),
            )
            .route(
                "/API/Company/GetById",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    if params.get("id").map(String::as_str) == Some("9") {
                        StatusCode::UNAUTHORIZED
                    } else {
                        StatusCode::BAD_REQUEST
                    }
                }),
            )
            .route(
                "/API/Company/Create",
                post(|| async { (StatusCode::CONFLICT, "\"Company already exists\"") }),
            )
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn adapter_round_trips_against_a_live_server() {
        let base_url = serve(remote_api()).await;
        let sessions = Arc::new(SessionRegistry::new());
        let bearer = Bearer::new("tok-1");
        sessions
            .start(
                bearer.clone(),
                AuthState {
                    role: Role::MasterAdmin,
                    role_id: 1,
                    username: "root".into(),
                    email: "root@example.com".into(),
                },
            )
            .await;
        let adapter = HttpApiAdapter::new(&base_url)
            .unwrap()
            .with_layer(Arc::new(LoggingLayer))
            .with_layer(Arc::new(UnauthorizedLayer::new(sessions.clone())));

        // Bearer header and paging parameters reach the server.
        let page = adapter
            .list_companies(&bearer, PageQuery::new(2, 5))
            .await
            .unwrap();
        assert_eq!(page.content[0].name, "Bearer tok-1");
        assert_eq!(page.pageable.page_number, 2);
        assert_eq!(page.pageable.page_size, 5);

        // A validation status carries the server's message.
        let draft = CompanyDraft {
            id: None,
            name: "Acme".into(),
            address: "Ring Road".into(),
        };
        assert_eq!(
            adapter.save_company(&bearer, &draft).await,
            Err(PortError::Rejected("Company already exists".into()))
        );
        assert!(sessions.get(&bearer).is_some());

        // A 401 goes through the layers and drops the session.
        assert_eq!(
            adapter.get_company(&bearer, 9).await,
            Err(PortError::Unauthorized)
        );
        assert!(sessions.get(&bearer).is_none());
    }
}
