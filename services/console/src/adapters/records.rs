//! services/console/src/adapters/records.rs
//!
//! Wire records for the remote API's JSON. Every response body is parsed into one
//! of these and converted with `to_domain()`, so nothing loosely typed gets past
//! the network edge.

use chrono::NaiveDate;
use fieldtest_core::domain::{
    AcbReport, Admin, AuthState, Bearer, Client, Company, ContactUs, DashboardCounts,
    EarthPitReport, HtBreakerReport, Measurement, OilMeasurements, OilReport, Page, Pageable,
    PhaseReadings, ReportHeader, Role, Section, SubRow,
};
use fieldtest_core::forms::{AdminDraft, ClientDraft, CompanyDraft, LoginRequest, LoginSuccess};
use serde::{Deserialize, Deserializer, Serialize};

//=========================================================================================
// Lenient Field Helpers
//=========================================================================================

/// Free-text measurement fields arrive as strings, numbers or null depending on who
/// filled the form in. All of them become optional text.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accepts `2024-03-01`, `2024-03-01T10:15:00...` or `01-03-2024`. Anything else is treated as missing.
pub(crate) fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%d-%m-%Y"))
        .ok()
}

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Serialize)]
pub(crate) struct LoginRecord<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a LoginRequest> for LoginRecord<'a> {
    fn from(req: &'a LoginRequest) -> Self {
        Self {
            email: &req.email,
            password: &req.password,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponseRecord {
    pub token: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub role_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl LoginResponseRecord {
    pub fn to_domain(self) -> LoginSuccess {
        LoginSuccess {
            bearer: Bearer::new(self.token),
            auth: AuthState {
                role: Role::from_label(&self.role),
                role_id: self.role_id,
                username: self.username,
                email: self.email,
            },
        }
    }
}

//=========================================================================================
// Pagination Envelope
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageableRecord {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageRecord<R> {
    pub content: Vec<R>,
    #[serde(default)]
    pub pageable: PageableRecord,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
}

impl<R> PageRecord<R> {
    pub fn to_domain<T>(self, convert: impl Fn(R) -> T) -> Page<T> {
        let content: Vec<T> = self.content.into_iter().map(convert).collect();
        Page {
            number_of_elements: if self.number_of_elements == 0 {
                content.len() as u32
            } else {
                self.number_of_elements
            },
            content,
            pageable: Pageable {
                page_number: self.pageable.page_number,
                page_size: self.pageable.page_size,
                offset: self.pageable.offset,
            },
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first,
            last: self.last,
        }
    }
}

//=========================================================================================
// Directory Records
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl CompanyRecord {
    pub fn to_domain(self) -> Company {
        Company {
            id: self.id,
            name: self.name,
            address: self.address,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub company_id: Option<i64>,
}

impl ClientRecord {
    pub fn to_domain(self) -> Client {
        Client {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            designation: self.designation,
            company_id: self.company_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub role: String,
}

impl AdminRecord {
    pub fn to_domain(self) -> Admin {
        Admin {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            designation: self.designation,
            role: Role::from_label(&self.role),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactUsRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ContactUsRecord {
    pub fn to_domain(self) -> ContactUs {
        ContactUs {
            id: self.id,
            created_at: parse_date(self.created_at.as_deref()),
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DashboardRecord {
    pub total_companies: u64,
    pub total_clients: u64,
    pub oil_reports: u64,
    pub ht_breaker_reports: u64,
    pub acb_reports: u64,
    pub earth_pit_reports: u64,
    pub overdue: u64,
    pub upcoming: u64,
}

impl DashboardRecord {
    pub fn to_domain(self) -> DashboardCounts {
        DashboardCounts {
            companies: self.total_companies,
            clients: self.total_clients,
            oil_reports: self.oil_reports,
            ht_breaker_reports: self.ht_breaker_reports,
            acb_reports: self.acb_reports,
            earth_pit_reports: self.earth_pit_reports,
            overdue: self.overdue,
            upcoming: self.upcoming,
        }
    }
}

//=========================================================================================
// Report Records
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeaderRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "text")]
    pub report_no: Option<String>,
    #[serde(default)]
    pub report_date: Option<String>,
    #[serde(default)]
    pub next_due_date: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
}

impl HeaderRecord {
    fn to_domain(self) -> ReportHeader {
        ReportHeader {
            id: self.id,
            report_no: self.report_no,
            report_date: parse_date(self.report_date.as_deref()),
            next_due_date: parse_date(self.next_due_date.as_deref()),
            company_id: self.company_id,
        }
    }
}

fn pair(before: Option<String>, after: Option<String>) -> Measurement {
    Measurement { before, after }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OilReportRecord {
    #[serde(flatten)]
    pub header: HeaderRecord,
    #[serde(default, deserialize_with = "text")]
    pub equipment: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub serial_no: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub rating_kva: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub voltage_ratio: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub oil_quantity: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub bdv_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub bdv_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ppm_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ppm_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub acidity_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub acidity_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub tan_delta_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub tan_delta_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub resistivity_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub resistivity_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ift_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ift_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub flash_point_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub flash_point_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub sludge_before: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub sludge_after: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub remarks: Option<String>,
}

impl OilReportRecord {
    pub fn to_domain(self) -> OilReport {
        OilReport {
            header: self.header.to_domain(),
            equipment: self.equipment,
            serial_no: self.serial_no,
            rating_kva: self.rating_kva,
            voltage_ratio: self.voltage_ratio,
            make: self.make,
            location: self.location,
            oil_quantity: self.oil_quantity,
            measurements: OilMeasurements {
                breakdown_voltage: pair(self.bdv_before, self.bdv_after),
                water_content: pair(self.ppm_before, self.ppm_after),
                acidity: pair(self.acidity_before, self.acidity_after),
                tan_delta: pair(self.tan_delta_before, self.tan_delta_after),
                resistivity: pair(self.resistivity_before, self.resistivity_after),
                interfacial_tension: pair(self.ift_before, self.ift_after),
                flash_point: pair(self.flash_point_before, self.flash_point_after),
                sludge: pair(self.sludge_before, self.sludge_after),
            },
            remarks: self.remarks,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct SubRowRecord {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "text")]
    pub r: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub y: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub b: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct SectionRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subrows: Vec<SubRowRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HtBreakerReportRecord {
    #[serde(flatten)]
    pub header: HeaderRecord,
    #[serde(default, deserialize_with = "text")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub breaker_type: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub serial_no: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub rated_voltage: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub rated_current: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub breaking_capacity: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub panel: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
    #[serde(default, deserialize_with = "text")]
    pub remarks: Option<String>,
}

impl HtBreakerReportRecord {
    pub fn to_domain(self) -> HtBreakerReport {
        HtBreakerReport {
            header: self.header.to_domain(),
            make: self.make,
            breaker_type: self.breaker_type,
            serial_no: self.serial_no,
            rated_voltage: self.rated_voltage,
            rated_current: self.rated_current,
            breaking_capacity: self.breaking_capacity,
            panel: self.panel,
            location: self.location,
            sections: self
                .sections
                .into_iter()
                .map(|s| Section {
                    title: s.title,
                    subrows: s
                        .subrows
                        .into_iter()
                        .map(|r| SubRow {
                            description: r.description,
                            r: r.r,
                            y: r.y,
                            b: r.b,
                        })
                        .collect(),
                })
                .collect(),
            remarks: self.remarks,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcbReportRecord {
    #[serde(flatten)]
    pub header: HeaderRecord,
    #[serde(default, deserialize_with = "text")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub serial_no: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub poles: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ir_r: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ir_y: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub ir_b: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub cr_r: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub cr_y: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub cr_b: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub remarks: Option<String>,
}

impl AcbReportRecord {
    pub fn to_domain(self) -> AcbReport {
        AcbReport {
            header: self.header.to_domain(),
            make: self.make,
            serial_no: self.serial_no,
            rating: self.rating,
            poles: self.poles,
            location: self.location,
            insulation_resistance: PhaseReadings {
                r: self.ir_r,
                y: self.ir_y,
                b: self.ir_b,
            },
            contact_resistance: PhaseReadings {
                r: self.cr_r,
                y: self.cr_y,
                b: self.cr_b,
            },
            remarks: self.remarks,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EarthPitReportRecord {
    #[serde(flatten)]
    pub header: HeaderRecord,
    #[serde(default, deserialize_with = "text")]
    pub pit_no: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub electrode: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub resistance_ohms: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub soil_condition: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub remarks: Option<String>,
}

impl EarthPitReportRecord {
    pub fn to_domain(self) -> EarthPitReport {
        EarthPitReport {
            header: self.header.to_domain(),
            pit_no: self.pit_no,
            location: self.location,
            electrode: self.electrode,
            resistance_ohms: self.resistance_ohms,
            soil_condition: self.soil_condition,
            remarks: self.remarks,
        }
    }
}

//=========================================================================================
// Submission Records
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanySubmission<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: &'a str,
    pub address: &'a str,
}

impl<'a> From<&'a CompanyDraft> for CompanySubmission<'a> {
    fn from(d: &'a CompanyDraft) -> Self {
        Self {
            id: d.id,
            name: &d.name,
            address: &d.address,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientSubmission<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub designation: &'a str,
    pub company_id: i64,
}

impl<'a> From<&'a ClientDraft> for ClientSubmission<'a> {
    fn from(d: &'a ClientDraft) -> Self {
        Self {
            id: d.id,
            name: &d.name,
            email: &d.email,
            phone: &d.phone,
            designation: &d.designation,
            company_id: d.company_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminSubmission<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub designation: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a AdminDraft> for AdminSubmission<'a> {
    fn from(d: &'a AdminDraft) -> Self {
        Self {
            name: &d.name,
            email: &d.email,
            phone: &d.phone,
            designation: &d.designation,
            password: &d.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_envelope_parses_server_shape() {
        let body = json!({
            "content": [{"id": 1, "name": "Acme", "address": "Ring Road"}],
            "pageable": {"pageNumber": 2, "pageSize": 10, "offset": 20, "paged": true},
            "totalPages": 3,
            "totalElements": 21,
            "numberOfElements": 1,
            "first": false,
            "last": true,
            "empty": false
        });
        let record: PageRecord<CompanyRecord> = serde_json::from_value(body).unwrap();
        let page = record.to_domain(CompanyRecord::to_domain);
        assert_eq!(page.pageable.page_number, 2);
        assert_eq!(page.total_elements, 21);
        assert_eq!(page.content[0].name, "Acme");
        assert!(page.last);
    }

    #[test]
    fn oil_measurements_accept_numbers_and_blanks() {
        let body = json!({
            "id": 7,
            "reportNo": "OF-7",
            "reportDate": "2024-03-01T09:30:00",
            "nextDueDate": "01-09-2024",
            "companyId": 3,
            "bdvBefore": 32,
            "bdvAfter": "68",
            "ppmBefore": "",
            "ppmAfter": null
        });
        let record: OilReportRecord = serde_json::from_value(body).unwrap();
        let report = record.to_domain();
        assert_eq!(report.header.id, 7);
        assert_eq!(report.header.report_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(report.header.next_due_date, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert_eq!(report.measurements.breakdown_voltage.before.as_deref(), Some("32"));
        assert_eq!(report.measurements.breakdown_voltage.after.as_deref(), Some("68"));
        assert_eq!(report.measurements.water_content, Measurement::default());
    }

    #[test]
    fn ht_breaker_sections_keep_phase_readings() {
        let body = json!({
            "id": 4,
            "sections": [{
                "title": "Insulation Resistance",
                "subrows": [{"description": "Phase to earth", "r": "2000", "y": "1900", "b": 2100}]
            }]
        });
        let record: HtBreakerReportRecord = serde_json::from_value(body).unwrap();
        let report = record.to_domain();
        let row = &report.sections[0].subrows[0];
        assert_eq!(row.b.as_deref(), Some("2100"));
        assert_eq!(row.description, "Phase to earth");
    }

    #[test]
    fn unparseable_dates_become_missing() {
        assert_eq!(parse_date(Some("soon")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn company_update_carries_id() {
        let draft = CompanyDraft {
            id: Some(9),
            name: "Acme".into(),
            address: "Ring Road".into(),
        };
        let value = serde_json::to_value(CompanySubmission::from(&draft)).unwrap();
        assert_eq!(value, json!({"id": 9, "name": "Acme", "address": "Ring Road"}));
    }

    #[test]
    fn login_response_maps_role() {
        let record: LoginResponseRecord = serde_json::from_value(json!({
            "token": "abc",
            "role": "Master Admin",
            "roleId": 1,
            "username": "root",
            "email": "root@example.com"
        }))
        .unwrap();
        let success = record.to_domain();
        assert_eq!(success.bearer.as_str(), "abc");
        assert_eq!(success.auth.role, Role::MasterAdmin);
        assert_eq!(success.auth.role_id, 1);
    }
}
