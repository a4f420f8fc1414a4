//! crates/fieldtest_core/src/domain.rs
//!
//! Defines the pure data structures the console works with.
//! They mirror the remote API's JSON shapes but carry no serialization concerns;
//! the HTTP adapter converts its wire records into these at the network edge.

use chrono::NaiveDate;
use std::fmt;

//=========================================================================================
// Session & Identity
//=========================================================================================

/// The bearer token handed out by the remote API at login.
#[derive(Clone, PartialEq, Eq)]
pub struct Bearer(String);

impl Bearer {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Bearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer(***)")
    }
}

/// The role label the remote API assigns to a console user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    MasterAdmin,
    Admin,
    Other(String),
}

impl Role {
    /// Parses the server's role label. Unknown labels are kept verbatim.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "master admin" | "master_admin" | "masteradmin" => Role::MasterAdmin,
            "admin" => Role::Admin,
            _ => Role::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Role::MasterAdmin => "Master Admin",
            Role::Admin => "Admin",
            Role::Other(label) => label,
        }
    }

    pub fn is_master_admin(&self) -> bool {
        matches!(self, Role::MasterAdmin)
    }
}

/// Who is logged in. Populated once at login and cleared wholesale at logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub role: Role,
    pub role_id: i64,
    pub username: String,
    pub email: String,
}

//=========================================================================================
// Directory Records
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub company_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub role: Role,
}

/// An inbound message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactUs {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: Option<NaiveDate>,
}

/// Aggregate counters computed by the remote API for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub companies: u64,
    pub clients: u64,
    pub oil_reports: u64,
    pub ht_breaker_reports: u64,
    pub acb_reports: u64,
    pub earth_pit_reports: u64,
    pub overdue: u64,
    pub upcoming: u64,
}

//=========================================================================================
// Reports
//=========================================================================================

/// Fields every report variant carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportHeader {
    pub id: i64,
    pub report_no: Option<String>,
    pub report_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub company_id: Option<i64>,
}

/// A single reading taken before and after oil filtration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Measurement {
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OilMeasurements {
    pub breakdown_voltage: Measurement,
    pub water_content: Measurement,
    pub acidity: Measurement,
    pub tan_delta: Measurement,
    pub resistivity: Measurement,
    pub interfacial_tension: Measurement,
    pub flash_point: Measurement,
    pub sludge: Measurement,
}

impl OilMeasurements {
    /// Rows in the order they appear on the printed report:
    /// (parameter, unit, permissible limit, reading).
    pub fn rows(&self) -> [(&'static str, &'static str, &'static str, &Measurement); 8] {
        [
            ("Breakdown Voltage", "kV", "Min 60", &self.breakdown_voltage),
            ("Water Content", "ppm", "Max 10", &self.water_content),
            ("Acidity", "mgKOH/g", "Max 0.03", &self.acidity),
            ("Tan Delta at 90 C", "", "Max 0.01", &self.tan_delta),
            ("Resistivity at 90 C", "x10^12 Ohm-cm", "Min 6", &self.resistivity),
            ("Interfacial Tension", "N/m", "Min 0.04", &self.interfacial_tension),
            ("Flash Point", "deg C", "Min 140", &self.flash_point),
            ("Sludge / Sediment", "", "Non-detectable", &self.sludge),
        ]
    }
}

/// Transformer oil filtration report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OilReport {
    pub header: ReportHeader,
    pub equipment: Option<String>,
    pub serial_no: Option<String>,
    pub rating_kva: Option<String>,
    pub voltage_ratio: Option<String>,
    pub make: Option<String>,
    pub location: Option<String>,
    pub oil_quantity: Option<String>,
    pub measurements: OilMeasurements,
    pub remarks: Option<String>,
}

/// One measurement row inside a breaker test section, one reading per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubRow {
    pub description: String,
    pub r: Option<String>,
    pub y: Option<String>,
    pub b: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub subrows: Vec<SubRow>,
}

/// High-tension circuit breaker test report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtBreakerReport {
    pub header: ReportHeader,
    pub make: Option<String>,
    pub breaker_type: Option<String>,
    pub serial_no: Option<String>,
    pub rated_voltage: Option<String>,
    pub rated_current: Option<String>,
    pub breaking_capacity: Option<String>,
    pub panel: Option<String>,
    pub location: Option<String>,
    pub sections: Vec<Section>,
    pub remarks: Option<String>,
}

/// Readings taken on the R, Y and B phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReadings {
    pub r: Option<String>,
    pub y: Option<String>,
    pub b: Option<String>,
}

/// Air circuit breaker test report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcbReport {
    pub header: ReportHeader,
    pub make: Option<String>,
    pub serial_no: Option<String>,
    pub rating: Option<String>,
    pub poles: Option<String>,
    pub location: Option<String>,
    pub insulation_resistance: PhaseReadings,
    pub contact_resistance: PhaseReadings,
    pub remarks: Option<String>,
}

/// Earth pit resistance test report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarthPitReport {
    pub header: ReportHeader,
    pub pit_no: Option<String>,
    pub location: Option<String>,
    pub electrode: Option<String>,
    pub resistance_ohms: Option<String>,
    pub soil_condition: Option<String>,
    pub remarks: Option<String>,
}

//=========================================================================================
// Pagination
//=========================================================================================

/// Zero-based page request sent to paginated endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size: size.max(1) }
    }

    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pageable {
    pub page_number: u32,
    pub page_size: u32,
    pub offset: u64,
}

/// The server's pagination envelope, shared by every paginated resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub pageable: Pageable,
    pub total_pages: u32,
    pub total_elements: u64,
    pub number_of_elements: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn query(&self) -> PageQuery {
        PageQuery::new(self.pageable.page_number, self.pageable.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels_parse_case_insensitively() {
        assert_eq!(Role::from_label("Master Admin"), Role::MasterAdmin);
        assert_eq!(Role::from_label(" admin "), Role::Admin);
        assert_eq!(
            Role::from_label("Technician"),
            Role::Other("Technician".to_string())
        );
        assert_eq!(Role::MasterAdmin.label(), "Master Admin");
    }

    #[test]
    fn bearer_debug_hides_token() {
        let bearer = Bearer::new("secret-token");
        assert_eq!(format!("{:?}", bearer), "Bearer(***)");
        assert_eq!(bearer.as_str(), "secret-token");
    }

    #[test]
    fn page_query_never_has_zero_size() {
        assert_eq!(PageQuery::new(3, 0).size, 1);
    }
}
