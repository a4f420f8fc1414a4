pub mod domain;
pub mod forms;
pub mod guard;
pub mod ports;
pub mod report_doc;
pub mod store;
pub mod table;

pub use domain::{
    AcbReport, Admin, AuthState, Bearer, Client, Company, ContactUs, DashboardCounts,
    EarthPitReport, HtBreakerReport, OilReport, Page, PageQuery, Role,
};
pub use ports::{DocumentRenderer, PortError, PortResult, RemoteApi};
pub use store::{ConsoleState, RemoteSlice};
