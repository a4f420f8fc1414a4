//! services/console/src/web/views.rs
//!
//! Server-rendered HTML for every console screen.

use fieldtest_core::domain::{AuthState, Company};
use fieldtest_core::forms::FieldErrors;
use fieldtest_core::guard::{Route, Tab};
use fieldtest_core::store::{ConsoleState, FetchPhase};
use fieldtest_core::table::{Cell, TableView};
use std::fmt::Write;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f5f6f8}\
nav{background:#1d3557;padding:12px 24px}nav a{color:#fff;margin-right:16px;text-decoration:none}\
nav a.active{font-weight:bold;text-decoration:underline}main{padding:24px}\
table{border-collapse:collapse;width:100%;background:#fff}th,td{border:1px solid #ddd;padding:6px 10px;text-align:left}\
.toast{background:#ffe8a3;padding:10px 16px;margin-bottom:16px}.error{color:#b00020}\
.cards{display:flex;flex-wrap:wrap;gap:16px}.card{background:#fff;padding:16px;min-width:160px}\
.tabs a{margin-right:12px}.tabs a.active{font-weight:bold}.empty,.failed,.loading{background:#fff;padding:24px}";

/// The page shell: navigation for the logged-in role, an optional toast, and the body.
pub fn layout(
    title: &str,
    auth: Option<&AuthState>,
    active: Route,
    flash: Option<&str>,
    body: &str,
) -> String {
    let mut html = String::new();
    write!(
        html,
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body><nav>",
        escape(title),
        STYLE
    )
    .ok();
    for route in Route::NAVIGATION {
        let visible = match auth {
            Some(a) => route.visible_to(&a.role),
            None => route != Route::Admins,
        };
        if !visible {
            continue;
        }
        write!(
            html,
            "<a href=\"{}\"{}>{}</a>",
            route.path(),
            if route == active { " class=\"active\"" } else { "" },
            route.title()
        )
        .ok();
    }
    if let Some(auth) = auth {
        write!(
            html,
            "<span style=\"color:#fff\">{} ({})</span>",
            escape(&auth.username),
            escape(auth.role.label())
        )
        .ok();
    }
    html.push_str(
        "<form method=\"post\" action=\"/logout\" style=\"display:inline;margin-left:16px\"><button>Logout</button></form></nav><main>",
    );
    if let Some(flash) = flash {
        write!(html, "<div class=\"toast\">{}</div>", escape(flash)).ok();
    }
    write!(html, "<h1>{}</h1>{}</main></body></html>", escape(title), body).ok();
    html
}

/// A bare page for errors outside the normal shell.
pub fn message_page(title: &str, message: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{0}</title><style>{2}</style></head>\
<body><main><h1>{0}</h1><p>{1}</p><p><a href=\"/\">Back to dashboard</a></p></main></body></html>",
        escape(title),
        escape(message),
        STYLE
    )
}

//=========================================================================================
// Table
//=========================================================================================

pub fn table(view: &TableView) -> String {
    let mut html = String::new();
    match view {
        TableView::Loading => html.push_str("<div class=\"loading\">Loading&hellip;</div>"),
        TableView::Error { retry } => {
            write!(
                html,
                "<div class=\"failed\"><p class=\"error\">Could not load this list.</p><a class=\"retry\" href=\"{}\">Try again</a></div>",
                escape(retry)
            )
            .ok();
        }
        TableView::Empty { call_to_action } => {
            html.push_str("<div class=\"empty\"><p>Nothing here yet.</p>");
            if let Some(cta) = call_to_action {
                write!(
                    html,
                    "<a class=\"cta\" href=\"{}\">{}</a>",
                    escape(&cta.href),
                    escape(&cta.label)
                )
                .ok();
            }
            html.push_str("</div>");
        }
        TableView::Populated {
            headers,
            rows,
            pager,
        } => {
            html.push_str("<table><thead><tr>");
            for header in headers {
                write!(html, "<th>{}</th>", escape(header)).ok();
            }
            html.push_str("</tr></thead><tbody>");
            for row in rows {
                html.push_str("<tr>");
                for cell in row {
                    match cell {
                        Cell::Text(text) => write!(html, "<td>{}</td>", escape(text)).ok(),
                        Cell::Html(markup) => write!(html, "<td>{}</td>", markup).ok(),
                    };
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody></table><div class=\"pager\">");
            if let Some(prev) = &pager.prev {
                write!(html, "<a rel=\"prev\" href=\"{}\">Previous</a> ", escape(prev)).ok();
            }
            write!(
                html,
                "<span>Page {} of {} ({} records)</span>",
                pager.current, pager.total_pages, pager.total_elements
            )
            .ok();
            if let Some(next) = &pager.next {
                write!(html, " <a rel=\"next\" href=\"{}\">Next</a>", escape(next)).ok();
            }
            html.push_str("</div>");
        }
    }
    html
}

pub fn tabs(base: &str, available: &[Tab], active: Tab) -> String {
    if available.len() < 2 {
        return String::new();
    }
    let mut html = String::from("<div class=\"tabs\">");
    for tab in available {
        write!(
            html,
            "<a href=\"{}?tab={}\"{}>{}</a>",
            base,
            tab.key(),
            if *tab == active { " class=\"active\"" } else { "" },
            tab.label()
        )
        .ok();
    }
    html.push_str("</div>");
    html
}

//=========================================================================================
// Forms
//=========================================================================================

fn field_error(errors: Option<&FieldErrors>, field: &str) -> String {
    errors
        .and_then(|e| e.get(field))
        .map(|msg| format!("<span class=\"error\" data-field=\"{}\">{}</span>", field, escape(msg)))
        .unwrap_or_default()
}

fn input(name: &str, label: &str, kind: &str, value: &str, errors: Option<&FieldErrors>) -> String {
    format!(
        "<p><label>{label}<br><input type=\"{kind}\" name=\"{name}\" value=\"{value}\"></label> {error}</p>",
        label = escape(label),
        kind = kind,
        name = name,
        value = escape(value),
        error = field_error(errors, name)
    )
}

fn banner(message: Option<&str>) -> String {
    message
        .map(|m| format!("<p class=\"error form-error\">{}</p>", escape(m)))
        .unwrap_or_default()
}

pub fn login_page(email: &str, errors: Option<&FieldErrors>, flash: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(flash) = flash {
        write!(body, "<div class=\"toast\">{}</div>", escape(flash)).ok();
    }
    write!(
        body,
        "<form method=\"post\" action=\"/login\">{}{}<button type=\"submit\">Login</button></form>",
        input("email", "Email", "email", email, errors),
        input("password", "Password", "password", "", errors),
    )
    .ok();
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Login</title><style>{}</style></head>\
<body><main><h1>Login</h1>{}</main></body></html>",
        STYLE, body
    )
}

/// Values a directory form is re-rendered with after a failed submission.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub id: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub company_id: String,
}

pub fn company_form(values: &FormValues, errors: Option<&FieldErrors>, failure: Option<&str>) -> String {
    format!(
        "<form method=\"post\" action=\"/companies\">{}<input type=\"hidden\" name=\"id\" value=\"{}\">{}{}<button type=\"submit\">Save company</button></form>",
        banner(failure),
        escape(&values.id),
        input("name", "Company name", "text", &values.name, errors),
        input("address", "Address", "text", &values.address, errors),
    )
}

pub fn client_form(
    values: &FormValues,
    companies: &[Company],
    errors: Option<&FieldErrors>,
    failure: Option<&str>,
) -> String {
    let mut options = String::from("<option value=\"\">Select a company</option>");
    for company in companies {
        let id = company.id.to_string();
        write!(
            options,
            "<option value=\"{}\"{}>{}</option>",
            id,
            if id == values.company_id { " selected" } else { "" },
            escape(&company.name)
        )
        .ok();
    }
    format!(
        "<form method=\"post\" action=\"/clients\">{}<input type=\"hidden\" name=\"id\" value=\"{}\">{}{}{}{}\
<p><label>Company<br><select name=\"company_id\">{}</select></label> {}</p><button type=\"submit\">Save client</button></form>",
        banner(failure),
        escape(&values.id),
        input("name", "Name", "text", &values.name, errors),
        input("email", "Email", "email", &values.email, errors),
        input("phone", "Phone", "tel", &values.phone, errors),
        input("designation", "Designation", "text", &values.designation, errors),
        options,
        field_error(errors, "company_id"),
    )
}

pub fn admin_form(values: &FormValues, errors: Option<&FieldErrors>, failure: Option<&str>) -> String {
    format!(
        "<form method=\"post\" action=\"/admins\">{}{}{}{}{}{}<button type=\"submit\">Create admin</button></form>",
        banner(failure),
        input("name", "Name", "text", &values.name, errors),
        input("email", "Email", "email", &values.email, errors),
        input("phone", "Phone", "tel", &values.phone, errors),
        input("designation", "Designation", "text", &values.designation, errors),
        input("password", "Password", "password", "", errors),
    )
}

/// A delete button posting to `action`.
pub fn delete_button(action: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" style=\"display:inline\"><button type=\"submit\">Delete</button></form>",
        escape(action)
    )
}

//=========================================================================================
// Dashboard
//=========================================================================================

pub fn dashboard(state: &ConsoleState) -> String {
    let counts = match (state.dashboard.phase(), state.dashboard_counts()) {
        (FetchPhase::Error, _) => {
            return "<div class=\"failed\"><p class=\"error\">Could not load the dashboard.</p><a class=\"retry\" href=\"/?retry=1\">Try again</a></div>".to_string();
        }
        (FetchPhase::Success, Some(counts)) => counts,
        _ => return "<div class=\"loading\">Loading&hellip;</div>".to_string(),
    };
    let cards = [
        ("Companies", counts.companies, "/companies"),
        ("Clients", counts.clients, "/clients"),
        ("Oil Reports", counts.oil_reports, "/reports/oil"),
        ("HT Breaker Reports", counts.ht_breaker_reports, "/reports/ht-breaker"),
        ("ACB Reports", counts.acb_reports, "/reports/acb"),
        ("Earth Pit Reports", counts.earth_pit_reports, "/reports/earth-pit"),
        ("Overdue", counts.overdue, "/reports/oil"),
        ("Upcoming", counts.upcoming, "/reports/oil"),
    ];
    let mut html = String::from("<div class=\"cards\">");
    for (label, value, href) in cards {
        write!(
            html,
            "<a class=\"card\" href=\"{}\"><div>{}</div><strong>{}</strong></a>",
            href, label, value
        )
        .ok();
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtest_core::table::{CallToAction, Pager};

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn empty_table_shows_call_to_action_not_rows() {
        let html = table(&TableView::Empty {
            call_to_action: Some(CallToAction::new("Add company", "/companies?tab=create")),
        });
        assert!(html.contains("class=\"cta\""));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn error_table_links_to_retry() {
        let html = table(&TableView::Error {
            retry: "/companies?page=1&size=10&retry=1".into(),
        });
        assert!(html.contains("href=\"/companies?page=1&amp;size=10&amp;retry=1\""));
    }

    #[test]
    fn text_cells_are_escaped_but_custom_cells_are_not() {
        let html = table(&TableView::Populated {
            headers: vec!["Name", "Actions"],
            rows: vec![vec![
                Cell::Text("<script>".into()),
                Cell::Html("<a href=\"/x\">PDF</a>".into()),
            ]],
            pager: Pager {
                current: 1,
                total_pages: 1,
                total_elements: 1,
                prev: None,
                next: None,
            },
        });
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<a href=\"/x\">PDF</a>"));
    }

    #[test]
    fn single_tab_is_not_rendered() {
        assert_eq!(tabs("/companies", &[Tab::View], Tab::View), "");
        assert!(tabs("/companies", &[Tab::Create, Tab::View], Tab::Create).contains("tab=create"));
    }

    #[test]
    fn dashboard_follows_the_fetch_phase() {
        let mut state = ConsoleState::new();
        assert!(dashboard(&state).contains("Loading"));

        state.dashboard.succeed(fieldtest_core::domain::DashboardCounts {
            companies: 7,
            ..Default::default()
        });
        let html = dashboard(&state);
        assert!(html.contains("<div>Companies</div><strong>7</strong>"));

        state.dashboard.fail();
        assert!(dashboard(&state).contains("href=\"/?retry=1\""));
    }
}
