//! crates/fieldtest_core/src/guard.rs
//!
//! Route gating and role-based tab selection.
//!
//! The guard only checks that a token is *present*. Whether it is still valid
//! is discovered later, when the remote API answers 401.

use crate::domain::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Companies,
    Clients,
    Admins,
    ContactUs,
    Reports,
}

impl Route {
    /// Maps a request path to the screen that serves it.
    pub fn from_path(path: &str) -> Option<Route> {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match first {
            "" => Some(Route::Dashboard),
            "login" => Some(Route::Login),
            "companies" => Some(Route::Companies),
            "clients" => Some(Route::Clients),
            "admins" => Some(Route::Admins),
            "contact-us" => Some(Route::ContactUs),
            "reports" => Some(Route::Reports),
            _ => None,
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Route::Login)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Companies => "/companies",
            Route::Clients => "/clients",
            Route::Admins => "/admins",
            Route::ContactUs => "/contact-us",
            Route::Reports => "/reports/oil",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Companies => "Companies",
            Route::Clients => "Clients",
            Route::Admins => "Admins",
            Route::ContactUs => "Contact Us",
            Route::Reports => "Reports",
        }
    }

    /// Whether the navigation shows this screen to `role`.
    pub fn visible_to(self, role: &Role) -> bool {
        match self {
            Route::Admins => role.is_master_admin(),
            Route::Login => false,
            _ => true,
        }
    }

    pub const NAVIGATION: [Route; 6] = [
        Route::Dashboard,
        Route::Companies,
        Route::Clients,
        Route::Admins,
        Route::ContactUs,
        Route::Reports,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send the browser to `/login`, wiping whatever session state it had.
    RedirectToLogin,
}

/// Decides whether a request for `route` may proceed given the stored token.
pub fn guard(route: Route, token: Option<&str>) -> GuardDecision {
    if route.is_public() {
        return GuardDecision::Allow;
    }
    match token {
        Some(t) if !t.trim().is_empty() => GuardDecision::Allow,
        _ => GuardDecision::RedirectToLogin,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Create,
    View,
}

impl Tab {
    pub fn from_query(value: Option<&str>) -> Option<Tab> {
        match value {
            Some("create") => Some(Tab::Create),
            Some("view") => Some(Tab::View),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Tab::Create => "create",
            Tab::View => "view",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Create => "Create",
            Tab::View => "View",
        }
    }
}

/// Tabs offered on a directory screen. Master Admin can create; everyone else only views.
pub fn tabs_for(role: &Role, route: Route) -> Vec<Tab> {
    let manages_records = matches!(route, Route::Companies | Route::Clients | Route::Admins);
    if manages_records && role.is_master_admin() {
        vec![Tab::Create, Tab::View]
    } else {
        vec![Tab::View]
    }
}

/// Picks the active tab: the requested one if the role has it, the view tab otherwise.
pub fn active_tab(role: &Role, route: Route, requested: Option<Tab>) -> Tab {
    let tabs = tabs_for(role, route);
    requested
        .filter(|t| tabs.contains(t))
        .unwrap_or(Tab::View)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_redirects_and_clears() {
        for path in ["/", "/companies", "/reports/acb", "/admins"] {
            let route = Route::from_path(path).unwrap();
            assert_eq!(
                guard(route, None),
                GuardDecision::RedirectToLogin
            );
            assert_eq!(
                guard(route, Some("  ")),
                GuardDecision::RedirectToLogin
            );
        }
    }

    #[test]
    fn token_presence_is_enough() {
        assert_eq!(guard(Route::Clients, Some("expired-but-present")), GuardDecision::Allow);
        assert_eq!(guard(Route::Login, None), GuardDecision::Allow);
    }

    #[test]
    fn master_admin_gets_create_tab() {
        assert_eq!(
            tabs_for(&Role::MasterAdmin, Route::Companies),
            vec![Tab::Create, Tab::View]
        );
        assert_eq!(tabs_for(&Role::Admin, Route::Companies), vec![Tab::View]);
        assert_eq!(tabs_for(&Role::MasterAdmin, Route::ContactUs), vec![Tab::View]);
    }

    #[test]
    fn requested_tab_falls_back_to_view() {
        assert_eq!(
            active_tab(&Role::Admin, Route::Clients, Some(Tab::Create)),
            Tab::View
        );
        assert_eq!(
            active_tab(&Role::MasterAdmin, Route::Clients, Some(Tab::Create)),
            Tab::Create
        );
    }

    #[test]
    fn admin_screen_is_hidden_from_plain_admins() {
        assert!(!Route::Admins.visible_to(&Role::Admin));
        assert!(Route::Admins.visible_to(&Role::MasterAdmin));
        assert!(Route::Reports.visible_to(&Role::Other("Client".into())));
    }
}
