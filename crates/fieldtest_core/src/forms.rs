//! crates/fieldtest_core/src/forms.rs
//!
//! Client-side shape checks for everything the console submits.
//! A form either validates into a request/draft the remote API accepts,
//! or yields per-field errors that are shown inline while submission is blocked.

use crate::domain::{AuthState, Bearer};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::{Validate, ValidationError, ValidationErrors};

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").expect("phone pattern is a valid regex")
    })
}

/// Digits with optional spaces, dashes and a leading `+`. Blank input is left to the
/// `length` rule so the field reports "required" rather than "invalid".
fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || phone_pattern().is_match(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("phone");
    error.message = Some(Cow::Borrowed("Enter a valid phone number"));
    Err(error)
}

//=========================================================================================
// Field Errors
//=========================================================================================

/// Inline validation errors, keyed by form field name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for `field`. Only the first error per field is kept.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, message)| (name.as_str(), message.as_str()))
    }
}

impl From<ValidationErrors> for FieldErrors {
    /// One message per field. A failed `length` rule (the "required" message) wins
    /// over shape rules on the same field.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = FieldErrors::new();
        for (field, list) in fields {
            let chosen = list
                .iter()
                .find(|e| e.code == "length")
                .or_else(|| list.first());
            if let Some(error) = chosen {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                out.insert(field.to_string(), message);
            }
        }
        out
    }
}

/// Runs the derived rules, then any checks that need the parsed values.
fn check<F: Validate>(form: &F, extra: FieldErrors) -> Result<(), FieldErrors> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from(e),
    };
    for (field, message) in extra.iter() {
        errors.insert(field, message);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn trim(value: &str) -> String {
    value.trim().to_string()
}

fn trim_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_id(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.parse::<i64>().ok())
}

//=========================================================================================
// Login
//=========================================================================================

/// Raw login form input.
#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Enter a valid email address")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A login request that passed the client-side checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Trims the email and checks both fields. The password is taken verbatim.
    pub fn to_request(&self) -> Result<LoginRequest, FieldErrors> {
        let form = LoginForm {
            email: trim(&self.email),
            password: self.password.clone(),
        };
        check(&form, FieldErrors::new())?;
        Ok(LoginRequest {
            email: form.email,
            password: form.password,
        })
    }
}

/// What the remote API granted on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub bearer: Bearer,
    pub auth: AuthState,
}

/// The two answers the login endpoint gives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(LoginSuccess),
    /// The server replied with the literal body `"Username Not Found"`.
    UsernameNotFound,
}

impl LoginOutcome {
    /// Field errors to show when the login did not authenticate.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            LoginOutcome::Authenticated(_) => None,
            LoginOutcome::UsernameNotFound => {
                let mut errors = FieldErrors::new();
                errors.insert("email", "Username not found");
                Some(errors)
            }
        }
    }
}

//=========================================================================================
// Directory Forms
//=========================================================================================

#[derive(Debug, Clone, Default, Validate)]
pub struct CompanyForm {
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

/// Company payload for create (no id) or update (id present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDraft {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
}

impl CompanyForm {
    pub fn to_draft(&self) -> Result<CompanyDraft, FieldErrors> {
        let form = CompanyForm {
            id: trim_opt(&self.id),
            name: trim(&self.name),
            address: trim(&self.address),
        };
        check(&form, FieldErrors::new())?;
        Ok(CompanyDraft {
            id: parse_id(form.id.as_deref()),
            name: form.name,
            address: form.address,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ClientForm {
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Enter a valid email address")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Phone is required"),
        custom(function = "validate_phone")
    )]
    pub phone: String,
    #[validate(length(min = 1, message = "Designation is required"))]
    pub designation: String,
    #[validate(required(message = "Select a company"))]
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDraft {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub company_id: i64,
}

impl ClientForm {
    pub fn to_draft(&self) -> Result<ClientDraft, FieldErrors> {
        let form = ClientForm {
            id: trim_opt(&self.id),
            name: trim(&self.name),
            email: trim(&self.email),
            phone: trim(&self.phone),
            designation: trim(&self.designation),
            company_id: trim_opt(&self.company_id),
        };
        let company_id = parse_id(form.company_id.as_deref());
        let mut extra = FieldErrors::new();
        if form.company_id.is_some() && company_id.is_none() {
            extra.insert("company_id", "Select a company");
        }
        check(&form, extra)?;
        Ok(ClientDraft {
            id: parse_id(form.id.as_deref()),
            name: form.name,
            email: form.email,
            phone: form.phone,
            designation: form.designation,
            company_id: company_id.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct AdminForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Enter a valid email address")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Phone is required"),
        custom(function = "validate_phone")
    )]
    pub phone: String,
    #[validate(length(min = 1, message = "Designation is required"))]
    pub designation: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub password: String,
}

impl AdminForm {
    pub fn to_draft(&self) -> Result<AdminDraft, FieldErrors> {
        let form = AdminForm {
            name: trim(&self.name),
            email: trim(&self.email),
            phone: trim(&self.phone),
            designation: trim(&self.designation),
            password: self.password.clone(),
        };
        check(&form, FieldErrors::new())?;
        Ok(AdminDraft {
            name: form.name,
            email: form.email,
            phone: form.phone,
            designation: form.designation,
            password: form.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_email_shape_and_password() {
        let form = LoginForm {
            email: "not-an-email".into(),
            password: String::new(),
        };
        let errors = form.to_request().unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn login_trims_email() {
        let form = LoginForm {
            email: "  ops@example.com ".into(),
            password: "hunter22".into(),
        };
        let request = form.to_request().unwrap();
        assert_eq!(request.email, "ops@example.com");
    }

    #[test]
    fn username_not_found_marks_email_field() {
        let errors = LoginOutcome::UsernameNotFound.field_errors().unwrap();
        assert_eq!(errors.get("email"), Some("Username not found"));
        assert!(errors.get("password").is_none());
    }

    #[test]
    fn company_form_with_id_becomes_update() {
        let form = CompanyForm {
            id: Some("42".into()),
            name: "Acme Power".into(),
            address: "Plot 7, Industrial Area".into(),
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.id, Some(42));
    }

    #[test]
    fn client_form_requires_company() {
        let form = ClientForm {
            id: None,
            name: "R. Mehta".into(),
            email: "r.mehta@example.com".into(),
            phone: "+91 98765 43210".into(),
            designation: "Plant Engineer".into(),
            company_id: Some(String::new()),
        };
        let errors = form.to_draft().unwrap_err();
        assert_eq!(errors.get("company_id"), Some("Select a company"));
        assert!(errors.get("phone").is_none());
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "first");
        errors.insert("email", "second");
        assert_eq!(errors.get("email"), Some("first"));
        assert_eq!(errors.iter().count(), 1);
    }

    #[test]
    fn admin_password_length_is_checked() {
        let form = AdminForm {
            name: "Site Admin".into(),
            email: "admin@example.com".into(),
            phone: "0221234567".into(),
            designation: "Manager".into(),
            password: "short".into(),
        };
        let errors = form.to_draft().unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(errors.iter().count(), 1);
    }

    #[test]
    fn blank_email_reports_required_not_shape() {
        let form = ClientForm {
            id: None,
            name: "   ".into(),
            email: "  ".into(),
            phone: "12ab".into(),
            designation: "Plant Engineer".into(),
            company_id: Some("7".into()),
        };
        let errors = form.to_draft().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("phone"), Some("Enter a valid phone number"));
        assert!(errors.get("company_id").is_none());
    }

    #[test]
    fn missing_or_unparseable_company_is_one_message() {
        let mut form = ClientForm {
            id: None,
            name: "R. Mehta".into(),
            email: "r.mehta@example.com".into(),
            phone: "0221234567".into(),
            designation: "Plant Engineer".into(),
            company_id: None,
        };
        assert_eq!(
            form.to_draft().unwrap_err().get("company_id"),
            Some("Select a company")
        );
        form.company_id = Some("acme".into());
        assert_eq!(
            form.to_draft().unwrap_err().get("company_id"),
            Some("Select a company")
        );
        form.company_id = Some(" 7 ".into());
        assert_eq!(form.to_draft().unwrap().company_id, 7);
    }
}
