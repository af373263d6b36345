//! Page routes and the sign-in gate in front of them.

use serde::Serialize;

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRoute {
    Home,
    Login,
    Signup,
    Patients,
    PatientDetail(String),
    CaseTaking,
    Repertory,
    Prescriptions,
    Profile,
    NotFound,
}

impl AppRoute {
    /// Match a request path. A trailing slash is ignored.
    pub fn resolve(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        match path {
            "/" => AppRoute::Home,
            "/auth/login" => AppRoute::Login,
            "/auth/signup" => AppRoute::Signup,
            "/patients" => AppRoute::Patients,
            "/case-taking" => AppRoute::CaseTaking,
            "/repertory" => AppRoute::Repertory,
            "/prescriptions" => AppRoute::Prescriptions,
            "/profile" => AppRoute::Profile,
            other => match other.strip_prefix("/patients/") {
                Some(id) if !id.is_empty() && !id.contains('/') => AppRoute::PatientDetail(id.to_string()),
                _ => AppRoute::NotFound,
            },
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            AppRoute::Home | AppRoute::Login | AppRoute::Signup | AppRoute::NotFound
        )
    }

    /// Page descriptor served to the client for this route.
    pub fn page(&self) -> Page {
        let (name, title, data): (&str, &str, &[&str]) = match self {
            AppRoute::Home => ("home", "Homeocare", &[]),
            AppRoute::Login => ("login", "Sign in", &["/api/auth/session"]),
            AppRoute::Signup => ("signup", "Create account", &["/api/auth/session"]),
            AppRoute::Patients => ("patients", "Patients", &["/api/patients"]),
            AppRoute::PatientDetail(_) => ("patient_detail", "Patient", &[]),
            AppRoute::CaseTaking => ("case_taking", "Case taking", &["/api/patients", "/api/cases"]),
            AppRoute::Repertory => (
                "repertory",
                "Repertory",
                &["/api/repertory", "/api/repertory/search", "/api/repertory/selection"],
            ),
            AppRoute::Prescriptions => (
                "prescriptions",
                "Prescriptions",
                &["/api/patients", "/api/cases", "/api/remedies", "/api/prescriptions"],
            ),
            AppRoute::Profile => ("profile", "Profile", &["/api/profile"]),
            AppRoute::NotFound => ("not_found", "Page not found", &[]),
        };
        let mut data: Vec<String> = data.iter().map(|s| s.to_string()).collect();
        if let AppRoute::PatientDetail(id) = self {
            data.push(format!("/api/patients/{id}"));
        }
        Page {
            name,
            title,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub name: &'static str,
    pub title: &'static str,
    /// API endpoints the page reads from.
    pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Render(Page),
    RedirectToLogin,
    NotFound(Page),
}

pub fn gate(route: &AppRoute, signed_in: bool) -> Gate {
    match route {
        AppRoute::NotFound => Gate::NotFound(route.page()),
        r if r.requires_session() && !signed_in => Gate::RedirectToLogin,
        r => Gate::Render(r.page()),
    }
}
