//! Route access decisions.
//!
//! [`AccessGate::decide`] is a pure function of "is this request
//! authenticated" and the target path. The axum middleware in
//! `middleware::gate` supplies both and renders the decision.

use serde::Serialize;

use crate::config::AuthConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "location", rename_all = "lowercase")]
pub enum GateDecision {
    Allow,
    /// Unauthenticated request for a protected path; send it to the login page
    Deny,
    Redirect(String),
}

/// Which paths the gate runs for at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    excluded_prefixes: Vec<String>,
    excluded_suffixes: Vec<String>,
}

impl RouteMatcher {
    pub fn new(excluded_prefixes: Vec<String>, excluded_suffixes: Vec<String>) -> Self {
        Self { excluded_prefixes, excluded_suffixes }
    }

    /// Plain prefix match, so `/api` also excludes `/apiary`
    pub fn matches(&self, path: &str) -> bool {
        let excluded = self.excluded_prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.excluded_suffixes.iter().any(|s| path.ends_with(s.as_str()));
        !excluded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    protected_prefix: String,
    login_path: String,
    matcher: RouteMatcher,
}

impl AccessGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            protected_prefix: config.protected_prefix.clone(),
            login_path: config.login_path.clone(),
            matcher: RouteMatcher::new(config.excluded_prefixes.clone(), config.excluded_suffixes.clone()),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Where authenticated users land when they revisit the login page
    pub fn home_path(&self) -> &str {
        &self.protected_prefix
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(self.protected_prefix.as_str())
    }

    pub fn decide(&self, authenticated: bool, path: &str) -> GateDecision {
        if self.is_protected(path) {
            if authenticated {
                GateDecision::Allow
            } else {
                GateDecision::Deny
            }
        } else if authenticated && path == self.login_path {
            GateDecision::Redirect(self.home_path().to_string())
        } else {
            GateDecision::Allow
        }
    }

    /// Login page URL carrying the originally requested path
    pub fn login_redirect(&self, requested: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(requested.as_bytes()).collect();
        format!("{}?callbackUrl={}", self.login_path, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AccessGate {
        AccessGate::new(&AuthConfig::default())
    }

    #[test]
    fn dashboard_requires_session() {
        let gate = gate();
        assert_eq!(gate.decide(false, "/dashboard/invoices"), GateDecision::Deny);
        assert_eq!(gate.decide(true, "/dashboard/invoices"), GateDecision::Allow);
        assert_eq!(gate.decide(false, "/dashboard"), GateDecision::Deny);
        assert_eq!(gate.decide(true, "/dashboard"), GateDecision::Allow);
    }

    #[test]
    fn login_page_redirects_signed_in_users() {
        let gate = gate();
        assert_eq!(gate.decide(true, "/login"), GateDecision::Redirect("/dashboard".to_string()));
        assert_eq!(gate.decide(false, "/login"), GateDecision::Allow);
    }

    #[test]
    fn other_pages_are_public() {
        let gate = gate();
        assert_eq!(gate.decide(false, "/"), GateDecision::Allow);
        assert_eq!(gate.decide(true, "/"), GateDecision::Allow);
        assert_eq!(gate.decide(false, "/about"), GateDecision::Allow);
    }

    #[test]
    fn matcher_skips_api_static_and_png() {
        let gate = gate();
        assert!(!gate.applies_to("/api/invoices"));
        assert!(!gate.applies_to("/apiary"));
        assert!(!gate.applies_to("/_next/static/chunk.js"));
        assert!(!gate.applies_to("/_next/image?url=x"));
        assert!(!gate.applies_to("/dashboard/logo.png"));
        assert!(gate.applies_to("/dashboard/invoices"));
        assert!(gate.applies_to("/login"));
        assert!(gate.applies_to("/"));
    }

    #[test]
    fn login_redirect_encodes_callback() {
        assert_eq!(
            gate().login_redirect("/dashboard/invoices/a b"),
            "/login?callbackUrl=%2Fdashboard%2Finvoices%2Fa+b"
        );
    }

    #[test]
    fn decision_serializes_for_cli_output() {
        assert_eq!(
            serde_json::to_value(GateDecision::Redirect("/dashboard".to_string())).unwrap(),
            serde_json::json!({ "decision": "redirect", "location": "/dashboard" })
        );
        assert_eq!(
            serde_json::to_value(GateDecision::Allow).unwrap(),
            serde_json::json!({ "decision": "allow" })
        );
    }
}
