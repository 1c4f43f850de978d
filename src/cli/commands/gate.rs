use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AuthConfig;
use crate::gate::{AccessGate, GateDecision};

pub fn handle(auth: &AuthConfig, path: &str, authenticated: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let gate = AccessGate::new(auth);

    if !gate.applies_to(path) {
        return output_success(
            output_format,
            &format!("{} is excluded from the access gate", path),
            Some(json!({ "path": path, "gated": false })),
        );
    }

    let decision = gate.decide(authenticated, path);
    let summary = match &decision {
        GateDecision::Allow => format!("{} is allowed", path),
        GateDecision::Deny => format!("{} is denied; visitor goes to {}", path, gate.login_redirect(path)),
        GateDecision::Redirect(location) => format!("{} redirects to {}", path, location),
    };

    output_success(
        output_format,
        &summary,
        Some(json!({ "path": path, "gated": true, "result": decision })),
    )
}
