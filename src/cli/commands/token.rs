use serde_json::json;

use crate::auth::SessionKeys;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AuthConfig;

pub fn handle(auth: &AuthConfig, user: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let keys = SessionKeys::new(auth);
    let token = keys.issue(user)?;

    match output_format {
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            output_format,
            &format!("Issued session for {}", user),
            Some(json!({
                "user": user,
                "token": token,
                "cookie": keys.cookie_name(),
                "expiresInHours": auth.session_expiry_hours,
            })),
        ),
    }
}
