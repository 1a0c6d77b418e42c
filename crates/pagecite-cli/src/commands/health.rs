//! Health command implementation.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;
use pagecite_sdk::PageciteClient;

/// Execute the health command.
pub async fn execute_health(client: &PageciteClient, formatter: &Formatter) -> Result<()> {
    let health = client.health().await?;

    match formatter.format() {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "server": client.base_url().as_str(),
                "status": health.status,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Quiet => println!("{}", health.status),
        OutputFormat::Table => {
            let message = format!("{} is {}", client.base_url(), health.status);
            if health.is_ok() {
                println!("{}", formatter.success(&message));
            } else {
                println!("{}", formatter.warning(&message));
            }
        }
    }

    Ok(())
}
