//! CLI Status Command
//!
//! Probes the local gateway and the inference service it relays to.

use anyhow::Result;
use serde_json::Value;
use specscan_inference::HttpInferenceClient;

use crate::config::Config;
use crate::output::{note_error, note_success};

pub async fn run(config: &Config) -> Result<()> {
    println!("\nspecscan status\n");

    let gateway_url = format!("http://localhost:{}/api", config.port);
    match reqwest::get(&gateway_url).await {
        Ok(resp) if resp.status().is_success() => {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            let message = body["message"].as_str().unwrap_or("up");
            note_success(&format!("Gateway ({gateway_url}): {message}"));
        }
        Ok(resp) => note_error(&format!("Gateway ({gateway_url}) answered {}", resp.status())),
        Err(_) => note_error(&format!("Gateway is not running on port {}", config.port)),
    }

    let client = HttpInferenceClient::new(&config.inference)?;
    match client.health().await {
        Ok(body) => {
            let status = body["status"].as_str().unwrap_or("up");
            note_success(&format!("Inference service ({}): {status}", config.inference.base_url));
        }
        Err(e) => note_error(&format!("Inference service ({}): {e}", config.inference.base_url)),
    }

    println!();
    Ok(())
}
