//! Assistant gateway adapters.
//!
//! - `http_gateway`: REST endpoint adapter (`HttpAssistantGateway`)
//! - `simulated_gateway`: offline canned replies (`SimulatedAssistantGateway`)

pub mod http_gateway;
pub mod simulated_gateway;

pub use http_gateway::HttpAssistantGateway;
pub use simulated_gateway::SimulatedAssistantGateway;

use penguin_core::ChatError;
use penguin_core::config::{GatewayConfig, GatewayKind};
use penguin_core::gateway::AssistantGateway;
use std::sync::Arc;
use std::time::Duration;

/// Builds the gateway selected by the configuration.
///
/// # Errors
///
/// Returns `Config` if the HTTP gateway is selected without an endpoint, or
/// `Gateway` if the HTTP client cannot be built.
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn AssistantGateway>, ChatError> {
    match config.kind {
        GatewayKind::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .filter(|endpoint| !endpoint.trim().is_empty())
                .ok_or_else(|| ChatError::config("gateway.endpoint is required for the http gateway"))?;

            let mut gateway =
                HttpAssistantGateway::new(endpoint, Duration::from_secs(config.timeout_secs))?;
            if let Some(api_key) = &config.api_key {
                gateway = gateway.with_api_key(api_key);
            }
            tracing::info!(endpoint = %endpoint, "Using HTTP assistant gateway");
            Ok(Arc::new(gateway))
        }
        GatewayKind::Simulated => {
            tracing::info!("Using simulated assistant gateway");
            Ok(Arc::new(SimulatedAssistantGateway::new(Duration::from_millis(
                config.simulated_delay_ms,
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_without_endpoint_is_config_error() {
        let config = GatewayConfig {
            kind: GatewayKind::Http,
            ..GatewayConfig::default()
        };
        let err = build_gateway(&config).err().unwrap();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn test_builds_each_kind() {
        assert!(build_gateway(&GatewayConfig::default()).is_ok());

        let config = GatewayConfig {
            kind: GatewayKind::Http,
            endpoint: Some("http://localhost:3000/chat".to_string()),
            api_key: Some("key".to_string()),
            ..GatewayConfig::default()
        };
        assert!(build_gateway(&config).is_ok());
    }
}
