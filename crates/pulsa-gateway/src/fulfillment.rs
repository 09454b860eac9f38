//! Upstream fulfillment provider client
//!
//! Automatic packages are delivered by POSTing an order to the provider and
//! inspecting the JSON body it returns. The provider confirms delivery by
//! setting `status: true` in the body; anything else, including transport
//! failures and timeouts, counts as a failed delivery. Failures are reported
//! through [`DeliveryOutcome::success`] rather than as errors so settlement
//! can record the failed transaction with the provider's raw response.

use pulsa_core::config::GatewayConfig;
use pulsa_core::traits::{DeliveryOutcome, DeliveryRequest, FulfillmentGateway};
use pulsa_core::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HTTP client for the upstream fulfillment provider
pub struct HttpFulfillmentGateway {
    http_client: Client,
    endpoint_url: String,
    api_key: String,
    callback_url: String,
}

/// Order payload expected by the provider
#[derive(Debug, Serialize)]
struct OrderPayload<'a> {
    api_key: &'a str,
    mode: &'a str,
    msisdn: &'a str,
    package_id: &'a str,
    url: &'a str,
}

impl HttpFulfillmentGateway {
    /// Create a new gateway client from configuration
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build gateway client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.clone(),
            callback_url: config.callback_url.clone(),
        })
    }
}

#[async_trait]
impl FulfillmentGateway for HttpFulfillmentGateway {
    #[instrument(skip(self), fields(destination = %request.destination))]
    async fn deliver(&self, request: &DeliveryRequest) -> AppResult<DeliveryOutcome> {
        let payload = OrderPayload {
            api_key: &self.api_key,
            mode: "callback",
            msisdn: &request.destination,
            package_id: &request.package_reference,
            url: &self.callback_url,
        };

        debug!(
            "Submitting order for package {} to {}",
            request.package_reference, request.destination
        );

        let response = match self
            .http_client
            .post(&self.endpoint_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Fulfillment request failed: {}", e);
                return Ok(DeliveryOutcome {
                    success: false,
                    raw: json!({ "error": e.to_string() }),
                });
            }
        };

        let status = response.status();
        let raw: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Fulfillment response was not valid JSON: {}", e);
                return Ok(DeliveryOutcome {
                    success: false,
                    raw: json!({ "error": e.to_string(), "http_status": status.as_u16() }),
                });
            }
        };

        // The provider signals success in the body, not the HTTP status
        let success = raw.get("status").and_then(Value::as_bool).unwrap_or(false);

        debug!("Fulfillment outcome: success={}", success);

        Ok(DeliveryOutcome { success, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            endpoint_url: "http://127.0.0.1:1/order".to_string(),
            api_key: "test-key".to_string(),
            callback_url: "http://127.0.0.1/callback".to_string(),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_a_failed_outcome() {
        let gateway = HttpFulfillmentGateway::new(&test_config()).unwrap();

        let outcome = gateway
            .deliver(&DeliveryRequest {
                package_reference: "PKG1".to_string(),
                destination: "628123456789".to_string(),
            })
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.raw.get("error").is_some());
    }

    #[test]
    fn test_payload_shape() {
        let payload = OrderPayload {
            api_key: "k",
            mode: "callback",
            msisdn: "628123456789",
            package_id: "PKG1",
            url: "http://cb",
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["mode"], "callback");
        assert_eq!(value["msisdn"], "628123456789");
        assert_eq!(value["package_id"], "PKG1");
    }
}
