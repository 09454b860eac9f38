//! Operator notification over WhatsApp
//!
//! Manual orders need a human to fulfil them, so the storefront pings the
//! operator's WhatsApp through a relay service. Notification is best effort:
//! settlement spawns it after commit and a failure here never affects the
//! transaction.

use pulsa_core::config::NotifierConfig;
use pulsa_core::traits::{ManualOrderAlert, OperatorNotifier};
use pulsa_core::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

/// WhatsApp relay client
pub struct WhatsAppNotifier {
    http_client: Client,
    endpoint_url: String,
    token: String,
    instance_id: String,
    admin_msisdn: String,
}

impl WhatsAppNotifier {
    /// Create a new notifier from configuration
    pub fn new(config: &NotifierConfig) -> AppResult<Self> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build notifier client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint_url: config.endpoint_url.clone(),
            token: config.api_key.clone(),
            instance_id: config.api_secret.clone(),
            admin_msisdn: config.admin_msisdn.clone(),
        })
    }

    fn render_message(alert: &ManualOrderAlert) -> String {
        format!(
            "New manual order #{}\nCustomer: {} (account {})\nPackage: {}\nDestination: {}\nPrice: {}",
            alert.transaction_id,
            alert.customer_name,
            alert.account_id,
            alert.package_name,
            alert.destination,
            alert.price,
        )
    }
}

#[async_trait]
impl OperatorNotifier for WhatsAppNotifier {
    #[instrument(skip(self, alert), fields(transaction_id = alert.transaction_id))]
    async fn notify_manual_order(&self, alert: &ManualOrderAlert) -> AppResult<()> {
        let message = Self::render_message(alert);
        let jid = format!("{}@s.whatsapp.net", self.admin_msisdn);

        debug!("Sending manual order alert for transaction {}", alert.transaction_id);

        let response = self
            .http_client
            .get(&self.endpoint_url)
            .query(&[
                ("token", self.token.as_str()),
                ("instance_id", self.instance_id.as_str()),
                ("jid", jid.as_str()),
                ("msg", message.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::GatewayFailure(format!("Notifier request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::GatewayFailure(format!(
                "Notifier returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_message() {
        let alert = ManualOrderAlert {
            transaction_id: 7,
            account_id: 3,
            customer_name: "Budi".to_string(),
            package_name: "Telkomsel 5GB".to_string(),
            destination: "628123456789".to_string(),
            price: dec!(55000),
        };

        let message = WhatsAppNotifier::render_message(&alert);
        assert!(message.contains("#7"));
        assert!(message.contains("Budi"));
        assert!(message.contains("Telkomsel 5GB"));
        assert!(message.contains("628123456789"));
    }
}
