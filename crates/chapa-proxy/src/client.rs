use tracing::{info, instrument};
use uuid::Uuid;

use crate::types::GatewayEnvelope;
use crate::{ChapaConfig, ChapaError, Checkout, CheckoutRequest, VerifyOutcome, VerifyStatus};

/// Client for the Chapa payment gateway.
///
/// Stateless: every call is one synchronous HTTP request authorized
/// with the server-held secret key. No retry, no local persistence.
pub struct ChapaClient {
    http: reqwest::Client,
    config: ChapaConfig,
}

impl ChapaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ChapaConfig) -> Self {
        info!(base_url = %config.base_url, "Created Chapa client");
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Initialize a hosted checkout.
    ///
    /// Fills in a generated `tourism-<uuid>` tx_ref when the caller did
    /// not supply one, and returns it alongside the checkout URL.
    #[instrument(skip(self, request), fields(currency = %request.currency, amount = request.amount))]
    pub async fn initialize(&self, mut request: CheckoutRequest) -> Result<Checkout, ChapaError> {
        let tx_ref = request
            .tx_ref
            .take()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| format!("tourism-{}", Uuid::new_v4()));
        request.tx_ref = Some(tx_ref.clone());

        let url = format!("{}/transaction/initialize", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.secret_key())
            .json(&request)
            .send()
            .await?;

        let envelope: GatewayEnvelope = response.json().await?;
        if envelope.status.as_deref() != Some("success") {
            return Err(ChapaError::Gateway(
                envelope
                    .message
                    .unwrap_or_else(|| "initialization refused".to_string()),
            ));
        }

        let checkout_url = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("checkout_url"))
            .and_then(|u| u.as_str())
            .ok_or_else(|| {
                ChapaError::MalformedResponse("missing data.checkout_url".to_string())
            })?
            .to_string();

        info!(%tx_ref, "Chapa checkout initialized");
        Ok(Checkout {
            checkout_url,
            tx_ref,
        })
    }

    /// Verify a transaction by reference.
    #[instrument(skip(self))]
    pub async fn verify(&self, tx_ref: &str) -> Result<VerifyOutcome, ChapaError> {
        let url = format!("{}/transaction/verify/{}", self.config.base_url, tx_ref);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.config.secret_key())
            .send()
            .await?;

        let envelope: GatewayEnvelope = response.json().await?;
        if envelope.status.as_deref() != Some("success") {
            return Err(ChapaError::Gateway(
                envelope
                    .message
                    .unwrap_or_else(|| "verification refused".to_string()),
            ));
        }

        let raw = envelope.data.unwrap_or(serde_json::Value::Null);
        let status = map_transaction_status(
            raw.get("status").and_then(|s| s.as_str()).unwrap_or(""),
        );

        info!(%tx_ref, ?status, "Chapa verification resolved");
        Ok(VerifyOutcome {
            tx_ref: tx_ref.to_string(),
            status,
            raw,
        })
    }
}

/// Map the provider's transaction status string to our closed domain.
/// Anything the gateway has not settled yet stays pending.
pub(crate) fn map_transaction_status(status: &str) -> VerifyStatus {
    match status {
        "success" | "confirmed" => VerifyStatus::Confirmed,
        "failed" | "cancelled" | "canceled" => VerifyStatus::Failed,
        _ => VerifyStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_status_mapping() {
        assert_eq!(map_transaction_status("success"), VerifyStatus::Confirmed);
        assert_eq!(map_transaction_status("confirmed"), VerifyStatus::Confirmed);
        assert_eq!(map_transaction_status("failed"), VerifyStatus::Failed);
        assert_eq!(map_transaction_status("cancelled"), VerifyStatus::Failed);
        assert_eq!(map_transaction_status("pending"), VerifyStatus::Pending);
        assert_eq!(map_transaction_status(""), VerifyStatus::Pending);
        assert_eq!(map_transaction_status("created"), VerifyStatus::Pending);
    }
}
