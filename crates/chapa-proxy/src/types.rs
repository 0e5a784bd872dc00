use serde::{Deserialize, Serialize};

/// Payload for initializing a hosted checkout.
///
/// `tx_ref` is optional; the client generates one when absent so the
/// caller always gets a reference back to reconcile against.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckoutRequest {
    pub amount: f64,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// A started checkout: where to send the payer, and the reference to
/// verify with later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkout {
    pub checkout_url: String,
    pub tx_ref: String,
}

/// Resolution of a verify call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStatus {
    Confirmed,
    Failed,
    Pending,
}

/// Outcome of a verify call: the mapped status plus the provider's raw
/// payload for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub tx_ref: String,
    pub status: VerifyStatus,
    pub raw: serde_json::Value,
}

/// Envelope every Chapa response uses.
#[derive(Debug, Deserialize)]
pub(crate) struct GatewayEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
