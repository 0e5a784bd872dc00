//! Stateless client for the Chapa payment gateway.
//!
//! Forwards checkout initialization and transaction verification to
//! Chapa using a server-held secret key that is never exposed to the
//! frontend. The caller reconciles its own payment records from the
//! returned outcome; this crate keeps no state.
//!
//! # Example
//!
//! ```no_run
//! use chapa_proxy::{ChapaClient, ChapaConfig, CheckoutRequest};
//!
//! # async fn example() -> Result<(), chapa_proxy::ChapaError> {
//! let client = ChapaClient::new(ChapaConfig::from_env()?);
//!
//! let checkout = client
//!     .initialize(CheckoutRequest {
//!         amount: 250.0,
//!         currency: "ETB".to_string(),
//!         email: "visitor@example.com".to_string(),
//!         first_name: "Abebe".to_string(),
//!         last_name: "Bekele".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let outcome = client.verify(&checkout.tx_ref).await?;
//! println!("{:?}", outcome.status);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::ChapaClient;
pub use config::{ChapaConfig, DEFAULT_BASE_URL};
pub use error::ChapaError;
pub use types::{Checkout, CheckoutRequest, VerifyOutcome, VerifyStatus};
