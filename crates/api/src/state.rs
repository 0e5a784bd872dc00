use std::sync::Arc;

use chapa_proxy::ChapaClient;
use database::Database;
use secrecy::SecretString;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Absent when the gateway env vars are not set; payment endpoints
    /// then answer with a configuration error instead of panicking.
    pub chapa: Option<Arc<ChapaClient>>,
    pub jwt_secret: Arc<SecretString>,
}
