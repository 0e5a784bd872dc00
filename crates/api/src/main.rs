use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use chapa_proxy::{ChapaClient, ChapaConfig};
use database::Database;
use secrecy::SecretString;
use tracing::{info, warn};

mod auth;
mod error;
mod notify;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let addr = env::var("TOURISM_API_ADDR").unwrap_or_else(|_| "127.0.0.1:8787".to_string());
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:tourism.db?mode=rwc".to_string());
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

    let chapa = match ChapaConfig::from_env() {
        Ok(config) => Some(Arc::new(ChapaClient::new(config))),
        Err(err) => {
            warn!(error = %err, "Chapa gateway not configured; payment endpoints disabled");
            None
        }
    };

    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let state = AppState {
        db,
        chapa,
        jwt_secret: Arc::new(SecretString::from(jwt_secret)),
    };

    let app = routes::router(state);

    let addr: SocketAddr = addr.parse().expect("Invalid TOURISM_API_ADDR");
    info!(%addr, "Tourism API listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
