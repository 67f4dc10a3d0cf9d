//! External generative-service clients.

mod gemini;
mod gemini_types;
mod traits;

pub use gemini::GeminiClient;
pub use traits::{GarmentClassifier, OutfitRenderer};

use reqwest::Client;
use std::time::Duration;

pub(crate) fn build_provider_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
