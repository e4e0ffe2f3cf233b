//! # Threat Lookup Proxy
//!
//! Backend for the EliteHosting IP threat-analysis page. One lookup combines:
//! - ipinfo.io geolocation (API strategy)
//! - AbuseIPDB abuse data, from the v2 API or the public check page
//! - a best-effort Scamalytics fraud score
//!
//! into a single JSON document with a seven-day report histogram and a
//! reports-by-country breakdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // needs ABUSEIPDB_API_KEY in the environment or .env
//!     let result = threat_lookup::lookup("118.25.6.39").await?;
//!     println!("score: {}", result.abuse_confidence_score);
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP API
//!
//! - `GET /api/lookup/:ip` → `LookupResult` or `{ "error": "..." }`
//! - `GET /api/categories` → AbuseIPDB category table
//! - `GET /api/health`

pub mod config;
pub mod core;
pub mod services;
pub mod web;

pub use config::{AbuseStrategy, Settings};
pub use crate::core::{LookupError, LookupResult, LookupService};

/// Look up one IP with settings taken from the environment
pub async fn lookup(ip: &str) -> Result<LookupResult, LookupError> {
    let service = LookupService::from_settings(&Settings::from_env())?;
    service.lookup(ip).await
}
