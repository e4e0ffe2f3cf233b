/*
 * Threat Lookup Proxy
 * Copyright (C) 2025 EliteHosting
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use clap::{Parser, ValueEnum};

use crate::core::error::LookupError;

// Upstream endpoints
pub const IPINFO_API_BASE: &str = "https://ipinfo.io";
pub const ABUSEIPDB_API_BASE: &str = "https://api.abuseipdb.com/api/v2";
pub const ABUSEIPDB_WEB_BASE: &str = "https://www.abuseipdb.com";
pub const SCAMALYTICS_WEB_BASE: &str = "https://scamalytics.com";

// Per-call upstream timeout
pub const TIMEOUT_SECONDS: u64 = 10;

// AbuseIPDB check window
pub const MAX_AGE_IN_DAYS: u32 = 90;

// Browser user agent for the scraped pages
pub const SCRAPER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// User agent for the JSON APIs
pub const API_USER_AGENT: &str = "threat-lookup/0.1";

pub const DEFAULT_PORT: u16 = 3001;

pub const ABUSEIPDB_API_KEY_ENV: &str = "ABUSEIPDB_API_KEY";
pub const IPINFO_TOKEN_ENV: &str = "IPINFO_TOKEN";

/// Where abuse data comes from. The two are alternatives, never chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AbuseStrategy {
    /// AbuseIPDB v2 JSON API plus ipinfo.io geolocation
    Api,
    /// Scrape the public AbuseIPDB check page
    Scrape,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "IP reputation lookup proxy")]
pub struct Cli {
    /// Listen address
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable trace output (includes module paths)
    #[arg(short, long)]
    pub trace: bool,

    /// Emit journald structured output instead of terminal lines
    #[arg(long)]
    pub journald: bool,

    /// Abuse data source
    #[arg(long, value_enum, default_value_t = AbuseStrategy::Api)]
    pub abuse_source: AbuseStrategy,

    /// Skip the Scamalytics risk lookup
    #[arg(long)]
    pub no_scamalytics: bool,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = TIMEOUT_SECONDS)]
    pub timeout: u64,
}

/// Resolved runtime configuration shared by every adapter.
#[derive(Debug, Clone)]
pub struct Settings {
    pub strategy: AbuseStrategy,
    pub abuseipdb_api_key: Option<String>,
    pub ipinfo_token: Option<String>,
    pub scamalytics_enabled: bool,
    pub timeout_secs: u64,
    pub ipinfo_base: String,
    pub abuseipdb_api_base: String,
    pub abuseipdb_web_base: String,
    pub scamalytics_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: AbuseStrategy::Api,
            abuseipdb_api_key: None,
            ipinfo_token: None,
            scamalytics_enabled: true,
            timeout_secs: TIMEOUT_SECONDS,
            ipinfo_base: IPINFO_API_BASE.to_string(),
            abuseipdb_api_base: ABUSEIPDB_API_BASE.to_string(),
            abuseipdb_web_base: ABUSEIPDB_WEB_BASE.to_string(),
            scamalytics_base: SCAMALYTICS_WEB_BASE.to_string(),
        }
    }
}

impl Settings {
    /// Build settings from the environment (and `.env` if present).
    pub fn from_env() -> Self {
        // Missing .env is fine
        let _ = dotenv::dotenv();

        Self {
            abuseipdb_api_key: non_empty_env(ABUSEIPDB_API_KEY_ENV),
            ipinfo_token: non_empty_env(IPINFO_TOKEN_ENV),
            ..Self::default()
        }
    }

    /// Environment settings overlaid with command line flags.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            strategy: cli.abuse_source,
            scamalytics_enabled: !cli.no_scamalytics,
            timeout_secs: cli.timeout.max(1),
            ..Self::from_env()
        }
    }

    /// Reject configurations that would fail on every request.
    pub fn validate(&self) -> Result<(), LookupError> {
        if self.strategy == AbuseStrategy::Api && self.abuseipdb_api_key.is_none() {
            return Err(LookupError::Config(format!(
                "{} must be set when the abuse source is 'api'",
                ABUSEIPDB_API_KEY_ENV
            )));
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_strategy_requires_key() {
        let settings = Settings::default();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains(ABUSEIPDB_API_KEY_ENV));
    }

    #[test]
    fn test_api_strategy_with_key_is_valid() {
        let settings = Settings {
            abuseipdb_api_key: Some("key".to_string()),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_scrape_strategy_needs_no_key() {
        let settings = Settings {
            strategy: AbuseStrategy::Scrape,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["threat-lookup"]);
        assert_eq!(cli.port, DEFAULT_PORT);
        assert_eq!(cli.abuse_source, AbuseStrategy::Api);
        assert_eq!(cli.timeout, TIMEOUT_SECONDS);
        assert!(!cli.no_scamalytics);
    }

    #[test]
    fn test_cli_scrape_source() {
        let cli = Cli::parse_from(["threat-lookup", "--abuse-source", "scrape", "--no-scamalytics"]);
        assert_eq!(cli.abuse_source, AbuseStrategy::Scrape);
        assert!(cli.no_scamalytics);
    }
}
