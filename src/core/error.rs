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

//! Error types for the lookup pipeline

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub const MISSING_IP_MESSAGE: &str = "IP address is required.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";
pub const SCRAPE_ERROR_MESSAGE: &str = "Failed to scrape AbuseIPDB.";

/// External services the proxy talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Ipinfo,
    AbuseIpdbApi,
    AbuseIpdbPage,
    Scamalytics,
}

impl Upstream {
    pub fn name(self) -> &'static str {
        match self {
            Upstream::Ipinfo => "ipinfo.io",
            Upstream::AbuseIpdbApi => "AbuseIPDB API",
            Upstream::AbuseIpdbPage => "AbuseIPDB page",
            Upstream::Scamalytics => "Scamalytics",
        }
    }

    /// Message shown to callers when the upstream gave nothing better
    fn fallback_message(self) -> &'static str {
        match self {
            Upstream::AbuseIpdbPage => SCRAPE_ERROR_MESSAGE,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup error type
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("IP address is required.")]
    MissingIp,

    #[error("{upstream} returned HTTP {status}")]
    Upstream {
        upstream: Upstream,
        status: u16,
        body: String,
    },

    #[error("{upstream} request failed: {error}")]
    Transport {
        upstream: Upstream,
        #[source]
        error: reqwest::Error,
    },

    #[error("{upstream} response could not be parsed: {reason}")]
    Parse { upstream: Upstream, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for adapter and orchestrator calls
pub type SourceResult<T> = Result<T, LookupError>;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

/// First `errors[].detail` of an upstream error body, if it has one
pub fn first_error_detail(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .errors
        .into_iter()
        .next()
        .and_then(|e| e.detail)
        .filter(|d| !d.trim().is_empty())
}

impl LookupError {
    pub fn transport(upstream: Upstream, error: reqwest::Error) -> Self {
        Self::Transport { upstream, error }
    }

    pub fn parse(upstream: Upstream, reason: impl Into<String>) -> Self {
        Self::Parse {
            upstream,
            reason: reason.into(),
        }
    }

    /// HTTP status to answer with
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingIp => 400,
            Self::Upstream { status, .. } => *status,
            _ => 500,
        }
    }

    /// Human readable text for the `{ "error": ... }` body
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingIp => MISSING_IP_MESSAGE.to_string(),
            Self::Upstream { upstream, body, .. } => {
                first_error_detail(body).unwrap_or_else(|| upstream.fallback_message().to_string())
            }
            Self::Transport { upstream, .. } | Self::Parse { upstream, .. } => {
                upstream.fallback_message().to_string()
            }
            Self::Config(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// What goes into the server log: the raw upstream body when there is one
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Upstream { upstream, status, body } if !body.is_empty() => {
                format!("{} returned HTTP {}: {}", upstream, status, body)
            }
            other => other.to_string(),
        }
    }
}
