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

//! Upstream source adapters
//!
//! Each upstream sits behind one of three narrow traits so the orchestrator never
//! sees a URL, a header or a CSS selector.

pub mod abuseipdb_api;
pub mod abuseipdb_page;
pub mod ipinfo;
pub mod scamalytics;
pub mod utils;

use async_trait::async_trait;

use crate::core::error::{SourceResult, Upstream};
use crate::core::models::{AbuseSummary, GeoInfo, RiskAssessment};

pub use abuseipdb_api::AbuseIpdbApi;
pub use abuseipdb_page::AbuseIpdbPage;
pub use ipinfo::IpinfoClient;
pub use scamalytics::ScamalyticsPage;

/// Geolocation / ISP lookup
#[async_trait]
pub trait GeoSource: Send + Sync {
    async fn geolocate(&self, ip: &str) -> SourceResult<GeoInfo>;
}

/// Primary abuse data
#[async_trait]
pub trait AbuseSource: Send + Sync {
    fn upstream(&self) -> Upstream;

    async fn check(&self, ip: &str) -> SourceResult<AbuseSummary>;
}

/// Best-effort secondary risk score
#[async_trait]
pub trait RiskSource: Send + Sync {
    async fn assess(&self, ip: &str) -> SourceResult<RiskAssessment>;
}
