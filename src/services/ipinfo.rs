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

//! ipinfo.io geolocation client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::GeoSource;
use super::utils::{build_client, fetch_json};
use crate::config::{API_USER_AGENT, Settings};
use crate::core::error::{SourceResult, Upstream};
use crate::core::models::GeoInfo;
use crate::log_debug;

/// `GET https://ipinfo.io/{ip}/json`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IpinfoResponse {
    pub ip: Option<String>,
    pub loc: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub org: Option<String>,
    pub hostname: Option<String>,
}

impl IpinfoResponse {
    pub fn into_geo(self, requested_ip: &str) -> GeoInfo {
        GeoInfo {
            ip: self.ip.unwrap_or_else(|| requested_ip.to_string()),
            location: self.loc,
            country: self.country,
            city: self.city,
            region: self.region,
            isp: self.org,
            hostname: self.hostname,
        }
    }
}

pub struct IpinfoClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl IpinfoClient {
    pub fn new(settings: &Settings) -> SourceResult<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs, API_USER_AGENT)?,
            base_url: settings.ipinfo_base.trim_end_matches('/').to_string(),
            token: settings.ipinfo_token.clone(),
        })
    }
}

#[async_trait]
impl GeoSource for IpinfoClient {
    async fn geolocate(&self, ip: &str) -> SourceResult<GeoInfo> {
        let url = format!("{}/{}/json", self.base_url, urlencoding::encode(ip));
        log_debug!("IPinfo URL: {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.query(&[("token", token.as_str())]);
        }

        let response: IpinfoResponse = fetch_json(Upstream::Ipinfo, request).await?;
        Ok(response.into_geo(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_map_one_to_one() {
        let json = r#"{
            "ip": "8.8.8.8",
            "hostname": "dns.google",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "org": "AS15169 Google LLC",
            "postal": "94043",
            "timezone": "America/Los_Angeles"
        }"#;
        let geo = serde_json::from_str::<IpinfoResponse>(json).unwrap().into_geo("8.8.8.8");
        assert_eq!(geo.ip, "8.8.8.8");
        assert_eq!(geo.location.as_deref(), Some("37.4056,-122.0775"));
        assert_eq!(geo.country.as_deref(), Some("US"));
        assert_eq!(geo.isp.as_deref(), Some("AS15169 Google LLC"));
        assert_eq!(geo.hostname.as_deref(), Some("dns.google"));
    }

    #[test]
    fn test_bogon_response_keeps_requested_ip() {
        let json = r#"{"ip": null, "bogon": true}"#;
        let geo = serde_json::from_str::<IpinfoResponse>(json).unwrap().into_geo("10.0.0.1");
        assert_eq!(geo.ip, "10.0.0.1");
        assert_eq!(geo.country, None);
    }
}
