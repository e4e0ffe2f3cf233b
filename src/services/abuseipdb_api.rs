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

//! AbuseIPDB v2 `check` endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::AbuseSource;
use super::utils::{build_client, fetch_json};
use crate::config::{API_USER_AGENT, MAX_AGE_IN_DAYS, Settings};
use crate::core::error::{LookupError, SourceResult, Upstream};
use crate::core::models::{AbuseReport, AbuseSummary};
use crate::log_debug;

#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    pub data: CheckData,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckData {
    #[serde(default)]
    pub ip_address: Option<String>,
    pub is_public: Option<bool>,
    pub ip_version: Option<u8>,
    pub is_whitelisted: Option<bool>,
    pub abuse_confidence_score: Option<u8>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub usage_type: Option<String>,
    pub isp: Option<String>,
    pub domain: Option<String>,
    pub hostnames: Option<Vec<String>>,
    pub total_reports: Option<u64>,
    pub num_distinct_users: Option<u64>,
    pub last_reported_at: Option<String>,
    #[serde(default)]
    pub reports: Option<Vec<AbuseReport>>,
}

impl CheckData {
    pub fn into_summary(self, requested_ip: &str) -> AbuseSummary {
        AbuseSummary {
            ip_address: self.ip_address.unwrap_or_else(|| requested_ip.to_string()),
            is_public: self.is_public,
            ip_version: self.ip_version,
            is_whitelisted: self.is_whitelisted,
            abuse_confidence_score: self.abuse_confidence_score.unwrap_or(0).min(100),
            country_code: self.country_code,
            country_name: self.country_name,
            usage_type: self.usage_type,
            isp: self.isp,
            domain: self.domain,
            hostnames: self.hostnames,
            total_reports: self.total_reports.unwrap_or(0),
            num_distinct_users: self.num_distinct_users.unwrap_or(0),
            last_reported_at: self.last_reported_at,
            reports: self.reports.unwrap_or_default(),
        }
    }
}

pub struct AbuseIpdbApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AbuseIpdbApi {
    pub fn new(settings: &Settings) -> SourceResult<Self> {
        let api_key = settings
            .abuseipdb_api_key
            .clone()
            .ok_or_else(|| LookupError::Config("AbuseIPDB API key is not configured".to_string()))?;

        Ok(Self {
            client: build_client(settings.timeout_secs, API_USER_AGENT)?,
            base_url: settings.abuseipdb_api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl AbuseSource for AbuseIpdbApi {
    fn upstream(&self) -> Upstream {
        Upstream::AbuseIpdbApi
    }

    async fn check(&self, ip: &str) -> SourceResult<AbuseSummary> {
        log_debug!("Querying AbuseIPDB API for {}", ip);

        let max_age = MAX_AGE_IN_DAYS.to_string();
        let request = self
            .client
            .get(format!("{}/check", self.base_url))
            .header("Key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("ipAddress", ip),
                ("maxAgeInDays", max_age.as_str()),
                ("verbose", "true"),
            ]);

        let response: CheckResponse = fetch_json(Upstream::AbuseIpdbApi, request).await?;
        Ok(response.data.into_summary(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_response_maps_fields() {
        let json = r#"{
            "data": {
                "ipAddress": "118.25.6.39",
                "isPublic": true,
                "ipVersion": 4,
                "isWhitelisted": false,
                "abuseConfidenceScore": 100,
                "countryCode": "CN",
                "countryName": "China",
                "usageType": "Data Center/Web Hosting/Transit",
                "isp": "Tencent Cloud Computing (Beijing) Co. Ltd",
                "domain": "tencent.com",
                "hostnames": [],
                "isTor": false,
                "totalReports": 1,
                "numDistinctUsers": 1,
                "lastReportedAt": "2018-12-20T20:55:14+00:00",
                "reports": [
                    {
                        "reportedAt": "2018-12-20T20:55:14+00:00",
                        "comment": "Dec 20 20:55:14 srv206 sshd[13937]: Invalid user oracle from 118.25.6.39",
                        "categories": [18, 22],
                        "reporterId": 1,
                        "reporterCountryCode": "US",
                        "reporterCountryName": "United States"
                    }
                ]
            }
        }"#;
        let response: CheckResponse = serde_json::from_str(json).unwrap();
        let summary = response.data.into_summary("118.25.6.39");

        assert_eq!(summary.abuse_confidence_score, 100);
        assert_eq!(summary.total_reports, 1);
        assert_eq!(summary.is_whitelisted, Some(false));
        assert_eq!(summary.hostnames, Some(vec![]));
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].categories, vec![18, 22]);
        assert_eq!(summary.reports[0].reporter_country_code.as_deref(), Some("US"));
    }

    #[test]
    fn test_sparse_response_uses_defaults() {
        let response: CheckResponse =
            serde_json::from_str(r#"{"data": {"isWhitelisted": null, "reports": null}}"#).unwrap();
        let summary = response.data.into_summary("192.0.2.1");
        assert_eq!(summary.ip_address, "192.0.2.1");
        assert_eq!(summary.is_whitelisted, None);
        assert_eq!(summary.abuse_confidence_score, 0);
        assert!(summary.reports.is_empty());
        assert_eq!(summary.hostnames, None);
    }

    #[test]
    fn test_new_requires_key() {
        assert!(AbuseIpdbApi::new(&Settings::default()).is_err());
    }
}
