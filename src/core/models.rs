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

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One reported incident for an IP
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reported_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "lenient_categories")]
    pub categories: Vec<u32>,
    /// Labels for `categories`, or the raw labels when scraped
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reporter_id: u64,
    #[serde(default)]
    pub reporter_country_code: Option<String>,
    #[serde(default)]
    pub reporter_country_name: Option<String>,
}

/// One calendar day of the weekly chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyBucket {
    pub day: &'static str,
    pub date: NaiveDate,
    pub count: u32,
}

/// Chart-friendly form of [`WeeklyBucket`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub reports: u32,
}

/// One slice of the reports-by-country breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountrySlice {
    pub name: String,
    pub value: usize,
}

/// Geolocation fields from the IP info service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    pub ip: String,
    pub location: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub isp: Option<String>,
    pub hostname: Option<String>,
}

/// Abuse data as produced by either abuse strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbuseSummary {
    pub ip_address: String,
    pub is_public: Option<bool>,
    pub ip_version: Option<u8>,
    pub is_whitelisted: Option<bool>,
    pub abuse_confidence_score: u8,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub usage_type: Option<String>,
    pub isp: Option<String>,
    pub domain: Option<String>,
    pub hostnames: Option<Vec<String>>,
    pub total_reports: u64,
    pub num_distinct_users: u64,
    pub last_reported_at: Option<String>,
    pub reports: Vec<AbuseReport>,
}

/// Secondary risk assessment (Scamalytics)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: Option<u32>,
    pub risk_level: String,
    pub isp: String,
    pub country: String,
    pub city: String,
    pub blacklist: BTreeMap<String, String>,
    pub proxies: BTreeMap<String, String>,
}

/// The normalized `/api/lookup/:ip` response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub ip_address: String,
    pub ip_version: u8,
    pub is_public: bool,
    pub location: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub isp: Option<String>,
    pub hostname: Option<String>,
    pub abuse_confidence_score: u8,
    pub total_reports: u64,
    pub num_distinct_users: u64,
    pub is_whitelisted: bool,
    pub usage_type: Option<String>,
    pub domain: Option<String>,
    pub hostnames: Vec<String>,
    pub last_reported_at: Option<String>,
    pub reports: Vec<AbuseReport>,
    pub reports_this_week: Vec<ChartPoint>,
    pub reports_by_country: Vec<CountrySlice>,
    pub scamalytics: Option<RiskAssessment>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts integer codes, numeric strings and comma lists; drops the rest.
fn lenient_categories<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    let items = match raw {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    };

    Ok(items
        .into_iter()
        .flat_map(|item| match item {
            Value::Number(n) => n
                .as_u64()
                .map(clamp_code)
                .into_iter()
                .collect::<Vec<_>>(),
            Value::String(s) => s
                .split(',')
                .filter_map(|part| part.trim().parse::<u64>().ok())
                .map(clamp_code)
                .collect(),
            _ => Vec::new(),
        })
        .collect())
}

// Oversized codes stay in the list so they render as unknown categories
fn clamp_code(code: u64) -> u32 {
    u32::try_from(code).unwrap_or(u32::MAX)
}
