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

//! Merges adapter output into the flat response shape

use std::net::IpAddr;

use chrono::NaiveDate;

use super::breakdown::country_breakdown;
use super::categories::category_names;
use super::models::{AbuseReport, AbuseSummary, GeoInfo, LookupResult, RiskAssessment};
use super::weekly::{bucket_reports, chart_points};

/// Build the response for `ip`. `geo` is only present for the API strategy.
pub fn normalize(
    ip: &str,
    geo: Option<GeoInfo>,
    abuse: AbuseSummary,
    risk: Option<RiskAssessment>,
    today: NaiveDate,
) -> LookupResult {
    let reports: Vec<AbuseReport> = abuse.reports.into_iter().map(with_category_names).collect();
    let weekly = bucket_reports(&reports, today);

    let ip_address = geo
        .as_ref()
        .map(|g| g.ip.clone())
        .filter(|v| !v.is_empty())
        .or_else(|| Some(abuse.ip_address).filter(|v| !v.is_empty() && v != "N/A"))
        .unwrap_or_else(|| ip.to_string());

    let hostnames = abuse
        .hostnames
        .unwrap_or_else(|| abuse.domain.iter().cloned().collect());

    let (location, country, country_code, city, region, isp, hostname) = match geo {
        Some(geo) => (
            geo.location,
            geo.country.clone(),
            geo.country,
            geo.city,
            geo.region,
            geo.isp,
            geo.hostname,
        ),
        None => (
            None,
            abuse.country_name.clone(),
            abuse.country_code.or(abuse.country_name),
            None,
            None,
            abuse.isp,
            None,
        ),
    };

    LookupResult {
        ip_version: abuse.ip_version.unwrap_or_else(|| infer_ip_version(&ip_address)),
        is_public: abuse.is_public.unwrap_or_else(|| infer_is_public(&ip_address)),
        ip_address,
        location,
        country,
        country_code,
        city,
        region,
        isp,
        hostname,
        abuse_confidence_score: abuse.abuse_confidence_score,
        total_reports: abuse.total_reports,
        num_distinct_users: abuse.num_distinct_users,
        is_whitelisted: abuse.is_whitelisted.unwrap_or(false),
        usage_type: abuse.usage_type,
        domain: abuse.domain,
        hostnames,
        last_reported_at: abuse.last_reported_at,
        reports_by_country: country_breakdown(&reports),
        reports_this_week: chart_points(&weekly),
        reports,
        scamalytics: risk,
    }
}

fn with_category_names(mut report: AbuseReport) -> AbuseReport {
    if report.category_names.is_empty() {
        report.category_names = category_names(&report.categories);
    }
    report
}

/// 6 for IPv6 literals, 4 otherwise
fn infer_ip_version(ip: &str) -> u8 {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => 6,
        _ => 4,
    }
}

fn infer_is_public(ip: &str) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        Ok(IpAddr::V6(v6)) => !(v6.is_loopback() || v6.is_unspecified()),
        Err(_) => true,
    }
}
