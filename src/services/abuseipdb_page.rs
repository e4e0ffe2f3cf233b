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

//! Scraper for the public AbuseIPDB check page (`/check/{ip}`)
//!
//! The markup belongs to AbuseIPDB and changes without notice. Missing pieces
//! degrade to "N/A", 0 or an empty list; only a page with neither the facts
//! table nor the score panel is treated as a failure.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use super::AbuseSource;
use super::utils::html::{css, element_text, first_number, first_text, labeled_cell, labeled_value};
use super::utils::{build_client, fetch_text};
use crate::config::{SCRAPER_USER_AGENT, Settings};
use crate::core::categories::category_code;
use crate::core::error::{LookupError, SourceResult, Upstream};
use crate::core::models::{AbuseReport, AbuseSummary};
use crate::log_debug;

const NOT_AVAILABLE: &str = "N/A";

static SCORE_SELECTOR: Lazy<Selector> = Lazy::new(|| css(".well h1"));
static REPORT_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| css("table#check-report tbody tr"));
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| css("td"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| css("a"));
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| css("img"));
static PERCENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)%").unwrap_or_else(|e| panic!("invalid score pattern: {}", e)));

pub struct AbuseIpdbPage {
    client: Client,
    base_url: String,
}

impl AbuseIpdbPage {
    pub fn new(settings: &Settings) -> SourceResult<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs, SCRAPER_USER_AGENT)?,
            base_url: settings.abuseipdb_web_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AbuseSource for AbuseIpdbPage {
    fn upstream(&self) -> Upstream {
        Upstream::AbuseIpdbPage
    }

    async fn check(&self, ip: &str) -> SourceResult<AbuseSummary> {
        let url = format!("{}/check/{}", self.base_url, urlencoding::encode(ip));
        log_debug!("Scraping AbuseIPDB page: {}", url);

        let html = fetch_text(Upstream::AbuseIpdbPage, self.client.get(&url)).await?;
        parse_check_page(&html, Utc::now())
    }
}

/// Extract an [`AbuseSummary`] from a check page. `now` stands in for
/// `lastReportedAt` when there are no reports.
pub fn parse_check_page(html: &str, now: DateTime<Utc>) -> SourceResult<AbuseSummary> {
    let document = Html::parse_document(html);

    let has_facts = labeled_cell(&document, "IP Address").is_some();
    let score_text = first_text(document.root_element(), &SCORE_SELECTOR);
    if !has_facts && score_text.is_none() {
        return Err(LookupError::parse(
            Upstream::AbuseIpdbPage,
            "page has neither the facts table nor the score panel",
        ));
    }

    let card = |label: &str| labeled_value(&document, label).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let abuse_confidence_score = score_text
        .as_deref()
        .and_then(|text| first_number(text, &PERCENT_PATTERN))
        .map(|score| score.min(100) as u8)
        .unwrap_or(0);

    let reports: Vec<AbuseReport> = document.select(&REPORT_ROW_SELECTOR).map(parse_report_row).collect();
    let distinct_reporters: HashSet<u64> = reports.iter().map(|r| r.reporter_id).collect();

    let last_reported_at = reports
        .first()
        .map(|r| r.reported_at.clone())
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

    Ok(AbuseSummary {
        ip_address: card("IP Address"),
        is_public: Some(true),
        ip_version: None,
        is_whitelisted: None,
        abuse_confidence_score,
        country_code: None,
        country_name: Some(card("Country")),
        usage_type: Some(card("Usage Type")),
        isp: Some(card("ISP")),
        domain: Some(card("Domain Name")),
        hostnames: None,
        total_reports: reports.len() as u64,
        num_distinct_users: distinct_reporters.len() as u64,
        last_reported_at: Some(last_reported_at),
        reports,
    })
}

/// Columns: time, reporter (link + flag), comment, categories
fn parse_report_row(row: ElementRef<'_>) -> AbuseReport {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SELECTOR).collect();
    let cell_text = |index: usize| cells.get(index).map(|c| element_text(*c)).unwrap_or_default();

    let reporter = cells.get(1).copied();
    let reporter_id = reporter
        .and_then(|cell| first_text(cell, &LINK_SELECTOR))
        .and_then(|text| text.parse::<u64>().ok())
        .unwrap_or(0);
    let flag = reporter.and_then(|cell| cell.select(&IMG_SELECTOR).next());
    let reporter_country_code = flag
        .and_then(|img| img.value().attr("src"))
        .and_then(country_code_from_flag);
    let reporter_country_name = flag
        .and_then(|img| img.value().attr("title"))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty());

    let category_names: Vec<String> = cell_text(3)
        .split(',')
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect();
    let categories = category_names.iter().filter_map(|label| category_code(label)).collect();

    AbuseReport {
        reported_at: cell_text(0),
        comment: cell_text(2),
        categories,
        category_names,
        reporter_id,
        reporter_country_code,
        reporter_country_name,
    }
}

/// `/img/flags/de.png` -> `DE`
fn country_code_from_flag(src: &str) -> Option<String> {
    let file = src.rsplit('/').next()?;
    let stem = file.split('.').next()?.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_uppercase())
    }
}
