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

//! Scamalytics fraud score scraper (`/ip/{ip}`)

use std::collections::BTreeMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use super::RiskSource;
use super::utils::html::{css, first_number, first_text, labeled_cell, labeled_value};
use super::utils::{build_client, fetch_text};
use crate::config::{SCRAPER_USER_AGENT, Settings};
use crate::core::error::{SourceResult, Upstream};
use crate::core::models::RiskAssessment;
use crate::log_debug;

/// External blacklists listed on the page
pub const BLACKLISTS: [&str; 5] = ["Firehol", "IP2ProxyLite", "IPsum", "Spamhaus", "X4Bnet Spambot"];

/// Proxy / VPN detectors listed on the page
pub const PROXY_DETECTORS: [&str; 6] = [
    "Anonymizing VPN",
    "Tor Exit Node",
    "Server",
    "Public Proxy",
    "Web Proxy",
    "Search Engine Robot",
];

static SCORE_SELECTOR: Lazy<Selector> = Lazy::new(|| css(".score_bar .score"));
static PANEL_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| css(".panel_title"));
static RISK_SELECTOR: Lazy<Selector> = Lazy::new(|| css(".risk"));
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)").unwrap_or_else(|e| panic!("invalid number pattern: {}", e)));

pub struct ScamalyticsPage {
    client: Client,
    base_url: String,
}

impl ScamalyticsPage {
    pub fn new(settings: &Settings) -> SourceResult<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs, SCRAPER_USER_AGENT)?,
            base_url: settings.scamalytics_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RiskSource for ScamalyticsPage {
    async fn assess(&self, ip: &str) -> SourceResult<RiskAssessment> {
        let url = format!("{}/ip/{}", self.base_url, urlencoding::encode(ip));
        log_debug!("Scraping Scamalytics page: {}", url);

        let html = fetch_text(Upstream::Scamalytics, self.client.get(&url)).await?;
        Ok(parse_risk_page(&html))
    }
}

/// Every field is optional on the page; whatever is missing stays at its default.
pub fn parse_risk_page(html: &str) -> RiskAssessment {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let score_text = first_text(root, &SCORE_SELECTOR);
    let risk_level = first_text(root, &PANEL_TITLE_SELECTOR);
    // Captcha and rate-limit interstitials come back as 200 without the score panel
    if score_text.is_none() && risk_level.is_none() {
        log_debug!("Scamalytics page has no score panel, returning empty assessment");
    }

    let hit_map = |names: &[&str]| -> BTreeMap<String, String> {
        names
            .iter()
            .filter_map(|name| {
                labeled_cell(&document, name)
                    .and_then(|cell| first_text(cell, &RISK_SELECTOR))
                    .filter(|value| !value.is_empty())
                    .map(|value| (name.to_string(), value))
            })
            .collect()
    };

    RiskAssessment {
        score: score_text.as_deref().and_then(|text| first_number(text, &NUMBER_PATTERN)),
        risk_level: risk_level.unwrap_or_default(),
        isp: labeled_value(&document, "ISP Name").unwrap_or_default(),
        country: labeled_value(&document, "Country Name").unwrap_or_default(),
        city: labeled_value(&document, "City").unwrap_or_default(),
        blacklist: hit_map(&BLACKLISTS[..]),
        proxies: hit_map(&PROXY_DETECTORS[..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="panel_title high_risk">High Risk</div>
          <div class="score_bar"><div class="score">Fraud Score: 76</div></div>
          <table>
            <tr><th>ISP Name</th><td>Example Hosting B.V.</td></tr>
            <tr><th>Country Name</th><td>Netherlands</td></tr>
            <tr><th>City</th><td>Amsterdam</td></tr>
            <tr><th>Firehol</th><td><div class="risk yes">Yes</div></td></tr>
            <tr><th>Spamhaus</th><td><div class="risk no">No</div></td></tr>
            <tr><th>IPsum</th><td></td></tr>
            <tr><th>Anonymizing VPN</th><td><div class="risk no">No</div></td></tr>
            <tr><th>Tor Exit Node</th><td><div class="risk no">No</div></td></tr>
            <tr><th>Server</th><td><div class="risk yes">Yes</div></td></tr>
          </table>
        </body></html>"#;

    #[test]
    fn test_parses_score_and_fields() {
        let risk = parse_risk_page(PAGE);
        assert_eq!(risk.score, Some(76));
        assert_eq!(risk.risk_level, "High Risk");
        assert_eq!(risk.isp, "Example Hosting B.V.");
        assert_eq!(risk.country, "Netherlands");
        assert_eq!(risk.city, "Amsterdam");
    }

    #[test]
    fn test_hit_maps_skip_missing_and_empty() {
        let risk = parse_risk_page(PAGE);
        assert_eq!(risk.blacklist.len(), 2);
        assert_eq!(risk.blacklist.get("Firehol").map(String::as_str), Some("Yes"));
        assert_eq!(risk.blacklist.get("Spamhaus").map(String::as_str), Some("No"));
        assert!(!risk.blacklist.contains_key("IPsum"));
        assert!(!risk.blacklist.contains_key("X4Bnet Spambot"));

        assert_eq!(risk.proxies.len(), 3);
        assert_eq!(risk.proxies.get("Server").map(String::as_str), Some("Yes"));
        assert!(!risk.proxies.contains_key("Web Proxy"));
    }

    #[test]
    fn test_page_without_score_panel_degrades_to_defaults() {
        let risk = parse_risk_page(
            "<html><body><h1>Access denied</h1><table><tr><th>City</th><td>Delft</td></tr></table></body></html>",
        );
        assert_eq!(risk.score, None);
        assert_eq!(risk.risk_level, "");
        assert_eq!(risk.city, "Delft");
        assert!(risk.blacklist.is_empty());
        assert!(risk.proxies.is_empty());
    }
}
