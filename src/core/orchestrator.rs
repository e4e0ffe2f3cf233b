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

//! Runs the configured adapters for one IP and assembles the response

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::{LookupError, SourceResult};
use super::models::{GeoInfo, LookupResult, RiskAssessment};
use super::normalizer::normalize;
use crate::config::{AbuseStrategy, Settings};
use crate::services::{
    AbuseIpdbApi, AbuseIpdbPage, AbuseSource, GeoSource, IpinfoClient, RiskSource, ScamalyticsPage,
};
use crate::{log_debug, log_error, log_warn};

/// Request-scoped lookup over a fixed set of adapters.
///
/// The geolocation adapter is only wired for the API strategy; the scrape
/// strategy takes everything from the AbuseIPDB page.
pub struct LookupService {
    geo: Option<Arc<dyn GeoSource>>,
    abuse: Arc<dyn AbuseSource>,
    risk: Option<Arc<dyn RiskSource>>,
}

impl LookupService {
    pub fn new(abuse: Arc<dyn AbuseSource>) -> Self {
        Self {
            geo: None,
            abuse,
            risk: None,
        }
    }

    pub fn with_geo(mut self, geo: Arc<dyn GeoSource>) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_risk(mut self, risk: Arc<dyn RiskSource>) -> Self {
        self.risk = Some(risk);
        self
    }

    /// Wire the production adapters for `settings.strategy`
    pub fn from_settings(settings: &Settings) -> SourceResult<Self> {
        settings.validate()?;

        let service = match settings.strategy {
            AbuseStrategy::Api => Self::new(Arc::new(AbuseIpdbApi::new(settings)?))
                .with_geo(Arc::new(IpinfoClient::new(settings)?)),
            AbuseStrategy::Scrape => Self::new(Arc::new(AbuseIpdbPage::new(settings)?)),
        };

        Ok(if settings.scamalytics_enabled {
            service.with_risk(Arc::new(ScamalyticsPage::new(settings)?))
        } else {
            service
        })
    }

    pub async fn lookup(&self, ip: &str) -> SourceResult<LookupResult> {
        self.lookup_at(ip, Utc::now()).await
    }

    /// Same as [`lookup`](Self::lookup) with an explicit "now" for the weekly window
    pub async fn lookup_at(&self, ip: &str, now: DateTime<Utc>) -> SourceResult<LookupResult> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(LookupError::MissingIp);
        }
        log_debug!("Looking up {} via {}", ip, self.abuse.upstream());

        // The adapters only share the IP, so they run side by side
        let (geo, abuse, risk) = tokio::join!(self.geolocate(ip), self.abuse.check(ip), self.assess(ip));

        let geo = geo.inspect_err(log_primary_failure)?;
        let abuse = abuse.inspect_err(log_primary_failure)?;

        Ok(normalize(ip, geo, abuse, risk, now.date_naive()))
    }

    async fn geolocate(&self, ip: &str) -> SourceResult<Option<GeoInfo>> {
        match &self.geo {
            Some(geo) => geo.geolocate(ip).await.map(Some),
            None => Ok(None),
        }
    }

    /// Never fails: any error collapses to `None`
    async fn assess(&self, ip: &str) -> Option<RiskAssessment> {
        let risk = self.risk.as_ref()?;
        match risk.assess(ip).await {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                log_warn!("Risk assessment skipped for {}: {}", ip, e);
                None
            }
        }
    }
}

fn log_primary_failure(error: &LookupError) {
    log_error!("Lookup failed: {}", error.diagnostic());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Upstream;
    use crate::core::models::AbuseSummary;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubAbuse {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl AbuseSource for StubAbuse {
        fn upstream(&self) -> Upstream {
            Upstream::AbuseIpdbApi
        }

        async fn check(&self, ip: &str) -> SourceResult<AbuseSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(LookupError::Upstream {
                    upstream: Upstream::AbuseIpdbApi,
                    status,
                    body: String::new(),
                }),
                None => Ok(AbuseSummary {
                    ip_address: ip.to_string(),
                    abuse_confidence_score: 5,
                    ..AbuseSummary::default()
                }),
            }
        }
    }

    struct FailingRisk;

    #[async_trait]
    impl RiskSource for FailingRisk {
        async fn assess(&self, _ip: &str) -> SourceResult<RiskAssessment> {
            Err(LookupError::parse(Upstream::Scamalytics, "boom"))
        }
    }

    struct FailingGeo;

    #[async_trait]
    impl GeoSource for FailingGeo {
        async fn geolocate(&self, _ip: &str) -> SourceResult<GeoInfo> {
            Err(LookupError::Upstream {
                upstream: Upstream::Ipinfo,
                status: 403,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_blank_ip_makes_no_calls() {
        let abuse = Arc::new(StubAbuse::default());
        let service = LookupService::new(abuse.clone());

        let err = service.lookup("   ").await.unwrap_err();
        assert!(matches!(err, LookupError::MissingIp));
        assert_eq!(abuse.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_risk_failure_is_absorbed() {
        let service = LookupService::new(Arc::new(StubAbuse::default())).with_risk(Arc::new(FailingRisk));

        let result = service.lookup("192.0.2.10").await.unwrap();
        assert_eq!(result.abuse_confidence_score, 5);
        assert_eq!(result.scamalytics, None);
    }

    #[tokio::test]
    async fn test_geo_failure_fails_the_lookup() {
        let service = LookupService::new(Arc::new(StubAbuse::default())).with_geo(Arc::new(FailingGeo));

        let err = service.lookup("192.0.2.10").await.unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[tokio::test]
    async fn test_abuse_failure_status_is_kept() {
        let abuse = Arc::new(StubAbuse {
            fail_with: Some(429),
            ..StubAbuse::default()
        });
        let service = LookupService::new(abuse);

        let err = service.lookup("192.0.2.10").await.unwrap_err();
        assert_eq!(err.status(), 429);
    }

    #[test]
    fn test_from_settings_fails_fast_without_key() {
        assert!(LookupService::from_settings(&Settings::default()).is_err());
    }

    #[test]
    fn test_from_settings_scrape_strategy() {
        let settings = Settings {
            strategy: AbuseStrategy::Scrape,
            scamalytics_enabled: false,
            ..Settings::default()
        };
        let service = LookupService::from_settings(&settings).unwrap();
        assert!(service.geo.is_none());
        assert!(service.risk.is_none());
        assert_eq!(service.abuse.upstream(), Upstream::AbuseIpdbPage);
    }
}
