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

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use threat_lookup::config::{AbuseStrategy, Cli, Settings};
use threat_lookup::core::{LookupService, logger};
use threat_lookup::{log_init_failed, log_init_ok_with_details, log_init_start, web};

const SERVICE_NAME: &str = "threat lookup proxy";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    logger::init_from_args(args.debug, args.trace, args.journald)?;
    log_init_start!(SERVICE_NAME);

    let settings = Settings::from_cli(&args);
    let service = match LookupService::from_settings(&settings) {
        Ok(service) => service,
        Err(e) => {
            log_init_failed!(SERVICE_NAME, &e.to_string());
            return Err(e.into());
        }
    };

    let addr = format!("{}:{}", args.host, args.port);
    let source = match settings.strategy {
        AbuseStrategy::Api => "AbuseIPDB API + ipinfo.io",
        AbuseStrategy::Scrape => "AbuseIPDB page",
    };
    let details = format!(
        "{} via {}, scamalytics {}",
        addr,
        source,
        if settings.scamalytics_enabled { "on" } else { "off" }
    );
    log_init_ok_with_details!(SERVICE_NAME, &details);

    web::run_web_server(Arc::new(service), &addr).await
}
