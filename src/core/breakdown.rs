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

//! Reports grouped by reporter country, shaped for a pie chart

use std::collections::HashMap;

use super::models::{AbuseReport, CountrySlice};

pub const OTHER_LABEL: &str = "Other";
const UNKNOWN_COUNTRY: &str = "Unknown";

/// Slices under this share (percent) are folded into "Other"
const MIN_SHARE_PERCENT: usize = 4;
/// At most this many named slices survive before "Other"
const MAX_NAMED_SLICES: usize = 5;
const MAX_SLICES: usize = MAX_NAMED_SLICES + 1;

pub fn country_breakdown(reports: &[AbuseReport]) -> Vec<CountrySlice> {
    let total = reports.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for report in reports {
        let country = report
            .reporter_country_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY);
        *counts.entry(country).or_default() += 1;
    }

    let mut slices: Vec<CountrySlice> = counts
        .into_iter()
        .map(|(name, value)| CountrySlice {
            name: name.to_string(),
            value,
        })
        .collect();
    slices.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

    let (mut main, small): (Vec<_>, Vec<_>) = slices
        .into_iter()
        .partition(|s| s.value * 100 >= total * MIN_SHARE_PERCENT);

    let other_total: usize = small.iter().map(|s| s.value).sum();
    if other_total > 0 {
        main.push(other_slice(other_total));
    }

    if main.len() > MAX_SLICES {
        let rest: usize = main.split_off(MAX_NAMED_SLICES).iter().map(|s| s.value).sum();
        main.push(other_slice(rest));
    }

    main
}

fn other_slice(value: usize) -> CountrySlice {
    CountrySlice {
        name: OTHER_LABEL.to_string(),
        value,
    }
}
