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

//! Last-seven-days report histogram

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

use super::models::{AbuseReport, ChartPoint, WeeklyBucket};

pub const WINDOW_DAYS: i64 = 7;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn day_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// UTC calendar date of a report timestamp
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Seven buckets for [today-6, today], oldest first
pub fn bucket_reports(reports: &[AbuseReport], today: NaiveDate) -> Vec<WeeklyBucket> {
    let mut buckets: Vec<WeeklyBucket> = (0..WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            WeeklyBucket {
                day: day_name(date),
                date,
                count: 0,
            }
        })
        .collect();

    for report in reports {
        let Some(date) = parse_report_date(&report.reported_at) else {
            continue;
        };
        if let Some(bucket) = buckets.iter_mut().find(|b| b.date == date) {
            bucket.count += 1;
        }
    }

    buckets
}

pub fn chart_points(buckets: &[WeeklyBucket]) -> Vec<ChartPoint> {
    buckets
        .iter()
        .map(|b| ChartPoint {
            name: b.day.to_string(),
            reports: b.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_at(reported_at: &str) -> AbuseReport {
        AbuseReport {
            reported_at: reported_at.to_string(),
            ..AbuseReport::default()
        }
    }

    fn today() -> NaiveDate {
        // A Wednesday
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    #[test]
    fn test_empty_reports_give_seven_zero_buckets() {
        let buckets = bucket_reports(&[], today());
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.count == 0));
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        assert_eq!(buckets[6].date, today());
        assert!(buckets.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_day_names_follow_dates() {
        let buckets = bucket_reports(&[], today());
        let names: Vec<&str> = buckets.iter().map(|b| b.day).collect();
        assert_eq!(names, vec!["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]);
    }

    #[test]
    fn test_window_boundaries() {
        let reports = vec![
            report_at("2025-06-11T23:59:00Z"),
            report_at("2025-06-05T00:00:01Z"),
            report_at("2025-06-04T12:00:00Z"),
            report_at("2025-06-12T00:00:00Z"),
        ];
        let buckets = bucket_reports(&reports, today());
        assert_eq!(buckets[6].count, 1);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), 2);
    }

    #[test]
    fn test_same_day_reports_accumulate() {
        let reports = vec![
            report_at("2025-06-09T01:00:00+00:00"),
            report_at("2025-06-09 13:00:00"),
            report_at("2025-06-09"),
            report_at("2025-06-10T08:00:00Z"),
        ];
        let buckets = bucket_reports(&reports, today());
        let monday = buckets.iter().find(|b| b.day == "Mon").unwrap();
        let tuesday = buckets.iter().find(|b| b.day == "Tue").unwrap();
        assert_eq!(monday.count, 3);
        assert_eq!(tuesday.count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), reports.len() as u32);
    }

    #[test]
    fn test_offsets_are_normalized_to_utc() {
        // 2025-06-11 01:00 in +05:00 is still 2025-06-10 in UTC
        let buckets = bucket_reports(&[report_at("2025-06-11T01:00:00+05:00")], today());
        assert_eq!(buckets[5].count, 1);
        assert_eq!(buckets[6].count, 0);
    }

    #[test]
    fn test_unparsable_dates_are_ignored() {
        let reports = vec![report_at("yesterday-ish"), report_at(""), report_at("2025-13-45")];
        let buckets = bucket_reports(&reports, today());
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), 0);
    }

    #[test]
    fn test_chart_points_rename_fields() {
        let buckets = bucket_reports(&[report_at("2025-06-11")], today());
        let points = chart_points(&buckets);
        assert_eq!(points.len(), 7);
        assert_eq!(points[6], ChartPoint { name: "Wed".to_string(), reports: 1 });

        let json = serde_json::to_value(&points[6]).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Wed", "reports": 1 }));
    }
}
