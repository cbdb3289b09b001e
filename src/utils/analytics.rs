use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::models::qr_code::{QrRecord, QrType};
use crate::models::scan::ScanRecord;
use crate::models::user::User;
use crate::structs::analytics::{
    AdminStatsResponse, DailyPoint, DashboardResponse, DayOfWeekPoint, HourlyPoint,
    QrAnalyticsResponse, QrSummary, TypeBreakdown,
};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const DEFAULT_RANGE_DAYS: i64 = 30;
const ACTIVE_USER_DAYS: i64 = 7;
const TOP_PERFORMING: usize = 5;
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Inclusive range in milliseconds since epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

impl DateRange {
    /// Missing bounds default to the last 30 days ending now.
    pub fn resolve(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>, now: i64) -> Self {
        let to = to.map(|t| t.timestamp_millis()).unwrap_or(now);
        let from = from
            .map(|f| f.timestamp_millis())
            .unwrap_or(to - DEFAULT_RANGE_DAYS * DAY_MS);
        Self { from, to }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.from && timestamp <= self.to
    }
}

fn to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(timestamp).unwrap_or_default()
}

fn rounded_ratio(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64).round() as i64
}

/// Scans per calendar day, oldest day first.
pub fn daily_series(scans: &[ScanRecord]) -> Vec<DailyPoint> {
    let mut per_day: BTreeMap<String, usize> = BTreeMap::new();
    for scan in scans {
        let date = to_datetime(scan.timestamp).format("%Y-%m-%d").to_string();
        *per_day.entry(date).or_default() += 1;
    }

    per_day
        .into_iter()
        .map(|(date, scans)| DailyPoint { date, scans })
        .collect()
}

pub fn day_of_week_series(scans: &[ScanRecord]) -> Vec<DayOfWeekPoint> {
    let mut counts = [0usize; 7];
    for scan in scans {
        let weekday = to_datetime(scan.timestamp).weekday();
        counts[weekday.num_days_from_monday() as usize] += 1;
    }

    WEEKDAYS
        .into_iter()
        .zip(counts)
        .map(|(day, scans)| DayOfWeekPoint { day, scans })
        .collect()
}

pub fn hourly_series(scans: &[ScanRecord]) -> Vec<HourlyPoint> {
    let mut counts = [0usize; 24];
    for scan in scans {
        counts[to_datetime(scan.timestamp).hour() as usize] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(hour, scans)| HourlyPoint {
            hour: format!("{}:00", hour),
            scans: *scans,
        })
        .collect()
}

/// Per-type totals in order of first appearance.
pub fn type_breakdown(records: &[QrRecord]) -> Vec<TypeBreakdown> {
    let mut breakdown: Vec<TypeBreakdown> = Vec::new();
    for record in records {
        match breakdown.iter_mut().find(|b| b.qr_type == record.qr_type) {
            Some(entry) => {
                entry.count += 1;
                entry.scans += record.scans;
            }
            None => breakdown.push(TypeBreakdown {
                qr_type: record.qr_type,
                count: 1,
                scans: record.scans,
                avg_scans: 0,
            }),
        }
    }

    for entry in &mut breakdown {
        entry.avg_scans = rounded_ratio(entry.scans, entry.count as i64);
    }
    breakdown
}

/// Type with the most scans; ties go to the type seen last, "none" when empty.
pub fn most_scanned_type(breakdown: &[TypeBreakdown]) -> String {
    let mut best: Option<(QrType, i64)> = None;
    for entry in breakdown {
        match best {
            Some((_, scans)) if scans > entry.scans => {}
            _ => best = Some((entry.qr_type, entry.scans)),
        }
    }

    best.map(|(qr_type, _)| qr_type.to_string())
        .unwrap_or_else(|| "none".to_string())
}

pub fn top_performing(records: &[QrRecord]) -> Vec<QrSummary> {
    let mut sorted: Vec<&QrRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.scans.cmp(&a.scans));

    sorted
        .into_iter()
        .take(TOP_PERFORMING)
        .map(|record| QrSummary {
            id: record.id.clone(),
            title: record.title.clone(),
            qr_type: record.qr_type,
            scans: record.scans,
        })
        .collect()
}

/// Totals come from the records' counters; the charts from scans inside `range`.
pub fn dashboard(records: &[QrRecord], scans: &[ScanRecord], range: DateRange) -> DashboardResponse {
    let total_qrs = records.len();
    let total_scans: i64 = records.iter().map(|record| record.scans).sum();
    let in_range: Vec<ScanRecord> = scans
        .iter()
        .filter(|scan| range.contains(scan.timestamp))
        .cloned()
        .collect();
    let breakdown = type_breakdown(records);

    DashboardResponse {
        from: range.from,
        to: range.to,
        total_qrs,
        total_scans,
        avg_scans_per_qr: rounded_ratio(total_scans, total_qrs as i64),
        active_qrs: records.iter().filter(|record| record.scans > 0).count(),
        most_scanned_type: most_scanned_type(&breakdown),
        recent_activity: in_range.len(),
        type_breakdown: breakdown,
        daily_activity: daily_series(&in_range),
        day_of_week: day_of_week_series(&in_range),
        hourly: hourly_series(&in_range),
        top_performing: top_performing(records),
    }
}

pub fn qr_detail(record: &QrRecord, scans: &[ScanRecord], now: i64) -> QrAnalyticsResponse {
    let avg_daily = if scans.is_empty() {
        0
    } else {
        let age_ms = (now - record.created_at).max(0);
        let days = (age_ms + DAY_MS - 1) / DAY_MS;
        rounded_ratio(record.scans, days.max(1))
    };

    QrAnalyticsResponse {
        id: record.id.clone(),
        title: record.title.clone(),
        qr_type: record.qr_type,
        total_scans: record.scans,
        recorded_scans: scans.len(),
        created_at: record.created_at,
        avg_daily,
        scans_over_time: daily_series(scans),
    }
}

pub fn admin_stats(users: &[User], records: &[QrRecord], now: i64) -> AdminStatsResponse {
    let total_users = users.len();

    AdminStatsResponse {
        total_users,
        total_qr_codes: records.len(),
        total_scans: records.iter().map(|record| record.scans).sum(),
        active_users: users
            .iter()
            .filter(|user| user.is_active_since(now, ACTIVE_USER_DAYS))
            .count(),
        admin_users: users.iter().filter(|user| user.is_admin).count(),
        avg_qrs_per_user: rounded_ratio(records.len() as i64, total_users as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn record(id: &str, qr_type: QrType, scans: i64) -> QrRecord {
        let mut record = QrRecord::new(
            id.to_string(),
            qr_type,
            "content".to_string(),
            String::new(),
            "u1".to_string(),
        );
        record.id = id.to_string();
        record.scans = scans;
        record
    }

    fn scan(qr_id: &str, timestamp: i64) -> ScanRecord {
        ScanRecord {
            id: format!("{}-{}", qr_id, timestamp),
            qr_id: qr_id.to_string(),
            timestamp,
        }
    }

    #[test]
    fn dashboard_on_fixed_data() {
        let records = vec![
            record("a", QrType::Url, 4),
            record("b", QrType::Url, 0),
            record("c", QrType::Wifi, 3),
        ];
        // 2024-06-03 is a Monday
        let scans = vec![
            scan("a", ms(2024, 6, 3, 9)),
            scan("a", ms(2024, 6, 3, 17)),
            scan("a", ms(2024, 6, 4, 9)),
            scan("c", ms(2024, 6, 9, 23)),
            scan("c", ms(2024, 1, 1, 0)), // outside the range
        ];
        let range = DateRange {
            from: ms(2024, 6, 1, 0),
            to: ms(2024, 6, 30, 0),
        };

        let stats = dashboard(&records, &scans, range);

        assert_eq!(stats.total_qrs, 3);
        assert_eq!(stats.total_scans, 7);
        assert_eq!(stats.avg_scans_per_qr, 2);
        assert_eq!(stats.active_qrs, 2);
        assert_eq!(stats.most_scanned_type, "url");
        assert_eq!(stats.recent_activity, 4);
        assert_eq!(
            stats.daily_activity,
            vec![
                DailyPoint { date: "2024-06-03".into(), scans: 2 },
                DailyPoint { date: "2024-06-04".into(), scans: 1 },
                DailyPoint { date: "2024-06-09".into(), scans: 1 },
            ]
        );
        assert_eq!(stats.day_of_week[0], DayOfWeekPoint { day: "Mon", scans: 2 });
        assert_eq!(stats.day_of_week[1], DayOfWeekPoint { day: "Tue", scans: 1 });
        assert_eq!(stats.day_of_week[6], DayOfWeekPoint { day: "Sun", scans: 1 });
        assert_eq!(stats.hourly.len(), 24);
        assert_eq!(stats.hourly[9], HourlyPoint { hour: "9:00".into(), scans: 2 });
        assert_eq!(stats.hourly[23].scans, 1);
        assert_eq!(stats.type_breakdown[0].count, 2);
        assert_eq!(stats.type_breakdown[0].avg_scans, 2);
        assert_eq!(stats.top_performing[0].id, "a");
    }

    #[test]
    fn empty_dashboard() {
        let range = DateRange { from: 0, to: 1 };
        let stats = dashboard(&[], &[], range);
        assert_eq!(stats.total_qrs, 0);
        assert_eq!(stats.avg_scans_per_qr, 0);
        assert_eq!(stats.most_scanned_type, "none");
        assert!(stats.top_performing.is_empty());
    }

    #[test]
    fn most_scanned_type_ties_go_to_later_type() {
        let records = vec![record("a", QrType::Text, 2), record("b", QrType::Sms, 2)];
        assert_eq!(most_scanned_type(&type_breakdown(&records)), "sms");
    }

    #[test]
    fn top_performing_caps_at_five() {
        let records: Vec<QrRecord> = (0..8)
            .map(|i| record(&i.to_string(), QrType::Text, i))
            .collect();
        let top = top_performing(&records);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].scans, 7);
        assert_eq!(top[4].scans, 3);
    }

    #[test]
    fn range_defaults_to_last_thirty_days() {
        let now = ms(2024, 6, 30, 0);
        let range = DateRange::resolve(None, None, now);
        assert_eq!(range.to, now);
        assert_eq!(range.from, ms(2024, 5, 31, 0));
        assert!(range.contains(now));
        assert!(!range.contains(now + 1));
    }

    #[test]
    fn qr_detail_average_per_day() {
        let mut code = record("a", QrType::Url, 10);
        code.created_at = ms(2024, 6, 1, 0);
        let scans = vec![scan("a", ms(2024, 6, 2, 0))];

        // 4.5 days old rounds up to 5 days
        let detail = qr_detail(&code, &scans, ms(2024, 6, 5, 12));
        assert_eq!(detail.avg_daily, 2);
        assert_eq!(detail.recorded_scans, 1);

        let no_history = qr_detail(&code, &[], ms(2024, 6, 5, 12));
        assert_eq!(no_history.avg_daily, 0);
    }

    #[test]
    fn admin_stats_counts_recent_logins_and_admins() {
        let now = ms(2024, 6, 30, 0);
        let mut recent = User::new("a".into(), None, None, None, "h".into(), true);
        recent.last_login_at = Some(now - DAY_MS);
        let mut stale = User::new("b".into(), None, None, None, "h".into(), false);
        stale.last_login_at = Some(now - 30 * DAY_MS);
        let never = User::new("c".into(), None, None, None, "h".into(), false);

        let records = vec![record("x", QrType::Url, 3), record("y", QrType::Text, 1)];
        let stats = admin_stats(&[recent, stale, never], &records, now);

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.admin_users, 1);
        assert_eq!(stats.total_scans, 4);
        assert_eq!(stats.avg_qrs_per_user, 1);
    }
}
