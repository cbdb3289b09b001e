use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::qr_code::QrType;

#[derive(Deserialize, Debug, Default)]
pub struct DateRangeParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TypeBreakdown {
    pub qr_type: QrType,
    pub count: usize,
    pub scans: i64,
    pub avg_scans: i64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct DailyPoint {
    pub date: String, // YYYY-MM-DD, UTC
    pub scans: usize,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct DayOfWeekPoint {
    pub day: &'static str,
    pub scans: usize,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct HourlyPoint {
    pub hour: String,
    pub scans: usize,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct QrSummary {
    pub id: String,
    pub title: String,
    pub qr_type: QrType,
    pub scans: i64,
}

#[derive(Serialize, Debug)]
pub struct DashboardResponse {
    pub from: i64,
    pub to: i64,
    pub total_qrs: usize,
    pub total_scans: i64,
    pub avg_scans_per_qr: i64,
    pub active_qrs: usize,
    pub most_scanned_type: String,
    pub recent_activity: usize,
    pub type_breakdown: Vec<TypeBreakdown>,
    pub daily_activity: Vec<DailyPoint>,
    pub day_of_week: Vec<DayOfWeekPoint>,
    pub hourly: Vec<HourlyPoint>,
    pub top_performing: Vec<QrSummary>,
}

#[derive(Serialize, Debug)]
pub struct QrAnalyticsResponse {
    pub id: String,
    pub title: String,
    pub qr_type: QrType,
    pub total_scans: i64,
    pub recorded_scans: usize,
    pub created_at: i64,
    pub avg_daily: i64,
    pub scans_over_time: Vec<DailyPoint>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AdminStatsResponse {
    pub total_users: usize,
    pub total_qr_codes: usize,
    pub total_scans: i64,
    pub active_users: usize,
    pub admin_users: usize,
    pub avg_qrs_per_user: i64,
}
