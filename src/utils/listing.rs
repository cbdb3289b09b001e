use crate::models::qr_code::{QrRecord, QrType};
use crate::structs::qr_request::{Page, QrListParams};

pub const QR_PAGE_SIZE: usize = 9;
pub const SCAN_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Oldest,
    MostScanned,
    LeastScanned,
    Alphabetical,
}

impl SortOrder {
    /// Unknown values fall back to newest first.
    pub fn parse(value: Option<&str>) -> SortOrder {
        match value {
            Some("oldest") => SortOrder::Oldest,
            Some("most-scanned") => SortOrder::MostScanned,
            Some("least-scanned") => SortOrder::LeastScanned,
            Some("alphabetical") => SortOrder::Alphabetical,
            _ => SortOrder::Newest,
        }
    }
}

/// Case-insensitive match on title or content.
fn matches_search(record: &QrRecord, needle: &str) -> bool {
    record.title.to_lowercase().contains(needle) || record.content.to_lowercase().contains(needle)
}

/// Apply the history view's search, type filter and sort order.
pub fn filter_and_sort(records: Vec<QrRecord>, params: &QrListParams) -> Vec<QrRecord> {
    let needle = params
        .search
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let type_filter = params
        .qr_type
        .as_deref()
        .filter(|value| *value != "all")
        .and_then(QrType::parse);

    let mut filtered: Vec<QrRecord> = records
        .into_iter()
        .filter(|record| needle.is_empty() || matches_search(record, &needle))
        .filter(|record| type_filter.is_none_or(|qr_type| record.qr_type == qr_type))
        .collect();

    match SortOrder::parse(params.sort.as_deref()) {
        SortOrder::Newest => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => filtered.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::MostScanned => filtered.sort_by(|a, b| b.scans.cmp(&a.scans)),
        SortOrder::LeastScanned => filtered.sort_by(|a, b| a.scans.cmp(&b.scans)),
        SortOrder::Alphabetical => {
            filtered.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
    }

    filtered
}

/// Admin table search: title, content or type.
pub fn admin_search(records: Vec<QrRecord>, search: Option<&str>) -> Vec<QrRecord> {
    let needle = search.map(str::to_lowercase).unwrap_or_default();
    if needle.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| {
            matches_search(record, &needle) || record.qr_type.to_string().contains(&needle)
        })
        .collect()
}

/// Slice out a 1-based page. Pages past the end come back empty.
pub fn paginate<T>(
    items: Vec<T>,
    page: Option<usize>,
    per_page: Option<usize>,
    default_per_page: usize,
) -> Page<T> {
    let per_page = per_page
        .unwrap_or(default_per_page)
        .clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page {
        items,
        total,
        page,
        per_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, qr_type: QrType, content: &str, scans: i64, created_at: i64) -> QrRecord {
        let mut record = QrRecord::new(
            title.to_string(),
            qr_type,
            content.to_string(),
            String::new(),
            "u1".to_string(),
        );
        record.id = title.to_string();
        record.scans = scans;
        record.created_at = created_at;
        record
    }

    fn sample() -> Vec<QrRecord> {
        vec![
            record("Menu", QrType::Url, "https://menu.example.com", 10, 1),
            record("wifi lobby", QrType::Wifi, "WIFI:T:WPA;S:Lobby;P:x;;", 3, 3),
            record("Contact", QrType::Email, "mailto:hi@example.com", 7, 2),
        ]
    }

    fn titles(records: &[QrRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn default_sort_is_newest_first() {
        let sorted = filter_and_sort(sample(), &QrListParams::default());
        assert_eq!(titles(&sorted), vec!["wifi lobby", "Contact", "Menu"]);
    }

    #[test]
    fn sort_orders() {
        let params = |sort: &str| QrListParams {
            sort: Some(sort.to_string()),
            ..Default::default()
        };

        let sorted = filter_and_sort(sample(), &params("oldest"));
        assert_eq!(titles(&sorted), vec!["Menu", "Contact", "wifi lobby"]);

        let sorted = filter_and_sort(sample(), &params("most-scanned"));
        assert_eq!(titles(&sorted), vec!["Menu", "Contact", "wifi lobby"]);

        let sorted = filter_and_sort(sample(), &params("least-scanned"));
        assert_eq!(titles(&sorted), vec!["wifi lobby", "Contact", "Menu"]);

        let sorted = filter_and_sort(sample(), &params("alphabetical"));
        assert_eq!(titles(&sorted), vec!["Contact", "Menu", "wifi lobby"]);
    }

    #[test]
    fn search_matches_title_or_content_case_insensitively() {
        let params = QrListParams {
            search: Some("EXAMPLE".to_string()),
            ..Default::default()
        };
        let found = filter_and_sort(sample(), &params);
        assert_eq!(titles(&found), vec!["Contact", "Menu"]);
    }

    #[test]
    fn type_filter_all_keeps_everything() {
        let mut params = QrListParams {
            qr_type: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(sample(), &params).len(), 3);

        params.qr_type = Some("wifi".to_string());
        assert_eq!(titles(&filter_and_sort(sample(), &params)), vec!["wifi lobby"]);
    }

    #[test]
    fn admin_search_includes_type() {
        let found = admin_search(sample(), Some("email"));
        assert_eq!(titles(&found), vec!["Contact"]);
        assert_eq!(admin_search(sample(), None).len(), 3);
    }

    #[test]
    fn pagination_bounds() {
        let items: Vec<u32> = (1..=20).collect();

        let first = paginate(items.clone(), None, None, QR_PAGE_SIZE);
        assert_eq!(first.items, (1..=9).collect::<Vec<_>>());
        assert_eq!(first.total, 20);
        assert_eq!(first.total_pages, 3);

        let last = paginate(items.clone(), Some(3), None, QR_PAGE_SIZE);
        assert_eq!(last.items, vec![19, 20]);

        let beyond = paginate(items.clone(), Some(9), None, QR_PAGE_SIZE);
        assert!(beyond.items.is_empty());

        let zero = paginate(items, Some(0), Some(0), QR_PAGE_SIZE);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.per_page, 1);
    }

    #[test]
    fn huge_page_numbers_come_back_empty() {
        let page = paginate((1..=3).collect::<Vec<u32>>(), Some(usize::MAX), Some(100), QR_PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.total, 3);
    }
}
