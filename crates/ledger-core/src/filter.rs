//! # List Filtering and Pagination
//!
//! `list` scans every order of a tenant and scope, filters here, aggregates
//! totals over the whole filtered set, and only then cuts a page.
//!
//! ```text
//! all orders ──► ListFilter::matches ──► sort ──┬──► LedgerTotals (full set)
//!                                               │
//!                                               └──► PageRequest ──► page
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::search::normalize;
use crate::totals::{order_totals, ItemSummary, LedgerTotals};
use crate::types::{Order, Stage};
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Filter
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderSort {
    /// `sortIndex` descending, newer first on ties.
    #[default]
    Manual,
    /// Creation time descending.
    Newest,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFilter {
    /// One term, normalized and matched as a substring.
    pub search: Option<String>,
    /// Any-of; empty means every stage.
    pub stages: Vec<Stage>,
    pub returned_only: bool,
    pub unreturned_only: bool,
    /// Inclusive, on the UTC creation date.
    #[ts(as = "Option<String>")]
    pub date_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<NaiveDate>,
    pub pickup_only: bool,
    pub sort: OrderSort,
}

impl ListFilter {
    /// Date bounds, swapped when given in reverse.
    pub fn date_bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) if from > to => (Some(to), Some(from)),
            bounds => bounds,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        if !self.stages.is_empty() && !self.stages.contains(&order.stage) {
            return false;
        }

        // returned_only wins when both are set
        if self.returned_only {
            if !order.povrat_vracen {
                return false;
            }
        } else if self.unreturned_only && order.povrat_vracen {
            return false;
        }

        if self.pickup_only && !order.pickup {
            return false;
        }

        let created = order.created_at.date_naive();
        let (from, to) = self.date_bounds();
        if from.is_some_and(|from| created < from) || to.is_some_and(|to| created > to) {
            return false;
        }

        match self.search.as_deref().map(normalize) {
            Some(needle) if !needle.is_empty() => matches_search(order, &needle),
            _ => true,
        }
    }
}

/// Matches an already-normalized term against the order's text fields and
/// every item's title and variant label.
pub fn matches_search(order: &Order, needle: &str) -> bool {
    let hit = |text: &str| normalize(text).contains(needle);

    let top_level = [
        Some(order.title.as_str()),
        order.variant_label.as_deref(),
        Some(order.customer_name.as_str()),
        Some(order.customer_address.as_str()),
        Some(order.customer_phone.as_str()),
    ];
    if top_level.into_iter().flatten().any(hit) {
        return true;
    }

    order.items.iter().any(|item| {
        hit(&item.title) || item.variant_label.as_deref().is_some_and(hit)
    })
}

/// Sorts in place. Ties fall back to creation time, then id.
pub fn sort_orders(orders: &mut [Order], sort: OrderSort) {
    match sort {
        OrderSort::Manual => orders.sort_by(|a, b| {
            b.sort_index
                .cmp(&a.sort_index)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        }),
        OrderSort::Newest => orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

// =============================================================================
// Pagination
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Page is at least 1; page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, page_size: Option<i64>, default_size: u32) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size
            .unwrap_or(default_size as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u32;
        PageRequest { page, page_size }
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

/// Cuts one page out of an already filtered and sorted sequence.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> (Vec<T>, Pagination) {
    let total_items = items.len();
    let size = request.page_size as usize;
    let total_pages = total_items.div_ceil(size);

    let page: Vec<T> = items
        .into_iter()
        .skip(request.offset())
        .take(size)
        .collect();

    let pagination = Pagination {
        page: request.page,
        page_size: request.page_size,
        total_items: total_items as u64,
        total_pages: total_pages.min(u32::MAX as usize) as u32,
    };
    (page, pagination)
}

// =============================================================================
// List Response
// =============================================================================

/// An order with resolved items and computed totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub summary: ItemSummary,
    pub transport: Money,
    pub profit: Money,
    pub my_share: Money,
}

impl From<Order> for OrderView {
    fn from(mut order: Order) -> Self {
        let totals = order_totals(&order);
        order.items = totals.items;
        OrderView {
            order,
            summary: totals.totals,
            transport: totals.transport,
            profit: totals.profit,
            my_share: totals.my_share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub items: Vec<OrderView>,
    pub pagination: Pagination,
    /// Over the whole filtered set, not just this page.
    pub totals: LedgerTotals,
}

/// Filters, sorts, totals and paginates a full scan of orders.
pub fn list_orders(orders: Vec<Order>, filter: &ListFilter, request: PageRequest) -> OrderPage {
    let mut matching: Vec<Order> = orders.into_iter().filter(|o| filter.matches(o)).collect();
    sort_orders(&mut matching, filter.sort);

    let totals = LedgerTotals::from_orders(&matching);
    let (page, pagination) = paginate(matching, request);

    OrderPage {
        items: page.into_iter().map(OrderView::from).collect(),
        pagination,
        totals,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{item, order_with_items};
    use chrono::{Duration, TimeZone, Utc};

    fn dated(id: &str, y: i32, m: u32, d: u32) -> Order {
        let mut order = order_with_items(id, vec![item("Lampa", 1, 100, 200)]);
        order.created_at = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        order.sort_index = order.created_at.timestamp_millis();
        order
    }

    fn ids(page: &OrderPage) -> Vec<&str> {
        page.items.iter().map(|v| v.order.id.as_str()).collect()
    }

    #[test]
    fn test_search_covers_items_and_customer() {
        let mut order = order_with_items(
            "o1",
            vec![item("Lampa", 1, 0, 0), item("Stolica", 1, 0, 0)],
        );
        order.customer_name = "Đorđe Petrović".to_string();
        order.items[1].variant_label = Some("Stolica Hrastova".to_string());

        assert!(matches_search(&order, &normalize("stolica")));
        assert!(matches_search(&order, &normalize("hrastova")));
        assert!(matches_search(&order, &normalize("djordje")));
        assert!(matches_search(&order, &normalize("123 456")));
        assert!(!matches_search(&order, &normalize("sto lica")));
    }

    #[test]
    fn test_stage_and_return_filters() {
        let mut paid = dated("paid", 2024, 5, 1);
        paid.stage = Stage::LeglePare;
        paid.povrat_vracen = true;
        let open = dated("open", 2024, 5, 2);

        let filter = ListFilter {
            stages: vec![Stage::LeglePare, Stage::Stiglo],
            ..Default::default()
        };
        assert!(filter.matches(&paid));
        assert!(!filter.matches(&open));

        let both = ListFilter {
            returned_only: true,
            unreturned_only: true,
            ..Default::default()
        };
        assert!(both.matches(&paid));
        assert!(!both.matches(&open));

        let unreturned = ListFilter {
            unreturned_only: true,
            ..Default::default()
        };
        assert!(!unreturned.matches(&paid));
        assert!(unreturned.matches(&open));
    }

    #[test]
    fn test_pickup_only() {
        let mut pickup = dated("p", 2024, 5, 1);
        pickup.pickup = true;
        let filter = ListFilter {
            pickup_only: true,
            ..Default::default()
        };
        assert!(filter.matches(&pickup));
        assert!(!filter.matches(&dated("s", 2024, 5, 1)));
    }

    #[test]
    fn test_reversed_date_range_is_swapped() {
        let orders = vec![
            dated("a", 2024, 1, 10),
            dated("b", 2024, 1, 15),
            dated("c", 2024, 1, 20),
        ];
        let in_order = ListFilter {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 15),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 20),
            ..Default::default()
        };
        let reversed = ListFilter {
            date_from: in_order.date_to,
            date_to: in_order.date_from,
            ..Default::default()
        };

        let a = list_orders(orders.clone(), &in_order, PageRequest::default());
        let b = list_orders(orders, &reversed, PageRequest::default());
        assert_eq!(ids(&a), vec!["c", "b"]);
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.totals, b.totals);
    }

    #[test]
    fn test_manual_sort_ties_by_creation_time() {
        let mut a = dated("a", 2024, 1, 1);
        let mut b = dated("b", 2024, 1, 2);
        let c = dated("c", 2024, 1, 3);
        a.sort_index = 5000;
        b.sort_index = 5000;

        let mut orders = vec![a, b, c.clone()];
        sort_orders(&mut orders, OrderSort::Manual);
        let got: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        // c keeps its timestamp index, far above 5000
        assert_eq!(got, vec!["c", "b", "a"]);

        let mut newer = c;
        newer.created_at += Duration::days(30);
        let mut orders = vec![dated("x", 2024, 2, 1), newer];
        sort_orders(&mut orders, OrderSort::Newest);
        assert_eq!(orders[0].id, "c");
    }

    #[test]
    fn test_page_request_clamping() {
        assert_eq!(PageRequest::new(Some(0), Some(0), 20), PageRequest { page: 1, page_size: 1 });
        assert_eq!(
            PageRequest::new(Some(-3), Some(5000), 20),
            PageRequest { page: 1, page_size: MAX_PAGE_SIZE }
        );
        assert_eq!(PageRequest::new(None, None, 50).page_size, 50);
    }

    #[test]
    fn test_totals_cover_all_pages() {
        let orders: Vec<Order> = (1..=5).map(|d| dated(&format!("o{}", d), 2024, 3, d)).collect();
        let page = list_orders(orders, &ListFilter::default(), PageRequest::new(Some(2), Some(2), 20));

        assert_eq!(ids(&page), vec!["o3", "o2"]);
        assert_eq!(page.pagination.total_items, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.totals.prodajno, Money::from_cents(5 * 200));
        assert_eq!(page.totals.nabavno, Money::from_cents(5 * 100));
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let orders = vec![dated("a", 2024, 1, 1)];
        let page = list_orders(orders, &ListFilter::default(), PageRequest::new(Some(9), Some(10), 20));
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_items, 1);
    }

    #[test]
    fn test_view_resolves_legacy_items() {
        let mut legacy = order_with_items("l", vec![]);
        legacy.title = "Lampa".to_string();
        legacy.prodajna_cena = Money::from_cents(900);

        let view = OrderView::from(legacy);
        assert_eq!(view.order.items.len(), 1);
        assert_eq!(view.summary.total_prodajno.cents(), 900);
    }
}
