//! # Totals Aggregator
//!
//! Pure sums over items and orders. Nothing here is cached or persisted;
//! every read path recomputes.
//!
//! ## Per-Order Flow
//! ```text
//! resolved_items ──► summarize_items ──► totalProdajno, totalNabavno
//!                                              │
//! transportCost (0 if pickup) ─────────────────┤
//!                                              ▼
//!                          profit = prodajno − nabavno − transport
//!                                              │
//!                     stage == legle_pare? ────┤
//!                                              ▼
//!                          myShare = profit × myProfitPercent / 100
//! ```
//!
//! Cross-order aggregates come in two shapes: [`LedgerTotals`] for the
//! filtered `list` set and [`ScopeSummary`] for all paid orders of a scope,
//! where the carrier fee is applied.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::shipping::resolve_shipping;
use crate::types::{Order, OrderItem, Scope, SlanjeMode};
use crate::AKS_SHIPMENT_FEE;

// =============================================================================
// Item Summary
// =============================================================================

/// Sums over an item collection. Averages are per unit, in major units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub total_qty: i64,
    pub total_prodajno: Money,
    pub total_nabavno: Money,
    pub avg_prodajna: f64,
    pub avg_nabavna: f64,
}

/// Sums item lines exactly; averages are 0 when there is no quantity.
pub fn summarize_items(items: &[OrderItem]) -> ItemSummary {
    let total_qty: i64 = items.iter().map(|i| i.kolicina).sum();
    let total_prodajno: Money = items.iter().map(OrderItem::line_prodajno).sum();
    let total_nabavno: Money = items.iter().map(OrderItem::line_nabavno).sum();

    ItemSummary {
        total_qty,
        total_prodajno,
        total_nabavno,
        avg_prodajna: per_unit(total_prodajno, total_qty),
        avg_nabavna: per_unit(total_nabavno, total_qty),
    }
}

fn per_unit(total: Money, qty: i64) -> f64 {
    if qty == 0 {
        return 0.0;
    }
    finite_or_zero(total.to_major() / qty as f64)
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// =============================================================================
// Order Totals
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub items: Vec<OrderItem>,
    pub totals: ItemSummary,
    pub transport: Money,
    pub profit: Money,
    pub my_share: Money,
}

/// Transport cost counted against profit: 0 for pickup or when absent.
pub fn effective_transport(order: &Order) -> Money {
    if order.pickup {
        return Money::zero();
    }
    order.transport_cost.unwrap_or_default()
}

/// Operator's share of the profit. Zero until the order is paid.
pub fn my_share(order: &Order, profit: Money) -> Money {
    if !order.stage.is_paid() {
        return Money::zero();
    }
    profit.percent(order.my_profit_percent)
}

pub fn order_totals(order: &Order) -> OrderTotals {
    let items = order.resolved_items();
    let totals = summarize_items(&items);
    let transport = effective_transport(order);
    let profit = totals.total_prodajno - totals.total_nabavno - transport;
    let my_share = my_share(order, profit);

    OrderTotals {
        items,
        totals,
        transport,
        profit,
        my_share,
    }
}

// =============================================================================
// List Totals
// =============================================================================

/// Totals over a filtered order set (every page, not just the current one).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub nabavno: Money,
    pub transport: Money,
    pub prodajno: Money,
    pub my_share: Money,
    /// Amount to hand back: cost + transport + half of the operator share.
    pub povrat: Money,
}

impl LedgerTotals {
    pub fn from_orders<'a, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut totals = LedgerTotals::default();
        for order in orders {
            let t = order_totals(order);
            totals.nabavno += t.totals.total_nabavno;
            totals.prodajno += t.totals.total_prodajno;
            totals.transport += t.transport;
            totals.my_share += t.my_share;
        }
        totals.povrat = totals.nabavno + totals.transport + totals.my_share.half();
        totals
    }
}

// =============================================================================
// Scope Summary
// =============================================================================

/// Aggregate over every paid order of one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub scope: Scope,
    pub order_count: i64,
    pub total_qty: i64,
    pub prodajno: Money,
    pub nabavno: Money,
    pub transport: Money,
    /// Sum of per-order profits, before the carrier fee.
    pub profit: Money,
    pub my_share: Money,
    /// Paid orders shipped through the fee-charging carrier account.
    pub aks_orders: i64,
    pub aks_fees: Money,
    /// `profit − aks_fees`.
    pub net_profit: Money,
    pub avg_order_value: f64,
}

impl ScopeSummary {
    /// Summarizes the paid orders of `scope`; everything else is ignored.
    pub fn build(scope: Scope, orders: &[Order]) -> Self {
        let mut summary = ScopeSummary {
            scope,
            order_count: 0,
            total_qty: 0,
            prodajno: Money::zero(),
            nabavno: Money::zero(),
            transport: Money::zero(),
            profit: Money::zero(),
            my_share: Money::zero(),
            aks_orders: 0,
            aks_fees: Money::zero(),
            net_profit: Money::zero(),
            avg_order_value: 0.0,
        };

        for order in orders
            .iter()
            .filter(|o| o.scope == scope && o.stage.is_paid())
        {
            let t = order_totals(order);
            summary.order_count += 1;
            summary.total_qty += t.totals.total_qty;
            summary.prodajno += t.totals.total_prodajno;
            summary.nabavno += t.totals.total_nabavno;
            summary.transport += t.transport;
            summary.profit += t.profit;
            summary.my_share += t.my_share;

            let via_aks = resolve_shipping(order).is_some_and(|s| s.mode == SlanjeMode::Aks);
            if via_aks {
                summary.aks_orders += 1;
                summary.aks_fees += AKS_SHIPMENT_FEE;
            }
        }

        summary.net_profit = summary.profit - summary.aks_fees;
        if summary.order_count > 0 {
            summary.avg_order_value =
                finite_or_zero(summary.prodajno.to_major() / summary.order_count as f64);
        }
        summary
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{item, order_with_items};
    use crate::types::{Stage, TransportMode};

    fn paid_order(id: &str, prodajna: i64, nabavna: i64, percent: f64) -> Order {
        let mut order = order_with_items(id, vec![item("Lampa", 1, nabavna, prodajna)]);
        order.stage = Stage::LeglePare;
        order.my_profit_percent = percent;
        order
    }

    #[test]
    fn test_summarize_items_sums_lines() {
        let items = vec![item("a", 2, 100, 250), item("b", 3, 50, 199)];
        let s = summarize_items(&items);

        assert_eq!(s.total_qty, 5);
        assert_eq!(s.total_prodajno.cents(), 2 * 250 + 3 * 199);
        assert_eq!(s.total_nabavno.cents(), 2 * 100 + 3 * 50);
        let reconstructed = s.avg_prodajna * s.total_qty as f64;
        assert!((reconstructed - s.total_prodajno.to_major()).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_items_has_zero_averages() {
        let s = summarize_items(&[]);
        assert_eq!(s.total_qty, 0);
        assert_eq!(s.avg_prodajna, 0.0);
        assert_eq!(s.avg_nabavna, 0.0);
        assert!(s.total_prodajno.is_zero());
    }

    #[test]
    fn test_profit_share_only_when_paid() {
        // profit = 300 - 200 = 100
        let mut order = paid_order("o1", 30000, 20000, 40.0);
        let t = order_totals(&order);
        assert_eq!(t.profit.cents(), 10000);
        assert_eq!(t.my_share.cents(), 4000);

        order.stage = Stage::Poruceno;
        let t = order_totals(&order);
        assert_eq!(t.profit.cents(), 10000);
        assert!(t.my_share.is_zero());
    }

    #[test]
    fn test_transport_reduces_profit_unless_pickup() {
        let mut order = paid_order("o1", 30000, 20000, 0.0);
        order.transport_cost = Some(Money::from_cents(1500));
        assert_eq!(order_totals(&order).profit.cents(), 8500);

        order.pickup = true;
        let t = order_totals(&order);
        assert!(t.transport.is_zero());
        assert_eq!(t.profit.cents(), 10000);
    }

    #[test]
    fn test_legacy_order_totals() {
        let mut order = order_with_items("o1", vec![]);
        order.title = "Lampa".to_string();
        order.kolicina = 2;
        order.prodajna_cena = Money::from_cents(1000);
        order.nabavna_cena = Money::from_cents(400);

        let t = order_totals(&order);
        assert_eq!(t.items.len(), 1);
        assert_eq!(t.totals.total_prodajno.cents(), 2000);
        assert_eq!(t.profit.cents(), 1200);
    }

    #[test]
    fn test_ledger_totals_povrat() {
        let mut a = paid_order("a", 30000, 20000, 50.0); // share 50.00
        a.transport_cost = Some(Money::from_cents(500));
        let b = order_with_items("b", vec![item("x", 1, 1000, 3000)]); // unpaid

        let totals = LedgerTotals::from_orders([&a, &b]);
        assert_eq!(totals.nabavno.cents(), 21000);
        assert_eq!(totals.prodajno.cents(), 33000);
        assert_eq!(totals.transport.cents(), 500);
        // profit a = 300 - 200 - 5 = 95 → 50% = 47.50
        assert_eq!(totals.my_share.cents(), 4750);
        assert_eq!(totals.povrat.cents(), 21000 + 500 + 2375);
    }

    #[test]
    fn test_scope_summary_applies_carrier_fee() {
        let mut via_aks = paid_order("a", 30000, 20000, 0.0);
        via_aks.slanje_mode = Some(SlanjeMode::Aks);
        via_aks.slanje_owner = Some("Racun A".to_string());

        let mut legacy_kol = paid_order("b", 20000, 10000, 0.0);
        legacy_kol.transport_mode = Some(TransportMode::Kol);

        let mut via_bex = paid_order("c", 10000, 5000, 0.0);
        via_bex.slanje_mode = Some(SlanjeMode::Bex);

        let mut unpaid = paid_order("d", 99900, 0, 0.0);
        unpaid.stage = Stage::Stiglo;
        unpaid.slanje_mode = Some(SlanjeMode::Aks);

        let mut other_scope = paid_order("e", 99900, 0, 0.0);
        other_scope.scope = Scope::Kalaba;

        let orders = vec![via_aks, legacy_kol, via_bex, unpaid, other_scope];
        let summary = ScopeSummary::build(Scope::Default, &orders);

        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.profit.cents(), 10000 + 10000 + 5000);
        assert_eq!(summary.aks_orders, 2);
        assert_eq!(summary.aks_fees, AKS_SHIPMENT_FEE * 2);
        assert_eq!(summary.net_profit, summary.profit - AKS_SHIPMENT_FEE * 2);
        assert!((summary.avg_order_value - 200.0).abs() < 1e-9);
    }
}
