//! # Shipping Ledger (Obracun)
//!
//! Merges order-derived shipment totals with manually registered starting
//! balances, keyed on the normalized owner string.
//!
//! ## Two-Phase Reduce
//! ```text
//! Phase 1: paid orders (oldest first)
//! ┌──────────────────────────────┐
//! │ resolve_shipping(order)      │──► mode + owner
//! │   explicit slanjeMode/Owner  │
//! │   else legacy transportMode  │
//! └──────────────┬───────────────┘
//!                ▼
//!   carrier map: owner_key ──► { aks, bex, orders_total, display }
//!   mail map:    owner_key ──► { orders_total, display }
//!
//! Phase 2: shipping accounts
//!   owner_key ──► overlay starting_amount (+ display name) on carrier map,
//!                 creating entries for accounts with zero orders
//!
//! carrier total per owner = orders_total + starting_amount
//! mail total per owner    = orders_total
//! grand total             = carrier total (with starting) + mail total
//! ```
//!
//! The display name is the first one seen among the orders; an account
//! registered for the same key overrides it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::search::normalize;
use crate::totals::summarize_items;
use crate::types::{Order, Scope, ShippingAccount, SlanjeMode, TransportMode};

/// Display name of the bucket collecting orders with a mode but no owner.
pub const UNASSIGNED_OWNER: &str = "Bez vlasnika";

// =============================================================================
// Shipping Resolution
// =============================================================================

/// Where an order's money travelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShipping {
    pub mode: SlanjeMode,
    /// Display owner, `None` when the order names nobody.
    pub owner: Option<String>,
}

/// Resolves the shipping mode and owner of an order.
///
/// An explicit `slanjeMode` wins. Older records only carry a `transportMode`,
/// where `kol`/`joe` named the holder of the fee-charging carrier account.
pub fn resolve_shipping(order: &Order) -> Option<ResolvedShipping> {
    if let Some(mode) = order.slanje_mode {
        let owner = order
            .slanje_owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);
        return Some(ResolvedShipping { mode, owner });
    }

    let (mode, owner) = match order.transport_mode? {
        TransportMode::Kol => (SlanjeMode::Aks, Some("Kol")),
        TransportMode::Joe => (SlanjeMode::Aks, Some("Joe")),
        TransportMode::Posta => (SlanjeMode::Posta, None),
        TransportMode::Smg => return None,
    };

    Some(ResolvedShipping {
        mode,
        owner: owner.map(str::to_string),
    })
}

/// Normalized owner key plus display name; unassigned orders share `""`.
fn owner_identity(owner: Option<&str>) -> (String, String) {
    match owner {
        Some(name) => {
            let key = normalize(name);
            if key.is_empty() {
                (String::new(), UNASSIGNED_OWNER.to_string())
            } else {
                (key, name.to_string())
            }
        }
        None => (String::new(), UNASSIGNED_OWNER.to_string()),
    }
}

// =============================================================================
// Report Types
// =============================================================================

/// One carrier account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CarrierOwnerEntry {
    /// Empty for the unassigned bucket.
    pub owner_key: String,
    pub owner_name: String,
    pub aks_orders: i64,
    pub bex_orders: i64,
    pub aks_total: Money,
    pub bex_total: Money,
    pub order_count: i64,
    pub orders_total: Money,
    /// A shipping account is registered for this key.
    pub has_account: bool,
    pub starting_amount: Money,
    /// `orders_total + starting_amount`.
    pub total: Money,
}

impl CarrierOwnerEntry {
    fn empty(owner_key: String, owner_name: String) -> Self {
        CarrierOwnerEntry {
            owner_key,
            owner_name,
            aks_orders: 0,
            bex_orders: 0,
            aks_total: Money::zero(),
            bex_total: Money::zero(),
            order_count: 0,
            orders_total: Money::zero(),
            has_account: false,
            starting_amount: Money::zero(),
            total: Money::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CarrierAccountsReport {
    pub owners: Vec<CarrierOwnerEntry>,
    pub aks_total: Money,
    pub bex_total: Money,
    /// `aks_total + bex_total`.
    pub orders_total: Money,
    pub starting_total: Money,
    pub total_with_starting: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MailOwnerEntry {
    pub owner_key: String,
    pub owner_name: String,
    pub order_count: i64,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MailReport {
    pub owners: Vec<MailOwnerEntry>,
    pub order_count: i64,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ObracunMeta {
    pub scope: Scope,
    /// Paid orders that landed in a bucket.
    pub paid_orders: i64,
    /// Paid orders without any resolvable shipping mode.
    pub skipped_orders: i64,
    /// Carrier total with starting balances plus mail total.
    pub grand_total: Money,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ObracunReport {
    pub carrier_accounts: CarrierAccountsReport,
    pub mail: MailReport,
    pub meta: ObracunMeta,
}

// =============================================================================
// Obracun
// =============================================================================

impl ObracunReport {
    /// Builds the settlement report for one scope. Orders and accounts from
    /// other scopes are ignored.
    pub fn build(
        scope: Scope,
        orders: &[Order],
        accounts: &[ShippingAccount],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut paid: Vec<&Order> = orders
            .iter()
            .filter(|o| o.scope == scope && o.stage.is_paid())
            .collect();
        paid.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut carriers: BTreeMap<String, CarrierOwnerEntry> = BTreeMap::new();
        let mut mail: BTreeMap<String, MailOwnerEntry> = BTreeMap::new();
        let mut paid_orders = 0;
        let mut skipped_orders = 0;

        // Phase 1: order-derived totals
        for order in paid {
            let Some(shipping) = resolve_shipping(order) else {
                skipped_orders += 1;
                continue;
            };
            paid_orders += 1;

            let amount = summarize_items(&order.resolved_items()).total_prodajno;
            let (key, display) = owner_identity(shipping.owner.as_deref());

            match shipping.mode {
                SlanjeMode::Posta => {
                    let entry = mail.entry(key.clone()).or_insert_with(|| MailOwnerEntry {
                        owner_key: key,
                        owner_name: display,
                        order_count: 0,
                        total: Money::zero(),
                    });
                    entry.order_count += 1;
                    entry.total += amount;
                }
                SlanjeMode::Aks | SlanjeMode::Bex => {
                    let entry = carriers
                        .entry(key.clone())
                        .or_insert_with(|| CarrierOwnerEntry::empty(key, display));
                    entry.order_count += 1;
                    entry.orders_total += amount;
                    if shipping.mode == SlanjeMode::Aks {
                        entry.aks_orders += 1;
                        entry.aks_total += amount;
                    } else {
                        entry.bex_orders += 1;
                        entry.bex_total += amount;
                    }
                }
            }
        }

        // Phase 2: overlay starting balances
        for account in accounts.iter().filter(|a| a.scope == scope) {
            let key = normalize(&account.owner_key);
            if key.is_empty() {
                continue;
            }
            let entry = carriers
                .entry(key.clone())
                .or_insert_with(|| CarrierOwnerEntry::empty(key, account.owner_name.clone()));
            if !account.owner_name.trim().is_empty() {
                entry.owner_name = account.owner_name.clone();
            }
            entry.has_account = true;
            entry.starting_amount = account.starting_amount;
        }

        let owners: Vec<CarrierOwnerEntry> = order_buckets(carriers)
            .into_iter()
            .map(|mut entry| {
                entry.total = entry.orders_total + entry.starting_amount;
                entry
            })
            .collect();

        let aks_total: Money = owners.iter().map(|e| e.aks_total).sum();
        let bex_total: Money = owners.iter().map(|e| e.bex_total).sum();
        let starting_total: Money = owners.iter().map(|e| e.starting_amount).sum();
        let orders_total = aks_total + bex_total;
        let total_with_starting = orders_total + starting_total;

        let mail_owners = order_buckets(mail);
        let mail_total: Money = mail_owners.iter().map(|e| e.total).sum();
        let mail_count: i64 = mail_owners.iter().map(|e| e.order_count).sum();

        ObracunReport {
            carrier_accounts: CarrierAccountsReport {
                owners,
                aks_total,
                bex_total,
                orders_total,
                starting_total,
                total_with_starting,
            },
            mail: MailReport {
                owners: mail_owners,
                order_count: mail_count,
                total: mail_total,
            },
            meta: ObracunMeta {
                scope,
                paid_orders,
                skipped_orders,
                grand_total: total_with_starting + mail_total,
                generated_at,
            },
        }
    }
}

/// Named owners by key, the unassigned bucket last.
fn order_buckets<T>(map: BTreeMap<String, T>) -> Vec<T> {
    let mut unassigned = None;
    let mut named = Vec::with_capacity(map.len());
    for (key, value) in map {
        if key.is_empty() {
            unassigned = Some(value);
        } else {
            named.push(value);
        }
    }
    named.extend(unassigned);
    named
}

// =============================================================================
// Owner Suggestions
// =============================================================================

/// Known owner for autocomplete, with how often it was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSuggestion {
    pub owner_key: String,
    pub owner_name: String,
    pub order_count: i64,
    pub has_account: bool,
    pub starting_amount: Option<Money>,
}

/// Owners seen on any order of the scope (any stage) plus every registered
/// account, most used first, then by name.
pub fn owner_suggestions(
    scope: Scope,
    orders: &[Order],
    accounts: &[ShippingAccount],
) -> Vec<OwnerSuggestion> {
    let mut scoped: Vec<&Order> = orders.iter().filter(|o| o.scope == scope).collect();
    scoped.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut owners: BTreeMap<String, OwnerSuggestion> = BTreeMap::new();

    for order in scoped {
        let Some(name) = resolve_shipping(order).and_then(|s| s.owner) else {
            continue;
        };
        let key = normalize(&name);
        if key.is_empty() {
            continue;
        }
        owners
            .entry(key.clone())
            .or_insert_with(|| OwnerSuggestion {
                owner_key: key,
                owner_name: name,
                order_count: 0,
                has_account: false,
                starting_amount: None,
            })
            .order_count += 1;
    }

    for account in accounts.iter().filter(|a| a.scope == scope) {
        let key = normalize(&account.owner_key);
        if key.is_empty() {
            continue;
        }
        let entry = owners.entry(key.clone()).or_insert_with(|| OwnerSuggestion {
            owner_key: key,
            owner_name: account.owner_name.clone(),
            order_count: 0,
            has_account: false,
            starting_amount: None,
        });
        if !account.owner_name.trim().is_empty() {
            entry.owner_name = account.owner_name.clone();
        }
        entry.has_account = true;
        entry.starting_amount = Some(account.starting_amount);
    }

    let mut suggestions: Vec<OwnerSuggestion> = owners.into_values().collect();
    suggestions.sort_by(|a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then_with(|| normalize(&a.owner_name).cmp(&normalize(&b.owner_name)))
            .then_with(|| a.owner_key.cmp(&b.owner_key))
    });
    suggestions
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{item, order_with_items};
    use crate::types::Stage;
    use chrono::Duration;

    fn shipped(id: &str, mode: SlanjeMode, owner: Option<&str>, cents: i64, age: i64) -> Order {
        let mut order = order_with_items(id, vec![item("Lampa", 1, 0, cents)]);
        order.stage = Stage::LeglePare;
        order.slanje_mode = Some(mode);
        order.slanje_owner = owner.map(str::to_string);
        order.created_at = Utc::now() - Duration::minutes(age);
        order
    }

    fn account(name: &str, starting_cents: i64) -> ShippingAccount {
        let now = Utc::now();
        ShippingAccount {
            id: format!("acc-{}", name),
            tenant_id: "tenant-a".to_string(),
            scope: Scope::Default,
            owner_key: normalize(name),
            owner_name: name.to_string(),
            starting_amount: Money::from_cents(starting_cents),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resolve_shipping_explicit_and_legacy() {
        let order = shipped("o", SlanjeMode::Bex, Some("  Mira "), 100, 0);
        assert_eq!(
            resolve_shipping(&order),
            Some(ResolvedShipping {
                mode: SlanjeMode::Bex,
                owner: Some("Mira".to_string())
            })
        );

        let mut legacy = order_with_items("l", vec![]);
        legacy.transport_mode = Some(TransportMode::Joe);
        let resolved = resolve_shipping(&legacy).unwrap();
        assert_eq!(resolved.mode, SlanjeMode::Aks);
        assert_eq!(resolved.owner.as_deref(), Some("Joe"));

        legacy.transport_mode = Some(TransportMode::Posta);
        assert_eq!(resolve_shipping(&legacy).unwrap().owner, None);

        legacy.transport_mode = Some(TransportMode::Smg);
        assert_eq!(resolve_shipping(&legacy), None);
    }

    #[test]
    fn test_owner_spellings_merge_into_one_bucket() {
        let orders = vec![
            shipped("o1", SlanjeMode::Aks, Some("Racun A"), 10000, 10),
            shipped("o2", SlanjeMode::Aks, Some("racun a"), 5000, 5),
        ];
        let accounts = vec![account("RAČUN A", 2000)];

        let report = ObracunReport::build(Scope::Default, &orders, &accounts, Utc::now());
        let owners = &report.carrier_accounts.owners;

        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].order_count, 2);
        assert_eq!(owners[0].orders_total.cents(), 15000);
        assert_eq!(owners[0].starting_amount.cents(), 2000);
        assert_eq!(owners[0].total.cents(), 17000);
        // account registry overrides the display name
        assert_eq!(owners[0].owner_name, "RAČUN A");
        assert_eq!(report.carrier_accounts.starting_total.cents(), 2000);
    }

    #[test]
    fn test_display_name_is_first_seen_without_account() {
        let orders = vec![
            shipped("new", SlanjeMode::Bex, Some("MILOS"), 100, 1),
            shipped("old", SlanjeMode::Bex, Some("Miloš"), 100, 60),
        ];
        let report = ObracunReport::build(Scope::Default, &orders, &[], Utc::now());
        assert_eq!(report.carrier_accounts.owners[0].owner_name, "Miloš");
        assert!(!report.carrier_accounts.owners[0].has_account);
    }

    #[test]
    fn test_report_totals() {
        let mut unpaid = shipped("u", SlanjeMode::Aks, Some("Ana"), 99999, 1);
        unpaid.stage = Stage::Poslato;
        let mut no_mode = shipped("n", SlanjeMode::Aks, None, 700, 1);
        no_mode.slanje_mode = None;

        let orders = vec![
            shipped("a", SlanjeMode::Aks, Some("Ana"), 10000, 4),
            shipped("b", SlanjeMode::Bex, Some("Ana"), 3000, 3),
            shipped("c", SlanjeMode::Posta, Some("Ana"), 2000, 2),
            shipped("d", SlanjeMode::Posta, None, 500, 1),
            shipped("e", SlanjeMode::Bex, None, 400, 1),
            unpaid,
            no_mode,
        ];
        let accounts = vec![account("Ana", 1000), account("Vesna", 250)];

        let report = ObracunReport::build(Scope::Default, &orders, &accounts, Utc::now());
        let carriers = &report.carrier_accounts;

        assert_eq!(carriers.aks_total.cents(), 10000);
        assert_eq!(carriers.bex_total.cents(), 3400);
        assert_eq!(carriers.orders_total.cents(), 13400);
        assert_eq!(carriers.starting_total.cents(), 1250);
        assert_eq!(carriers.total_with_starting.cents(), 14650);

        // Ana, Vesna (account only), then unassigned
        let names: Vec<_> = carriers.owners.iter().map(|o| o.owner_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Vesna", UNASSIGNED_OWNER]);
        assert_eq!(carriers.owners[1].order_count, 0);
        assert_eq!(carriers.owners[1].total.cents(), 250);

        assert_eq!(report.mail.total.cents(), 2500);
        assert_eq!(report.mail.order_count, 2);
        assert_eq!(report.meta.grand_total.cents(), 14650 + 2500);
        assert_eq!(report.meta.paid_orders, 5);
        assert_eq!(report.meta.skipped_orders, 1);
    }

    #[test]
    fn test_scopes_never_mix() {
        let mut other = shipped("k", SlanjeMode::Aks, Some("Ana"), 10000, 1);
        other.scope = Scope::Kalaba;
        let mut foreign_account = account("Ana", 500);
        foreign_account.scope = Scope::Kalaba;

        let report = ObracunReport::build(Scope::Default, &[other], &[foreign_account], Utc::now());
        assert!(report.carrier_accounts.owners.is_empty());
        assert!(report.meta.grand_total.is_zero());
    }

    #[test]
    fn test_owner_suggestions_ranking() {
        let mut pending = shipped("p", SlanjeMode::Bex, Some("zoran"), 100, 1);
        pending.stage = Stage::Poruceno;
        let mut legacy = order_with_items("l", vec![]);
        legacy.transport_mode = Some(TransportMode::Kol);

        let orders = vec![
            shipped("a", SlanjeMode::Aks, Some("Zoran"), 100, 3),
            pending,
            shipped("b", SlanjeMode::Aks, Some("Ana"), 100, 2),
            legacy,
        ];
        let accounts = vec![account("Bojan", 0)];

        let suggestions = owner_suggestions(Scope::Default, &orders, &accounts);
        let names: Vec<_> = suggestions.iter().map(|s| s.owner_name.as_str()).collect();
        assert_eq!(names, vec!["Zoran", "Ana", "Kol", "Bojan"]);
        assert_eq!(suggestions[0].order_count, 2);
        assert!(suggestions[3].has_account);
        assert_eq!(suggestions[3].starting_amount, Some(Money::zero()));
    }
}
