//! Ledger records and the summaries computed from them.
//!
//! The permanent ledger normally lives in the backend. When the backend is
//! unavailable the adapters keep committed rows in memory and derive the
//! monthly summary and net-worth curve here.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::BudgetConfig;
use crate::inbox::model::{FlowKind, InboxItem};

/// Label for spend with no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Months covered by the net-worth curve.
const CURVE_MONTHS: i32 = 12;

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub flow: FlowKind,
    pub category: Option<String>,
}

impl From<InboxItem> for LedgerEntry {
    fn from(item: InboxItem) -> Self {
        Self {
            date: item.date,
            description: item.description,
            amount: item.amount,
            flow: item.flow,
            category: item.suggested_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spend: Decimal,
    pub by_category: Vec<CategoryAmount>,
    pub budgets: Vec<BudgetUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUsage {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cap: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthPoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_worth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub invested: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub debt: Decimal,
}

/// Spending summary for `month` (`YYYY-MM`). Only outflows count.
/// A month that matches no entry yields zero totals.
pub fn summarize(
    entries: &[LedgerEntry],
    budgets: &[BudgetConfig],
    month: &str,
) -> SummaryResponse {
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    let mut total_spend = Decimal::ZERO;

    for entry in entries
        .iter()
        .filter(|e| e.amount < Decimal::ZERO && e.date.format("%Y-%m").to_string() == month)
    {
        let spend = entry.amount.abs();
        total_spend += spend;
        *by_category
            .entry(entry.category.as_deref().unwrap_or(UNCATEGORIZED))
            .or_default() += spend;
    }

    let mut categories: Vec<CategoryAmount> = by_category
        .iter()
        .map(|(category, amount)| CategoryAmount {
            category: category.to_string(),
            amount: *amount,
        })
        .collect();
    categories.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));

    let mut usage: Vec<BudgetUsage> = budgets
        .iter()
        .map(|budget| BudgetUsage {
            category: budget.category.clone(),
            cap: budget.cap,
            spent: by_category
                .get(budget.category.as_str())
                .copied()
                .unwrap_or_default(),
        })
        .collect();
    usage.sort_by(|a, b| a.category.cmp(&b.category));

    SummaryResponse {
        month: month.to_string(),
        total_spend,
        by_category: categories,
        budgets: usage,
    }
}

/// Cumulative net worth over the twelve months ending at `as_of`'s month.
pub fn networth_curve(entries: &[LedgerEntry], as_of: NaiveDate) -> Vec<NetWorthPoint> {
    let mut monthly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for entry in entries {
        *monthly
            .entry((entry.date.year(), entry.date.month()))
            .or_default() += entry.amount;
    }

    let last = as_of.year() * 12 + as_of.month0() as i32;
    let mut cumulative = Decimal::ZERO;

    (last - CURVE_MONTHS + 1..=last)
        .filter_map(|index| {
            let year = index.div_euclid(12);
            let month = index.rem_euclid(12) as u32 + 1;
            let date = NaiveDate::from_ymd_opt(year, month, 1)?;
            cumulative += monthly.get(&(year, month)).copied().unwrap_or_default();
            Some(NetWorthPoint {
                date,
                net_worth: cumulative,
                cash: (cumulative * dec!(0.4)).max(Decimal::ZERO),
                invested: (cumulative * dec!(0.55)).max(Decimal::ZERO),
                debt: (-cumulative * dec!(0.2)).max(Decimal::ZERO),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_budgets;

    fn entry(date: &str, amount: Decimal, category: Option<&str>) -> LedgerEntry {
        LedgerEntry {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: "row".into(),
            amount,
            flow: FlowKind::from_amount(amount),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn summary_counts_outflows_in_month() {
        let entries = vec![
            entry("2025-01-03", dec!(-412.33), Some("Travel")),
            entry("2025-01-04", dec!(-8.5), Some("Dining")),
            entry("2025-01-09", dec!(-20), Some("Dining")),
            entry("2025-01-15", dec!(3000), Some("Income")),
            entry("2025-01-20", dec!(-5), None),
            entry("2025-02-01", dec!(-100), Some("Dining")),
        ];

        let summary = summarize(&entries, &default_budgets(), "2025-01");

        assert_eq!(summary.month, "2025-01");
        assert_eq!(summary.total_spend, dec!(445.83));
        assert_eq!(
            summary.by_category,
            vec![
                CategoryAmount {
                    category: "Travel".into(),
                    amount: dec!(412.33),
                },
                CategoryAmount {
                    category: "Dining".into(),
                    amount: dec!(28.5),
                },
                CategoryAmount {
                    category: UNCATEGORIZED.into(),
                    amount: dec!(5),
                },
            ]
        );

        let dining = summary.budgets.iter().find(|b| b.category == "Dining").unwrap();
        assert_eq!(dining.cap, dec!(350));
        assert_eq!(dining.spent, dec!(28.5));
        let housing = summary.budgets.iter().find(|b| b.category == "Housing").unwrap();
        assert_eq!(housing.spent, Decimal::ZERO);

        let names: Vec<_> = summary.budgets.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(
            names,
            vec!["Dining", "Discretionary", "Groceries", "Housing", "Transportation"]
        );
    }

    #[test]
    fn summary_for_unknown_month_is_empty() {
        let entries = vec![entry("2025-01-03", dec!(-10), Some("Dining"))];
        let summary = summarize(&entries, &[], "not-a-month");
        assert_eq!(summary.total_spend, Decimal::ZERO);
        assert!(summary.by_category.is_empty());
        assert!(summary.budgets.is_empty());
    }

    #[test]
    fn curve_covers_twelve_months_across_year_boundary() {
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let curve = networth_curve(&[], as_of);

        assert_eq!(curve.len(), 12);
        assert_eq!(curve[0].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(curve[11].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(curve.iter().all(|p| p.net_worth.is_zero()));
    }

    #[test]
    fn curve_accumulates_and_splits() {
        let entries = vec![
            entry("2025-01-02", dec!(1000), None),
            entry("2025-02-10", dec!(-1500), Some("Housing")),
            entry("2023-01-01", dec!(99999), None),
        ];
        let curve = networth_curve(&entries, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let jan = &curve[10];
        assert_eq!(jan.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(jan.net_worth, dec!(1000));
        assert_eq!(jan.cash, dec!(400));
        assert_eq!(jan.invested, dec!(550));
        assert_eq!(jan.debt, Decimal::ZERO);

        let feb = &curve[11];
        assert_eq!(feb.net_worth, dec!(-500));
        assert_eq!(feb.cash, Decimal::ZERO);
        assert_eq!(feb.invested, Decimal::ZERO);
        assert_eq!(feb.debt, dec!(100));
    }
}
