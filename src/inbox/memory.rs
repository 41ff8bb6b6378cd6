//! In-memory inbox store — the deterministic path used whenever the
//! backend is unavailable.
//!
//! Holds the staged batch in insertion order, the ledger of committed rows,
//! and the category memory learned at commit time. Not synchronized; each
//! adapter owns one behind its own lock.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::categorize::CategoryMemory;
use super::model::{CommitResult, FlowKind, InboxItem};
use crate::config::BudgetConfig;
use crate::ledger::{self, LedgerEntry, NetWorthPoint, SummaryResponse};

/// Category given to placeholder rows when memory has no suggestion.
const PLACEHOLDER_CATEGORY: &str = "Misc";

/// Amount of every placeholder row.
const PLACEHOLDER_AMOUNT: Decimal = dec!(-45.67);

#[derive(Debug, Clone)]
pub struct MemoryInbox {
    batch: Vec<InboxItem>,
    ledger: Vec<LedgerEntry>,
    memory: CategoryMemory,
    placeholder_rows: usize,
}

impl MemoryInbox {
    pub fn new(placeholder_rows: usize) -> Self {
        Self {
            batch: Vec::new(),
            ledger: Vec::new(),
            memory: CategoryMemory::default(),
            placeholder_rows: placeholder_rows.max(1),
        }
    }

    /// A store pre-populated with three demo items (tempIds 1–3).
    pub fn with_demo_items(placeholder_rows: usize) -> Self {
        let mut store = Self::new(placeholder_rows);
        store.batch = demo_items();
        store
    }

    /// Current batch, in insertion order.
    pub fn items(&self) -> Vec<InboxItem> {
        self.batch.clone()
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    /// Replace the batch with what the backend reported.
    pub fn mirror(&mut self, items: &[InboxItem]) {
        self.batch = items.to_vec();
    }

    /// Drop the batch without ledgering it; the backend already did.
    pub fn clear(&mut self) {
        self.batch.clear();
    }

    /// Append placeholder rows for an imported file and return the batch.
    ///
    /// Each row's `temp_id` is the batch length plus one at the time it is
    /// created, so ids are unique only while nothing is removed.
    pub fn append_placeholders(&mut self, file_name: &str, today: NaiveDate) -> Vec<InboxItem> {
        for _ in 0..self.placeholder_rows {
            let next_id = self.batch.len() + 1;
            let description = format!("{file_name} Row {next_id}");
            let suggested_category = self
                .memory
                .suggest(&description)
                .unwrap_or_else(|| PLACEHOLDER_CATEGORY.to_string());
            self.batch.push(InboxItem {
                temp_id: next_id.to_string(),
                date: today,
                description,
                amount: PLACEHOLDER_AMOUNT,
                flow: FlowKind::Debit,
                suggested_category: Some(suggested_category),
            });
        }
        debug!(
            file = file_name,
            rows = self.placeholder_rows,
            total = self.batch.len(),
            "Placeholder rows appended"
        );
        self.items()
    }

    /// Set the category of the item with `temp_id`. Returns whether an
    /// item matched; an unknown id leaves the batch untouched.
    pub fn set_category(&mut self, temp_id: &str, category: &str) -> bool {
        match self.batch.iter_mut().find(|item| item.temp_id == temp_id) {
            Some(item) => {
                item.suggested_category = Some(category.to_string());
                true
            }
            None => {
                debug!(temp_id, "Category change for unknown item ignored");
                false
            }
        }
    }

    /// Move the whole batch into the ledger, learning categories on the way.
    pub fn commit(&mut self) -> CommitResult {
        let committed_count = self.batch.len();
        for item in self.batch.drain(..) {
            if let Some(category) = &item.suggested_category {
                self.memory.learn(&item.description, category);
            }
            self.ledger.push(LedgerEntry::from(item));
        }
        CommitResult { committed_count }
    }

    pub fn summary(&self, budgets: &[BudgetConfig], month: &str) -> SummaryResponse {
        ledger::summarize(&self.ledger, budgets, month)
    }

    pub fn networth_curve(&self, as_of: NaiveDate) -> Vec<NetWorthPoint> {
        ledger::networth_curve(&self.ledger, as_of)
    }
}

fn demo_items() -> Vec<InboxItem> {
    let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap_or_default();
    let item = |id: &str, date, description: &str, amount, category: &str| InboxItem {
        temp_id: id.to_string(),
        date,
        description: description.to_string(),
        amount,
        flow: FlowKind::Debit,
        suggested_category: Some(category.to_string()),
    };
    vec![
        item("1", day(4), "Blue Bottle Coffee", dec!(-8.5), "Dining"),
        item("2", day(4), "Amazon Web Services", dec!(-32.25), "Software"),
        item("3", day(3), "United Airlines", dec!(-412.33), "Travel"),
    ]
}
