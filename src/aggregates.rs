//! Derived Aggregates
//!
//! Pure totals over the current store state. Nothing is cached; callers
//! recompute after every change notification.

use rust_decimal::Decimal;

use crate::domain::{Item, OtherCost, Record, RecordKind};
use crate::money::format_currency;
use crate::state::{AppState, RecordListState};

/// Exact sum of every record's amount; an empty list sums to zero
pub fn list_total<R: Record>(list: &RecordListState<R>) -> Decimal {
    list.records().iter().map(R::amount).sum()
}

pub fn items_total(state: &AppState) -> Decimal {
    list_total::<Item>(&state.items)
}

pub fn other_costs_total(state: &AppState) -> Decimal {
    list_total::<OtherCost>(&state.other_costs)
}

pub fn project_total(state: &AppState) -> Decimal {
    items_total(state) + other_costs_total(state)
}

/// Figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostSummary {
    pub items_total: Decimal,
    pub other_costs_total: Decimal,
    pub project_total: Decimal,
    pub item_count: usize,
    pub other_cost_count: usize,
}

impl CostSummary {
    pub fn from_state(state: &AppState) -> Self {
        let items_total = items_total(state);
        let other_costs_total = other_costs_total(state);
        Self {
            items_total,
            other_costs_total,
            project_total: items_total + other_costs_total,
            item_count: state.items.len(),
            other_cost_count: state.other_costs.len(),
        }
    }

    /// The breakdown card only appears once something costs money
    pub fn shows_breakdown(&self) -> bool {
        self.project_total > Decimal::ZERO
    }

    /// "1 item", "3 items"
    pub fn item_count_label(&self) -> String {
        format!("{} {}", self.item_count, RecordKind::Item.noun(self.item_count))
    }

    /// "1 cost", "0 costs"
    pub fn other_cost_count_label(&self) -> String {
        format!("{} {}", self.other_cost_count, RecordKind::OtherCost.noun(self.other_cost_count))
    }

    /// (items, other costs, project), formatted as currency
    pub fn formatted(&self) -> (String, String, String) {
        (
            format_currency(self.items_total),
            format_currency(self.other_costs_total),
            format_currency(self.project_total),
        )
    }
}
