//! Aggregation over fetched sale and outsource cost rows.
//!
//! The report pages fetch flat row sets scoped to a date range and derive all
//! summary figures in memory. Everything here is pure: the services map
//! sea-orm models into [`SaleRecord`] / [`CostRecord`] and the functions below
//! never touch the database. Profit is always sales minus outsource cost for
//! the matching scope, computed in integer currency units so the identity
//! `profit == sales - cost` holds exactly.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Label used when a sale has no resolvable sale type.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Label used when a customer or vendor name cannot be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Customer breakdowns are capped to the top entries by amount.
pub const CUSTOMER_BREAKDOWN_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::InProgress => "in_progress",
            SaleStatus::Completed => "completed",
            SaleStatus::OnHold => "on_hold",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(SaleStatus::InProgress),
            "completed" => Some(SaleStatus::Completed),
            "on_hold" => Some(SaleStatus::OnHold),
            "cancelled" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }
}

/// A sale row as consumed by the aggregation functions.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    pub id: i32,
    pub sale_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub total_amount: i64,
    pub status: SaleStatus,
    pub customer_name: Option<String>,
    pub sale_type_name: Option<String>,
}

/// An outsource cost row joined to its sale by `sale_id`.
#[derive(Debug, Clone)]
pub struct CostRecord {
    pub sale_id: i32,
    pub outsource_name: Option<String>,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub total_sales: i64,
    pub total_outsource_cost: i64,
    pub total_profit: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownSlice {
    pub label: String,
    pub amount: i64,
}

/// One calendar bucket (a month of a year, or a day of a month).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub period: u32,
    pub sales: i64,
    pub outsource_cost: i64,
    pub profit: i64,
}

/// Parses the date prefix of a stored `YYYY-MM-DD` (or RFC 3339) string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let prefix = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Sums cost rows per sale id. The write path keeps a single row per sale,
/// but the schema permits several; when that happens all rows are summed and
/// the sale is flagged for review in the log.
pub fn cost_totals_by_sale(costs: &[CostRecord]) -> HashMap<i32, i64> {
    let mut totals: HashMap<i32, i64> = HashMap::new();
    let mut row_counts: HashMap<i32, u32> = HashMap::new();

    for cost in costs {
        *totals.entry(cost.sale_id).or_insert(0) += cost.amount;
        *row_counts.entry(cost.sale_id).or_insert(0) += 1;
    }

    for (sale_id, rows) in row_counts {
        if rows > 1 {
            tracing::warn!(
                sale_id,
                rows,
                "sale has multiple outsource cost rows; summing all of them"
            );
        }
    }

    totals
}

/// Totals for a set of sales already scoped to a period.
pub fn period_totals(sales: &[SaleRecord], cost_by_sale: &HashMap<i32, i64>) -> PeriodTotals {
    let total_sales: i64 = sales.iter().map(|s| s.total_amount).sum();
    let total_outsource_cost: i64 = sales
        .iter()
        .map(|s| cost_by_sale.get(&s.id).copied().unwrap_or(0))
        .sum();

    PeriodTotals {
        total_sales,
        total_outsource_cost,
        total_profit: total_sales - total_outsource_cost,
        count: sales.len(),
    }
}

/// Outsource cost total and profit for a single sale row.
pub fn annotate(sale_id: i32, total_amount: i64, cost_by_sale: &HashMap<i32, i64>) -> (i64, i64) {
    let cost = cost_by_sale.get(&sale_id).copied().unwrap_or(0);
    (cost, total_amount - cost)
}

// Accumulates (label, amount) pairs preserving first-encounter order, then
// sorts by amount descending. Vec::sort_by is stable, so ties keep their
// encounter order.
fn sorted_breakdown(entries: impl Iterator<Item = (String, i64)>) -> Vec<BreakdownSlice> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut slices: Vec<BreakdownSlice> = Vec::new();

    for (label, amount) in entries {
        match order.get(&label) {
            Some(&idx) => slices[idx].amount += amount,
            None => {
                order.insert(label.clone(), slices.len());
                slices.push(BreakdownSlice { label, amount });
            }
        }
    }

    slices.sort_by(|a, b| b.amount.cmp(&a.amount));
    slices
}

/// Sales grouped by sale type name, descending by amount. Unresolved types
/// fall into the "Uncategorized" slice.
pub fn breakdown_by_sale_type(sales: &[SaleRecord]) -> Vec<BreakdownSlice> {
    sorted_breakdown(sales.iter().map(|s| {
        let label = s
            .sale_type_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());
        (label, s.total_amount)
    }))
}

/// Sales grouped by customer name, descending by amount, truncated to the
/// top five.
pub fn breakdown_by_customer(sales: &[SaleRecord]) -> Vec<BreakdownSlice> {
    let mut slices = sorted_breakdown(sales.iter().map(|s| {
        let label = s
            .customer_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        (label, s.total_amount)
    }));
    slices.truncate(CUSTOMER_BREAKDOWN_LIMIT);
    slices
}

/// Cost rows grouped by vendor name, descending by amount. Unbounded.
pub fn breakdown_by_outsource(costs: &[CostRecord]) -> Vec<BreakdownSlice> {
    sorted_breakdown(costs.iter().map(|c| {
        let label = c
            .outsource_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        (label, c.amount)
    }))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// One bucket per month of `year`, pre-seeded with zeros so months without
/// sales still appear. `period` is the display month 1-12.
pub fn monthly_buckets(
    sales: &[SaleRecord],
    cost_by_sale: &HashMap<i32, i64>,
    year: i32,
) -> Vec<PeriodBucket> {
    let mut buckets: Vec<PeriodBucket> = (1..=12)
        .map(|m| PeriodBucket {
            period: m,
            sales: 0,
            outsource_cost: 0,
            profit: 0,
        })
        .collect();

    for sale in sales {
        if sale.sale_date.year() != year {
            continue;
        }
        let bucket = &mut buckets[sale.sale_date.month0() as usize];
        bucket.sales += sale.total_amount;
        bucket.outsource_cost += cost_by_sale.get(&sale.id).copied().unwrap_or(0);
    }

    for bucket in &mut buckets {
        bucket.profit = bucket.sales - bucket.outsource_cost;
    }

    buckets
}

/// One bucket per day of the given month, pre-seeded with zeros. `period` is
/// the day of month.
pub fn daily_buckets(
    sales: &[SaleRecord],
    cost_by_sale: &HashMap<i32, i64>,
    year: i32,
    month: u32,
) -> Vec<PeriodBucket> {
    let days = days_in_month(year, month);
    let mut buckets: Vec<PeriodBucket> = (1..=days)
        .map(|d| PeriodBucket {
            period: d,
            sales: 0,
            outsource_cost: 0,
            profit: 0,
        })
        .collect();

    for sale in sales {
        if sale.sale_date.year() != year || sale.sale_date.month() != month {
            continue;
        }
        let bucket = &mut buckets[sale.sale_date.day0() as usize];
        bucket.sales += sale.total_amount;
        bucket.outsource_cost += cost_by_sale.get(&sale.id).copied().unwrap_or(0);
    }

    for bucket in &mut buckets {
        bucket.profit = bucket.sales - bucket.outsource_cost;
    }

    buckets
}

/// A sale is overdue when it is still in progress and its delivery date is
/// strictly before today. Dates are compared as calendar dates; the midnight
/// boundary matters, the time of day does not.
pub fn is_overdue(status: SaleStatus, delivery_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match (status, delivery_date) {
        (SaleStatus::InProgress, Some(delivery)) => delivery < today,
        _ => false,
    }
}

/// Share of `part` in `total` as a percentage; 0.0 when the total is 0.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}
