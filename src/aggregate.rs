//! Date-bucketed aggregation of records for the calendar, day and analysis views.
//!
//! Every function here is a single pass over an already fetched slice of records. None of them
//! touch the store.

use crate::model::{Amount, Kind, Record};
use crate::Result;
use anyhow::{ensure, Context};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Income and expense totals of one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayTotals {
    pub income: Amount,
    pub expense: Amount,
}

impl DayTotals {
    fn add(&mut self, record: &Record) -> Result<()> {
        match record.kind() {
            Kind::Income => accumulate(&mut self.income, record),
            Kind::Expense => accumulate(&mut self.expense, record),
        }
    }
}

fn accumulate(total: &mut Amount, record: &Record) -> Result<()> {
    let current = *total;
    *total = current.checked_add(record.amount()).with_context(|| {
        format!(
            "Adding record {} ({}) to a total of {current} exceeds the largest supported amount",
            record.id(),
            record.amount()
        )
    })?;
    Ok(())
}

/// Sums income and expense per calendar day.
///
/// Each record's date is truncated to its day. Only days with at least one record appear in the
/// map, and records that share a day are combined into one bucket.
///
/// # Errors
/// - Returns an error if a day's total does not fit in an `Amount`.
pub fn daily_totals(records: &[Record]) -> Result<BTreeMap<NaiveDate, DayTotals>> {
    let mut totals: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for record in records {
        totals.entry(record.day()).or_default().add(record)?;
    }
    Ok(totals)
}

/// The year, month and kind picked on the analysis view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    year: i32,
    month: u32,
    kind: Kind,
}

impl Selection {
    /// # Errors
    /// - Returns an error if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32, kind: Kind) -> Result<Self> {
        ensure!(
            (1..=12).contains(&month),
            "Month must be between 1 and 12, got {month}"
        );
        Ok(Self { year, month, kind })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn matches(&self, record: &Record) -> bool {
        let date = record.date();
        date.year() == self.year && date.month() == self.month && record.kind() == self.kind
    }
}

/// Per-category totals of the records matching a `Selection`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    totals: BTreeMap<String, Amount>,
    grand_total: Amount,
}

/// One row of a `CategoryBreakdown`, as printed by the analysis command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub category: String,
    pub total: Amount,
    /// `None` when there is nothing to take a share of.
    pub percentage: Option<Decimal>,
}

impl CategoryBreakdown {
    pub fn totals(&self) -> &BTreeMap<String, Amount> {
        &self.totals
    }

    pub fn grand_total(&self) -> Amount {
        self.grand_total
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// `100 * categoryTotal / grandTotal`, or `None` ("no data") when the grand total is zero or
    /// the category has no records.
    pub fn percentage(&self, category: &str) -> Option<Decimal> {
        let total = self.totals.get(category)?;
        percentage(*total, self.grand_total)
    }

    /// The categories ordered by descending total, then by name.
    pub fn shares(&self) -> Vec<Share> {
        let mut shares: Vec<Share> = self
            .totals
            .iter()
            .map(|(category, total)| Share {
                category: category.clone(),
                total: *total,
                percentage: percentage(*total, self.grand_total),
            })
            .collect();
        shares.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        shares
    }
}

fn percentage(part: Amount, whole: Amount) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    Decimal::ONE_HUNDRED
        .checked_mul(part.value())?
        .checked_div(whole.value())
}

/// Groups the records matching `selection` by category label and sums them.
///
/// Records without a category are summed under `UNCATEGORIZED`.
///
/// # Errors
/// - Returns an error if the grand total does not fit in an `Amount`.
pub fn category_breakdown(records: &[Record], selection: &Selection) -> Result<CategoryBreakdown> {
    let mut breakdown = CategoryBreakdown::default();
    for record in records.iter().filter(|r| selection.matches(r)) {
        accumulate(&mut breakdown.grand_total, record)?;
        let category_total = breakdown
            .totals
            .entry(record.category_label().to_string())
            .or_default();
        accumulate(category_total, record)?;
    }
    Ok(breakdown)
}

/// Income, expense and balance of one month, shown above the calendar grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub income: Amount,
    pub expense: Amount,
    /// `income - expense`; negative when more went out than came in.
    pub balance: Decimal,
}

pub fn month_summary(records: &[Record], year: i32, month: u32) -> Result<MonthSummary> {
    let mut totals = DayTotals::default();
    for record in records
        .iter()
        .filter(|r| r.date().year() == year && r.date().month() == month)
    {
        totals.add(record)?;
    }
    // Both sides are non-negative so the difference always fits
    Ok(MonthSummary {
        income: totals.income,
        expense: totals.expense,
        balance: totals.income.value() - totals.expense.value(),
    })
}

/// The records dated on `day`, ordered by time then ID.
pub fn records_on(records: &[Record], day: NaiveDate) -> Vec<&Record> {
    let mut found: Vec<&Record> = records.iter().filter(|r| r.day() == day).collect();
    found.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(b.id())));
    found
}
