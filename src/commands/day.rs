use crate::aggregate::{daily_totals, records_on, DayTotals};
use crate::args::DayArgs;
use crate::commands::{fetch_records, money, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Record;
use crate::{Config, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt::Write;

/// The records of one day and that day's totals.
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub totals: DayTotals,
    pub records: Vec<Record>,
}

/// Lists the records of one day, today if no date is given.
pub async fn day(config: Config, args: DayArgs) -> Result<Out<DayReport>> {
    let date = args.date().unwrap_or_else(|| Local::now().date_naive());
    let records = fetch_records(&config).await?;

    let totals = daily_totals(&records)
        .pub_result(ErrorType::Database)?
        .get(&date)
        .copied()
        .unwrap_or_default();
    let on_day: Vec<Record> = records_on(&records, date).into_iter().cloned().collect();

    let unit = config.currency_unit();
    let mut message = format!(
        "{}: income {}, expense {}",
        date.format("%Y-%m-%d (%a)"),
        money(totals.income, unit),
        money(totals.expense, unit)
    );
    if on_day.is_empty() {
        message.push_str("\nNo records");
    }
    for record in &on_day {
        let sign = if record.is_income() { '+' } else { '-' };
        let _ = write!(
            message,
            "\n  {}  {:<16} {sign}{:>14}  {}",
            record.date().format("%H:%M"),
            record.category_label(),
            record.amount().to_string(),
            record.id()
        );
    }

    Ok(Out::new(
        message,
        DayReport {
            date,
            totals,
            records: on_day,
        },
    ))
}
