//! The `list` command: dump records as a table, JSON or CSV.

use crate::args::{ListArgs, OutputFormat};
use crate::calendar::CalendarMonth;
use crate::commands::{fetch_records, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Record;
use crate::{Config, Result};
use anyhow::Context;
use chrono::Datelike;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub format: OutputFormat,
    pub records: Vec<Record>,
}

/// Prints every record, or those of one year or one month, oldest first.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Listing>> {
    let filter = Filter::new(&args).pub_result(ErrorType::Request)?;
    let records: Vec<Record> = fetch_records(&config)
        .await?
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();

    let message = match args.format() {
        OutputFormat::Table => table(&records, config.currency_unit()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&records).context("Unable to serialize records")?
        }
        OutputFormat::Csv => to_csv(&records)?,
    };
    Ok(Out::new(
        message,
        Listing {
            format: args.format(),
            records,
        },
    ))
}

enum Filter {
    All,
    Year(i32),
    Month(CalendarMonth),
}

impl Filter {
    fn new(args: &ListArgs) -> Result<Self> {
        Ok(match (args.year(), args.month()) {
            (Some(year), Some(month)) => Filter::Month(CalendarMonth::new(year, month)?),
            (Some(year), None) => Filter::Year(year),
            (None, Some(month)) => anyhow::bail!("--month {month} needs a --year"),
            (None, None) => Filter::All,
        })
    }

    fn matches(&self, record: &Record) -> bool {
        let day = record.day();
        match self {
            Filter::All => true,
            Filter::Year(year) => day.year() == *year,
            Filter::Month(month) => CalendarMonth::containing(day) == *month,
        }
    }
}

fn table(records: &[Record], unit: &str) -> String {
    let mut lines = vec![format!(
        "{:<36}  {:<16}  {:<7}  {:>14}  {}",
        "ID", "Category", "Kind", "Amount", "Date"
    )];
    lines.extend(records.iter().map(|r| {
        format!(
            "{:<36}  {:<16}  {:<7}  {:>14}  {}",
            r.id(),
            r.category_label(),
            r.kind().to_string(),
            r.amount().to_string(),
            r.date().format("%Y-%m-%d %H:%M")
        )
    }));
    lines.push(format!(
        "{} record{} (amounts in {unit})",
        records.len(),
        plural(records.len())
    ));
    lines.join("\n")
}

fn to_csv(records: &[Record]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Unable to write record '{}' as CSV", record.id()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
