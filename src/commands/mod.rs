//! Command handlers for the accountbook CLI.
//!
//! This module contains implementations for all CLI subcommands. Each handler takes the loaded
//! `Config` (except `init` and `categories`, which need none) and returns an `Out`.

mod add;
mod analysis;
mod calendar;
mod categories;
mod day;
mod delete;
mod edit;
mod init;
mod list;

use crate::args::MonthArgs;
use crate::calendar::CalendarMonth;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Record};
use crate::store::Store;
use crate::{Config, Result};
use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, warn};

pub use add::add;
pub use analysis::{analysis, Analysis};
pub use calendar::{calendar, CalendarCell, CalendarReport};
pub use categories::{categories, CategoryList};
pub use day::{day, DayReport};
pub use delete::delete;
pub use edit::edit;
pub use init::init;
pub use list::{list, Listing};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        println!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Reads every valid record. Rows that fail validation were already logged one by one by the
/// store, this adds a single summary line.
async fn fetch_records(config: &Config) -> Result<Vec<Record>> {
    let fetched = config
        .db()
        .fetch_all()
        .await
        .pub_result(ErrorType::Database)?;
    if fetched.quarantined > 0 {
        warn!(
            "{} stored record{} with an invalid date or amount {} ignored",
            fetched.quarantined,
            plural(fetched.quarantined),
            if fetched.quarantined == 1 { "was" } else { "were" }
        );
    }
    Ok(fetched.records)
}

/// The month named by `args`, with a missing year or month taken from today.
fn resolve_month(args: &MonthArgs) -> Result<CalendarMonth> {
    let today = Local::now().date_naive();
    CalendarMonth::new(
        args.year().unwrap_or(today.year()),
        args.month().unwrap_or(today.month()),
    )
    .pub_result(ErrorType::Request)
}

fn money(amount: Amount, unit: &str) -> String {
    format!("{amount} {unit}")
}

/// Like `money` but for a value that may be negative, such as a balance.
fn signed_money(value: Decimal, unit: &str) -> String {
    match Amount::new(value.abs()) {
        Ok(abs) if value.is_sign_negative() && !value.is_zero() => format!("-{abs} {unit}"),
        Ok(abs) => money(abs, unit),
        Err(_) => format!("{value} {unit}"),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
