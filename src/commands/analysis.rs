use crate::aggregate::{category_breakdown, Selection, Share};
use crate::args::AnalysisArgs;
use crate::commands::{fetch_records, money, resolve_month, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Kind};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// How the records of one kind in one month split across categories.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub year: i32,
    pub month: u32,
    pub kind: Kind,
    pub grand_total: Amount,
    pub shares: Vec<Share>,
}

/// Breaks a month's expenses (or income) down by category, largest first, with each
/// category's share of the month's total.
pub async fn analysis(config: Config, args: AnalysisArgs) -> Result<Out<Analysis>> {
    let month = resolve_month(args.month())?;
    let selection =
        Selection::new(month.year(), month.month(), args.kind()).pub_result(ErrorType::Request)?;
    let records = fetch_records(&config).await?;
    let breakdown = category_breakdown(&records, &selection).pub_result(ErrorType::Database)?;

    let unit = config.currency_unit();
    let mut message = format!(
        "{} by category, {month}: {}",
        capitalized(args.kind()),
        money(breakdown.grand_total(), unit)
    );
    if breakdown.is_empty() {
        let _ = write!(message, "\nNo {} records", args.kind());
    }
    let shares = breakdown.shares();
    for share in &shares {
        let percentage = match share.percentage {
            Some(p) => format!("{:.2}%", p.round_dp(2)),
            None => "no data".to_string(),
        };
        let _ = write!(
            message,
            "\n  {:<16} {:>18}  {:>7}",
            share.category,
            money(share.total, unit),
            percentage
        );
    }

    Ok(Out::new(
        message,
        Analysis {
            year: selection.year(),
            month: selection.month(),
            kind: selection.kind(),
            grand_total: breakdown.grand_total(),
            shares,
        },
    ))
}

fn capitalized(kind: Kind) -> &'static str {
    match kind {
        Kind::Income => "Income",
        Kind::Expense => "Expense",
    }
}
