use crate::aggregate::{daily_totals, month_summary, DayTotals, MonthSummary};
use crate::args::MonthArgs;
use crate::calendar::{CalendarMonth, Cell};
use crate::commands::{fetch_records, money, resolve_month, signed_money, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use serde::Serialize;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_WIDTH: usize = 12;

/// One cell of the printed grid. `totals` is present only on days that have records.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarCell {
    pub label: String,
    pub day: Option<u32>,
    pub totals: Option<DayTotals>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarReport {
    pub year: i32,
    pub month: u32,
    pub summary: MonthSummary,
    pub cells: Vec<CalendarCell>,
}

/// Shows a month as a Sunday-first grid. The header carries the month's income, expense and
/// balance; each day with records shows its income and expense totals.
pub async fn calendar(config: Config, args: MonthArgs) -> Result<Out<CalendarReport>> {
    let month = resolve_month(&args)?;
    let records = fetch_records(&config).await?;

    let by_day = daily_totals(&records).pub_result(ErrorType::Database)?;
    let summary =
        month_summary(&records, month.year(), month.month()).pub_result(ErrorType::Database)?;
    let cells = month
        .cells()
        .into_iter()
        .map(|cell| {
            let day = match cell {
                Cell::Blank => None,
                Cell::Day(d) => Some(d),
            };
            let totals = day
                .and_then(|d| month.date_of(d))
                .and_then(|date| by_day.get(&date).copied());
            CalendarCell {
                label: cell.to_string(),
                day,
                totals,
            }
        })
        .collect();

    let report = CalendarReport {
        year: month.year(),
        month: month.month(),
        summary,
        cells,
    };
    let message = render(&month, &report, config.currency_unit());
    Ok(Out::new(message, report))
}

fn render(month: &CalendarMonth, report: &CalendarReport, unit: &str) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        month.to_string(),
        format!(
            "Income {}  Expense {}  Balance {}",
            money(summary.income, unit),
            money(summary.expense, unit),
            signed_money(summary.balance, unit)
        ),
        String::new(),
        WEEKDAYS
            .iter()
            .map(|d| format!("{d:<width$}", width = CELL_WIDTH))
            .collect::<String>()
            .trim_end()
            .to_string(),
    ];

    for week in report.cells.chunks(7) {
        let labels = row(week, |c| c.label.clone());
        let income = row(week, |c| match c.totals {
            Some(t) if !t.income.is_zero() => format!("+{}", t.income),
            _ => String::new(),
        });
        let expense = row(week, |c| match c.totals {
            Some(t) if !t.expense.is_zero() => format!("-{}", t.expense),
            _ => String::new(),
        });
        lines.push(labels);
        for extra in [income, expense] {
            if !extra.is_empty() {
                lines.push(extra);
            }
        }
    }
    lines.join("\n")
}

fn row(week: &[CalendarCell], text: impl Fn(&CalendarCell) -> String) -> String {
    week.iter()
        .map(|c| format!("{:<width$}", text(c), width = CELL_WIDTH))
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Kind, NewRecord};
    use crate::store::Store;
    use crate::test::{at, TestEnv};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_calendar_may_2024() {
        let env = TestEnv::new().await;
        env.insert_sample_records().await;

        let out = calendar(env.config(), MonthArgs::new(Some(2024), Some(5)))
            .await
            .unwrap();
        let report = out.structure().unwrap();

        // 2024-05-01 is a Wednesday
        assert_eq!(report.cells.len(), 3 + 31);
        assert!(report.cells[..3].iter().all(|c| c.day.is_none()));
        assert_eq!(report.cells[3].label, "1");

        let first = report.cells[3].totals.unwrap();
        assert_eq!(first.income, Amount::from(3_000_000));
        assert_eq!(first.expense, Amount::from(15_000));
        assert!(report.cells[4].totals.is_none());
        assert_eq!(
            report.cells[5].totals.unwrap().expense,
            Amount::from(20_000)
        );

        assert_eq!(report.summary.income, Amount::from(3_000_000));
        assert_eq!(report.summary.expense, Amount::from(35_000));
        assert_eq!(report.summary.balance, Decimal::from(2_965_000));

        let message = out.message();
        assert!(message.starts_with("May 2024\nIncome 3,000,000 won"));
        assert!(message.contains("+3,000,000"));
        assert!(message.contains("-15,000"));
    }

    #[tokio::test]
    async fn test_calendar_empty_month() {
        let env = TestEnv::new().await;
        env.insert_sample_records().await;

        let out = calendar(env.config(), MonthArgs::new(Some(2024), Some(9)))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.cells.len(), 30);
        assert!(report.cells.iter().all(|c| c.totals.is_none()));
        assert_eq!(report.summary.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_calendar_invalid_month() {
        let env = TestEnv::new().await;
        let result = calendar(env.config(), MonthArgs::new(Some(2024), Some(0))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_calendar_total_too_large_is_error() {
        let env = TestEnv::new().await;
        let max = Amount::new(Decimal::MAX).unwrap();
        for hour in [9, 10] {
            env.config()
                .db()
                .insert(NewRecord::new("Food", max, Kind::Expense, at(2024, 5, 1, hour)))
                .await
                .unwrap();
        }

        let err = calendar(env.config(), MonthArgs::new(Some(2024), Some(5)))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("database error"));
        assert!(err.to_string().contains("largest supported amount"));
    }
}
