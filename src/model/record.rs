use crate::model::category::UNCATEGORIZED;
use crate::model::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whether a record is money coming in or going out.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(Kind);
serde_plain::derive_fromstr_from_deserialize!(Kind);

impl Kind {
    pub fn from_is_income(is_income: bool) -> Self {
        if is_income {
            Kind::Income
        } else {
            Kind::Expense
        }
    }

    pub fn is_income(self) -> bool {
        matches!(self, Kind::Income)
    }
}

/// A single income or expense entry as held by the store.
///
/// Every `Record` has a valid date. Rows that lack one never become a `Record`; they are
/// quarantined when the store is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    pub(crate) id: String,
    pub(crate) category: Option<String>,
    pub(crate) amount: Amount,
    pub(crate) kind: Kind,
    pub(crate) date: NaiveDateTime,
}

impl Record {
    pub fn new(id: impl Into<String>, record: NewRecord) -> Self {
        Self {
            id: id.into(),
            category: record.category,
            amount: record.amount,
            kind: record.kind,
            date: record.date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The category label used for grouping, falling back to `UNCATEGORIZED`.
    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_income(&self) -> bool {
        self.kind.is_income()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// The calendar day of the record, i.e. its date with the time of day truncated.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// The fields of a record that has not been stored yet and so has no ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewRecord {
    pub category: Option<String>,
    pub amount: Amount,
    pub kind: Kind,
    pub date: NaiveDateTime,
}

impl NewRecord {
    pub fn new(
        category: impl Into<String>,
        amount: impl Into<Amount>,
        kind: Kind,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            category: Some(category.into()),
            amount: amount.into(),
            kind,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::at;
    use std::str::FromStr;

    #[test]
    fn test_kind_text() {
        assert_eq!(Kind::Income.to_string(), "income");
        assert_eq!(Kind::from_str("expense").unwrap(), Kind::Expense);
        assert!(Kind::from_str("refund").is_err());
    }

    #[test]
    fn test_kind_flag() {
        assert!(Kind::from_is_income(true).is_income());
        assert_eq!(Kind::from_is_income(false), Kind::Expense);
    }

    #[test]
    fn test_day_truncates_time() {
        let record = Record::new(
            "rec-1",
            NewRecord::new("Food", 10000u64, Kind::Expense, at(2024, 5, 1, 23)),
        );
        assert_eq!(record.day(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(!record.is_income());
    }

    #[test]
    fn test_category_label_falls_back() {
        let mut record = Record::new(
            "rec-1",
            NewRecord::new("Food", 1u64, Kind::Expense, at(2024, 5, 1, 0)),
        );
        assert_eq!(record.category_label(), "Food");
        record.category = None;
        assert_eq!(record.category_label(), UNCATEGORIZED);
        record.category = Some("  ".to_string());
        assert_eq!(record.category_label(), UNCATEGORIZED);
    }
}
