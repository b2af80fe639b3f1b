//! The preset categories offered when recording income or expenses.

use crate::model::Kind;
use crate::Result;
use anyhow::bail;

/// The bucket label for records that have no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

const INCOME_CATEGORIES: &[&str] = &["Salary", "Investment", "Allowance", "Interest", "Other Income"];

const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Travel",
    "Shopping",
    "Exercise",
    "Leisure",
    "Transportation",
    "Beauty",
    "Hospital",
    "Phone",
    "Savings",
    "Other Expense",
];

/// The categories that can be chosen for a record of the given `kind`, in display order.
pub fn presets(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Income => INCOME_CATEGORIES,
        Kind::Expense => EXPENSE_CATEGORIES,
    }
}

/// Resolves the user's choice of category for a record of `kind`.
///
/// Matching ignores case and surrounding whitespace; the canonical spelling is returned.
///
/// # Errors
/// - Returns an error naming the valid choices if `label` is not a preset of `kind`.
pub fn pick_category(kind: Kind, label: &str) -> Result<&'static str> {
    let wanted = label.trim();
    match presets(kind)
        .iter()
        .find(|c| c.eq_ignore_ascii_case(wanted))
    {
        Some(c) => Ok(c),
        None => bail!(
            "'{wanted}' is not an {kind} category. Choose one of: {}",
            presets(kind).join(", ")
        ),
    }
}
