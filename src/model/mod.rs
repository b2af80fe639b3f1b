//! Types that represent the core data model, such as `Record` and `Amount`.
mod amount;
mod category;
mod date;
mod record;

pub use amount::{Amount, AmountError};
pub use category::{pick_category, presets, UNCATEGORIZED};
pub(crate) use date::format_for_storage;
pub use date::parse_date_time;
pub use record::{Kind, NewRecord, Record};
