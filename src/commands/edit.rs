use crate::args::EditArgs;
use crate::commands::{money, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{pick_category, Record};
use crate::store::Store;
use crate::{Config, Result};
use anyhow::{anyhow, bail};

/// Changes the fields of an existing record that are given in `args`.
///
/// The category is checked against the presets of the record's kind after the edit whenever
/// the kind or the category changes. A stored label outside the presets is kept as long as
/// neither is touched.
pub async fn edit(config: Config, args: EditArgs) -> Result<Out<Record>> {
    let mut record = config
        .db()
        .get(args.id())
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| anyhow!("Record not found: {}", args.id()))
        .pub_result(ErrorType::Request)?;

    apply(&mut record, &args).pub_result(ErrorType::Request)?;

    let record = config
        .db()
        .update(&record)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Updated {} {}: {} {} on {}",
        record.kind(),
        record.id(),
        record.category_label(),
        money(record.amount(), config.currency_unit()),
        record.date().format("%Y-%m-%d %H:%M")
    );
    Ok(Out::new(message, record))
}

fn apply(record: &mut Record, args: &EditArgs) -> Result<()> {
    if args.kind().is_none()
        && args.category().is_none()
        && args.amount().is_none()
        && args.date().is_none()
    {
        bail!("Nothing to change, give at least one of --kind, --category, --amount or --date");
    }

    let kind_changed = args.kind().is_some_and(|k| k != record.kind);
    if let Some(kind) = args.kind() {
        record.kind = kind;
    }
    match args.category() {
        Some(label) => record.category = Some(pick_category(record.kind, label)?.to_string()),
        None if kind_changed => {
            if let Some(current) = record.category.as_deref() {
                let category = pick_category(record.kind, current)
                    .map_err(|e| e.context("Pass --category along with --kind"))?;
                record.category = Some(category.to_string());
            }
        }
        None => {}
    }
    if let Some(amount) = args.amount() {
        record.amount = amount;
    }
    if let Some(date) = args.date() {
        record.date = date;
    }
    Ok(())
}
