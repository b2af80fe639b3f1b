use crate::args::AddArgs;
use crate::commands::{money, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{pick_category, NewRecord, Record};
use crate::store::Store;
use crate::{Config, Result};
use chrono::{Local, SubsecRound};

/// Records a new income or expense. The category must be one of the presets for the kind and
/// the date defaults to the current local time.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Record>> {
    let category = pick_category(args.kind(), args.category()).pub_result(ErrorType::Request)?;
    let date = args
        .date()
        .unwrap_or_else(|| Local::now().naive_local().trunc_subsecs(0));

    let record = config
        .db()
        .insert(NewRecord::new(category, args.amount(), args.kind(), date))
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Added {} {}: {} {} on {}",
        record.kind(),
        record.id(),
        record.category_label(),
        money(record.amount(), config.currency_unit()),
        record.date().format("%Y-%m-%d %H:%M")
    );
    Ok(Out::new(message, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Kind};
    use crate::test::{at, TestEnv};

    #[tokio::test]
    async fn test_add_stores_canonical_category() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(
            Kind::Expense,
            "food",
            Amount::from(15000),
            Some(at(2024, 5, 1, 12)),
        );

        let out = add(env.config(), args).await.unwrap();
        let record = out.structure().unwrap();
        assert_eq!(record.category(), Some("Food"));
        assert!(out.message().contains("15,000 won"));

        let stored = env.config().db().get(record.id()).await.unwrap();
        assert_eq!(stored.as_ref(), Some(record));
    }

    #[tokio::test]
    async fn test_add_rejects_category_of_other_kind() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(Kind::Income, "Food", Amount::from(1), None);

        let err = add(env.config(), args).await.unwrap_err();
        assert!(err.to_string().starts_with("request error"));
        assert_eq!(env.config().db()._count_records().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_defaults_date_to_now() {
        let env = TestEnv::new().await;
        let before = Local::now().naive_local().trunc_subsecs(0);
        let args = AddArgs::new(Kind::Income, "Salary", Amount::from(100), None);

        let out = add(env.config(), args).await.unwrap();
        assert!(out.structure().unwrap().date() >= before);
    }
}
