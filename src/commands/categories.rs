use crate::args::CategoriesArgs;
use crate::commands::Out;
use crate::model::{presets, Kind};
use crate::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryList {
    pub kind: Kind,
    pub categories: Vec<&'static str>,
}

/// Prints the preset categories of one kind, or of both.
pub async fn categories(args: CategoriesArgs) -> Result<Out<Vec<CategoryList>>> {
    let kinds = match args.kind() {
        Some(kind) => vec![kind],
        None => vec![Kind::Income, Kind::Expense],
    };
    let lists: Vec<CategoryList> = kinds
        .into_iter()
        .map(|kind| CategoryList {
            kind,
            categories: presets(kind).to_vec(),
        })
        .collect();

    let message = lists
        .iter()
        .map(|l| format!("{}: {}", l.kind, l.categories.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(message, lists))
}
