use anyhow::Context as _;

use crate::{command::store_arg::StoreArg, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ListArg {
    /// Print the list as JSON
    #[clap(long)]
    json: bool,
}

pub(crate) fn run(arg: &ListArg, store: &StoreArg) -> anyhow::Result<()> {
    let ListArg { json } = arg;

    let entries = store
        .open()?
        .list()
        .context("Failed to list saved games")?;

    if *json {
        return util::print_json(&entries);
    }
    if entries.is_empty() {
        eprintln!("No saved games");
        return Ok(());
    }
    let width = entries
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(0);
    for entry in &entries {
        println!(
            "{:<width$}  {}",
            entry.name,
            entry.saved_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
