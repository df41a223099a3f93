use anyhow::Context as _;
use stackfall_engine::{Game, ShapeGenerator};

use crate::{command::store_arg::StoreArg, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Name of the saved game
    name: String,
    /// Print the saved game as JSON
    #[clap(long)]
    json: bool,
}

pub(crate) fn run(arg: &ShowArg, store: &StoreArg) -> anyhow::Result<()> {
    let ShowArg { name, json } = arg;

    let snapshot = store
        .open()?
        .load(name)
        .with_context(|| format!("Failed to load saved game {name:?}"))?;
    if *json {
        return util::print_json(&snapshot);
    }

    let game = Game::from_snapshot(&snapshot, ShapeGenerator::new())
        .with_context(|| format!("Saved game {name:?} is inconsistent"))?;
    let shape = game
        .active_shape_kind()
        .map_or_else(|| "-".to_owned(), |kind| kind.as_char().to_string());
    println!("{name}");
    println!(
        "size: {}  ticks: {}  shape: {shape}",
        game.board().size(),
        game.elapsed_ticks()
    );
    print!("{}", game.board());
    Ok(())
}
