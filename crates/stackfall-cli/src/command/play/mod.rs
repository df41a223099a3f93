use std::time::Duration;

use anyhow::Context as _;
use stackfall_engine::{BoardSize, GameModel, ShapeSeed};

use crate::{command::store_arg::StoreArg, tui::Tui};

use self::app::PlayApp;

mod app;
mod screen;

const DEFAULT_TICK_MS: u64 = 1000;
const DEFAULT_SAVE_NAME: &str = "quicksave";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum SizeArg {
    /// 4 rows
    Small,
    /// 8 rows
    #[default]
    Medium,
    /// 12 rows
    Large,
}

impl From<SizeArg> for BoardSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Small => BoardSize::Small,
            SizeArg::Medium => BoardSize::Medium,
            SizeArg::Large => BoardSize::Large,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Board size of the first game
    #[clap(long, value_enum, default_value_t = SizeArg::Medium)]
    size: SizeArg,
    /// Milliseconds between ticks
    #[clap(long, default_value_t = DEFAULT_TICK_MS, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Seed for shape generation (32 hexadecimal digits)
    #[clap(long)]
    seed: Option<ShapeSeed>,
    /// Start from this saved game instead of a new one
    #[clap(long)]
    load: Option<String>,
    /// Name the save key stores the game under
    #[clap(long, default_value = DEFAULT_SAVE_NAME)]
    save_as: String,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            size: SizeArg::default(),
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
            load: None,
            save_as: DEFAULT_SAVE_NAME.to_owned(),
        }
    }
}

pub(crate) fn run(arg: &PlayArg, store: &StoreArg) -> anyhow::Result<()> {
    let PlayArg {
        size,
        tick_ms,
        seed,
        load,
        save_as,
    } = arg;

    let mut model = GameModel::new((*size).into(), *seed).with_store(store.open()?);
    if let Some(name) = load {
        model
            .load_game(name)
            .with_context(|| format!("Failed to load saved game {name:?}"))?;
    }

    let mut app = PlayApp::new(model, Duration::from_millis(*tick_ms), save_as.clone());
    Tui::new().run(&mut app)
}
