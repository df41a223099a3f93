use anyhow::Context as _;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use stackfall_engine::{GameModel, ShapeSeed, TickOutcome};

use crate::command::{play::SizeArg, store_arg::StoreArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Maximum number of ticks to play
    #[clap(long, default_value_t = 500)]
    ticks: u64,
    /// Seed for shapes and inputs (32 hexadecimal digits, random if omitted)
    #[clap(long)]
    seed: Option<ShapeSeed>,
    /// Board size
    #[clap(long, value_enum, default_value_t = SizeArg::Medium)]
    size: SizeArg,
    /// Save the final game under this name
    #[clap(long)]
    save_as: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Summary {
    ticks: u64,
    locked_shapes: usize,
    cleared_rows: usize,
    game_over: bool,
}

impl Summary {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Advanced => {}
            TickOutcome::Locked { cleared_rows } => {
                self.locked_shapes += 1;
                self.cleared_rows += cleared_rows;
            }
            TickOutcome::GameOver => {
                self.locked_shapes += 1;
                self.game_over = true;
            }
        }
    }
}

pub(crate) fn run(arg: &SimulateArg, store: &StoreArg) -> anyhow::Result<()> {
    let SimulateArg {
        ticks,
        seed,
        size,
        save_as,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut inputs = Pcg32::from_seed(seed.to_bytes());
    let mut model = GameModel::new((*size).into(), Some(inputs.random()));
    if save_as.is_some() {
        model = model.with_store(store.open()?);
    }

    let summary = simulate(&mut model, &mut inputs, *ticks);
    log::info!("simulation finished: {summary:?}");

    print!("{}", model.game().board());
    println!("seed:    {seed}");
    println!("ticks:   {}", summary.ticks);
    println!("shapes:  {}", summary.locked_shapes);
    println!("rows:    {}", summary.cleared_rows);
    println!(
        "result:  {}",
        if summary.game_over { "game over" } else { "still playing" }
    );

    if let Some(name) = save_as {
        model
            .save_game(name)
            .with_context(|| format!("Failed to save simulated game as {name:?}"))?;
        println!("saved as {name:?}");
    }
    Ok(())
}

/// Plays up to `max_ticks` ticks, making one random input before each tick.
fn simulate(model: &mut GameModel, inputs: &mut Pcg32, max_ticks: u64) -> Summary {
    let mut summary = Summary::default();
    while summary.ticks < max_ticks && !summary.game_over {
        match inputs.random_range(0..5) {
            0 => _ = model.move_left(),
            1 => _ = model.move_right(),
            2 => _ = model.rotate(),
            3 => summary.record(model.soft_drop()),
            _ => {}
        }
        if summary.game_over {
            break;
        }
        summary.record(model.advance_tick());
        summary.ticks += 1;
    }
    summary
}
