use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};

use self::{
    list::ListArg, play::PlayArg, show::ShowArg, simulate::SimulateArg, store_arg::StoreArg,
};

mod list;
mod play;
mod show;
mod simulate;
mod store_arg;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to do (plays a game when omitted)
    #[command(subcommand)]
    mode: Option<Mode>,
    #[command(flatten)]
    store: StoreArg,
    /// Write log output to this file instead of stderr
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// List saved games, most recent first
    List(#[clap(flatten)] ListArg),
    /// Print a saved game
    Show(#[clap(flatten)] ShowArg),
    /// Play a seeded game with random inputs and print the result
    Simulate(#[clap(flatten)] SimulateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.log_file.as_deref())?;

    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg, &args.store)?,
        Mode::List(arg) => list::run(&arg, &args.store)?,
        Mode::Show(arg) => show::run(&arg, &args.store)?,
        Mode::Simulate(arg) => simulate::run(&arg, &args.store)?,
    }
    Ok(())
}

/// Logs at `warn` unless `RUST_LOG` says otherwise.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
