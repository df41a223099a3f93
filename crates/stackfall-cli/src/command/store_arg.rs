use std::path::PathBuf;

use anyhow::Context as _;
use stackfall_engine::GameStore;
use stackfall_store::{RecordStore, TextStore};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum StoreKind {
    /// One `.tt` text file per game in `--save-dir`
    #[default]
    Text,
    /// Game and field records in the `--database` file
    Records,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StoreArg {
    /// Where saved games are kept
    #[clap(long, value_enum, default_value_t = StoreKind::Text, global = true)]
    store: StoreKind,
    /// Directory for the text store
    #[clap(long, default_value = "./saves", global = true)]
    save_dir: PathBuf,
    /// Database file for the record store
    #[clap(long, default_value = "./saves/stackfall.json", global = true)]
    database: PathBuf,
}

impl StoreArg {
    pub(crate) fn open(&self) -> anyhow::Result<Box<dyn GameStore>> {
        let store: Box<dyn GameStore> = match self.store {
            StoreKind::Text => Box::new(TextStore::new(&self.save_dir)),
            StoreKind::Records => Box::new(RecordStore::open(&self.database).with_context(|| {
                format!("Failed to open game database {}", self.database.display())
            })?),
        };
        log::debug!("using {:?} store", self.store);
        Ok(store)
    }
}
