//! Persistence of gameplay logs and the run summary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tower_duel_core::{EventRecord, EventSink, Team};
use tower_duel_simulation::EventStore;
use tracing::{debug, warn};

const GAME_END: &str = "GameEnd";

/// Collects records and writes one JSON file per finished game.
#[derive(Debug)]
pub(crate) struct LogWriter {
    directory: Option<PathBuf>,
    store: EventStore,
    files_written: u64,
}

impl LogWriter {
    /// Creates a writer; without a directory records are kept in memory only.
    pub(crate) fn new(directory: Option<PathBuf>) -> Result<Self> {
        if let Some(directory) = &directory {
            fs::create_dir_all(directory).with_context(|| {
                format!("failed to create log directory {}", directory.display())
            })?;
        }
        Ok(Self {
            directory,
            store: EventStore::new(),
            files_written: 0,
        })
    }

    /// Stores records, flushing the game log after every `GameEnd` record.
    pub(crate) fn append(&mut self, records: Vec<EventRecord>) -> Result<()> {
        for record in records {
            let ends_game = record.name == GAME_END;
            self.store.log_event(record);
            if ends_game {
                self.flush_game()?;
            }
        }
        Ok(())
    }

    /// Drops the records of a game that ended without an outcome from both the
    /// per-game and the combined log.
    pub(crate) fn discard_game(&mut self) {
        let dropped = self.store.discard_game();
        warn!(records = dropped.len(), "truncated game log discarded");
    }

    /// Writes the records of every game into a single file.
    pub(crate) fn write_all(&self, name: &str) -> Result<Option<PathBuf>> {
        let Some(directory) = &self.directory else {
            return Ok(None);
        };
        let json = self
            .store
            .all_json()
            .context("failed to render the combined event log")?;
        let path = directory.join(name);
        write_file(&path, &json)?;
        Ok(Some(path))
    }

    /// Number of per-game files written so far.
    pub(crate) fn files_written(&self) -> u64 {
        self.files_written
    }

    fn flush_game(&mut self) -> Result<()> {
        let Some(directory) = &self.directory else {
            let _ = self.store.take_game();
            return Ok(());
        };
        let json = self
            .store
            .game_json()
            .context("failed to render the game event log")?;
        self.files_written += 1;
        let path = directory.join(format!("game_{:04}.json", self.files_written));
        write_file(&path, &json)?;
        let _ = self.store.take_game();
        debug!(path = %path.display(), "game log written");
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Outcome counts of a whole run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    /// Games finished with an outcome.
    pub(crate) games: u64,
    /// Games won by the attacker.
    pub(crate) attacker_wins: u64,
    /// Games won by the defender.
    pub(crate) defender_wins: u64,
    /// Games cut short at the tick limit.
    pub(crate) truncated: u64,
    /// Simulated seconds across the run.
    pub(crate) simulated_secs: f64,
}

impl RunSummary {
    /// Counts a finished game.
    pub(crate) fn record_win(&mut self, winner: Team) {
        self.games += 1;
        match winner {
            Team::Attacker => self.attacker_wins += 1,
            Team::Defender => self.defender_wins += 1,
        }
    }

    /// Writes the summary as pretty JSON when a directory is configured.
    pub(crate) fn write(&self, directory: Option<&Path>) -> Result<()> {
        let Some(directory) = directory else {
            return Ok(());
        };
        let json =
            serde_json::to_string_pretty(self).context("failed to render the run summary")?;
        write_file(&directory.join("summary.json"), &json)
    }
}
