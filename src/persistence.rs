//! # Persistence
//!
//! Learned values and round statistics survive restarts only when the operator has
//! granted data storage permission. Without it every load comes back empty and every
//! save is skipped.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::q_table::QTable;
use crate::session::Stats;

pub const USER_CONFIG_FILE: &str = "user_config.json";
pub const Q_TABLE_FILE: &str = "q_table.json";
pub const HISTORY_FILE: &str = "game_history.json";

pub trait Store {
    fn permission(&self) -> bool;
    fn set_permission(&mut self, granted: bool) -> Result<()>;
    fn load_table(&self) -> Result<QTable>;
    /// `Ok(false)` when skipped for lack of permission
    fn save_table(&self, table: &QTable) -> Result<bool>;
    fn load_stats(&self) -> Result<Stats>;
    fn save_stats(&self, stats: &Stats) -> Result<bool>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserConfig {
    data_storage_permission: bool,
}

/// On-disk shape of the statistics, with the derived rates written out for humans
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct HistoryFile {
    games_played: u64,
    wins: u64,
    losses: u64,
    win_rate: f64,
    average_diamonds: f64,
    total_diamonds: u64,
}

impl From<&Stats> for HistoryFile {
    fn from(s: &Stats) -> Self {
        HistoryFile {
            games_played: s.games_played,
            wins: s.wins,
            losses: s.losses,
            win_rate: s.win_rate(),
            average_diamonds: s.average_diamonds(),
            total_diamonds: s.total_diamonds,
        }
    }
}

impl From<HistoryFile> for Stats {
    fn from(h: HistoryFile) -> Self {
        Stats { games_played: h.games_played, wins: h.wins, losses: h.losses, total_diamonds: h.total_diamonds }
    }
}

/// JSON files in one data directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
    permission: bool,
}

impl JsonStore {
    /// Create the directory if needed and read the stored permission (absent means denied)
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let path = dir.join(USER_CONFIG_FILE);
        let permission = if path.exists() {
            let user: UserConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
            user.data_storage_permission
        } else {
            false
        };
        log::info!("Data directory {}: storage {}", dir.display(), if permission { "permitted" } else { "not permitted" });
        Ok(JsonStore { dir, permission })
    }

    pub fn dir(&self) -> &Path { &self.dir }

    fn read<T: for<'de> Deserialize<'de> + Default>(&self, file: &str) -> Result<T> {
        if !self.permission {
            log::warn!("No permission to load {file}");
            return Ok(T::default());
        }
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<bool> {
        if !self.permission {
            log::warn!("No permission to save {file}");
            return Ok(false);
        }
        fs::write(self.dir.join(file), serde_json::to_string_pretty(value)?)?;
        log::debug!("Saved {file}");
        Ok(true)
    }
}

impl Store for JsonStore {
    fn permission(&self) -> bool { self.permission }

    fn set_permission(&mut self, granted: bool) -> Result<()> {
        let user = UserConfig { data_storage_permission: granted };
        fs::write(self.dir.join(USER_CONFIG_FILE), serde_json::to_string_pretty(&user)?)?;
        self.permission = granted;
        log::info!("Data storage permission set to {granted}");
        Ok(())
    }

    fn load_table(&self) -> Result<QTable> {
        let table: QTable = self.read(Q_TABLE_FILE)?;
        log::info!("Loaded Q-table with {} entries", table.len());
        Ok(table)
    }

    fn save_table(&self, table: &QTable) -> Result<bool> {
        self.write(Q_TABLE_FILE, table)
    }

    fn load_stats(&self) -> Result<Stats> {
        Ok(self.read::<HistoryFile>(HISTORY_FILE)?.into())
    }

    fn save_stats(&self, stats: &Stats) -> Result<bool> {
        self.write(HISTORY_FILE, &HistoryFile::from(stats))
    }
}

/// Keeps everything in memory; for tests of the runner
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub permission: bool,
    pub table: std::cell::RefCell<Option<QTable>>,
    pub stats: std::cell::RefCell<Option<Stats>>,
}

#[cfg(test)]
impl Store for MemoryStore {
    fn permission(&self) -> bool { self.permission }
    fn set_permission(&mut self, granted: bool) -> Result<()> {
        self.permission = granted;
        Ok(())
    }
    fn load_table(&self) -> Result<QTable> {
        Ok(self.table.borrow().clone().unwrap_or_default())
    }
    fn save_table(&self, table: &QTable) -> Result<bool> {
        if !self.permission { return Ok(false); }
        *self.table.borrow_mut() = Some(table.clone());
        Ok(true)
    }
    fn load_stats(&self) -> Result<Stats> {
        Ok(self.stats.borrow().clone().unwrap_or_default())
    }
    fn save_stats(&self, stats: &Stats) -> Result<bool> {
        if !self.permission { return Ok(false); }
        *self.stats.borrow_mut() = Some(stats.clone());
        Ok(true)
    }
}
