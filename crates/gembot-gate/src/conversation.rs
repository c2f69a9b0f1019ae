//! Per-user conversation memory with pluggable persistence.

use crate::error::GateError;
use dashmap::DashMap;
use gembot_common::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTurn")]
pub struct ConversationTurn {
    /// Author
    pub role: Role,
    /// Message text
    pub text: String,
}

impl ConversationTurn {
    /// Create a turn.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

// Older history files store the text as a `parts` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTurn {
    Text { role: Role, text: String },
    Parts { role: Role, parts: Vec<String> },
}

impl From<StoredTurn> for ConversationTurn {
    fn from(stored: StoredTurn) -> Self {
        match stored {
            StoredTurn::Text { role, text } => Self { role, text },
            StoredTurn::Parts { role, parts } => Self {
                role,
                text: parts.concat(),
            },
        }
    }
}

/// Persistence failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded or decoded
    #[error("malformed conversation record {path}: {source}")]
    Format {
        /// Record involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Durable home for conversation histories.
///
/// Each user's full history is written on every change.
#[cfg_attr(test, mockall::automock)]
pub trait ConversationStorage: Send + Sync {
    /// Every readable record. Unreadable records are skipped.
    fn load_all(&self) -> Result<Vec<(UserId, Vec<ConversationTurn>)>, StorageError>;

    /// Replace the stored history for a user.
    fn save(&self, user_id: UserId, turns: &[ConversationTurn]) -> Result<(), StorageError>;
}

/// Stores each history as pretty-printed JSON in `<dir>/<user_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Use `dir`, creating it on first write if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: UserId) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    fn read_record(path: &Path) -> Result<Vec<ConversationTurn>, StorageError> {
        let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StorageError::Format {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ConversationStorage for JsonFileStorage {
    fn load_all(&self) -> Result<Vec<(UserId, Vec<ConversationTurn>)>, StorageError> {
        if !self.dir.exists() {
            debug!("Conversation directory {} does not exist yet", self.dir.display());
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let Some(user_id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<UserId>().ok())
            else {
                warn!("Skipping conversation file with non-numeric name: {}", path.display());
                continue;
            };

            match Self::read_record(&path) {
                Ok(turns) => records.push((user_id, turns)),
                Err(e) => warn!("Skipping conversation for user {}: {}", user_id, e),
            }
        }

        Ok(records)
    }

    fn save(&self, user_id: UserId, turns: &[ConversationTurn]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(user_id);
        let json = serde_json::to_string_pretty(turns).map_err(|source| StorageError::Format {
            path: path.clone(),
            source,
        })?;

        // Write then rename so a crash never leaves a truncated record.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io { path, source })
    }
}

/// Aggregate counts for the `stats` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversationStats {
    /// Users with at least one stored turn
    pub users_with_history: usize,
    /// Turns stored across all users
    pub total_turns: usize,
}

/// In-memory histories backed by a [`ConversationStorage`].
///
/// Each history holds at most `2 * max_exchanges` turns; older turns are
/// dropped from the front.
pub struct ConversationStore {
    histories: DashMap<UserId, Vec<ConversationTurn>>,
    storage: Arc<dyn ConversationStorage>,
    max_exchanges: usize,
}

impl fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationStore")
            .field("users", &self.histories.len())
            .field("max_exchanges", &self.max_exchanges)
            .finish_non_exhaustive()
    }
}

impl ConversationStore {
    /// Create a store and load every persisted history.
    pub fn load(
        storage: Arc<dyn ConversationStorage>,
        max_exchanges: usize,
    ) -> Result<Self, StorageError> {
        let store = Self {
            histories: DashMap::new(),
            storage,
            max_exchanges,
        };

        let records = store.storage.load_all()?;
        let count = records.len();
        for (user_id, mut turns) in records {
            store.trim(&mut turns);
            store.histories.insert(user_id, turns);
        }

        info!("Loaded {} conversation histories", count);
        Ok(store)
    }

    /// Exchanges kept per user.
    pub fn max_exchanges(&self) -> usize {
        self.max_exchanges
    }

    fn trim(&self, turns: &mut Vec<ConversationTurn>) {
        let cap = self.max_exchanges.saturating_mul(2);
        if turns.len() > cap {
            let excess = turns.len() - cap;
            turns.drain(..excess);
        }
    }

    fn persist(&self, user_id: UserId, turns: &[ConversationTurn]) -> Result<(), GateError> {
        self.storage
            .save(user_id, turns)
            .map_err(|source| GateError::Persistence { user_id, source })
    }

    /// The user's history, oldest first. Creates an empty one if none exists.
    pub fn get_history(&self, user_id: UserId) -> Vec<ConversationTurn> {
        self.histories.entry(user_id).or_default().clone()
    }

    fn push_turns<I>(&self, user_id: UserId, turns: I) -> Result<(), GateError>
    where
        I: IntoIterator<Item = ConversationTurn>,
    {
        let snapshot = {
            let mut history = self.histories.entry(user_id).or_default();
            history.extend(turns);
            self.trim(&mut history);
            history.clone()
        };
        debug!("User {} history now holds {} turns", user_id, snapshot.len());
        self.persist(user_id, &snapshot)
    }

    /// Append one turn, trim, then persist.
    pub fn append_message(
        &self,
        user_id: UserId,
        role: Role,
        text: impl Into<String>,
    ) -> Result<(), GateError> {
        self.push_turns(user_id, [ConversationTurn::new(role, text)])
    }

    /// Append a user prompt and the model's reply with a single write.
    pub fn append_exchange(
        &self,
        user_id: UserId,
        prompt: impl Into<String>,
        reply: impl Into<String>,
    ) -> Result<(), GateError> {
        self.push_turns(
            user_id,
            [
                ConversationTurn::new(Role::User, prompt),
                ConversationTurn::new(Role::Model, reply),
            ],
        )
    }

    /// Empty the user's history and persist that. Returns whether anything was removed.
    pub fn reset_history(&self, user_id: UserId) -> Result<bool, GateError> {
        let had_history = self
            .histories
            .insert(user_id, Vec::new())
            .is_some_and(|old| !old.is_empty());
        self.persist(user_id, &[])?;
        Ok(had_history)
    }

    /// Empty every known history. Returns how many users had one.
    ///
    /// Every user is attempted; the first persistence failure is returned.
    pub fn reset_all(&self) -> Result<usize, GateError> {
        let users: Vec<UserId> = self.histories.iter().map(|entry| *entry.key()).collect();

        let mut cleared = 0;
        let mut first_error = None;
        for user_id in users {
            match self.reset_history(user_id) {
                Ok(true) => cleared += 1,
                Ok(false) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(cleared),
        }
    }

    /// Counts across all users.
    pub fn stats(&self) -> ConversationStats {
        self.histories
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .fold(ConversationStats::default(), |mut stats, entry| {
                stats.users_with_history += 1;
                stats.total_turns += entry.value().len();
                stats
            })
    }
}
