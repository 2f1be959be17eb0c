use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::constants::{RANKING_DEFAULT_LIMIT, RANKING_MAX_LIMIT};
use crate::error::RankingError;
use crate::types::{RankingDiagnostics, RankingEntry, ScoreSubmission};

const STORE_VERSION: u8 = 1;
const BACKEND_NAME: &str = "json-file";
const REQUIRED_FIELDS: &str = "name, score, and level are required";

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredRankingEntry {
    name: String,
    score: u64,
    level: u32,
    date: String,
}

impl From<StoredRankingEntry> for RankingEntry {
    fn from(value: StoredRankingEntry) -> Self {
        Self {
            name: value.name,
            score: value.score,
            level: value.level,
            date: value.date,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RankingStoreFile {
    version: u8,
    players: HashMap<String, StoredRankingEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct RankingStoreFileRaw {
    version: u8,
    #[serde(default)]
    players: HashMap<String, Value>,
}

impl ScoreSubmission {
    /// Shape check for a submitted score. Nothing is stored on failure.
    pub fn from_json(value: &Value) -> Result<Self, RankingError> {
        let field = |key: &str| value.get(key).filter(|field| !field.is_null());
        let (Some(name), Some(score), Some(level)) = (field("name"), field("score"), field("level"))
        else {
            return Err(RankingError::Validation(REQUIRED_FIELDS.to_string()));
        };

        let name = name
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RankingError::Validation("name must be a non-empty string".into()))?;
        let score = whole_number(score).ok_or_else(|| {
            RankingError::Validation("score must be a non-negative integer".into())
        })?;
        let level = whole_number(level)
            .filter(|level| *level >= 1)
            .and_then(|level| u32::try_from(level).ok())
            .ok_or_else(|| RankingError::Validation("level must be a positive integer".into()))?;

        Ok(Self {
            name: name.to_string(),
            score,
            level,
        })
    }
}

fn whole_number(value: &Value) -> Option<u64> {
    if let Some(number) = value.as_u64() {
        return Some(number);
    }
    let number = value.as_f64()?;
    if !number.is_finite() || number < 0.0 || number.fract() != 0.0 || number > u64::MAX as f64 {
        return None;
    }
    Some(number as u64)
}

pub struct RankingStore {
    file_path: PathBuf,
    players: HashMap<String, StoredRankingEntry>,
}

impl RankingStore {
    pub fn open(file_path: PathBuf) -> Result<Self, RankingError> {
        if file_path.as_os_str().is_empty() {
            return Err(RankingError::NotConfigured);
        }
        let players = load_players(&file_path)?;
        Ok(Self { file_path, players })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Upserts by normalised name, keeping the best score and best level independently.
    /// The file is written before memory changes, so a failed write leaves both untouched.
    pub fn submit(&mut self, submission: &ScoreSubmission) -> Result<RankingEntry, RankingError> {
        let key = ranking_key(&submission.name);
        if key.is_empty() {
            return Err(RankingError::Validation(REQUIRED_FIELDS.to_string()));
        }
        if submission.level == 0 {
            return Err(RankingError::Validation(
                "level must be a positive integer".into(),
            ));
        }

        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let entry = match self.players.get(&key) {
            Some(current) => StoredRankingEntry {
                name: key.clone(),
                score: current.score.max(submission.score),
                level: current.level.max(submission.level),
                date,
            },
            None => StoredRankingEntry {
                name: key.clone(),
                score: submission.score,
                level: submission.level,
                date,
            },
        };

        let mut next = self.players.clone();
        next.insert(key, entry.clone());
        self.save(&next)?;
        self.players = next;
        Ok(entry.into())
    }

    pub fn top(&self, requested_limit: Option<usize>) -> Vec<RankingEntry> {
        let limit = requested_limit
            .unwrap_or(RANKING_DEFAULT_LIMIT)
            .clamp(1, RANKING_MAX_LIMIT);
        let mut entries: Vec<StoredRankingEntry> = self.players.values().cloned().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        entries.truncate(limit);
        entries.into_iter().map(RankingEntry::from).collect()
    }

    pub fn diagnostics(&self) -> Result<RankingDiagnostics, RankingError> {
        let started = Instant::now();
        match fs::metadata(&self.file_path) {
            Ok(_) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(RankingError::Io(error)),
        }
        Ok(RankingDiagnostics {
            status: "ok",
            backend: BACKEND_NAME,
            entries: self.players.len(),
            latency_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    fn save(&self, players: &HashMap<String, StoredRankingEntry>) -> Result<(), RankingError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = RankingStoreFile {
            version: STORE_VERSION,
            players: players.clone(),
        };
        let text = serde_json::to_string_pretty(&payload)?;
        fs::write(&self.file_path, text)?;
        Ok(())
    }
}

fn load_players(path: &Path) -> Result<HashMap<String, StoredRankingEntry>, RankingError> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(error) => return Err(RankingError::Io(error)),
    };
    let parsed: RankingStoreFileRaw = serde_json::from_str(&text)?;
    if parsed.version != STORE_VERSION {
        return Err(RankingError::UnsupportedVersion(parsed.version));
    }

    let mut sanitized = HashMap::<String, StoredRankingEntry>::new();
    for (player_key, raw_value) in parsed.players {
        let value: StoredRankingEntry = match serde_json::from_value(raw_value) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(
                    entry = %player_key,
                    path = %path.display(),
                    %error,
                    "skipping unreadable ranking entry"
                );
                continue;
            }
        };
        let key = ranking_key(&value.name);
        if key.is_empty() || value.level == 0 {
            warn!(entry = %player_key, path = %path.display(), "skipping invalid ranking entry");
            continue;
        }

        match sanitized.get_mut(&key) {
            Some(current) => {
                current.score = current.score.max(value.score);
                current.level = current.level.max(value.level);
                if value.date > current.date {
                    current.date = value.date;
                }
            }
            None => {
                sanitized.insert(
                    key.clone(),
                    StoredRankingEntry {
                        name: key,
                        score: value.score,
                        level: value.level,
                        date: value.date,
                    },
                );
            }
        }
    }

    Ok(sanitized)
}

fn ranking_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Explicitly constructed handle to the ranking backend, owned by the process entry point.
#[derive(Clone)]
pub enum RankingService {
    Ready(Arc<Mutex<RankingStore>>),
    Unavailable(String),
}

impl RankingService {
    pub fn connect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match RankingStore::open(path.clone()) {
            Ok(store) => {
                info!(path = %path.display(), entries = store.len(), "ranking store opened");
                Self::Ready(Arc::new(Mutex::new(store)))
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ranking store unavailable");
                Self::Unavailable(error.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    fn store(&self) -> Result<&Arc<Mutex<RankingStore>>, RankingError> {
        match self {
            Self::Ready(store) => Ok(store),
            Self::Unavailable(reason) => Err(RankingError::Unavailable(reason.clone())),
        }
    }

    pub async fn submit(&self, submission: ScoreSubmission) -> Result<RankingEntry, RankingError> {
        let store = self.store()?;
        let mut store = store.lock().await;
        store.submit(&submission)
    }

    pub async fn top(&self, limit: Option<usize>) -> Result<Vec<RankingEntry>, RankingError> {
        let store = self.store()?;
        let store = store.lock().await;
        Ok(store.top(limit))
    }

    pub async fn diagnostics(&self) -> Result<RankingDiagnostics, RankingError> {
        let store = self.store()?;
        let store = store.lock().await;
        store.diagnostics()
    }
}
