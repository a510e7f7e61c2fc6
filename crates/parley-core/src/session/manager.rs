//! Session history with an in-memory cache and optional JSONL persistence.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{Message, Session};
use crate::utils;

// ─────────────────────────────────────────────
// Session metadata (first line of JSONL)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct SessionMetadata {
    #[serde(rename = "_type")]
    record_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

// ─────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────

/// Keeps the turn history of every conversation, keyed by session id.
///
/// Every update is applied under one write lock, so concurrent writers never
/// lose turns. Two writers on the same key may still interleave their turns;
/// callers that need strict turn order serialize per session.
pub struct SessionManager {
    /// Directory for `.jsonl` files; `None` keeps history in memory only.
    sessions_dir: Option<PathBuf>,
    cache: RwLock<HashMap<String, Session>>,
    /// Taken before the cache lock is released so files are written in update order.
    disk: Mutex<()>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionManager {
    /// History that lives only as long as this manager.
    pub fn in_memory() -> Self {
        SessionManager {
            sessions_dir: None,
            cache: RwLock::new(HashMap::new()),
            disk: Mutex::new(()),
        }
    }

    /// History mirrored to JSONL files.
    ///
    /// `sessions_dir` defaults to `~/.parley/sessions/` if `None`.
    /// The directory is created if it doesn't exist.
    pub fn persistent(sessions_dir: Option<PathBuf>) -> std::io::Result<Self> {
        let dir = sessions_dir.unwrap_or_else(utils::get_sessions_path);
        std::fs::create_dir_all(&dir)?;

        Ok(SessionManager {
            sessions_dir: Some(dir),
            cache: RwLock::new(HashMap::new()),
            disk: Mutex::new(()),
        })
    }

    /// Whether sessions are written to disk.
    pub fn is_persistent(&self) -> bool {
        self.sessions_dir.is_some()
    }

    /// Get an existing session or create a new one.
    ///
    /// 1. Check in-memory cache
    /// 2. Try to load from disk
    /// 3. Create new empty session
    pub fn get_or_create(&self, key: &str) -> Session {
        {
            let cache = self.cache.read().unwrap();
            if let Some(session) = cache.get(key) {
                return session.clone();
            }
        }

        let mut cache = self.cache.write().unwrap();
        self.entry(&mut cache, key).clone()
    }

    /// Append a message to a session.
    pub fn add_message(&self, key: &str, message: Message) {
        self.add_messages(key, [message]);
    }

    /// Append several messages to a session as one update.
    pub fn add_messages(&self, key: &str, messages: impl IntoIterator<Item = Message>) {
        self.update(key, |session| session.messages.extend(messages));
    }

    /// Get the last `max_messages` from a session's history.
    pub fn get_history(&self, key: &str, max_messages: usize) -> Vec<Message> {
        let session = self.get_or_create(key);
        let len = session.messages.len();
        if len <= max_messages {
            session.messages
        } else {
            session.messages[len - max_messages..].to_vec()
        }
    }

    /// Clear all messages in a session (reset conversation).
    pub fn clear(&self, key: &str) {
        self.update(key, |session| session.messages.clear());
    }

    /// Delete a session entirely (from cache and disk).
    ///
    /// Returns `true` if the session existed.
    pub fn delete(&self, key: &str) -> bool {
        let cached = {
            let mut cache = self.cache.write().unwrap();
            cache.remove(key).is_some()
        };

        let Some(path) = self.session_path(key) else {
            return cached;
        };
        if !path.exists() {
            return cached;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted session file: {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to delete session file: {}", e);
                cached
            }
        }
    }

    /// List known sessions, newest first.
    ///
    /// Persistent managers read the metadata lines on disk; in-memory managers
    /// report their cache.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut summaries = match &self.sessions_dir {
            Some(dir) => list_from_dir(dir),
            None => {
                let cache = self.cache.read().unwrap();
                cache
                    .values()
                    .map(|s| SessionSummary {
                        key: s.key.clone(),
                        created_at: s.created_at,
                        updated_at: s.updated_at,
                        messages: s.messages.len(),
                        path: None,
                    })
                    .collect()
            }
        };

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// The cached session for `key`, loading or creating it first.
    ///
    /// Runs under the caller's write guard so a concurrent writer cannot
    /// replace the entry between lookup and insert.
    fn entry<'a>(&self, cache: &'a mut HashMap<String, Session>, key: &str) -> &'a mut Session {
        match cache.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(self.load_from_disk(key).unwrap_or_else(|| Session::new(key)))
            }
        }
    }

    /// Apply `change` to the session under a single write lock, then persist.
    fn update(&self, key: &str, change: impl FnOnce(&mut Session)) {
        let (snapshot, _disk) = {
            let mut cache = self.cache.write().unwrap();
            let session = self.entry(&mut cache, key);
            change(session);
            session.updated_at = Utc::now();

            if !self.is_persistent() {
                return;
            }
            (session.clone(), self.disk.lock().unwrap())
        };

        if let Err(e) = self.save_to_disk(&snapshot) {
            warn!("Failed to persist session {}: {}", snapshot.key, e);
        }
    }

    fn session_path(&self, key: &str) -> Option<PathBuf> {
        let dir = self.sessions_dir.as_ref()?;
        Some(dir.join(format!("{}.jsonl", utils::encode_filename(key))))
    }

    fn load_from_disk(&self, key: &str) -> Option<Session> {
        let path = self.session_path(key)?;
        if !path.exists() {
            return None;
        }

        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to open session file {}: {}", path.display(), e);
                return None;
            }
        };

        let mut session = Session::new(key);
        for line in std::io::BufReader::new(file).lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }

            if let Ok(meta) = serde_json::from_str::<SessionMetadata>(&line) {
                if meta.record_type == "metadata" {
                    session.created_at = meta.created_at;
                    session.updated_at = meta.updated_at;
                    session.metadata = meta.metadata;
                    continue;
                }
            }

            match serde_json::from_str::<Message>(&line) {
                Ok(msg) => session.messages.push(msg),
                Err(e) => warn!(session = key, error = %e, "skipping unreadable history line"),
            }
        }

        debug!(
            "Loaded session '{}' with {} messages from disk",
            key,
            session.messages.len()
        );
        Some(session)
    }

    /// Rewrite the session file. No-op for in-memory managers.
    fn save_to_disk(&self, session: &Session) -> std::io::Result<()> {
        let Some(path) = self.session_path(&session.key) else {
            return Ok(());
        };

        let mut file = std::fs::File::create(&path)?;

        let meta = SessionMetadata {
            record_type: "metadata".to_string(),
            created_at: session.created_at,
            updated_at: session.updated_at,
            metadata: session.metadata.clone(),
        };
        writeln!(file, "{}", serde_json::to_string(&meta)?)?;

        for msg in &session.messages {
            writeln!(file, "{}", serde_json::to_string(msg)?)?;
        }

        debug!(
            "Saved session '{}' ({} messages) to {}",
            session.key,
            session.messages.len(),
            path.display()
        );
        Ok(())
    }
}

fn list_from_dir(dir: &std::path::Path) -> Vec<SessionSummary> {
    let mut summaries = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read sessions directory: {}", e);
            return summaries;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "jsonl") {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let Some(Ok(meta)) = lines.next().map(serde_json::from_str::<SessionMetadata>) else {
            continue;
        };

        let Some(key) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(utils::decode_filename)
        else {
            continue;
        };

        summaries.push(SessionSummary {
            key,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
            messages: lines.count(),
            path: Some(path.clone()),
        });
    }

    summaries
}

/// Summary of a session for listing purposes.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    /// Session key, decoded from the file name for persistent managers.
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of stored turns.
    pub messages: usize,
    /// Path to the JSONL file, for persistent managers.
    pub path: Option<PathBuf>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
