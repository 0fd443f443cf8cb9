use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// A logged-in client: bearer token, absolute expiry and the opaque login
/// response it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at_ms: i64,
    pub user_data: Option<Value>,
}

impl Session {
    pub fn new(token: impl Into<String>, expires_at_ms: i64, user_data: Option<Value>) -> Self {
        Self {
            token: token.into(),
            expires_at_ms,
            user_data,
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Raw storage slots, keyed the same way the web admin keeps them in
/// local storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "tokenExpiration", default, skip_serializing_if = "Option::is_none")]
    pub token_expiration: Option<String>,
    #[serde(rename = "userData", default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

impl SessionSlots {
    fn from_session(session: &Session) -> Result<Self> {
        let user_data = match session.user_data {
            Some(ref value) => Some(serde_json::to_string(value)?),
            None => None,
        };
        Ok(Self {
            token: Some(session.token.clone()),
            token_expiration: Some(session.expires_at_ms.to_string()),
            user_data,
        })
    }

    fn to_session(&self) -> Result<Option<Session>> {
        let token = match self.token.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(None),
        };
        let raw_expiry = match self.token_expiration.as_deref() {
            Some(e) => e,
            None => return Ok(None),
        };
        let expires_at_ms: i64 = raw_expiry
            .trim()
            .parse()
            .map_err(|_| anyhow!("Corrupt tokenExpiration slot: {:?}", raw_expiry))?;

        let user_data = self.user_data.as_deref().and_then(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| debug!(error = %e, "Ignoring unparseable userData slot"))
                .ok()
        });

        Ok(Some(Session {
            token: token.to_string(),
            expires_at_ms,
            user_data,
        }))
    }
}

/// Durable single-slot session persistence.
///
/// Backends implement raw slot load/save; `write`, `read` and `clear` are
/// shared so every backend honours the same contract. A `write` replaces
/// all three slots in one `save_slots` call.
pub trait SessionStore: Send + Sync {
    fn load_slots(&self) -> Result<SessionSlots>;

    fn save_slots(&self, slots: &SessionSlots) -> Result<()>;

    /// Persist token, expiry and user data together.
    fn write(&self, session: &Session) -> Result<()> {
        let slots = SessionSlots::from_session(session)?;
        self.save_slots(&slots)
    }

    /// Load the session, `None` if token or expiry is absent.
    fn read(&self) -> Result<Option<Session>> {
        self.load_slots()?.to_session()
    }

    /// Remove token and expiry. User data stays behind.
    /// Unreadable slots are discarded entirely.
    fn clear(&self) -> Result<()> {
        let mut slots = match self.load_slots() {
            Ok(slots) => slots,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                return self.save_slots(&SessionSlots::default());
            }
        };
        if slots.token.is_none() && slots.token_expiration.is_none() {
            return Ok(());
        }
        slots.token = None;
        slots.token_expiration = None;
        self.save_slots(&slots)
    }
}

/// In-process store, used by tests and short-lived tooling.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: Mutex<SessionSlots>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: SessionSlots) -> Self {
        Self {
            slots: Mutex::new(slots),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_slots(&self) -> Result<SessionSlots> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        Ok(slots.clone())
    }

    fn save_slots(&self, slots: &SessionSlots) -> Result<()> {
        let mut current = self
            .slots
            .lock()
            .map_err(|_| anyhow!("Session store lock poisoned"))?;
        *current = slots.clone();
        Ok(())
    }
}

/// JSON file store in the data directory, shared by every process of the
/// same installation.
pub struct FileSessionStore {
    data_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn load_slots(&self) -> Result<SessionSlots> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(SessionSlots::default());
        }
        let contents = fs::read_to_string(&path).context("Failed to read session file")?;
        let slots = serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(slots)
    }

    /// Write to a uniquely named temp file in the data directory and rename
    /// it over the target, so readers never observe a token without its
    /// expiry and concurrent writers never share a temp file.
    fn save_slots(&self, slots: &SessionSlots) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("Failed to create data directory")?;

        let contents = serde_json::to_string_pretty(slots)?;
        let mut file = NamedTempFile::new_in(&self.data_dir)
            .context("Failed to create temp session file")?;
        #[cfg(unix)]
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600))?;
        file.write_all(contents.as_bytes())
            .context("Failed to write session file")?;
        file.as_file().sync_all()?;

        file.persist(self.session_path())
            .map_err(|e| e.error)
            .context("Failed to replace session file")?;
        Ok(())
    }
}
