use anyhow::{Context, Result};
use keyring::Entry;

use super::session::{SessionSlots, SessionStore};

const SERVICE_NAME: &str = "shopadmin";

/// Keychain account holding the serialized session slots.
const SESSION_ACCOUNT: &str = "session";

/// Session store backed by the OS keychain. All slots live in a single
/// entry, so a write replaces them together.
pub struct KeyringSessionStore {
    entry: Entry,
}

impl KeyringSessionStore {
    pub fn new() -> Result<Self> {
        let entry =
            Entry::new(SERVICE_NAME, SESSION_ACCOUNT).context("Failed to create keyring entry")?;
        Ok(Self::with_entry(entry))
    }

    fn with_entry(entry: Entry) -> Self {
        Self { entry }
    }
}

impl SessionStore for KeyringSessionStore {
    fn load_slots(&self) -> Result<SessionSlots> {
        match self.entry.get_password() {
            Ok(json) => serde_json::from_str(&json).context("Failed to parse keychain session"),
            Err(keyring::Error::NoEntry) => Ok(SessionSlots::default()),
            Err(e) => Err(e).context("Failed to read session from keychain"),
        }
    }

    fn save_slots(&self, slots: &SessionSlots) -> Result<()> {
        if *slots == SessionSlots::default() {
            return match self.entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e).context("Failed to delete session from keychain"),
            };
        }
        let json = serde_json::to_string(slots)?;
        self.entry
            .set_password(&json)
            .context("Failed to store session in keychain")?;
        Ok(())
    }
}
