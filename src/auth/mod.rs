//! Authentication module: the local session gate.
//!
//! This module provides:
//! - `SessionStore`: single-slot session persistence (file, keychain, memory)
//! - `AuthGate`: the "is the session valid right now" predicate
//! - `LoginFlow`: credentials to token to stored session
//! - `legacy_credential_transform`: the password digest the login API expects
//!
//! Sessions expire 5 minutes after issuance, regardless of activity.

pub mod clock;
pub mod digest;
pub mod gate;
pub mod keychain;
pub mod login;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use digest::legacy_credential_transform;
pub use gate::{AuthGate, GateStatus};
pub use keychain::KeyringSessionStore;
pub use login::{LoginError, LoginFlow, INVALID_CREDENTIALS_MESSAGE, SESSION_TTL_MINUTES};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionSlots, SessionStore};
