//! Session store trait.

use std::fmt;

/// The three entries that make up a persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    User,
}

impl SessionKey {
    /// Every session key, in persistence order.
    pub const ALL: [SessionKey; 3] = [
        SessionKey::AccessToken,
        SessionKey::RefreshToken,
        SessionKey::User,
    ];

    /// The flat key under which the entry is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::AccessToken => "access_token",
            SessionKey::RefreshToken => "refresh_token",
            SessionKey::User => "user",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value persistence for the session entries.
///
/// Implementations must give read-your-writes within one process; nothing
/// else is assumed about durability. Methods never fail: a store that
/// persists somewhere fallible logs the failure and keeps serving its
/// in-process view.
pub trait SessionStore: Send + Sync {
    /// Read an entry.
    fn get(&self, key: SessionKey) -> Option<String>;

    /// Write an entry.
    fn set(&self, key: SessionKey, value: &str);

    /// Remove an entry. Removing a missing entry is a no-op.
    fn remove(&self, key: SessionKey);

    /// Write several entries at once.
    fn set_many(&self, entries: &[(SessionKey, &str)]) {
        for (key, value) in entries {
            self.set(*key, value);
        }
    }

    /// Remove every session entry.
    fn clear(&self) {
        for key in SessionKey::ALL {
            self.remove(key);
        }
    }
}
