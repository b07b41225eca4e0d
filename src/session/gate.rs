/// Session provider and the per-screen login gate.
///
/// All session reads and writes go through one `SessionContext`; screens
/// never touch the store directly. Stored values are trusted as read:
/// only the exact flag `"true"` counts as logged in.

use tracing::{info, warn};

use super::store::{KeyValueStore, StorageError, KEY_EMAIL, KEY_LOGGED_IN, KEY_ROLE, KEY_XP, SESSION_KEYS};
use crate::routes::Route;

pub const PREMIUM_ROLE: &str = "premium";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub is_logged_in: bool,
    pub role: Option<String>,
    pub email: Option<String>,
}

impl Session {
    pub fn is_premium(&self) -> bool {
        self.role.as_deref() == Some(PREMIUM_ROLE)
    }
}

pub struct SessionContext<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        SessionContext { store }
    }

    pub fn get_session(&self) -> Session {
        Session {
            is_logged_in: self.store.get(KEY_LOGGED_IN).as_deref() == Some("true"),
            role: self.store.get(KEY_ROLE),
            email: self.store.get(KEY_EMAIL),
        }
    }

    pub fn set_session(&mut self, session: &Session) -> Result<(), StorageError> {
        if session.is_logged_in {
            self.store.set(KEY_LOGGED_IN, "true")?;
        } else {
            self.store.remove(KEY_LOGGED_IN)?;
        }
        put(&mut self.store, KEY_ROLE, session.role.as_deref())?;
        put(&mut self.store, KEY_EMAIL, session.email.as_deref())
    }

    pub fn login(&mut self, email: &str, role: &str) -> Result<Session, StorageError> {
        let session = Session {
            is_logged_in: true,
            role: Some(role.to_string()),
            email: Some(email.trim().to_string()),
        };
        self.set_session(&session)?;
        info!(role, "logged in");
        Ok(session)
    }

    /// Clear every session key and send the user home. A failed write is
    /// logged; the navigation still happens.
    pub fn logout(&mut self) -> Route {
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "logout could not clear key");
            }
        }
        info!("logged out");
        Route::Root
    }

    /// Accumulated experience points; unparseable values read as 0.
    pub fn xp(&self) -> u32 {
        self.store.get(KEY_XP).and_then(|v| v.trim().parse().ok()).unwrap_or(0)
    }

    pub fn award_xp(&mut self, points: u32) -> Result<u32, StorageError> {
        let total = self.xp().saturating_add(points);
        self.store.set(KEY_XP, &total.to_string())?;
        Ok(total)
    }
}

fn put<S: KeyValueStore>(store: &mut S, key: &str, value: Option<&str>) -> Result<(), StorageError> {
    match value {
        Some(v) => store.set(key, v),
        None => store.remove(key),
    }
}

// ══════════════════════════════════════════════════════════════
// Gate
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateView {
    /// Render nothing (still loading, or an auth screen).
    Nothing,
    LoginPrompt,
    Content,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionGate {
    loading: bool,
    is_logged_in: bool,
}

impl SessionGate {
    /// A freshly mounted gate has not read storage yet.
    pub fn mount() -> Self {
        SessionGate { loading: true, is_logged_in: false }
    }

    /// Read the flag. Called on the first frame after mount.
    pub fn resolve<S: KeyValueStore>(&mut self, ctx: &SessionContext<S>) {
        self.is_logged_in = ctx.get_session().is_logged_in;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn view(&self, route: &Route) -> GateView {
        if self.loading || route.is_auth() {
            GateView::Nothing
        } else if self.is_logged_in {
            GateView::Content
        } else {
            GateView::LoginPrompt
        }
    }
}
