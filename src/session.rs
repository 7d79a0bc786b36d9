use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::ApiGateway;
use crate::error::FetchError;
use crate::models::User;

const SESSION_FILE: &str = "session.json";

/// The one durable datum the client keeps: the last selected semester id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    last_sem_id: Option<i64>,
}

/// Durable session file under the configured data dir. Reads and writes are
/// best-effort; losing the remembered semester only costs one extra prompt,
/// so failures log a warning and never surface.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn last_semester(&self) -> Option<i64> {
        if !self.path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<StoredSession>(&content) {
            Ok(stored) => stored.last_sem_id,
            Err(e) => {
                log::warn!("ignoring unreadable session file: {}", e);
                None
            }
        }
    }

    pub fn remember_semester(&self, sem_id: i64) {
        self.write(StoredSession {
            last_sem_id: Some(sem_id),
        });
    }

    pub fn clear(&self) {
        self.write(StoredSession::default());
    }

    fn write(&self, stored: StoredSession) {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                log::warn!("failed to create session dir: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(&stored) {
            Ok(content) => {
                if let Err(e) = std::fs::write(&self.path, content) {
                    log::warn!("failed to persist session: {}", e);
                }
            }
            Err(e) => log::warn!("failed to encode session: {}", e),
        }
    }
}

/// Logged-in client session: the resolved user plus the durable store.
/// Owned behind an `Arc` by whoever drives the synchronizer; there is no
/// ambient global login state.
#[derive(Debug)]
pub struct Session {
    user: User,
    store: SessionStore,
}

impl Session {
    /// Resolves (or creates) the user with the collaborator and binds the
    /// durable store to the session.
    pub async fn login<G: ApiGateway>(
        gateway: &G,
        store: SessionStore,
        user_name: &str,
    ) -> Result<Self, FetchError> {
        let user = gateway.resolve_user(user_name).await?;
        log::info!("logged in as {} (user {})", user.user_name, user.user_id);
        Ok(Self { user, store })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> i64 {
        self.user.user_id
    }

    /// Semester to restore on startup, if one was remembered.
    pub fn last_semester(&self) -> Option<i64> {
        self.store.last_semester()
    }

    pub fn remember_semester(&self, sem_id: i64) {
        self.store.remember_semester(sem_id);
    }

    /// Drops the remembered semester. Called when the active semester is
    /// deleted and nothing remains to fall back to.
    pub fn forget_semester(&self) {
        self.store.clear();
    }

    /// Logout path; the caller is responsible for discarding its snapshot.
    pub fn teardown(&self) {
        self.forget_semester();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_and_clears_the_semester() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path());
        assert_eq!(store.last_semester(), None);

        store.remember_semester(42);
        assert_eq!(store.last_semester(), Some(42));

        store.clear();
        assert_eq!(store.last_semester(), None);
    }

    #[test]
    fn creates_missing_data_dir_on_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let store = SessionStore::new(&nested);
        store.remember_semester(7);
        assert_eq!(store.last_semester(), Some(7));
    }

    #[test]
    fn unreadable_session_file_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path());
        std::fs::write(dir.path().join(SESSION_FILE), "not json").expect("write");
        assert_eq!(store.last_semester(), None);
    }

    #[test]
    fn session_file_uses_the_wire_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path());
        store.remember_semester(3);
        let content =
            std::fs::read_to_string(dir.path().join(SESSION_FILE)).expect("session file");
        let value: serde_json::Value = serde_json::from_str(&content).expect("json");
        assert_eq!(value["lastSemId"], 3);
    }
}
