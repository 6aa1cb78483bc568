//! Authentication session, and where it is persisted between runs

use std::error::Error;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Who is logged in.
///
/// Serialized under the fixed storage keys [`TOKEN_KEY`](crate::config::TOKEN_KEY) and [`USERNAME_KEY`](crate::config::USERNAME_KEY).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "authToken", default)]
    pub token: Option<String>,
    #[serde(rename = "currentUsername", default)]
    pub username: Option<String>,
}

impl Session {
    pub fn new(token: String, username: String) -> Self {
        Self { token: Some(token), username: Some(username) }
    }

    /// Having both a token and a username is what it takes to try the authenticated views
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.username.is_some()
    }

    pub fn token(&self) -> Option<&str>    { self.token.as_deref() }
    pub fn username(&self) -> Option<&str> { self.username.as_deref() }
}


/// Answer to a login or register request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AuthReply {
    /// The session this reply opens, if any.
    /// When the server omits the username, `fallback_username` (the one that was typed in) is used
    pub fn session(&self, fallback_username: &str) -> Option<Session> {
        let token = self.token.clone()?;
        let username = self.username.clone().unwrap_or_else(|| fallback_username.to_string());
        Some(Session::new(token, username))
    }
}


/// Persists a [`Session`] to a JSON file
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStore {
    backing_file: PathBuf,
}

impl SessionStore {
    pub fn new(path: &Path) -> Self {
        Self { backing_file: PathBuf::from(path) }
    }

    /// A store at the configured [`SESSION_FILE`](crate::config::SESSION_FILE) location
    pub fn from_config() -> Self {
        Self::new(&crate::config::session_file())
    }

    pub fn path(&self) -> &Path {
        &self.backing_file
    }

    /// Read the persisted session.
    /// A missing or unreadable file yields an empty session
    pub fn load(&self) -> Session {
        let path = &self.backing_file;
        let file = match std::fs::File::open(path) {
            Err(_) => {
                log::debug!("No session stored at {:?}", path);
                return Session::default();
            },
            Ok(f) => f,
        };

        match serde_json::from_reader(file) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("Invalid session file {:?}: {}. Ignoring it", path, err);
                Session::default()
            },
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), Box<dyn Error>> {
        let path = &self.backing_file;
        if let Some(parent) = path.parent() {
            if parent.as_os_str().is_empty() == false {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = match std::fs::File::create(path) {
            Err(err) => {
                return Err(format!("Unable to save session to {:?}: {}", path, err).into());
            },
            Ok(f) => f,
        };
        serde_json::to_writer(file, session)?;
        log::debug!("Session saved to {:?}", path);
        Ok(())
    }

    /// Erase the persisted session. Erasing a session that does not exist is not an error
    pub fn clear(&self) -> Result<(), Box<dyn Error>> {
        match std::fs::remove_file(&self.backing_file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!("Unable to erase session {:?}: {}", self.backing_file, err).into()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> SessionStore {
        let name = format!("taskgrid-session-{}.json", uuid::Uuid::new_v4().to_hyphenated());
        SessionStore::new(&std::env::temp_dir().join(name))
    }

    #[test]
    fn serde_session() {
        let store = scratch_store();
        assert_eq!(store.load(), Session::default());

        let session = Session::new("abc-123".to_string(), "alice".to_string());
        store.save(&session).unwrap();
        assert_eq!(store.load(), session);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(&format!("\"{}\":\"abc-123\"", crate::config::TOKEN_KEY)));
        assert!(raw.contains(&format!("\"{}\":\"alice\"", crate::config::USERNAME_KEY)));

        store.clear().unwrap();
        assert_eq!(store.load(), Session::default());
        store.clear().unwrap();
    }

    #[test]
    fn half_a_session_is_not_enough() {
        let store = scratch_store();
        std::fs::write(store.path(), r#"{"authToken": "abc-123"}"#).unwrap();
        let session = store.load();
        assert_eq!(session.token(), Some("abc-123"));
        assert!(session.is_authenticated() == false);

        std::fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load(), Session::default());
        store.clear().unwrap();
    }

    #[test]
    fn replies_without_token_open_no_session() {
        let reply = AuthReply { message: "User registered successfully".to_string(), token: None, username: None };
        assert_eq!(reply.session("bob"), None);

        let reply = AuthReply { message: "Login successful".to_string(), token: Some("t".to_string()), username: None };
        assert_eq!(reply.session("bob"), Some(Session::new("t".to_string(), "bob".to_string())));
    }
}
