//! Support for client configuration options

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

/// Base URL of the task service.
/// Feel free to override it before building a [`Client`](crate::client::Client) from [`api_url`].
pub static API_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("http://127.0.0.1:5000".to_string())));

/// Where the session (token and username) is persisted between runs.
pub static SESSION_FILE: Lazy<Arc<Mutex<PathBuf>>> = Lazy::new(|| Arc::new(Mutex::new(default_session_file())));

/// Storage key of the authentication token
pub const TOKEN_KEY: &str = "authToken";
/// Storage key of the logged-in username
pub const USERNAME_KEY: &str = "currentUsername";

/// Text that turns a task into a group header
pub const GROUP_MARKER: &str = "##";

/// Current value of [`API_URL`]
pub fn api_url() -> String {
    match API_URL.lock() {
        Ok(url) => url.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Current value of [`SESSION_FILE`]
pub fn session_file() -> PathBuf {
    match SESSION_FILE.lock() {
        Ok(path) => path.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn default_session_file() -> PathBuf {
    let dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));

    match dir {
        Some(dir) => dir.join("taskgrid").join("session.json"),
        None => PathBuf::from("taskgrid-session.json"),
    }
}
