use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use toml;

const USER_EMAIL: &str = "user_email";
const SESSION_COOKIE: &str = "session_cookie";
const LOGGED_IN_AT: &str = "logged_in_at";

#[derive(Debug, Serialize, Deserialize, Default)]
struct SessionData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// On-disk cache of "who is logged in".
///
/// Holds the user's email and the opaque cookie the server issued at login.
/// The email is a display/routing hint only; the server-held session behind
/// the cookie is what authorizes mutations.
pub struct SessionCache {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl SessionCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: HashMap::new(),
        }
    }

    /// Create and immediately load from `path`
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut cache = Self::new(path);
        cache.load()?;
        Ok(cache)
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let data: SessionData = toml::from_str(&content)?;
            self.values = data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = SessionData {
            data: self.values.clone(),
        };
        let content = toml::to_string_pretty(&data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn user_email(&self) -> Option<&String> {
        self.get(USER_EMAIL).filter(|e| !e.is_empty())
    }

    pub fn session_cookie(&self) -> Option<&String> {
        self.get(SESSION_COOKIE).filter(|c| !c.is_empty())
    }

    pub fn logged_in_at(&self) -> Option<DateTime<Utc>> {
        self.get(LOGGED_IN_AT)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Record a successful login
    pub fn set_login(&mut self, email: String, cookie: Option<String>) {
        self.set(USER_EMAIL.to_string(), email);
        match cookie {
            Some(cookie) => self.set(SESSION_COOKIE.to_string(), cookie),
            None => self.remove(SESSION_COOKIE),
        }
        self.set(LOGGED_IN_AT.to_string(), Utc::now().to_rfc3339());
    }

    /// Forget everything about the current login
    pub fn clear(&mut self) {
        self.remove(USER_EMAIL);
        self.remove(SESSION_COOKIE);
        self.remove(LOGGED_IN_AT);
    }
}
