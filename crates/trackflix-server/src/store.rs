use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use trackflix_models::{UserDocument, WatchedEntry};
use tracing::{debug, info};

/// Canonical form of an email used for lookups, storage and ownership checks
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already exists")]
    EmailExists,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt user document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One JSON document per user, named after the URL-encoded email.
///
/// Read-modify-write cycles hold `write_lock`, so concurrent appends for the
/// same user never lose an update. Files are replaced through a temp file and
/// a rename.
#[derive(Clone)]
pub struct UserStore {
    users_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl UserStore {
    pub fn new(users_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&users_dir)?;
        info!("User documents stored in {}", users_dir.display());
        Ok(Self {
            users_dir,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn users_dir(&self) -> &Path {
        &self.users_dir
    }

    fn document_path(&self, email: &str) -> PathBuf {
        self.users_dir
            .join(format!("{}.json", urlencoding::encode(normalize_email(email))))
    }

    pub async fn find(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        let path = self.document_path(email);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document for {}", email);
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    async fn write(&self, document: &UserDocument) -> Result<(), StoreError> {
        let path = self.document_path(&document.email);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(document).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;

        tokio::fs::write(&tmp, content)
            .await
            .map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    /// Create a user; `password_hash` must already be hashed
    pub async fn create(&self, name: &str, email: &str, password_hash: String) -> Result<UserDocument, StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.find(email).await?.is_some() {
            return Err(StoreError::EmailExists);
        }

        let document = UserDocument {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: normalize_email(email).to_string(),
            password: password_hash,
            created_at: Utc::now(),
            watched_movies: Vec::new(),
        };
        self.write(&document).await?;
        info!(user_id = %document.id, "Created user {}", email);
        Ok(document)
    }

    /// Append `movie` unless its id is already present. `None` for an unknown user.
    pub async fn add_movie(&self, email: &str, movie: WatchedEntry) -> Result<Option<Vec<WatchedEntry>>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut document) = self.find(email).await? else {
            return Ok(None);
        };

        if document.has_movie(&movie.imdb_id) {
            debug!(imdb_id = %movie.imdb_id, "Movie already watched, keeping existing entry");
            return Ok(Some(document.watched_movies));
        }

        document.watched_movies.push(movie);
        self.write(&document).await?;
        Ok(Some(document.watched_movies))
    }

    /// Drop every entry with `imdb_id`. `None` for an unknown user.
    pub async fn remove_movie(&self, email: &str, imdb_id: &str) -> Result<Option<Vec<WatchedEntry>>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut document) = self.find(email).await? else {
            return Ok(None);
        };

        let before = document.watched_movies.len();
        document.watched_movies.retain(|m| m.imdb_id != imdb_id);
        if document.watched_movies.len() != before {
            self.write(&document).await?;
        }
        Ok(Some(document.watched_movies))
    }
}
