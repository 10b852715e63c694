//! Session resolution and the name/password onboarding flow.
//!
//! The locally persisted participant id is the only durable client-side
//! state. It is cleared whenever it stops matching a remote profile so the
//! app can never get stuck behind a stale identifier.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use ruah_shared::constants::SESSION_FILE_NAME;
use ruah_shared::ParticipantId;
use ruah_store::{Profile, RemoteStore};

use crate::error::{ClientError, Result};

/// Durable holder of the current participant id.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Place the session file in the platform data directory.
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "ruah", "ruah-ignis").ok_or(ClientError::NoDataDir)?;
        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(Self::open_at(&data_dir.join(SESSION_FILE_NAME)))
    }

    /// Use an explicit path. Useful for tests and custom layouts.
    pub fn open_at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// The stored participant id, if a valid one is present.
    pub fn load(&self) -> Option<ParticipantId> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        ParticipantId::parse(raw.trim()).ok()
    }

    pub fn save(&self, id: ParticipantId) -> Result<()> {
        std::fs::write(&self.path, id.to_string())?;
        Ok(())
    }

    /// Remove the stored id. Missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Resolve the current participant from the persisted id.
///
/// Returns `None` when there is no stored id (fresh install) or when the
/// stored id no longer matches a profile; in the latter case the id is
/// cleared first.
pub async fn resolve_current_user<S: RemoteStore>(
    store: &S,
    session: &SessionFile,
) -> Result<Option<Profile>> {
    let Some(id) = session.load() else {
        return Ok(None);
    };

    match store.profile_by_id(id).await? {
        Some(profile) => Ok(Some(profile)),
        None => {
            tracing::warn!(participant = %id.short(), "stored session id has no profile, clearing");
            session.clear()?;
            Ok(None)
        }
    }
}

/// Create-or-verify: the existence of `name` (case-insensitive) decides
/// whether this registers a new profile or checks the password of an
/// existing one. On success the id is persisted locally.
pub async fn register_or_login<S: RemoteStore>(
    store: &S,
    session: &SessionFile,
    name: &str,
    password: &str,
) -> Result<Profile> {
    let name = name.trim();
    let password = password.trim();
    if name.is_empty() {
        return Err(ClientError::Validation("name must not be empty".into()));
    }
    if password.is_empty() {
        return Err(ClientError::Validation("password must not be empty".into()));
    }

    let profile = match store.profile_by_name(name).await? {
        Some(_) => store
            .profile_by_credentials(name, password)
            .await?
            .ok_or(ClientError::BadCredentials)?,
        None => match store.create_profile(name, password).await {
            Ok(profile) => {
                tracing::info!(participant = %profile.id.short(), "registered new profile");
                profile
            }
            // Lost a registration race: someone claimed the name first.
            Err(ruah_store::StoreError::Conflict) => store
                .profile_by_credentials(name, password)
                .await?
                .ok_or(ClientError::BadCredentials)?,
            Err(e) => return Err(e.into()),
        },
    };

    session.save(profile.id)?;
    Ok(profile)
}
