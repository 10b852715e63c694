//! Profile directory: the roster, display lookups, the one-time secret
//! friend draw, and avatar updates.

use base64::Engine;
use serde::Serialize;

use ruah_shared::ParticipantId;
use ruah_store::{Profile, RemoteStore};

use crate::error::{ClientError, Result};

/// Display metadata for any participant id.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub name: String,
    pub avatar_url: Option<String>,
}

/// All participants, name ascending. Always the latest remote state.
pub async fn list_all<S: RemoteStore>(store: &S) -> Result<Vec<Profile>> {
    Ok(store.list_profiles().await?)
}

/// Roster for the draw: everyone except the caller.
pub async fn others<S: RemoteStore>(store: &S, me: ParticipantId) -> Result<Vec<Profile>> {
    let mut profiles = store.list_profiles().await?;
    profiles.retain(|p| p.id != me);
    Ok(profiles)
}

/// Name and avatar for a participant, if the id is known.
pub async fn display_info<S: RemoteStore>(
    store: &S,
    id: ParticipantId,
) -> Result<Option<DisplayInfo>> {
    Ok(store.profile_by_id(id).await?.map(|p| DisplayInfo {
        name: p.name,
        avatar_url: p.avatar_url,
    }))
}

/// Record the one-time secret friend draw.
///
/// The assignment is write-once: a target that is already set (locally or
/// on the freshly fetched remote row) rejects the call. Self-selection and
/// unknown targets are rejected before any write.
pub async fn choose_target<S: RemoteStore>(
    store: &S,
    me: ParticipantId,
    target: ParticipantId,
) -> Result<Profile> {
    if target == me {
        return Err(ClientError::Validation(
            "cannot draw yourself as secret friend".into(),
        ));
    }

    let current = store
        .profile_by_id(me)
        .await?
        .ok_or(ClientError::NotAuthenticated)?;
    if current.target_id.is_some() {
        return Err(ClientError::TargetAlreadySet);
    }

    if store.profile_by_id(target).await?.is_none() {
        return Err(ClientError::Validation("unknown participant".into()));
    }

    let updated = store.set_target(me, target).await?;
    tracing::info!(participant = %me.short(), target = %target.short(), "secret friend drawn");
    Ok(updated)
}

/// Replace the caller's avatar with a base64-encoded image.
///
/// A `data:` URL prefix is tolerated; the payload must decode as base64.
pub async fn update_avatar<S: RemoteStore>(
    store: &S,
    me: ParticipantId,
    avatar_base64: &str,
) -> Result<Profile> {
    let payload = avatar_base64
        .split_once(";base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(avatar_base64);

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ClientError::Validation("avatar is not valid base64".into()))?;
    if decoded.is_empty() {
        return Err(ClientError::Validation("avatar is empty".into()));
    }

    Ok(store.set_avatar(me, avatar_base64).await?)
}
