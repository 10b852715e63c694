//! Dual-context anonymous chat.
//!
//! Every message is stamped with the id of the participant who is the
//! *angel* of that conversation, and the stamp is what partitions threads:
//! the same two people hold two disjoint conversations depending on who is
//! praying for whom. [`ChatContext`] is the single tagged type used for
//! both listing and sending, so the stamp used to read can never drift
//! from the stamp used to write.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use ruah_shared::constants::{CHAT_PAGE_LIMIT, MAX_MESSAGE_LEN};
use ruah_shared::{MessageId, ParticipantId};
use ruah_store::{InsertNotice, Profile, RemoteStore};

use crate::error::{ClientError, Result};

/// One of the two conversation tabs, carrying the resolved angel id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatContext {
    /// "Quem eu tirei": I am the angel, talking to my own target.
    MineAsAngel {
        me: ParticipantId,
        target: ParticipantId,
    },
    /// "Meu anjo": whoever drew me is the angel; I am on the receiving end.
    MineAsTarget { angel: ParticipantId },
}

impl ChatContext {
    /// The stamp that identifies this thread.
    pub fn angel_id(&self) -> ParticipantId {
        match self {
            Self::MineAsAngel { me, .. } => *me,
            Self::MineAsTarget { angel } => *angel,
        }
    }

    /// Who a message sent from this tab goes to.
    pub fn receiver_id(&self) -> ParticipantId {
        match self {
            Self::MineAsAngel { target, .. } => *target,
            Self::MineAsTarget { angel } => *angel,
        }
    }
}

/// The two tabs as resolvable for one participant. Either can be absent:
/// no target drawn yet, or nobody has drawn this participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatContexts {
    pub as_angel: Option<ChatContext>,
    pub as_target: Option<ChatContext>,
}

/// Reverse lookup: the participant whose target is `me`, if exactly one
/// exists.
pub async fn my_angel_id<S: RemoteStore>(
    store: &S,
    me: ParticipantId,
) -> Result<Option<ParticipantId>> {
    Ok(store.angel_of(me).await?)
}

/// Resolve both tabs for a participant.
pub async fn contexts<S: RemoteStore>(store: &S, me: &Profile) -> Result<ChatContexts> {
    let as_angel = me.target_id.map(|target| ChatContext::MineAsAngel {
        me: me.id,
        target,
    });
    let as_target = my_angel_id(store, me.id)
        .await?
        .map(|angel| ChatContext::MineAsTarget { angel });
    Ok(ChatContexts {
        as_angel,
        as_target,
    })
}

/// A message as the chat view renders it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub id: MessageId,
    /// Whether the current participant sent it.
    pub mine: bool,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// The context's thread, creation instant ascending as assigned by the
/// store.
pub async fn list_messages<S: RemoteStore>(
    store: &S,
    context: ChatContext,
    me: ParticipantId,
) -> Result<Vec<ChatEntry>> {
    let rows = store
        .messages_for_angel(context.angel_id(), CHAT_PAGE_LIMIT)
        .await?;
    Ok(rows
        .into_iter()
        .map(|m| ChatEntry {
            id: m.id,
            mine: m.sender_id == me,
            text: m.text,
            sent_at: m.created_at,
        })
        .collect())
}

/// Send a message in the given context. The angel stamp and the receiver
/// both come from the context, never from the caller.
pub async fn send_message<S: RemoteStore>(
    store: &S,
    context: ChatContext,
    me: ParticipantId,
    text: &str,
) -> Result<ChatEntry> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ClientError::Validation("message must not be empty".into()));
    }
    if text.chars().count() > MAX_MESSAGE_LEN {
        return Err(ClientError::Validation("message too long".into()));
    }

    let row = store
        .insert_message(me, context.receiver_id(), context.angel_id(), text)
        .await?;
    tracing::debug!(message = %row.id, angel = %row.angel_id.short(), "message sent");
    Ok(ChatEntry {
        id: row.id,
        mine: true,
        text: row.text,
        sent_at: row.created_at,
    })
}

/// Handle on the realtime insert feed.
///
/// The feed is system-wide: every insert anywhere produces a notice, and
/// the consumer re-fetches its own thread and discards the rest. Release
/// the feed when the owning view is torn down; holding it across tab
/// switches would stack duplicate callbacks.
pub struct ChatFeed {
    receiver: Option<broadcast::Receiver<InsertNotice>>,
}

impl ChatFeed {
    pub fn subscribe<S: RemoteStore>(store: &S) -> Self {
        Self {
            receiver: Some(store.message_inserts()),
        }
    }

    /// Next insert notice, or `None` once the feed is released or the
    /// store side is gone. A lagged receiver skips ahead; the consumer
    /// re-fetches on every notice anyway.
    pub async fn next(&mut self) -> Option<InsertNotice> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "chat feed lagged, catching up");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Explicitly drop the subscription.
    pub fn release(&mut self) {
        self.receiver = None;
    }

    pub fn is_released(&self) -> bool {
        self.receiver.is_none()
    }
}
