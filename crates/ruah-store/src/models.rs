//! Row models for the hosted store collections.
//!
//! Field names match the remote column names so rows deserialize straight
//! from the store's JSON responses. Every struct derives `Serialize` and
//! `Deserialize` so it can be handed directly to a UI layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ruah_shared::{MessageId, ParticipantId, QuizId};

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A participant row from the `profiles` collection.
///
/// The remote row also carries a `password` column; it is deliberately
/// absent here so it never travels past the store layer. Inserts use
/// [`NewProfile`], credential checks use a filtered read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: ParticipantId,
    /// Display name, unique case-insensitively.
    pub name: String,
    /// Base64-encoded avatar image, if one was uploaded.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// The participant this one is assigned to pray for. Write-once.
    #[serde(default)]
    pub target_id: Option<ParticipantId>,
    /// Denormalized streak counter.
    #[serde(default)]
    pub streak: u32,
    /// Quiz score. Older rows predate the column, hence the default.
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new profile.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub name: String,
    pub password: String,
    pub streak: u32,
}

// ---------------------------------------------------------------------------
// Prayer log
// ---------------------------------------------------------------------------

/// One logged prayer. Unique on (`user_id`, `date`); that constraint is the
/// sole mechanism behind the one-increment-per-day rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prayer {
    pub user_id: ParticipantId,
    /// Calendar date by the device clock, `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Daily quiz
// ---------------------------------------------------------------------------

/// The one quiz authored for a given calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyQuiz {
    pub id: QuizId,
    pub date: NaiveDate,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer. Only revealed to callers
    /// once they have answered.
    pub correct_index: u32,
    /// Score awarded for a correct answer.
    pub xp: u32,
}

/// A participant's single scored attempt at a quiz. Unique on
/// (`user_id`, `quiz_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizAnswer {
    pub user_id: ParticipantId,
    pub quiz_id: QuizId,
    pub correct: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A chat message row. The conversation it belongs to is identified by
/// `angel_id`, not by the (sender, receiver) pair, so the same two
/// participants hold two disjoint threads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    /// The participant in the angel role for this thread.
    pub angel_id: ParticipantId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new message; id and instant are assigned remotely.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub angel_id: ParticipantId,
    pub text: String,
}

/// Realtime notification for a message insert. Unscoped: every subscriber
/// sees every insert and is expected to re-fetch its own thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertNotice {
    pub message_id: MessageId,
}
