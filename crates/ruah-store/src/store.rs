//! The data-access contract every store backend implements.
//!
//! The hosted store is a black box offering row-level CRUD per collection
//! with filter/order/limit on reads plus an insert-event feed on the
//! `messages` collection. [`RemoteStore`] captures exactly that surface as
//! typed helpers; business rules live in `ruah-client`, never here.

use chrono::NaiveDate;
use tokio::sync::broadcast;

use ruah_shared::{ParticipantId, QuizId};

use crate::error::Result;
use crate::models::{DailyQuiz, InsertNotice, Message, Profile, QuizAnswer};

/// Typed CRUD surface over the hosted store.
///
/// All reads reflect the latest remote state at call time; nothing is
/// cached. Implementations: [`RestStore`](crate::RestStore) for the hosted
/// backend, [`MemoryStore`](crate::MemoryStore) for tests.
#[allow(async_fn_in_trait)]
pub trait RemoteStore: Send + Sync {
    // -- profiles --

    async fn profile_by_id(&self, id: ParticipantId) -> Result<Option<Profile>>;

    /// Case-insensitive exact name lookup.
    async fn profile_by_name(&self, name: &str) -> Result<Option<Profile>>;

    /// Case-insensitive name plus exact password match.
    async fn profile_by_credentials(&self, name: &str, password: &str)
        -> Result<Option<Profile>>;

    /// Insert a profile with streak 0 and return the stored row.
    async fn create_profile(&self, name: &str, password: &str) -> Result<Profile>;

    /// All profiles, ordered by name ascending.
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// Write the target assignment. The write-once rule is enforced by the
    /// caller; the store only records it.
    async fn set_target(&self, id: ParticipantId, target: ParticipantId) -> Result<Profile>;

    async fn set_avatar(&self, id: ParticipantId, avatar_base64: &str) -> Result<Profile>;

    async fn set_streak(&self, id: ParticipantId, streak: u32) -> Result<()>;

    async fn set_score(&self, id: ParticipantId, score: u32) -> Result<()>;

    /// Profiles ordered by streak descending, at most `limit` rows.
    async fn top_by_streak(&self, limit: u32) -> Result<Vec<Profile>>;

    /// Profiles ordered by score descending, at most `limit` rows.
    async fn top_by_score(&self, limit: u32) -> Result<Vec<Profile>>;

    /// Reverse target lookup: whoever has `target_id == id`, if anyone.
    async fn angel_of(&self, id: ParticipantId) -> Result<Option<ParticipantId>>;

    // -- prayers --

    async fn has_prayer(&self, user: ParticipantId, date: NaiveDate) -> Result<bool>;

    /// Insert the (user, date) log entry. `Err(Conflict)` when it already
    /// exists.
    async fn insert_prayer(&self, user: ParticipantId, date: NaiveDate) -> Result<()>;

    /// All dates the user logged a prayer on, newest first.
    async fn prayer_dates(&self, user: ParticipantId) -> Result<Vec<NaiveDate>>;

    // -- daily quiz --

    async fn quiz_for_date(&self, date: NaiveDate) -> Result<Option<DailyQuiz>>;

    async fn quiz_by_id(&self, id: QuizId) -> Result<Option<DailyQuiz>>;

    async fn answer_for(&self, user: ParticipantId, quiz: QuizId)
        -> Result<Option<QuizAnswer>>;

    /// Record the user's one attempt. `Err(Conflict)` when an attempt was
    /// already recorded.
    async fn insert_answer(&self, user: ParticipantId, quiz: QuizId, correct: bool)
        -> Result<()>;

    // -- messages --

    /// Every message of one conversation context, creation instant
    /// ascending, at most `limit` rows.
    async fn messages_for_angel(&self, angel: ParticipantId, limit: u32)
        -> Result<Vec<Message>>;

    async fn insert_message(
        &self,
        sender: ParticipantId,
        receiver: ParticipantId,
        angel: ParticipantId,
        text: &str,
    ) -> Result<Message>;

    /// Subscribe to the system-wide message insert feed. Dropping the
    /// receiver releases the subscription.
    fn message_inserts(&self) -> broadcast::Receiver<InsertNotice>;
}
