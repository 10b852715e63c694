//! In-memory store backend.
//!
//! Implements the same contract and the same unique constraints as the
//! hosted store, so client logic can be exercised without a network. Used
//! by the test suites; also handy for offline demos.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::broadcast;

use ruah_shared::{MessageId, ParticipantId, QuizId};

use crate::error::{Result, StoreError};
use crate::models::{DailyQuiz, InsertNotice, Message, Profile, QuizAnswer};
use crate::store::RemoteStore;

const INSERT_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct Inner {
    profiles: Vec<Profile>,
    passwords: HashMap<ParticipantId, String>,
    prayers: Vec<(ParticipantId, NaiveDate)>,
    quizzes: Vec<DailyQuiz>,
    answers: Vec<QuizAnswer>,
    messages: Vec<Message>,
    next_quiz_id: i64,
    /// Monotonic tick used to assign strictly increasing creation instants.
    ticks: i64,
}

impl Inner {
    fn next_instant(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        // Seconds offset keeps instants strictly ordered.
        DateTime::from_timestamp(1_700_000_000 + self.ticks, 0)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Store backend holding every collection in memory.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    inserts: broadcast::Sender<InsertNotice>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (inserts, _) = broadcast::channel(INSERT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner::default()),
            inserts,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Author a quiz for a date, as the external admin tooling would.
    pub fn add_quiz(
        &self,
        date: NaiveDate,
        question: &str,
        options: &[&str],
        correct_index: u32,
        xp: u32,
    ) -> QuizId {
        let mut inner = self.lock();
        inner.next_quiz_id += 1;
        let id = QuizId(inner.next_quiz_id);
        inner.quizzes.push(DailyQuiz {
            id,
            date,
            question: question.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index,
            xp,
        });
        id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    async fn profile_by_id(&self, id: ParticipantId) -> Result<Option<Profile>> {
        Ok(self.lock().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
        let wanted = name.to_lowercase();
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn profile_by_credentials(
        &self,
        name: &str,
        password: &str,
    ) -> Result<Option<Profile>> {
        let wanted = name.to_lowercase();
        let inner = self.lock();
        Ok(inner
            .profiles
            .iter()
            .find(|p| {
                p.name.to_lowercase() == wanted
                    && inner.passwords.get(&p.id).map(String::as_str) == Some(password)
            })
            .cloned())
    }

    async fn create_profile(&self, name: &str, password: &str) -> Result<Profile> {
        let wanted = name.to_lowercase();
        let mut inner = self.lock();
        if inner
            .profiles
            .iter()
            .any(|p| p.name.to_lowercase() == wanted)
        {
            return Err(StoreError::Conflict);
        }
        let created_at = inner.next_instant();
        let profile = Profile {
            id: ParticipantId::new(),
            name: name.to_string(),
            avatar_url: None,
            target_id: None,
            streak: 0,
            score: 0,
            created_at: Some(created_at),
        };
        inner.passwords.insert(profile.id, password.to_string());
        inner.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles = self.lock().profiles.clone();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn set_target(&self, id: ParticipantId, target: ParticipantId) -> Result<Profile> {
        let mut inner = self.lock();
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        profile.target_id = Some(target);
        Ok(profile.clone())
    }

    async fn set_avatar(&self, id: ParticipantId, avatar_base64: &str) -> Result<Profile> {
        let mut inner = self.lock();
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        profile.avatar_url = Some(avatar_base64.to_string());
        Ok(profile.clone())
    }

    async fn set_streak(&self, id: ParticipantId, streak: u32) -> Result<()> {
        let mut inner = self.lock();
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        profile.streak = streak;
        Ok(())
    }

    async fn set_score(&self, id: ParticipantId, score: u32) -> Result<()> {
        let mut inner = self.lock();
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        profile.score = score;
        Ok(())
    }

    async fn top_by_streak(&self, limit: u32) -> Result<Vec<Profile>> {
        let mut profiles = self.lock().profiles.clone();
        // Stable sort keeps ties in insertion order, deterministic per fetch.
        profiles.sort_by(|a, b| b.streak.cmp(&a.streak));
        profiles.truncate(limit as usize);
        Ok(profiles)
    }

    async fn top_by_score(&self, limit: u32) -> Result<Vec<Profile>> {
        let mut profiles = self.lock().profiles.clone();
        profiles.sort_by(|a, b| b.score.cmp(&a.score));
        profiles.truncate(limit as usize);
        Ok(profiles)
    }

    async fn angel_of(&self, id: ParticipantId) -> Result<Option<ParticipantId>> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.target_id == Some(id))
            .map(|p| p.id))
    }

    async fn has_prayer(&self, user: ParticipantId, date: NaiveDate) -> Result<bool> {
        Ok(self.lock().prayers.contains(&(user, date)))
    }

    async fn insert_prayer(&self, user: ParticipantId, date: NaiveDate) -> Result<()> {
        let mut inner = self.lock();
        if inner.prayers.contains(&(user, date)) {
            return Err(StoreError::Conflict);
        }
        inner.prayers.push((user, date));
        Ok(())
    }

    async fn prayer_dates(&self, user: ParticipantId) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .lock()
            .prayers
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, d)| *d)
            .collect();
        dates.sort_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    async fn quiz_for_date(&self, date: NaiveDate) -> Result<Option<DailyQuiz>> {
        Ok(self.lock().quizzes.iter().find(|q| q.date == date).cloned())
    }

    async fn quiz_by_id(&self, id: QuizId) -> Result<Option<DailyQuiz>> {
        Ok(self.lock().quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn answer_for(
        &self,
        user: ParticipantId,
        quiz: QuizId,
    ) -> Result<Option<QuizAnswer>> {
        Ok(self
            .lock()
            .answers
            .iter()
            .find(|a| a.user_id == user && a.quiz_id == quiz)
            .cloned())
    }

    async fn insert_answer(
        &self,
        user: ParticipantId,
        quiz: QuizId,
        correct: bool,
    ) -> Result<()> {
        let mut inner = self.lock();
        if inner
            .answers
            .iter()
            .any(|a| a.user_id == user && a.quiz_id == quiz)
        {
            return Err(StoreError::Conflict);
        }
        let created_at = inner.next_instant();
        inner.answers.push(QuizAnswer {
            user_id: user,
            quiz_id: quiz,
            correct,
            created_at: Some(created_at),
        });
        Ok(())
    }

    async fn messages_for_angel(
        &self,
        angel: ParticipantId,
        limit: u32,
    ) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.angel_id == angel)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn insert_message(
        &self,
        sender: ParticipantId,
        receiver: ParticipantId,
        angel: ParticipantId,
        text: &str,
    ) -> Result<Message> {
        let message = {
            let mut inner = self.lock();
            let created_at = inner.next_instant();
            let message = Message {
                id: MessageId::new(),
                sender_id: sender,
                receiver_id: receiver,
                angel_id: angel,
                text: text.to_string(),
                created_at,
            };
            inner.messages.push(message.clone());
            message
        };
        let _ = self.inserts.send(InsertNotice {
            message_id: message.id,
        });
        Ok(message)
    }

    fn message_inserts(&self) -> broadcast::Receiver<InsertNotice> {
        self.inserts.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[tokio::test]
    async fn prayer_unique_per_day() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();

        store.insert_prayer(p.id, date(1)).await.unwrap();
        assert!(matches!(
            store.insert_prayer(p.id, date(1)).await,
            Err(StoreError::Conflict)
        ));
        store.insert_prayer(p.id, date(2)).await.unwrap();

        assert!(store.has_prayer(p.id, date(1)).await.unwrap());
        assert_eq!(store.prayer_dates(p.id).await.unwrap(), vec![date(2), date(1)]);
    }

    #[tokio::test]
    async fn answer_unique_per_quiz() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let quiz = store.add_quiz(date(1), "Q?", &["a", "b"], 1, 10);

        store.insert_answer(p.id, quiz, false).await.unwrap();
        assert!(matches!(
            store.insert_answer(p.id, quiz, true).await,
            Err(StoreError::Conflict)
        ));
        let stored = store.answer_for(p.id, quiz).await.unwrap().unwrap();
        assert!(!stored.correct);
    }

    #[tokio::test]
    async fn name_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        store.create_profile("Maria Souza", "pw").await.unwrap();
        assert!(store.profile_by_name("maria souza").await.unwrap().is_some());
        assert!(store
            .profile_by_credentials("MARIA SOUZA", "pw")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .profile_by_credentials("maria souza", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.create_profile("MARIA souza", "other").await,
            Err(StoreError::Conflict)
        ));
    }

    #[tokio::test]
    async fn messages_filtered_by_angel_and_ordered() {
        let store = MemoryStore::new();
        let a = store.create_profile("A", "pw").await.unwrap();
        let b = store.create_profile("B", "pw").await.unwrap();

        store.insert_message(a.id, b.id, a.id, "first").await.unwrap();
        store.insert_message(b.id, a.id, a.id, "second").await.unwrap();
        store.insert_message(a.id, b.id, b.id, "other thread").await.unwrap();

        let thread = store.messages_for_angel(a.id, 50).await.unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].text, "first");
        assert_eq!(thread[1].text, "second");
        assert!(thread[0].created_at < thread[1].created_at);
    }

    #[tokio::test]
    async fn insert_message_broadcasts_notice() {
        let store = MemoryStore::new();
        let a = store.create_profile("A", "pw").await.unwrap();
        let b = store.create_profile("B", "pw").await.unwrap();

        let mut feed = store.message_inserts();
        let sent = store.insert_message(a.id, b.id, a.id, "oi").await.unwrap();
        let notice = feed.recv().await.unwrap();
        assert_eq!(notice.message_id, sent.id);
    }

    #[tokio::test]
    async fn leaderboards_sorted_descending() {
        let store = MemoryStore::new();
        for (name, streak, score) in [("A", 3u32, 50u32), ("B", 25, 0), ("C", 12, 120)] {
            let p = store.create_profile(name, "pw").await.unwrap();
            store.set_streak(p.id, streak).await.unwrap();
            store.set_score(p.id, score).await.unwrap();
        }

        let by_streak = store.top_by_streak(50).await.unwrap();
        let streaks: Vec<u32> = by_streak.iter().map(|p| p.streak).collect();
        assert_eq!(streaks, vec![25, 12, 3]);

        let by_score = store.top_by_score(2).await.unwrap();
        assert_eq!(by_score.len(), 2);
        assert_eq!(by_score[0].score, 120);
    }

    #[tokio::test]
    async fn angel_of_reverse_lookup() {
        let store = MemoryStore::new();
        let a = store.create_profile("A", "pw").await.unwrap();
        let b = store.create_profile("B", "pw").await.unwrap();

        assert_eq!(store.angel_of(b.id).await.unwrap(), None);
        store.set_target(a.id, b.id).await.unwrap();
        assert_eq!(store.angel_of(b.id).await.unwrap(), Some(a.id));
    }
}
