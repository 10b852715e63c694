//! Hosted-store backend speaking the PostgREST row API.
//!
//! Every collection is a path under `/rest/v1/`; filters, ordering and
//! limits are query parameters (`id=eq.<uuid>`, `order=streak.desc`,
//! `limit=50`). Inserts that need the stored row back send
//! `Prefer: return=representation`. The realtime insert feed runs as a
//! separate websocket task (see [`crate::realtime`]) publishing into a
//! broadcast channel owned by this struct.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use chrono::NaiveDate;
use ruah_shared::constants::{
    TABLE_DAILY_QUIZ, TABLE_MESSAGES, TABLE_PRAYERS, TABLE_PROFILES, TABLE_QUIZ_ANSWERS,
};
use ruah_shared::{ParticipantId, QuizId};

use crate::error::{Result, StoreError};
use crate::models::{
    DailyQuiz, InsertNotice, Message, NewMessage, NewProfile, Profile, QuizAnswer,
};
use crate::realtime;
use crate::store::RemoteStore;

/// Capacity of the insert-notice channel. Consumers that lag merely miss
/// notices; they re-fetch on the next one anyway.
const INSERT_CHANNEL_CAPACITY: usize = 64;

/// Client for the hosted row store.
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    inserts: broadcast::Sender<InsertNotice>,
}

impl RestStore {
    /// Build a client for the store at `base_url` (scheme + host, no
    /// trailing slash) authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(api_key)
            .map_err(|e| StoreError::Realtime(format!("invalid api key: {e}")))?;
        headers.insert("apikey", key_value);
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| StoreError::Realtime(format!("invalid api key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let (inserts, _) = broadcast::channel(INSERT_CHANNEL_CAPACITY);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            inserts,
        })
    }

    /// Start the realtime feed task. Insert events on the `messages`
    /// collection land in the channel behind
    /// [`RemoteStore::message_inserts`]. The task runs until the returned
    /// handle is aborted or the socket closes.
    pub fn spawn_realtime(&self) -> JoinHandle<()> {
        let ws_url = realtime::websocket_url(&self.base_url, &self.api_key);
        let tx = self.inserts.clone();
        tokio::spawn(async move {
            if let Err(e) = realtime::run_feed(&ws_url, tx).await {
                tracing::warn!(error = %e, "realtime feed stopped");
            }
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(query)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut query = query.to_vec();
        query.push(("limit", "1".to_string()));
        let mut rows = self.select::<T>(table, &query).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    async fn insert_returning<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let mut rows: Vec<T> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }

    async fn insert_minimal<B: Serialize>(&self, table: &str, body: &B) -> Result<()> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_returning<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .patch(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(query)
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let mut rows: Vec<T> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }

    async fn update_minimal<B: Serialize>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<()> {
        let response = self
            .http
            .patch(self.table_url(table))
            .header("Prefer", "return=minimal")
            .query(query)
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Map a response status onto the store error taxonomy. 409 is the unique
/// constraint signal the daily-cap rules depend on.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 409 {
        return Err(StoreError::Conflict);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Render a filter value for the row API.
fn eq<T: std::fmt::Display>(value: T) -> String {
    format!("eq.{value}")
}

#[derive(serde::Deserialize)]
struct PrayerDateRow {
    date: NaiveDate,
}

#[derive(serde::Deserialize)]
struct IdRow {
    id: ParticipantId,
}

impl RemoteStore for RestStore {
    async fn profile_by_id(&self, id: ParticipantId) -> Result<Option<Profile>> {
        self.select_one(TABLE_PROFILES, &[("id", eq(id))]).await
    }

    async fn profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
        // `ilike` without wildcards is a case-insensitive exact match.
        self.select_one(TABLE_PROFILES, &[("name", format!("ilike.{name}"))])
            .await
    }

    async fn profile_by_credentials(
        &self,
        name: &str,
        password: &str,
    ) -> Result<Option<Profile>> {
        self.select_one(
            TABLE_PROFILES,
            &[
                ("name", format!("ilike.{name}")),
                ("password", eq(password)),
            ],
        )
        .await
    }

    async fn create_profile(&self, name: &str, password: &str) -> Result<Profile> {
        let body = NewProfile {
            name: name.to_string(),
            password: password.to_string(),
            streak: 0,
        };
        self.insert_returning(TABLE_PROFILES, &body).await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.select(TABLE_PROFILES, &[("order", "name.asc".to_string())])
            .await
    }

    async fn set_target(&self, id: ParticipantId, target: ParticipantId) -> Result<Profile> {
        self.update_returning(
            TABLE_PROFILES,
            &[("id", eq(id))],
            &serde_json::json!({ "target_id": target }),
        )
        .await
    }

    async fn set_avatar(&self, id: ParticipantId, avatar_base64: &str) -> Result<Profile> {
        self.update_returning(
            TABLE_PROFILES,
            &[("id", eq(id))],
            &serde_json::json!({ "avatar_url": avatar_base64 }),
        )
        .await
    }

    async fn set_streak(&self, id: ParticipantId, streak: u32) -> Result<()> {
        self.update_minimal(
            TABLE_PROFILES,
            &[("id", eq(id))],
            &serde_json::json!({ "streak": streak }),
        )
        .await
    }

    async fn set_score(&self, id: ParticipantId, score: u32) -> Result<()> {
        self.update_minimal(
            TABLE_PROFILES,
            &[("id", eq(id))],
            &serde_json::json!({ "score": score }),
        )
        .await
    }

    async fn top_by_streak(&self, limit: u32) -> Result<Vec<Profile>> {
        self.select(
            TABLE_PROFILES,
            &[
                ("order", "streak.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn top_by_score(&self, limit: u32) -> Result<Vec<Profile>> {
        self.select(
            TABLE_PROFILES,
            &[
                ("order", "score.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn angel_of(&self, id: ParticipantId) -> Result<Option<ParticipantId>> {
        let row: Option<IdRow> = self
            .select_one(
                TABLE_PROFILES,
                &[("target_id", eq(id)), ("select", "id".to_string())],
            )
            .await?;
        Ok(row.map(|r| r.id))
    }

    async fn has_prayer(&self, user: ParticipantId, date: NaiveDate) -> Result<bool> {
        let row: Option<PrayerDateRow> = self
            .select_one(
                TABLE_PRAYERS,
                &[
                    ("user_id", eq(user)),
                    ("date", eq(date)),
                    ("select", "date".to_string()),
                ],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn insert_prayer(&self, user: ParticipantId, date: NaiveDate) -> Result<()> {
        self.insert_minimal(
            TABLE_PRAYERS,
            &serde_json::json!({ "user_id": user, "date": date }),
        )
        .await
    }

    async fn prayer_dates(&self, user: ParticipantId) -> Result<Vec<NaiveDate>> {
        let rows: Vec<PrayerDateRow> = self
            .select(
                TABLE_PRAYERS,
                &[
                    ("user_id", eq(user)),
                    ("select", "date".to_string()),
                    ("order", "date.desc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.date).collect())
    }

    async fn quiz_for_date(&self, date: NaiveDate) -> Result<Option<DailyQuiz>> {
        self.select_one(TABLE_DAILY_QUIZ, &[("date", eq(date))]).await
    }

    async fn quiz_by_id(&self, id: QuizId) -> Result<Option<DailyQuiz>> {
        self.select_one(TABLE_DAILY_QUIZ, &[("id", eq(id))]).await
    }

    async fn answer_for(
        &self,
        user: ParticipantId,
        quiz: QuizId,
    ) -> Result<Option<QuizAnswer>> {
        self.select_one(
            TABLE_QUIZ_ANSWERS,
            &[("user_id", eq(user)), ("quiz_id", eq(quiz))],
        )
        .await
    }

    async fn insert_answer(
        &self,
        user: ParticipantId,
        quiz: QuizId,
        correct: bool,
    ) -> Result<()> {
        self.insert_minimal(
            TABLE_QUIZ_ANSWERS,
            &serde_json::json!({ "user_id": user, "quiz_id": quiz, "correct": correct }),
        )
        .await
    }

    async fn messages_for_angel(
        &self,
        angel: ParticipantId,
        limit: u32,
    ) -> Result<Vec<Message>> {
        self.select(
            TABLE_MESSAGES,
            &[
                ("angel_id", eq(angel)),
                ("order", "created_at.asc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn insert_message(
        &self,
        sender: ParticipantId,
        receiver: ParticipantId,
        angel: ParticipantId,
        text: &str,
    ) -> Result<Message> {
        let body = NewMessage {
            sender_id: sender,
            receiver_id: receiver,
            angel_id: angel,
            text: text.to_string(),
        };
        self.insert_returning(TABLE_MESSAGES, &body).await
    }

    fn message_inserts(&self) -> broadcast::Receiver<InsertNotice> {
        self.inserts.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_renders_filter() {
        let id = ParticipantId::new();
        assert_eq!(eq(id), format!("eq.{id}"));
        assert_eq!(eq(QuizId(7)), "eq.7");
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(eq(date), "eq.2026-08-24");
    }

    #[test]
    fn table_url_joins_cleanly() {
        let store = RestStore::new("https://example.test/", "key").unwrap();
        assert_eq!(
            store.table_url(TABLE_PROFILES),
            "https://example.test/rest/v1/profiles"
        );
    }
}
