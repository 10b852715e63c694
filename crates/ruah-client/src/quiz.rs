//! Daily quiz: one question per calendar date, one scored attempt per
//! participant.
//!
//! The correct option index is looked up remotely at submission time and is
//! only ever revealed to callers once they have answered. Score is awarded
//! exactly when a *correct* answer is recorded for the first time; a
//! conflict on the answer insert means the one attempt slot was already
//! consumed and nothing more is awarded.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use ruah_shared::{ParticipantId, QuizId};
use ruah_store::{RemoteStore, StoreError};

use crate::error::{ClientError, Result};

/// What the quiz tab renders.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub id: QuizId,
    pub question: String,
    pub options: Vec<String>,
    pub xp: u32,
    pub answered: bool,
    /// Whether the recorded attempt was right. `None` until answered.
    pub correct: Option<bool>,
    /// The right option, revealed only once answered.
    pub correct_index: Option<u32>,
}

/// Result of a submission. `accepted == false` means an attempt already
/// existed; `correct` and `correct_index` then describe that first attempt.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub accepted: bool,
    pub correct: bool,
    pub correct_index: u32,
}

/// Today's quiz for this participant, or `None` when no quiz was authored
/// for the date (an empty state, not an error).
pub async fn today_quiz<S: RemoteStore>(
    store: &S,
    me: ParticipantId,
) -> Result<Option<QuizView>> {
    quiz_for_date(store, me, Local::now().date_naive()).await
}

/// Date-explicit variant of [`today_quiz`].
pub async fn quiz_for_date<S: RemoteStore>(
    store: &S,
    me: ParticipantId,
    date: NaiveDate,
) -> Result<Option<QuizView>> {
    let Some(quiz) = store.quiz_for_date(date).await? else {
        return Ok(None);
    };

    let answer = store.answer_for(me, quiz.id).await?;
    let answered = answer.is_some();
    Ok(Some(QuizView {
        id: quiz.id,
        question: quiz.question,
        options: quiz.options,
        xp: quiz.xp,
        answered,
        correct: answer.map(|a| a.correct),
        correct_index: answered.then_some(quiz.correct_index),
    }))
}

/// Submit the participant's one attempt at a quiz.
pub async fn submit_answer<S: RemoteStore>(
    store: &S,
    me: ParticipantId,
    quiz_id: QuizId,
    selected: u32,
) -> Result<AnswerOutcome> {
    // Authoritative answer key; never trust one held by the UI.
    let quiz = store
        .quiz_by_id(quiz_id)
        .await?
        .ok_or_else(|| ClientError::Validation("unknown quiz".into()))?;
    if selected as usize >= quiz.options.len() {
        return Err(ClientError::Validation("option index out of range".into()));
    }

    let correct = quiz.correct_index == selected;

    match store.insert_answer(me, quiz_id, correct).await {
        Ok(()) => {
            if correct {
                let profile = store
                    .profile_by_id(me)
                    .await?
                    .ok_or(ClientError::NotAuthenticated)?;
                store.set_score(me, profile.score + quiz.xp).await?;
                tracing::info!(participant = %me.short(), quiz = %quiz_id, xp = quiz.xp, "quiz answered correctly");
            }
            Ok(AnswerOutcome {
                accepted: true,
                correct,
                correct_index: quiz.correct_index,
            })
        }
        // The one attempt slot was already consumed; report the recorded
        // attempt and award nothing.
        Err(StoreError::Conflict) => {
            let first = store
                .answer_for(me, quiz_id)
                .await?
                .ok_or(StoreError::NotFound)?;
            Ok(AnswerOutcome {
                accepted: false,
                correct: first.correct,
                correct_index: quiz.correct_index,
            })
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruah_store::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[tokio::test]
    async fn no_quiz_is_an_empty_state() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        assert!(quiz_for_date(&store, p.id, date(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn view_hides_answer_key_until_answered() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let quiz = store.add_quiz(date(1), "Quem?", &["A", "B", "C"], 1, 10);

        let before = quiz_for_date(&store, p.id, date(1)).await.unwrap().unwrap();
        assert!(!before.answered);
        assert_eq!(before.correct, None);
        assert_eq!(before.correct_index, None);
        assert_eq!(before.xp, 10);

        submit_answer(&store, p.id, quiz, 0).await.unwrap();

        let after = quiz_for_date(&store, p.id, date(1)).await.unwrap().unwrap();
        assert!(after.answered);
        assert_eq!(after.correct, Some(false));
        assert_eq!(after.correct_index, Some(1));
    }

    #[tokio::test]
    async fn wrong_answer_awards_nothing() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let quiz = store.add_quiz(date(1), "Quem?", &["A", "B", "C"], 1, 10);

        let outcome = submit_answer(&store, p.id, quiz, 0).await.unwrap();
        assert_eq!(
            outcome,
            AnswerOutcome { accepted: true, correct: false, correct_index: 1 }
        );
        assert_eq!(store.profile_by_id(p.id).await.unwrap().unwrap().score, 0);
    }

    #[tokio::test]
    async fn correct_answer_awards_xp_once() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let quiz = store.add_quiz(date(1), "Quem?", &["A", "B", "C"], 2, 15);

        let outcome = submit_answer(&store, p.id, quiz, 2).await.unwrap();
        assert!(outcome.accepted && outcome.correct);
        assert_eq!(store.profile_by_id(p.id).await.unwrap().unwrap().score, 15);

        // Submitting again cannot double-award.
        let again = submit_answer(&store, p.id, quiz, 2).await.unwrap();
        assert_eq!(
            again,
            AnswerOutcome { accepted: false, correct: true, correct_index: 2 }
        );
        assert_eq!(store.profile_by_id(p.id).await.unwrap().unwrap().score, 15);
    }

    #[tokio::test]
    async fn second_attempt_reports_the_first() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let quiz = store.add_quiz(date(1), "Quem?", &["A", "B", "C"], 1, 10);

        // Wrong first, then "correct" second: the slot is consumed, score
        // stays at zero and the report matches the first attempt.
        submit_answer(&store, p.id, quiz, 0).await.unwrap();
        let second = submit_answer(&store, p.id, quiz, 1).await.unwrap();
        assert_eq!(
            second,
            AnswerOutcome { accepted: false, correct: false, correct_index: 1 }
        );
        assert_eq!(store.profile_by_id(p.id).await.unwrap().unwrap().score, 0);
    }

    #[tokio::test]
    async fn out_of_range_option_rejected() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let quiz = store.add_quiz(date(1), "Quem?", &["A", "B"], 0, 10);

        assert!(matches!(
            submit_answer(&store, p.id, quiz, 5).await,
            Err(ClientError::Validation(_))
        ));
        assert!(store.answer_for(p.id, quiz).await.unwrap().is_none());
    }
}
