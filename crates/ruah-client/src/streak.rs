//! Daily prayer log and streak computation.
//!
//! The store holds two things: one `prayers` row per (participant, day) and
//! a denormalized streak counter on the profile. The unique constraint on
//! the log row is the real daily cap; the counter is always recomputed from
//! the configured [`StreakRule`] and written back, so a conflict race can
//! never double-increment it.

use std::collections::HashSet;

use chrono::{Days, Local, NaiveDate};
use serde::Serialize;

use ruah_shared::ParticipantId;
use ruah_store::{RemoteStore, StoreError};

use crate::error::{ClientError, Result};

/// What a "streak" means.
///
/// The group historically counted every day with a logged prayer, never
/// resetting on a gap. `Consecutive` is the stricter reading: the length of
/// the trailing run of consecutive days ending today or yesterday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreakRule {
    #[default]
    TotalDays,
    Consecutive,
}

impl StreakRule {
    /// Parse a configuration value. Unknown values fall back to the
    /// default with a diagnostic.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "total" | "total_days" => Self::TotalDays,
            "consecutive" => Self::Consecutive,
            other => {
                tracing::warn!(value = other, "unknown streak rule, using total_days");
                Self::TotalDays
            }
        }
    }
}

/// Result of a log attempt. `accepted == false` means the day was already
/// logged; `streak` is authoritative either way.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrayerOutcome {
    pub accepted: bool,
    pub streak: u32,
}

/// Length of the run of consecutive logged days ending today or yesterday.
///
/// A run ending yesterday still counts: the streak is not considered broken
/// until a full day passes without a log.
pub fn trailing_run(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let logged: HashSet<NaiveDate> = dates.iter().copied().collect();

    let mut day = if logged.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) if logged.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut run = 1u32;
    while let Some(previous) = day.checked_sub_days(Days::new(1)) {
        if !logged.contains(&previous) {
            break;
        }
        run += 1;
        day = previous;
    }
    run
}

/// Streak operations for one store backend.
pub struct StreakTracker<'a, S> {
    store: &'a S,
    rule: StreakRule,
}

impl<'a, S: RemoteStore> StreakTracker<'a, S> {
    pub fn new(store: &'a S, rule: StreakRule) -> Self {
        Self { store, rule }
    }

    /// Whether a log entry exists for today by the device clock.
    pub async fn has_prayed_today(&self, user: ParticipantId) -> Result<bool> {
        self.has_prayed_on(user, Local::now().date_naive()).await
    }

    pub async fn has_prayed_on(&self, user: ParticipantId, date: NaiveDate) -> Result<bool> {
        Ok(self.store.has_prayer(user, date).await?)
    }

    /// Log today's prayer, advancing the streak by at most one.
    pub async fn log_prayer(&self, user: ParticipantId) -> Result<PrayerOutcome> {
        self.log_prayer_on(user, Local::now().date_naive()).await
    }

    /// Date-explicit variant of [`log_prayer`](Self::log_prayer).
    pub async fn log_prayer_on(
        &self,
        user: ParticipantId,
        today: NaiveDate,
    ) -> Result<PrayerOutcome> {
        if self.store.has_prayer(user, today).await? {
            return Ok(PrayerOutcome {
                accepted: false,
                streak: self.current_streak_on(user, today).await?,
            });
        }

        match self.store.insert_prayer(user, today).await {
            Ok(()) => {}
            // Raced a concurrent log of the same day. The slot is consumed;
            // report the authoritative state.
            Err(StoreError::Conflict) => {
                return Ok(PrayerOutcome {
                    accepted: false,
                    streak: self.current_streak_on(user, today).await?,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let streak = self.recompute_on(user, today).await?;
        self.store.set_streak(user, streak).await?;
        tracing::info!(participant = %user.short(), streak, "prayer logged");
        Ok(PrayerOutcome {
            accepted: true,
            streak,
        })
    }

    /// The streak as it stands, without logging anything.
    pub async fn current_streak(&self, user: ParticipantId) -> Result<u32> {
        self.current_streak_on(user, Local::now().date_naive()).await
    }

    async fn current_streak_on(&self, user: ParticipantId, today: NaiveDate) -> Result<u32> {
        match self.rule {
            StreakRule::TotalDays => {
                let profile = self
                    .store
                    .profile_by_id(user)
                    .await?
                    .ok_or(ClientError::NotAuthenticated)?;
                Ok(profile.streak)
            }
            StreakRule::Consecutive => self.recompute_on(user, today).await,
        }
    }

    /// Derive the counter value from the raw log, per rule.
    async fn recompute_on(&self, user: ParticipantId, today: NaiveDate) -> Result<u32> {
        let dates = self.store.prayer_dates(user).await?;
        Ok(match self.rule {
            StreakRule::TotalDays => dates.len() as u32,
            StreakRule::Consecutive => trailing_run(&dates, today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruah_store::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn trailing_run_basics() {
        let today = date(10);
        assert_eq!(trailing_run(&[], today), 0);
        assert_eq!(trailing_run(&[date(10)], today), 1);
        assert_eq!(trailing_run(&[date(8), date(9), date(10)], today), 3);
        // Run ending yesterday still counts.
        assert_eq!(trailing_run(&[date(8), date(9)], today), 2);
        // A gap before yesterday is a broken streak.
        assert_eq!(trailing_run(&[date(7), date(8)], today), 0);
        // Only the trailing run counts, not an older one.
        assert_eq!(trailing_run(&[date(1), date(2), date(3), date(10)], today), 1);
    }

    #[test]
    fn rule_parse() {
        assert_eq!(StreakRule::parse("consecutive"), StreakRule::Consecutive);
        assert_eq!(StreakRule::parse("Total_Days"), StreakRule::TotalDays);
        assert_eq!(StreakRule::parse("???"), StreakRule::TotalDays);
    }

    #[tokio::test]
    async fn log_once_per_day() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let tracker = StreakTracker::new(&store, StreakRule::TotalDays);

        assert!(!tracker.has_prayed_on(p.id, date(1)).await.unwrap());

        let first = tracker.log_prayer_on(p.id, date(1)).await.unwrap();
        assert_eq!(first, PrayerOutcome { accepted: true, streak: 1 });
        assert!(tracker.has_prayed_on(p.id, date(1)).await.unwrap());

        // Second log the same day: rejected, streak unchanged.
        let second = tracker.log_prayer_on(p.id, date(1)).await.unwrap();
        assert_eq!(second, PrayerOutcome { accepted: false, streak: 1 });
        assert_eq!(store.profile_by_id(p.id).await.unwrap().unwrap().streak, 1);
    }

    #[tokio::test]
    async fn total_days_never_resets() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let tracker = StreakTracker::new(&store, StreakRule::TotalDays);

        tracker.log_prayer_on(p.id, date(1)).await.unwrap();
        // Day 2 skipped entirely.
        let after_gap = tracker.log_prayer_on(p.id, date(3)).await.unwrap();
        assert_eq!(after_gap, PrayerOutcome { accepted: true, streak: 2 });
    }

    #[tokio::test]
    async fn consecutive_resets_after_gap() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let tracker = StreakTracker::new(&store, StreakRule::Consecutive);

        tracker.log_prayer_on(p.id, date(1)).await.unwrap();
        tracker.log_prayer_on(p.id, date(2)).await.unwrap();
        assert_eq!(
            tracker.log_prayer_on(p.id, date(3)).await.unwrap().streak,
            3
        );

        // Gap: days 4 and 5 skipped.
        let restarted = tracker.log_prayer_on(p.id, date(6)).await.unwrap();
        assert_eq!(restarted, PrayerOutcome { accepted: true, streak: 1 });
        assert_eq!(store.profile_by_id(p.id).await.unwrap().unwrap().streak, 1);
    }

    #[tokio::test]
    async fn conflict_race_is_benign() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let tracker = StreakTracker::new(&store, StreakRule::TotalDays);

        // Another device already inserted today's row and bumped the counter.
        store.insert_prayer(p.id, date(1)).await.unwrap();
        store.set_streak(p.id, 1).await.unwrap();

        let outcome = tracker.log_prayer_on(p.id, date(1)).await.unwrap();
        assert_eq!(outcome, PrayerOutcome { accepted: false, streak: 1 });
    }

    #[tokio::test]
    async fn day_rollover_starts_fresh() {
        let store = MemoryStore::new();
        let p = store.create_profile("Ana", "pw").await.unwrap();
        let tracker = StreakTracker::new(&store, StreakRule::TotalDays);

        tracker.log_prayer_on(p.id, date(1)).await.unwrap();
        assert!(tracker.has_prayed_on(p.id, date(1)).await.unwrap());
        assert!(!tracker.has_prayed_on(p.id, date(2)).await.unwrap());

        let next = tracker.log_prayer_on(p.id, date(2)).await.unwrap();
        assert_eq!(next, PrayerOutcome { accepted: true, streak: 2 });
    }
}
