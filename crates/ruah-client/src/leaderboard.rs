//! Leaderboard read projections over the profile directory.

use serde::Serialize;

use ruah_shared::constants::LEADERBOARD_LIMIT;
use ruah_shared::BadgeTier;
use ruah_store::{Profile, RemoteStore};

use crate::error::Result;

/// One ranked row. Rank is 1-based in fetch order; ties keep whatever
/// stable order the store returned.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub profile: Profile,
    pub badge: BadgeTier,
}

fn rank(profiles: Vec<Profile>) -> Vec<LeaderboardEntry> {
    profiles
        .into_iter()
        .enumerate()
        .map(|(i, profile)| LeaderboardEntry {
            rank: i as u32 + 1,
            badge: BadgeTier::for_streak(profile.streak),
            profile,
        })
        .collect()
}

/// Participants by streak, descending.
pub async fn top_by_streak<S: RemoteStore>(
    store: &S,
    limit: Option<u32>,
) -> Result<Vec<LeaderboardEntry>> {
    let profiles = store
        .top_by_streak(limit.unwrap_or(LEADERBOARD_LIMIT))
        .await?;
    Ok(rank(profiles))
}

/// Participants by quiz score, descending.
pub async fn top_by_score<S: RemoteStore>(
    store: &S,
    limit: Option<u32>,
) -> Result<Vec<LeaderboardEntry>> {
    let profiles = store
        .top_by_score(limit.unwrap_or(LEADERBOARD_LIMIT))
        .await?;
    Ok(rank(profiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruah_store::MemoryStore;

    async fn seed(store: &MemoryStore, rows: &[(&str, u32, u32)]) {
        for (name, streak, score) in rows {
            let p = store.create_profile(name, "pw").await.unwrap();
            store.set_streak(p.id, *streak).await.unwrap();
            store.set_score(p.id, *score).await.unwrap();
        }
    }

    #[tokio::test]
    async fn empty_and_singleton_sets() {
        let store = MemoryStore::new();
        assert!(top_by_streak(&store, None).await.unwrap().is_empty());

        seed(&store, &[("Ana", 5, 10)]).await;
        let board = top_by_streak(&store, None).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].badge, BadgeTier::Ember);
    }

    #[tokio::test]
    async fn streak_board_non_increasing_with_badges() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[("Ana", 25, 0), ("Bia", 1, 90), ("Caio", 12, 40), ("Duda", 12, 5)],
        )
        .await;

        let board = top_by_streak(&store, None).await.unwrap();
        let streaks: Vec<u32> = board.iter().map(|e| e.profile.streak).collect();
        assert!(streaks.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(board[0].badge, BadgeTier::Blaze);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[3].rank, 4);
    }

    #[tokio::test]
    async fn score_board_non_increasing_even_when_all_equal() {
        let store = MemoryStore::new();
        seed(&store, &[("Ana", 0, 30), ("Bia", 0, 30), ("Caio", 0, 30)]).await;

        let board = top_by_score(&store, None).await.unwrap();
        let scores: Vec<u32> = board.iter().map(|e| e.profile.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(board.len(), 3);
    }

    #[tokio::test]
    async fn limit_is_honored() {
        let store = MemoryStore::new();
        seed(&store, &[("Ana", 3, 1), ("Bia", 2, 2), ("Caio", 1, 3)]).await;
        let board = top_by_score(&store, Some(2)).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].profile.score, 3);
    }
}
