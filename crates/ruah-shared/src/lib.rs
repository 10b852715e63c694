//! # ruah-shared
//!
//! Types shared by every Ruah Ignis crate: identifiers, the streak badge
//! ladder, and app-wide constants.

pub mod badges;
pub mod constants;
pub mod types;

pub use badges::BadgeTier;
pub use types::{MessageId, ParticipantId, QuizId};
