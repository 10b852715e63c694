//! # ruah-store
//!
//! Thin data-access layer over the hosted row store backing Ruah Ignis.
//!
//! The crate owns no business rules: it exposes typed CRUD helpers per
//! collection (`profiles`, `prayers`, `daily_quiz`, `quiz_answers`,
//! `messages`) behind the [`RemoteStore`] trait, plus the realtime
//! message-insert feed. [`RestStore`] talks to the hosted backend;
//! [`MemoryStore`] mirrors its constraints for tests.

pub mod memory;
pub mod models;
pub mod realtime;
pub mod rest;
pub mod store;

mod error;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use models::*;
pub use rest::RestStore;
pub use store::RemoteStore;
