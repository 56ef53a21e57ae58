//! Fundamental types for the Venn sentiment protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: derived identifiers, the three-valued agreement scale, epochs,
//! timestamps, the per-nullifier action budget, and the top-level error enum.

pub mod agreement;
pub mod budget;
pub mod epoch;
pub mod error;
pub mod ids;
pub mod time;

pub use agreement::Agreement;
pub use budget::{
    season_0_defaults, BudgetActionKey, BudgetError, BudgetLimit, DailyUsage, NullifierBudget,
};
pub use epoch::Epoch;
pub use error::VennError;
pub use ids::{IntentId, PointId, SynthesisId, TopicId, VoterId};
pub use time::Timestamp;
