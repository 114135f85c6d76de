//! COCO - the engine room of the recipe-sharing app
//!
//! Two independent building blocks used by the app's domain actions:
//!
//! 1. **Retry** ([`retry`]): runs an unreliable async operation (saving a
//!    recipe, sending a friend request) with bounded exponential backoff and
//!    jitter, handing the final error back unchanged.
//!
//! 2. **Progression** ([`progression`]): after an action succeeds, evaluates
//!    the trophy catalog against the user's statistics, unlocks each trophy at
//!    most once, tracks daily streaks and derives the user's level.
//!
//! Storage sits behind the traits in [`store`]; SQLite and in-memory
//! implementations are included.

pub mod config;
pub mod progression;
pub mod retry;
pub mod store;

pub use progression::{ProgressionEngine, ProgressionEvent, UnlockedAchievement};
pub use retry::{OperationError, RetryExecutor, RetryPolicy};
