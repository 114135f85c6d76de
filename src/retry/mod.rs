//! Retry with bounded exponential backoff and jitter
//!
//! Wraps any async unit of work. Transient failures (network, timeouts,
//! rate limiting, 5xx) are retried under a [`RetryPolicy`]; terminal failures
//! and budget exhaustion hand the operation's own error back to the caller.
//!
//! ```ignore
//! let policy = RetryPolicy::<OperationError>::default();
//! let recipe = RetryExecutor::new(policy)
//!     .named("save_recipe")
//!     .on_retry(|r| println!("retrying... (attempt {}/{})", r.attempt, r.max_retries))
//!     .execute(|| api.save_recipe(&draft))
//!     .await?;
//! ```

mod error;
mod executor;
mod policy;

pub use error::{Classify, FailureKind, OperationError};
pub use executor::{execute, RetryAttempt, RetryExecutor};
pub use policy::{default_predicate, RetryPolicy};
