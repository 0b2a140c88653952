//! Rendition Worker
//!
//! Bounded worker pool in front of the pipeline factory. The pool owns Task
//! status transitions (`running`, then `success` or `error`) and retries
//! runs that failed for transient reasons.

pub mod queue;

pub use queue::{Job, JobFinishedSender, WorkQueue, MAX_RETRY_BACKOFF_SECS};
