//! Data models for conversion runs
//!
//! `RunOptions` identifies one source object and one Task/Snapshot pair.
//! `Task` and `Snapshot` are owned by external services; a run only ever
//! submits partial patches against them.

mod artifact;
mod run_options;
mod snapshot;
mod task;

pub use artifact::*;
pub use run_options::*;
pub use snapshot::*;
pub use task::*;
