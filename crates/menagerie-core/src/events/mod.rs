//! Engine-side event plumbing: the per-tick pending queue and the JSONL
//! logger. Event payload types live in the `menagerie-events` crate.

pub mod logger;

pub use logger::{EventLogger, PendingEvents};
