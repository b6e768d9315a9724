//! Shared event and snapshot types for the menagerie agent simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Outer layers (REST/MCP bridges, analysis tools) consume these wire
//! types without linking the engine itself.

pub mod event;
pub mod snapshot;

pub use event::{Event, EventPayload};

pub use snapshot::{
    generate_snapshot_id, AgentSnapshot, GenderSnapshot, GroupSnapshot, LineageSnapshot,
    SocialSnapshot, TraitsSnapshot, WorldSnapshot,
};
