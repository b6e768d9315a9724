//! Output Schemas
//!
//! Serialize-only report structs returned by the world facade's query entry
//! points, plus the world-snapshot generator.

pub mod reports;
pub mod snapshot;

pub use reports::{
    BreedingStats, ConnectionReport, GenderReport, GroupReport, KnowledgeStatsReport,
    LineageReport, LoraConfig, MemoryStatsReport, PersonaReport, RelationshipReport,
    SocialNetworkReport, SystemStats,
};
pub use snapshot::SnapshotGenerator;
