//! Snapshot Types
//!
//! Serialization structs capturing the complete population state at a point
//! in time, used for analysis and debugging by excluded outer layers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Full world snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    /// Identifies the run this snapshot came from; distinct per process.
    pub run_id: Uuid,
    pub tick: u64,
    /// Simulated seconds elapsed since the world was created.
    pub elapsed: f64,
    pub agent_count: usize,
    pub group_count: usize,
    pub agents: Vec<AgentSnapshot>,
    pub groups: Vec<GroupSnapshot>,
}

/// Per-agent snapshot entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub name: String,
    pub spirit: String,
    pub style: String,
    pub age_days: f32,
    pub life_stage: String,
    pub traits: TraitsSnapshot,
    pub lineage: LineageSnapshot,
    pub social: SocialSnapshot,
    pub gender: GenderSnapshot,
    pub memory_count: usize,
    pub knowledge_count: usize,
}

/// Trait maps at snapshot time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitsSnapshot {
    pub personality: BTreeMap<String, f32>,
    pub physical: BTreeMap<String, f32>,
    pub ability: BTreeMap<String, f32>,
    pub mutation_count: u32,
}

/// Lineage summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageSnapshot {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    pub offspring_count: u32,
}

/// Social standing summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialSnapshot {
    pub status: String,
    pub influence: f32,
    pub connection_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_memberships: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leadership_roles: Vec<String>,
    pub social_energy: f32,
}

/// Gender identity summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderSnapshot {
    pub primary_identity: String,
    pub expression_style: String,
    pub expression_confidence: f32,
    pub wellbeing: f32,
    pub support_network_size: usize,
}

/// Per-group snapshot entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub group_id: String,
    pub name: String,
    pub group_kind: String,
    pub members: Vec<String>,
    pub leaders: Vec<String>,
    pub cohesion: f32,
    pub influence: f32,
    pub activity_level: f32,
    pub stability: f32,
    pub health: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_id_format() {
        assert_eq!(generate_snapshot_id(0), "snap_000000");
        assert_eq!(generate_snapshot_id(42), "snap_000042");
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = WorldSnapshot {
            snapshot_id: generate_snapshot_id(1),
            run_id: Uuid::nil(),
            tick: 10,
            elapsed: 10.0,
            agent_count: 0,
            group_count: 0,
            agents: Vec::new(),
            groups: Vec::new(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.snapshot_id, "snap_000001");
        assert_eq!(parsed.tick, 10);
    }
}
