//! Social Components
//!
//! Social standing, the connection graph, group memberships, and the
//! world-level group registry.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::SocialConfig;

/// Standing within the wider population, derived from influence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialStatus {
    Isolated,
    Peripheral,
    Accepted,
    Respected,
    Influential,
}

impl SocialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialStatus::Isolated => "isolated",
            SocialStatus::Peripheral => "peripheral",
            SocialStatus::Accepted => "accepted",
            SocialStatus::Respected => "respected",
            SocialStatus::Influential => "influential",
        }
    }
}

/// Kinds of social group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Friendship,
    Work,
    Community,
    Alliance,
    Mentorship,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Friendship => "friendship",
            GroupKind::Work => "work",
            GroupKind::Community => "community",
            GroupKind::Alliance => "alliance",
            GroupKind::Mentorship => "mentorship",
        }
    }
}

/// Connection flavor in the social network graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Friend,
    Acquaintance,
    Neutral,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::Friend => "friend",
            ConnectionKind::Acquaintance => "acquaintance",
            ConnectionKind::Neutral => "neutral",
        }
    }
}

/// One edge in an agent's social network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialConnection {
    pub agent_id: String,
    pub kind: ConnectionKind,
    /// 0.0 to 1.0
    pub strength: f32,
    /// 0.0 to 1.0, how much influence flows along this edge
    pub influence_flow: f32,
    pub shared_groups: u32,
    /// Simulated seconds elapsed at the last contact
    pub last_interaction: f64,
}

impl SocialConnection {
    pub fn new(agent_id: impl Into<String>, kind: ConnectionKind, now: f64) -> Self {
        let strength = match kind {
            ConnectionKind::Friend => 0.6,
            ConnectionKind::Acquaintance => 0.3,
            ConnectionKind::Neutral => 0.1,
        };
        Self {
            agent_id: agent_id.into(),
            kind,
            strength,
            influence_flow: strength * 0.5,
            shared_groups: 0,
            last_interaction: now,
        }
    }
}

/// A social group. Member and leader sets are kept consistent with each
/// member's `group_memberships` by the social system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialGroup {
    pub id: String,
    pub name: String,
    pub kind: GroupKind,
    pub members: BTreeSet<String>,
    pub leaders: BTreeSet<String>,
    /// All 0.0 to 1.0
    pub cohesion: f32,
    pub influence: f32,
    pub activity_level: f32,
    pub stability: f32,
    /// Simulated seconds elapsed at creation
    pub created_at: f64,
}

impl SocialGroup {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: GroupKind,
        created_at: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            members: BTreeSet::new(),
            leaders: BTreeSet::new(),
            cohesion: 0.6,
            influence: 0.0,
            activity_level: 0.7,
            stability: 0.5,
            created_at,
        }
    }

    pub fn add_member(&mut self, agent_id: &str) {
        self.members.insert(agent_id.to_string());
    }

    pub fn remove_member(&mut self, agent_id: &str) {
        self.members.remove(agent_id);
        self.leaders.remove(agent_id);
    }

    pub fn add_leader(&mut self, agent_id: &str) {
        self.members.insert(agent_id.to_string());
        self.leaders.insert(agent_id.to_string());
    }

    /// Composite health driving dissolution: cohesion-dominant blend of the
    /// three vitality scalars.
    pub fn health(&self) -> f32 {
        (self.cohesion * 0.4 + self.stability * 0.3 + self.activity_level * 0.3).clamp(0.0, 1.0)
    }

    /// Nudge cohesion toward the members' positive-interaction ratio.
    pub fn drift_cohesion(&mut self, positive_ratio: f32, gain: f32) {
        let change = (positive_ratio - 0.5) * gain;
        self.cohesion = (self.cohesion + change).clamp(0.0, 1.0);
    }
}

/// Resource: registry of every live social group, keyed by group id.
#[derive(Resource, Debug, Default)]
pub struct GroupRegistry {
    groups: BTreeMap<String, SocialGroup>,
    next_id: u64,
    pub total_created: u64,
    pub total_dissolved: u64,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(&mut self) -> String {
        self.next_id += 1;
        format!("group_{:05}", self.next_id)
    }

    pub fn insert(&mut self, group: SocialGroup) {
        self.groups.insert(group.id.clone(), group);
        self.total_created += 1;
    }

    pub fn get(&self, group_id: &str) -> Option<&SocialGroup> {
        self.groups.get(group_id)
    }

    pub fn get_mut(&mut self, group_id: &str) -> Option<&mut SocialGroup> {
        self.groups.get_mut(group_id)
    }

    pub fn remove(&mut self, group_id: &str) -> Option<SocialGroup> {
        let removed = self.groups.remove(group_id);
        if removed.is_some() {
            self.total_dissolved += 1;
        }
        removed
    }

    pub fn ids(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocialGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Per-agent social standing and network state.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct SocialState {
    pub status: SocialStatus,
    /// 0.0 to 1.0, derived from the connection graph
    pub influence: f32,
    pub network: BTreeMap<String, SocialConnection>,
    pub group_memberships: BTreeSet<String>,
    pub leadership_roles: BTreeSet<String>,
    /// 0.0 to 1.0
    pub social_energy: f32,
    pub max_social_energy: f32,
    pub recovery_rate: f32,
    /// Preference for group activity over one-on-one contact
    pub group_preference: f32,
    pub leadership_ability: f32,
    pub groups_created: u32,
    pub connections_formed: u32,
}

impl SocialState {
    pub fn new(config: &SocialConfig) -> Self {
        Self {
            status: SocialStatus::Accepted,
            influence: 0.0,
            network: BTreeMap::new(),
            group_memberships: BTreeSet::new(),
            leadership_roles: BTreeSet::new(),
            social_energy: 1.0,
            max_social_energy: 1.0,
            recovery_rate: config.recovery_rate,
            group_preference: 0.5,
            leadership_ability: 0.5,
            groups_created: 0,
            connections_formed: 0,
        }
    }

    pub fn is_connected_to(&self, agent_id: &str) -> bool {
        self.network.contains_key(agent_id)
    }

    pub fn add_connection(&mut self, agent_id: &str, kind: ConnectionKind, now: f64) {
        self.network
            .entry(agent_id.to_string())
            .or_insert_with(|| SocialConnection::new(agent_id, kind, now));
        self.connections_formed += 1;
        self.refresh_influence();
    }

    pub fn join_group(&mut self, group_id: &str) {
        self.group_memberships.insert(group_id.to_string());
    }

    pub fn leave_group(&mut self, group_id: &str) {
        self.group_memberships.remove(group_id);
        self.leadership_roles.remove(group_id);
    }

    pub fn take_leadership(&mut self, group_id: &str) {
        self.group_memberships.insert(group_id.to_string());
        self.leadership_roles.insert(group_id.to_string());
    }

    /// Spend social energy; returns false (and spends nothing) when the
    /// pool cannot cover the cost.
    pub fn consume_energy(&mut self, amount: f32) -> bool {
        if self.social_energy < amount {
            return false;
        }
        self.social_energy = (self.social_energy - amount).clamp(0.0, self.max_social_energy);
        true
    }

    /// Linear energy recovery, capped at max.
    pub fn recover(&mut self, delta: f32) {
        if delta > 0.0 {
            self.social_energy =
                (self.social_energy + self.recovery_rate * delta).clamp(0.0, self.max_social_energy);
        }
    }

    /// Recompute influence from the connection graph: mean edge strength
    /// scaled by network size, saturating at ten connections.
    pub fn refresh_influence(&mut self) {
        if self.network.is_empty() {
            self.influence = 0.0;
        } else {
            let total: f32 = self.network.values().map(|c| c.strength).sum();
            let mean = total / self.network.len() as f32;
            let size_factor = (self.network.len() as f32 / 10.0).min(1.0);
            self.influence = (mean * size_factor).clamp(0.0, 1.0);
        }
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.status = if self.network.is_empty() {
            SocialStatus::Isolated
        } else if self.influence < 0.1 {
            SocialStatus::Peripheral
        } else if self.influence < 0.4 {
            SocialStatus::Accepted
        } else if self.influence < 0.7 {
            SocialStatus::Respected
        } else {
            SocialStatus::Influential
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn social() -> SocialState {
        SocialState::new(&SocialConfig::default())
    }

    #[test]
    fn test_group_health_blend() {
        let mut group = SocialGroup::new("g1", "Test", GroupKind::Friendship, 0.0);
        group.cohesion = 1.0;
        group.stability = 1.0;
        group.activity_level = 1.0;
        assert!((group.health() - 1.0).abs() < f32::EPSILON);

        group.cohesion = 0.0;
        group.stability = 0.0;
        group.activity_level = 0.0;
        assert!(group.health() < f32::EPSILON);
    }

    #[test]
    fn test_cohesion_drift_clamps() {
        let mut group = SocialGroup::new("g1", "Test", GroupKind::Work, 0.0);
        group.cohesion = 0.99;
        group.drift_cohesion(1.0, 0.1);
        assert!(group.cohesion <= 1.0);

        group.cohesion = 0.01;
        group.drift_cohesion(0.0, 0.1);
        assert!(group.cohesion >= 0.0);
    }

    #[test]
    fn test_remove_member_also_drops_leadership() {
        let mut group = SocialGroup::new("g1", "Test", GroupKind::Alliance, 0.0);
        group.add_leader("boss");
        group.remove_member("boss");
        assert!(group.members.is_empty());
        assert!(group.leaders.is_empty());
    }

    #[test]
    fn test_registry_counts() {
        let mut registry = GroupRegistry::new();
        let id = registry.generate_id();
        registry.insert(SocialGroup::new(id.clone(), "Test", GroupKind::Community, 0.0));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_created, 1);

        registry.remove(&id);
        assert!(registry.is_empty());
        assert_eq!(registry.total_dissolved, 1);

        assert!(registry.remove("missing").is_none());
        assert_eq!(registry.total_dissolved, 1);
    }

    #[test]
    fn test_energy_consumption() {
        let mut s = social();
        assert!(s.consume_energy(0.3));
        assert!((s.social_energy - 0.7).abs() < 1e-6);

        s.social_energy = 0.1;
        assert!(!s.consume_energy(0.3));
        assert!((s.social_energy - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_influence_grows_with_network() {
        let mut s = social();
        assert_eq!(s.status, SocialStatus::Accepted);

        s.refresh_influence();
        assert_eq!(s.status, SocialStatus::Isolated);

        for i in 0..10 {
            s.add_connection(&format!("peer-{i}"), ConnectionKind::Friend, 0.0);
        }
        assert!(s.influence > 0.4);
        assert!(matches!(
            s.status,
            SocialStatus::Respected | SocialStatus::Influential
        ));
    }

    #[test]
    fn test_leave_group_drops_leadership() {
        let mut s = social();
        s.take_leadership("g1");
        assert!(s.group_memberships.contains("g1"));

        s.leave_group("g1");
        assert!(!s.group_memberships.contains("g1"));
        assert!(!s.leadership_roles.contains("g1"));
    }
}
