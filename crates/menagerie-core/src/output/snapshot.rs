//! Snapshot Generator
//!
//! Builds `menagerie_events::WorldSnapshot` values from the live ECS world.

use bevy_ecs::prelude::*;
use uuid::Uuid;

use menagerie_events::{
    generate_snapshot_id, AgentSnapshot, GenderSnapshot, GroupSnapshot, LineageSnapshot,
    SocialSnapshot, TraitsSnapshot, WorldSnapshot,
};

use crate::components::{
    AgentId, AgentName, GenderState, GroupRegistry, KnowledgeBase, Lifecycle, Lineage,
    MemoryStore, Reproduction, SocialState, SpiritIdentity, TraitProfile,
};
use crate::SimClock;

/// Stateful snapshot producer. Each run gets a random id; snapshots are
/// numbered sequentially within it.
#[derive(Debug)]
pub struct SnapshotGenerator {
    run_id: Uuid,
    sequence: u64,
}

impl SnapshotGenerator {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            sequence: 0,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn snapshot_count(&self) -> u64 {
        self.sequence
    }

    /// Capture the full population state.
    pub fn generate(&mut self, world: &mut World) -> WorldSnapshot {
        let (tick, elapsed) = {
            let clock = world.resource::<SimClock>();
            (clock.tick, clock.elapsed)
        };

        #[allow(clippy::type_complexity)]
        let mut query = world.query::<(
            &AgentId,
            &AgentName,
            &SpiritIdentity,
            Option<&Lifecycle>,
            Option<&TraitProfile>,
            Option<&Lineage>,
            Option<&Reproduction>,
            Option<&SocialState>,
            Option<&GenderState>,
            Option<&MemoryStore>,
            Option<&KnowledgeBase>,
        )>();

        let mut agents: Vec<AgentSnapshot> = query
            .iter(world)
            .map(
                |(id, name, identity, lifecycle, traits, lineage, repro, social, gender, memory, knowledge)| {
                    AgentSnapshot {
                        agent_id: id.0.clone(),
                        name: name.0.clone(),
                        spirit: identity.spirit.clone(),
                        style: identity.style.clone(),
                        age_days: lifecycle.map_or(0.0, |lc| lc.age),
                        life_stage: lifecycle
                            .map_or("unknown", |lc| lc.stage().as_str())
                            .to_string(),
                        traits: traits.map_or_else(TraitsSnapshot::default, |t| TraitsSnapshot {
                            personality: t.personality.clone(),
                            physical: t.physical.clone(),
                            ability: t.ability.clone(),
                            mutation_count: t.mutation_count,
                        }),
                        lineage: LineageSnapshot {
                            parents: lineage.map_or_else(Vec::new, |l| l.parents.clone()),
                            children: lineage.map_or_else(Vec::new, |l| l.children.clone()),
                            offspring_count: repro.map_or(0, |r| r.offspring_count),
                        },
                        social: social.map_or_else(SocialSnapshot::default, |s| SocialSnapshot {
                            status: s.status.as_str().to_string(),
                            influence: s.influence,
                            connection_count: s.network.len(),
                            group_memberships: s.group_memberships.iter().cloned().collect(),
                            leadership_roles: s.leadership_roles.iter().cloned().collect(),
                            social_energy: s.social_energy,
                        }),
                        gender: gender.map_or_else(GenderSnapshot::default, |g| GenderSnapshot {
                            primary_identity: g.profile.primary_identity.as_str().to_string(),
                            expression_style: g.profile.expression_style.as_str().to_string(),
                            expression_confidence: g.expression_confidence,
                            wellbeing: g.wellbeing(),
                            support_network_size: g.profile.support_network.len(),
                        }),
                        memory_count: memory.map_or(0, MemoryStore::len),
                        knowledge_count: knowledge.map_or(0, KnowledgeBase::len),
                    }
                },
            )
            .collect();
        agents.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));

        let groups: Vec<GroupSnapshot> = world
            .resource::<GroupRegistry>()
            .iter()
            .map(|group| GroupSnapshot {
                group_id: group.id.clone(),
                name: group.name.clone(),
                group_kind: group.kind.as_str().to_string(),
                members: group.members.iter().cloned().collect(),
                leaders: group.leaders.iter().cloned().collect(),
                cohesion: group.cohesion,
                influence: group.influence,
                activity_level: group.activity_level,
                stability: group.stability,
                health: group.health(),
            })
            .collect();

        self.sequence += 1;
        WorldSnapshot {
            snapshot_id: generate_snapshot_id(self.sequence),
            run_id: self.run_id,
            tick,
            elapsed,
            agent_count: agents.len(),
            group_count: groups.len(),
            agents,
            groups,
        }
    }
}

impl Default for SnapshotGenerator {
    fn default() -> Self {
        Self::new()
    }
}
