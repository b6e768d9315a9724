//! ECS Systems
//!
//! All simulation systems, run once per tick in fixed registration order:
//! lifecycle aging, memory decay/forgetting, interactions, social dynamics,
//! learning, and gender dynamics.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

pub mod gender;
pub mod interaction;
pub mod learning;
pub mod lifecycle;
pub mod memory;
pub mod social;

pub use gender::{
    drift_gender_identity, process_mutual_support, update_expression_confidence, GenderActivity,
};
pub use interaction::{
    interaction_probability, process_interactions, recover_interaction_energy, select_interaction_kind,
    simulate_outcome, InteractionActivity,
};
pub use learning::{
    decay_knowledge, discover_shared_knowledge, expire_opportunities, pursue_opportunities,
    run_teaching_sessions, LearningActivity,
};
pub use lifecycle::advance_lifecycles;
pub use memory::{decay_memories, forget_memories, MemoryActivity};
pub use social::{
    form_groups, grow_social_network, recover_social_energy, update_group_dynamics, SocialActivity,
};

/// Resource: maps external string agent ids to live entities. Maintained by
/// the world facade on creation and removal.
#[derive(Resource, Debug, Default)]
pub struct AgentIndex {
    entities: BTreeMap<String, Entity>,
}

impl AgentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent_id: impl Into<String>, entity: Entity) {
        self.entities.insert(agent_id.into(), entity);
    }

    pub fn remove(&mut self, agent_id: &str) -> Option<Entity> {
        self.entities.remove(agent_id)
    }

    pub fn get(&self, agent_id: &str) -> Option<Entity> {
        self.entities.get(agent_id).copied()
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.entities.contains_key(agent_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.entities.keys()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
