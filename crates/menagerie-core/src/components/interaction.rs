//! Interaction Component
//!
//! Social-energy pool, relationship map, and active-interaction tracking
//! for one agent.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::InteractionConfig;

/// Kinds of agent-to-agent interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Communication,
    Social,
    Collaboration,
    Teaching,
    Competitive,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Communication => "communication",
            InteractionKind::Social => "social",
            InteractionKind::Collaboration => "collaboration",
            InteractionKind::Teaching => "teaching",
            InteractionKind::Competitive => "competitive",
        }
    }
}

/// How an interaction resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOutcome {
    Success,
    PartialSuccess,
    Neutral,
    Failure,
}

impl InteractionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionOutcome::Success => "success",
            InteractionOutcome::PartialSuccess => "partial_success",
            InteractionOutcome::Neutral => "neutral",
            InteractionOutcome::Failure => "failure",
        }
    }
}

/// Relationship classification derived from interaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Friend,
    Acquaintance,
    Neutral,
    Rival,
    Enemy,
    Mentor,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Friend => "friend",
            RelationshipKind::Acquaintance => "acquaintance",
            RelationshipKind::Neutral => "neutral",
            RelationshipKind::Rival => "rival",
            RelationshipKind::Enemy => "enemy",
            RelationshipKind::Mentor => "mentor",
        }
    }
}

/// One side of a relationship. The peer holds an independent copy; values
/// are not required to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub agent_id: String,
    pub kind: RelationshipKind,
    /// 0.0 to 1.0
    pub strength: f32,
    /// 0.0 to 1.0
    pub trust: f32,
    /// 0.0 to 1.0
    pub familiarity: f32,
    pub interaction_count: u32,
    pub positive_interactions: u32,
    pub negative_interactions: u32,
    /// Simulated seconds spent interacting with this peer
    pub total_time_together: f32,
    /// Simulated seconds elapsed at the last interaction
    pub last_interaction: f64,
}

impl Relationship {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            kind: RelationshipKind::Neutral,
            strength: 0.0,
            trust: 0.0,
            familiarity: 0.0,
            interaction_count: 0,
            positive_interactions: 0,
            negative_interactions: 0,
            total_time_together: 0.0,
            last_interaction: 0.0,
        }
    }

    /// Fold an interaction outcome into this side of the relationship.
    /// Impact is in [-1, 1]; strength follows it directly, trust at half
    /// weight, familiarity grows with every contact regardless of outcome.
    pub fn apply_outcome(&mut self, impact: f32, duration: f32, now: f64) {
        let impact = impact.clamp(-1.0, 1.0);

        self.interaction_count += 1;
        if impact > 0.0 {
            self.positive_interactions += 1;
        } else if impact < 0.0 {
            self.negative_interactions += 1;
        }

        self.strength = (self.strength + impact).clamp(0.0, 1.0);
        self.trust = (self.trust + impact * 0.5).clamp(0.0, 1.0);
        self.familiarity = (self.familiarity + 0.05).clamp(0.0, 1.0);
        self.total_time_together += duration.max(0.0);
        self.last_interaction = now;

        self.reclassify();
    }

    /// Re-derive the relationship kind from the running tallies. Mentor is
    /// assigned externally and never overwritten here.
    fn reclassify(&mut self) {
        if self.kind == RelationshipKind::Mentor {
            return;
        }

        let positives = self.positive_interactions as f32;
        let negatives = self.negative_interactions as f32;

        self.kind = if positives > negatives * 2.0 && self.strength > 0.8 && self.trust > 0.7 {
            RelationshipKind::Friend
        } else if negatives > positives * 2.0 && self.strength < 0.2 {
            RelationshipKind::Enemy
        } else if negatives > positives * 2.0 {
            RelationshipKind::Rival
        } else if self.familiarity > 0.3 {
            RelationshipKind::Acquaintance
        } else {
            RelationshipKind::Neutral
        };
    }

    /// Composite quality score for reporting.
    pub fn quality(&self) -> f32 {
        (self.strength * 0.4 + self.trust * 0.4 + self.familiarity * 0.2).clamp(0.0, 1.0)
    }
}

/// Per-agent interaction state: energy pool, relationship map, and the set
/// of interactions currently in flight.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct InteractionState {
    /// 0.0 to 1.0
    pub energy: f32,
    pub max_energy: f32,
    pub recovery_rate: f32,
    pub min_energy: f32,
    pub cooldown: f32,
    pub max_concurrent: usize,
    pub relationships: BTreeMap<String, Relationship>,
    pub active: Vec<String>,
    /// Simulated seconds elapsed at this agent's last interaction
    pub last_interaction_time: Option<f64>,
    pub total_interactions: u64,
    pub total_positive: u64,
    pub total_negative: u64,
}

impl InteractionState {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            energy: 1.0,
            max_energy: 1.0,
            recovery_rate: config.recovery_rate,
            min_energy: config.min_energy,
            cooldown: config.cooldown,
            max_concurrent: config.max_concurrent,
            relationships: BTreeMap::new(),
            active: Vec::new(),
            last_interaction_time: None,
            total_interactions: 0,
            total_positive: 0,
            total_negative: 0,
        }
    }

    /// Whether this agent can take part in a new interaction right now:
    /// enough energy, cooldown elapsed, and not already saturated.
    pub fn can_interact(&self, now: f64) -> bool {
        if self.energy < self.min_energy {
            return false;
        }
        if self.active.len() >= self.max_concurrent {
            return false;
        }
        match self.last_interaction_time {
            Some(last) => now - last >= f64::from(self.cooldown),
            None => true,
        }
    }

    pub fn get_relationship(&self, agent_id: &str) -> Option<&Relationship> {
        self.relationships.get(agent_id)
    }

    pub fn ensure_relationship(&mut self, agent_id: &str) -> &mut Relationship {
        self.relationships
            .entry(agent_id.to_string())
            .or_insert_with(|| Relationship::new(agent_id))
    }

    pub fn begin_interaction(&mut self, interaction_id: &str) {
        self.active.push(interaction_id.to_string());
    }

    /// Close out an interaction: pay the energy cost, fold the outcome into
    /// the relationship with the peer, and update the tallies.
    pub fn complete_interaction(
        &mut self,
        interaction_id: &str,
        peer_id: &str,
        impact: f32,
        duration: f32,
        energy_cost: f32,
        now: f64,
    ) {
        self.active.retain(|id| id != interaction_id);
        self.energy = (self.energy - energy_cost).clamp(0.0, self.max_energy);
        self.last_interaction_time = Some(now);
        self.total_interactions += 1;
        if impact > 0.0 {
            self.total_positive += 1;
        } else if impact < 0.0 {
            self.total_negative += 1;
        }

        self.ensure_relationship(peer_id)
            .apply_outcome(impact, duration, now);
    }

    /// Linear energy recovery, capped at max.
    pub fn recover(&mut self, delta: f32) {
        if delta > 0.0 {
            self.energy = (self.energy + self.recovery_rate * delta).clamp(0.0, self.max_energy);
        }
    }
}
