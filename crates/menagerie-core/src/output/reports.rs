//! Query Reports
//!
//! Structured data returned to outer layers. All routine not-found cases
//! surface as `Option::None` at the facade, never as errors.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::components::{
    GenderState, KnowledgeBase, Lineage, MemoryStore, Relationship, SocialGroup, SocialState,
    SpiritIdentity, TraitProfile,
};
use crate::config::{GenderConfig, LearningConfig};

/// Persona summary for prompt construction by outer layers.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaReport {
    pub agent_id: String,
    pub name: String,
    pub spirit: String,
    pub style: String,
    pub dominant_traits: Vec<String>,
    pub personality_summary: String,
}

impl PersonaReport {
    pub fn build(
        agent_id: &str,
        name: &str,
        identity: &SpiritIdentity,
        traits: Option<&TraitProfile>,
    ) -> Self {
        let dominant: Vec<(String, f32)> =
            traits.map_or_else(Vec::new, |t| t.dominant_traits(3));

        Self {
            agent_id: agent_id.to_string(),
            name: name.to_string(),
            spirit: identity.spirit.clone(),
            style: identity.style.clone(),
            dominant_traits: dominant.iter().map(|(name, _)| name.clone()).collect(),
            personality_summary: summarize_personality(&identity.spirit, &dominant),
        }
    }
}

/// One-line persona description from the spirit and its strongest traits.
fn summarize_personality(spirit: &str, dominant: &[(String, f32)]) -> String {
    let Some((top_trait, top_value)) = dominant.first() else {
        return format!("A {spirit} with a balanced, adaptable nature");
    };

    if *top_value > 0.8 {
        return format!("A {spirit} defined by remarkable {top_trait}");
    }

    let spread = dominant
        .iter()
        .map(|(_, v)| *v)
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if dominant.len() >= 2 && spread.1 - spread.0 < 0.3 {
        let names: Vec<&str> = dominant.iter().map(|(n, _)| n.as_str()).collect();
        return format!("A {spirit} balancing {}", names.join(", "));
    }

    format!("A {spirit} leaning on {top_trait}")
}

/// Trait-map snapshot shaped for persona fine-tuning pipelines.
#[derive(Debug, Clone, Serialize)]
pub struct LoraConfig {
    pub base_model: String,
    pub lora_rank: u32,
    pub lora_alpha: u32,
    pub target_modules: Vec<String>,
    pub personality_weights: BTreeMap<String, f32>,
    pub physical_weights: BTreeMap<String, f32>,
    pub ability_weights: BTreeMap<String, f32>,
}

impl LoraConfig {
    pub fn build(traits: Option<&TraitProfile>) -> Self {
        Self {
            base_model: "menagerie-agent-base".to_string(),
            lora_rank: 16,
            lora_alpha: 32,
            target_modules: ["q_proj", "v_proj", "k_proj", "o_proj"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            personality_weights: traits.map(|t| t.personality.clone()).unwrap_or_default(),
            physical_weights: traits.map(|t| t.physical.clone()).unwrap_or_default(),
            ability_weights: traits.map(|t| t.ability.clone()).unwrap_or_default(),
        }
    }
}

/// Family-tree report.
#[derive(Debug, Clone, Serialize)]
pub struct LineageReport {
    pub agent_id: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub ancestors: Vec<String>,
    pub descendants: Vec<String>,
}

impl LineageReport {
    pub fn build(agent_id: &str, lineage: &Lineage) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            parents: lineage.parents.clone(),
            children: lineage.children.clone(),
            ancestors: lineage.ancestors.iter().cloned().collect(),
            descendants: lineage.descendants.iter().cloned().collect(),
        }
    }
}

/// Memory statistics for one agent.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStatsReport {
    pub agent_id: String,
    pub total_memories: usize,
    pub capacity: usize,
    pub total_formed: u64,
    pub total_forgotten: u64,
    pub average_importance: f32,
    pub by_kind: BTreeMap<String, usize>,
}

impl MemoryStatsReport {
    pub fn build(agent_id: &str, store: &MemoryStore) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            total_memories: store.len(),
            capacity: store.capacity,
            total_formed: store.total_formed,
            total_forgotten: store.total_forgotten,
            average_importance: store.average_importance(),
            by_kind: store
                .counts_by_kind()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// One side of a relationship, or the stranger default when none exists.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipReport {
    pub relationship: String,
    pub strength: f32,
    pub trust: f32,
    pub familiarity: f32,
    pub interaction_count: u32,
    pub positive_interactions: u32,
    pub negative_interactions: u32,
    pub total_time_together: f32,
    pub last_interaction: Option<f64>,
    pub quality: f32,
}

impl RelationshipReport {
    pub fn stranger() -> Self {
        Self {
            relationship: "stranger".to_string(),
            strength: 0.0,
            trust: 0.0,
            familiarity: 0.0,
            interaction_count: 0,
            positive_interactions: 0,
            negative_interactions: 0,
            total_time_together: 0.0,
            last_interaction: None,
            quality: 0.0,
        }
    }

    pub fn build(relationship: &Relationship) -> Self {
        Self {
            relationship: relationship.kind.as_str().to_string(),
            strength: relationship.strength,
            trust: relationship.trust,
            familiarity: relationship.familiarity,
            interaction_count: relationship.interaction_count,
            positive_interactions: relationship.positive_interactions,
            negative_interactions: relationship.negative_interactions,
            total_time_together: relationship.total_time_together,
            last_interaction: Some(relationship.last_interaction),
            quality: relationship.quality(),
        }
    }
}

/// One edge in a social-network report.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub agent_id: String,
    pub connection: String,
    pub strength: f32,
    pub influence_flow: f32,
    pub shared_groups: u32,
    pub last_interaction: f64,
}

/// Social-network report for one agent.
#[derive(Debug, Clone, Serialize)]
pub struct SocialNetworkReport {
    pub agent_id: String,
    pub status: String,
    pub influence: f32,
    pub network_size: usize,
    pub connections: Vec<ConnectionReport>,
    pub group_memberships: Vec<String>,
    pub leadership_roles: Vec<String>,
    pub social_energy: f32,
}

impl SocialNetworkReport {
    pub fn build(agent_id: &str, social: &SocialState) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            status: social.status.as_str().to_string(),
            influence: social.influence,
            network_size: social.network.len(),
            connections: social
                .network
                .values()
                .map(|connection| ConnectionReport {
                    agent_id: connection.agent_id.clone(),
                    connection: connection.kind.as_str().to_string(),
                    strength: connection.strength,
                    influence_flow: connection.influence_flow,
                    shared_groups: connection.shared_groups,
                    last_interaction: connection.last_interaction,
                })
                .collect(),
            group_memberships: social.group_memberships.iter().cloned().collect(),
            leadership_roles: social.leadership_roles.iter().cloned().collect(),
            social_energy: social.social_energy,
        }
    }
}

/// Group report.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group_id: String,
    pub name: String,
    pub group_kind: String,
    pub members: Vec<String>,
    pub leaders: Vec<String>,
    pub member_count: usize,
    pub cohesion: f32,
    pub influence: f32,
    pub activity_level: f32,
    pub stability: f32,
    pub health: f32,
    pub created_at: f64,
}

impl GroupReport {
    pub fn build(group: &SocialGroup) -> Self {
        Self {
            group_id: group.id.clone(),
            name: group.name.clone(),
            group_kind: group.kind.as_str().to_string(),
            members: group.members.iter().cloned().collect(),
            leaders: group.leaders.iter().cloned().collect(),
            member_count: group.members.len(),
            cohesion: group.cohesion,
            influence: group.influence,
            activity_level: group.activity_level,
            stability: group.stability,
            health: group.health(),
            created_at: group.created_at,
        }
    }
}

/// Knowledge statistics for one agent.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeStatsReport {
    pub agent_id: String,
    pub total_items: usize,
    pub teachable_items: usize,
    pub learning_opportunities: usize,
    pub average_proficiency: f32,
    pub by_kind: BTreeMap<String, usize>,
    pub learning_rate: f32,
    pub teaching_ability: f32,
    pub curiosity: f32,
    pub total_acquired: u64,
    pub total_shared: u64,
    pub teaching_sessions: u64,
    pub learning_sessions: u64,
}

impl KnowledgeStatsReport {
    pub fn build(agent_id: &str, kb: &KnowledgeBase, config: &LearningConfig) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            total_items: kb.len(),
            teachable_items: kb.teachable(config).len(),
            learning_opportunities: kb.opportunity_count(),
            average_proficiency: kb.average_proficiency(),
            by_kind: kb
                .counts_by_kind()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            learning_rate: kb.learning_rate,
            teaching_ability: kb.teaching_ability,
            curiosity: kb.curiosity,
            total_acquired: kb.total_acquired,
            total_shared: kb.total_shared,
            teaching_sessions: kb.teaching_sessions,
            learning_sessions: kb.learning_sessions,
        }
    }
}

/// Gender identity report.
#[derive(Debug, Clone, Serialize)]
pub struct GenderReport {
    pub agent_id: String,
    pub primary_identity: String,
    pub secondary_identities: Vec<String>,
    pub expression_style: String,
    pub preferred_pronouns: Option<String>,
    pub is_fluid: bool,
    pub fluidity_rate: f32,
    pub identity_changes: u32,
    pub support_network: Vec<String>,
    pub out_to: Vec<String>,
    pub expression_confidence: f32,
    pub dysphoria: f32,
    pub euphoria: f32,
    pub social_comfort: f32,
    pub wellbeing: f32,
    pub expression_readiness: f32,
    pub needs_support: bool,
}

impl GenderReport {
    pub fn build(agent_id: &str, state: &GenderState, config: &GenderConfig) -> Self {
        let profile = &state.profile;
        Self {
            agent_id: agent_id.to_string(),
            primary_identity: profile.primary_identity.as_str().to_string(),
            secondary_identities: profile
                .secondary_identities
                .iter()
                .map(|identity| identity.as_str().to_string())
                .collect(),
            expression_style: profile.expression_style.as_str().to_string(),
            preferred_pronouns: profile
                .preferred_pronouns
                .as_ref()
                .map(|set| format!("{}/{}", set.subject, set.object)),
            is_fluid: profile.is_fluid,
            fluidity_rate: profile.fluidity_rate,
            identity_changes: profile.identity_changes,
            support_network: profile.support_network.iter().cloned().collect(),
            out_to: profile
                .coming_out
                .iter()
                .filter(|(_, knows)| **knows)
                .map(|(agent, _)| agent.clone())
                .collect(),
            expression_confidence: state.expression_confidence,
            dysphoria: state.dysphoria,
            euphoria: state.euphoria,
            social_comfort: state.social_comfort,
            wellbeing: state.wellbeing(),
            expression_readiness: state.expression_readiness(),
            needs_support: state.needs_support(
                config.affect_threshold,
                config.low_confidence,
                config.low_comfort,
            ),
        }
    }
}

/// Population-level breeding statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BreedingStats {
    pub total_agents: usize,
    pub mature_agents: usize,
    pub total_offspring: u64,
    pub average_offspring_per_agent: f32,
}

/// Aggregated per-system activity counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemStats {
    pub tick: u64,
    pub elapsed: f64,
    pub total_agents: usize,
    pub memories_forgotten: u64,
    pub interactions_processed: u64,
    pub groups_live: usize,
    pub groups_created: u64,
    pub groups_dissolved: u64,
    pub connections_formed: u64,
    pub leadership_changes: u64,
    pub knowledge_transfers: u64,
    pub teaching_sessions: u64,
    pub identity_changes: u64,
    pub support_exchanges: u64,
    pub profile_fallbacks: u64,
    pub name_fallbacks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stranger_report_defaults() {
        let report = RelationshipReport::stranger();
        assert_eq!(report.relationship, "stranger");
        assert_eq!(report.interaction_count, 0);
        assert!(report.last_interaction.is_none());
    }

    #[test]
    fn test_persona_summary_flags_strong_traits() {
        let summary = summarize_personality("fox", &[("cunning".to_string(), 0.9)]);
        assert!(summary.contains("cunning"));

        let balanced = summarize_personality(
            "otter",
            &[
                ("playfulness".to_string(), 0.55),
                ("curiosity".to_string(), 0.5),
            ],
        );
        assert!(balanced.contains("balancing"));

        let empty = summarize_personality("wolf", &[]);
        assert!(empty.contains("balanced"));
    }
}
