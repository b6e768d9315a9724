//! Agent World Facade
//!
//! Owns the ECS world and scheduler, wires the systems in fixed order, and
//! exposes the agent lifecycle, breeding, and query/command entry points
//! consumed by outer layers. Routine not-found cases return `None`/`false`;
//! only malformed commands (duplicate or unknown ids on creation paths)
//! return errors.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use menagerie_events::{Event, EventPayload, WorldSnapshot};

use crate::components::{
    Agent, AgentId, AgentName, GenderIdentity, GenderState, GroupKind, GroupRegistry,
    InteractionKind, InteractionState, KnowledgeBase, KnowledgeKind, LearningMethod, Lifecycle,
    Lineage, MemoryKind, MemoryRecord, MemoryStore, Position, Reproduction, SocialGroup,
    SocialState, SpiritIdentity, TraitProfile,
};
use crate::events::PendingEvents;
use crate::output::{
    BreedingStats, GenderReport, GroupReport, KnowledgeStatsReport, LineageReport, LoraConfig,
    MemoryStatsReport, PersonaReport, RelationshipReport, SnapshotGenerator, SocialNetworkReport,
    SystemStats,
};
use crate::providers::{
    fallback_name, NameProvider, ProfileProvider, ProviderStats, SpiritLibrary, StyleNamer,
    TraitBlueprint,
};
use crate::systems::{
    advance_lifecycles, decay_knowledge, decay_memories, discover_shared_knowledge,
    drift_gender_identity, expire_opportunities, forget_memories, form_groups,
    grow_social_network, process_interactions, process_mutual_support, pursue_opportunities,
    recover_interaction_energy, recover_social_energy, run_teaching_sessions, simulate_outcome,
    update_expression_confidence, update_group_dynamics, AgentIndex, GenderActivity,
    InteractionActivity, LearningActivity, MemoryActivity, SocialActivity,
};
use crate::{SimClock, SimConfig, SimRng};

/// Errors from the facade's creation paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("agent {0} already exists")]
    DuplicateAgent(String),
    #[error("agent {0} not found")]
    UnknownAgent(String),
}

/// The agent world: ECS storage, the fixed-order scheduler, and the
/// providers consulted at agent creation.
pub struct AgentWorld {
    world: World,
    schedule: Schedule,
    profiles: Box<dyn ProfileProvider + Send + Sync>,
    namer: Box<dyn NameProvider + Send + Sync>,
    snapshots: SnapshotGenerator,
    config: SimConfig,
}

impl AgentWorld {
    /// Build a world with the built-in spirit library and name composer.
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self::with_providers(
            config,
            seed,
            Box::new(SpiritLibrary::builtin()),
            Box::new(StyleNamer),
        )
    }

    /// Build a world with caller-supplied providers (pre-fetched outside
    /// the tick loop; the engine never performs I/O mid-tick).
    pub fn with_providers(
        config: SimConfig,
        seed: u64,
        profiles: Box<dyn ProfileProvider + Send + Sync>,
        namer: Box<dyn NameProvider + Send + Sync>,
    ) -> Self {
        let mut world = World::new();

        world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
        world.insert_resource(SimClock::new());
        world.insert_resource(config.clone());
        world.insert_resource(AgentIndex::new());
        world.insert_resource(GroupRegistry::new());
        world.insert_resource(PendingEvents::new());
        world.insert_resource(ProviderStats::default());
        world.insert_resource(MemoryActivity::default());
        world.insert_resource(InteractionActivity::default());
        world.insert_resource(SocialActivity::default());
        world.insert_resource(LearningActivity::default());
        world.insert_resource(GenderActivity::default());

        // Registration order is the only cross-system consistency
        // mechanism; the chain pins it.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                advance_lifecycles,
                decay_memories,
                forget_memories,
                process_interactions,
                recover_interaction_energy,
                form_groups,
                update_group_dynamics,
                grow_social_network,
                recover_social_energy,
                discover_shared_knowledge,
                run_teaching_sessions,
                pursue_opportunities,
                expire_opportunities,
                decay_knowledge,
                drift_gender_identity,
                update_expression_confidence,
                process_mutual_support,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            profiles,
            namer,
            snapshots: SnapshotGenerator::new(),
            config,
        }
    }

    /// Run one tick of `delta` simulated seconds: advance the clock, then
    /// every registered system once, in registration order.
    pub fn update(&mut self, delta: f32) {
        self.world.resource_mut::<SimClock>().advance(delta);
        self.schedule.run(&mut self.world);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> SimClock {
        *self.world.resource::<SimClock>()
    }

    fn now(&self) -> f64 {
        self.world.resource::<SimClock>().elapsed
    }

    fn tick(&self) -> u64 {
        self.world.resource::<SimClock>().tick
    }

    fn take_rng(&mut self) -> SmallRng {
        self.world
            .remove_resource::<SimRng>()
            .map(|rng| rng.0)
            .unwrap_or_else(|| SmallRng::seed_from_u64(0))
    }

    fn put_rng(&mut self, rng: SmallRng) {
        self.world.insert_resource(SimRng(rng));
    }

    fn push_event(&mut self, payload: EventPayload) {
        let tick = self.tick();
        self.world.resource_mut::<PendingEvents>().push(tick, payload);
    }

    // ------------------------------------------------------------------
    // Agent lifecycle
    // ------------------------------------------------------------------

    pub fn contains_agent(&self, agent_id: &str) -> bool {
        self.world.resource::<AgentIndex>().contains(agent_id)
    }

    pub fn entity_of(&self, agent_id: &str) -> Option<Entity> {
        self.world.resource::<AgentIndex>().get(agent_id)
    }

    pub fn agent_count(&self) -> usize {
        self.world.resource::<AgentIndex>().len()
    }

    pub fn agent_ids(&self) -> Vec<String> {
        self.world.resource::<AgentIndex>().ids().cloned().collect()
    }

    /// Create a new agent with a full component set. Blueprint and name
    /// come from the providers, with observable built-in fallbacks.
    pub fn create_agent(
        &mut self,
        agent_id: &str,
        spirit: Option<&str>,
        style: Option<&str>,
        name: Option<String>,
    ) -> Result<Entity, WorldError> {
        if self.contains_agent(agent_id) {
            return Err(WorldError::DuplicateAgent(agent_id.to_string()));
        }

        let spirit = spirit.unwrap_or("fox").to_string();
        let style = style.unwrap_or("foundation").to_string();

        let (blueprint, profile_fell_back) = match self.profiles.profile(&spirit) {
            Some(blueprint) => (blueprint, false),
            None => {
                tracing::warn!(spirit, "no trait profile available, using balanced fallback");
                (TraitBlueprint::balanced(), true)
            }
        };

        let mut rng = self.take_rng();
        let traits =
            TraitProfile::from_blueprint(&blueprint, self.config.world.trait_jitter, &mut rng);
        let (name, name_fell_back) = match name {
            Some(name) => (name, false),
            None => match self.namer.generate(&spirit, &style, &mut rng) {
                Some(name) => (name, false),
                None => {
                    tracing::warn!(spirit, style, "name provider declined, composing fallback");
                    (fallback_name(&spirit, &mut rng), true)
                }
            },
        };
        let position = Position::new(
            rng.gen_range(self.config.world.spawn_min_x..=self.config.world.spawn_max_x),
            rng.gen_range(self.config.world.spawn_min_y..=self.config.world.spawn_max_y),
        );
        self.put_rng(rng);

        {
            let mut stats = self.world.resource_mut::<ProviderStats>();
            if profile_fell_back {
                stats.profile_fallbacks += 1;
            }
            if name_fell_back {
                stats.name_fallbacks += 1;
            }
        }
        if profile_fell_back {
            self.push_event(EventPayload::ProviderFallback {
                agent_id: agent_id.to_string(),
                provider: "trait_profile".to_string(),
            });
        }

        let now = self.now();
        let entity = self.spawn_agent(
            agent_id,
            &name,
            SpiritIdentity::new(&spirit, &style),
            traits,
            Lineage::new(),
            position,
            now,
        );

        tracing::info!(agent_id, name, spirit, "created agent");
        self.push_event(EventPayload::AgentCreated {
            agent_id: agent_id.to_string(),
            name,
            spirit,
        });
        Ok(entity)
    }

    /// Create an offspring of two existing agents. Traits average the
    /// parents' shared keys with mutation; spirit and style follow the
    /// first parent; lineage is updated on both sides.
    pub fn create_offspring(
        &mut self,
        parent1_id: &str,
        parent2_id: &str,
        offspring_id: &str,
    ) -> Result<Entity, WorldError> {
        if self.contains_agent(offspring_id) {
            return Err(WorldError::DuplicateAgent(offspring_id.to_string()));
        }
        let parent1 = self
            .entity_of(parent1_id)
            .ok_or_else(|| WorldError::UnknownAgent(parent1_id.to_string()))?;
        let parent2 = self
            .entity_of(parent2_id)
            .ok_or_else(|| WorldError::UnknownAgent(parent2_id.to_string()))?;

        let traits1 = self
            .world
            .get::<TraitProfile>(parent1)
            .cloned()
            .ok_or_else(|| WorldError::UnknownAgent(parent1_id.to_string()))?;
        let traits2 = self
            .world
            .get::<TraitProfile>(parent2)
            .cloned()
            .ok_or_else(|| WorldError::UnknownAgent(parent2_id.to_string()))?;
        let identity = self
            .world
            .get::<SpiritIdentity>(parent1)
            .cloned()
            .unwrap_or_else(|| SpiritIdentity::new("fox", "foundation"));
        let ancestors1 = self
            .world
            .get::<Lineage>(parent1)
            .map(|lineage| lineage.ancestors.clone())
            .unwrap_or_default();
        let ancestors2 = self
            .world
            .get::<Lineage>(parent2)
            .map(|lineage| lineage.ancestors.clone())
            .unwrap_or_default();

        let mut rng = self.take_rng();
        let traits = TraitProfile::inherit(
            &traits1,
            &traits2,
            self.config.world.inheritance_mutation,
            &mut rng,
        );
        let name = self
            .namer
            .generate(&identity.spirit, &identity.style, &mut rng)
            .unwrap_or_else(|| fallback_name(&identity.spirit, &mut rng));
        let position = Position::new(
            rng.gen_range(self.config.world.spawn_min_x..=self.config.world.spawn_max_x),
            rng.gen_range(self.config.world.spawn_min_y..=self.config.world.spawn_max_y),
        );
        self.put_rng(rng);

        let now = self.now();
        let mutation_count = traits.mutation_count;
        let lineage = Lineage::for_offspring(parent1_id, parent2_id, &ancestors1, &ancestors2);
        let entity = self.spawn_agent(
            offspring_id,
            &name,
            identity,
            traits,
            lineage,
            position,
            now,
        );

        for parent in [parent1, parent2] {
            if let Some(mut lineage) = self.world.get_mut::<Lineage>(parent) {
                lineage.add_child(offspring_id);
            }
            if let Some(mut repro) = self.world.get_mut::<Reproduction>(parent) {
                repro.record_offspring(now);
            }
        }

        tracing::info!(offspring_id, parent1_id, parent2_id, "created offspring");
        self.push_event(EventPayload::OffspringCreated {
            agent_id: offspring_id.to_string(),
            parent1: parent1_id.to_string(),
            parent2: parent2_id.to_string(),
            mutation_count,
        });
        Ok(entity)
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_agent(
        &mut self,
        agent_id: &str,
        name: &str,
        identity: SpiritIdentity,
        traits: TraitProfile,
        lineage: Lineage,
        position: Position,
        now: f64,
    ) -> Entity {
        let entity = self
            .world
            .spawn((
                Agent,
                AgentId(agent_id.to_string()),
                AgentName(name.to_string()),
                identity,
                traits,
                lineage,
                Reproduction::new(),
                Lifecycle::new(now, &self.config.lifecycle),
                MemoryStore::new(&self.config.memory),
                InteractionState::new(&self.config.interaction),
                SocialState::new(&self.config.social),
                KnowledgeBase::new(&self.config.learning, now),
                GenderState::default(),
                position,
            ))
            .id();

        self.world
            .resource_mut::<AgentIndex>()
            .insert(agent_id, entity);
        entity
    }

    /// Remove an agent entirely: group rosters, the id index, and the
    /// entity itself. Returns false when the agent does not exist.
    pub fn remove_agent(&mut self, agent_id: &str) -> bool {
        let Some(entity) = self.entity_of(agent_id) else {
            return false;
        };

        let memberships: Vec<String> = self
            .world
            .get::<SocialState>(entity)
            .map(|social| social.group_memberships.iter().cloned().collect())
            .unwrap_or_default();
        {
            let mut registry = self.world.resource_mut::<GroupRegistry>();
            for group_id in memberships {
                if let Some(group) = registry.get_mut(&group_id) {
                    group.remove_member(agent_id);
                }
            }
        }

        self.world.resource_mut::<AgentIndex>().remove(agent_id);
        self.world.despawn(entity);
        tracing::info!(agent_id, "removed agent");
        true
    }

    /// Remove every agent whose lifecycle has run past its maximum age.
    /// Returns the removed ids.
    pub fn prune_dead(&mut self) -> Vec<String> {
        let dead: Vec<String> = {
            let mut query = self.world.query::<(&AgentId, &Lifecycle)>();
            query
                .iter(&self.world)
                .filter(|(_, lifecycle)| !lifecycle.is_alive())
                .map(|(id, _)| id.0.clone())
                .collect()
        };
        for agent_id in &dead {
            self.remove_agent(agent_id);
        }
        dead
    }

    /// Agents whose lifecycle allows reproduction.
    pub fn mature_agents(&mut self) -> Vec<String> {
        let mut query = self
            .world
            .query::<(&AgentId, &Lifecycle, &Reproduction)>();
        query
            .iter(&self.world)
            .filter(|(_, lifecycle, repro)| lifecycle.is_mature() && repro.can_reproduce)
            .map(|(id, _, _)| id.0.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Compatibility and lineage queries
    // ------------------------------------------------------------------

    /// Personality compatibility between two agents; symmetric.
    pub fn analyze_compatibility(&self, agent1_id: &str, agent2_id: &str) -> Option<f32> {
        let entity1 = self.entity_of(agent1_id)?;
        let entity2 = self.entity_of(agent2_id)?;
        let traits1 = self.world.get::<TraitProfile>(entity1)?;
        let traits2 = self.world.get::<TraitProfile>(entity2)?;
        Some(traits1.compatibility(traits2))
    }

    /// Candidate mates above the compatibility threshold, best first.
    pub fn find_compatible_mates(
        &mut self,
        agent_id: &str,
        max_results: usize,
    ) -> Vec<(String, f32)> {
        let Some(entity) = self.entity_of(agent_id) else {
            return Vec::new();
        };
        let Some(traits) = self.world.get::<TraitProfile>(entity).cloned() else {
            return Vec::new();
        };

        let threshold = self.config.world.mate_compatibility_threshold;
        let mut candidates: Vec<(String, f32)> = {
            let mut query = self.world.query::<(&AgentId, &TraitProfile)>();
            query
                .iter(&self.world)
                .filter(|(id, _)| id.0 != agent_id)
                .map(|(id, other)| (id.0.clone(), traits.compatibility(other)))
                .filter(|(_, compatibility)| *compatibility >= threshold)
                .collect()
        };

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(max_results);
        candidates
    }

    pub fn get_lineage(&self, agent_id: &str) -> Option<LineageReport> {
        let entity = self.entity_of(agent_id)?;
        let lineage = self.world.get::<Lineage>(entity)?;
        Some(LineageReport::build(agent_id, lineage))
    }

    pub fn get_agent_persona(&self, agent_id: &str) -> Option<PersonaReport> {
        let entity = self.entity_of(agent_id)?;
        let name = self.world.get::<AgentName>(entity)?;
        let identity = self.world.get::<SpiritIdentity>(entity)?;
        let traits = self.world.get::<TraitProfile>(entity);
        Some(PersonaReport::build(agent_id, &name.0, identity, traits))
    }

    pub fn get_lora_config(&self, agent_id: &str) -> Option<LoraConfig> {
        let entity = self.entity_of(agent_id)?;
        self.world.get::<SpiritIdentity>(entity)?;
        Some(LoraConfig::build(self.world.get::<TraitProfile>(entity)))
    }

    pub fn breeding_stats(&mut self) -> BreedingStats {
        let mut query = self.world.query::<(&Lifecycle, &Reproduction)>();
        let mut total = 0usize;
        let mut mature = 0usize;
        let mut offspring = 0u64;
        for (lifecycle, repro) in query.iter(&self.world) {
            total += 1;
            if lifecycle.is_mature() {
                mature += 1;
            }
            offspring += u64::from(repro.offspring_count);
        }

        BreedingStats {
            total_agents: total,
            mature_agents: mature,
            total_offspring: offspring,
            average_offspring_per_agent: if total == 0 {
                0.0
            } else {
                offspring as f32 / total as f32
            },
        }
    }

    // ------------------------------------------------------------------
    // Memory entry points
    // ------------------------------------------------------------------

    pub fn store_memory(
        &mut self,
        agent_id: &str,
        kind: MemoryKind,
        content: &str,
        importance: f32,
        emotional_weight: f32,
        associated_agents: Vec<String>,
    ) -> Option<String> {
        let now = self.now();
        let entity = self.entity_of(agent_id)?;
        let mut store = self.world.get_mut::<MemoryStore>(entity)?;
        Some(store.store(kind, content, importance, emotional_weight, associated_agents, now))
    }

    pub fn retrieve_memories(
        &mut self,
        agent_id: &str,
        query: Option<&str>,
        kind: Option<MemoryKind>,
        limit: usize,
        min_importance: f32,
    ) -> Vec<MemoryRecord> {
        let now = self.now();
        let Some(entity) = self.entity_of(agent_id) else {
            return Vec::new();
        };
        let Some(mut store) = self.world.get_mut::<MemoryStore>(entity) else {
            return Vec::new();
        };
        store.retrieve(query, kind, limit, min_importance, now)
    }

    pub fn get_memory_stats(&self, agent_id: &str) -> Option<MemoryStatsReport> {
        let entity = self.entity_of(agent_id)?;
        let store = self.world.get::<MemoryStore>(entity)?;
        Some(MemoryStatsReport::build(agent_id, store))
    }

    // ------------------------------------------------------------------
    // Interaction entry points
    // ------------------------------------------------------------------

    /// Manually run an interaction between two agents. Subject to the same
    /// proximity and readiness gates as the spontaneous path.
    pub fn initiate_interaction(
        &mut self,
        agent1_id: &str,
        agent2_id: &str,
        kind: InteractionKind,
    ) -> bool {
        let now = self.now();
        let Some(entity1) = self.entity_of(agent1_id) else {
            return false;
        };
        let Some(entity2) = self.entity_of(agent2_id) else {
            return false;
        };
        if entity1 == entity2 {
            return false;
        }

        let (Some(pos1), Some(pos2)) = (
            self.world.get::<Position>(entity1).copied(),
            self.world.get::<Position>(entity2).copied(),
        ) else {
            return false;
        };
        if pos1.distance_to(&pos2) > self.config.interaction.range {
            tracing::debug!(agent1_id, agent2_id, "agents out of interaction range");
            return false;
        }

        let (Some(traits1), Some(traits2)) = (
            self.world.get::<TraitProfile>(entity1).cloned(),
            self.world.get::<TraitProfile>(entity2).cloned(),
        ) else {
            return false;
        };

        let ready = self
            .world
            .get::<InteractionState>(entity1)
            .map_or(false, |state| state.can_interact(now))
            && self
                .world
                .get::<InteractionState>(entity2)
                .map_or(false, |state| state.can_interact(now));
        if !ready {
            return false;
        }

        let mut rng = self.take_rng();
        let (outcome, impact, duration) =
            simulate_outcome(&traits1, &traits2, &self.config.interaction, &mut rng);
        self.put_rng(rng);

        let interaction_id = self
            .world
            .resource_mut::<InteractionActivity>()
            .generate_id();
        let energy_cost = self.config.interaction.energy_cost;

        if let Some(mut state) = self.world.get_mut::<InteractionState>(entity1) {
            state.begin_interaction(&interaction_id);
            state.complete_interaction(&interaction_id, agent2_id, impact, duration, energy_cost, now);
        }
        if let Some(mut state) = self.world.get_mut::<InteractionState>(entity2) {
            state.begin_interaction(&interaction_id);
            state.complete_interaction(&interaction_id, agent1_id, impact, duration, energy_cost, now);
        }
        self.world.resource_mut::<InteractionActivity>().total_interactions += 1;

        self.push_event(EventPayload::InteractionCompleted {
            agent1: agent1_id.to_string(),
            agent2: agent2_id.to_string(),
            interaction: kind.as_str().to_string(),
            outcome: outcome.as_str().to_string(),
            relationship_impact: impact,
        });
        true
    }

    /// Relationship as seen from the first agent; the stranger default when
    /// no record exists yet.
    pub fn get_relationship_status(
        &self,
        agent1_id: &str,
        agent2_id: &str,
    ) -> Option<RelationshipReport> {
        let entity = self.entity_of(agent1_id)?;
        let state = self.world.get::<InteractionState>(entity)?;
        Some(
            state
                .get_relationship(agent2_id)
                .map_or_else(RelationshipReport::stranger, RelationshipReport::build),
        )
    }

    // ------------------------------------------------------------------
    // Social entry points
    // ------------------------------------------------------------------

    /// Found a group on behalf of an agent. Costs the creator social
    /// energy; members that do not exist are skipped.
    pub fn create_social_group(
        &mut self,
        creator_id: &str,
        name: &str,
        kind: GroupKind,
        member_ids: &[String],
    ) -> Option<String> {
        let now = self.now();
        let creator_entity = self.entity_of(creator_id)?;

        {
            let mut social = self.world.get_mut::<SocialState>(creator_entity)?;
            if !social.consume_energy(self.config.social.manual_formation_cost) {
                tracing::debug!(creator_id, "insufficient social energy to found a group");
                return None;
            }
        }

        let group_id = self.world.resource_mut::<GroupRegistry>().generate_id();
        let mut group = SocialGroup::new(group_id.clone(), name, kind, now);
        group.cohesion = 0.7;
        group.activity_level = 0.8;
        group.stability = 0.6;
        group.add_leader(creator_id);

        if let Some(mut social) = self.world.get_mut::<SocialState>(creator_entity) {
            social.take_leadership(&group_id);
            social.groups_created += 1;
        }

        for member_id in member_ids {
            if member_id == creator_id {
                continue;
            }
            let Some(member_entity) = self.entity_of(member_id) else {
                continue;
            };
            let Some(mut social) = self.world.get_mut::<SocialState>(member_entity) else {
                continue;
            };
            group.add_member(member_id);
            social.join_group(&group_id);
        }

        let member_count = group.members.len();
        self.world.resource_mut::<GroupRegistry>().insert(group);

        tracing::info!(group_id, creator_id, member_count, "group founded");
        self.push_event(EventPayload::GroupFormed {
            group_id: group_id.clone(),
            group_kind: kind.as_str().to_string(),
            leader: creator_id.to_string(),
            member_count,
        });
        Some(group_id)
    }

    pub fn get_social_network(&self, agent_id: &str) -> Option<SocialNetworkReport> {
        let entity = self.entity_of(agent_id)?;
        let social = self.world.get::<SocialState>(entity)?;
        Some(SocialNetworkReport::build(agent_id, social))
    }

    pub fn get_group_info(&self, group_id: &str) -> Option<GroupReport> {
        self.world
            .resource::<GroupRegistry>()
            .get(group_id)
            .map(GroupReport::build)
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.world.resource::<GroupRegistry>().ids()
    }

    // ------------------------------------------------------------------
    // Knowledge entry points
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn add_knowledge(
        &mut self,
        agent_id: &str,
        title: &str,
        kind: KnowledgeKind,
        description: &str,
        proficiency: f32,
        confidence: f32,
        method: LearningMethod,
        source_agent: Option<String>,
        difficulty: f32,
        importance: f32,
        transferability: f32,
    ) -> Option<String> {
        let now = self.now();
        let entity = self.entity_of(agent_id)?;
        let mut kb = self.world.get_mut::<KnowledgeBase>(entity)?;
        Some(kb.add_item(
            title,
            kind,
            description,
            proficiency,
            confidence,
            method,
            source_agent,
            difficulty,
            importance,
            transferability,
            now,
        ))
    }

    /// Directly transfer a teachable knowledge item. The student ends up
    /// with a new, weaker copy; fails when the item is not teachable or the
    /// student already knows it.
    pub fn transfer_knowledge(
        &mut self,
        teacher_id: &str,
        student_id: &str,
        knowledge_id: &str,
        method: LearningMethod,
    ) -> bool {
        let now = self.now();
        let cfg = &self.config.learning;
        let Some(teacher_entity) = self.entity_of(teacher_id) else {
            return false;
        };
        let Some(student_entity) = self.entity_of(student_id) else {
            return false;
        };
        if teacher_entity == student_entity {
            return false;
        }

        let item = {
            let Some(kb) = self.world.get::<KnowledgeBase>(teacher_entity) else {
                return false;
            };
            match kb.get(knowledge_id) {
                Some(item)
                    if item.can_teach(
                        cfg.min_teach_proficiency,
                        cfg.min_teach_confidence,
                        cfg.min_teach_transferability,
                    ) =>
                {
                    item.clone()
                }
                _ => return false,
            }
        };

        let transfer_rate = cfg.transfer_rate;
        let confidence_ratio = cfg.teach_confidence_ratio;
        {
            let Some(mut kb) = self.world.get_mut::<KnowledgeBase>(student_entity) else {
                return false;
            };
            if kb.has_title(&item.title) {
                return false;
            }

            let effectiveness = kb.learning_effectiveness(method);
            let amount = item.teaching_effectiveness() * effectiveness * transfer_rate;
            kb.add_item(
                &item.title,
                item.kind,
                &item.description,
                amount,
                amount * confidence_ratio,
                method,
                Some(teacher_id.to_string()),
                item.difficulty,
                item.importance,
                item.transferability,
                now,
            );
            kb.consume_opportunity_for(teacher_id, knowledge_id);
            kb.learning_sessions += 1;
        }

        if let Some(mut kb) = self.world.get_mut::<KnowledgeBase>(teacher_entity) {
            kb.teaching_sessions += 1;
            kb.total_shared += 1;
        }
        {
            let mut activity = self.world.resource_mut::<LearningActivity>();
            activity.knowledge_transfers += 1;
            activity.teaching_sessions += 1;
            activity.learning_sessions += 1;
        }

        self.push_event(EventPayload::KnowledgeTransferred {
            teacher: teacher_id.to_string(),
            student: student_id.to_string(),
            title: item.title.clone(),
            method: method.as_str().to_string(),
        });
        true
    }

    pub fn get_knowledge_stats(&self, agent_id: &str) -> Option<KnowledgeStatsReport> {
        let entity = self.entity_of(agent_id)?;
        let kb = self.world.get::<KnowledgeBase>(entity)?;
        Some(KnowledgeStatsReport::build(agent_id, kb, &self.config.learning))
    }

    // ------------------------------------------------------------------
    // Gender entry points
    // ------------------------------------------------------------------

    pub fn update_gender_identity(&mut self, agent_id: &str, identity: GenderIdentity) -> bool {
        let Some(entity) = self.entity_of(agent_id) else {
            return false;
        };
        let Some(mut state) = self.world.get_mut::<GenderState>(entity) else {
            return false;
        };

        let old = state.profile.primary_identity;
        if old == identity {
            return true;
        }
        state.profile.update_identity(identity);
        self.world.resource_mut::<GenderActivity>().identity_changes += 1;

        self.push_event(EventPayload::IdentityChanged {
            agent_id: agent_id.to_string(),
            old_identity: old.as_str().to_string(),
            new_identity: identity.as_str().to_string(),
        });
        true
    }

    pub fn add_support_agent(&mut self, agent_id: &str, support_agent_id: &str) -> bool {
        let Some(entity) = self.entity_of(agent_id) else {
            return false;
        };
        let Some(mut state) = self.world.get_mut::<GenderState>(entity) else {
            return false;
        };
        state.profile.add_support_agent(support_agent_id);
        true
    }

    pub fn remove_support_agent(&mut self, agent_id: &str, support_agent_id: &str) -> bool {
        let Some(entity) = self.entity_of(agent_id) else {
            return false;
        };
        let Some(mut state) = self.world.get_mut::<GenderState>(entity) else {
            return false;
        };
        state.profile.remove_support_agent(support_agent_id);
        true
    }

    pub fn set_coming_out_status(
        &mut self,
        agent_id: &str,
        other_agent_id: &str,
        knows: bool,
    ) -> bool {
        let Some(entity) = self.entity_of(agent_id) else {
            return false;
        };
        let Some(mut state) = self.world.get_mut::<GenderState>(entity) else {
            return false;
        };
        state.profile.set_coming_out(other_agent_id, knows);
        true
    }

    pub fn get_gender_info(&self, agent_id: &str) -> Option<GenderReport> {
        let entity = self.entity_of(agent_id)?;
        let state = self.world.get::<GenderState>(entity)?;
        Some(GenderReport::build(agent_id, state, &self.config.gender))
    }

    // ------------------------------------------------------------------
    // Observability
    // ------------------------------------------------------------------

    /// Drain the events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.world.resource_mut::<PendingEvents>().drain()
    }

    /// Capture a full world snapshot.
    pub fn snapshot(&mut self) -> WorldSnapshot {
        self.snapshots.generate(&mut self.world)
    }

    /// Aggregated per-system activity counters.
    pub fn system_stats(&self) -> SystemStats {
        let clock = self.world.resource::<SimClock>();
        let registry = self.world.resource::<GroupRegistry>();
        let memory = self.world.resource::<MemoryActivity>();
        let interaction = self.world.resource::<InteractionActivity>();
        let social = self.world.resource::<SocialActivity>();
        let learning = self.world.resource::<LearningActivity>();
        let gender = self.world.resource::<GenderActivity>();
        let providers = self.world.resource::<ProviderStats>();

        SystemStats {
            tick: clock.tick,
            elapsed: clock.elapsed,
            total_agents: self.agent_count(),
            memories_forgotten: memory.records_forgotten,
            interactions_processed: interaction.total_interactions,
            groups_live: registry.len(),
            groups_created: registry.total_created,
            groups_dissolved: registry.total_dissolved,
            connections_formed: social.connections_formed,
            leadership_changes: social.leadership_changes,
            knowledge_transfers: learning.knowledge_transfers,
            teaching_sessions: learning.teaching_sessions,
            identity_changes: gender.identity_changes,
            support_exchanges: gender.support_exchanges,
            profile_fallbacks: providers.profile_fallbacks,
            name_fallbacks: providers.name_fallbacks,
        }
    }

    /// Direct access to the underlying ECS world for embedding callers
    /// that need more than the query entry points expose.
    pub fn ecs(&mut self) -> &mut World {
        &mut self.world
    }

    /// Direct component access for tests and embedding callers.
    pub fn component<T: Component>(&self, agent_id: &str) -> Option<&T> {
        let entity = self.entity_of(agent_id)?;
        self.world.get::<T>(entity)
    }

    /// Direct mutable component access for embedding callers that need to
    /// adjust agent state outside the systems (e.g. aging a test cohort).
    pub fn component_mut<T: Component>(&mut self, agent_id: &str) -> Option<Mut<'_, T>> {
        let entity = self.entity_of(agent_id)?;
        self.world.get_mut::<T>(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> AgentWorld {
        AgentWorld::new(SimConfig::default(), 42)
    }

    #[test]
    fn test_create_agent_attaches_full_component_set() {
        let mut w = world();
        w.create_agent("fox-1", Some("fox"), Some("foundation"), None)
            .unwrap();

        assert!(w.contains_agent("fox-1"));
        assert!(w.component::<TraitProfile>("fox-1").is_some());
        assert!(w.component::<MemoryStore>("fox-1").is_some());
        assert!(w.component::<GenderState>("fox-1").is_some());
        assert!(w.component::<Position>("fox-1").is_some());

        let persona = w.get_agent_persona("fox-1").unwrap();
        assert_eq!(persona.spirit, "fox");
        assert!(!persona.name.is_empty());
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let mut w = world();
        w.create_agent("fox-1", None, None, None).unwrap();
        assert_eq!(
            w.create_agent("fox-1", None, None, None),
            Err(WorldError::DuplicateAgent("fox-1".to_string()))
        );
    }

    #[test]
    fn test_unknown_spirit_falls_back_observably() {
        let mut w = world();
        w.create_agent("mystery-1", Some("kraken"), None, None).unwrap();

        let stats = w.system_stats();
        assert_eq!(stats.profile_fallbacks, 1);

        // Balanced fallback: every personality trait near the midpoint
        // before jitter, so all values stay in a tight band.
        let traits = w.component::<TraitProfile>("mystery-1").unwrap();
        for value in traits.personality.values() {
            assert!((0.3..=0.7).contains(value));
        }
    }

    #[test]
    fn test_offspring_requires_existing_parents() {
        let mut w = world();
        w.create_agent("fox-1", None, None, None).unwrap();

        assert_eq!(
            w.create_offspring("fox-1", "ghost", "kit-1"),
            Err(WorldError::UnknownAgent("ghost".to_string()))
        );
        assert!(!w.contains_agent("kit-1"));
    }

    #[test]
    fn test_offspring_lineage_is_bidirectional() {
        let mut w = world();
        w.create_agent("fox-1", Some("fox"), None, None).unwrap();
        w.create_agent("fox-2", Some("fox"), None, None).unwrap();
        w.create_offspring("fox-1", "fox-2", "kit-1").unwrap();

        let kit = w.get_lineage("kit-1").unwrap();
        assert_eq!(kit.parents, vec!["fox-1", "fox-2"]);

        for parent in ["fox-1", "fox-2"] {
            let lineage = w.get_lineage(parent).unwrap();
            assert!(lineage.children.contains(&"kit-1".to_string()));
            assert!(lineage.descendants.contains(&"kit-1".to_string()));
        }

        let stats = w.breeding_stats();
        assert_eq!(stats.total_offspring, 2);
    }

    #[test]
    fn test_compatibility_is_symmetric_and_self_none_for_missing() {
        let mut w = world();
        w.create_agent("fox-1", Some("fox"), None, None).unwrap();
        w.create_agent("wolf-1", Some("wolf"), None, None).unwrap();

        let ab = w.analyze_compatibility("fox-1", "wolf-1").unwrap();
        let ba = w.analyze_compatibility("wolf-1", "fox-1").unwrap();
        assert!((ab - ba).abs() < f32::EPSILON);

        assert!(w.analyze_compatibility("fox-1", "ghost").is_none());
    }

    #[test]
    fn test_memory_round_trip_through_facade() {
        let mut w = world();
        w.create_agent("fox-1", None, None, None).unwrap();

        let id = w
            .store_memory("fox-1", MemoryKind::Episodic, "found the river", 0.8, 0.2, vec![])
            .unwrap();
        assert!(!id.is_empty());

        let memories = w.retrieve_memories("fox-1", Some("river"), None, 10, 0.0);
        assert_eq!(memories.len(), 1);

        let stats = w.get_memory_stats("fox-1").unwrap();
        assert_eq!(stats.total_memories, 1);
        assert_eq!(stats.total_formed, 1);

        assert!(w.store_memory("ghost", MemoryKind::Episodic, "x", 0.5, 0.0, vec![]).is_none());
    }

    #[test]
    fn test_relationship_status_defaults_to_stranger() {
        let mut w = world();
        w.create_agent("fox-1", None, None, None).unwrap();
        w.create_agent("fox-2", None, None, None).unwrap();

        let report = w.get_relationship_status("fox-1", "fox-2").unwrap();
        assert_eq!(report.relationship, "stranger");
        assert!(w.get_relationship_status("ghost", "fox-1").is_none());
    }

    #[test]
    fn test_manual_group_creation() {
        let mut w = world();
        for id in ["a", "b", "c"] {
            w.create_agent(id, None, None, None).unwrap();
        }

        let group_id = w
            .create_social_group("a", "river circle", GroupKind::Community, &["b".to_string(), "c".to_string()])
            .unwrap();

        let info = w.get_group_info(&group_id).unwrap();
        assert_eq!(info.member_count, 3);
        assert!(info.leaders.contains(&"a".to_string()));

        let network = w.get_social_network("b").unwrap();
        assert!(network.group_memberships.contains(&group_id));
    }

    #[test]
    fn test_gender_entry_points() {
        let mut w = world();
        w.create_agent("fox-1", None, None, None).unwrap();

        assert!(w.update_gender_identity("fox-1", GenderIdentity::Genderfluid));
        assert!(w.add_support_agent("fox-1", "fox-2"));
        assert!(w.set_coming_out_status("fox-1", "fox-2", true));

        let info = w.get_gender_info("fox-1").unwrap();
        assert_eq!(info.primary_identity, "genderfluid");
        assert_eq!(info.identity_changes, 1);
        assert!(info.support_network.contains(&"fox-2".to_string()));
        assert!(info.out_to.contains(&"fox-2".to_string()));

        assert!(!w.update_gender_identity("ghost", GenderIdentity::Male));
    }

    #[test]
    fn test_remove_agent_cleans_groups_and_index() {
        let mut w = world();
        for id in ["a", "b", "c"] {
            w.create_agent(id, None, None, None).unwrap();
        }
        let group_id = w
            .create_social_group("a", "trio", GroupKind::Friendship, &["b".to_string(), "c".to_string()])
            .unwrap();

        assert!(w.remove_agent("b"));
        assert!(!w.contains_agent("b"));
        let info = w.get_group_info(&group_id).unwrap();
        assert!(!info.members.contains(&"b".to_string()));

        assert!(!w.remove_agent("b"));
    }

    #[test]
    fn test_update_advances_clock_and_runs_systems() {
        let mut w = world();
        w.create_agent("fox-1", None, None, None).unwrap();

        w.update(crate::SECONDS_PER_DAY as f32);
        assert_eq!(w.clock().tick, 1);

        let lifecycle = w.component::<Lifecycle>("fox-1").unwrap();
        assert!((lifecycle.age - 1.0).abs() < 1e-4);
    }
}
