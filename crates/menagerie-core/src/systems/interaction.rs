//! Interaction System
//!
//! Proximity pairing, probabilistic interaction triggering, outcome
//! resolution, relationship updates, and social-energy recovery. The
//! probability/outcome helpers are shared with the world facade's manual
//! interaction entry point.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use menagerie_events::EventPayload;

use crate::components::{
    AgentId, InteractionKind, InteractionOutcome, InteractionState, Position, Relationship,
    RelationshipKind, TraitProfile,
};
use crate::config::InteractionConfig;
use crate::events::PendingEvents;
use crate::{SimClock, SimConfig, SimRng};

/// Resource: lifetime counters for the interaction system.
#[derive(Resource, Debug, Default)]
pub struct InteractionActivity {
    pub total_interactions: u64,
    pub successes: u64,
    pub failures: u64,
    next_interaction_id: u64,
}

impl InteractionActivity {
    pub fn generate_id(&mut self) -> String {
        self.next_interaction_id += 1;
        format!("int_{:08}", self.next_interaction_id)
    }
}

/// Probability that two agents interact, before scaling by the base rate
/// and tick length. Charisma and playfulness drive the baseline, an
/// existing relationship amplifies it, strangers are shy, and personality
/// compatibility gives a final multiplier.
pub fn interaction_probability(
    traits1: &TraitProfile,
    traits2: &TraitProfile,
    relationship: Option<&Relationship>,
    config: &InteractionConfig,
) -> f32 {
    let base = (traits1.personality("charisma")
        + traits2.personality("charisma")
        + traits1.personality("playfulness")
        + traits2.personality("playfulness"))
        / 4.0;

    let relationship_modifier = match relationship {
        Some(rel) => 1.0 + rel.strength * config.strength_multiplier,
        None => config.stranger_multiplier,
    };

    let compatibility = traits1.compatibility(traits2);

    (base * relationship_modifier * (1.0 + compatibility * config.compatibility_multiplier))
        .clamp(0.0, 1.0)
}

/// Pick an interaction kind from the existing relationship, falling back to
/// the pair's average playfulness.
pub fn select_interaction_kind(
    traits1: &TraitProfile,
    traits2: &TraitProfile,
    relationship: Option<&Relationship>,
    rng: &mut SmallRng,
) -> InteractionKind {
    if let Some(rel) = relationship {
        match rel.kind {
            RelationshipKind::Friend => {
                return *[InteractionKind::Social, InteractionKind::Communication]
                    .choose(rng)
                    .unwrap_or(&InteractionKind::Communication);
            }
            RelationshipKind::Rival | RelationshipKind::Enemy => {
                return InteractionKind::Competitive;
            }
            RelationshipKind::Mentor => return InteractionKind::Teaching,
            _ => {}
        }
    }

    let avg_playfulness =
        (traits1.personality("playfulness") + traits2.personality("playfulness")) / 2.0;

    if avg_playfulness > 0.7 {
        *[InteractionKind::Social, InteractionKind::Communication]
            .choose(rng)
            .unwrap_or(&InteractionKind::Communication)
    } else if avg_playfulness < 0.3 {
        InteractionKind::Communication
    } else {
        *[InteractionKind::Communication, InteractionKind::Collaboration]
            .choose(rng)
            .unwrap_or(&InteractionKind::Communication)
    }
}

/// Resolve an interaction: a charisma-driven success score with noise maps
/// to an outcome band and a relationship impact in [-1, 1].
pub fn simulate_outcome(
    traits1: &TraitProfile,
    traits2: &TraitProfile,
    config: &InteractionConfig,
    rng: &mut SmallRng,
) -> (InteractionOutcome, f32, f32) {
    let avg_charisma = (traits1.personality("charisma") + traits2.personality("charisma")) / 2.0;
    let score = (avg_charisma + rng.gen_range(-0.2..=0.2)).clamp(0.0, 1.0);

    let (outcome, impact) = if score > config.success_threshold {
        (InteractionOutcome::Success, rng.gen_range(0.1..=0.3))
    } else if score > config.partial_threshold {
        (InteractionOutcome::PartialSuccess, rng.gen_range(0.0..=0.1))
    } else if score > config.neutral_threshold {
        (InteractionOutcome::Neutral, 0.0)
    } else {
        (InteractionOutcome::Failure, rng.gen_range(-0.2..=-0.05))
    };

    let duration = rng.gen_range(1.0..=10.0);
    (outcome, impact, duration)
}

/// System: pair agents in proximity and let them interact probabilistically.
#[allow(clippy::type_complexity)]
pub fn process_interactions(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut activity: ResMut<InteractionActivity>,
    mut query: Query<(&AgentId, &Position, &TraitProfile, &mut InteractionState)>,
) {
    if clock.delta <= 0.0 {
        return;
    }

    let cfg = &config.interaction;
    let now = clock.elapsed;

    let mut pairs = query.iter_combinations_mut::<2>();
    while let Some([(id1, pos1, traits1, mut state1), (id2, pos2, traits2, mut state2)]) =
        pairs.fetch_next()
    {
        if pos1.distance_to(pos2) > cfg.range {
            continue;
        }
        if !(state1.can_interact(now) && state2.can_interact(now)) {
            continue;
        }

        let probability = interaction_probability(
            traits1,
            traits2,
            state1.get_relationship(&id2.0),
            cfg,
        );
        if rng.0.gen::<f32>() >= probability * cfg.base_rate * clock.delta {
            continue;
        }

        let kind = select_interaction_kind(
            traits1,
            traits2,
            state1.get_relationship(&id2.0),
            &mut rng.0,
        );
        let (outcome, impact, duration) = simulate_outcome(traits1, traits2, cfg, &mut rng.0);

        let interaction_id = activity.generate_id();
        state1.begin_interaction(&interaction_id);
        state2.begin_interaction(&interaction_id);
        state1.complete_interaction(&interaction_id, &id2.0, impact, duration, cfg.energy_cost, now);
        state2.complete_interaction(&interaction_id, &id1.0, impact, duration, cfg.energy_cost, now);

        activity.total_interactions += 1;
        match outcome {
            InteractionOutcome::Success | InteractionOutcome::PartialSuccess => {
                activity.successes += 1;
            }
            InteractionOutcome::Failure => activity.failures += 1,
            InteractionOutcome::Neutral => {}
        }

        events.push(
            clock.tick,
            EventPayload::InteractionCompleted {
                agent1: id1.0.clone(),
                agent2: id2.0.clone(),
                interaction: kind.as_str().to_string(),
                outcome: outcome.as_str().to_string(),
                relationship_impact: impact,
            },
        );
    }
}

/// System: linear social-energy recovery for interaction state.
pub fn recover_interaction_energy(clock: Res<SimClock>, mut query: Query<&mut InteractionState>) {
    if clock.delta <= 0.0 {
        return;
    }
    for mut state in &mut query {
        state.recover(clock.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn uniform_traits(value: f32) -> TraitProfile {
        let mut personality = BTreeMap::new();
        for name in ["charisma", "playfulness", "patience"] {
            personality.insert(name.to_string(), value);
        }
        TraitProfile {
            personality,
            physical: BTreeMap::new(),
            ability: BTreeMap::new(),
            mutation_count: 0,
        }
    }

    #[test]
    fn test_strangers_interact_less() {
        let config = InteractionConfig::default();
        let traits = uniform_traits(0.6);

        let stranger_p = interaction_probability(&traits, &traits, None, &config);

        let mut rel = Relationship::new("peer");
        rel.strength = 0.8;
        let friend_p = interaction_probability(&traits, &traits, Some(&rel), &config);

        assert!(friend_p > stranger_p);
    }

    #[test]
    fn test_probability_is_bounded() {
        let config = InteractionConfig::default();
        let traits = uniform_traits(1.0);
        let mut rel = Relationship::new("peer");
        rel.strength = 1.0;

        let p = interaction_probability(&traits, &traits, Some(&rel), &config);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_rivals_compete() {
        let mut rng = SmallRng::seed_from_u64(5);
        let traits = uniform_traits(0.5);
        let mut rel = Relationship::new("peer");
        rel.kind = RelationshipKind::Rival;

        let kind = select_interaction_kind(&traits, &traits, Some(&rel), &mut rng);
        assert_eq!(kind, InteractionKind::Competitive);
    }

    #[test]
    fn test_quiet_pairs_talk() {
        let mut rng = SmallRng::seed_from_u64(5);
        let traits = uniform_traits(0.1);
        let kind = select_interaction_kind(&traits, &traits, None, &mut rng);
        assert_eq!(kind, InteractionKind::Communication);
    }

    #[test]
    fn test_outcome_bands_match_impact_sign() {
        let config = InteractionConfig::default();
        let mut rng = SmallRng::seed_from_u64(99);

        let charming = uniform_traits(0.95);
        let awkward = uniform_traits(0.02);

        let mut saw_success = false;
        let mut saw_failure = false;
        for _ in 0..100 {
            let (outcome, impact, _) = simulate_outcome(&charming, &charming, &config, &mut rng);
            if outcome == InteractionOutcome::Success {
                assert!(impact >= 0.1);
                saw_success = true;
            }
            let (outcome, impact, _) = simulate_outcome(&awkward, &awkward, &config, &mut rng);
            if outcome == InteractionOutcome::Failure {
                assert!(impact < 0.0);
                saw_failure = true;
            }
        }
        assert!(saw_success && saw_failure);
    }

    #[test]
    fn test_system_pairs_nearby_agents() {
        let mut world = World::new();
        let config = SimConfig::default();

        world.insert_resource(SimRng(SmallRng::seed_from_u64(42)));
        world.insert_resource(PendingEvents::new());
        world.insert_resource(InteractionActivity::default());

        let state = InteractionState::new(&config.interaction);
        let traits = uniform_traits(0.95);

        world.spawn((
            AgentId("a".to_string()),
            Position::new(0.0, 0.0),
            traits.clone(),
            state.clone(),
        ));
        world.spawn((
            AgentId("b".to_string()),
            Position::new(5.0, 0.0),
            traits.clone(),
            state.clone(),
        ));
        // Out of range; never interacts
        world.spawn((
            AgentId("c".to_string()),
            Position::new(5_000.0, 0.0),
            traits,
            state,
        ));

        world.insert_resource(config);

        let mut clock = SimClock::new();
        clock.advance(1.0);
        world.insert_resource(clock);

        let mut schedule = Schedule::default();
        schedule.add_systems(process_interactions);

        for _ in 0..300 {
            {
                let mut clock = world.resource_mut::<SimClock>();
                clock.advance(1.0);
            }
            schedule.run(&mut world);
        }

        let activity = world.resource::<InteractionActivity>();
        assert!(activity.total_interactions > 0, "close pair never interacted");

        let mut query = world.query::<(&AgentId, &InteractionState)>();
        for (id, state) in query.iter(&world) {
            match id.0.as_str() {
                "c" => assert_eq!(state.total_interactions, 0),
                _ => assert!(state.relationships.len() <= 1),
            }
        }
    }
}
