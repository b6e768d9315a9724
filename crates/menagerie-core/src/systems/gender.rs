//! Gender System
//!
//! Identity fluidity, expression-confidence dynamics, and mutual-support
//! effects between agents.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use menagerie_events::EventPayload;

use crate::components::{AgentId, GenderIdentity, GenderState};
use crate::events::PendingEvents;
use crate::{SimClock, SimConfig, SimRng};

/// Resource: lifetime counters for the gender system.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GenderActivity {
    pub identity_changes: u64,
    pub support_exchanges: u64,
}

/// System: fluid agents may shift primary identity, with probability
/// scaled by their fluidity rate.
pub fn drift_gender_identity(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut activity: ResMut<GenderActivity>,
    mut query: Query<(&AgentId, &mut GenderState)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let scale = config.gender.fluidity_scale;

    for (id, mut state) in &mut query {
        if !state.profile.is_identity_fluid() {
            continue;
        }
        if rng.0.gen::<f32>() >= state.profile.fluidity_rate * scale {
            continue;
        }

        let current = state.profile.primary_identity;
        let candidates: Vec<GenderIdentity> = GenderIdentity::all()
            .iter()
            .copied()
            .filter(|identity| *identity != current)
            .collect();
        let Some(&new_identity) = candidates.choose(&mut rng.0) else {
            continue;
        };

        state.profile.update_identity(new_identity);
        activity.identity_changes += 1;

        tracing::info!(
            agent = id.0,
            from = current.as_str(),
            to = new_identity.as_str(),
            "gender identity changed"
        );
        events.push(
            clock.tick,
            EventPayload::IdentityChanged {
                agent_id: id.0.clone(),
                old_identity: current.as_str().to_string(),
                new_identity: new_identity.as_str().to_string(),
            },
        );
    }
}

/// System: expression confidence drifts with support, euphoria, dysphoria,
/// and social comfort. Every delta clamps the scalar to [0, 1].
pub fn update_expression_confidence(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut query: Query<&mut GenderState>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.gender;

    for mut state in &mut query {
        let mut change = 0.0;

        if !state.profile.support_network.is_empty() {
            change += cfg.support_confidence_gain;
        }
        if state.euphoria > cfg.affect_threshold {
            change += cfg.euphoria_confidence_gain;
        }
        if state.dysphoria > cfg.affect_threshold {
            change -= cfg.dysphoria_confidence_loss;
        }
        if state.social_comfort < cfg.low_comfort {
            change -= cfg.discomfort_confidence_loss;
        }

        if change != 0.0 {
            state.update_confidence(change);
        }
    }
}

/// System: pairs who list each other in their support networks both gain
/// small confidence and euphoria increments.
pub fn process_mutual_support(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut activity: ResMut<GenderActivity>,
    mut query: Query<(&AgentId, &mut GenderState)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let gain = config.gender.mutual_support_gain;

    let mut pairs = query.iter_combinations_mut::<2>();
    while let Some([(id1, mut state1), (id2, mut state2)]) = pairs.fetch_next() {
        let mutual = state1.profile.support_network.contains(&id2.0)
            && state2.profile.support_network.contains(&id1.0);
        if !mutual {
            continue;
        }

        state1.update_confidence(gain);
        state2.update_confidence(gain);
        state1.update_euphoria(gain);
        state2.update_euphoria(gain);
        activity.support_exchanges += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GenderProfile;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn gender_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(SimRng(SmallRng::seed_from_u64(13)));
        world.insert_resource(PendingEvents::new());
        world.insert_resource(GenderActivity::default());
        world.insert_resource(SimConfig::default());
        world.insert_resource(SimClock::new());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                drift_gender_identity,
                update_expression_confidence,
                process_mutual_support,
            )
                .chain(),
        );
        (world, schedule)
    }

    fn tick(world: &mut World, schedule: &mut Schedule) {
        {
            let mut clock = world.resource_mut::<SimClock>();
            clock.advance(1.0);
        }
        schedule.run(world);
    }

    #[test]
    fn test_fluid_identity_eventually_drifts() {
        let (mut world, mut schedule) = gender_world();

        let fluid = world
            .spawn((
                AgentId("fluid".to_string()),
                GenderState::new(GenderProfile::default().with_fluidity(1.0)),
            ))
            .id();
        let fixed = world
            .spawn((
                AgentId("fixed".to_string()),
                GenderState::new(GenderProfile::new(GenderIdentity::Female)),
            ))
            .id();

        for _ in 0..2000 {
            tick(&mut world, &mut schedule);
            if world.resource::<GenderActivity>().identity_changes > 0 {
                break;
            }
        }

        assert!(
            world.resource::<GenderActivity>().identity_changes > 0,
            "fluid identity never drifted"
        );
        assert_eq!(
            world.get::<GenderState>(fluid).unwrap().profile.identity_changes,
            world.resource::<GenderActivity>().identity_changes as u32
        );
        assert_eq!(
            world.get::<GenderState>(fixed).unwrap().profile.primary_identity,
            GenderIdentity::Female
        );
    }

    #[test]
    fn test_support_network_lifts_confidence() {
        let (mut world, mut schedule) = gender_world();

        let mut supported_profile = GenderProfile::default();
        supported_profile.add_support_agent("ally");
        let supported = world
            .spawn((
                AgentId("supported".to_string()),
                GenderState::new(supported_profile),
            ))
            .id();

        let mut lonely_state = GenderState::default();
        lonely_state.euphoria = 0.0;
        let lonely = world
            .spawn((AgentId("lonely".to_string()), lonely_state))
            .id();

        for _ in 0..50 {
            tick(&mut world, &mut schedule);
        }

        let supported_confidence = world
            .get::<GenderState>(supported)
            .unwrap()
            .expression_confidence;
        let lonely_confidence = world.get::<GenderState>(lonely).unwrap().expression_confidence;
        assert!(supported_confidence > lonely_confidence);
        assert!(supported_confidence <= 1.0);
    }

    #[test]
    fn test_dysphoria_erodes_confidence() {
        let (mut world, mut schedule) = gender_world();

        let mut state = GenderState::default();
        state.dysphoria = 0.9;
        state.euphoria = 0.0;
        let entity = world.spawn((AgentId("struggling".to_string()), state)).id();

        for _ in 0..50 {
            tick(&mut world, &mut schedule);
        }

        let confidence = world.get::<GenderState>(entity).unwrap().expression_confidence;
        assert!(confidence < 0.5);
        assert!(confidence >= 0.0);
    }

    #[test]
    fn test_mutual_support_boosts_both() {
        let (mut world, mut schedule) = gender_world();

        let mut profile_a = GenderProfile::default();
        profile_a.add_support_agent("b");
        let mut state_a = GenderState::new(profile_a);
        state_a.euphoria = 0.2;

        let mut profile_b = GenderProfile::default();
        profile_b.add_support_agent("a");
        let mut state_b = GenderState::new(profile_b);
        state_b.euphoria = 0.2;

        let a = world.spawn((AgentId("a".to_string()), state_a)).id();
        let b = world.spawn((AgentId("b".to_string()), state_b)).id();

        // One-sided support must not trigger the exchange.
        let mut profile_c = GenderProfile::default();
        profile_c.add_support_agent("a");
        let mut state_c = GenderState::new(profile_c);
        state_c.euphoria = 0.2;
        let c = world.spawn((AgentId("c".to_string()), state_c)).id();

        for _ in 0..20 {
            tick(&mut world, &mut schedule);
        }

        assert!(world.resource::<GenderActivity>().support_exchanges >= 20);
        assert!(world.get::<GenderState>(a).unwrap().euphoria > 0.2);
        assert!(world.get::<GenderState>(b).unwrap().euphoria > 0.2);
        assert!((world.get::<GenderState>(c).unwrap().euphoria - 0.2).abs() < 1e-6);
    }
}
