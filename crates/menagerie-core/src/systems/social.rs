//! Social System
//!
//! Group formation, group health and dissolution, leadership succession,
//! cohesion drift, and social-network growth.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use menagerie_events::EventPayload;

use crate::components::{
    AgentId, ConnectionKind, GroupKind, GroupRegistry, InteractionState, SocialGroup, SocialState,
    TraitProfile,
};
use crate::config::SocialConfig;
use crate::events::PendingEvents;
use crate::systems::AgentIndex;
use crate::{SimClock, SimConfig, SimRng};

/// Resource: lifetime counters for the social system.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SocialActivity {
    pub connections_formed: u64,
    pub leadership_changes: u64,
}

/// Group-kind choice driven by the leader's dominant traits.
fn choose_group_kind(traits: &TraitProfile, rng: &mut rand::rngs::SmallRng) -> GroupKind {
    if traits.personality("charisma") > 0.7 {
        *[GroupKind::Community, GroupKind::Alliance]
            .choose(rng)
            .unwrap_or(&GroupKind::Community)
    } else if traits.personality("playfulness") > 0.7 {
        GroupKind::Friendship
    } else if traits.personality("intelligence") > 0.7 {
        GroupKind::Mentorship
    } else {
        *[
            GroupKind::Friendship,
            GroupKind::Work,
            GroupKind::Community,
            GroupKind::Alliance,
            GroupKind::Mentorship,
        ]
        .choose(rng)
        .unwrap_or(&GroupKind::Community)
    }
}

/// Per-kind membership compatibility rule.
fn compatible_for_group(
    leader_traits: &TraitProfile,
    member_traits: &TraitProfile,
    kind: GroupKind,
    config: &SocialConfig,
) -> bool {
    let compatibility = leader_traits.compatibility(member_traits);
    match kind {
        GroupKind::Friendship => compatibility > config.friendship_compatibility,
        GroupKind::Work => compatibility > config.work_compatibility,
        GroupKind::Mentorship => {
            compatibility > config.mentorship_compatibility
                && leader_traits.personality("intelligence")
                    > member_traits.personality("intelligence")
        }
        _ => compatibility > config.default_compatibility,
    }
}

/// System: let qualified agents found new groups around compatible members.
#[allow(clippy::type_complexity)]
pub fn form_groups(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut registry: ResMut<GroupRegistry>,
    mut query: Query<(Entity, &AgentId, &TraitProfile, &mut SocialState)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.social;

    let mut leaders: Vec<Entity> = Vec::new();
    let mut members: Vec<Entity> = Vec::new();
    for (entity, _, _, social) in query.iter() {
        if social.social_energy > cfg.leader_min_energy
            && social.group_preference > cfg.leader_min_preference
            && social.leadership_ability > cfg.leader_min_ability
        {
            leaders.push(entity);
        } else if social.social_energy > cfg.member_min_energy
            && social.group_preference > cfg.member_min_preference
        {
            members.push(entity);
        }
    }

    for leader in leaders {
        if rng.0.gen::<f32>() >= cfg.formation_chance {
            continue;
        }

        let (leader_id, leader_traits) = {
            let Ok((_, id, traits, _)) = query.get(leader) else {
                continue;
            };
            (id.0.clone(), traits.clone())
        };

        let kind = choose_group_kind(&leader_traits, &mut rng.0);

        let mut compatible: Vec<(Entity, String)> = Vec::new();
        for &member in &members {
            let Ok((_, member_id, member_traits, _)) = query.get(member) else {
                continue;
            };
            if compatible_for_group(&leader_traits, member_traits, kind, cfg) {
                compatible.push((member, member_id.0.clone()));
            }
        }

        if compatible.len() < 2 {
            continue;
        }

        // The founder pays up front; formation fails if the pool is short.
        {
            let Ok((_, _, _, mut social)) = query.get_mut(leader) else {
                continue;
            };
            if !social.consume_energy(cfg.formation_cost) {
                continue;
            }
        }

        let group_id = registry.generate_id();
        let name = format!("{} group {}", kind.as_str(), &group_id[group_id.len() - 4..]);
        let mut group = SocialGroup::new(group_id.clone(), name, kind, clock.elapsed);
        group.add_leader(&leader_id);

        compatible.truncate(cfg.max_initial_members);
        for (member, member_id) in &compatible {
            group.add_member(member_id);
            if let Ok((_, _, _, mut social)) = query.get_mut(*member) {
                social.join_group(&group_id);
            }
        }

        if let Ok((_, _, _, mut social)) = query.get_mut(leader) {
            social.take_leadership(&group_id);
            social.groups_created += 1;
        }

        let member_count = group.members.len();
        registry.insert(group);

        tracing::info!(group_id, kind = kind.as_str(), members = member_count, "group formed");
        events.push(
            clock.tick,
            EventPayload::GroupFormed {
                group_id,
                group_kind: kind.as_str().to_string(),
                leader: leader_id,
                member_count,
            },
        );
    }
}

/// System: group health, dissolution, leadership succession, and cohesion
/// drift.
#[allow(clippy::type_complexity)]
pub fn update_group_dynamics(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut activity: ResMut<SocialActivity>,
    mut registry: ResMut<GroupRegistry>,
    index: Res<AgentIndex>,
    mut socials: Query<(&TraitProfile, &mut SocialState)>,
    interactions: Query<&InteractionState>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.social;

    for group_id in registry.ids() {
        let (health, members) = match registry.get(&group_id) {
            Some(group) => (group.health(), group.members.clone()),
            None => continue,
        };

        // Dissolution: every former member's membership set is updated in
        // the same pass, so no orphaned ids survive the tick.
        if health < cfg.dissolve_health || members.len() < 2 {
            for member_id in &members {
                if let Some(entity) = index.get(member_id) {
                    if let Ok((_, mut social)) = socials.get_mut(entity) {
                        social.leave_group(&group_id);
                    }
                }
            }
            registry.remove(&group_id);
            tracing::info!(group_id, health, "group dissolved");
            events.push(
                clock.tick,
                EventPayload::GroupDissolved {
                    group_id,
                    member_count: members.len(),
                },
            );
            continue;
        }

        // Leadership succession for leaderless groups.
        let leaderless = registry
            .get(&group_id)
            .map_or(false, |group| group.leaders.is_empty());
        if leaderless && rng.0.gen::<f32>() < cfg.succession_chance {
            let mut best: Option<(String, f32)> = None;
            for member_id in &members {
                let Some(entity) = index.get(member_id) else {
                    continue;
                };
                let Ok((traits, social)) = socials.get(entity) else {
                    continue;
                };
                let charisma = traits.personality("charisma");
                if social.leadership_ability > cfg.succession_min_ability
                    && charisma > cfg.succession_min_charisma
                {
                    let score = social.leadership_ability + charisma;
                    if best.as_ref().map_or(true, |(_, s)| score > *s) {
                        best = Some((member_id.clone(), score));
                    }
                }
            }

            if let Some((new_leader, _)) = best {
                if let Some(group) = registry.get_mut(&group_id) {
                    group.add_leader(&new_leader);
                }
                if let Some(entity) = index.get(&new_leader) {
                    if let Ok((_, mut social)) = socials.get_mut(entity) {
                        social.take_leadership(&group_id);
                    }
                }
                activity.leadership_changes += 1;
                events.push(
                    clock.tick,
                    EventPayload::LeadershipChanged {
                        group_id: group_id.clone(),
                        new_leader,
                    },
                );
            }
        }

        // Cohesion drifts toward the members' positive-interaction ratio.
        let mut total: u64 = 0;
        let mut positive: u64 = 0;
        for member_id in &members {
            if let Some(entity) = index.get(member_id) {
                if let Ok(state) = interactions.get(entity) {
                    total += state.total_interactions;
                    positive += state.total_positive;
                }
            }
        }
        if total > 0 {
            let ratio = positive as f32 / total as f32;
            if let Some(group) = registry.get_mut(&group_id) {
                group.drift_cohesion(ratio, cfg.cohesion_gain);
            }
        }
    }
}

/// System: probabilistic connection formation between compatible,
/// not-yet-connected agents.
#[allow(clippy::type_complexity)]
pub fn grow_social_network(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut activity: ResMut<SocialActivity>,
    mut query: Query<(&AgentId, &TraitProfile, &mut SocialState)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.social;
    let now = clock.elapsed;

    let mut new_connections: BTreeMap<String, usize> = BTreeMap::new();

    let mut pairs = query.iter_combinations_mut::<2>();
    while let Some([(id1, traits1, mut social1), (id2, traits2, mut social2)]) = pairs.fetch_next()
    {
        if social1.is_connected_to(&id2.0) || social2.is_connected_to(&id1.0) {
            continue;
        }
        if new_connections.get(&id1.0).copied().unwrap_or(0) >= cfg.max_new_connections
            || new_connections.get(&id2.0).copied().unwrap_or(0) >= cfg.max_new_connections
        {
            continue;
        }
        if social1.social_energy < cfg.connection_min_energy
            || social2.social_energy < cfg.connection_min_energy
        {
            continue;
        }
        if social1.group_preference < cfg.connection_min_preference
            || social2.group_preference < cfg.connection_min_preference
        {
            continue;
        }
        if traits1.compatibility(traits2) <= cfg.connection_min_compatibility {
            continue;
        }
        if rng.0.gen::<f32>() >= cfg.connection_chance {
            continue;
        }

        let charisma1 = traits1.personality("charisma");
        let charisma2 = traits2.personality("charisma");
        let playful1 = traits1.personality("playfulness");
        let playful2 = traits2.personality("playfulness");

        let kind = if (charisma1 > 0.7 && charisma2 > 0.7) || (playful1 > 0.7 && playful2 > 0.7) {
            ConnectionKind::Friend
        } else if charisma1 > 0.6 || charisma2 > 0.6 {
            ConnectionKind::Acquaintance
        } else {
            ConnectionKind::Neutral
        };

        social1.add_connection(&id2.0, kind, now);
        social2.add_connection(&id1.0, kind, now);
        *new_connections.entry(id1.0.clone()).or_insert(0) += 1;
        *new_connections.entry(id2.0.clone()).or_insert(0) += 1;
        activity.connections_formed += 1;

        events.push(
            clock.tick,
            EventPayload::ConnectionFormed {
                agent1: id1.0.clone(),
                agent2: id2.0.clone(),
                connection: kind.as_str().to_string(),
            },
        );
    }
}

/// System: linear social-energy recovery.
pub fn recover_social_energy(clock: Res<SimClock>, mut query: Query<&mut SocialState>) {
    if clock.delta <= 0.0 {
        return;
    }
    for mut social in &mut query {
        social.recover(clock.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn uniform_traits(value: f32) -> TraitProfile {
        let mut personality = BTreeMap::new();
        for name in ["charisma", "playfulness", "intelligence"] {
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
    fn test_group_kind_follows_dominant_trait() {
        let mut rng = SmallRng::seed_from_u64(1);

        let mut playful = uniform_traits(0.5);
        playful.personality.insert("playfulness".to_string(), 0.9);
        assert_eq!(choose_group_kind(&playful, &mut rng), GroupKind::Friendship);

        let mut bright = uniform_traits(0.5);
        bright.personality.insert("intelligence".to_string(), 0.9);
        assert_eq!(choose_group_kind(&bright, &mut rng), GroupKind::Mentorship);

        let mut magnetic = uniform_traits(0.5);
        magnetic.personality.insert("charisma".to_string(), 0.9);
        assert!(matches!(
            choose_group_kind(&magnetic, &mut rng),
            GroupKind::Community | GroupKind::Alliance
        ));
    }

    #[test]
    fn test_mentorship_needs_brighter_leader() {
        let config = SocialConfig::default();
        let mut leader = uniform_traits(0.6);
        leader.personality.insert("intelligence".to_string(), 0.9);
        let member = uniform_traits(0.6);

        assert!(compatible_for_group(&leader, &member, GroupKind::Mentorship, &config));
        assert!(!compatible_for_group(&member, &leader, GroupKind::Mentorship, &config));
    }

    #[test]
    fn test_work_groups_tolerate_diversity() {
        let config = SocialConfig::default();
        let a = uniform_traits(0.3);
        let b = uniform_traits(0.7);

        // Compatibility 0.6: enough for a work group, not for friendship.
        assert!(compatible_for_group(&a, &b, GroupKind::Work, &config));
        assert!(!compatible_for_group(&a, &b, GroupKind::Friendship, &config));
    }

    use crate::systems::interaction::InteractionActivity;

    fn sim_world(agent_count: usize, trait_value: f32) -> (World, Schedule) {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(SimRng(SmallRng::seed_from_u64(7)));
        world.insert_resource(PendingEvents::new());
        world.insert_resource(SocialActivity::default());
        world.insert_resource(GroupRegistry::new());
        world.insert_resource(InteractionActivity::default());

        let mut index = AgentIndex::new();
        for i in 0..agent_count {
            let id = format!("agent-{i}");
            let mut social = SocialState::new(&config.social);
            social.group_preference = 0.8;
            // One natural leader; the rest stay member material so the
            // formation pool is never empty.
            social.leadership_ability = if i == 0 { 0.8 } else { 0.4 };

            let entity = world
                .spawn((
                    AgentId(id.clone()),
                    uniform_traits(trait_value),
                    social,
                    InteractionState::new(&config.interaction),
                ))
                .id();
            index.insert(id, entity);
        }
        world.insert_resource(index);
        world.insert_resource(config);

        let mut clock = SimClock::new();
        clock.advance(1.0);
        world.insert_resource(clock);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (form_groups, update_group_dynamics, grow_social_network).chain(),
        );
        (world, schedule)
    }

    #[test]
    fn test_groups_eventually_form_and_stay_consistent() {
        let (mut world, mut schedule) = sim_world(6, 0.6);

        for _ in 0..200 {
            {
                let mut clock = world.resource_mut::<SimClock>();
                clock.advance(1.0);
            }
            schedule.run(&mut world);
        }

        let registry = world.resource::<GroupRegistry>();
        assert!(registry.total_created > 0, "no groups ever formed");

        // Membership consistency both ways for surviving groups.
        let group_data: Vec<(String, Vec<String>)> = registry
            .iter()
            .map(|g| (g.id.clone(), g.members.iter().cloned().collect()))
            .collect();

        let index_entities: Vec<(String, Entity)> = {
            let index = world.resource::<AgentIndex>();
            group_data
                .iter()
                .flat_map(|(_, members)| members.iter())
                .filter_map(|id| index.get(id).map(|e| (id.clone(), e)))
                .collect()
        };

        for (group_id, members) in &group_data {
            for member in members {
                let entity = index_entities
                    .iter()
                    .find(|(id, _)| id == member)
                    .map(|(_, e)| *e)
                    .expect("member in index");
                let social = world.get::<SocialState>(entity).unwrap();
                assert!(
                    social.group_memberships.contains(group_id),
                    "member {member} missing membership for {group_id}"
                );
            }
        }
    }

    #[test]
    fn test_unhealthy_group_dissolves_cleanly() {
        let (mut world, mut schedule) = sim_world(3, 0.6);

        // Plant a moribund group containing all three agents.
        let member_ids: Vec<String> = (0..3).map(|i| format!("agent-{i}")).collect();
        let doomed_id = {
            let mut registry = world.resource_mut::<GroupRegistry>();
            registry.generate_id()
        };
        {
            let mut registry = world.resource_mut::<GroupRegistry>();
            let id = doomed_id.clone();
            let mut group = SocialGroup::new(id.clone(), "doomed", GroupKind::Work, 0.0);
            group.cohesion = 0.0;
            group.stability = 0.0;
            group.activity_level = 0.0;
            for m in &member_ids {
                group.add_member(m);
            }
            registry.insert(group);

            let index = world.remove_resource::<AgentIndex>().unwrap();
            for m in &member_ids {
                let entity = index.get(m).unwrap();
                world.get_mut::<SocialState>(entity).unwrap().join_group(&id);
            }
            world.insert_resource(index);
        }

        {
            let mut clock = world.resource_mut::<SimClock>();
            clock.advance(1.0);
        }
        schedule.run(&mut world);

        let registry = world.resource::<GroupRegistry>();
        assert_eq!(registry.total_dissolved, 1);
        assert!(registry.get(&doomed_id).is_none());

        let index = world.resource::<AgentIndex>();
        let entities: Vec<Entity> = member_ids.iter().filter_map(|m| index.get(m)).collect();
        for entity in entities {
            let social = world.get::<SocialState>(entity).unwrap();
            assert!(
                !social.group_memberships.contains(&doomed_id),
                "orphaned membership for the dissolved group"
            );
        }
    }

    #[test]
    fn test_network_growth_is_mutual() {
        let (mut world, mut schedule) = sim_world(4, 0.75);

        for _ in 0..200 {
            {
                let mut clock = world.resource_mut::<SimClock>();
                clock.advance(1.0);
            }
            schedule.run(&mut world);
        }

        let mut query = world.query::<(&AgentId, &SocialState)>();
        let mut connections = 0usize;
        let snapshot: Vec<(String, Vec<String>)> = query
            .iter(&world)
            .map(|(id, social)| (id.0.clone(), social.network.keys().cloned().collect()))
            .collect();

        for (id, peers) in &snapshot {
            connections += peers.len();
            for peer in peers {
                let (_, peer_network) = snapshot
                    .iter()
                    .find(|(other, _)| other == peer)
                    .expect("peer exists");
                assert!(peer_network.contains(id), "connection not mutual");
            }
        }
        assert!(connections > 0, "no connections ever formed");
    }
}
