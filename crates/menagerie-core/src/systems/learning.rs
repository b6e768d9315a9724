//! Learning System
//!
//! Knowledge-sharing discovery, teaching sessions, opportunity pursuit,
//! opportunity expiry, and slow knowledge decay.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use menagerie_events::EventPayload;

use crate::components::{
    AgentId, KnowledgeBase, KnowledgeItem, KnowledgeKind, LearningMethod, SocialState, TraitProfile,
};
use crate::config::LearningConfig;
use crate::events::PendingEvents;
use crate::systems::AgentIndex;
use crate::{SimClock, SimConfig, SimRng};

/// Resource: lifetime counters for the learning system.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct LearningActivity {
    pub knowledge_transfers: u64,
    pub teaching_sessions: u64,
    pub learning_sessions: u64,
    pub opportunities_created: u64,
    pub opportunities_expired: u64,
}

/// Pick the learning method best suited to the knowledge and the pair.
pub fn determine_learning_method(
    teacher_traits: &TraitProfile,
    student_traits: &TraitProfile,
    item: &KnowledgeItem,
) -> LearningMethod {
    match item.kind {
        KnowledgeKind::Procedural => {
            if teacher_traits.personality("patience") > 0.6
                && student_traits.personality("playfulness") > 0.6
            {
                LearningMethod::Practice
            } else {
                LearningMethod::Teaching
            }
        }
        KnowledgeKind::Social => LearningMethod::Observation,
        KnowledgeKind::Creative => LearningMethod::Collaboration,
        KnowledgeKind::Technical => LearningMethod::Study,
        _ => LearningMethod::Experience,
    }
}

/// Difficulty as experienced by a particular student: bright, patient,
/// curious learners find everything easier.
pub fn estimate_difficulty(item: &KnowledgeItem, student_traits: &TraitProfile) -> f32 {
    let reduction = student_traits.personality("intelligence") * 0.3
        + student_traits.personality("patience") * 0.2
        + student_traits.personality("curiosity") * 0.2;
    (item.difficulty - reduction).max(0.1)
}

/// Estimated time to learn, scaled by the method.
pub fn estimate_duration(difficulty: f32, method: LearningMethod, config: &LearningConfig) -> f32 {
    difficulty * config.duration_base * method.duration_multiplier()
}

/// Learning potential for a particular student.
pub fn estimate_potential(item: &KnowledgeItem, student: &KnowledgeBase) -> f32 {
    (item.transferability + student.learning_rate * 0.3 + student.curiosity * 0.2).min(1.0)
}

/// System: agents in probabilistic proximity surface learning opportunities
/// for each other's teachable knowledge.
#[allow(clippy::type_complexity)]
pub fn discover_shared_knowledge(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut activity: ResMut<LearningActivity>,
    mut query: Query<(&AgentId, &TraitProfile, Option<&SocialState>, &mut KnowledgeBase)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.learning;
    let now = clock.elapsed;

    let mut pairs = query.iter_combinations_mut::<2>();
    while let Some([(id1, traits1, social1, mut kb1), (id2, traits2, social2, mut kb2)]) =
        pairs.fetch_next()
    {
        // Proximity is probabilistic, weighted by an existing social tie.
        let connected = social1.map_or(false, |s| s.is_connected_to(&id2.0))
            || social2.map_or(false, |s| s.is_connected_to(&id1.0));
        let proximity_chance = if connected {
            cfg.connected_share_chance
        } else {
            cfg.stranger_share_chance
        };
        if rng.0.gen::<f32>() >= proximity_chance {
            continue;
        }

        let offers_1_to_2: Vec<KnowledgeItem> = kb1
            .teachable(cfg)
            .into_iter()
            .filter(|item| !kb2.has_title(&item.title))
            .cloned()
            .collect();
        let offers_2_to_1: Vec<KnowledgeItem> = kb2
            .teachable(cfg)
            .into_iter()
            .filter(|item| !kb1.has_title(&item.title))
            .cloned()
            .collect();

        for item in offers_1_to_2 {
            if kb2.has_opportunity_from(&id1.0, &item.id, now) {
                continue;
            }
            let method = determine_learning_method(traits1, traits2, &item);
            let difficulty = estimate_difficulty(&item, traits2);
            let duration = estimate_duration(difficulty, method, cfg);
            let potential = estimate_potential(&item, &kb2);
            kb2.add_opportunity(
                &item.id,
                &id1.0,
                method,
                difficulty,
                duration,
                potential,
                now,
                Some(now + cfg.opportunity_ttl),
            );
            activity.opportunities_created += 1;
        }

        for item in offers_2_to_1 {
            if kb1.has_opportunity_from(&id2.0, &item.id, now) {
                continue;
            }
            let method = determine_learning_method(traits2, traits1, &item);
            let difficulty = estimate_difficulty(&item, traits1);
            let duration = estimate_duration(difficulty, method, cfg);
            let potential = estimate_potential(&item, &kb1);
            kb1.add_opportunity(
                &item.id,
                &id2.0,
                method,
                difficulty,
                duration,
                potential,
                now,
                Some(now + cfg.opportunity_ttl),
            );
            activity.opportunities_created += 1;
        }
    }
}

/// System: teachers spontaneously run sessions for students holding a live
/// opportunity on one of their teachable items.
pub fn run_teaching_sessions(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut activity: ResMut<LearningActivity>,
    mut query: Query<(Entity, &AgentId, &mut KnowledgeBase)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.learning;
    let now = clock.elapsed;

    let teachers: Vec<(Entity, String, Vec<KnowledgeItem>)> = query
        .iter()
        .map(|(entity, id, kb)| {
            let teachable: Vec<KnowledgeItem> =
                kb.teachable(cfg).into_iter().cloned().collect();
            (entity, id.0.clone(), teachable)
        })
        .filter(|(_, _, teachable)| !teachable.is_empty())
        .collect();

    for (teacher_entity, teacher_id, teachable) in teachers {
        for item in teachable {
            if rng.0.gen::<f32>() >= cfg.teach_chance {
                continue;
            }

            let students: Vec<Entity> = query
                .iter()
                .filter(|(entity, _, kb)| {
                    *entity != teacher_entity
                        && kb.has_opportunity_from(&teacher_id, &item.id, now)
                        && !kb.has_title(&item.title)
                })
                .map(|(entity, _, _)| entity)
                .collect();

            let Some(&student_entity) = students.choose(&mut rng.0) else {
                continue;
            };

            let student_id = {
                let Ok((_, id, mut kb)) = query.get_mut(student_entity) else {
                    continue;
                };
                let amount = item.teaching_effectiveness() * kb.learning_rate * cfg.teach_rate;
                kb.add_item(
                    &item.title,
                    item.kind,
                    &item.description,
                    amount,
                    amount * cfg.teach_confidence_ratio,
                    LearningMethod::Teaching,
                    Some(teacher_id.clone()),
                    item.difficulty,
                    item.importance,
                    item.transferability,
                    now,
                );
                kb.consume_opportunity_for(&teacher_id, &item.id);
                kb.learning_sessions += 1;
                id.0.clone()
            };

            if let Ok((_, _, mut kb)) = query.get_mut(teacher_entity) {
                kb.teaching_sessions += 1;
                kb.total_shared += 1;
            }

            activity.teaching_sessions += 1;
            activity.learning_sessions += 1;
            activity.knowledge_transfers += 1;

            events.push(
                clock.tick,
                EventPayload::KnowledgeTransferred {
                    teacher: teacher_id.clone(),
                    student: student_id,
                    title: item.title.clone(),
                    method: LearningMethod::Teaching.as_str().to_string(),
                },
            );
        }
    }
}

/// System: agents pursue their single best learning opportunity.
pub fn pursue_opportunities(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<PendingEvents>,
    mut activity: ResMut<LearningActivity>,
    index: Res<AgentIndex>,
    mut query: Query<(Entity, &AgentId, &mut KnowledgeBase)>,
) {
    if clock.delta <= 0.0 {
        return;
    }
    let cfg = &config.learning;
    let now = clock.elapsed;

    let students: Vec<(Entity, String)> = query
        .iter()
        .map(|(entity, id, _)| (entity, id.0.clone()))
        .collect();

    for (student_entity, student_id) in students {
        if rng.0.gen::<f32>() >= cfg.pursue_chance {
            continue;
        }

        let opportunity = {
            let Ok((_, _, kb)) = query.get(student_entity) else {
                continue;
            };
            match kb.best_opportunity(now) {
                Some(opp) => opp.clone(),
                None => continue,
            }
        };

        // The teacher may have died or forgotten the item in the meantime;
        // the opportunity then just waits out its expiry.
        let Some(teacher_entity) = index.get(&opportunity.source_agent) else {
            continue;
        };
        let item = {
            let Ok((_, _, kb)) = query.get(teacher_entity) else {
                continue;
            };
            match kb.get(&opportunity.knowledge_id) {
                Some(item) => item.clone(),
                None => continue,
            }
        };

        {
            let Ok((_, _, mut kb)) = query.get_mut(student_entity) else {
                continue;
            };
            if kb.has_title(&item.title) {
                kb.remove_opportunity(&opportunity.id);
                continue;
            }

            let effectiveness = kb.learning_effectiveness(opportunity.method);
            let amount = opportunity.learning_potential * effectiveness * cfg.pursue_rate;
            kb.add_item(
                &item.title,
                item.kind,
                &item.description,
                amount,
                amount * cfg.pursue_confidence_ratio,
                opportunity.method,
                Some(opportunity.source_agent.clone()),
                item.difficulty,
                item.importance,
                item.transferability,
                now,
            );
            kb.remove_opportunity(&opportunity.id);
            kb.learning_sessions += 1;
        }

        activity.learning_sessions += 1;
        activity.knowledge_transfers += 1;

        events.push(
            clock.tick,
            EventPayload::KnowledgeTransferred {
                teacher: opportunity.source_agent.clone(),
                student: student_id,
                title: item.title.clone(),
                method: opportunity.method.as_str().to_string(),
            },
        );
    }
}

/// System: drop expired learning opportunities.
pub fn expire_opportunities(
    clock: Res<SimClock>,
    mut activity: ResMut<LearningActivity>,
    mut query: Query<&mut KnowledgeBase>,
) {
    let now = clock.elapsed;
    let mut expired = 0usize;
    for mut kb in &mut query {
        expired += kb.expire_opportunities(now);
    }
    if expired > 0 {
        activity.opportunities_expired += expired as u64;
    }
}

/// System: inactivity decay of proficiency and confidence.
pub fn decay_knowledge(clock: Res<SimClock>, mut query: Query<&mut KnowledgeBase>) {
    let now = clock.elapsed;
    for mut kb in &mut query {
        kb.decay(now);
    }
}
