//! Determinism verification tests
//!
//! The engine draws every probabilistic branch from one seeded generator,
//! so identical seeds and identical call sequences must produce identical
//! worlds.

use menagerie_core::{AgentWorld, SimConfig};

const SPIRITS: &[&str] = &["fox", "wolf", "otter", "eagle"];

fn build_and_run(seed: u64, ticks: u64) -> serde_json::Value {
    let mut world = AgentWorld::new(SimConfig::default(), seed);

    for i in 0..8 {
        let agent_id = format!("agent_{i:02}");
        world
            .create_agent(&agent_id, Some(SPIRITS[i % SPIRITS.len()]), None, None)
            .unwrap();
    }

    for _ in 0..ticks {
        world.update(60.0);
    }

    let mut value = serde_json::to_value(world.snapshot()).unwrap();
    // The run id is intentionally unique per world; strip it before
    // comparing the deterministic remainder.
    if let Some(object) = value.as_object_mut() {
        object.remove("run_id");
    }
    value
}

#[test]
fn test_same_seed_same_world() {
    let first = build_and_run(42, 200);
    let second = build_and_run(42, 200);
    assert_eq!(first, second, "identical seeds must replay identically");
}

#[test]
fn test_different_seeds_diverge() {
    let first = build_and_run(42, 50);
    let second = build_and_run(43, 50);
    assert_ne!(first, second, "different seeds should produce different worlds");
}

#[test]
fn test_event_stream_is_reproducible() {
    let run = |seed: u64| -> Vec<String> {
        let mut world = AgentWorld::new(SimConfig::default(), seed);
        for i in 0..8 {
            world
                .create_agent(&format!("agent_{i:02}"), Some("otter"), None, None)
                .unwrap();
        }
        let mut kinds = Vec::new();
        for _ in 0..150 {
            world.update(60.0);
            for event in world.drain_events() {
                kinds.push(format!("{}:{}", event.tick, event.payload.kind()));
            }
        }
        kinds
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn test_trait_jitter_is_seeded() {
    let traits_of = |seed: u64| -> Vec<f32> {
        let mut world = AgentWorld::new(SimConfig::default(), seed);
        world.create_agent("probe", Some("fox"), None, None).unwrap();
        world
            .component::<menagerie_core::components::TraitProfile>("probe")
            .unwrap()
            .personality
            .values()
            .copied()
            .collect()
    };

    assert_eq!(traits_of(9), traits_of(9));
    assert_ne!(traits_of(9), traits_of(10));
}
