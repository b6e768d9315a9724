//! Memory System
//!
//! Per-tick decay/consolidation and periodic forgetting of decayed records.

use bevy_ecs::prelude::*;

use crate::components::MemoryStore;
use crate::SimClock;

/// Resource: lifetime counters for the memory system.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct MemoryActivity {
    pub records_forgotten: u64,
}

/// System: apply decay and consolidation to every agent's memory store.
pub fn decay_memories(clock: Res<SimClock>, mut query: Query<&mut MemoryStore>) {
    if clock.delta <= 0.0 {
        return;
    }

    for mut store in &mut query {
        store.decay(clock.delta);
    }
}

/// System: drop records that decayed below the forget threshold.
pub fn forget_memories(mut activity: ResMut<MemoryActivity>, mut query: Query<&mut MemoryStore>) {
    let mut forgotten = 0usize;
    for mut store in &mut query {
        forgotten += store.cleanup();
    }

    if forgotten > 0 {
        activity.records_forgotten += forgotten as u64;
        tracing::debug!(forgotten, "memories fell below the forget threshold");
    }
}
