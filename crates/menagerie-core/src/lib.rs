//! Menagerie agent-world engine.
//!
//! A tick-driven entity-component simulation in which agents accumulate
//! memories, form relationships and social groups, exchange knowledge,
//! develop gender-identity expression, age, and reproduce via trait
//! inheritance. The [`world::AgentWorld`] facade owns the ECS world and
//! scheduler and exposes the query/command entry points consumed by outer
//! layers.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod events;
pub mod output;
pub mod providers;
pub mod systems;
pub mod world;

pub use config::SimConfig;
pub use world::{AgentWorld, WorldError};

/// Seeded random number generator resource. Every probabilistic branch in
/// the engine draws from this, so a fixed seed reproduces a run exactly.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Simulation clock resource advanced once per `update` call.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    /// Completed ticks since world creation.
    pub tick: u64,
    /// Length of the current tick in simulated seconds.
    pub delta: f32,
    /// Simulated seconds elapsed since world creation.
    pub elapsed: f64,
}

/// Simulated seconds per simulated day. Lifecycle ages and knowledge decay
/// are measured against this.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

impl SimClock {
    pub fn new() -> Self {
        Self {
            tick: 0,
            delta: 0.0,
            elapsed: 0.0,
        }
    }

    /// Advance the clock by one tick of `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        self.tick += 1;
        self.delta = delta;
        self.elapsed += f64::from(delta);
    }

    /// Current tick length in simulated days.
    pub fn delta_days(&self) -> f32 {
        (f64::from(self.delta) / SECONDS_PER_DAY) as f32
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
