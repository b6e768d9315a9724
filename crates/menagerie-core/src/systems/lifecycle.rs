//! Lifecycle System
//!
//! Ages every agent by the tick's worth of simulated days. Runs first so
//! later systems see current life stages.

use bevy_ecs::prelude::*;

use crate::components::Lifecycle;
use crate::SimClock;

/// System: advance every agent's age.
pub fn advance_lifecycles(clock: Res<SimClock>, mut query: Query<&mut Lifecycle>) {
    let delta_days = clock.delta_days();
    if delta_days <= 0.0 {
        return;
    }

    for mut lifecycle in &mut query {
        lifecycle.advance(delta_days);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LifecycleConfig;
    use crate::SECONDS_PER_DAY;

    #[test]
    fn test_aging_follows_clock() {
        let mut world = World::new();
        let mut clock = SimClock::new();
        clock.advance(SECONDS_PER_DAY as f32);
        world.insert_resource(clock);

        let entity = world
            .spawn(Lifecycle::new(0.0, &LifecycleConfig::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(advance_lifecycles);
        schedule.run(&mut world);

        let lifecycle = world.get::<Lifecycle>(entity).unwrap();
        assert!((lifecycle.age - 1.0).abs() < 1e-4);
    }
}
