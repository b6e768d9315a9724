//! Lifecycle Component
//!
//! Age tracking and derived life stage. Ages are measured in simulated days.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::LifecycleConfig;

/// Derived lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Infant,
    Juvenile,
    Adult,
    Elder,
}

impl LifeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStage::Infant => "infant",
            LifeStage::Juvenile => "juvenile",
            LifeStage::Adult => "adult",
            LifeStage::Elder => "elder",
        }
    }
}

/// Birth time, age, and the thresholds the stage derives from. Thresholds
/// are copied from config at creation so an agent's lifecycle is
/// self-contained.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Lifecycle {
    /// Simulated seconds elapsed at birth
    pub birth_time: f64,
    /// Age in simulated days; monotonically non-decreasing
    pub age: f32,
    pub infant_until: f32,
    pub juvenile_until: f32,
    pub elder_from: f32,
    pub maturity_age: f32,
    pub max_age: f32,
}

impl Lifecycle {
    pub fn new(birth_time: f64, config: &LifecycleConfig) -> Self {
        Self {
            birth_time,
            age: 0.0,
            infant_until: config.infant_until,
            juvenile_until: config.juvenile_until,
            elder_from: config.elder_from,
            maturity_age: config.maturity_age,
            max_age: config.max_age,
        }
    }

    /// Advance age by a tick's worth of simulated days.
    pub fn advance(&mut self, delta_days: f32) {
        if delta_days > 0.0 {
            self.age += delta_days;
        }
    }

    pub fn stage(&self) -> LifeStage {
        if self.age < self.infant_until {
            LifeStage::Infant
        } else if self.age < self.juvenile_until {
            LifeStage::Juvenile
        } else if self.age < self.elder_from {
            LifeStage::Adult
        } else {
            LifeStage::Elder
        }
    }

    /// Gates reproduction eligibility.
    pub fn is_mature(&self) -> bool {
        self.age >= self.maturity_age
    }

    /// Gates removal.
    pub fn is_alive(&self) -> bool {
        self.age < self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifecycle() -> Lifecycle {
        Lifecycle::new(0.0, &LifecycleConfig::default())
    }

    #[test]
    fn test_stage_progression() {
        let mut lc = lifecycle();
        assert_eq!(lc.stage(), LifeStage::Infant);

        lc.advance(1.0);
        assert_eq!(lc.stage(), LifeStage::Juvenile);

        lc.advance(5.0);
        assert_eq!(lc.stage(), LifeStage::Adult);

        lc.advance(90.0);
        assert_eq!(lc.stage(), LifeStage::Elder);
    }

    #[test]
    fn test_maturity_gates_reproduction() {
        let mut lc = lifecycle();
        assert!(!lc.is_mature());

        lc.advance(2.0);
        assert!(lc.is_mature());
    }

    #[test]
    fn test_age_is_monotonic() {
        let mut lc = lifecycle();
        lc.advance(1.0);
        let age = lc.age;
        lc.advance(-5.0);
        assert!(lc.age >= age);
    }

    #[test]
    fn test_max_age_bounds_life() {
        let mut lc = lifecycle();
        assert!(lc.is_alive());
        lc.advance(200.0);
        assert!(!lc.is_alive());
    }
}
