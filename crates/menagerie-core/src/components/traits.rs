//! Trait Component
//!
//! Personality, physical, and ability trait maps. All values are 0.0 to 1.0.
//! The maps are created at birth from a blueprint plus jitter; values change
//! only through inheritance or explicit system effects.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::providers::TraitBlueprint;

/// Agent trait maps. Ordered maps keep iteration (and therefore RNG
/// consumption and serialized output) deterministic.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitProfile {
    pub personality: BTreeMap<String, f32>,
    pub physical: BTreeMap<String, f32>,
    pub ability: BTreeMap<String, f32>,
    /// How many generations of mutation separate this profile from gen 0
    pub mutation_count: u32,
}

impl TraitProfile {
    /// Instantiate a profile from a blueprint, applying uniform jitter to
    /// every trait and clamping back into range.
    pub fn from_blueprint(blueprint: &TraitBlueprint, jitter: f32, rng: &mut SmallRng) -> Self {
        let apply = |map: &BTreeMap<String, f32>, rng: &mut SmallRng| -> BTreeMap<String, f32> {
            map.iter()
                .map(|(name, value)| {
                    let jittered = if jitter > 0.0 {
                        value + rng.gen_range(-jitter..=jitter)
                    } else {
                        *value
                    };
                    (name.clone(), jittered.clamp(0.0, 1.0))
                })
                .collect()
        };

        Self {
            personality: apply(&blueprint.personality, rng),
            physical: apply(&blueprint.physical, rng),
            ability: apply(&blueprint.ability, rng),
            mutation_count: 0,
        }
    }

    /// Personality trait lookup with the neutral default for absent keys.
    pub fn personality(&self, name: &str) -> f32 {
        self.personality.get(name).copied().unwrap_or(0.5)
    }

    /// Personality compatibility with another profile: 1 minus the mean
    /// absolute difference over shared keys. Symmetric by construction;
    /// 0.5 when no keys are shared.
    pub fn compatibility(&self, other: &TraitProfile) -> f32 {
        let mut total = 0.0;
        let mut count = 0u32;

        for (name, value) in &self.personality {
            if let Some(other_value) = other.personality.get(name) {
                total += 1.0 - (value - other_value).abs();
                count += 1;
            }
        }

        if count == 0 {
            0.5
        } else {
            total / count as f32
        }
    }

    /// The `n` highest-valued personality traits, strongest first.
    pub fn dominant_traits(&self, n: usize) -> Vec<(String, f32)> {
        let mut traits: Vec<(String, f32)> = self
            .personality
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        traits.sort_by(|a, b| b.1.total_cmp(&a.1));
        traits.truncate(n);
        traits
    }

    /// Offspring profile: per shared trait key, the parent average plus
    /// uniform mutation, clamped. Keys held by only one parent do not carry
    /// over. The mutation counter advances past the older lineage.
    pub fn inherit(
        parent1: &TraitProfile,
        parent2: &TraitProfile,
        mutation: f32,
        rng: &mut SmallRng,
    ) -> Self {
        let mix = |a: &BTreeMap<String, f32>,
                   b: &BTreeMap<String, f32>,
                   rng: &mut SmallRng|
         -> BTreeMap<String, f32> {
            a.iter()
                .filter_map(|(name, value)| {
                    b.get(name).map(|other| {
                        let avg = (value + other) / 2.0;
                        let drift = rng.gen_range(-mutation..=mutation);
                        (name.clone(), (avg + drift).clamp(0.0, 1.0))
                    })
                })
                .collect()
        };

        Self {
            personality: mix(&parent1.personality, &parent2.personality, rng),
            physical: mix(&parent1.physical, &parent2.physical, rng),
            ability: mix(&parent1.ability, &parent2.ability, rng),
            mutation_count: parent1.mutation_count.max(parent2.mutation_count) + 1,
        }
    }
}
