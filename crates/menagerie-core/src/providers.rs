//! Trait and Naming Providers
//!
//! External lookups consumed only at agent creation. Blueprints are held in
//! memory so instantiation never blocks the tick loop; outer layers that
//! fetch profiles over the network pre-populate a provider before handing
//! it to the world. When a provider cannot answer, the engine falls back to
//! built-in defaults and counts the degraded path.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// A trait profile blueprint for one spirit archetype.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitBlueprint {
    pub personality: BTreeMap<String, f32>,
    pub physical: BTreeMap<String, f32>,
    pub ability: BTreeMap<String, f32>,
}

impl TraitBlueprint {
    /// The fallback profile: every known trait at the neutral midpoint.
    pub fn balanced() -> Self {
        let neutral = |names: &[&str]| -> BTreeMap<String, f32> {
            names.iter().map(|n| (n.to_string(), 0.5)).collect()
        };
        Self {
            personality: neutral(PERSONALITY_TRAITS),
            physical: neutral(PHYSICAL_TRAITS),
            ability: neutral(ABILITY_TRAITS),
        }
    }
}

/// Canonical personality trait keys.
pub const PERSONALITY_TRAITS: &[&str] = &[
    "aggression",
    "charisma",
    "creativity",
    "cunning",
    "curiosity",
    "dominance",
    "intelligence",
    "loyalty",
    "patience",
    "playfulness",
];

/// Canonical physical trait keys.
pub const PHYSICAL_TRAITS: &[&str] = &["agility", "endurance", "size", "strength"];

/// Canonical ability trait keys.
pub const ABILITY_TRAITS: &[&str] = &["healer", "hunter", "navigator", "strategist", "teacher"];

/// Source of trait blueprints, keyed by spirit archetype.
pub trait ProfileProvider {
    fn profile(&self, spirit: &str) -> Option<TraitBlueprint>;
}

/// Source of display names.
pub trait NameProvider {
    fn generate(&self, spirit: &str, style: &str, rng: &mut SmallRng) -> Option<String>;
}

/// Resource: counters for the degraded provider paths.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ProviderStats {
    pub profile_fallbacks: u64,
    pub name_fallbacks: u64,
}

/// Built-in blueprint library covering the stock spirit archetypes.
#[derive(Debug, Clone)]
pub struct SpiritLibrary {
    blueprints: BTreeMap<String, TraitBlueprint>,
}

impl SpiritLibrary {
    pub fn builtin() -> Self {
        let mut blueprints = BTreeMap::new();
        for (spirit, emphasis) in SPIRIT_EMPHASIS {
            let mut blueprint = TraitBlueprint::balanced();
            for (name, value) in *emphasis {
                blueprint.personality.insert(name.to_string(), *value);
            }
            blueprints.insert(spirit.to_string(), blueprint);
        }
        Self { blueprints }
    }

    pub fn spirits(&self) -> Vec<String> {
        self.blueprints.keys().cloned().collect()
    }
}

impl ProfileProvider for SpiritLibrary {
    fn profile(&self, spirit: &str) -> Option<TraitBlueprint> {
        self.blueprints.get(spirit).cloned()
    }
}

/// Per-spirit personality emphasis over the balanced baseline.
const SPIRIT_EMPHASIS: &[(&str, &[(&str, f32)])] = &[
    ("fox", &[("cunning", 0.85), ("intelligence", 0.75), ("creativity", 0.7), ("playfulness", 0.6)]),
    ("wolf", &[("loyalty", 0.85), ("dominance", 0.75), ("aggression", 0.65), ("charisma", 0.6)]),
    ("otter", &[("playfulness", 0.9), ("curiosity", 0.8), ("creativity", 0.7), ("charisma", 0.65)]),
    ("eagle", &[("dominance", 0.8), ("intelligence", 0.75), ("patience", 0.7)]),
    ("lion", &[("dominance", 0.85), ("charisma", 0.8), ("aggression", 0.7)]),
    ("tiger", &[("aggression", 0.85), ("dominance", 0.75), ("cunning", 0.65)]),
    ("dragon", &[("intelligence", 0.9), ("dominance", 0.8), ("patience", 0.75)]),
];

/// Built-in name composer: spirit epithet + style suffix + generation
/// number, e.g. "Vixen-Sage-13".
#[derive(Debug, Clone, Default)]
pub struct StyleNamer;

impl StyleNamer {
    fn epithets(spirit: &str) -> &'static [&'static str] {
        match spirit {
            "fox" => &["Vixen", "Reynard", "Russet", "Fennec"],
            "wolf" => &["Lupus", "Fang", "Howler", "Grey"],
            "otter" => &["Lutra", "Ripple", "Brook", "Sleek"],
            "eagle" => &["Aquila", "Talon", "Soar", "Keen"],
            "lion" => &["Leo", "Mane", "Pride", "Regal"],
            "tiger" => &["Stripe", "Amber", "Prowl", "Blaze"],
            "dragon" => &["Wyrm", "Ember", "Scale", "Ancient"],
            _ => &["Spirit", "Wild", "Kin"],
        }
    }

    fn suffixes(style: &str) -> &'static [&'static str] {
        match style {
            "foundation" => &["Prime", "Sage", "Oracle", "Axiom"],
            "exo" => &["Strike", "Guard", "Sentinel", "Vanguard"],
            "cyberpunk" => &["Nexus", "Grid", "Static", "Neon"],
            "hybrid" => &["Weave", "Shift", "Flux"],
            _ => &["Prime", "Sage", "Oracle"],
        }
    }
}

impl NameProvider for StyleNamer {
    fn generate(&self, spirit: &str, style: &str, rng: &mut SmallRng) -> Option<String> {
        let epithet = Self::epithets(spirit).choose(rng)?;
        let suffix = Self::suffixes(style).choose(rng)?;
        let generation = rng.gen_range(1..=99);
        Some(format!("{epithet}-{suffix}-{generation}"))
    }
}

/// Last-resort name when even the composer declines.
pub fn fallback_name(spirit: &str, rng: &mut SmallRng) -> String {
    let mut chars = spirit.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Agent".to_string(),
    };
    format!("{}-{}", capitalized, rng.gen_range(1..=999))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_library_covers_stock_spirits() {
        let library = SpiritLibrary::builtin();
        for spirit in ["fox", "wolf", "otter", "eagle", "lion", "tiger", "dragon"] {
            let blueprint = library.profile(spirit).unwrap();
            assert!(!blueprint.personality.is_empty());
            for value in blueprint.personality.values() {
                assert!((0.0..=1.0).contains(value));
            }
        }
        assert!(library.profile("kraken").is_none());
    }

    #[test]
    fn test_fox_emphasizes_cunning() {
        let library = SpiritLibrary::builtin();
        let fox = library.profile("fox").unwrap();
        assert!(fox.personality["cunning"] > fox.personality["aggression"]);
    }

    #[test]
    fn test_namer_is_deterministic_per_seed() {
        let namer = StyleNamer;
        let mut rng1 = SmallRng::seed_from_u64(11);
        let mut rng2 = SmallRng::seed_from_u64(11);

        let a = namer.generate("fox", "foundation", &mut rng1).unwrap();
        let b = namer.generate("fox", "foundation", &mut rng2).unwrap();
        assert_eq!(a, b);
        assert!(a.contains('-'));
    }

    #[test]
    fn test_fallback_name_capitalizes() {
        let mut rng = SmallRng::seed_from_u64(3);
        let name = fallback_name("fox", &mut rng);
        assert!(name.starts_with("Fox-"));
    }
}
