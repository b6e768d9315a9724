//! Configuration System
//!
//! Loads tuning parameters from tuning.toml for easy adjustment without
//! recompiling. Every probability, threshold, and decay multiplier the
//! systems use is a named field here; the defaults are the engine's
//! reference values.

use bevy_ecs::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub lifecycle: LifecycleConfig,
    pub memory: MemoryConfig,
    pub interaction: InteractionConfig,
    pub social: SocialConfig,
    pub learning: LearningConfig,
    pub gender: GenderConfig,
}

/// Agent creation and breeding parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Spawn area bounds for random starting positions
    pub spawn_min_x: f32,
    pub spawn_max_x: f32,
    pub spawn_min_y: f32,
    pub spawn_max_y: f32,
    /// Uniform jitter applied to each blueprint trait at birth
    pub trait_jitter: f32,
    /// Uniform mutation applied to each inherited trait
    pub inheritance_mutation: f32,
    /// Minimum compatibility for mate suggestions
    pub mate_compatibility_threshold: f32,
}

/// Lifecycle thresholds, in simulated days
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub infant_until: f32,
    pub juvenile_until: f32,
    pub elder_from: f32,
    pub maturity_age: f32,
    pub max_age: f32,
}

/// Memory system parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum records per agent before eviction
    pub capacity: usize,
    /// Base importance lost per simulated second
    pub decay_rate: f32,
    /// Below this importance, decay runs at `low_importance_multiplier`
    pub importance_threshold: f32,
    /// At or above this importance, decay rate is halved per pass
    pub consolidation_threshold: f32,
    /// Records below this importance are removed during cleanup
    pub forget_threshold: f32,
    /// Decay multiplier for low-importance records
    pub low_importance_multiplier: f32,
    /// Decay multiplier for frequently recalled records
    pub frequent_access_multiplier: f32,
    /// Access count at which a record counts as frequently recalled
    pub frequent_access_count: u32,
    /// Consolidation never reduces decay below this fraction of the base rate
    pub consolidation_floor: f32,
    /// Importance bump applied to each retrieved record
    pub retrieval_importance_bump: f32,
}

/// Interaction system parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Maximum distance at which two agents can interact
    pub range: f32,
    /// Base interaction probability per simulated second
    pub base_rate: f32,
    /// Social energy consumed by each interaction
    pub energy_cost: f32,
    /// Minimum energy required to interact
    pub min_energy: f32,
    /// Maximum concurrent interactions per agent
    pub max_concurrent: usize,
    /// Seconds between interactions for one agent
    pub cooldown: f32,
    /// Energy recovered per simulated second
    pub recovery_rate: f32,
    /// Probability multiplier when no relationship exists yet
    pub stranger_multiplier: f32,
    /// Probability gain per point of relationship strength
    pub strength_multiplier: f32,
    /// Probability gain per point of personality compatibility
    pub compatibility_multiplier: f32,
    /// Outcome thresholds on the clamped success score
    pub success_threshold: f32,
    pub partial_threshold: f32,
    pub neutral_threshold: f32,
}

/// Social system parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Per-tick chance a qualified leader attempts group formation
    pub formation_chance: f32,
    pub leader_min_energy: f32,
    pub leader_min_preference: f32,
    pub leader_min_ability: f32,
    pub member_min_energy: f32,
    pub member_min_preference: f32,
    /// Energy a leader spends founding a group
    pub formation_cost: f32,
    /// Energy spent founding a group through the facade
    pub manual_formation_cost: f32,
    /// Personality-similarity cut-offs per group kind
    pub friendship_compatibility: f32,
    pub work_compatibility: f32,
    pub mentorship_compatibility: f32,
    pub default_compatibility: f32,
    /// Members (beyond the leader) admitted at formation
    pub max_initial_members: usize,
    /// Groups below this health dissolve
    pub dissolve_health: f32,
    /// Per-tick chance a leaderless group promotes someone
    pub succession_chance: f32,
    pub succession_min_ability: f32,
    pub succession_min_charisma: f32,
    /// Cohesion step toward the member interaction ratio
    pub cohesion_gain: f32,
    /// Per-tick chance an eligible pair forms a connection
    pub connection_chance: f32,
    pub connection_min_compatibility: f32,
    pub connection_min_energy: f32,
    pub connection_min_preference: f32,
    /// New connections allowed per agent per tick
    pub max_new_connections: usize,
    /// Social energy recovered per simulated second
    pub recovery_rate: f32,
}

/// Learning system parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Chance socially connected agents are close enough to share
    pub connected_share_chance: f32,
    /// Chance unconnected agents are close enough to share
    pub stranger_share_chance: f32,
    /// Per-tick chance a teachable item triggers a teaching session
    pub teach_chance: f32,
    /// Per-tick chance an agent pursues its best opportunity
    pub pursue_chance: f32,
    /// Proficiency transfer factor for teaching sessions
    pub teach_rate: f32,
    /// Proficiency transfer factor for pursued opportunities
    pub pursue_rate: f32,
    /// Proficiency transfer factor for facade-initiated transfers
    pub transfer_rate: f32,
    /// Student confidence as a fraction of granted proficiency
    pub teach_confidence_ratio: f32,
    pub pursue_confidence_ratio: f32,
    /// Teachability minimums
    pub min_teach_proficiency: f32,
    pub min_teach_confidence: f32,
    pub min_teach_transferability: f32,
    /// Knowledge lost per day once decay starts
    pub decay_rate: f32,
    /// Seconds without knowledge activity before decay applies
    pub decay_after: f64,
    /// Base learning duration per point of difficulty, in seconds
    pub duration_base: f32,
    /// Seconds until a created opportunity expires
    pub opportunity_ttl: f64,
}

/// Gender system parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenderConfig {
    /// Fluidity rate scale: per-tick change chance = rate * this
    pub fluidity_scale: f32,
    /// Confidence gained per tick with a non-empty support network
    pub support_confidence_gain: f32,
    /// Confidence gained per tick while euphoria is high
    pub euphoria_confidence_gain: f32,
    /// Confidence lost per tick while dysphoria is high
    pub dysphoria_confidence_loss: f32,
    /// Confidence lost per tick while social comfort is low
    pub discomfort_confidence_loss: f32,
    /// Confidence and euphoria gained by each side of a mutual-support pair
    pub mutual_support_gain: f32,
    /// High-water mark for euphoria/dysphoria effects
    pub affect_threshold: f32,
    /// Low-water marks for needs_support
    pub low_confidence: f32,
    pub low_comfort: f32,
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!("could not load {}: {}. Using defaults.", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            lifecycle: LifecycleConfig::default(),
            memory: MemoryConfig::default(),
            interaction: InteractionConfig::default(),
            social: SocialConfig::default(),
            learning: LearningConfig::default(),
            gender: GenderConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            spawn_min_x: 100.0,
            spawn_max_x: 800.0,
            spawn_min_y: 100.0,
            spawn_max_y: 600.0,
            trait_jitter: 0.2,
            inheritance_mutation: 0.1,
            mate_compatibility_threshold: 0.6,
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            infant_until: 0.5,
            juvenile_until: 2.0,
            elder_from: 80.0,
            maturity_age: 2.0,
            max_age: 100.0,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            decay_rate: 0.01,
            importance_threshold: 0.3,
            consolidation_threshold: 0.8,
            forget_threshold: 0.1,
            low_importance_multiplier: 2.0,
            frequent_access_multiplier: 0.5,
            frequent_access_count: 5,
            consolidation_floor: 0.25,
            retrieval_importance_bump: 0.01,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            range: 50.0,
            base_rate: 0.1,
            energy_cost: 0.1,
            min_energy: 0.2,
            max_concurrent: 3,
            cooldown: 2.0,
            recovery_rate: 0.05,
            stranger_multiplier: 0.5,
            strength_multiplier: 0.5,
            compatibility_multiplier: 0.3,
            success_threshold: 0.7,
            partial_threshold: 0.4,
            neutral_threshold: 0.2,
        }
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            formation_chance: 0.1,
            leader_min_energy: 0.7,
            leader_min_preference: 0.6,
            leader_min_ability: 0.5,
            member_min_energy: 0.5,
            member_min_preference: 0.4,
            formation_cost: 0.3,
            manual_formation_cost: 0.5,
            friendship_compatibility: 0.6,
            work_compatibility: 0.4,
            mentorship_compatibility: 0.5,
            default_compatibility: 0.5,
            max_initial_members: 5,
            dissolve_health: 0.2,
            succession_chance: 0.05,
            succession_min_ability: 0.6,
            succession_min_charisma: 0.6,
            cohesion_gain: 0.1,
            connection_chance: 0.1,
            connection_min_compatibility: 0.4,
            connection_min_energy: 0.3,
            connection_min_preference: 0.3,
            max_new_connections: 2,
            recovery_rate: 0.05,
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            connected_share_chance: 0.3,
            stranger_share_chance: 0.05,
            teach_chance: 0.1,
            pursue_chance: 0.2,
            teach_rate: 0.1,
            pursue_rate: 0.15,
            transfer_rate: 0.2,
            teach_confidence_ratio: 0.8,
            pursue_confidence_ratio: 0.7,
            min_teach_proficiency: 0.3,
            min_teach_confidence: 0.4,
            min_teach_transferability: 0.3,
            decay_rate: 0.001,
            decay_after: 86_400.0,
            duration_base: 300.0,
            opportunity_ttl: 604_800.0,
        }
    }
}

impl Default for GenderConfig {
    fn default() -> Self {
        Self {
            fluidity_scale: 0.01,
            support_confidence_gain: 0.001,
            euphoria_confidence_gain: 0.002,
            dysphoria_confidence_loss: 0.001,
            discomfort_confidence_loss: 0.001,
            mutual_support_gain: 0.001,
            affect_threshold: 0.5,
            low_confidence: 0.3,
            low_comfort: 0.3,
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
