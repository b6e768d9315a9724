//! Identity Components
//!
//! Marker and naming components identifying an entity as an agent.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Unique identifier for an agent
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// Human-readable name for an agent
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct AgentName(pub String);

/// Spirit archetype and naming style, fixed at creation and inherited from
/// the first parent during breeding.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct SpiritIdentity {
    pub spirit: String,
    pub style: String,
}

impl SpiritIdentity {
    pub fn new(spirit: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            spirit: spirit.into(),
            style: style.into(),
        }
    }
}
