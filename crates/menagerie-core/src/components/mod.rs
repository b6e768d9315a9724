//! Agent Components
//!
//! Pure per-entity data: identity, trait maps, lifecycle, lineage, memory,
//! interaction state, social standing, knowledge, gender, and position.
//! Systems tolerate any of these being absent on an entity.

pub mod gender;
pub mod identity;
pub mod interaction;
pub mod knowledge;
pub mod lifecycle;
pub mod lineage;
pub mod memory;
pub mod position;
pub mod social;
pub mod traits;

pub use gender::{ExpressionStyle, GenderIdentity, GenderProfile, GenderState, PronounSet};
pub use identity::{Agent, AgentId, AgentName, SpiritIdentity};
pub use interaction::{
    InteractionKind, InteractionOutcome, InteractionState, Relationship, RelationshipKind,
};
pub use knowledge::{
    KnowledgeBase, KnowledgeItem, KnowledgeKind, LearningMethod, LearningOpportunity,
};
pub use lifecycle::{LifeStage, Lifecycle};
pub use lineage::{Lineage, Reproduction};
pub use memory::{MemoryKind, MemoryRecord, MemoryStore};
pub use position::Position;
pub use social::{
    ConnectionKind, GroupKind, GroupRegistry, SocialConnection, SocialGroup, SocialState,
    SocialStatus,
};
pub use traits::TraitProfile;
