//! Event Types
//!
//! Typed records for everything noteworthy the engine does during a tick.
//! Events are accumulated by the engine and drained by the caller, which
//! usually appends them to a JSONL log.

use serde::{Deserialize, Serialize};

/// A single simulation event with its log id and the tick it occurred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub tick: u64,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Event payloads, tagged by kind in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// A new agent entered the world.
    AgentCreated {
        agent_id: String,
        name: String,
        spirit: String,
    },
    /// Two parents produced an offspring.
    OffspringCreated {
        agent_id: String,
        parent1: String,
        parent2: String,
        mutation_count: u32,
    },
    /// An interaction between two agents resolved.
    InteractionCompleted {
        agent1: String,
        agent2: String,
        interaction: String,
        outcome: String,
        relationship_impact: f32,
    },
    /// Two agents formed a social connection.
    ConnectionFormed {
        agent1: String,
        agent2: String,
        connection: String,
    },
    /// A social group came into existence.
    GroupFormed {
        group_id: String,
        group_kind: String,
        leader: String,
        member_count: usize,
    },
    /// A social group dissolved (low health or too few members).
    GroupDissolved {
        group_id: String,
        member_count: usize,
    },
    /// A leaderless group promoted a new leader.
    LeadershipChanged {
        group_id: String,
        new_leader: String,
    },
    /// Knowledge moved from teacher to student.
    KnowledgeTransferred {
        teacher: String,
        student: String,
        title: String,
        method: String,
    },
    /// An agent's primary gender identity shifted.
    IdentityChanged {
        agent_id: String,
        old_identity: String,
        new_identity: String,
    },
    /// The trait or naming provider was unavailable and a built-in
    /// fallback was used instead.
    ProviderFallback {
        agent_id: String,
        provider: String,
    },
}

impl EventPayload {
    /// Short machine-friendly name of the payload kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::AgentCreated { .. } => "agent_created",
            EventPayload::OffspringCreated { .. } => "offspring_created",
            EventPayload::InteractionCompleted { .. } => "interaction_completed",
            EventPayload::ConnectionFormed { .. } => "connection_formed",
            EventPayload::GroupFormed { .. } => "group_formed",
            EventPayload::GroupDissolved { .. } => "group_dissolved",
            EventPayload::LeadershipChanged { .. } => "leadership_changed",
            EventPayload::KnowledgeTransferred { .. } => "knowledge_transferred",
            EventPayload::IdentityChanged { .. } => "identity_changed",
            EventPayload::ProviderFallback { .. } => "provider_fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trip() {
        let event = Event {
            event_id: "evt_00000001".to_string(),
            tick: 42,
            payload: EventPayload::GroupFormed {
                group_id: "group_00001".to_string(),
                group_kind: "friendship".to_string(),
                leader: "agent-7".to_string(),
                member_count: 4,
            },
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"group_formed\""));

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_payload_kind_names() {
        let payload = EventPayload::IdentityChanged {
            agent_id: "agent-1".to_string(),
            old_identity: "nonbinary".to_string(),
            new_identity: "genderfluid".to_string(),
        };
        assert_eq!(payload.kind(), "identity_changed");
    }
}
