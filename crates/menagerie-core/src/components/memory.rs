//! Memory Component
//!
//! Bounded store of typed memory records with importance-driven decay,
//! consolidation, and eviction.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::MemoryConfig;

/// Memory record categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Episodic,
    Semantic,
    Procedural,
    Emotional,
    Social,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Episodic => "episodic",
            MemoryKind::Semantic => "semantic",
            MemoryKind::Procedural => "procedural",
            MemoryKind::Emotional => "emotional",
            MemoryKind::Social => "social",
        }
    }
}

/// A single memory owned by one agent's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub kind: MemoryKind,
    pub content: String,
    /// 0.0 to 1.0; decays over time, bumped on retrieval
    pub importance: f32,
    /// -1.0 to 1.0
    pub emotional_weight: f32,
    /// Importance lost per simulated second
    pub decay_rate: f32,
    /// Rate at creation; consolidation never drops below a floor of this
    pub base_decay_rate: f32,
    pub access_count: u32,
    pub associated_agents: Vec<String>,
    /// Simulated seconds elapsed at creation
    pub created_at: f64,
    /// Simulated seconds elapsed at the last retrieval
    pub last_accessed: f64,
}

impl MemoryRecord {
    /// Rank key for eviction and retrieval: least important first, oldest
    /// access breaking ties.
    fn rank(&self) -> (f32, f64) {
        (self.importance, self.last_accessed)
    }
}

/// Capacity-bounded memory store for one agent.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    memories: BTreeMap<String, MemoryRecord>,
    next_id: u64,
    pub capacity: usize,
    pub decay_rate: f32,
    pub importance_threshold: f32,
    pub consolidation_threshold: f32,
    pub forget_threshold: f32,
    pub low_importance_multiplier: f32,
    pub frequent_access_multiplier: f32,
    pub frequent_access_count: u32,
    pub consolidation_floor: f32,
    pub retrieval_importance_bump: f32,
    pub total_formed: u64,
    pub total_forgotten: u64,
}

impl MemoryStore {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            memories: BTreeMap::new(),
            next_id: 1,
            capacity: config.capacity,
            decay_rate: config.decay_rate,
            importance_threshold: config.importance_threshold,
            consolidation_threshold: config.consolidation_threshold,
            forget_threshold: config.forget_threshold,
            low_importance_multiplier: config.low_importance_multiplier,
            frequent_access_multiplier: config.frequent_access_multiplier,
            frequent_access_count: config.frequent_access_count,
            consolidation_floor: config.consolidation_floor,
            retrieval_importance_bump: config.retrieval_importance_bump,
            total_formed: 0,
            total_forgotten: 0,
        }
    }

    fn generate_id(&mut self) -> String {
        let id = format!("mem_{:08}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Store a new memory, evicting the least valuable record first when at
    /// capacity. Returns the new record's id.
    pub fn store(
        &mut self,
        kind: MemoryKind,
        content: impl Into<String>,
        importance: f32,
        emotional_weight: f32,
        associated_agents: Vec<String>,
        now: f64,
    ) -> String {
        if self.memories.len() >= self.capacity {
            self.evict_least_valuable();
        }

        let id = self.generate_id();
        let record = MemoryRecord {
            id: id.clone(),
            kind,
            content: content.into(),
            importance: importance.clamp(0.0, 1.0),
            emotional_weight: emotional_weight.clamp(-1.0, 1.0),
            decay_rate: self.decay_rate,
            base_decay_rate: self.decay_rate,
            access_count: 0,
            associated_agents,
            created_at: now,
            last_accessed: now,
        };

        self.memories.insert(id.clone(), record);
        self.total_formed += 1;
        id
    }

    fn evict_least_valuable(&mut self) {
        let victim = self
            .memories
            .values()
            .min_by(|a, b| {
                let (ia, ta) = a.rank();
                let (ib, tb) = b.rank();
                ia.total_cmp(&ib).then(ta.total_cmp(&tb))
            })
            .map(|record| record.id.clone());

        if let Some(id) = victim {
            self.memories.remove(&id);
        }
    }

    /// Retrieve up to `limit` memories matching the filters, ranked by
    /// (importance, last_accessed) descending. Returned records are marked
    /// accessed: their access count grows, importance is nudged upward, and
    /// last_accessed resets to now.
    pub fn retrieve(
        &mut self,
        query: Option<&str>,
        kind: Option<MemoryKind>,
        limit: usize,
        min_importance: f32,
        now: f64,
    ) -> Vec<MemoryRecord> {
        let needle = query.map(str::to_lowercase);

        let mut matching: Vec<String> = self
            .memories
            .values()
            .filter(|record| record.importance >= min_importance)
            .filter(|record| kind.map_or(true, |k| record.kind == k))
            .filter(|record| {
                needle
                    .as_deref()
                    .map_or(true, |q| record.content.to_lowercase().contains(q))
            })
            .map(|record| record.id.clone())
            .collect();

        matching.sort_by(|a, b| {
            let ra = self.memories[a].rank();
            let rb = self.memories[b].rank();
            rb.0.total_cmp(&ra.0).then(rb.1.total_cmp(&ra.1))
        });
        matching.truncate(limit);

        let bump = self.retrieval_importance_bump;
        matching
            .iter()
            .filter_map(|id| {
                self.memories.get_mut(id).map(|record| {
                    record.access_count += 1;
                    record.importance = (record.importance + bump).clamp(0.0, 1.0);
                    record.last_accessed = now;
                    record.clone()
                })
            })
            .collect()
    }

    /// Apply one tick of decay and consolidation. Low-importance records
    /// decay faster, frequently recalled ones slower; records at or above
    /// the consolidation threshold have their decay rate halved, floored at
    /// a fraction of the base rate.
    pub fn decay(&mut self, delta: f32) {
        if delta <= 0.0 {
            return;
        }

        for record in self.memories.values_mut() {
            if record.importance >= self.consolidation_threshold {
                let floor = record.base_decay_rate * self.consolidation_floor;
                record.decay_rate = (record.decay_rate * 0.5).max(floor);
            }

            let mut factor = if record.importance < self.importance_threshold {
                self.low_importance_multiplier
            } else {
                1.0
            };
            if record.access_count > self.frequent_access_count {
                factor *= self.frequent_access_multiplier;
            }

            record.importance =
                (record.importance - record.decay_rate * delta * factor).clamp(0.0, 1.0);
        }
    }

    /// Remove records that decayed below the forget threshold. Returns how
    /// many were forgotten.
    pub fn cleanup(&mut self) -> usize {
        let threshold = self.forget_threshold;
        let before = self.memories.len();
        self.memories.retain(|_, record| record.importance >= threshold);
        let removed = before - self.memories.len();
        self.total_forgotten += removed as u64;
        removed
    }

    pub fn get(&self, id: &str) -> Option<&MemoryRecord> {
        self.memories.get(id)
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryRecord> {
        self.memories.values()
    }

    /// Average importance across held records, 0.0 when empty.
    pub fn average_importance(&self) -> f32 {
        if self.memories.is_empty() {
            return 0.0;
        }
        let total: f32 = self.memories.values().map(|m| m.importance).sum();
        total / self.memories.len() as f32
    }

    /// Record counts per memory kind.
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for record in self.memories.values() {
            *counts.entry(record.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(&MemoryConfig::default())
    }

    fn small_store(capacity: usize) -> MemoryStore {
        MemoryStore::new(&MemoryConfig {
            capacity,
            ..MemoryConfig::default()
        })
    }

    #[test]
    fn test_store_and_retrieve() {
        let mut store = store();
        store.store(MemoryKind::Episodic, "met a wolf by the river", 0.8, 0.3, vec![], 0.0);
        store.store(MemoryKind::Semantic, "rivers flow downhill", 0.6, 0.0, vec![], 1.0);

        let episodic = store.retrieve(None, Some(MemoryKind::Episodic), 10, 0.0, 2.0);
        assert_eq!(episodic.len(), 1);
        assert_eq!(episodic[0].content, "met a wolf by the river");

        let by_query = store.retrieve(Some("downhill"), None, 10, 0.0, 3.0);
        assert_eq!(by_query.len(), 1);
        assert_eq!(by_query[0].kind, MemoryKind::Semantic);
    }

    #[test]
    fn test_retrieval_marks_access() {
        let mut store = store();
        let id = store.store(MemoryKind::Episodic, "something", 0.5, 0.0, vec![], 0.0);

        store.retrieve(None, None, 10, 0.0, 7.0);

        let record = store.get(&id).unwrap();
        assert_eq!(record.access_count, 1);
        assert!(record.importance > 0.5);
        assert!((record.last_accessed - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_evicts_least_valuable() {
        let mut store = small_store(2);
        store.store(MemoryKind::Episodic, "trivial", 0.1, 0.0, vec![], 0.0);
        store.store(MemoryKind::Episodic, "vital", 0.9, 0.0, vec![], 1.0);
        store.store(MemoryKind::Episodic, "new", 0.5, 0.0, vec![], 2.0);

        assert_eq!(store.len(), 2);
        assert_eq!(store.total_formed, 3);
        assert!(store.iter().all(|m| m.content != "trivial"));
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut store = small_store(4);
        for i in 0..50 {
            store.store(MemoryKind::Social, format!("memory {i}"), 0.5, 0.0, vec![], i as f64);
            assert!(store.len() <= 4);
        }
    }

    #[test]
    fn test_low_importance_decays_faster() {
        let mut store = store();
        let low = store.store(MemoryKind::Episodic, "low", 0.2, 0.0, vec![], 0.0);
        let high = store.store(MemoryKind::Episodic, "high", 0.6, 0.0, vec![], 0.0);

        store.decay(1.0);

        let low_loss = 0.2 - store.get(&low).unwrap().importance;
        let high_loss = 0.6 - store.get(&high).unwrap().importance;
        assert!(low_loss > high_loss);
    }

    #[test]
    fn test_frequent_recall_slows_decay() {
        let mut store = store();
        let id = store.store(MemoryKind::Episodic, "rehearsed", 0.6, 0.0, vec![], 0.0);
        for _ in 0..6 {
            store.retrieve(Some("rehearsed"), None, 1, 0.0, 0.0);
        }
        let fresh = store.store(MemoryKind::Episodic, "unrehearsed", 0.6, 0.0, vec![], 0.0);

        let before_rehearsed = store.get(&id).unwrap().importance;
        store.decay(1.0);

        let rehearsed_loss = before_rehearsed - store.get(&id).unwrap().importance;
        let fresh_loss = 0.6 - store.get(&fresh).unwrap().importance;
        assert!(rehearsed_loss < fresh_loss);
    }

    #[test]
    fn test_consolidation_halves_decay_with_floor() {
        let mut store = store();
        let id = store.store(MemoryKind::Emotional, "formative", 0.95, 0.8, vec![], 0.0);

        for _ in 0..10 {
            store.decay(0.1);
        }

        let record = store.get(&id).unwrap();
        let floor = record.base_decay_rate * store.consolidation_floor;
        assert!(record.decay_rate < record.base_decay_rate);
        assert!(record.decay_rate >= floor - f32::EPSILON);
    }

    #[test]
    fn test_cleanup_forgets_and_counts() {
        let mut store = store();
        store.store(MemoryKind::Episodic, "fading", 0.05, 0.0, vec![], 0.0);
        store.store(MemoryKind::Episodic, "solid", 0.7, 0.0, vec![], 0.0);

        let removed = store.cleanup();
        assert_eq!(removed, 1);
        assert_eq!(store.total_forgotten, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_decay_until_forgotten() {
        let mut store = store();
        store.store(MemoryKind::Episodic, "doomed", 0.9, 0.0, vec![], 0.0);

        // decay_rate 0.05 on this record
        if let Some(record) = store.memories.values_mut().next() {
            record.decay_rate = 0.05;
            record.base_decay_rate = 0.05;
        }

        let mut forgotten = false;
        for _ in 0..200 {
            store.decay(1.0);
            if store.cleanup() > 0 {
                forgotten = true;
                break;
            }
        }

        assert!(forgotten, "memory should decay below the forget threshold");
        assert_eq!(store.total_forgotten, 1);
        assert!(store.is_empty());
    }
}
