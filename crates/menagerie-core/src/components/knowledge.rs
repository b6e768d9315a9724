//! Knowledge Component
//!
//! Per-agent knowledge base with proficiency/confidence tracking, bounded
//! capacity, teachability rules, learning opportunities, and slow decay.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::LearningConfig;
use crate::SECONDS_PER_DAY;

/// Kinds of knowledge agents can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKind {
    Factual,
    Procedural,
    Conceptual,
    Experiential,
    Social,
    Technical,
    Creative,
    Emotional,
}

impl KnowledgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeKind::Factual => "factual",
            KnowledgeKind::Procedural => "procedural",
            KnowledgeKind::Conceptual => "conceptual",
            KnowledgeKind::Experiential => "experiential",
            KnowledgeKind::Social => "social",
            KnowledgeKind::Technical => "technical",
            KnowledgeKind::Creative => "creative",
            KnowledgeKind::Emotional => "emotional",
        }
    }
}

/// How knowledge is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningMethod {
    Observation,
    Practice,
    Teaching,
    Experience,
    Study,
    Collaboration,
    Mentorship,
    Experimentation,
}

impl LearningMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningMethod::Observation => "observation",
            LearningMethod::Practice => "practice",
            LearningMethod::Teaching => "teaching",
            LearningMethod::Experience => "experience",
            LearningMethod::Study => "study",
            LearningMethod::Collaboration => "collaboration",
            LearningMethod::Mentorship => "mentorship",
            LearningMethod::Experimentation => "experimentation",
        }
    }

    /// Duration multiplier relative to the base learning time.
    pub fn duration_multiplier(&self) -> f32 {
        match self {
            LearningMethod::Observation => 0.8,
            LearningMethod::Practice => 1.2,
            LearningMethod::Teaching => 0.6,
            LearningMethod::Experience => 1.0,
            LearningMethod::Study => 1.5,
            LearningMethod::Collaboration => 0.9,
            LearningMethod::Mentorship => 0.7,
            LearningMethod::Experimentation => 1.3,
        }
    }
}

/// A piece of knowledge held by one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub title: String,
    pub kind: KnowledgeKind,
    pub description: String,
    /// All 0.0 to 1.0
    pub proficiency: f32,
    pub confidence: f32,
    pub difficulty: f32,
    pub importance: f32,
    pub transferability: f32,
    pub usage_count: u32,
    pub learning_method: LearningMethod,
    pub source_agent: Option<String>,
    /// Simulated seconds elapsed at acquisition / last use
    pub acquired_at: f64,
    pub last_used: f64,
}

impl KnowledgeItem {
    /// Whether this item can be taught given the configured minimums.
    pub fn can_teach(&self, min_proficiency: f32, min_confidence: f32, min_transfer: f32) -> bool {
        self.proficiency >= min_proficiency
            && self.confidence >= min_confidence
            && self.transferability >= min_transfer
    }

    /// How effectively this item transfers to a student.
    pub fn teaching_effectiveness(&self) -> f32 {
        self.proficiency * 0.4 + self.confidence * 0.3 + self.transferability * 0.3
    }

    /// Overall value, used to pick an eviction victim at capacity.
    pub fn value(&self) -> f32 {
        let usage_factor = (self.usage_count as f32 / 100.0).min(1.0);
        self.proficiency * 0.3 + self.importance * 0.3 + self.confidence * 0.2 + usage_factor * 0.2
    }

    pub fn update_proficiency(&mut self, amount: f32, now: f64) {
        self.proficiency = (self.proficiency + amount).clamp(0.0, 1.0);
        self.last_used = now;
    }

    pub fn update_confidence(&mut self, amount: f32) {
        self.confidence = (self.confidence + amount).clamp(0.0, 1.0);
    }

    /// Mark the item used; use itself slightly reinforces proficiency.
    pub fn use_item(&mut self, now: f64) {
        self.usage_count += 1;
        self.update_proficiency(0.001, now);
    }
}

/// An ephemeral offer for this agent to learn something from a peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningOpportunity {
    pub id: String,
    pub knowledge_id: String,
    pub source_agent: String,
    pub method: LearningMethod,
    /// 0.0 to 1.0
    pub estimated_difficulty: f32,
    /// Simulated seconds
    pub estimated_duration: f32,
    /// 0.0 to 1.0
    pub learning_potential: f32,
    pub created_at: f64,
    pub expires_at: Option<f64>,
}

impl LearningOpportunity {
    pub fn is_expired(&self, now: f64) -> bool {
        self.expires_at.map_or(false, |expiry| now > expiry)
    }

    /// Score for choosing among opportunities: easier, shorter, higher
    /// potential wins.
    pub fn score(&self, now: f64) -> f32 {
        if self.is_expired(now) {
            return 0.0;
        }
        let difficulty_factor = 1.0 - self.estimated_difficulty;
        let duration_factor = (1.0 - self.estimated_duration / 3600.0).max(0.1);
        difficulty_factor * 0.3 + duration_factor * 0.3 + self.learning_potential * 0.4
    }
}

/// Capacity-bounded knowledge base and learning state for one agent.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    items: BTreeMap<String, KnowledgeItem>,
    opportunities: BTreeMap<String, LearningOpportunity>,
    next_item_id: u64,
    next_opportunity_id: u64,
    pub capacity: usize,
    /// All 0.0 to 1.0
    pub learning_rate: f32,
    pub teaching_ability: f32,
    pub curiosity: f32,
    /// Proficiency lost per day once decay starts
    pub decay_rate: f32,
    /// Seconds of inactivity before decay applies
    pub decay_after: f64,
    /// Simulated seconds elapsed at the last knowledge activity
    pub last_update: f64,
    pub total_acquired: u64,
    pub total_shared: u64,
    pub teaching_sessions: u64,
    pub learning_sessions: u64,
}

impl KnowledgeBase {
    pub fn new(config: &LearningConfig, now: f64) -> Self {
        Self {
            items: BTreeMap::new(),
            opportunities: BTreeMap::new(),
            next_item_id: 1,
            next_opportunity_id: 1,
            capacity: 100,
            learning_rate: 0.1,
            teaching_ability: 0.5,
            curiosity: 0.5,
            decay_rate: config.decay_rate,
            decay_after: config.decay_after,
            last_update: now,
            total_acquired: 0,
            total_shared: 0,
            teaching_sessions: 0,
            learning_sessions: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_item(
        &mut self,
        title: impl Into<String>,
        kind: KnowledgeKind,
        description: impl Into<String>,
        proficiency: f32,
        confidence: f32,
        method: LearningMethod,
        source_agent: Option<String>,
        difficulty: f32,
        importance: f32,
        transferability: f32,
        now: f64,
    ) -> String {
        if self.items.len() >= self.capacity {
            self.evict_least_valuable();
        }

        let id = format!("kn_{:08}", self.next_item_id);
        self.next_item_id += 1;

        let item = KnowledgeItem {
            id: id.clone(),
            title: title.into(),
            kind,
            description: description.into(),
            proficiency: proficiency.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            difficulty: difficulty.clamp(0.0, 1.0),
            importance: importance.clamp(0.0, 1.0),
            transferability: transferability.clamp(0.0, 1.0),
            usage_count: 0,
            learning_method: method,
            source_agent,
            acquired_at: now,
            last_used: now,
        };

        self.items.insert(id.clone(), item);
        self.total_acquired += 1;
        self.last_update = now;
        id
    }

    fn evict_least_valuable(&mut self) {
        let victim = self
            .items
            .values()
            .min_by(|a, b| a.value().total_cmp(&b.value()))
            .map(|item| item.id.clone());
        if let Some(id) = victim {
            self.items.remove(&id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeItem> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut KnowledgeItem> {
        self.items.get_mut(id)
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.items.values().any(|item| item.title == title)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeItem> {
        self.items.values()
    }

    /// Items this agent could teach under the configured minimums.
    pub fn teachable(&self, config: &LearningConfig) -> Vec<&KnowledgeItem> {
        self.items
            .values()
            .filter(|item| {
                item.can_teach(
                    config.min_teach_proficiency,
                    config.min_teach_confidence,
                    config.min_teach_transferability,
                )
            })
            .collect()
    }

    pub fn add_opportunity(
        &mut self,
        knowledge_id: impl Into<String>,
        source_agent: impl Into<String>,
        method: LearningMethod,
        estimated_difficulty: f32,
        estimated_duration: f32,
        learning_potential: f32,
        now: f64,
        expires_at: Option<f64>,
    ) -> String {
        let id = format!("opp_{:08}", self.next_opportunity_id);
        self.next_opportunity_id += 1;

        self.opportunities.insert(
            id.clone(),
            LearningOpportunity {
                id: id.clone(),
                knowledge_id: knowledge_id.into(),
                source_agent: source_agent.into(),
                method,
                estimated_difficulty: estimated_difficulty.clamp(0.0, 1.0),
                estimated_duration: estimated_duration.max(0.0),
                learning_potential: learning_potential.clamp(0.0, 1.0),
                created_at: now,
                expires_at,
            },
        );
        id
    }

    pub fn opportunities(&self) -> impl Iterator<Item = &LearningOpportunity> {
        self.opportunities.values()
    }

    pub fn opportunity_count(&self) -> usize {
        self.opportunities.len()
    }

    pub fn has_opportunity_from(&self, source_agent: &str, knowledge_id: &str, now: f64) -> bool {
        self.opportunities.values().any(|opp| {
            opp.source_agent == source_agent
                && opp.knowledge_id == knowledge_id
                && !opp.is_expired(now)
        })
    }

    /// The best live opportunity by score, if any.
    pub fn best_opportunity(&self, now: f64) -> Option<&LearningOpportunity> {
        self.opportunities
            .values()
            .filter(|opp| !opp.is_expired(now))
            .max_by(|a, b| a.score(now).total_cmp(&b.score(now)))
    }

    pub fn remove_opportunity(&mut self, id: &str) -> bool {
        self.opportunities.remove(id).is_some()
    }

    /// Drop the opportunity matching a completed transfer, if present.
    pub fn consume_opportunity_for(&mut self, source_agent: &str, knowledge_id: &str) {
        let matching = self
            .opportunities
            .values()
            .find(|opp| opp.source_agent == source_agent && opp.knowledge_id == knowledge_id)
            .map(|opp| opp.id.clone());
        if let Some(id) = matching {
            self.opportunities.remove(&id);
        }
    }

    /// Remove expired opportunities; returns how many were dropped.
    pub fn expire_opportunities(&mut self, now: f64) -> usize {
        let before = self.opportunities.len();
        self.opportunities.retain(|_, opp| !opp.is_expired(now));
        before - self.opportunities.len()
    }

    /// How effectively this agent learns through a given method.
    pub fn learning_effectiveness(&self, _method: LearningMethod) -> f32 {
        (0.5 + self.curiosity * 0.2 + self.learning_rate * 0.3).clamp(0.0, 1.0)
    }

    /// Apply inactivity decay: once more than `decay_after` seconds have
    /// passed since the last knowledge activity, proficiency and confidence
    /// erode in proportion to the days elapsed.
    pub fn decay(&mut self, now: f64) {
        let idle = now - self.last_update;
        if idle <= self.decay_after {
            return;
        }

        let decay_amount = self.decay_rate * (idle / SECONDS_PER_DAY) as f32;
        for item in self.items.values_mut() {
            item.proficiency = (item.proficiency - decay_amount * 0.1).clamp(0.0, 1.0);
            item.confidence = (item.confidence - decay_amount * 0.05).clamp(0.0, 1.0);
        }
        self.last_update = now;
    }

    /// Average proficiency across held items, 0.0 when empty.
    pub fn average_proficiency(&self) -> f32 {
        if self.items.is_empty() {
            return 0.0;
        }
        let total: f32 = self.items.values().map(|i| i.proficiency).sum();
        total / self.items.len() as f32
    }

    /// Item counts per knowledge kind.
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for item in self.items.values() {
            *counts.entry(item.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> KnowledgeBase {
        KnowledgeBase::new(&LearningConfig::default(), 0.0)
    }

    fn add_simple(kb: &mut KnowledgeBase, title: &str, proficiency: f32) -> String {
        kb.add_item(
            title,
            KnowledgeKind::Factual,
            "",
            proficiency,
            0.5,
            LearningMethod::Experience,
            None,
            0.5,
            0.5,
            0.5,
            0.0,
        )
    }

    #[test]
    fn test_teachability_thresholds() {
        let config = LearningConfig::default();
        let mut kb = base();
        add_simple(&mut kb, "fishing", 0.8);
        let weak = add_simple(&mut kb, "whittling", 0.1);

        let teachable = kb.teachable(&config);
        assert_eq!(teachable.len(), 1);
        assert_eq!(teachable[0].title, "fishing");

        // Confidence below the minimum also blocks teaching
        kb.get_mut(&weak).unwrap().proficiency = 0.9;
        kb.get_mut(&weak).unwrap().confidence = 0.1;
        assert_eq!(kb.teachable(&config).len(), 1);
    }

    #[test]
    fn test_capacity_evicts_least_valuable() {
        let mut kb = base();
        kb.capacity = 2;
        add_simple(&mut kb, "a", 0.9);
        add_simple(&mut kb, "b", 0.05);
        add_simple(&mut kb, "c", 0.5);

        assert_eq!(kb.len(), 2);
        assert!(!kb.has_title("b"));
    }

    #[test]
    fn test_best_opportunity_prefers_easy_and_valuable() {
        let mut kb = base();
        kb.add_opportunity("kn_1", "teacher", LearningMethod::Teaching, 0.9, 3000.0, 0.2, 0.0, None);
        let good = kb.add_opportunity(
            "kn_2",
            "teacher",
            LearningMethod::Teaching,
            0.1,
            120.0,
            0.9,
            0.0,
            None,
        );

        assert_eq!(kb.best_opportunity(1.0).unwrap().id, good);
    }

    #[test]
    fn test_opportunity_expiry() {
        let mut kb = base();
        kb.add_opportunity("kn_1", "teacher", LearningMethod::Study, 0.5, 60.0, 0.5, 0.0, Some(10.0));
        kb.add_opportunity("kn_2", "teacher", LearningMethod::Study, 0.5, 60.0, 0.5, 0.0, None);

        assert_eq!(kb.expire_opportunities(5.0), 0);
        assert_eq!(kb.expire_opportunities(11.0), 1);
        assert_eq!(kb.opportunity_count(), 1);
    }

    #[test]
    fn test_decay_waits_a_day() {
        let mut kb = base();
        let id = add_simple(&mut kb, "fishing", 0.8);

        kb.decay(3_600.0);
        assert!((kb.get(&id).unwrap().proficiency - 0.8).abs() < 1e-6);

        kb.decay(200_000.0);
        assert!(kb.get(&id).unwrap().proficiency < 0.8);
    }

    #[test]
    fn test_bounds_on_updates() {
        let mut kb = base();
        let id = add_simple(&mut kb, "fishing", 0.9);

        let item = kb.get_mut(&id).unwrap();
        item.update_proficiency(5.0, 1.0);
        assert!(item.proficiency <= 1.0);
        item.update_confidence(-5.0);
        assert!(item.confidence >= 0.0);
    }

    #[test]
    fn test_consume_opportunity_for() {
        let mut kb = base();
        kb.add_opportunity("kn_9", "mentor", LearningMethod::Mentorship, 0.3, 60.0, 0.6, 0.0, None);
        assert!(kb.has_opportunity_from("mentor", "kn_9", 1.0));

        kb.consume_opportunity_for("mentor", "kn_9");
        assert!(!kb.has_opportunity_from("mentor", "kn_9", 1.0));
    }
}
