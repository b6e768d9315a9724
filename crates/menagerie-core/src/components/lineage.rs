//! Lineage Components
//!
//! Family-tree bookkeeping and reproduction counters. Lineage sets are kept
//! bidirectionally consistent by the world facade during breeding.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parent/child/ancestor/descendant relationships for an agent.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lineage {
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub ancestors: BTreeSet<String>,
    pub descendants: BTreeSet<String>,
}

impl Lineage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lineage for a newborn: both parents, plus the union of their
    /// ancestor closures.
    pub fn for_offspring(
        parent1: &str,
        parent2: &str,
        ancestors1: &BTreeSet<String>,
        ancestors2: &BTreeSet<String>,
    ) -> Self {
        let mut ancestors: BTreeSet<String> = ancestors1.union(ancestors2).cloned().collect();
        ancestors.insert(parent1.to_string());
        ancestors.insert(parent2.to_string());

        Self {
            parents: vec![parent1.to_string(), parent2.to_string()],
            children: Vec::new(),
            ancestors,
            descendants: BTreeSet::new(),
        }
    }

    pub fn add_child(&mut self, child_id: &str) {
        if !self.children.iter().any(|c| c == child_id) {
            self.children.push(child_id.to_string());
        }
        self.descendants.insert(child_id.to_string());
    }
}

/// Reproduction counters.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Reproduction {
    pub offspring_count: u32,
    pub can_reproduce: bool,
    /// Simulated seconds elapsed at the most recent reproduction
    pub last_reproduction: Option<f64>,
}

impl Default for Reproduction {
    fn default() -> Self {
        Self {
            offspring_count: 0,
            can_reproduce: true,
            last_reproduction: None,
        }
    }
}

impl Reproduction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_offspring(&mut self, now: f64) {
        self.offspring_count += 1;
        self.last_reproduction = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offspring_lineage_includes_ancestor_closure() {
        let mut grandparents = BTreeSet::new();
        grandparents.insert("gp-1".to_string());

        let lineage = Lineage::for_offspring("p1", "p2", &grandparents, &BTreeSet::new());

        assert_eq!(lineage.parents, vec!["p1", "p2"]);
        assert!(lineage.ancestors.contains("p1"));
        assert!(lineage.ancestors.contains("p2"));
        assert!(lineage.ancestors.contains("gp-1"));
    }

    #[test]
    fn test_add_child_is_idempotent() {
        let mut lineage = Lineage::new();
        lineage.add_child("kid");
        lineage.add_child("kid");

        assert_eq!(lineage.children.len(), 1);
        assert!(lineage.descendants.contains("kid"));
    }
}
