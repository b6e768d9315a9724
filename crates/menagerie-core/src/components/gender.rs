//! Gender Components
//!
//! Gender identity profile, pronoun sets, expression scalars, and the
//! support network. Wellbeing and expression readiness are derived from the
//! scalars, never stored.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Gender identities agents can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderIdentity {
    Male,
    Female,
    NonBinary,
    Genderfluid,
    Agender,
    Bigender,
    Demigender,
    Questioning,
    Other,
}

impl GenderIdentity {
    /// Every identity variant, used when fluidity picks a new one.
    pub fn all() -> &'static [GenderIdentity] {
        &[
            GenderIdentity::Male,
            GenderIdentity::Female,
            GenderIdentity::NonBinary,
            GenderIdentity::Genderfluid,
            GenderIdentity::Agender,
            GenderIdentity::Bigender,
            GenderIdentity::Demigender,
            GenderIdentity::Questioning,
            GenderIdentity::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenderIdentity::Male => "male",
            GenderIdentity::Female => "female",
            GenderIdentity::NonBinary => "nonbinary",
            GenderIdentity::Genderfluid => "genderfluid",
            GenderIdentity::Agender => "agender",
            GenderIdentity::Bigender => "bigender",
            GenderIdentity::Demigender => "demigender",
            GenderIdentity::Questioning => "questioning",
            GenderIdentity::Other => "other",
        }
    }
}

/// Outward expression style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionStyle {
    Masculine,
    Feminine,
    Androgynous,
    Neutral,
    Fluid,
}

impl ExpressionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionStyle::Masculine => "masculine",
            ExpressionStyle::Feminine => "feminine",
            ExpressionStyle::Androgynous => "androgynous",
            ExpressionStyle::Neutral => "neutral",
            ExpressionStyle::Fluid => "fluid",
        }
    }
}

/// A pronoun set (subject/object/possessive/reflexive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounSet {
    pub subject: String,
    pub object: String,
    pub possessive: String,
    pub reflexive: String,
}

impl PronounSet {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        possessive: impl Into<String>,
        reflexive: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            possessive: possessive.into(),
            reflexive: reflexive.into(),
        }
    }

    pub fn they() -> Self {
        Self::new("they", "them", "theirs", "themself")
    }

    pub fn she() -> Self {
        Self::new("she", "her", "hers", "herself")
    }

    pub fn he() -> Self {
        Self::new("he", "him", "his", "himself")
    }
}

/// An agent's gender identity profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderProfile {
    pub primary_identity: GenderIdentity,
    pub secondary_identities: Vec<GenderIdentity>,
    pub expression_style: ExpressionStyle,
    pub pronoun_sets: Vec<PronounSet>,
    pub preferred_pronouns: Option<PronounSet>,
    pub is_fluid: bool,
    /// 0.0 to 1.0; scales the per-tick identity-change probability
    pub fluidity_rate: f32,
    pub support_network: BTreeSet<String>,
    /// Which agents know about this identity
    pub coming_out: BTreeMap<String, bool>,
    /// Count of primary-identity changes over this agent's life
    pub identity_changes: u32,
}

impl GenderProfile {
    pub fn new(primary_identity: GenderIdentity) -> Self {
        Self {
            primary_identity,
            secondary_identities: Vec::new(),
            expression_style: ExpressionStyle::Neutral,
            pronoun_sets: vec![PronounSet::they()],
            preferred_pronouns: Some(PronounSet::they()),
            is_fluid: false,
            fluidity_rate: 0.0,
            support_network: BTreeSet::new(),
            coming_out: BTreeMap::new(),
            identity_changes: 0,
        }
    }

    pub fn with_fluidity(mut self, rate: f32) -> Self {
        self.is_fluid = true;
        self.fluidity_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn is_identity_fluid(&self) -> bool {
        self.is_fluid && self.fluidity_rate > 0.0
    }

    pub fn update_identity(&mut self, new_identity: GenderIdentity) {
        if new_identity != self.primary_identity {
            self.primary_identity = new_identity;
            self.identity_changes += 1;
        }
    }

    pub fn add_support_agent(&mut self, agent_id: &str) {
        self.support_network.insert(agent_id.to_string());
    }

    pub fn remove_support_agent(&mut self, agent_id: &str) {
        self.support_network.remove(agent_id);
    }

    pub fn set_coming_out(&mut self, agent_id: &str, knows: bool) {
        self.coming_out.insert(agent_id.to_string(), knows);
    }
}

impl Default for GenderProfile {
    fn default() -> Self {
        Self::new(GenderIdentity::NonBinary)
    }
}

/// Per-agent gender state: the profile plus the expression scalars the
/// gender system moves each tick. All scalars are 0.0 to 1.0.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct GenderState {
    pub profile: GenderProfile,
    pub gender_energy: f32,
    pub expression_confidence: f32,
    pub dysphoria: f32,
    pub euphoria: f32,
    pub social_comfort: f32,
    /// Explicit support needs named by the agent
    pub support_needs: Vec<String>,
}

impl GenderState {
    pub fn new(profile: GenderProfile) -> Self {
        Self {
            profile,
            gender_energy: 0.5,
            expression_confidence: 0.5,
            dysphoria: 0.0,
            euphoria: 0.5,
            social_comfort: 0.5,
            support_needs: Vec::new(),
        }
    }

    pub fn update_confidence(&mut self, delta: f32) {
        self.expression_confidence = (self.expression_confidence + delta).clamp(0.0, 1.0);
    }

    pub fn update_euphoria(&mut self, delta: f32) {
        self.euphoria = (self.euphoria + delta).clamp(0.0, 1.0);
    }

    pub fn update_dysphoria(&mut self, delta: f32) {
        self.dysphoria = (self.dysphoria + delta).clamp(0.0, 1.0);
    }

    pub fn update_comfort(&mut self, delta: f32) {
        self.social_comfort = (self.social_comfort + delta).clamp(0.0, 1.0);
    }

    /// Derived overall wellbeing.
    pub fn wellbeing(&self) -> f32 {
        let positive = (self.gender_energy
            + self.expression_confidence
            + self.social_comfort
            + self.euphoria)
            / 4.0;
        (positive - self.dysphoria).clamp(0.0, 1.0)
    }

    /// Derived readiness to express identity outwardly.
    pub fn expression_readiness(&self) -> f32 {
        (self.gender_energy + self.expression_confidence + self.social_comfort) / 3.0
    }

    /// Whether this agent currently needs support.
    pub fn needs_support(&self, dysphoria_threshold: f32, low_confidence: f32, low_comfort: f32) -> bool {
        self.dysphoria > dysphoria_threshold
            || self.expression_confidence < low_confidence
            || self.social_comfort < low_comfort
            || !self.support_needs.is_empty()
    }
}

impl Default for GenderState {
    fn default() -> Self {
        Self::new(GenderProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_update_counts_changes() {
        let mut profile = GenderProfile::default();
        profile.update_identity(GenderIdentity::Genderfluid);
        profile.update_identity(GenderIdentity::Genderfluid);
        profile.update_identity(GenderIdentity::Agender);

        assert_eq!(profile.primary_identity, GenderIdentity::Agender);
        assert_eq!(profile.identity_changes, 2);
    }

    #[test]
    fn test_wellbeing_is_bounded() {
        let mut state = GenderState::default();
        state.dysphoria = 1.0;
        assert!(state.wellbeing() >= 0.0);

        state.dysphoria = 0.0;
        state.gender_energy = 1.0;
        state.expression_confidence = 1.0;
        state.social_comfort = 1.0;
        state.euphoria = 1.0;
        assert!((state.wellbeing() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_confidence_clamps() {
        let mut state = GenderState::default();
        state.update_confidence(10.0);
        assert!((state.expression_confidence - 1.0).abs() < f32::EPSILON);
        state.update_confidence(-10.0);
        assert!(state.expression_confidence.abs() < f32::EPSILON);
    }

    #[test]
    fn test_needs_support_triggers() {
        let mut state = GenderState::default();
        assert!(!state.needs_support(0.5, 0.3, 0.3));

        state.dysphoria = 0.6;
        assert!(state.needs_support(0.5, 0.3, 0.3));

        state.dysphoria = 0.0;
        state.support_needs.push("listening".to_string());
        assert!(state.needs_support(0.5, 0.3, 0.3));
    }

    #[test]
    fn test_support_network_round_trip() {
        let mut profile = GenderProfile::default();
        profile.add_support_agent("ally");
        assert!(profile.support_network.contains("ally"));

        profile.remove_support_agent("ally");
        assert!(profile.support_network.is_empty());
    }

    #[test]
    fn test_fluidity_flag() {
        let profile = GenderProfile::new(GenderIdentity::Questioning).with_fluidity(0.4);
        assert!(profile.is_identity_fluid());

        let fixed = GenderProfile::new(GenderIdentity::Male);
        assert!(!fixed.is_identity_fluid());
    }
}
