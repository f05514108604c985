//! Positioning policies (seeding, avoidance) and automated-run options.

use crate::models::error::PositioningError;
use crate::models::stage::{ParticipantId, SeedingProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Policy document keyed by policy type. A missing key means "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policies {
    pub seeding: Option<SeedingPolicy>,
    pub avoidance: Option<AvoidancePolicy>,
}

impl Policies {
    /// Parse a JSON policy document, e.g. `{"seeding": {"positioning": "cluster"}}`.
    pub fn from_json(json: &str) -> Result<Self, PositioningError> {
        serde_json::from_str(json).map_err(|e| PositioningError::InvalidValues(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, PositioningError> {
        serde_json::from_value(value).map_err(|e| PositioningError::InvalidValues(e.to_string()))
    }

    /// Profile for a stage: the stage override, else the policy, else `Separate`.
    pub fn seeding_profile(&self, stage_override: Option<SeedingProfile>) -> SeedingProfile {
        stage_override
            .or_else(|| self.seeding.as_ref().map(|s| s.positioning))
            .unwrap_or_default()
    }
}

/// One row of the seeds-count table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeedsThreshold {
    pub draw_size: u32,
    pub min_participants: u32,
    pub seeds_count: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingPolicy {
    pub positioning: SeedingProfile,
    /// Apply thresholds of smaller draw sizes to larger draws as well.
    pub draw_size_progression: bool,
    pub seeds_count_thresholds: Vec<SeedsThreshold>,
}

impl SeedingPolicy {
    /// Maximum seeds allowed for a draw size and participant count; `None` when
    /// the policy has no applicable threshold.
    pub fn seeds_count(&self, draw_size: u32, participants: u32) -> Option<u32> {
        self.seeds_count_thresholds
            .iter()
            .filter(|t| {
                let size_matches = if self.draw_size_progression {
                    t.draw_size <= draw_size
                } else {
                    t.draw_size == draw_size
                };
                size_matches && participants >= t.min_participants
            })
            .map(|t| t.seeds_count)
            .max()
    }
}

/// Keeps participants that share a grouping key (nation, club, ...) apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidancePolicy {
    pub groupings: HashMap<ParticipantId, Vec<String>>,
    /// Weight of sharing a first-round pair; wider sections weigh proportionally less.
    pub pair_weight: u32,
}

impl Default for AvoidancePolicy {
    fn default() -> Self {
        Self {
            groupings: HashMap::new(),
            pair_weight: 16,
        }
    }
}

impl AvoidancePolicy {
    pub fn keys(&self, participant_id: ParticipantId) -> &[String] {
        self.groupings
            .get(&participant_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn conflicts(&self, a: ParticipantId, b: ParticipantId) -> bool {
        let b_keys = self.keys(b);
        self.keys(a).iter().any(|k| b_keys.contains(k))
    }
}

/// Options for one automated positioning run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatedOptions {
    /// Work on a copy of the bracket with notifications muted.
    pub provisional: bool,
    /// Seed for reproducible placement; entropy when absent.
    pub rng_seed: Option<u64>,
    pub qualifiers_count: u32,
    /// Round whose fed slots receive qualifiers; the stage's first round when absent.
    pub qualifier_round: Option<u32>,
    pub seeding_profile: Option<SeedingProfile>,
}
