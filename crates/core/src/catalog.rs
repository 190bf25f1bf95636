//! Immutable game content: missions, recruits and the talent tree template.
//!
//! The built-in catalog is embedded from `data/*.json` at compile time.
//! Components receive a [`Catalog`] at construction instead of reaching for
//! shared module-level lists.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::CoreError;
use crate::mission::Mission;
use crate::roster::GangMember;
use crate::talent::{Talent, TalentTree};

const BUILTIN_MISSIONS: &str = include_str!("../data/missions.json");
const BUILTIN_RECRUITS: &str = include_str!("../data/recruits.json");
const BUILTIN_TALENTS: &str = include_str!("../data/talents.json");

#[derive(Debug, Clone)]
pub struct Catalog {
    missions: Vec<Arc<Mission>>,
    recruits: Vec<GangMember>,
    talents: TalentTree,
}

impl Catalog {
    /// Validate and assemble a catalog.
    pub fn new(
        missions: Vec<Mission>,
        recruits: Vec<GangMember>,
        talents: Vec<Talent>,
    ) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(missions.len());
        for mission in &missions {
            mission.validate()?;
            if !seen.insert(mission.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate mission id '{}'",
                    mission.id
                )));
            }
        }

        let mut seen = HashSet::with_capacity(recruits.len());
        for recruit in &recruits {
            recruit.validate()?;
            if !seen.insert(recruit.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate recruit id '{}'",
                    recruit.id
                )));
            }
        }

        let talents = TalentTree::new(talents)?;

        Ok(Self {
            missions: missions.into_iter().map(Arc::new).collect(),
            recruits,
            talents,
        })
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json(BUILTIN_MISSIONS, BUILTIN_RECRUITS, BUILTIN_TALENTS)
    }

    pub fn from_json(missions: &str, recruits: &str, talents: &str) -> Result<Self, CoreError> {
        let parse_err =
            |what: &str, e: serde_json::Error| CoreError::Validation(format!("Invalid {what} data: {e}"));
        let missions = serde_json::from_str(missions).map_err(|e| parse_err("mission", e))?;
        let recruits = serde_json::from_str(recruits).map_err(|e| parse_err("recruit", e))?;
        let talents = serde_json::from_str(talents).map_err(|e| parse_err("talent", e))?;
        Self::new(missions, recruits, talents)
    }

    pub fn missions(&self) -> &[Arc<Mission>] {
        &self.missions
    }

    pub fn mission(&self, id: &str) -> Option<&Arc<Mission>> {
        self.missions.iter().find(|m| m.id == id)
    }

    /// Missions unlocked at `level`, in catalog order.
    pub fn available_missions(&self, level: u32) -> Vec<Arc<Mission>> {
        self.missions
            .iter()
            .filter(|m| m.unlock_level <= level)
            .cloned()
            .collect()
    }

    pub fn recruits(&self) -> &[GangMember] {
        &self.recruits
    }

    pub fn recruit(&self, id: &str) -> Option<&GangMember> {
        self.recruits.iter().find(|r| r.id == id)
    }

    /// A fresh, all-locked talent tree for a new player.
    pub fn talent_tree(&self) -> TalentTree {
        self.talents.clone()
    }
}
