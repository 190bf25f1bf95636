//! Talent tree: one-way unlockable nodes in a prerequisite DAG.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TalentCategory {
    Business,
    Combat,
    Leadership,
}

impl TalentCategory {
    pub const ALL: [TalentCategory; 3] = [Self::Business, Self::Combat, Self::Leadership];

    pub fn label(self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Combat => "Combat",
            Self::Leadership => "Leadership",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: u32,
    #[serde(default)]
    pub unlocked: bool,
    pub category: TalentCategory,
    #[serde(default)]
    pub requires: Vec<String>,
}

/// A validated set of talents.
///
/// Construction rejects duplicate ids, unknown prerequisite ids and cycles,
/// so every operation afterwards can assume a well-formed DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentTree {
    talents: Vec<Talent>,
    index: HashMap<String, usize>,
}

impl TalentTree {
    pub fn new(talents: Vec<Talent>) -> Result<Self, CoreError> {
        let mut index = HashMap::with_capacity(talents.len());
        for (i, talent) in talents.iter().enumerate() {
            if index.insert(talent.id.clone(), i).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate talent id '{}'",
                    talent.id
                )));
            }
        }

        for talent in &talents {
            if let Some(unknown) = talent.requires.iter().find(|r| !index.contains_key(*r)) {
                return Err(CoreError::Validation(format!(
                    "Talent '{}' requires unknown talent '{unknown}'",
                    talent.id
                )));
            }
        }

        let tree = Self { talents, index };
        tree.check_acyclic()?;
        Ok(tree)
    }

    pub fn talents(&self) -> &[Talent] {
        &self.talents
    }

    pub fn get(&self, id: &str) -> Option<&Talent> {
        self.index.get(id).map(|&i| &self.talents[i])
    }

    pub fn by_category(&self, category: TalentCategory) -> impl Iterator<Item = &Talent> {
        self.talents.iter().filter(move |t| t.category == category)
    }

    /// Prerequisites of `id` that are still locked.
    pub fn missing_prerequisites(&self, id: &str) -> Result<Vec<String>, CoreError> {
        let talent = self.require(id)?;
        Ok(talent
            .requires
            .iter()
            .filter(|r| !self.get(r).is_some_and(|t| t.unlocked))
            .cloned()
            .collect())
    }

    /// Locked, with every prerequisite unlocked.
    pub fn is_available(&self, id: &str) -> bool {
        match self.get(id) {
            Some(t) if !t.unlocked => self
                .missing_prerequisites(id)
                .is_ok_and(|missing| missing.is_empty()),
            _ => false,
        }
    }

    /// Spend `points` to unlock `id`.
    ///
    /// On error neither the tree nor `points` is touched.
    pub fn unlock(&mut self, id: &str, points: &mut u32) -> Result<&Talent, CoreError> {
        let talent = self.require(id)?;
        if talent.unlocked {
            return Err(CoreError::Validation(format!(
                "Talent '{id}' is already unlocked"
            )));
        }
        if *points < talent.cost {
            return Err(CoreError::InsufficientPoints {
                required: talent.cost,
                available: *points,
            });
        }
        let cost = talent.cost;

        let missing = self.missing_prerequisites(id)?;
        if !missing.is_empty() {
            return Err(CoreError::UnmetPrerequisite {
                talent: id.to_string(),
                missing,
            });
        }

        *points -= cost;
        let i = self.index[id];
        self.talents[i].unlocked = true;
        Ok(&self.talents[i])
    }

    fn require(&self, id: &str) -> Result<&Talent, CoreError> {
        self.get(id).ok_or_else(|| CoreError::NotFound {
            entity: "talent",
            id: id.to_string(),
        })
    }

    /// Depth-first search over `requires` edges, failing on a back edge.
    fn check_acyclic(&self) -> Result<(), CoreError> {
        let mut done: HashSet<usize> = HashSet::with_capacity(self.talents.len());
        let mut on_path: HashSet<usize> = HashSet::new();

        for start in 0..self.talents.len() {
            if done.contains(&start) {
                continue;
            }
            // (node, next prerequisite to visit)
            let mut stack = vec![(start, 0usize)];
            on_path.insert(start);

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let requires = &self.talents[node].requires;
                if next < requires.len() {
                    frame.1 += 1;
                    let child = self.index[&requires[next]];
                    if on_path.contains(&child) {
                        return Err(CoreError::Validation(format!(
                            "Talent prerequisites form a cycle through '{}'",
                            self.talents[child].id
                        )));
                    }
                    if !done.contains(&child) {
                        on_path.insert(child);
                        stack.push((child, 0));
                    }
                } else {
                    on_path.remove(&node);
                    done.insert(node);
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn talent(id: &str, cost: u32, requires: &[&str]) -> Talent {
        Talent {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            cost,
            unlocked: false,
            category: TalentCategory::Business,
            requires: requires.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn tree() -> TalentTree {
        TalentTree::new(vec![
            talent("street_smarts", 1, &[]),
            talent("dealer_network", 2, &["street_smarts"]),
        ])
        .unwrap()
    }

    #[test]
    fn unlock_root_talent_spends_points() {
        let mut tree = tree();
        let mut points = 3;
        tree.unlock("street_smarts", &mut points).unwrap();
        assert_eq!(points, 2);
        assert!(tree.get("street_smarts").unwrap().unlocked);
    }

    #[test]
    fn unmet_prerequisite_keeps_points() {
        let mut tree = tree();
        let mut points = 5;
        let err = tree.unlock("dealer_network", &mut points).unwrap_err();
        assert_matches!(
            err,
            CoreError::UnmetPrerequisite { ref missing, .. } if missing.len() == 1 && missing[0] == "street_smarts"
        );
        assert_eq!(points, 5);
        assert!(!tree.get("dealer_network").unwrap().unlocked);
    }

    #[test]
    fn insufficient_points_is_checked_first() {
        let mut tree = tree();
        let mut points = 1;
        let err = tree.unlock("dealer_network", &mut points).unwrap_err();
        assert_matches!(err, CoreError::InsufficientPoints { required: 2, available: 1 });
    }

    #[test]
    fn unlock_is_one_way() {
        let mut tree = tree();
        let mut points = 3;
        tree.unlock("street_smarts", &mut points).unwrap();
        assert!(tree.unlock("street_smarts", &mut points).is_err());
        assert_eq!(points, 2);
    }

    #[test]
    fn availability_follows_prerequisites() {
        let mut tree = tree();
        let mut points = 3;
        assert!(tree.is_available("street_smarts"));
        assert!(!tree.is_available("dealer_network"));
        tree.unlock("street_smarts", &mut points).unwrap();
        assert!(!tree.is_available("street_smarts"));
        assert!(tree.is_available("dealer_network"));
    }

    #[test]
    fn cycle_is_rejected() {
        let result = TalentTree::new(vec![
            talent("a", 1, &["c"]),
            talent("b", 1, &["a"]),
            talent("c", 1, &["b"]),
        ]);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn self_reference_is_rejected() {
        assert!(TalentTree::new(vec![talent("a", 1, &["a"])]).is_err());
    }

    #[test]
    fn diamond_is_accepted() {
        let result = TalentTree::new(vec![
            talent("root", 1, &[]),
            talent("left", 1, &["root"]),
            talent("right", 1, &["root"]),
            talent("top", 1, &["left", "right"]),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_prerequisite_is_rejected() {
        assert!(TalentTree::new(vec![talent("a", 1, &["ghost"])]).is_err());
    }

    #[test]
    fn unknown_talent_is_not_found() {
        let mut tree = tree();
        let mut points = 3;
        assert_matches!(
            tree.unlock("ghost", &mut points),
            Err(CoreError::NotFound { entity: "talent", .. })
        );
    }
}
