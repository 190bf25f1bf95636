//! Gang members and the player's owned roster.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Available,
    Mission,
    Injured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GangMember {
    pub id: String,
    pub name: String,
    /// `0..=100`
    pub loyalty: u8,
    /// `0..=100`
    pub skill: u8,
    pub speciality: String,
    #[serde(default)]
    pub status: MemberStatus,
    pub cost: u64,
    pub background: String,
}

impl GangMember {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Validation("Member id must not be empty".into()));
        }
        if self.loyalty > 100 || self.skill > 100 {
            return Err(CoreError::Validation(format!(
                "Member '{}' loyalty and skill must be within 0-100",
                self.id
            )));
        }
        Ok(())
    }
}

/// Members a player has recruited, in recruitment order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<GangMember>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: Vec<GangMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[GangMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.id == member_id)
    }

    /// Recruits from `catalog` that are not already owned.
    pub fn offers<'a>(&self, catalog: &'a [GangMember]) -> Vec<&'a GangMember> {
        catalog.iter().filter(|r| !self.contains(&r.id)).collect()
    }

    /// Pay for `member` out of `money` and add them to the roster.
    ///
    /// On error neither the roster nor `money` is touched.
    pub fn recruit(&mut self, member: &GangMember, money: &mut u64) -> Result<(), CoreError> {
        if self.contains(&member.id) {
            return Err(CoreError::Validation(format!(
                "'{}' is already part of the crew",
                member.name
            )));
        }
        if *money < member.cost {
            return Err(CoreError::InsufficientFunds {
                required: member.cost,
                available: *money,
            });
        }
        *money -= member.cost;
        self.members.push(member.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn member(id: &str, cost: u64) -> GangMember {
        GangMember {
            id: id.into(),
            name: id.into(),
            loyalty: 70,
            skill: 65,
            speciality: "Street Dealer".into(),
            status: MemberStatus::Available,
            cost,
            background: String::new(),
        }
    }

    #[test]
    fn recruit_deducts_money_and_adds_member() {
        let mut roster = Roster::new();
        let mut money = 3000;
        roster.recruit(&member("min-ho", 1000), &mut money).unwrap();
        assert_eq!(money, 2000);
        assert!(roster.contains("min-ho"));
    }

    #[test]
    fn recruit_without_funds_leaves_state_unchanged() {
        let mut roster = Roster::new();
        let mut money = 500;
        let err = roster.recruit(&member("tae-hwan", 2000), &mut money).unwrap_err();
        assert_matches!(
            err,
            CoreError::InsufficientFunds {
                required: 2000,
                available: 500
            }
        );
        assert_eq!(money, 500);
        assert!(roster.is_empty());
    }

    #[test]
    fn owned_members_are_filtered_from_offers() {
        let catalog = vec![member("min-ho", 1000), member("ji-woo", 1500)];
        let mut roster = Roster::new();
        let mut money = 3000;
        roster.recruit(&catalog[0], &mut money).unwrap();

        let offers = roster.offers(&catalog);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].id, "ji-woo");
    }

    #[test]
    fn recruiting_twice_is_rejected_without_charge() {
        let mut roster = Roster::new();
        let mut money = 3000;
        let m = member("min-ho", 1000);
        roster.recruit(&m, &mut money).unwrap();
        assert!(roster.recruit(&m, &mut money).is_err());
        assert_eq!(money, 2000);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn roster_serializes_as_plain_list() {
        let roster = Roster::from_members(vec![member("min-ho", 1000)]);
        let json = serde_json::to_value(&roster).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["status"], "available");
    }
}
