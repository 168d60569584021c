use crate::comp::item::tool::ToolKind;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Skills are grouped by the weapon they improve, plus a general group for
/// character-wide unlocks. A group must be learned before skills in it can
/// be unlocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillGroupKind {
    General,
    Weapon(ToolKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneralSkill {
    HealthIncrease,
    EnergyIncrease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwordSkill {
    TripleStrike,
    Dash,
    Spin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxeSkill {
    DoubleStrike,
    Leap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BowSkill {
    ProjectileSpeed,
    Repeater,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffSkill {
    Fireball,
    FlameBlast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    General(GeneralSkill),
    Sword(SwordSkill),
    Axe(AxeSkill),
    Bow(BowSkill),
    Staff(StaffSkill),
}

impl Skill {
    pub fn skill_group_kind(&self) -> SkillGroupKind {
        match self {
            Skill::General(_) => SkillGroupKind::General,
            Skill::Sword(_) => SkillGroupKind::Weapon(ToolKind::Sword),
            Skill::Axe(_) => SkillGroupKind::Weapon(ToolKind::Axe),
            Skill::Bow(_) => SkillGroupKind::Weapon(ToolKind::Bow),
            Skill::Staff(_) => SkillGroupKind::Weapon(ToolKind::Staff),
        }
    }

    /// The maximum level this skill can be raised to. `None` means the skill
    /// is a single unlock with no levels.
    pub fn max_level(&self) -> Option<u16> {
        match self {
            Skill::General(GeneralSkill::HealthIncrease) => Some(10),
            Skill::General(GeneralSkill::EnergyIncrease) => Some(5),
            Skill::Sword(SwordSkill::TripleStrike) => Some(3),
            Skill::Bow(BowSkill::ProjectileSpeed) => Some(5),
            Skill::Staff(StaffSkill::Fireball) => Some(3),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SkillUnlockError {
    GroupNotUnlocked,
    ExceedsMaxLevel,
}

/// The set of skill groups and skills an entity has unlocked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SkillSet {
    skill_groups: HashSet<SkillGroupKind>,
    skills: HashMap<Skill, Option<u16>>,
}

impl SkillSet {
    pub fn unlock_skill_group(&mut self, group: SkillGroupKind) {
        if !self.skill_groups.insert(group) {
            warn!(?group, "skill group already unlocked");
        }
    }

    pub fn has_skill_group(&self, group: SkillGroupKind) -> bool {
        self.skill_groups.contains(&group)
    }

    /// Unlocks a skill at `level`, or raises it to that level. The skill's
    /// group must be unlocked first.
    pub fn unlock_skill(
        &mut self,
        skill: Skill,
        level: Option<u16>,
    ) -> Result<(), SkillUnlockError> {
        if !self.has_skill_group(skill.skill_group_kind()) {
            return Err(SkillUnlockError::GroupNotUnlocked);
        }
        match (level, skill.max_level()) {
            (Some(level), Some(max)) if level > max => Err(SkillUnlockError::ExceedsMaxLevel),
            (Some(_), None) => Err(SkillUnlockError::ExceedsMaxLevel),
            _ => {
                self.skills.insert(skill, level);
                Ok(())
            },
        }
    }

    pub fn has_skill(&self, skill: Skill) -> bool { self.skills.contains_key(&skill) }

    pub fn skill_level(&self, skill: Skill) -> Option<u16> {
        self.skills.get(&skill).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_requires_group() {
        let mut skillset = SkillSet::default();
        let skill = Skill::Sword(SwordSkill::Dash);

        assert!(matches!(
            skillset.unlock_skill(skill, None),
            Err(SkillUnlockError::GroupNotUnlocked)
        ));

        skillset.unlock_skill_group(SkillGroupKind::Weapon(ToolKind::Sword));
        assert!(skillset.unlock_skill(skill, None).is_ok());
        assert!(skillset.has_skill(skill));
    }

    #[test]
    fn level_cap_is_enforced() {
        let mut skillset = SkillSet::default();
        skillset.unlock_skill_group(SkillGroupKind::General);

        let skill = Skill::General(GeneralSkill::EnergyIncrease);
        assert!(skillset.unlock_skill(skill, Some(5)).is_ok());
        assert_eq!(skillset.skill_level(skill), Some(5));
        assert!(matches!(
            skillset.unlock_skill(skill, Some(6)),
            Err(SkillUnlockError::ExceedsMaxLevel)
        ));
    }
}
