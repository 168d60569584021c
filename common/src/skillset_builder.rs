use crate::{
    assets::{self, AssetExt},
    comp::skills::{Skill, SkillGroupKind, SkillSet},
};
use serde::Deserialize;
use tracing::warn;

/// Skillset assets are flat lists of nodes. `Tree` nodes pull in another
/// skillset asset, so presets can share common parts.
#[derive(Clone, Debug, Deserialize)]
pub enum SkillNode {
    Group(SkillGroupKind),
    Skill((Skill, Option<u16>)),
    Tree(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct SkillSetTree(Vec<SkillNode>);

impl assets::Asset for SkillSetTree {
    type Loader = assets::LoadFrom<Vec<SkillNode>, assets::RonLoader>;

    const EXTENSION: &'static str = "ron";
}

impl From<Vec<SkillNode>> for SkillSetTree {
    fn from(nodes: Vec<SkillNode>) -> Self { Self(nodes) }
}

impl SkillSetTree {
    pub fn nodes(&self) -> &[SkillNode] { &self.0 }
}

#[derive(Default)]
pub struct SkillSetBuilder(SkillSet);

impl SkillSetBuilder {
    /// Creates `SkillSetBuilder` from a skillset asset specifier.
    ///
    /// # Panics
    /// Panics if the asset does not exist.
    #[must_use]
    pub fn from_asset_expect(asset_specifier: &str) -> Self {
        let tree = SkillSetTree::load_expect_cloned(asset_specifier);
        Self::default().with_tree(&tree)
    }

    #[must_use]
    pub fn with_tree(mut self, tree: &SkillSetTree) -> Self {
        for node in tree.nodes() {
            self = match node {
                SkillNode::Group(group) => self.with_skill_group(*group),
                SkillNode::Skill((skill, level)) => self.with_skill(*skill, *level),
                SkillNode::Tree(asset) => {
                    let tree = SkillSetTree::load_expect_cloned(asset);
                    self.with_tree(&tree)
                },
            };
        }
        self
    }

    #[must_use]
    pub fn with_skill_group(mut self, group: SkillGroupKind) -> Self {
        self.0.unlock_skill_group(group);
        self
    }

    /// # Panics
    /// Will panic only in tests, if the skill's group was not unlocked first
    /// or the level exceeds the skill's cap. Outside tests it logs and skips
    /// the skill.
    #[must_use]
    pub fn with_skill(mut self, skill: Skill, level: Option<u16>) -> Self {
        if let Err(err) = self.0.unlock_skill(skill, level) {
            let err = format!("Failed to add skill: {skill:?} with level {level:?}: {err:?}");
            if cfg!(test) {
                panic!("{}", err);
            } else {
                warn!("{}", err);
            }
        }
        self
    }

    #[must_use]
    pub fn build(self) -> SkillSet { self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comp::{item::tool::ToolKind, skills::SwordSkill};

    #[test]
    fn test_all_skillset_assets() {
        let skillsets =
            assets::Directory::load("common.skillset").expect("failed to get skillset directory");
        for skillset in skillsets.read().iter() {
            // with_skill panics under cfg(test) on any invalid node
            std::mem::drop(SkillSetBuilder::from_asset_expect(skillset));
        }
    }

    #[test]
    fn with_skill_requires_group() {
        let skillset = SkillSetBuilder::default()
            .with_skill_group(SkillGroupKind::Weapon(ToolKind::Sword))
            .with_skill(Skill::Sword(SwordSkill::Dash), None)
            .build();
        assert!(skillset.has_skill(Skill::Sword(SwordSkill::Dash)));
    }
}
