use crate::{
    assets::{AssetExt, AssetHandle},
    comp::{body, AllBodies, Body},
};
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NpcKind {
    Humanoid,
    Wolf,
    Duck,
}

pub const ALL_NPCS: [NpcKind; 3] = [NpcKind::Humanoid, NpcKind::Wolf, NpcKind::Duck];

/// Body-specific NPC name metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct BodyNames {
    /// The keyword used to refer to this body type (e.g. via the command
    /// console). Should be unique per body type.
    pub keyword: String,
    /// A list of canonical names for NPCs with this body type.
    pub names: Vec<String>,
}

/// Species-specific NPC name metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct SpeciesNames {
    /// The keyword used to refer to this species. Should be unique per
    /// species and distinct from all body type keywords.
    pub keyword: String,
    /// The generic name for NPCs of this species.
    pub generic: String,
}

/// Type holding configuration data for NPC names.
pub type NpcNames = AllBodies<BodyNames, SpeciesNames>;

lazy_static! {
    pub static ref NPC_NAMES: AssetHandle<NpcNames> = NpcNames::load_expect("common.npc_names");
}

impl FromStr for NpcKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let npc_names = &*NPC_NAMES.read();
        ALL_NPCS
            .iter()
            .copied()
            .find(|&npc| npc_names[npc].keyword == s)
            .ok_or(())
    }
}

pub fn get_npc_name(npc_type: NpcKind) -> String {
    let npc_names = NPC_NAMES.read();
    let BodyNames { keyword, names } = &npc_names[npc_type];

    // If no pretty name is found, fall back to the keyword.
    names
        .choose(&mut rand::thread_rng())
        .unwrap_or(keyword)
        .clone()
}

/// Randomly generates a body associated with this NPC kind.
pub fn kind_to_body(kind: NpcKind) -> Body {
    match kind {
        NpcKind::Humanoid => body::humanoid::Body::random().into(),
        NpcKind::Wolf => body::quadruped_medium::Body::random().into(),
        NpcKind::Duck => body::bird_medium::Body::random().into(),
    }
}

/// A combination of an NpcKind and a function that generates a fresh Body of
/// a species within that kind each time it's called. When parsing body tags
/// this lets unspecified attributes stay random: a bare body type randomizes
/// the species, an explicit species still randomizes the rest.
pub struct NpcBody(pub NpcKind, pub Box<dyn FnMut() -> Body>);

impl FromStr for NpcBody {
    type Err = ();

    /// Get an NPC kind from a string. If a body kind is matched without an
    /// associated species, generate the species randomly within it; if an
    /// explicit species is found, generate a random member of the species;
    /// otherwise, return Err(()).
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_str_with(s, kind_to_body) }
}

impl NpcBody {
    /// If there is an exact name match for a body kind, call kind_to_body on
    /// it. Otherwise, if an explicit species is found, generate a random
    /// member of the species; otherwise, return Err(()).
    #[allow(clippy::result_unit_err)]
    pub fn from_str_with(s: &str, kind_to_body: fn(NpcKind) -> Body) -> Result<Self, ()> {
        fn parse<
            'a,
            B: Into<Body> + 'static,
            Species: 'static,
            BodyMeta,
            SpeciesData: for<'b> core::ops::Index<&'b Species, Output = SpeciesNames>,
        >(
            s: &str,
            npc_kind: NpcKind,
            body_data: &'a crate::comp::BodyData<BodyMeta, SpeciesData>,
            conv_func: for<'d> fn(&mut rand::rngs::ThreadRng, &'d Species) -> B,
        ) -> Option<NpcBody>
        where
            &'a SpeciesData: IntoIterator<Item = Species>,
        {
            let npc_names = &body_data.species;
            body_data
                .species
                .into_iter()
                .find(|species| npc_names[species].keyword == s)
                .map(|species| {
                    NpcBody(
                        npc_kind,
                        Box::new(move || conv_func(&mut rand::thread_rng(), &species).into()),
                    )
                })
        }
        let npc_names = &*NPC_NAMES.read();
        // First, parse npc kind names.
        NpcKind::from_str(s)
            .map(|kind| NpcBody(kind, Box::new(move || kind_to_body(kind))))
            .ok()
            // Otherwise, npc kind names aren't sufficient; we parse species names instead.
            .or_else(|| {
                parse(
                    s,
                    NpcKind::Humanoid,
                    &npc_names.humanoid,
                    body::humanoid::Body::random_with,
                )
            })
            .or_else(|| {
                parse(
                    s,
                    NpcKind::Wolf,
                    &npc_names.quadruped_medium,
                    body::quadruped_medium::Body::random_with,
                )
            })
            .or_else(|| {
                parse(
                    s,
                    NpcKind::Duck,
                    &npc_names.bird_medium,
                    body::bird_medium::Body::random_with,
                )
            })
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The name table must cover every body and species keyword.
    #[test]
    fn test_npc_names_cover_all_bodies() {
        let npc_names = &*NPC_NAMES.read();
        for npc in ALL_NPCS {
            assert!(!npc_names[npc].keyword.is_empty());
            assert!(!npc_names[npc].names.is_empty());
        }
        for species in &npc_names.humanoid.species {
            assert!(!npc_names.humanoid.species[&species].keyword.is_empty());
        }
    }

    #[test]
    fn parse_body_tags() {
        // Body type keyword gives a random species within the kind
        let NpcBody(kind, mut gen) = NpcBody::from_str("humanoid").expect("unknown keyword");
        assert!(kind == NpcKind::Humanoid);
        assert!(gen().is_humanoid());

        // Species keyword pins the species
        let NpcBody(kind, mut gen) = NpcBody::from_str("wolf").expect("unknown keyword");
        assert!(kind == NpcKind::Wolf);
        match gen() {
            Body::QuadrupedMedium(body) => {
                assert_eq!(body.species, body::quadruped_medium::Species::Wolf)
            },
            body => panic!("expected a quadruped, got {body:?}"),
        }

        assert!(NpcBody::from_str("direwolf20").is_err());
    }
}
