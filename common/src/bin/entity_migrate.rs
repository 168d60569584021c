//! Converts entity config files from the old flat-hands format to the
//! current inventory format.
//!
//! The schemas are mirrored here with Serialize so old files can be read and
//! rewritten without touching the live types.

use emberveil_common::{
    comp::{Alignment, Body},
    lottery::LootSpec,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum NameKind {
    Name(String),
    Automatic,
    Uninit,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum BodyBuilder {
    RandomWith(String),
    Exact(Body),
    Uninit,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum AlignmentMark {
    Alignment(Alignment),
    Uninit,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ItemSpec {
    Item(String),
    Choice(Vec<(u32, Option<ItemSpec>)>),
}

/// First "stable" version: loadout asset lived in meta[], wielded items were
/// a flat `hands` field.
mod v1 {
    pub(super) use super::*;

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub enum Hands {
        TwoHanded(ItemSpec),
        Paired(ItemSpec),
        Mix {
            mainhand: ItemSpec,
            offhand: ItemSpec,
        },
        Uninit,
    }

    impl Default for Hands {
        fn default() -> Self { Self::Uninit }
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub enum Meta {
        LoadoutAsset(String),
        SkillSetAsset(String),
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub struct EntityConfig {
        pub name: NameKind,
        pub body: BodyBuilder,
        pub alignment: AlignmentMark,
        pub loot: LootSpec<String>,
        #[serde(default)]
        pub hands: Hands,
        #[serde(default)]
        pub meta: Vec<Meta>,
    }
}

/// Inventory update.
/// 1) Loadout asset moved out of meta[] into the inventory pack.
/// 2) Hands became part of the loadout spec, with weighted choices.
mod v2 {
    pub(super) use super::*;

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub enum Hands {
        InHands((Option<ItemSpec>, Option<ItemSpec>)),
        Choice(Vec<(u32, Hands)>),
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub enum Base {
        Asset(String),
        Combine(Vec<Base>),
        Choice(Vec<(u32, Base)>),
    }

    #[derive(Debug, Serialize, Deserialize, Clone, Default)]
    pub struct LoadoutSpec {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub inherit: Option<Base>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub active_hands: Option<Hands>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub enum LoadoutKind {
        FromBody,
        Asset(String),
        Inline(Box<LoadoutSpec>),
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub struct InventorySpec {
        pub loadout: LoadoutKind,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub items: Vec<(u32, String)>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub enum Meta {
        SkillSetAsset(String),
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub struct EntityConfig {
        pub name: NameKind,
        pub body: BodyBuilder,
        pub alignment: AlignmentMark,
        pub loot: LootSpec<String>,
        pub inventory: InventorySpec,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub meta: Vec<Meta>,
    }

    fn hands(old: v1::Hands) -> Option<Hands> {
        match old {
            v1::Hands::TwoHanded(spec) => Some(Hands::InHands((Some(spec), None))),
            v1::Hands::Paired(spec) => Some(Hands::InHands((Some(spec.clone()), Some(spec)))),
            v1::Hands::Mix { mainhand, offhand } => {
                Some(Hands::InHands((Some(mainhand), Some(offhand))))
            },
            v1::Hands::Uninit => None,
        }
    }

    impl From<v1::EntityConfig> for EntityConfig {
        fn from(old_config: v1::EntityConfig) -> Self {
            let mut loadout_asset = None;
            let mut meta = Vec::new();

            for item in old_config.meta {
                match item {
                    v1::Meta::SkillSetAsset(asset) => {
                        meta.push(Meta::SkillSetAsset(asset));
                    },
                    v1::Meta::LoadoutAsset(asset) => {
                        if loadout_asset.is_none() {
                            loadout_asset = Some(asset);
                        } else {
                            tracing::error!("multiple loadout assets in meta[], bad");
                        }
                    },
                }
            }

            let active_hands = hands(old_config.hands);
            let loadout = match (loadout_asset, active_hands) {
                (Some(asset), None) => LoadoutKind::Asset(asset),
                (Some(asset), active_hands @ Some(_)) => {
                    LoadoutKind::Inline(Box::new(LoadoutSpec {
                        inherit: Some(Base::Asset(asset)),
                        active_hands,
                    }))
                },
                (None, active_hands @ Some(_)) => LoadoutKind::Inline(Box::new(LoadoutSpec {
                    inherit: None,
                    active_hands,
                })),
                (None, None) => LoadoutKind::FromBody,
            };

            Self {
                name: old_config.name,
                body: old_config.body,
                alignment: old_config.alignment,
                loot: old_config.loot,
                inventory: InventorySpec {
                    loadout,
                    items: Vec::new(),
                },
                meta,
            }
        }
    }
}

fn input_string(prompt: &str) -> String { input_validated_string(prompt, &|_| true) }

fn input_validated_string(prompt: &str, check: &dyn Fn(&str) -> bool) -> String {
    println!("{}", prompt);

    print!("> ");
    io::stdout().flush().unwrap();

    let mut buff = String::new();
    io::stdin().read_line(&mut buff).unwrap();

    while !check(buff.trim()) {
        buff.clear();
        print!("> ");
        io::stdout().flush().unwrap();
        io::stdin().read_line(&mut buff).unwrap();
    }

    buff.trim().to_owned()
}

#[derive(Debug)]
enum Walk {
    File(PathBuf),
    Dir { path: PathBuf, content: Vec<Walk> },
}

fn walk_tree(dir: &Path, root: &Path) -> io::Result<Vec<Walk>> {
    let mut buff = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            buff.push(Walk::Dir {
                path: path
                    .strip_prefix(root)
                    .expect("strip can't fail, this path is created from root")
                    .to_owned(),
                content: walk_tree(&path, root)?,
            });
        } else {
            let filename = path
                .strip_prefix(root)
                .expect("strip can't fail, this file is created from root")
                .to_owned();
            buff.push(Walk::File(filename));
        }
    }

    Ok(buff)
}

fn walk_with_migrate<OldV, NewV>(tree: Walk, from: &Path, to: &Path) -> io::Result<()>
where
    NewV: From<OldV>,
    OldV: DeserializeOwned,
    NewV: Serialize,
{
    match tree {
        Walk::Dir { path, content } => {
            let target_dir = to.join(path);
            fs::create_dir_all(target_dir)?;
            for entry in content {
                walk_with_migrate::<OldV, NewV>(entry, from, to)?;
            }
        },
        Walk::File(path) => {
            let source = fs::File::open(from.join(&path))?;
            let old: OldV = ron::de::from_reader(source).unwrap();
            let new: NewV = old.into();
            let target = fs::File::create(to.join(&path))?;
            let pretty_config = ron::ser::PrettyConfig::new();
            ron::ser::to_writer_pretty(target, &new, pretty_config).unwrap();
            println!("{path:?} done");
        },
    }
    Ok(())
}

fn convert_loop(from: &str, to: &str, old_ver: &str, new_ver: &str) {
    #[rustfmt::skip]
    println!(
        "\nRequest info:\n\
        {old_ver} -> {new_ver}.\n\
        Get data from {from} and store in {to}."
    );

    let root = Path::new(from);
    let files = Walk::Dir {
        path: Path::new("").to_owned(),
        content: walk_tree(root, root).unwrap(),
    };
    if old_ver == "v1" && new_ver == "v2" {
        walk_with_migrate::<v1::EntityConfig, v2::EntityConfig>(
            files,
            Path::new(from),
            Path::new(to),
        )
        .unwrap();
    } else {
        eprintln!("Unexpected versions")
    }
}

fn main() {
    println!(
        r#"
Hello, this tool can convert all your entity configs to newer version.
Currently it supports converting from "v1" to "v2".
    "#
    );

    let old_dir = input_validated_string(
        "Please input directory path with old entity configs:",
        &|path| {
            if !Path::new(path).exists() {
                eprintln!("Source directory '{path}' does not exists.");
                false
            } else {
                true
            }
        },
    );
    let new_dir = input_string("Please input directory path to place new entity configs:");

    let old_version =
        input_validated_string("Please input old version to migrate from:", &|version| {
            let olds = ["v1"];
            if !olds.contains(&version) {
                eprintln!("Unexpected version {version}. Available: {olds:?}");
                false
            } else {
                true
            }
        });
    let new_version = input_validated_string("Please input new version:", &|version| {
        let news = ["v2"];
        if !news.contains(&version) {
            eprintln!("Unexpected version {version}. Available: {news:?}");
            false
        } else {
            true
        }
    });

    convert_loop(&old_dir, &new_dir, &old_version, &new_version)
}
