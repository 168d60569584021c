//! Checks every entity config shipped in the assets directory and reports
//! broken references, bad weights and inheritance loops. Intended for CI and
//! for content authors, see the cargo aliases in .cargo/config.toml.

use emberveil_common::{
    assets::AssetExt,
    comp::{inventory::loadout_builder::LoadoutSpec, Item},
    generation::{self, BodyBuilder, EntityConfig, LoadoutKind, Meta},
    lottery::{LootSpec, Lottery},
    npc::NpcBody,
    skillset_builder::SkillSetTree,
};
use std::process::ExitCode;

fn check_body(body: &BodyBuilder, errors: &mut Vec<String>) {
    if let BodyBuilder::RandomWith(tag) = body {
        if tag.parse::<NpcBody>().is_err() {
            errors.push(format!("unknown body tag {tag:?}"));
        }
    }
}

fn check_item(specifier: &str, amount: u32, errors: &mut Vec<String>) {
    match Item::new_from_asset(specifier) {
        Ok(mut item) => {
            if let Err(e) = item.set_amount(amount) {
                errors.push(format!("bad amount {amount} for {specifier}: {e:?}"));
            }
        },
        Err(e) => errors.push(format!("can't load item {specifier}: {e:?}")),
    }
}

fn check_loot(loot: &LootSpec<String>, visited: &mut Vec<String>, errors: &mut Vec<String>) {
    match loot {
        LootSpec::Item(item) => check_item(item, 1, errors),
        LootSpec::ItemQuantity(item, lower, upper) => {
            if upper < lower {
                errors.push(format!("inverted quantity range for {item}"));
            }
            check_item(item, *lower.max(upper), errors);
        },
        LootSpec::LootTable(table) => {
            if visited.contains(table) {
                errors.push(format!("loot table cycle through {table}"));
                return;
            }
            match Lottery::<LootSpec<String>>::load(table) {
                Ok(handle) => {
                    let lottery = handle.read();
                    if !lottery.weights_are_valid() {
                        errors.push(format!("empty table or zero weight in {table}"));
                    }
                    visited.push(table.clone());
                    for (_, entry) in lottery.iter() {
                        check_loot(entry, visited, errors);
                    }
                    visited.pop();
                },
                Err(e) => errors.push(format!("can't load loot table {table}: {e:?}")),
            }
        },
        LootSpec::Nothing => {},
    }
}

fn check_config(config_asset: &str) -> Vec<String> {
    let mut errors = Vec::new();

    let config = match EntityConfig::load_cloned(config_asset) {
        Ok(config) => config,
        Err(e) => {
            return vec![format!("can't load config: {e:?}")];
        },
    };

    check_body(&config.body, &mut errors);

    match &config.inventory.loadout {
        LoadoutKind::FromBody => {
            if config.body == BodyBuilder::Uninit {
                errors.push("FromBody loadout with Uninit body".to_owned());
            }
        },
        LoadoutKind::Asset(asset) => match LoadoutSpec::load_cloned(asset) {
            Ok(loadout) => {
                if let Err(e) = loadout.validate(vec![asset.clone()]) {
                    errors.push(format!("broken loadout {asset}: {e:?}"));
                }
            },
            Err(e) => errors.push(format!("can't load loadout {asset}: {e:?}")),
        },
        LoadoutKind::Inline(spec) => {
            if let Err(e) = spec.validate(Vec::new()) {
                errors.push(format!("broken inline loadout: {e:?}"));
            }
        },
    }

    for (amount, item) in &config.inventory.items {
        check_item(item, *amount, &mut errors);
    }

    check_loot(&config.loot, &mut Vec::new(), &mut errors);

    for field in &config.meta {
        match field {
            Meta::SkillSetAsset(asset) => {
                if let Err(e) = SkillSetTree::load(asset) {
                    errors.push(format!("can't load skillset {asset}: {e:?}"));
                }
            },
        }
    }

    errors
}

fn main() -> ExitCode {
    let entity_configs = match generation::try_all_entity_configs() {
        Ok(configs) => configs,
        Err(e) => {
            eprintln!("Failed to access entity configs directory: {e:?}");
            return ExitCode::FAILURE;
        },
    };

    let mut broken = 0;
    for config_asset in &entity_configs {
        let errors = check_config(config_asset);
        if errors.is_empty() {
            println!("{config_asset} ok");
        } else {
            broken += 1;
            for error in errors {
                eprintln!("{config_asset}: {error}");
            }
        }
    }

    println!(
        "\nChecked {} configs, {broken} broken.",
        entity_configs.len()
    );
    if broken > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
