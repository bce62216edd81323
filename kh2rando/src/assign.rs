use crate::randomize::Randomization;
use crate::settings::{RandomizerSettings, StatSettings};
use kh2rando_game::{
    Character, CheckIdx, ConfigError, GameItemId, ItemCatalog, ItemCategory, ItemData, ItemId,
    LocationCategory, LocationGraph, LocationId, LocationType,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

const NUM_STARTING_ITEM_SLOTS: usize = 32;
const NUM_CRITICAL_STARTING_ITEMS: usize = 7;
const NUM_SYNTHESIS_REQUIREMENTS: usize = 6;
const EQUIP_FLAG: GameItemId = 0x8000;
const POTION: GameItemId = 1;
const ETHER: GameItemId = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeaponStats {
    pub check: CheckIdx,
    pub strength: u8,
    pub magic: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SynthesisRequirement {
    pub item: ItemId,
    pub amount: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SynthesisRecipe {
    pub check: CheckIdx,
    pub unlock_rank: u8,
    pub requirements: Vec<SynthesisRequirement>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreasureRecord {
    pub location_id: LocationId,
    pub item_id: GameItemId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelRecord {
    pub level: u16,
    pub exp: u32,
    pub strength: u8,
    pub magic: u8,
    pub defense: u8,
    pub ap: u8,
    pub sword_ability: GameItemId,
    pub shield_ability: GameItemId,
    pub staff_ability: GameItemId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BonusRecord {
    pub reward_id: LocationId,
    pub character_id: u8,
    pub hp_increase: u8,
    pub mp_increase: u8,
    pub drive_gauge_upgrade: u8,
    pub item_slot_upgrade: u8,
    pub accessory_slot_upgrade: u8,
    pub armor_slot_upgrade: u8,
    pub bonus_item1: GameItemId,
    pub bonus_item2: GameItemId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormLevelRecord {
    pub form_id: u8,
    pub form_level: u16,
    pub ability: GameItemId,
    pub experience: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeaponStatRecord {
    pub id: LocationId,
    pub attack: u8,
    pub magic: u8,
    pub defense: u8,
    pub ability: GameItemId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StartingItemsRecord {
    pub character: u8,
    pub id: u8,
    pub hp: u8,
    pub mp: u8,
    pub ap: u8,
    pub armor_slot_max: u8,
    pub accessory_slot_max: u8,
    pub item_slot_max: u8,
    pub items: Vec<GameItemId>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShopEntry {
    pub item_id: GameItemId,
    pub price: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SynthesisRecord {
    pub location_id: LocationId,
    pub item_id: GameItemId,
    pub unlock_rank: u8,
    pub requirements: Vec<(GameItemId, u16)>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MultiworldRecord {
    pub world_id: u8,
    pub world_name: String,
    pub location_id: LocationId,
    pub category: LocationCategory,
    pub character: u8,
    pub secondary: bool,
    pub item_id: GameItemId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeedRecords {
    pub treasures: Vec<TreasureRecord>,
    pub puzzles: Vec<TreasureRecord>,
    pub levels: Vec<LevelRecord>,
    pub bonuses: Vec<BonusRecord>,
    pub form_levels: Vec<FormLevelRecord>,
    pub weapon_stats: Vec<WeaponStatRecord>,
    pub starting_items: Vec<StartingItemsRecord>,
    pub shop: Vec<ShopEntry>,
    pub synthesis: Vec<SynthesisRecord>,
    pub multiworld: Option<Vec<MultiworldRecord>>,
}

pub fn roll_weapon_stats<R: Rng>(
    graph: &LocationGraph,
    settings: &StatSettings,
    rng: &mut R,
) -> Vec<WeaponStats> {
    let lo = settings.keyblade_min_stat.min(settings.keyblade_max_stat);
    let hi = settings.keyblade_min_stat.max(settings.keyblade_max_stat);
    graph
        .checks
        .iter()
        .enumerate()
        .filter(|(_, c)| c.category == LocationCategory::WeaponSlot)
        .map(|(check, _)| WeaponStats {
            check,
            strength: rng.gen_range(lo..=hi),
            magic: rng.gen_range(lo..=hi),
        })
        .collect()
}

pub fn roll_synthesis_recipes<R: Rng>(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    rng: &mut R,
) -> Vec<SynthesisRecipe> {
    let materials: Vec<ItemId> = (0..catalog.len())
        .filter(|&i| catalog.items[i].category == ItemCategory::Synthesis)
        .collect();
    let mut recipes = vec![];
    for (check, loc) in graph.checks.iter().enumerate() {
        if !loc.types.contains(&LocationType::Synth) {
            continue;
        }
        let num_requirements = rng.gen_range(1..=3).min(materials.len());
        let picked: Vec<ItemId> = materials
            .choose_multiple(rng, num_requirements)
            .copied()
            .collect();
        let requirements = picked
            .into_iter()
            .map(|item| SynthesisRequirement {
                item,
                amount: rng.gen_range(1..=5),
            })
            .collect();
        recipes.push(SynthesisRecipe {
            check,
            unlock_rank: rng.gen_range(0..=3),
            requirements,
        });
    }
    recipes
}

pub struct LevelStats {
    pub exp: u32,
    pub strength: u8,
    pub magic: u8,
    pub defense: u8,
    pub ap: u8,
}

/// Total experience and base stats at a Sora level.
pub fn level_stats(level: u16, settings: &StatSettings) -> LevelStats {
    let l = level as u32;
    let base_exp = (l - 1) * (l - 1) * 40 + (l - 1) * 20;
    let multiplier = settings.sora_exp_multiplier.max(0.1);
    LevelStats {
        exp: (base_exp as f32 / multiplier).round() as u32,
        strength: (2 + l / 2) as u8,
        magic: (6 + l / 2) as u8,
        defense: (2 + l / 4) as u8,
        ap: (2 + 2 * (l / 2)) as u8,
    }
}

fn form_id(category: LocationCategory) -> Option<u8> {
    match category {
        LocationCategory::SummonLevel => Some(0),
        LocationCategory::ValorLevel => Some(1),
        LocationCategory::WisdomLevel => Some(2),
        LocationCategory::LimitLevel => Some(3),
        LocationCategory::MasterLevel => Some(4),
        LocationCategory::FinalLevel => Some(5),
        _ => None,
    }
}

/// Experience needed to go from `level - 1` to `level` in a drive form or summon.
pub fn form_exp(form_id: u8, level: u16, multiplier: f32) -> u32 {
    const FORM_EXP: [[u32; 6]; 6] = [
        [6, 16, 25, 42, 63, 98],
        [80, 160, 280, 448, 560, 672],
        [20, 60, 72, 90, 108, 150],
        [3, 6, 12, 19, 23, 36],
        [60, 240, 456, 504, 600, 864],
        [12, 24, 48, 76, 133, 157],
    ];
    let idx = (level.clamp(2, 7) - 2) as usize;
    let exp = FORM_EXP[form_id as usize % 6][idx] as f32 / multiplier.max(0.1);
    (exp.round() as u32).max(1)
}

pub fn shop_price(item: &ItemData) -> Result<u32, ConfigError> {
    match item.category {
        ItemCategory::Keyblade => Ok(400),
        ItemCategory::Report => Ok(75 * (item.id as u32).saturating_sub(225)),
        ItemCategory::StoryUnlock => Ok(500),
        ItemCategory::Consumable | ItemCategory::StatUpgrade => Ok(match item.id {
            4 | 274 => 400,
            7 | 275 => 600,
            276..=279 => 250,
            _ => 700,
        }),
        category => Err(ConfigError::UnexpectedShopItem {
            item: item.name.clone(),
            category,
        }),
    }
}

fn game_id(catalog: &ItemCatalog, item: ItemId) -> GameItemId {
    catalog.items[item].id
}

pub fn assign_treasures(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    randomization: &Randomization,
) -> (Vec<TreasureRecord>, Vec<TreasureRecord>) {
    let mut treasures = vec![];
    let mut puzzles = vec![];
    for (check_idx, placement) in randomization.assignment.iter() {
        let check = &graph.checks[check_idx];
        if !matches!(
            check.category,
            LocationCategory::Chest | LocationCategory::Popup
        ) {
            continue;
        }
        if check.has_any_type(&[LocationType::Critical, LocationType::Synth]) {
            continue;
        }
        let record = TreasureRecord {
            location_id: check.location_id,
            item_id: game_id(catalog, placement.item),
        };
        if check.types.contains(&LocationType::Puzzle) {
            puzzles.push(record);
        } else {
            treasures.push(record);
        }
    }
    treasures.sort_by_key(|t| t.location_id);
    puzzles.sort_by_key(|t| t.location_id);
    (treasures, puzzles)
}

pub fn assign_levels(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    settings: &StatSettings,
    randomization: &Randomization,
) -> Vec<LevelRecord> {
    let mut levels: Vec<LevelRecord> = randomization
        .assignment
        .iter()
        .filter(|(c, _)| graph.checks[*c].category == LocationCategory::Level)
        .map(|(c, placement)| {
            let level = graph.checks[c].location_id;
            let stats = level_stats(level, settings);
            let ability = game_id(catalog, placement.item);
            LevelRecord {
                level,
                exp: stats.exp,
                strength: stats.strength,
                magic: stats.magic,
                defense: stats.defense,
                ap: stats.ap,
                sword_ability: ability,
                shield_ability: ability,
                staff_ability: ability,
            }
        })
        .collect();
    levels.sort_by_key(|l| l.level);
    levels
}

/// Adds a slot or gauge upgrade to the bonus's native stat fields. Returns false for other items.
fn apply_stat_upgrade(record: &mut BonusRecord, item: &ItemData) -> bool {
    if !matches!(item.category, ItemCategory::Slot | ItemCategory::Gauge) {
        return false;
    }
    match item.id {
        470 => record.hp_increase += 5,
        471 => record.mp_increase += 10,
        472 => record.drive_gauge_upgrade += 1,
        473 => record.armor_slot_upgrade += 1,
        474 => record.accessory_slot_upgrade += 1,
        463 => record.item_slot_upgrade += 1,
        _ => return false,
    }
    true
}

pub fn assign_bonuses(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    randomization: &Randomization,
) -> Vec<BonusRecord> {
    let mut bonuses = vec![];
    for (check_idx, placement) in randomization.assignment.iter() {
        let check = &graph.checks[check_idx];
        // Critical extras and the Donald/Goofy free items are written as starting items.
        if !check.category.is_bonus()
            || check.has_any_type(&[LocationType::Critical, LocationType::Free])
        {
            continue;
        }
        let mut record = BonusRecord {
            reward_id: check.location_id,
            character_id: check.character.id(),
            ..Default::default()
        };
        let item1 = &catalog.items[placement.item];
        if !apply_stat_upgrade(&mut record, item1) {
            record.bonus_item1 = item1.id;
        }
        if let Some(item2) = placement.item2 {
            let item2 = &catalog.items[item2];
            if !apply_stat_upgrade(&mut record, item2) {
                record.bonus_item2 = item2.id;
            }
        }
        bonuses.push(record);
    }
    bonuses.sort_by_key(|b| (b.reward_id, b.character_id));
    bonuses
}

pub fn assign_form_levels(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    settings: &StatSettings,
    randomization: &Randomization,
) -> Vec<FormLevelRecord> {
    let mut form_levels: Vec<FormLevelRecord> = randomization
        .assignment
        .iter()
        .filter_map(|(c, placement)| {
            let check = &graph.checks[c];
            let form_id = form_id(check.category)?;
            Some(FormLevelRecord {
                form_id,
                form_level: check.location_id,
                // Summon levels only hold junk, which the game ignores.
                ability: if form_id == 0 {
                    0
                } else {
                    game_id(catalog, placement.item)
                },
                experience: form_exp(form_id, check.location_id, settings.form_exp_multiplier),
            })
        })
        .collect();
    form_levels.sort_by_key(|f| (f.form_id, f.form_level));
    form_levels
}

pub fn assign_weapon_stats(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    randomization: &Randomization,
) -> Vec<WeaponStatRecord> {
    randomization
        .weapon_stats
        .iter()
        .filter_map(|stats| {
            let placement = randomization.assignment.get(stats.check)?;
            Some(WeaponStatRecord {
                id: graph.checks[stats.check].location_id,
                attack: stats.strength,
                magic: stats.magic,
                defense: 0,
                ability: game_id(catalog, placement.item),
            })
        })
        .collect()
}

fn pad_items(mut items: Vec<GameItemId>, character: &str) -> Result<Vec<GameItemId>, ConfigError> {
    if items.len() > NUM_STARTING_ITEM_SLOTS {
        return Err(ConfigError::TooManyStartingItems {
            character: character.to_string(),
            count: items.len(),
            max: NUM_STARTING_ITEM_SLOTS,
        });
    }
    items.resize(NUM_STARTING_ITEM_SLOTS, 0);
    Ok(items)
}

pub fn assign_starting_items(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    settings: &RandomizerSettings,
    randomization: &Randomization,
) -> Result<Vec<StartingItemsRecord>, ConfigError> {
    let starting = &settings.starting_settings;
    let free_items = |character: Character| -> Vec<GameItemId> {
        randomization
            .assignment
            .iter()
            .filter(|(c, _)| {
                let check = &graph.checks[*c];
                check.character == character && check.types.contains(&LocationType::Free)
            })
            .map(|(_, p)| game_id(catalog, p.item))
            .collect()
    };
    let starting_of = |categories: &[ItemCategory]| -> Vec<&ItemData> {
        randomization
            .starting_items
            .iter()
            .map(|&i| &catalog.items[i])
            .filter(|item| categories.contains(&item.category))
            .collect()
    };

    let mut donald_items = vec![POTION | EQUIP_FLAG, ETHER | EQUIP_FLAG];
    donald_items.extend(free_items(Character::Donald));
    donald_items.extend(starting_of(&[ItemCategory::Report]).iter().map(|i| i.id));

    let mut goofy_items = vec![POTION | EQUIP_FLAG; 3];
    goofy_items.extend(free_items(Character::Goofy));
    goofy_items.extend(starting_of(&[ItemCategory::StoryUnlock]).iter().map(|i| i.id));

    let equip = if starting.auto_equip_abilities {
        EQUIP_FLAG
    } else {
        0
    };
    let mut sora_items: Vec<GameItemId> = randomization
        .assignment
        .iter()
        .filter(|(c, _)| graph.checks[*c].types.contains(&LocationType::Critical))
        .map(|(_, p)| game_id(catalog, p.item))
        .collect();
    let abilities = [
        ItemCategory::GrowthAbility,
        ItemCategory::ActionAbility,
        ItemCategory::SupportAbility,
    ];
    sora_items.extend(starting_of(&abilities).iter().map(|i| i.id | equip));
    let handled = [
        ItemCategory::GrowthAbility,
        ItemCategory::ActionAbility,
        ItemCategory::SupportAbility,
        ItemCategory::Report,
        ItemCategory::StoryUnlock,
    ];
    sora_items.extend(
        randomization
            .starting_items
            .iter()
            .map(|&i| &catalog.items[i])
            .filter(|item| !handled.contains(&item.category))
            .map(|i| i.id),
    );
    let split = NUM_CRITICAL_STARTING_ITEMS.min(sora_items.len());
    let sora_other_items = sora_items.split_off(split);

    Ok(vec![
        StartingItemsRecord {
            character: 2,
            id: 0,
            hp: 20,
            mp: 100,
            ap: starting.donald_ap.saturating_sub(5),
            armor_slot_max: 1,
            accessory_slot_max: 2,
            item_slot_max: 2,
            items: pad_items(donald_items, "Donald")?,
        },
        StartingItemsRecord {
            character: 3,
            id: 0,
            hp: 20,
            mp: 100,
            ap: starting.goofy_ap.saturating_sub(4),
            armor_slot_max: 2,
            accessory_slot_max: 1,
            item_slot_max: 3,
            items: pad_items(goofy_items, "Goofy")?,
        },
        StartingItemsRecord {
            character: 1,
            id: 7,
            hp: 20,
            mp: 100,
            ap: starting.sora_ap,
            armor_slot_max: 1,
            accessory_slot_max: 1,
            item_slot_max: 3,
            items: pad_items(sora_items, "Sora")?,
        },
        StartingItemsRecord {
            character: 1,
            id: 0,
            hp: 20,
            mp: 100,
            ap: starting.sora_ap,
            armor_slot_max: 1,
            accessory_slot_max: 1,
            item_slot_max: 3,
            items: pad_items(sora_other_items, "Sora")?,
        },
    ])
}

pub fn assign_shop(
    catalog: &ItemCatalog,
    randomization: &Randomization,
) -> Result<Vec<ShopEntry>, ConfigError> {
    randomization
        .shop_items
        .iter()
        .map(|&i| {
            let item = &catalog.items[i];
            Ok(ShopEntry {
                item_id: item.id,
                price: shop_price(item)?,
            })
        })
        .collect()
}

pub fn assign_synthesis(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    settings: &RandomizerSettings,
    randomization: &Randomization,
) -> Vec<SynthesisRecord> {
    if settings
        .location_settings
        .disabled_types
        .contains(&LocationType::Synth)
    {
        return vec![];
    }
    randomization
        .synthesis_recipes
        .iter()
        .filter_map(|recipe| {
            let placement = randomization.assignment.get(recipe.check)?;
            let mut requirements: Vec<(GameItemId, u16)> = recipe
                .requirements
                .iter()
                .map(|r| (game_id(catalog, r.item), r.amount))
                .collect();
            requirements.resize(NUM_SYNTHESIS_REQUIREMENTS, (0, 0));
            Some(SynthesisRecord {
                location_id: graph.checks[recipe.check].location_id,
                item_id: game_id(catalog, placement.item),
                unlock_rank: recipe.unlock_rank,
                requirements,
            })
        })
        .collect()
}

pub fn assign_multiworld(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    settings: &RandomizerSettings,
    randomization: &Randomization,
) -> Option<Vec<MultiworldRecord>> {
    let world = settings.multiworld.as_ref()?;
    let mut records = vec![];
    for (check_idx, placement) in randomization.assignment.iter() {
        let check = &graph.checks[check_idx];
        for (secondary, item) in [(false, Some(placement.item)), (true, placement.item2)] {
            if let Some(item) = item {
                records.push(MultiworldRecord {
                    world_id: world.world_id,
                    world_name: world.world_name.clone(),
                    location_id: check.location_id,
                    category: check.category,
                    character: check.character.id(),
                    secondary,
                    item_id: game_id(catalog, item),
                });
            }
        }
    }
    Some(records)
}

/// Converts a finished randomization into the per-table records the game patch consumes.
pub fn assign_all(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    settings: &RandomizerSettings,
    randomization: &Randomization,
) -> Result<SeedRecords, ConfigError> {
    let (treasures, puzzles) = assign_treasures(graph, catalog, randomization);
    Ok(SeedRecords {
        treasures,
        puzzles,
        levels: assign_levels(graph, catalog, &settings.stat_settings, randomization),
        bonuses: assign_bonuses(graph, catalog, randomization),
        form_levels: assign_form_levels(graph, catalog, &settings.stat_settings, randomization),
        weapon_stats: assign_weapon_stats(graph, catalog, randomization),
        starting_items: assign_starting_items(graph, catalog, settings, randomization)?,
        shop: assign_shop(catalog, randomization)?,
        synthesis: assign_synthesis(graph, catalog, settings, randomization),
        multiworld: assign_multiworld(graph, catalog, settings, randomization),
    })
}
