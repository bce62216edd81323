mod common;

use anyhow::Result;
use common::{fragment_catalog, fragment_graph, item};
use kh2rando::error::{ConfigError, RandomizeError};
use kh2rando::randomize::{randomize_seed, Randomization, Randomizer};
use kh2rando::settings::{parse_randomizer_settings, ProgressionRate, RandomizerSettings};
use kh2rando_game::regions::helpers::{chest, free, has_count, item_bonus, stat_bonus};
use kh2rando_game::regions::hundred_acre_wood::STARRY_HILL_CURE_ELEMENT;
use kh2rando_game::{
    Character, ItemCatalog, ItemCategory, ItemRestriction, LocationCategory, LocationGraph,
    LocationGraphBuilder, LocationType,
};

#[test]
fn fragments_gate_the_chain() -> Result<()> {
    let catalog = fragment_catalog(2, 1, false)?;
    let graph = fragment_graph(&catalog)?;
    let settings = RandomizerSettings::default();
    let randomizer = Randomizer::new(&graph, &catalog, &settings)?;
    let randomization = randomizer.randomize("fragments")?;

    let fragment = catalog.lookup("Fragment")?;
    let filler = catalog.lookup("Filler")?;
    let at = |name: &str| -> Vec<usize> {
        let check = graph.check_idx(name).unwrap();
        randomization.assignment.items_at(check).collect()
    };
    assert_eq!(at("A1"), vec![fragment]);
    assert_eq!(at("B1"), vec![fragment]);
    assert_eq!(at("C1"), vec![filler]);
    assert!(randomization.report.is_valid());
    assert_eq!(randomization.report.check_depth, vec![Some(1), Some(2), Some(3)]);
    Ok(())
}

#[test]
fn surplus_fragment_is_config_error() -> Result<()> {
    let catalog = fragment_catalog(4, 0, true)?;
    let graph = fragment_graph(&catalog)?;
    let settings = RandomizerSettings::default();
    let err = Randomizer::new(&graph, &catalog, &settings).err().unwrap();
    assert_eq!(
        err,
        ConfigError::InsufficientEligibleChecks {
            items: "Fragment".to_string(),
            needed: 4,
            available: 3,
        }
    );
    Ok(())
}

#[test]
fn junk_counts_toward_overflow() -> Result<()> {
    let catalog = ItemCatalog::from_items(vec![
        item("Fragment", 32, ItemCategory::TornPage, 2, false),
        item("Potion", 1, ItemCategory::Consumable, 2, true),
    ])?;
    let graph = fragment_graph(&catalog)?;
    let settings = RandomizerSettings::default();
    let err = Randomizer::new(&graph, &catalog, &settings).err().unwrap();
    assert_eq!(err, ConfigError::PoolOverflow { items: 4, slots: 3 });
    Ok(())
}

#[test]
fn impossible_pools_are_config_errors() -> Result<()> {
    let settings = RandomizerSettings::default();

    let catalog = fragment_catalog(1, 0, true)?;
    let graph = fragment_graph(&catalog)?;
    let err = Randomizer::new(&graph, &catalog, &settings).err().unwrap();
    assert_eq!(err, ConfigError::UnbeatablePool);

    let catalog = fragment_catalog(2, 0, false)?;
    let graph = fragment_graph(&catalog)?;
    let err = Randomizer::new(&graph, &catalog, &settings).err().unwrap();
    assert_eq!(err, ConfigError::NoJunkItems);

    let mut puzzle_only = item("Puzzle Piece", 500, ItemCategory::KeyItem, 1, false);
    puzzle_only.restriction = ItemRestriction::OnlyTypes(vec![LocationType::Puzzle]);
    let catalog = ItemCatalog::from_items(vec![
        item("Fragment", 32, ItemCategory::TornPage, 2, false),
        puzzle_only,
    ])?;
    let graph = fragment_graph(&catalog)?;
    let err = Randomizer::new(&graph, &catalog, &settings).err().unwrap();
    assert_eq!(
        err,
        ConfigError::NoEligibleChecks {
            item: "Puzzle Piece".to_string()
        }
    );
    Ok(())
}

#[test]
fn unknown_setting_item_is_config_error() -> Result<()> {
    let catalog = ItemCatalog::load()?;
    let mut settings = RandomizerSettings::default();
    settings.starting_settings.starting_items = vec!["Ultima Weapon".to_string()];
    let err = randomize_seed(&catalog, &settings, "x").err().unwrap();
    assert!(err.is_config());
    assert!(matches!(
        err,
        RandomizeError::Config(ConfigError::UnknownItem(_))
    ));

    let mut settings = RandomizerSettings::default();
    settings.starting_settings.shop_items = vec!["Valor Form".to_string()];
    let err = randomize_seed(&catalog, &settings, "x").err().unwrap();
    assert!(matches!(
        err,
        RandomizeError::Config(ConfigError::UnexpectedShopItem { .. })
    ));
    Ok(())
}

fn assert_complete(
    catalog: &ItemCatalog,
    graph: &LocationGraph,
    randomization: &Randomization,
) {
    assert!(randomization.report.is_valid());
    assert!(randomization.report.goal_reached);
    for (check_idx, check) in graph.checks.iter().enumerate() {
        let items: Vec<usize> = randomization.assignment.items_at(check_idx).collect();
        assert_eq!(items.len(), check.category.num_slots(), "{}", check.name);
        for item in items {
            assert!(
                check.accepts(&catalog.items[item]),
                "{} cannot hold {}",
                check.name,
                catalog.name(item)
            );
        }
    }
}

#[test]
fn seeds_complete_across_presets_and_directions() -> Result<()> {
    let catalog = ItemCatalog::load()?;
    let presets = [
        include_str!("../data/presets/default.json"),
        include_str!("../data/presets/reverse-hard.json"),
    ];
    for preset in presets {
        for reverse in [false, true] {
            for rate in [
                ProgressionRate::Slow,
                ProgressionRate::Uniform,
                ProgressionRate::Fast,
            ] {
                let mut settings = parse_randomizer_settings(preset)?;
                settings.reverse = reverse;
                settings.item_progression_settings.progression_rate = rate;
                for seed in 0..4 {
                    let seed = format!("sweep{seed}");
                    let (graph, randomization) = randomize_seed(&catalog, &settings, &seed)?;
                    assert_complete(&catalog, &graph, &randomization);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn default_settings_complete_at_every_rate() -> Result<()> {
    let catalog = ItemCatalog::load()?;
    for rate in [
        ProgressionRate::Slow,
        ProgressionRate::Uniform,
        ProgressionRate::Fast,
    ] {
        let mut settings = RandomizerSettings::default();
        settings.item_progression_settings.progression_rate = rate;
        let (graph, randomization) = randomize_seed(&catalog, &settings, "completable")?;
        assert_complete(&catalog, &graph, &randomization);
    }
    Ok(())
}

// Start -> A (chest, Donald bonus, stat bonus) -> B (same again, behind the fragment).
fn restricted_graph(catalog: &ItemCatalog) -> Result<LocationGraph> {
    let hb = LocationType::HollowBastion;
    let mut builder = LocationGraphBuilder::new(catalog, false);
    let a = builder.add_location(
        "A",
        vec![
            chest(1, "A1", hb),
            item_bonus(2, "A Donald", hb).character(Character::Donald),
            stat_bonus(3, "A Stat", hb),
        ],
    )?;
    let b = builder.add_location(
        "B",
        vec![
            chest(4, "B1", hb),
            item_bonus(5, "B Donald", hb).character(Character::Donald),
            stat_bonus(6, "B Stat", hb),
        ],
    )?;
    let start = builder.start();
    builder.add_edge(start, a, free())?;
    builder.add_edge(a, b, has_count("Fragment", 1))?;
    builder.set_goal(b)?;
    Ok(builder.build()?)
}

#[test]
fn restricted_items_keep_their_checks() -> Result<()> {
    let mut donald_ability = item("Donald Ability", 165, ItemCategory::ActionAbility, 1, false);
    donald_ability.character = Some(Character::Donald);
    let mut gauge = item("Gauge Up", 472, ItemCategory::Gauge, 1, false);
    gauge.restriction = ItemRestriction::OnlyCategories(vec![LocationCategory::StatBonus]);
    let catalog = ItemCatalog::from_items(vec![
        item("Fragment", 32, ItemCategory::TornPage, 1, false),
        donald_ability,
        gauge,
        item("Filler", 276, ItemCategory::StatUpgrade, 1, false),
        item("Potion", 1, ItemCategory::Consumable, 0, true),
    ])?;
    let graph = restricted_graph(&catalog)?;
    let donald_ability = catalog.lookup("Donald Ability")?;
    let gauge = catalog.lookup("Gauge Up")?;
    for rate in [ProgressionRate::Slow, ProgressionRate::Fast] {
        let mut settings = RandomizerSettings::default();
        settings.item_progression_settings.progression_rate = rate;
        let randomizer = Randomizer::new(&graph, &catalog, &settings)?;
        for seed in 0..16 {
            let randomization = randomizer.randomize(&format!("restricted{seed}"))?;
            assert_complete(&catalog, &graph, &randomization);
            let holder = |item: usize| {
                let (check, _) = randomization
                    .assignment
                    .iter()
                    .find(|(_, p)| p.items().any(|i| i == item))
                    .unwrap();
                &graph.checks[check]
            };
            assert_eq!(holder(donald_ability).character, Character::Donald);
            assert_eq!(holder(gauge).category, LocationCategory::StatBonus);
        }
    }
    Ok(())
}

#[test]
fn same_seed_same_assignment() -> Result<()> {
    let catalog = ItemCatalog::load()?;
    let settings = RandomizerSettings::default();
    let (_, first) = randomize_seed(&catalog, &settings, "determinism")?;
    let (_, second) = randomize_seed(&catalog, &settings, "determinism")?;
    assert_eq!(first.assignment, second.assignment);
    assert_eq!(first.weapon_stats, second.weapon_stats);
    assert_eq!(first.synthesis_recipes, second.synthesis_recipes);
    assert_eq!(first.seed_name, second.seed_name);
    Ok(())
}

#[test]
fn reverse_world_is_completable() -> Result<()> {
    let catalog = ItemCatalog::load()?;
    let mut settings = RandomizerSettings::default();
    let (forward_graph, _) = randomize_seed(&catalog, &settings, "reverse")?;
    settings.reverse = true;
    let (graph, randomization) = randomize_seed(&catalog, &settings, "reverse")?;
    assert!(graph.reverse);
    assert!(randomization.reverse);
    assert_eq!(graph.num_checks(), forward_graph.num_checks());
    assert!(randomization.report.is_valid());
    Ok(())
}

#[test]
fn reverse_hard_preset() -> Result<()> {
    let catalog = ItemCatalog::load()?;
    let settings = parse_randomizer_settings(include_str!("../data/presets/reverse-hard.json"))?;
    let (graph, randomization) = randomize_seed(&catalog, &settings, "yeet")?;
    assert!(randomization.report.is_valid());

    let proof = catalog.lookup("Proof of Nonexistence")?;
    let starry_hill = graph.check_idx(STARRY_HILL_CURE_ELEMENT).unwrap();
    assert_eq!(randomization.assignment.get(starry_hill).unwrap().item, proof);

    for (check_idx, check) in graph.checks.iter().enumerate() {
        if check.types.contains(&LocationType::Puzzle) {
            for item in randomization.assignment.items_at(check_idx) {
                assert!(catalog.items[item].junk);
            }
        }
    }

    // Shop stock is held from the start and never placed.
    let oathkeeper = catalog.lookup("Oathkeeper")?;
    let card = catalog.lookup("Membership Card")?;
    assert!(randomization
        .assignment
        .iter()
        .all(|(_, p)| p.items().all(|i| i != oathkeeper && i != card)));
    Ok(())
}
