use super::helpers::{free, has};
use crate::{
    CheckDecl, Character, ConfigError, LocationCategory, LocationGraphBuilder, LocationType,
};

/// Keyblades whose ability slot is only reachable once the keyblade itself is found.
pub const KEYBLADES: [(&str, u16); 5] = [
    ("Oathkeeper", 42),
    ("Oblivion", 43),
    ("Sweet Memories", 81),
    ("Star Seeker", 480),
    ("Hidden Dragon", 481),
];

fn weapon_slot(location_id: u16, name: &str) -> CheckDecl {
    CheckDecl::new(
        location_id,
        name,
        LocationCategory::WeaponSlot,
        &[LocationType::WeaponSlots],
    )
}

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let start = graph.start();

    let starting_weapons = graph.add_location(
        "Starting Weapons",
        vec![
            weapon_slot(41, "Kingdom Key Slot"),
            weapon_slot(150, "Hammer Staff Slot").character(Character::Donald),
            weapon_slot(151, "Adamant Shield Slot").character(Character::Goofy),
        ],
    )?;
    graph.add_edge(start, starting_weapons, free())?;

    for (keyblade, location_id) in KEYBLADES {
        let node = graph.add_location(
            keyblade,
            vec![weapon_slot(location_id, &format!("{keyblade} Slot"))],
        )?;
        graph.add_edge(start, node, has(keyblade))?;
    }
    Ok(())
}
