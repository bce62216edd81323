use super::helpers::{free, item_bonus, popup};
use crate::{Character, ConfigError, LocationGraphBuilder, LocationType};

pub const GARDEN_OF_ASSEMBLAGE: &str = "Garden of Assemblage";
pub const MOOGLE_WORKSHOP: &str = "Moogle Workshop";
pub const PUZZLE_BOARD: &str = "Puzzle Board";

pub const NUM_CRITICAL_BONUSES: u16 = 7;

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let goa = LocationType::GardenOfAssemblage;

    let mut goa_checks = vec![];
    for i in 0..NUM_CRITICAL_BONUSES {
        let mut check = item_bonus(100 + i, &format!("Critical Extra {}", i + 1), goa);
        check.types.push(LocationType::Critical);
        goa_checks.push(check);
    }
    let mut donald_free =
        item_bonus(110, "Donald Starting Item", goa).character(Character::Donald);
    donald_free.types.push(LocationType::Free);
    let mut goofy_free =
        item_bonus(110, "Goofy Starting Item", goa).character(Character::Goofy);
    goofy_free.types.push(LocationType::Free);
    goa_checks.push(donald_free);
    goa_checks.push(goofy_free);
    let garden = graph.add_location(GARDEN_OF_ASSEMBLAGE, goa_checks)?;

    let mut synth_checks = vec![];
    for i in 0..8 {
        let mut check = popup(800 + i, &format!("Moogle Synthesis {}", i + 1), goa);
        check.types.push(LocationType::Synth);
        synth_checks.push(check);
    }
    let workshop = graph.add_location(MOOGLE_WORKSHOP, synth_checks)?;

    let puzzle_names = [
        "Awakening Puzzle",
        "Heart Puzzle",
        "Duality Puzzle",
        "Frontier Puzzle",
        "Daylight Puzzle",
    ];
    let mut puzzle_checks = vec![];
    for (i, name) in puzzle_names.iter().enumerate() {
        let mut check = popup(900 + i as u16, name, goa);
        check.types.push(LocationType::Puzzle);
        puzzle_checks.push(check);
    }
    let puzzles = graph.add_location(PUZZLE_BOARD, puzzle_checks)?;

    let start = graph.start();
    graph.add_edge(start, garden, free())?;
    graph.add_edge(garden, workshop, free())?;
    graph.add_edge(garden, puzzles, free())?;
    Ok(())
}
