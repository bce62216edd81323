use super::helpers::{
    any, chest, double_bonus, free, has, item_bonus, need_proofs, popup, stat_bonus,
};
use super::levels::FORMS;
use crate::{Character, ConfigError, LocationGraphBuilder, LocationType};

pub const FRAGMENT_CROSSING: &str = "Fragment Crossing";
pub const MEMORYS_SKYSCRAPER: &str = "Memory's Skyscraper";
pub const CASTLE_THAT_NEVER_WAS: &str = "Castle That Never Was";
pub const FINAL_DOOR: &str = "The Door to Kingdom Hearts";

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let twtnw = LocationType::TWTNW;

    let fragment_crossing = graph.add_location(
        FRAGMENT_CROSSING,
        vec![
            chest(520, "Fragment Crossing Mythril Stone", twtnw).vanilla("Mythril Stone"),
            chest(521, "Fragment Crossing Mythril Crystal", twtnw).vanilla("Mythril Crystal"),
            chest(522, "Fragment Crossing AP Boost", twtnw).vanilla("AP Boost"),
            popup(700, "Fragment Crossing Way to the Dawn", twtnw),
        ],
    )?;
    let skyscraper = graph.add_location(
        MEMORYS_SKYSCRAPER,
        vec![
            chest(523, "Memory's Skyscraper Mythril Crystal", twtnw).vanilla("Mythril Crystal"),
            chest(524, "Memory's Skyscraper AP Boost", twtnw).vanilla("AP Boost"),
            double_bonus(30, "Xigbar Bonus", twtnw),
            item_bonus(30, "Xigbar Bonus (Donald)", twtnw).character(Character::Donald),
        ],
    )?;
    let castle = graph.add_location(
        CASTLE_THAT_NEVER_WAS,
        vec![
            chest(525, "Naught's Skyway Mythril Gem", twtnw).vanilla("Mythril Gem"),
            chest(526, "Naught's Skyway Orichalcum", twtnw).vanilla("Orichalcum"),
            chest(527, "Ruin and Creation's Passage Mythril Stone", twtnw)
                .vanilla("Mythril Stone"),
            popup(701, "Proof of Peace Hall", twtnw),
            stat_bonus(31, "Luxord Bonus", twtnw),
            item_bonus(31, "Luxord Bonus (Goofy)", twtnw).character(Character::Goofy),
        ],
    )?;
    let final_door = graph.add_location(FINAL_DOOR, vec![])?;

    let any_form = any(FORMS.iter().map(|(form, _)| has(form)).collect());
    let start = graph.start();
    let last = if !graph.reverse() {
        graph.add_edge(start, fragment_crossing, has("Way to the Dawn"))?;
        graph.add_edge(fragment_crossing, skyscraper, free())?;
        graph.add_edge(skyscraper, castle, any_form)?;
        castle
    } else {
        graph.add_edge(start, castle, has("Way to the Dawn"))?;
        graph.add_edge(castle, skyscraper, free())?;
        graph.add_edge(skyscraper, fragment_crossing, any_form)?;
        fragment_crossing
    };
    graph.add_edge(last, final_door, need_proofs())?;
    graph.set_goal(final_door)?;
    Ok(())
}
