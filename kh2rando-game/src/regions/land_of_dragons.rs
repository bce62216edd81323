use super::helpers::{chest, free, has, hybrid_bonus, item_bonus, need_magic, popup, stat_bonus};
use crate::{Character, ConfigError, LocationGraphBuilder, LocationType};

pub const ENCAMPMENT: &str = "The Encampment";
pub const VILLAGE: &str = "Village";
pub const SUMMIT: &str = "Summit";

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let lod = LocationType::LandOfDragons;

    let encampment = graph.add_location(
        ENCAMPMENT,
        vec![
            chest(250, "Bamboo Grove Dark Shard", lod),
            chest(251, "Bamboo Grove Ether", lod).vanilla("Ether"),
            chest(252, "Encampment AP Boost", lod).vanilla("AP Boost"),
            chest(253, "Encampment Mythril Shard", lod).vanilla("Mythril Shard"),
            popup(650, "Encampment Sword of the Ancestor", lod).vanilla("Sword of the Ancestor"),
            item_bonus(20, "Shan-Yu Bonus (Goofy)", lod).character(Character::Goofy),
        ],
    )?;
    let village = graph.add_location(
        VILLAGE,
        vec![
            chest(254, "Village Mythril Gem", lod).vanilla("Mythril Gem"),
            chest(255, "Village Cave Area Map", lod),
            chest(256, "Village Cave AP Boost", lod).vanilla("AP Boost"),
            stat_bonus(20, "Shan-Yu Bonus", lod),
        ],
    )?;
    let summit = graph.add_location(
        SUMMIT,
        vec![
            chest(257, "Ridge Frost Shard", lod),
            chest(258, "Ridge AP Boost", lod).vanilla("AP Boost"),
            popup(651, "Summit Hidden Dragon", lod).vanilla("Hidden Dragon"),
            hybrid_bonus(21, "Storm Rider Bonus", lod),
            item_bonus(21, "Storm Rider Bonus (Donald)", lod).character(Character::Donald),
        ],
    )?;

    let start = graph.start();
    if !graph.reverse() {
        graph.add_edge(start, encampment, free())?;
        graph.add_edge(encampment, village, has("Sword of the Ancestor"))?;
        graph.add_edge(village, summit, need_magic("Magnet", 1))?;
    } else {
        graph.add_edge(start, summit, free())?;
        graph.add_edge(summit, village, has("Sword of the Ancestor"))?;
        graph.add_edge(village, encampment, need_magic("Magnet", 1))?;
    }
    Ok(())
}
