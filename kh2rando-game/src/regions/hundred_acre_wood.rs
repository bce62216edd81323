use super::helpers::{chest, free, need_torn_pages, popup};
use crate::{ConfigError, LocationGraphBuilder, LocationType};

pub const POOHS_HOWSE: &str = "Pooh's Howse";
pub const PIGLETS_HOWSE: &str = "Piglet's Howse";
pub const RABBITS_HOWSE: &str = "Rabbit's Howse";
pub const KANGAS_HOWSE: &str = "Kanga's Howse";
pub const SPOOKY_CAVE: &str = "Spooky Cave";
pub const STARRY_HILL: &str = "Starry Hill";

pub const STARRY_HILL_CURE_ELEMENT: &str = "Starry Hill Cure Element";
pub const STARRY_HILL_ORICHALCUM_PLUS: &str = "Starry Hill Orichalcum+";

/// The two Starry Hill popups that the "yeet the bear" option reserves for a proof.
pub fn yeet_the_bear_check_names() -> [&'static str; 2] {
    [STARRY_HILL_CURE_ELEMENT, STARRY_HILL_ORICHALCUM_PLUS]
}

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let haw = LocationType::HundredAcreWood;

    let poohs_howse = graph.add_location(
        POOHS_HOWSE,
        vec![
            chest(313, "Pooh's House 100 Acre Wood Map", haw),
            chest(97, "Pooh's House AP Boost", haw).vanilla("AP Boost"),
            chest(98, "Pooh's House Mythril Stone", haw).vanilla("Mythril Stone"),
        ],
    )?;
    let piglets_howse = graph.add_location(
        PIGLETS_HOWSE,
        vec![
            chest(105, "Piglet's House Defense Boost", haw).vanilla("Defense Boost"),
            chest(103, "Piglet's House AP Boost", haw).vanilla("AP Boost"),
            chest(104, "Piglet's House Mythril Gem", haw).vanilla("Mythril Gem"),
        ],
    )?;
    let rabbits_howse = graph.add_location(
        RABBITS_HOWSE,
        vec![
            chest(314, "Rabbit's House Draw Ring", haw),
            chest(100, "Rabbit's House Mythril Crystal", haw).vanilla("Mythril Crystal"),
            chest(101, "Rabbit's House AP Boost", haw).vanilla("AP Boost"),
        ],
    )?;
    let kangas_howse = graph.add_location(
        KANGAS_HOWSE,
        vec![
            chest(108, "Kanga's House Magic Boost", haw).vanilla("Magic Boost"),
            chest(106, "Kanga's House AP Boost", haw).vanilla("AP Boost"),
            chest(107, "Kanga's House Orichalcum", haw).vanilla("Orichalcum"),
        ],
    )?;
    let spooky_cave = graph.add_location(
        SPOOKY_CAVE,
        vec![
            chest(110, "Spooky Cave Mythril Gem", haw).vanilla("Mythril Gem"),
            chest(111, "Spooky Cave AP Boost", haw).vanilla("AP Boost"),
            chest(112, "Spooky Cave Orichalcum", haw).vanilla("Orichalcum"),
            chest(113, "Spooky Cave Guard Recipe", haw).vanilla("Guard Recipe"),
            chest(115, "Spooky Cave Mythril Crystal", haw).vanilla("Mythril Crystal"),
            chest(116, "Spooky Cave AP Boost (2)", haw).vanilla("AP Boost"),
            popup(284, "Sweet Memories", haw).vanilla("Sweet Memories"),
            popup(485, "Spooky Cave Map", haw),
        ],
    )?;
    let starry_hill = graph.add_location(
        STARRY_HILL,
        vec![
            chest(312, "Starry Hill Cosmic Ring", haw),
            chest(94, "Starry Hill Style Recipe", haw).vanilla("Style Recipe"),
            popup(285, STARRY_HILL_CURE_ELEMENT, haw).vanilla("Cure Element"),
            popup(539, STARRY_HILL_ORICHALCUM_PLUS, haw).vanilla("Orichalcum+"),
        ],
    )?;

    let start = graph.start();
    let chain = if !graph.reverse() {
        [
            poohs_howse,
            piglets_howse,
            rabbits_howse,
            kangas_howse,
            spooky_cave,
            starry_hill,
        ]
    } else {
        [
            starry_hill,
            spooky_cave,
            kangas_howse,
            rabbits_howse,
            piglets_howse,
            poohs_howse,
        ]
    };
    graph.add_edge(start, chain[0], free())?;
    for (pages, pair) in chain.windows(2).enumerate() {
        graph.add_edge(pair[0], pair[1], need_torn_pages(pages as u32 + 1))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemCatalog;

    fn build(reverse: bool) -> crate::LocationGraph {
        let catalog = ItemCatalog::load().unwrap();
        let mut builder = LocationGraphBuilder::new(&catalog, reverse);
        make_graph(&mut builder).unwrap();
        let goal = builder.start();
        builder.set_goal(goal).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_reverse_keeps_checks() {
        let forward = build(false);
        let reverse = build(true);
        assert_eq!(forward.num_checks(), 24);
        assert_eq!(forward.num_checks(), reverse.num_checks());
        assert_eq!(forward.links.len(), 6);
        assert_eq!(reverse.links.len(), 6);
    }

    #[test]
    fn test_reverse_swaps_entrance() {
        let forward = build(false);
        let reverse = build(true);
        let entrance = |g: &crate::LocationGraph| g.nodes[g.links[0].to_node].name.clone();
        assert_eq!(entrance(&forward), POOHS_HOWSE);
        assert_eq!(entrance(&reverse), STARRY_HILL);
    }
}
