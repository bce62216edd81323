use anyhow::Result;
use kh2rando_game::regions::helpers::{chest, free, has_count};
use kh2rando_game::{
    ItemCatalog, ItemCategory, ItemData, ItemRestriction, LocationGraph, LocationGraphBuilder,
    LocationType,
};

pub fn item(name: &str, id: u16, category: ItemCategory, count: usize, junk: bool) -> ItemData {
    ItemData {
        name: name.to_string(),
        id,
        category,
        character: None,
        restriction: ItemRestriction::Anywhere,
        count,
        junk,
    }
}

/// Catalog with `fragments` copies of a gating item, `filler` copies of a plain item and an
/// optional junk item.
pub fn fragment_catalog(fragments: usize, filler: usize, with_junk: bool) -> Result<ItemCatalog> {
    let mut items = vec![
        item("Fragment", 32, ItemCategory::TornPage, fragments, false),
        item("Filler", 276, ItemCategory::StatUpgrade, filler, false),
    ];
    if with_junk {
        items.push(item("Potion", 1, ItemCategory::Consumable, 0, true));
    }
    Ok(ItemCatalog::from_items(items)?)
}

/// Start -> A (free) -> B (1 fragment) -> C (2 fragments), one chest per node, goal C.
pub fn fragment_graph(catalog: &ItemCatalog) -> Result<LocationGraph> {
    let hb = LocationType::HollowBastion;
    let mut builder = LocationGraphBuilder::new(catalog, false);
    let a = builder.add_location("A", vec![chest(1, "A1", hb)])?;
    let b = builder.add_location("B", vec![chest(2, "B1", hb)])?;
    let c = builder.add_location("C", vec![chest(3, "C1", hb)])?;
    let start = builder.start();
    builder.add_edge(start, a, free())?;
    builder.add_edge(a, b, has_count("Fragment", 1))?;
    builder.add_edge(b, c, has_count("Fragment", 2))?;
    builder.set_goal(c)?;
    Ok(builder.build()?)
}
