use crate::randomize::Randomization;
use kh2rando_game::{CheckIdx, ItemCatalog, ItemId, LocationCategory, LocationGraph};
use serde::Serialize;

/// Key items placed during one fill step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpoilerStep {
    pub step: usize,
    pub key_items: Vec<(CheckIdx, ItemId)>,
    // Slots reachable when the step began.
    pub num_reachable: usize,
}

#[derive(Serialize, Clone, Debug)]
pub struct SpoilerItemPlacement {
    pub item: String,
    pub check: String,
    pub node: String,
    pub depth: Option<usize>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SpoilerStepDetails {
    pub step: usize,
    pub num_reachable: usize,
    pub items: Vec<SpoilerItemPlacement>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SpoilerLocation {
    pub check: String,
    pub category: LocationCategory,
    pub items: Vec<String>,
    pub depth: Option<usize>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SpoilerLog {
    pub seed: String,
    pub seed_name: String,
    pub reverse: bool,
    pub attempt_num: usize,
    pub num_reachable_checks: usize,
    pub starting_items: Vec<String>,
    pub shop_items: Vec<String>,
    pub steps: Vec<SpoilerStepDetails>,
    pub locations: Vec<SpoilerLocation>,
    pub unreachable_checks: Vec<String>,
}

fn item_names(catalog: &ItemCatalog, items: &[ItemId]) -> Vec<String> {
    items.iter().map(|&i| catalog.name(i).to_string()).collect()
}

pub fn get_spoiler_log(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    randomization: &Randomization,
) -> SpoilerLog {
    let depth = &randomization.report.check_depth;
    let steps = randomization
        .steps
        .iter()
        .filter(|s| !s.key_items.is_empty())
        .map(|s| SpoilerStepDetails {
            step: s.step,
            num_reachable: s.num_reachable,
            items: s
                .key_items
                .iter()
                .map(|&(check, item)| SpoilerItemPlacement {
                    item: catalog.name(item).to_string(),
                    check: graph.checks[check].name.clone(),
                    node: graph.nodes[graph.checks[check].node].name.clone(),
                    depth: depth[check],
                })
                .collect(),
        })
        .collect();
    let locations = graph
        .checks
        .iter()
        .enumerate()
        .map(|(check_idx, check)| SpoilerLocation {
            check: check.name.clone(),
            category: check.category,
            items: randomization
                .assignment
                .items_at(check_idx)
                .map(|i| catalog.name(i).to_string())
                .collect(),
            depth: depth[check_idx],
        })
        .collect();
    let unreachable_checks = graph
        .checks
        .iter()
        .enumerate()
        .filter(|(i, _)| depth[*i].is_none())
        .map(|(_, c)| c.name.clone())
        .collect();

    SpoilerLog {
        seed: randomization.seed.clone(),
        seed_name: randomization.seed_name.clone(),
        reverse: randomization.reverse,
        attempt_num: randomization.attempt_num,
        num_reachable_checks: randomization.report.num_reachable_checks,
        starting_items: item_names(catalog, &randomization.starting_items),
        shop_items: item_names(catalog, &randomization.shop_items),
        steps,
        locations,
        unreachable_checks,
    }
}
