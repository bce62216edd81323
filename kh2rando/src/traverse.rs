use crate::assignment::Assignment;
use hashbrown::HashSet;
use kh2rando_game::{LinkIdx, LocationGraph, NodeIdx};
use kh2rando_logic::{evaluate, Inventory};

#[derive(Clone, Debug)]
pub struct TraverseResult {
    // Round in which each node was first reached, if at all.
    pub node_depth: Vec<Option<usize>>,
    pub check_depth: Vec<Option<usize>>,
    // Starting inventory plus everything folded in from reached checks.
    pub inventory: Inventory,
    goal: NodeIdx,
}

impl TraverseResult {
    pub fn goal_reached(&self) -> bool {
        self.node_depth[self.goal].is_some()
    }

    pub fn num_reachable_checks(&self) -> usize {
        self.check_depth.iter().filter(|d| d.is_some()).count()
    }
}

/// Computes the fixed point of reachability from the graph's start node.
///
/// With `placements`, the items at each newly reached check are added to the inventory before
/// blocked edges are retried, so the result reflects everything a player could collect.
/// Without it the inventory stays fixed. Nodes are expanded in sorted order each round, which
/// makes the result a pure function of the inputs.
pub fn traverse(
    graph: &LocationGraph,
    inventory: &Inventory,
    placements: Option<&Assignment>,
) -> TraverseResult {
    let mut node_depth: Vec<Option<usize>> = vec![None; graph.num_nodes()];
    let mut check_depth: Vec<Option<usize>> = vec![None; graph.num_checks()];
    let mut inventory = inventory.clone();
    let mut blocked_links: HashSet<LinkIdx> = HashSet::new();
    let mut modified_nodes: Vec<NodeIdx> = vec![graph.start];
    node_depth[graph.start] = Some(0);
    let mut depth = 0;

    while !modified_nodes.is_empty() {
        for &node in &modified_nodes {
            for &check in &graph.nodes[node].checks {
                check_depth[check] = Some(depth);
                if let Some(assignment) = placements {
                    for item in assignment.items_at(check) {
                        inventory.add(item, 1);
                    }
                }
            }
        }

        let mut candidate_links: Vec<LinkIdx> = blocked_links.drain().collect();
        for &node in &modified_nodes {
            candidate_links.extend(&graph.links_by_src[node]);
        }
        candidate_links.sort();

        let mut new_modified_nodes: HashSet<NodeIdx> = HashSet::new();
        for link_idx in candidate_links {
            let link = &graph.links[link_idx];
            if node_depth[link.to_node].is_some() {
                continue;
            }
            if evaluate(&link.requirement, &inventory) {
                node_depth[link.to_node] = Some(depth + 1);
                new_modified_nodes.insert(link.to_node);
            } else {
                blocked_links.insert(link_idx);
            }
        }

        modified_nodes = new_modified_nodes.into_iter().collect();
        modified_nodes.sort();
        if !modified_nodes.is_empty() {
            depth += 1;
        }
    }

    TraverseResult {
        node_depth,
        check_depth,
        inventory,
        goal: graph.goal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kh2rando_game::regions::helpers::{chest, free, has, has_count};
    use kh2rando_game::{ItemCatalog, LocationGraphBuilder, LocationType};

    fn fragment(catalog: &ItemCatalog) -> LocationGraph {
        // Start -> A (free) -> B (Torn Page) -> C (2x Torn Page, Membership Card)
        let hb = LocationType::HollowBastion;
        let mut builder = LocationGraphBuilder::new(catalog, false);
        let a = builder.add_location("A", vec![chest(1, "A1", hb)]).unwrap();
        let b = builder.add_location("B", vec![chest(2, "B1", hb)]).unwrap();
        let c = builder
            .add_location("C", vec![chest(3, "C1", hb), chest(4, "C2", hb)])
            .unwrap();
        let start = builder.start();
        builder.add_edge(start, a, free()).unwrap();
        builder.add_edge(a, b, has("Torn Page")).unwrap();
        builder
            .add_edge(
                b,
                c,
                kh2rando_game::regions::helpers::all(vec![
                    has_count("Torn Page", 2),
                    has("Membership Card"),
                ]),
            )
            .unwrap();
        builder.set_goal(c).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_fixed_inventory() {
        let catalog = ItemCatalog::load().unwrap();
        let graph = fragment(&catalog);
        let inventory = Inventory::new(catalog.len());
        let result = traverse(&graph, &inventory, None);
        assert_eq!(result.num_reachable_checks(), 1);
        assert!(!result.goal_reached());

        let mut inventory = Inventory::new(catalog.len());
        inventory.add(catalog.get("Torn Page").unwrap(), 2);
        inventory.add(catalog.get("Membership Card").unwrap(), 1);
        let result = traverse(&graph, &inventory, None);
        assert_eq!(result.num_reachable_checks(), 4);
        assert!(result.goal_reached());
        assert_eq!(result.node_depth[graph.node_idx("C").unwrap()], Some(3));
    }

    #[test]
    fn test_folds_placed_items() {
        let catalog = ItemCatalog::load().unwrap();
        let graph = fragment(&catalog);
        let page = catalog.get("Torn Page").unwrap();
        let card = catalog.get("Membership Card").unwrap();
        let mut assignment = Assignment::new(graph.num_checks());
        assignment.place(graph.check_idx("A1").unwrap(), page, false);
        assignment.place(graph.check_idx("B1").unwrap(), page, false);
        let inventory = Inventory::new(catalog.len());

        let result = traverse(&graph, &inventory, Some(&assignment));
        assert_eq!(result.num_reachable_checks(), 2);
        assert_eq!(result.inventory.count(page), 2);

        assignment.place(graph.check_idx("A1").unwrap(), card, true);
        let result = traverse(&graph, &inventory, Some(&assignment));
        assert!(result.goal_reached());
        assert_eq!(result.num_reachable_checks(), 4);
    }

    #[test]
    fn test_idempotent_and_monotone() {
        let catalog = ItemCatalog::load().unwrap();
        let graph = kh2rando_game::graph::build_location_graph(&catalog, false).unwrap();
        let mut small = Inventory::new(catalog.len());
        small.add(catalog.get("Torn Page").unwrap(), 3);
        let first = traverse(&graph, &small, None);
        let second = traverse(&graph, &small, None);
        assert_eq!(first.node_depth, second.node_depth);
        assert_eq!(first.check_depth, second.check_depth);

        let mut large = small.clone();
        large.add(catalog.get("Valor Form").unwrap(), 1);
        large.add(catalog.get("Membership Card").unwrap(), 1);
        let bigger = traverse(&graph, &large, None);
        for (s, l) in first.node_depth.iter().zip(&bigger.node_depth) {
            assert!(s.is_none() || l.is_some());
        }
        assert!(bigger.num_reachable_checks() > first.num_reachable_checks());
    }

    #[test]
    fn test_reverse_hundred_acre_wood_same_total() {
        let catalog = ItemCatalog::load().unwrap();
        let mut inventory = Inventory::new(catalog.len());
        inventory.add(catalog.get("Torn Page").unwrap(), 5);
        let mut totals = vec![];
        for reverse in [false, true] {
            let mut builder = LocationGraphBuilder::new(&catalog, reverse);
            kh2rando_game::regions::hundred_acre_wood::make_graph(&mut builder).unwrap();
            let start = builder.start();
            builder.set_goal(start).unwrap();
            let graph = builder.build().unwrap();
            totals.push(traverse(&graph, &inventory, None).num_reachable_checks());
        }
        assert_eq!(totals, vec![24, 24]);
    }
}
