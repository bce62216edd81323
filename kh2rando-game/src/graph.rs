use crate::{
    regions, CheckDecl, CheckIdx, CheckLocation, Character, ConfigError, IndexedVec, ItemCatalog,
    ItemId, Link, LinkIdx, LocationCategory, LocationId, NodeIdx, RequirementDecl,
};
use hashbrown::HashSet;
use log::debug;

pub const START_NODE: &str = "Start";

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub checks: Vec<CheckIdx>,
}

/// A finished location graph. Immutable once built; one instance per direction.
#[derive(Clone, Debug)]
pub struct LocationGraph {
    pub reverse: bool,
    pub nodes: Vec<Node>,
    pub node_isv: IndexedVec<String>,
    pub checks: Vec<CheckLocation>,
    pub links: Vec<Link>,
    pub links_by_src: Vec<Vec<LinkIdx>>,
    pub start: NodeIdx,
    pub goal: NodeIdx,
    // Items referenced by at least one edge requirement, in ascending order.
    pub progression_items: Vec<ItemId>,
    progression_mask: Vec<bool>,
}

impl LocationGraph {
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn node_idx(&self, name: &str) -> Option<NodeIdx> {
        self.node_isv.index_by_key.get(name).copied()
    }

    pub fn check_idx(&self, name: &str) -> Option<CheckIdx> {
        self.checks.iter().position(|c| c.name == name)
    }

    pub fn is_progression(&self, item: ItemId) -> bool {
        self.progression_mask.get(item).copied().unwrap_or(false)
    }
}

pub struct LocationGraphBuilder<'a> {
    catalog: &'a ItemCatalog,
    reverse: bool,
    node_isv: IndexedVec<String>,
    nodes: Vec<Node>,
    checks: Vec<CheckLocation>,
    check_names: HashSet<String>,
    location_keys: HashSet<(LocationCategory, LocationId, Character)>,
    links: Vec<Link>,
    goal: Option<NodeIdx>,
}

impl<'a> LocationGraphBuilder<'a> {
    pub fn new(catalog: &'a ItemCatalog, reverse: bool) -> Self {
        let mut builder = LocationGraphBuilder {
            catalog,
            reverse,
            node_isv: IndexedVec::default(),
            nodes: vec![],
            checks: vec![],
            check_names: HashSet::new(),
            location_keys: HashSet::new(),
            links: vec![],
            goal: None,
        };
        builder.node_isv.add(START_NODE);
        builder.nodes.push(Node {
            name: START_NODE.to_string(),
            checks: vec![],
        });
        builder
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn start(&self) -> NodeIdx {
        0
    }

    pub fn add_location(
        &mut self,
        name: &str,
        checks: Vec<CheckDecl>,
    ) -> Result<NodeIdx, ConfigError> {
        if self.node_isv.index_by_key.contains_key(name) {
            return Err(ConfigError::DuplicateNode(name.to_string()));
        }
        let node_idx = self.node_isv.add(name);
        let mut check_ids = vec![];
        for decl in checks {
            if !self.check_names.insert(decl.name.clone()) {
                return Err(ConfigError::DuplicateCheck(decl.name));
            }
            if !self
                .location_keys
                .insert((decl.category, decl.location_id, decl.character))
            {
                return Err(ConfigError::DuplicateLocationId {
                    name: decl.name,
                    location_id: decl.location_id,
                    category: decl.category,
                });
            }
            let vanilla = match &decl.vanilla {
                Some(item) => Some(self.catalog.lookup(item)?),
                None => None,
            };
            check_ids.push(self.checks.len());
            self.checks.push(CheckLocation {
                name: decl.name,
                location_id: decl.location_id,
                category: decl.category,
                types: decl.types,
                character: decl.character,
                vanilla,
                node: node_idx,
            });
        }
        self.nodes.push(Node {
            name: name.to_string(),
            checks: check_ids,
        });
        Ok(node_idx)
    }

    pub fn add_edge(
        &mut self,
        from: NodeIdx,
        to: NodeIdx,
        requirement: RequirementDecl,
    ) -> Result<(), ConfigError> {
        for node in [from, to] {
            if node >= self.nodes.len() {
                return Err(ConfigError::UnknownNode(node));
            }
        }
        let requirement = requirement.resolve(self.catalog)?;
        self.links.push(Link {
            from_node: from,
            to_node: to,
            requirement,
        });
        Ok(())
    }

    pub fn set_goal(&mut self, node: NodeIdx) -> Result<(), ConfigError> {
        if node >= self.nodes.len() {
            return Err(ConfigError::UnknownNode(node));
        }
        self.goal = Some(node);
        Ok(())
    }

    pub fn build(self) -> Result<LocationGraph, ConfigError> {
        let goal = self.goal.ok_or(ConfigError::MissingGoal)?;
        let mut links_by_src: Vec<Vec<LinkIdx>> = vec![Vec::new(); self.nodes.len()];
        let mut referenced: Vec<ItemId> = vec![];
        for (idx, link) in self.links.iter().enumerate() {
            links_by_src[link.from_node].push(idx);
            link.requirement.collect_items(&mut referenced);
        }
        referenced.sort();
        referenced.dedup();
        let mut progression_mask = vec![false; self.catalog.len()];
        for &item in &referenced {
            progression_mask[item] = true;
        }
        debug!(
            "Built {} graph: {} nodes, {} checks, {} links, {} progression items",
            if self.reverse { "reverse" } else { "forward" },
            self.nodes.len(),
            self.checks.len(),
            self.links.len(),
            referenced.len()
        );
        Ok(LocationGraph {
            reverse: self.reverse,
            nodes: self.nodes,
            node_isv: self.node_isv,
            checks: self.checks,
            links: self.links,
            links_by_src,
            start: 0,
            goal,
            progression_items: referenced,
            progression_mask,
        })
    }
}

/// Builds the full world graph in the requested direction.
pub fn build_location_graph(
    catalog: &ItemCatalog,
    reverse: bool,
) -> Result<LocationGraph, ConfigError> {
    let mut builder = LocationGraphBuilder::new(catalog, reverse);
    regions::make_graph(&mut builder)?;
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::helpers::{free, has};
    use crate::{LocationCategory, LocationType};

    fn chest(id: LocationId, name: &str) -> CheckDecl {
        CheckDecl::new(id, name, LocationCategory::Chest, &[LocationType::HollowBastion])
    }

    #[test]
    fn test_duplicate_check_rejected() {
        let catalog = ItemCatalog::load().unwrap();
        let mut builder = LocationGraphBuilder::new(&catalog, false);
        builder.add_location("A", vec![chest(1, "Chest")]).unwrap();
        let err = builder.add_location("B", vec![chest(2, "Chest")]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateCheck("Chest".to_string()));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let catalog = ItemCatalog::load().unwrap();
        let mut builder = LocationGraphBuilder::new(&catalog, false);
        builder.add_location("A", vec![]).unwrap();
        assert!(matches!(
            builder.add_location("A", vec![]),
            Err(ConfigError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_unknown_item_rejected() {
        let catalog = ItemCatalog::load().unwrap();
        let mut builder = LocationGraphBuilder::new(&catalog, false);
        let a = builder.add_location("A", vec![]).unwrap();
        let start = builder.start();
        let err = builder
            .add_edge(start, a, has("Not A Real Item"))
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownItem("Not A Real Item".to_string()));
    }

    #[test]
    fn test_progression_items_come_from_edges() {
        let catalog = ItemCatalog::load().unwrap();
        let mut builder = LocationGraphBuilder::new(&catalog, false);
        let a = builder.add_location("A", vec![chest(1, "Chest")]).unwrap();
        let start = builder.start();
        builder.add_edge(start, a, has("Membership Card")).unwrap();
        builder.add_edge(a, start, free()).unwrap();
        builder.set_goal(a).unwrap();
        let graph = builder.build().unwrap();
        let card = catalog.get("Membership Card").unwrap();
        assert_eq!(graph.progression_items, vec![card]);
        assert!(graph.is_progression(card));
        assert!(!graph.is_progression(catalog.get("Potion").unwrap()));
    }

    #[test]
    fn test_full_graph_builds_both_ways() {
        let catalog = ItemCatalog::load().unwrap();
        let forward = build_location_graph(&catalog, false).unwrap();
        let reverse = build_location_graph(&catalog, true).unwrap();
        assert_eq!(forward.num_checks(), reverse.num_checks());
        assert_eq!(forward.num_nodes(), reverse.num_nodes());
        assert!(!forward.progression_items.is_empty());
    }
}
