use kh2rando_game::{ItemCatalog, ItemId, Requirement};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub counts: Vec<u32>,
}

impl Inventory {
    pub fn new(num_items: usize) -> Self {
        Inventory {
            counts: vec![0; num_items],
        }
    }

    pub fn count(&self, item: ItemId) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item: ItemId, count: u32) {
        if item >= self.counts.len() {
            self.counts.resize(item + 1, 0);
        }
        self.counts[item] += count;
    }
}

/// Evaluates a requirement against an inventory. Items the inventory has never seen count as zero.
pub fn evaluate(req: &Requirement, inventory: &Inventory) -> bool {
    match req {
        Requirement::Free => true,
        Requirement::Never => false,
        Requirement::Item { item, count } => inventory.count(*item) >= *count,
        Requirement::And(reqs) => reqs.iter().all(|r| evaluate(r, inventory)),
        Requirement::Or(reqs) => reqs.iter().any(|r| evaluate(r, inventory)),
    }
}

#[derive(Clone, Debug)]
pub struct GlobalState {
    pub inventory: Inventory,
}

impl GlobalState {
    pub fn new(catalog: &ItemCatalog) -> Self {
        GlobalState {
            inventory: Inventory::new(catalog.len()),
        }
    }

    pub fn collect(&mut self, item: ItemId) {
        self.inventory.add(item, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_count_threshold() {
        let mut inventory = Inventory::new(3);
        let req = Requirement::Item { item: 1, count: 2 };
        assert!(!evaluate(&req, &inventory));
        inventory.add(1, 1);
        assert!(!evaluate(&req, &inventory));
        inventory.add(1, 1);
        assert!(evaluate(&req, &inventory));
    }

    #[test]
    fn test_unknown_item_fails_closed() {
        let inventory = Inventory::new(2);
        let req = Requirement::Item { item: 57, count: 1 };
        assert!(!evaluate(&req, &inventory));
    }

    #[test]
    fn test_and_or() {
        let mut inventory = Inventory::new(2);
        inventory.add(0, 1);
        let a = Requirement::Item { item: 0, count: 1 };
        let b = Requirement::Item { item: 1, count: 1 };
        assert!(!evaluate(&Requirement::And(vec![a.clone(), b.clone()]), &inventory));
        assert!(evaluate(&Requirement::Or(vec![a.clone(), b.clone()]), &inventory));
        assert!(evaluate(&Requirement::And(vec![]), &inventory));
        assert!(!evaluate(&Requirement::Or(vec![]), &inventory));
        assert!(!evaluate(&Requirement::Never, &inventory));
    }

    #[test]
    fn test_more_items_never_hurt() {
        let req = Requirement::Or(vec![
            Requirement::Item { item: 0, count: 3 },
            Requirement::And(vec![
                Requirement::Item { item: 1, count: 1 },
                Requirement::Item { item: 2, count: 1 },
            ]),
        ]);
        let mut small = Inventory::new(3);
        small.add(1, 1);
        small.add(2, 1);
        let mut large = small.clone();
        large.add(0, 1);
        assert!(evaluate(&req, &small));
        assert!(evaluate(&req, &large));
    }
}
