use kh2rando_game::{CheckIdx, ItemId};
use serde::Serialize;

/// Items placed at one check. `item2` is only used by checks with a second slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub item: ItemId,
    pub item2: Option<ItemId>,
}

impl Placement {
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        std::iter::once(self.item).chain(self.item2)
    }
}

/// The final check -> item mapping, indexed by check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Assignment {
    placements: Vec<Option<Placement>>,
}

impl Assignment {
    pub fn new(num_checks: usize) -> Self {
        Assignment {
            placements: vec![None; num_checks],
        }
    }

    /// Puts an item into the first or second slot of a check. Returns false if that slot is taken.
    pub fn place(&mut self, check: CheckIdx, item: ItemId, secondary: bool) -> bool {
        match (&mut self.placements[check], secondary) {
            (slot @ None, false) => {
                *slot = Some(Placement { item, item2: None });
                true
            }
            (Some(placement), true) if placement.item2.is_none() => {
                placement.item2 = Some(item);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, check: CheckIdx) -> Option<&Placement> {
        self.placements.get(check).and_then(|p| p.as_ref())
    }

    pub fn items_at(&self, check: CheckIdx) -> impl Iterator<Item = ItemId> + '_ {
        self.get(check).into_iter().flat_map(|p| p.items())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckIdx, &Placement)> {
        self.placements
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    pub fn num_checks(&self) -> usize {
        self.placements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_pair_per_check() {
        let mut assignment = Assignment::new(2);
        assert!(!assignment.place(0, 5, true));
        assert!(assignment.place(0, 5, false));
        assert!(!assignment.place(0, 6, false));
        assert!(assignment.place(0, 6, true));
        assert!(!assignment.place(0, 7, true));
        assert_eq!(assignment.items_at(0).collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(assignment.items_at(1).count(), 0);
        assert_eq!(assignment.iter().count(), 1);
    }
}
