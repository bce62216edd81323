use kh2rando_game::ItemId;
use pathfinding::directed::bfs::bfs;
use rand::seq::SliceRandom;
use rand::Rng;

pub type GroupIdx = usize;

/// Partition of fill slots into groups of slots that accept exactly the same items.
#[derive(Clone, Debug)]
pub struct SlotGroups {
    pub slot_group: Vec<GroupIdx>,
    // eligible[item][group]
    pub eligible: Vec<Vec<bool>>,
    // Groups each item may be placed in.
    pub item_groups: Vec<Vec<GroupIdx>>,
}

impl SlotGroups {
    /// `eligible[item][slot]` is the per-slot eligibility table.
    pub fn new(eligible: &[Vec<bool>], num_slots: usize) -> SlotGroups {
        let num_items = eligible.len();
        let mut signatures: Vec<Vec<bool>> = vec![];
        let mut slot_group: Vec<GroupIdx> = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            let signature: Vec<bool> = (0..num_items).map(|item| eligible[item][slot]).collect();
            let group = match signatures.iter().position(|s| *s == signature) {
                Some(group) => group,
                None => {
                    signatures.push(signature);
                    signatures.len() - 1
                }
            };
            slot_group.push(group);
        }
        let group_eligible: Vec<Vec<bool>> = (0..num_items)
            .map(|item| signatures.iter().map(|s| s[item]).collect())
            .collect();
        let item_groups = group_eligible
            .iter()
            .map(|e| (0..e.len()).filter(|&g| e[g]).collect())
            .collect();
        SlotGroups {
            slot_group,
            eligible: group_eligible,
            item_groups,
        }
    }

    pub fn num_groups(&self) -> usize {
        self.eligible.first().map_or(0, |e| e.len())
    }

    /// Number of open slots per group.
    pub fn count_open(&self, open: impl Iterator<Item = usize>) -> Vec<usize> {
        let mut group_open = vec![0; self.num_groups()];
        for slot in open {
            group_open[self.slot_group[slot]] += 1;
        }
        group_open
    }
}

/// A complete assignment of every item copy still to be placed to a group with room for it.
///
/// Placements go through `take`, which reroutes the plan as needed and refuses any placement
/// after which the remaining items could no longer all be placed.
#[derive(Clone, Debug)]
pub struct FillPlan {
    // plan[item][group]: copies of the item assigned to open slots of the group
    plan: Vec<Vec<usize>>,
    group_open: Vec<usize>,
    group_planned: Vec<usize>,
}

impl FillPlan {
    /// Builds a plan for `items_remaining` over `group_open` open slots. Returns None if the
    /// items do not fit.
    pub fn new<R: Rng>(
        groups: &SlotGroups,
        group_open: Vec<usize>,
        items_remaining: &[usize],
        rng: &mut R,
    ) -> Option<FillPlan> {
        let num_groups = groups.num_groups();
        let mut fill_plan = FillPlan {
            plan: vec![vec![0; num_groups]; items_remaining.len()],
            group_planned: vec![0; num_groups],
            group_open,
        };

        // Most constrained items first, in random order otherwise.
        let capacity = |item: ItemId| -> usize {
            groups.item_groups[item]
                .iter()
                .map(|&g| fill_plan.group_open[g])
                .sum()
        };
        let mut items: Vec<ItemId> = (0..items_remaining.len())
            .filter(|&i| items_remaining[i] > 0)
            .collect();
        items.shuffle(rng);
        items.sort_by_key(|&i| capacity(i));

        for item in items {
            for _ in 0..items_remaining[item] {
                if !fill_plan.add_unit(groups, item, rng) {
                    return None;
                }
            }
        }
        Some(fill_plan)
    }

    fn spare(&self, group: GroupIdx) -> usize {
        self.group_open[group] - self.group_planned[group]
    }

    pub fn planned(&self, item: ItemId, group: GroupIdx) -> usize {
        self.plan[item][group]
    }

    // Groups that could receive one of the units currently planned in `group`.
    fn moves_from(&self, groups: &SlotGroups, group: GroupIdx) -> Vec<GroupIdx> {
        let mut seen = vec![false; groups.num_groups()];
        for (item, plan) in self.plan.iter().enumerate() {
            if plan[group] == 0 {
                continue;
            }
            for &g in &groups.item_groups[item] {
                seen[g] = true;
            }
        }
        seen[group] = false;
        (0..seen.len()).filter(|&g| seen[g]).collect()
    }

    fn shift(&mut self, groups: &SlotGroups, from: GroupIdx, to: GroupIdx) {
        let Some(item) =
            (0..self.plan.len()).find(|&i| self.plan[i][from] > 0 && groups.eligible[i][to])
        else {
            return;
        };
        self.plan[item][from] -= 1;
        self.group_planned[from] -= 1;
        self.plan[item][to] += 1;
        self.group_planned[to] += 1;
    }

    fn add_unit<R: Rng>(&mut self, groups: &SlotGroups, item: ItemId, rng: &mut R) -> bool {
        let direct: Vec<GroupIdx> = groups.item_groups[item]
            .iter()
            .copied()
            .filter(|&g| self.spare(g) > 0)
            .collect();
        if let Ok(&group) = direct.choose_weighted(rng, |&g| self.spare(g)) {
            self.plan[item][group] += 1;
            self.group_planned[group] += 1;
            return true;
        }

        // Every group the item fits is full; make room by moving planned units along.
        let origin = groups.num_groups();
        let successors = |&g: &GroupIdx| {
            if g == origin {
                groups.item_groups[item].clone()
            } else {
                self.moves_from(groups, g)
            }
        };
        let Some(path) = bfs(&origin, successors, |&g| g != origin && self.spare(g) > 0) else {
            return false;
        };
        let first = path[1];
        self.plan[item][first] += 1;
        self.group_planned[first] += 1;
        for pair in path[1..].windows(2) {
            self.shift(groups, pair[0], pair[1]);
        }
        // Each group on the path passed one unit on; the last one used its spare slot.
        true
    }

    /// Records that one copy of `item` goes into an open slot of `group`. Returns false, leaving
    /// the plan untouched, if the rest of the items would then no longer fit.
    pub fn take(&mut self, groups: &SlotGroups, item: ItemId, group: GroupIdx) -> bool {
        if !groups.eligible[item][group] {
            return false;
        }
        if self.plan[item][group] == 0 {
            // Free up a planned unit of `item` elsewhere by pushing one of this group's units
            // toward it.
            let successors = |&g: &GroupIdx| self.moves_from(groups, g);
            let Some(path) = bfs(&group, successors, |&g| self.plan[item][g] > 0) else {
                return false;
            };
            for pair in path.windows(2) {
                self.shift(groups, pair[0], pair[1]);
            }
            let last = path[path.len() - 1];
            self.plan[item][last] -= 1;
            self.group_planned[last] -= 1;
            self.plan[item][group] += 1;
            self.group_planned[group] += 1;
        }
        self.plan[item][group] -= 1;
        self.group_planned[group] -= 1;
        self.group_open[group] -= 1;
        true
    }
}
