use crate::assign::{
    roll_synthesis_recipes, roll_weapon_stats, shop_price, SynthesisRecipe, WeaponStats,
};
use crate::assignment::Assignment;
use crate::error::{AttemptFailure, ConfigError, RandomizeError};
use crate::settings::{KeyItemPriority, ProgressionRate, RandomizerSettings};
use crate::spoiler_log::SpoilerStep;
use crate::traverse::traverse;
use crate::validate::{validate, ValidationReport};
use fill_plan::{FillPlan, SlotGroups};
use kh2rando_game::graph::build_location_graph;
use kh2rando_game::regions::hundred_acre_wood::yeet_the_bear_check_names;
use kh2rando_game::{CheckIdx, ItemCatalog, ItemId, LocationGraph};
use kh2rando_logic::{GlobalState, Inventory};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use std::cmp::min;
use std::iter;

mod fill_plan;

pub const MAX_GENERATION_ATTEMPTS: usize = 5;

// Once fewer than this many items remain beyond what a step places, every remaining key item is
// placed in that step.
const KEY_ITEM_FINISH_THRESHOLD: usize = 20;

pub type SlotIdx = usize;

/// One item-holding position. Checks with two slots contribute two of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FillSlot {
    pub check: CheckIdx,
    pub secondary: bool,
}

#[derive(Clone, Debug)]
struct SlotState {
    placed_item: Option<ItemId>,
    collected: bool,
    reachable_step: Option<usize>,
    // Traversal round in which the slot's node was reached, for difficulty weighting.
    depth: Option<usize>,
}

#[derive(Clone)]
struct RandomizationState {
    step_num: usize,
    item_precedence: Vec<ItemId>, // Progression items in order of placement priority
    slot_state: Vec<SlotState>,
    items_remaining: Vec<usize>, // Number of each item still to be placed, indexed by ItemId
    global_state: GlobalState,
    goal_reached: bool,
    plan: FillPlan,
}

#[derive(Clone, Debug, Serialize)]
pub struct Randomization {
    pub seed: String,
    pub seed_name: String,
    pub attempt_num: usize,
    pub reverse: bool,
    pub assignment: Assignment,
    pub starting_items: Vec<ItemId>,
    pub shop_items: Vec<ItemId>,
    pub weapon_stats: Vec<WeaponStats>,
    pub synthesis_recipes: Vec<SynthesisRecipe>,
    pub report: ValidationReport,
    pub steps: Vec<SpoilerStep>,
}

impl Randomization {
    /// Inventory the player holds before visiting any check: starting items and shop stock.
    pub fn initial_inventory(&self, catalog: &ItemCatalog) -> Inventory {
        let mut inventory = Inventory::new(catalog.len());
        for &item in self.starting_items.iter().chain(&self.shop_items) {
            inventory.add(item, 1);
        }
        inventory
    }
}

pub struct Randomizer<'a> {
    pub graph: &'a LocationGraph,
    pub catalog: &'a ItemCatalog,
    pub settings: &'a RandomizerSettings,
    pub slots: Vec<FillSlot>,
    // eligible[item][slot]: whether the item may be placed in the slot under current settings
    eligible: Vec<Vec<bool>>,
    groups: SlotGroups,
    initial_items_remaining: Vec<usize>,
    key_item_priority: Vec<KeyItemPriority>,
    starting_items: Vec<ItemId>,
    shop_items: Vec<ItemId>,
    preplaced: Vec<Option<ItemId>>,
    junk_items: Vec<ItemId>,
    num_junk: usize,
    initial_inventory: Inventory,
}

fn seed_hash(seed: &str) -> [u8; 32] {
    let digest = crypto_hash::digest(crypto_hash::Algorithm::SHA256, seed.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

fn get_seed_name(seed: &str) -> String {
    let mut rng = StdRng::from_seed(seed_hash(seed));
    // Leave out vowels and characters that could read like vowels, to minimize the chance
    // of forming words.
    let alphabet = "256789BCDFGHJKLMNPQRSTVWXYZbcdfghjkmnpqrstvwxyz";
    let mut out: String = String::new();
    let num_chars = 9;
    for _ in 0..num_chars {
        let i = rng.gen_range(0..alphabet.len());
        let c = alphabet.as_bytes()[i] as char;
        out.push(c);
    }
    out
}

/// Runs `attempt` until it succeeds, up to `max_attempts` times. Configuration errors are
/// returned immediately; attempt failures are collected and reported once retries run out.
pub fn retry_attempts<T, F>(max_attempts: usize, mut attempt: F) -> Result<T, RandomizeError>
where
    F: FnMut(usize) -> Result<T, RandomizeError>,
{
    let mut failures: Vec<AttemptFailure> = vec![];
    for attempt_num in 0..max_attempts {
        match attempt(attempt_num) {
            Ok(out) => return Ok(out),
            Err(RandomizeError::Attempt(failure)) => {
                info!(
                    "Attempt {}/{max_attempts} failed: {failure}",
                    attempt_num + 1
                );
                failures.push(failure);
            }
            Err(e) => return Err(e),
        }
    }
    Err(RandomizeError::ExhaustedRetries { failures })
}

/// Builds the graph in the configured direction and produces a validated seed.
pub fn randomize_seed(
    catalog: &ItemCatalog,
    settings: &RandomizerSettings,
    seed: &str,
) -> Result<(LocationGraph, Randomization), RandomizeError> {
    let graph = build_location_graph(catalog, settings.reverse)?;
    let randomization = {
        let randomizer = Randomizer::new(&graph, catalog, settings)?;
        randomizer.randomize(seed)?
    };
    Ok((graph, randomization))
}

impl<'a> Randomizer<'a> {
    pub fn new(
        graph: &'a LocationGraph,
        catalog: &'a ItemCatalog,
        settings: &'a RandomizerSettings,
    ) -> Result<Randomizer<'a>, ConfigError> {
        let location_settings = &settings.location_settings;
        let mut slots: Vec<FillSlot> = vec![];
        for (check_idx, check) in graph.checks.iter().enumerate() {
            for i in 0..check.category.num_slots() {
                slots.push(FillSlot {
                    check: check_idx,
                    secondary: i == 1,
                });
            }
        }
        let disabled: Vec<bool> = slots
            .iter()
            .map(|s| graph.checks[s.check].has_any_type(&location_settings.disabled_types))
            .collect();
        let eligible: Vec<Vec<bool>> = catalog
            .items
            .iter()
            .map(|item| {
                slots
                    .iter()
                    .zip(&disabled)
                    .map(|(s, &d)| graph.checks[s.check].accepts(item) && (!d || item.junk))
                    .collect()
            })
            .collect();

        let groups = SlotGroups::new(&eligible, slots.len());

        let mut pool: Vec<usize> = catalog.items.iter().map(|i| i.count).collect();
        let lookup_all = |names: &[String]| -> Result<Vec<ItemId>, ConfigError> {
            names.iter().map(|n| catalog.lookup(n)).collect()
        };
        let starting_items = lookup_all(&settings.starting_settings.starting_items)?;
        let shop_items = lookup_all(&settings.starting_settings.shop_items)?;
        for &item in &shop_items {
            shop_price(&catalog.items[item])?;
        }
        for &item in starting_items.iter().chain(&shop_items) {
            pool[item] = pool[item].saturating_sub(1);
        }

        let mut key_item_priority = vec![KeyItemPriority::Default; catalog.len()];
        for p in &settings.item_progression_settings.key_item_priority {
            key_item_priority[catalog.lookup(&p.item)?] = p.priority;
        }

        let mut preplaced: Vec<Option<ItemId>> = vec![None; slots.len()];
        for (slot_idx, slot) in slots.iter().enumerate() {
            let check = &graph.checks[slot.check];
            if slot.secondary || disabled[slot_idx] {
                continue;
            }
            if let Some(item) = check.vanilla {
                if check.has_any_type(&location_settings.vanilla_types) {
                    preplaced[slot_idx] = Some(item);
                }
            }
        }
        if settings.item_progression_settings.yeet_the_bear {
            let proof = catalog.lookup("Proof of Nonexistence")?;
            // The proof goes to the first of the two popups that is still open.
            let slot_idx = yeet_the_bear_check_names()
                .iter()
                .filter_map(|name| graph.check_idx(name))
                .filter_map(|check| {
                    slots
                        .iter()
                        .position(|s| s.check == check && !s.secondary)
                })
                .find(|&s| preplaced[s].is_none() && !disabled[s]);
            if let Some(slot_idx) = slot_idx {
                preplaced[slot_idx] = Some(proof);
            }
        }
        for &item in preplaced.iter().flatten() {
            pool[item] = pool[item].saturating_sub(1);
        }

        let open_slots: Vec<usize> = (0..slots.len())
            .filter(|&s| preplaced[s].is_none())
            .collect();
        let masks: Vec<Vec<bool>> = eligible
            .iter()
            .map(|e| open_slots.iter().map(|&s| e[s]).collect())
            .collect();
        let placeable: Vec<ItemId> = (0..catalog.len())
            .filter(|&i| pool[i] > 0 && !catalog.items[i].junk)
            .collect();
        for &item in &placeable {
            if !masks[item].iter().any(|&x| x) {
                return Err(ConfigError::NoEligibleChecks {
                    item: catalog.name(item).to_string(),
                });
            }
        }
        // Items whose eligible slots all lie within another item's eligible slots compete with it
        // for those slots; their combined count must fit.
        for &item in &placeable {
            let mask = &masks[item];
            let competing: Vec<ItemId> = placeable
                .iter()
                .copied()
                .filter(|&other| iter::zip(&masks[other], mask).all(|(&o, &m)| !o || m))
                .collect();
            let needed: usize = competing.iter().map(|&i| pool[i]).sum();
            let available = mask.iter().filter(|&&x| x).count();
            if needed > available {
                let names: Vec<&str> = competing.iter().map(|&i| catalog.name(i)).collect();
                return Err(ConfigError::InsufficientEligibleChecks {
                    items: names.join(", "),
                    needed,
                    available,
                });
            }
        }
        let num_items: usize = pool.iter().sum();
        if num_items > open_slots.len() {
            return Err(ConfigError::PoolOverflow {
                items: num_items,
                slots: open_slots.len(),
            });
        }
        let num_junk = open_slots.len() - num_items;
        let junk_items = catalog.junk_items();
        if num_junk > 0 && junk_items.is_empty() {
            return Err(ConfigError::NoJunkItems);
        }
        let mut padded_pool = pool.clone();
        if let Some(&junk) = junk_items.first() {
            padded_pool[junk] += num_junk;
        }
        let group_open = groups.count_open(open_slots.iter().copied());
        let mut rng = StdRng::seed_from_u64(0);
        if FillPlan::new(&groups, group_open, &padded_pool, &mut rng).is_none() {
            return Err(ConfigError::UnplaceablePool);
        }

        let mut initial_inventory = Inventory::new(catalog.len());
        for &item in starting_items.iter().chain(&shop_items) {
            initial_inventory.add(item, 1);
        }
        let mut pool_inventory = initial_inventory.clone();
        for (item, &count) in pool.iter().enumerate() {
            pool_inventory.add(item, count as u32);
        }
        for &item in preplaced.iter().flatten() {
            pool_inventory.add(item, 1);
        }
        if !traverse(graph, &pool_inventory, None).goal_reached() {
            return Err(ConfigError::UnbeatablePool);
        }

        info!(
            "Item pool: {num_items} items and {num_junk} junk for {} slots ({} preplaced)",
            slots.len(),
            slots.len() - open_slots.len()
        );
        Ok(Randomizer {
            graph,
            catalog,
            settings,
            slots,
            eligible,
            groups,
            initial_items_remaining: pool,
            key_item_priority,
            starting_items,
            shop_items,
            preplaced,
            junk_items,
            num_junk,
            initial_inventory,
        })
    }

    pub fn initial_inventory(&self) -> &Inventory {
        &self.initial_inventory
    }

    fn get_item_precedence<R: Rng>(&self, rng: &mut R) -> Vec<ItemId> {
        let mut groups: [Vec<ItemId>; 3] = [vec![], vec![], vec![]];
        for &item in &self.graph.progression_items {
            if self.initial_items_remaining[item] == 0 {
                continue;
            }
            let group = match self.key_item_priority[item] {
                KeyItemPriority::Early => 0,
                KeyItemPriority::Default => 1,
                KeyItemPriority::Late => 2,
            };
            groups[group].push(item);
        }
        let mut item_precedence: Vec<ItemId> = vec![];
        for mut group in groups {
            group.shuffle(rng);
            item_precedence.extend(group);
        }
        item_precedence
    }

    fn num_key_items_remaining(&self, state: &RandomizationState) -> usize {
        self.graph
            .progression_items
            .iter()
            .map(|&i| state.items_remaining[i])
            .sum()
    }

    fn update_reachability(&self, state: &mut RandomizationState) {
        let result = traverse(self.graph, &state.global_state.inventory, None);
        for (slot, slot_state) in self.slots.iter().zip(state.slot_state.iter_mut()) {
            if let Some(depth) = result.check_depth[slot.check] {
                if slot_state.reachable_step.is_none() {
                    slot_state.reachable_step = Some(state.step_num);
                }
                slot_state.depth = Some(depth);
            }
        }
        state.goal_reached = result.goal_reached();
    }

    fn determine_item_split(&self, state: &RandomizationState, num_unplaced: usize) -> usize {
        let num_key_items_remaining = self.num_key_items_remaining(state);
        if num_key_items_remaining == 0 {
            return 0;
        }
        let num_unplaced_kinds = state
            .item_precedence
            .iter()
            .filter(|&&item| {
                state.items_remaining[item] > 0
                    && state.items_remaining[item] == self.initial_items_remaining[item]
            })
            .count();
        let num_items_remaining: usize = state.items_remaining.iter().sum();
        let mut num_key_items_to_place =
            match self.settings.item_progression_settings.progression_rate {
                ProgressionRate::Slow => 1,
                ProgressionRate::Uniform => usize::max(
                    1,
                    f32::round(
                        (num_unplaced_kinds as f32) / (num_items_remaining as f32)
                            * (num_unplaced as f32),
                    ) as usize,
                ),
                ProgressionRate::Fast => usize::max(
                    1,
                    f32::round(
                        2.0 * (num_unplaced_kinds as f32) / (num_items_remaining as f32)
                            * (num_unplaced as f32),
                    ) as usize,
                ),
            };

        // If we're at the end, dump as many key items as possible:
        if num_items_remaining < num_unplaced + KEY_ITEM_FINISH_THRESHOLD {
            num_key_items_to_place = num_key_items_remaining;
        }

        min(
            num_key_items_to_place,
            min(num_unplaced, num_key_items_remaining),
        )
    }

    fn select_key_items(
        &self,
        state: &RandomizationState,
        num_key_items_to_select: usize,
        attempt_num: usize,
    ) -> Option<Vec<ItemId>> {
        if num_key_items_to_select == 0 {
            return if attempt_num > 0 { None } else { Some(vec![]) };
        }
        let mut unplaced_items: Vec<ItemId> = vec![];
        let mut placed_items: Vec<ItemId> = vec![];
        let mut additional_items: Vec<ItemId> = vec![];

        for &item in &state.item_precedence {
            let remaining = state.items_remaining[item];
            if remaining == 0 {
                continue;
            }
            if self.settings.item_progression_settings.progression_rate == ProgressionRate::Slow
                || remaining == self.initial_items_remaining[item]
            {
                unplaced_items.push(item);
            } else {
                // Kinds that already have a copy placed go in last priority:
                placed_items.push(item);
            }
            additional_items.extend(iter::repeat(item).take(remaining - 1));
        }

        let cnt_different_items_remaining = unplaced_items.len() + placed_items.len();
        let mut remaining_items: Vec<ItemId> = vec![];
        remaining_items.extend(unplaced_items);
        remaining_items.extend(placed_items);
        remaining_items.extend(additional_items);

        if attempt_num > 0
            && num_key_items_to_select - 1 + attempt_num >= cnt_different_items_remaining
        {
            return None;
        }
        if num_key_items_to_select - 1 + attempt_num >= remaining_items.len() {
            return None;
        }

        // The first `k - 1` key items stay fixed by precedence; the last one varies across
        // attempts until some choice expands the reachable set.
        let mut key_items_to_place: Vec<ItemId> =
            remaining_items[0..(num_key_items_to_select - 1)].to_vec();
        key_items_to_place.push(remaining_items[num_key_items_to_select - 1 + attempt_num]);
        Some(key_items_to_place)
    }

    /// Fills `slots` with non-progression items, each drawn from the items the plan has set
    /// aside for the slot's group. Slots whose group only has key items planned stay open.
    fn place_filler<R: Rng>(
        &self,
        state: &mut RandomizationState,
        slots: &[SlotIdx],
        rng: &mut R,
        placements: &mut Vec<(SlotIdx, ItemId)>,
    ) {
        for &slot in slots {
            let group = self.groups.slot_group[slot];
            let candidates: Vec<ItemId> = (0..self.catalog.len())
                .filter(|&item| {
                    !self.graph.is_progression(item) && state.plan.planned(item, group) > 0
                })
                .collect();
            let Ok(&item) =
                candidates.choose_weighted(rng, |&item| state.plan.planned(item, group))
            else {
                continue;
            };
            if !state.plan.take(&self.groups, item, group) {
                continue;
            }
            state.items_remaining[item] -= 1;
            state.slot_state[slot].placed_item = Some(item);
            placements.push((slot, item));
        }
    }

    /// Places the key items into reachable slots, weighted by slot depth, then fills the rest of
    /// `unplaced` with filler and collects everything placed. Returns None if some key item has
    /// no eligible slot.
    fn place_items<R: Rng>(
        &self,
        state: &mut RandomizationState,
        unplaced: &[SlotIdx],
        key_items: &[ItemId],
        rng: &mut R,
    ) -> Option<Vec<(SlotIdx, ItemId)>> {
        let exponent = self
            .settings
            .item_progression_settings
            .item_placement_difficulty
            .depth_exponent();
        let mut open: Vec<SlotIdx> = unplaced.to_vec();
        let mut placements: Vec<(SlotIdx, ItemId)> = vec![];
        for &item in key_items {
            let mut candidates: Vec<usize> = (0..open.len())
                .filter(|&i| self.eligible[item][open[i]])
                .collect();
            let pos = loop {
                let &pos = candidates
                    .choose_weighted(rng, |&i| {
                        let depth = state.slot_state[open[i]].depth.unwrap_or(0);
                        ((depth + 1) as f64).powi(exponent)
                    })
                    .ok()?;
                let group = self.groups.slot_group[open[pos]];
                if state.plan.take(&self.groups, item, group) {
                    break pos;
                }
                // No slot of this group can take the item without stranding another.
                candidates.retain(|&i| self.groups.slot_group[open[i]] != group);
            };
            let slot = open.remove(pos);
            state.items_remaining[item] -= 1;
            state.slot_state[slot].placed_item = Some(item);
            placements.push((slot, item));
        }

        // Hold back enough reachable slots for the key items still to come, so that later steps
        // are never left without room for them.
        let key_items_left: Vec<ItemId> = self
            .graph
            .progression_items
            .iter()
            .copied()
            .filter(|&i| state.items_remaining[i] > 0)
            .collect();
        let mut num_held = key_items_left
            .iter()
            .map(|&i| state.items_remaining[i])
            .sum::<usize>();
        if num_held > 0 {
            open.retain(|&slot| {
                let hold = num_held > 0 && key_items_left.iter().any(|&i| self.eligible[i][slot]);
                if hold {
                    num_held -= 1;
                }
                !hold
            });
        }
        self.place_filler(state, &open, rng, &mut placements);
        for &(slot, item) in &placements {
            state.slot_state[slot].collected = true;
            state.global_state.collect(item);
        }
        Some(placements)
    }

    fn provides_progression(
        &self,
        old_state: &RandomizationState,
        new_state: &mut RandomizationState,
    ) -> bool {
        self.update_reachability(new_state);
        let all_reachable = new_state
            .slot_state
            .iter()
            .all(|s| s.reachable_step.is_some());
        let key_items_remaining: Vec<ItemId> = self
            .graph
            .progression_items
            .iter()
            .copied()
            .filter(|&i| new_state.items_remaining[i] > 0)
            .collect();
        // Newly reachable slots only count if they can take a remaining key item or already hold
        // something to collect; otherwise the next step would have nowhere to go.
        let gives_expansion = all_reachable
            || iter::zip(&new_state.slot_state, &old_state.slot_state)
                .enumerate()
                .any(|(slot, (n, o))| {
                    n.reachable_step.is_some()
                        && o.reachable_step.is_none()
                        && (n.placed_item.is_some()
                            || key_items_remaining.is_empty()
                            || key_items_remaining
                                .iter()
                                .any(|&item| self.eligible[item][slot]))
                });
        gives_expansion || new_state.goal_reached
    }

    fn multi_attempt_select_items<R: Rng>(
        &self,
        attempt_num_rando: usize,
        state: &RandomizationState,
        unplaced: &[SlotIdx],
        rng: &mut R,
    ) -> Result<(Vec<(SlotIdx, ItemId)>, RandomizationState), AttemptFailure> {
        let num_key_items_remaining = self.num_key_items_remaining(state);
        let num_key_items_to_select = self.determine_item_split(state, unplaced.len());
        let max_key_items = min(unplaced.len(), num_key_items_remaining);
        let mut last_ditch: Option<(Vec<(SlotIdx, ItemId)>, RandomizationState)> = None;

        for num_key_items in num_key_items_to_select..=max_key_items {
            let mut attempt_num = 0;
            while let Some(key_items) = self.select_key_items(state, num_key_items, attempt_num) {
                attempt_num += 1;
                let mut new_state = state.clone();
                new_state.step_num += 1;
                let Some(placements) = self.place_items(&mut new_state, unplaced, &key_items, rng)
                else {
                    continue;
                };
                if self.provides_progression(state, &mut new_state) || num_key_items_remaining == 0
                {
                    return Ok((placements, new_state));
                }
                if last_ditch.is_none() {
                    last_ditch = Some((placements, new_state));
                }
            }
            debug!(
                "[attempt {attempt_num_rando}] No progress with {num_key_items} key items at step {}",
                state.step_num
            );
        }

        if self.settings.item_progression_settings.progression_rate == ProgressionRate::Slow {
            if let Some(selection) = last_ditch {
                info!(
                    "[attempt {attempt_num_rando}] Continuing with last-ditch effort after exhausting key item placement attempts"
                );
                return Ok(selection);
            }
        }
        Err(AttemptFailure::KeyItemPlacementExhausted {
            step: state.step_num,
        })
    }

    fn step<R: Rng>(
        &self,
        attempt_num_rando: usize,
        state: &mut RandomizationState,
        rng: &mut R,
    ) -> Result<Option<SpoilerStep>, AttemptFailure> {
        // Collect items placed up front (or left over) whose slots have since become reachable:
        let mut collected_any = false;
        loop {
            let mut newly_collected = false;
            for slot_state in state.slot_state.iter_mut() {
                if let Some(item) = slot_state.placed_item {
                    if !slot_state.collected && slot_state.reachable_step.is_some() {
                        slot_state.collected = true;
                        state.global_state.collect(item);
                        newly_collected = true;
                    }
                }
            }
            if !newly_collected {
                break;
            }
            collected_any = true;
            self.update_reachability(state);
        }

        let mut unplaced_reachable: Vec<SlotIdx> = (0..self.slots.len())
            .filter(|&s| {
                state.slot_state[s].placed_item.is_none()
                    && state.slot_state[s].reachable_step.is_some()
            })
            .collect();
        let num_reachable = state
            .slot_state
            .iter()
            .filter(|s| s.reachable_step.is_some())
            .count();
        let empty_step = SpoilerStep {
            step: state.step_num,
            key_items: vec![],
            num_reachable,
        };
        if unplaced_reachable.is_empty() {
            return Ok(collected_any.then_some(empty_step));
        }
        unplaced_reachable.shuffle(rng);

        let (placements, new_state) =
            self.multi_attempt_select_items(attempt_num_rando, state, &unplaced_reachable, rng)?;
        if placements.is_empty() {
            return Ok(collected_any.then_some(empty_step));
        }
        let key_items: Vec<(CheckIdx, ItemId)> = placements
            .iter()
            .filter(|(_, item)| self.graph.is_progression(*item))
            .map(|&(slot, item)| (self.slots[slot].check, item))
            .collect();
        *state = new_state;
        Ok(Some(SpoilerStep {
            step: state.step_num,
            key_items,
            num_reachable,
        }))
    }

    fn finish<R: Rng>(
        &self,
        attempt_num_rando: usize,
        state: &mut RandomizationState,
        rng: &mut R,
    ) -> Result<(), AttemptFailure> {
        let unplaced_key_items: Vec<String> = self
            .graph
            .progression_items
            .iter()
            .filter(|&&i| state.items_remaining[i] > 0)
            .map(|&i| self.catalog.name(i).to_string())
            .collect();
        if !unplaced_key_items.is_empty() {
            return Err(AttemptFailure::KeyItemsUnplaced {
                items: unplaced_key_items,
            });
        }
        if !state.goal_reached {
            return Err(AttemptFailure::GoalUnreachable);
        }

        let open: Vec<SlotIdx> = (0..self.slots.len())
            .filter(|&s| state.slot_state[s].placed_item.is_none())
            .collect();
        let mut placements = vec![];
        self.place_filler(state, &open, rng, &mut placements);
        info!(
            "[attempt {attempt_num_rando}] Filled {} remaining slots after the last step",
            placements.len()
        );

        let num_unfilled = state
            .slot_state
            .iter()
            .filter(|s| s.placed_item.is_none())
            .count();
        if num_unfilled > 0 {
            return Err(AttemptFailure::UnfilledSlots {
                count: num_unfilled,
            });
        }
        let num_leftover: usize = state.items_remaining.iter().sum();
        if num_leftover > 0 {
            return Err(AttemptFailure::LeftoverItems {
                count: num_leftover,
            });
        }
        Ok(())
    }

    fn get_assignment(&self, state: &RandomizationState) -> Assignment {
        let mut assignment = Assignment::new(self.graph.num_checks());
        // First slots before second slots, so that each pair is built in order.
        for secondary in [false, true] {
            for (slot_idx, slot) in self.slots.iter().enumerate() {
                if slot.secondary != secondary {
                    continue;
                }
                if let Some(item) = state.slot_state[slot_idx].placed_item {
                    assignment.place(slot.check, item, secondary);
                }
            }
        }
        assignment
    }

    fn randomize_attempt(
        &self,
        attempt_num_rando: usize,
        seed_str: &str,
        seed: u64,
    ) -> Result<Randomization, AttemptFailure> {
        let mut rng_seed = [0u8; 32];
        rng_seed[..8].copy_from_slice(&seed.to_le_bytes());
        let mut rng = StdRng::from_seed(rng_seed);

        let mut items_remaining = self.initial_items_remaining.clone();
        for _ in 0..self.num_junk {
            if let Some(&junk) = self.junk_items.choose(&mut rng) {
                items_remaining[junk] += 1;
            }
        }
        let group_open = self
            .groups
            .count_open((0..self.slots.len()).filter(|&s| self.preplaced[s].is_none()));
        let plan = FillPlan::new(&self.groups, group_open, &items_remaining, &mut rng)
            .ok_or(AttemptFailure::UnplaceableItems)?;
        let item_precedence = self.get_item_precedence(&mut rng);
        info!(
            "[attempt {attempt_num_rando}] Item precedence: {:?}",
            item_precedence
                .iter()
                .map(|&i| self.catalog.name(i))
                .collect::<Vec<_>>()
        );

        let mut global_state = GlobalState::new(self.catalog);
        global_state.inventory = self.initial_inventory.clone();
        let slot_state: Vec<SlotState> = self
            .preplaced
            .iter()
            .map(|&placed_item| SlotState {
                placed_item,
                collected: false,
                reachable_step: None,
                depth: None,
            })
            .collect();
        let mut state = RandomizationState {
            step_num: 1,
            item_precedence,
            slot_state,
            items_remaining,
            global_state,
            goal_reached: false,
            plan,
        };
        self.update_reachability(&mut state);
        if !state.slot_state.iter().any(|s| s.reachable_step.is_some()) {
            return Err(AttemptFailure::NoInitiallyReachableChecks);
        }

        let mut steps: Vec<SpoilerStep> = vec![];
        while let Some(step) = self.step(attempt_num_rando, &mut state, &mut rng)? {
            let cnt_collected = state.slot_state.iter().filter(|s| s.collected).count();
            let cnt_placed = state
                .slot_state
                .iter()
                .filter(|s| s.placed_item.is_some())
                .count();
            info!(
                "[attempt {attempt_num_rando}] step={}, reachable={}, placed={cnt_placed}, collected={cnt_collected}, key items={}",
                step.step,
                step.num_reachable,
                step.key_items.len()
            );
            steps.push(step);
        }
        self.finish(attempt_num_rando, &mut state, &mut rng)?;

        let assignment = self.get_assignment(&state);
        let report = validate(self.graph, self.catalog, &self.initial_inventory, &assignment);
        if !report.is_valid() {
            return Err(AttemptFailure::ValidationFailed {
                failures: report.failures,
            });
        }
        let weapon_stats = roll_weapon_stats(self.graph, &self.settings.stat_settings, &mut rng);
        let synthesis_recipes = roll_synthesis_recipes(self.graph, self.catalog, &mut rng);

        Ok(Randomization {
            seed: seed_str.to_string(),
            seed_name: get_seed_name(seed_str),
            attempt_num: attempt_num_rando,
            reverse: self.graph.reverse,
            assignment,
            starting_items: self.starting_items.clone(),
            shop_items: self.shop_items.clone(),
            weapon_stats,
            synthesis_recipes,
            report,
            steps,
        })
    }

    /// Generates a seed, retrying failed attempts up to `MAX_GENERATION_ATTEMPTS` times. The same
    /// seed string always yields the same result.
    pub fn randomize(&self, seed: &str) -> Result<Randomization, RandomizeError> {
        let mut rng = StdRng::from_seed(seed_hash(seed));
        retry_attempts(MAX_GENERATION_ATTEMPTS, |attempt_num| {
            let attempt_seed = rng.next_u64();
            info!(
                "Attempt {}/{MAX_GENERATION_ATTEMPTS}: seed={seed}, attempt_seed={attempt_seed}",
                attempt_num + 1
            );
            Ok(self.randomize_attempt(attempt_num, seed, attempt_seed)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_stops_on_config_error() {
        let mut calls = 0;
        let result: Result<(), RandomizeError> = retry_attempts(5, |_| {
            calls += 1;
            Err(ConfigError::MissingGoal.into())
        });
        assert!(result.unwrap_err().is_config());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_collects_failures() {
        let mut calls = 0;
        let result: Result<(), RandomizeError> = retry_attempts(MAX_GENERATION_ATTEMPTS, |_| {
            calls += 1;
            Err(AttemptFailure::GoalUnreachable.into())
        });
        match result {
            Err(RandomizeError::ExhaustedRetries { failures }) => {
                assert_eq!(failures.len(), MAX_GENERATION_ATTEMPTS)
            }
            _ => panic!("expected exhausted retries"),
        }
        assert_eq!(calls, MAX_GENERATION_ATTEMPTS);
    }

    #[test]
    fn test_retry_returns_first_success() {
        let result = retry_attempts(5, |attempt_num| {
            if attempt_num < 2 {
                Err(AttemptFailure::GoalUnreachable.into())
            } else {
                Ok(attempt_num)
            }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_seed_name_is_stable() {
        assert_eq!(get_seed_name("abc"), get_seed_name("abc"));
        assert_eq!(get_seed_name("abc").len(), 9);
    }
}
