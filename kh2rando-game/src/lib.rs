pub mod error;
pub mod graph;
pub mod regions;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use strum_macros::{Display, EnumString, VariantNames};

pub use error::ConfigError;
pub use graph::{LocationGraph, LocationGraphBuilder};

pub type ItemId = usize; // Index into ItemCatalog.items
pub type GameItemId = u16; // Item id as used by the game's own tables
pub type NodeIdx = usize; // Index into LocationGraph.nodes
pub type CheckIdx = usize; // Index into LocationGraph.checks
pub type LinkIdx = usize; // Index into LocationGraph.links
pub type LocationId = u16;

#[derive(Default, Clone, Debug)]
pub struct IndexedVec<T: Hash + Eq> {
    pub keys: Vec<T>,
    pub index_by_key: HashMap<T, usize>,
}

impl<T: Hash + Eq> IndexedVec<T> {
    pub fn add<U: ToOwned<Owned = T> + ?Sized>(&mut self, name: &U) -> usize {
        if !self.index_by_key.contains_key(&name.to_owned()) {
            let idx = self.keys.len();
            self.index_by_key.insert(name.to_owned(), self.keys.len());
            self.keys.push(name.to_owned());
            idx
        } else {
            self.index_by_key[&name.to_owned()]
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    VariantNames,
    Display,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
pub enum ItemCategory {
    Magic,
    Form,
    Summon,
    TornPage,
    Proof,
    KeyItem,
    Report,
    StoryUnlock,
    GrowthAbility,
    ActionAbility,
    SupportAbility,
    StatUpgrade,
    Keyblade,
    Slot,
    Gauge,
    Consumable,
    Synthesis,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    VariantNames,
    Display,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
pub enum Character {
    Sora,
    Donald,
    Goofy,
}

impl Character {
    pub fn id(self) -> u8 {
        match self {
            Character::Sora => 1,
            Character::Donald => 2,
            Character::Goofy => 3,
        }
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    VariantNames,
    Display,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
pub enum LocationCategory {
    Chest,
    Popup,
    Level,
    DoubleBonus,
    HybridBonus,
    ItemBonus,
    StatBonus,
    ValorLevel,
    WisdomLevel,
    LimitLevel,
    MasterLevel,
    FinalLevel,
    SummonLevel,
    WeaponSlot,
}

impl LocationCategory {
    /// Item categories a check of this category can hold, or None if it takes anything.
    pub fn accepted_item_categories(self) -> Option<&'static [ItemCategory]> {
        match self {
            LocationCategory::StatBonus => Some(&[
                ItemCategory::Slot,
                ItemCategory::Gauge,
                ItemCategory::StatUpgrade,
                ItemCategory::Consumable,
            ]),
            LocationCategory::WeaponSlot => Some(&[
                ItemCategory::GrowthAbility,
                ItemCategory::ActionAbility,
                ItemCategory::SupportAbility,
                ItemCategory::Consumable,
            ]),
            LocationCategory::SummonLevel => {
                Some(&[ItemCategory::Consumable, ItemCategory::Synthesis])
            }
            _ => None,
        }
    }

    pub fn num_slots(self) -> usize {
        match self {
            LocationCategory::DoubleBonus | LocationCategory::HybridBonus => 2,
            _ => 1,
        }
    }

    pub fn is_bonus(self) -> bool {
        matches!(
            self,
            LocationCategory::DoubleBonus
                | LocationCategory::HybridBonus
                | LocationCategory::ItemBonus
                | LocationCategory::StatBonus
        )
    }

    pub fn is_form_level(self) -> bool {
        matches!(
            self,
            LocationCategory::ValorLevel
                | LocationCategory::WisdomLevel
                | LocationCategory::LimitLevel
                | LocationCategory::MasterLevel
                | LocationCategory::FinalLevel
                | LocationCategory::SummonLevel
        )
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    VariantNames,
    Display,
    Serialize,
    Deserialize,
    PartialOrd,
    Ord,
)]
pub enum LocationType {
    Free,
    Critical,
    SoraLevels,
    FormLevels,
    SummonLevels,
    WeaponSlots,
    GardenOfAssemblage,
    Puzzle,
    Synth,
    HundredAcreWood,
    HollowBastion,
    LandOfDragons,
    TWTNW,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemRestriction {
    #[default]
    Anywhere,
    OnlyCategories(Vec<LocationCategory>),
    OnlyTypes(Vec<LocationType>),
}

fn default_count() -> usize {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemData {
    pub name: String,
    pub id: GameItemId,
    pub category: ItemCategory,
    #[serde(default)]
    pub character: Option<Character>,
    #[serde(default)]
    pub restriction: ItemRestriction,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub junk: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    pub items: Vec<ItemData>,
    pub item_isv: IndexedVec<String>,
}

impl ItemCatalog {
    pub fn load() -> Result<ItemCatalog> {
        Self::from_json_str(include_str!("../data/items.json"))
            .context("unable to load embedded item catalog")
    }

    pub fn from_json_str(json_str: &str) -> Result<ItemCatalog> {
        let items: Vec<ItemData> = serde_json::from_str(json_str)?;
        Ok(Self::from_items(items)?)
    }

    pub fn from_items(items: Vec<ItemData>) -> Result<ItemCatalog, ConfigError> {
        let mut item_isv: IndexedVec<String> = IndexedVec::default();
        for (idx, item) in items.iter().enumerate() {
            if item_isv.add(&item.name) != idx {
                return Err(ConfigError::DuplicateItem(item.name.clone()));
            }
        }
        Ok(ItemCatalog { items, item_isv })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<ItemId> {
        self.item_isv.index_by_key.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Result<ItemId, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownItem(name.to_string()))
    }

    pub fn name(&self, item: ItemId) -> &str {
        &self.items[item].name
    }

    pub fn junk_items(&self) -> Vec<ItemId> {
        (0..self.items.len())
            .filter(|&i| self.items[i].junk)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Free,
    Never,
    Item { item: ItemId, count: u32 },
    And(Vec<Requirement>),
    Or(Vec<Requirement>),
}

impl Requirement {
    pub fn make_and(reqs: Vec<Requirement>) -> Requirement {
        let mut out_reqs: Vec<Requirement> = vec![];
        for req in reqs {
            if let Requirement::Never = req {
                return Requirement::Never;
            } else if let Requirement::Free = req {
                continue;
            } else if let Requirement::And(and_reqs) = req {
                out_reqs.extend(and_reqs);
            } else {
                out_reqs.push(req);
            }
        }
        match out_reqs.len() {
            0 => Requirement::Free,
            1 => out_reqs.swap_remove(0),
            _ => Requirement::And(out_reqs),
        }
    }

    pub fn make_or(reqs: Vec<Requirement>) -> Requirement {
        let mut out_reqs: Vec<Requirement> = vec![];
        for req in reqs {
            if let Requirement::Never = req {
                continue;
            } else if let Requirement::Free = req {
                return Requirement::Free;
            } else if let Requirement::Or(or_reqs) = req {
                out_reqs.extend(or_reqs);
            } else {
                out_reqs.push(req);
            }
        }
        match out_reqs.len() {
            0 => Requirement::Never,
            1 => out_reqs.swap_remove(0),
            _ => Requirement::Or(out_reqs),
        }
    }

    /// Adds every item this requirement mentions to `out`.
    pub fn collect_items(&self, out: &mut Vec<ItemId>) {
        match self {
            Requirement::Free | Requirement::Never => {}
            Requirement::Item { item, .. } => out.push(*item),
            Requirement::And(reqs) | Requirement::Or(reqs) => {
                for req in reqs {
                    req.collect_items(out);
                }
            }
        }
    }
}

/// Requirement as written in region declarations, naming items rather than indexing them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequirementDecl {
    Free,
    Has { item: String, count: u32 },
    All(Vec<RequirementDecl>),
    Any(Vec<RequirementDecl>),
}

impl RequirementDecl {
    pub fn resolve(&self, catalog: &ItemCatalog) -> Result<Requirement, ConfigError> {
        Ok(match self {
            RequirementDecl::Free => Requirement::Free,
            RequirementDecl::Has { item, count } => {
                if *count == 0 {
                    Requirement::Free
                } else {
                    Requirement::Item {
                        item: catalog.lookup(item)?,
                        count: *count,
                    }
                }
            }
            RequirementDecl::All(reqs) => Requirement::make_and(
                reqs.iter()
                    .map(|r| r.resolve(catalog))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            RequirementDecl::Any(reqs) => Requirement::make_or(
                reqs.iter()
                    .map(|r| r.resolve(catalog))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CheckDecl {
    pub name: String,
    pub location_id: LocationId,
    pub category: LocationCategory,
    pub types: Vec<LocationType>,
    pub character: Character,
    pub vanilla: Option<String>,
}

impl CheckDecl {
    pub fn new(
        location_id: LocationId,
        name: &str,
        category: LocationCategory,
        types: &[LocationType],
    ) -> Self {
        CheckDecl {
            name: name.to_string(),
            location_id,
            category,
            types: types.to_vec(),
            character: Character::Sora,
            vanilla: None,
        }
    }

    pub fn vanilla(mut self, item: &str) -> Self {
        self.vanilla = Some(item.to_string());
        self
    }

    pub fn character(mut self, character: Character) -> Self {
        self.character = character;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CheckLocation {
    pub name: String,
    pub location_id: LocationId,
    pub category: LocationCategory,
    pub types: Vec<LocationType>,
    pub character: Character,
    pub vanilla: Option<ItemId>,
    pub node: NodeIdx,
}

impl CheckLocation {
    pub fn has_any_type(&self, types: &[LocationType]) -> bool {
        self.types.iter().any(|t| types.contains(t))
    }

    /// Whether the given item may ever be placed here, ignoring enabled/disabled settings.
    pub fn accepts(&self, item: &ItemData) -> bool {
        if let Some(character) = item.character {
            if character != self.character {
                return false;
            }
        } else if self.character != Character::Sora && !item.junk {
            return false;
        }
        if let Some(categories) = self.category.accepted_item_categories() {
            if !categories.contains(&item.category) {
                return false;
            }
        }
        match &item.restriction {
            ItemRestriction::Anywhere => true,
            ItemRestriction::OnlyCategories(categories) => categories.contains(&self.category),
            ItemRestriction::OnlyTypes(types) => self.has_any_type(types),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Link {
    pub from_node: NodeIdx,
    pub to_node: NodeIdx,
    pub requirement: Requirement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_and_flattens() {
        let a = Requirement::Item { item: 0, count: 1 };
        let b = Requirement::Item { item: 1, count: 2 };
        let req = Requirement::make_and(vec![
            Requirement::Free,
            a.clone(),
            Requirement::make_and(vec![b.clone(), Requirement::Free]),
        ]);
        assert_eq!(req, Requirement::And(vec![a.clone(), b]));
        assert_eq!(
            Requirement::make_and(vec![a, Requirement::Never]),
            Requirement::Never
        );
        assert_eq!(Requirement::make_and(vec![]), Requirement::Free);
    }

    #[test]
    fn test_make_or_short_circuits() {
        let a = Requirement::Item { item: 0, count: 1 };
        assert_eq!(
            Requirement::make_or(vec![Requirement::Never, a.clone()]),
            a.clone()
        );
        assert_eq!(
            Requirement::make_or(vec![a, Requirement::Free]),
            Requirement::Free
        );
        assert_eq!(Requirement::make_or(vec![]), Requirement::Never);
    }

    #[test]
    fn test_catalog_loads() {
        let catalog = ItemCatalog::load().unwrap();
        assert!(catalog.get("Torn Page").is_some());
        assert!(catalog.get("Proof of Connection").is_some());
        assert!(!catalog.junk_items().is_empty());
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let json = r#"[
            {"name": "Potion", "id": 1, "category": "Consumable", "junk": true},
            {"name": "Potion", "id": 2, "category": "Consumable", "junk": true}
        ]"#;
        assert!(ItemCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_stat_bonus_rejects_abilities() {
        let check = CheckLocation {
            name: "Bonus".to_string(),
            location_id: 1,
            category: LocationCategory::StatBonus,
            types: vec![LocationType::HollowBastion],
            character: Character::Sora,
            vanilla: None,
            node: 0,
        };
        let ability = ItemData {
            name: "Guard".to_string(),
            id: 82,
            category: ItemCategory::ActionAbility,
            character: None,
            restriction: ItemRestriction::Anywhere,
            count: 1,
            junk: false,
        };
        let hp = ItemData {
            name: "Max HP Up".to_string(),
            id: 470,
            category: ItemCategory::Slot,
            character: Some(Character::Sora),
            restriction: ItemRestriction::OnlyCategories(vec![LocationCategory::StatBonus]),
            count: 1,
            junk: false,
        };
        assert!(!check.accepts(&ability));
        assert!(check.accepts(&hp));
    }
}
