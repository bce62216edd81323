use crate::{CheckDecl, LocationCategory, LocationId, LocationType, RequirementDecl};

pub const PROOFS: [&str; 3] = [
    "Proof of Connection",
    "Proof of Nonexistence",
    "Proof of Peace",
];

pub const SUMMONS: [&str; 4] = ["Chicken Little", "Genie", "Stitch", "Peter Pan"];

pub fn free() -> RequirementDecl {
    RequirementDecl::Free
}

pub fn has(item: &str) -> RequirementDecl {
    has_count(item, 1)
}

pub fn has_count(item: &str, count: u32) -> RequirementDecl {
    RequirementDecl::Has {
        item: item.to_string(),
        count,
    }
}

pub fn all(reqs: Vec<RequirementDecl>) -> RequirementDecl {
    RequirementDecl::All(reqs)
}

pub fn any(reqs: Vec<RequirementDecl>) -> RequirementDecl {
    RequirementDecl::Any(reqs)
}

pub fn need_torn_pages(count: u32) -> RequirementDecl {
    has_count("Torn Page", count)
}

pub fn need_proofs() -> RequirementDecl {
    all(PROOFS.iter().map(|p| has(p)).collect())
}

pub fn need_any_summon() -> RequirementDecl {
    any(SUMMONS.iter().map(|s| has(s)).collect())
}

/// `level` is 1 for the base spell, 2 for -ra, 3 for -ga.
pub fn need_magic(element: &str, level: u32) -> RequirementDecl {
    has_count(&format!("{element} Element"), level)
}

pub fn chest(location_id: LocationId, name: &str, world: LocationType) -> CheckDecl {
    CheckDecl::new(location_id, name, LocationCategory::Chest, &[world])
}

pub fn popup(location_id: LocationId, name: &str, world: LocationType) -> CheckDecl {
    CheckDecl::new(location_id, name, LocationCategory::Popup, &[world])
}

pub fn stat_bonus(location_id: LocationId, name: &str, world: LocationType) -> CheckDecl {
    CheckDecl::new(location_id, name, LocationCategory::StatBonus, &[world])
}

pub fn item_bonus(location_id: LocationId, name: &str, world: LocationType) -> CheckDecl {
    CheckDecl::new(location_id, name, LocationCategory::ItemBonus, &[world])
}

pub fn double_bonus(location_id: LocationId, name: &str, world: LocationType) -> CheckDecl {
    CheckDecl::new(location_id, name, LocationCategory::DoubleBonus, &[world])
}

pub fn hybrid_bonus(location_id: LocationId, name: &str, world: LocationType) -> CheckDecl {
    CheckDecl::new(location_id, name, LocationCategory::HybridBonus, &[world])
}
