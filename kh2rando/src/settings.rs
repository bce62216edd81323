use anyhow::{Context, Result};
use kh2rando_game::LocationType;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct RandomizerSettings {
    pub name: Option<String>,
    #[serde(default)]
    pub reverse: bool,
    pub item_progression_settings: ItemProgressionSettings,
    #[serde(default)]
    pub location_settings: LocationSettings,
    #[serde(default)]
    pub starting_settings: StartingSettings,
    #[serde(default)]
    pub stat_settings: StatSettings,
    #[serde(default)]
    pub multiworld: Option<MultiworldSettings>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ItemProgressionSettings {
    pub progression_rate: ProgressionRate,
    pub item_placement_difficulty: ItemPlacementDifficulty,
    #[serde(default)]
    pub key_item_priority: Vec<KeyItemPrioritySetting>,
    // Reserve a Starry Hill popup for the Proof of Nonexistence.
    #[serde(default)]
    pub yeet_the_bear: bool,
}

#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Display, EnumString, VariantNames,
)]
pub enum ProgressionRate {
    Slow,
    Uniform,
    Fast,
}

#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Display, EnumString, VariantNames,
)]
pub enum ItemPlacementDifficulty {
    SuperEasy,
    Easy,
    Normal,
    Hard,
    VeryHard,
    Insane,
    Nightmare,
}

impl ItemPlacementDifficulty {
    /// Exponent applied to (depth + 1) when weighting slots for key items.
    pub fn depth_exponent(self) -> i32 {
        match self {
            ItemPlacementDifficulty::SuperEasy => -2,
            ItemPlacementDifficulty::Easy => -1,
            ItemPlacementDifficulty::Normal => 0,
            ItemPlacementDifficulty::Hard => 1,
            ItemPlacementDifficulty::VeryHard => 2,
            ItemPlacementDifficulty::Insane => 3,
            ItemPlacementDifficulty::Nightmare => 4,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Hash, Eq, Default)]
pub enum KeyItemPriority {
    Early,
    #[default]
    Default,
    Late,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct KeyItemPrioritySetting {
    pub item: String,
    pub priority: KeyItemPriority,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct LocationSettings {
    // Checks of these types only ever hold junk.
    #[serde(default)]
    pub disabled_types: Vec<LocationType>,
    // Checks of these types keep their original item.
    #[serde(default)]
    pub vanilla_types: Vec<LocationType>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct StartingSettings {
    #[serde(default)]
    pub starting_items: Vec<String>,
    #[serde(default)]
    pub shop_items: Vec<String>,
    pub sora_ap: u8,
    pub donald_ap: u8,
    pub goofy_ap: u8,
    #[serde(default)]
    pub auto_equip_abilities: bool,
}

impl Default for StartingSettings {
    fn default() -> Self {
        StartingSettings {
            starting_items: vec![],
            shop_items: vec![],
            sora_ap: 50,
            donald_ap: 55,
            goofy_ap: 54,
            auto_equip_abilities: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct StatSettings {
    pub sora_exp_multiplier: f32,
    pub form_exp_multiplier: f32,
    pub keyblade_min_stat: u8,
    pub keyblade_max_stat: u8,
}

impl Default for StatSettings {
    fn default() -> Self {
        StatSettings {
            sora_exp_multiplier: 1.0,
            form_exp_multiplier: 1.0,
            keyblade_min_stat: 0,
            keyblade_max_stat: 7,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct MultiworldSettings {
    pub world_id: u8,
    pub world_name: String,
}

impl Default for RandomizerSettings {
    fn default() -> Self {
        RandomizerSettings {
            name: Some("Default".to_string()),
            reverse: false,
            item_progression_settings: ItemProgressionSettings {
                progression_rate: ProgressionRate::Uniform,
                item_placement_difficulty: ItemPlacementDifficulty::Normal,
                key_item_priority: vec![],
                yeet_the_bear: false,
            },
            location_settings: LocationSettings::default(),
            starting_settings: StartingSettings::default(),
            stat_settings: StatSettings::default(),
            multiworld: None,
        }
    }
}

pub fn parse_randomizer_settings(settings_json: &str) -> Result<RandomizerSettings> {
    let mut des = serde_json::Deserializer::from_str(settings_json);
    let settings = serde_path_to_error::deserialize(&mut des)?;
    Ok(settings)
}

pub fn load_randomizer_settings(path: &std::path::Path) -> Result<RandomizerSettings> {
    let settings_json = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read {}", path.display()))?;
    parse_randomizer_settings(&settings_json)
        .with_context(|| format!("unable to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_presets_parse() {
        for preset in [
            include_str!("../data/presets/default.json"),
            include_str!("../data/presets/reverse-hard.json"),
        ] {
            parse_randomizer_settings(preset).unwrap();
        }
    }

    #[test]
    fn test_enum_names() {
        use std::str::FromStr;
        use strum::VariantNames;
        assert_eq!(ProgressionRate::from_str("Fast"), Ok(ProgressionRate::Fast));
        assert!(ProgressionRate::from_str("Sideways").is_err());
        assert_eq!(ItemPlacementDifficulty::VeryHard.to_string(), "VeryHard");
        assert_eq!(ItemPlacementDifficulty::VARIANTS.len(), 7);
    }

    #[test]
    fn test_bad_field_reports_path() {
        let json = r#"{
            "name": null,
            "item_progression_settings": {
                "progression_rate": "Sideways",
                "item_placement_difficulty": "Normal"
            }
        }"#;
        let err = parse_randomizer_settings(json).unwrap_err();
        assert!(err.to_string().contains("progression_rate"));
    }

    #[test]
    fn test_location_type_names() {
        let json = r#"{
            "name": "Vanilla HAW",
            "item_progression_settings": {
                "progression_rate": "Slow",
                "item_placement_difficulty": "Hard"
            },
            "location_settings": {
                "disabled_types": ["Puzzle", "Synth"],
                "vanilla_types": ["HundredAcreWood"]
            }
        }"#;
        let settings = parse_randomizer_settings(json).unwrap();
        assert_eq!(
            settings.location_settings.disabled_types,
            vec![LocationType::Puzzle, LocationType::Synth]
        );
        assert_eq!(settings.starting_settings, StartingSettings::default());
    }
}
