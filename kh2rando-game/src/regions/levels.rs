use super::helpers::{free, has, need_any_summon};
use crate::{CheckDecl, ConfigError, LocationCategory, LocationGraphBuilder, LocationType};

pub const SORA_LEVELS: &str = "Sora's Levels";
pub const SUMMON_LEVELS: &str = "Summon Levels";
pub const MAX_SORA_LEVEL: u16 = 50;
pub const MAX_FORM_LEVEL: u16 = 7;

pub const FORMS: [(&str, LocationCategory); 5] = [
    ("Valor Form", LocationCategory::ValorLevel),
    ("Wisdom Form", LocationCategory::WisdomLevel),
    ("Limit Form", LocationCategory::LimitLevel),
    ("Master Form", LocationCategory::MasterLevel),
    ("Final Form", LocationCategory::FinalLevel),
];

fn form_level_checks(
    prefix: &str,
    category: LocationCategory,
    types: &[LocationType],
) -> Vec<CheckDecl> {
    (2..=MAX_FORM_LEVEL)
        .map(|level| CheckDecl::new(level, &format!("{prefix} Level {level}"), category, types))
        .collect()
}

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let start = graph.start();

    let sora_checks = (2..=MAX_SORA_LEVEL)
        .map(|level| {
            CheckDecl::new(
                level,
                &format!("Sora Level {level}"),
                LocationCategory::Level,
                &[LocationType::SoraLevels],
            )
        })
        .collect();
    let sora_levels = graph.add_location(SORA_LEVELS, sora_checks)?;
    graph.add_edge(start, sora_levels, free())?;

    for (form, category) in FORMS {
        let prefix = form.trim_end_matches(" Form");
        let node = graph.add_location(
            &format!("{prefix} Form Levels"),
            form_level_checks(prefix, category, &[LocationType::FormLevels]),
        )?;
        graph.add_edge(start, node, has(form))?;
    }

    let summon_levels = graph.add_location(
        SUMMON_LEVELS,
        form_level_checks(
            "Summon",
            LocationCategory::SummonLevel,
            &[LocationType::SummonLevels],
        ),
    )?;
    graph.add_edge(start, summon_levels, need_any_summon())?;
    Ok(())
}
