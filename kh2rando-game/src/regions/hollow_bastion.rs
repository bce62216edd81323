use super::helpers::{all, chest, double_bonus, free, has, item_bonus, popup, stat_bonus};
use crate::{Character, ConfigError, LocationGraphBuilder, LocationType};

pub const BOROUGH: &str = "Hollow Bastion Borough";
pub const RESTORATION_SITE: &str = "Restoration Site";
pub const ANSEMS_STUDY: &str = "Ansem's Study";
pub const CAVERN_OF_REMEMBRANCE: &str = "Cavern of Remembrance";

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    let hb = LocationType::HollowBastion;

    let borough = graph.add_location(
        BOROUGH,
        vec![
            chest(200, "Borough Drive Recovery", hb),
            chest(201, "Borough AP Boost", hb).vanilla("AP Boost"),
            chest(202, "Borough Hi-Potion", hb).vanilla("Hi-Potion"),
            chest(203, "Borough Mythril Shard", hb).vanilla("Mythril Shard"),
            popup(600, "Bailey Secret Ansem Report 7", hb).vanilla("Secret Ansem's Report 7"),
            stat_bonus(10, "Bailey Nobodies Bonus", hb),
            item_bonus(10, "Bailey Nobodies Bonus (Goofy)", hb).character(Character::Goofy),
        ],
    )?;
    let restoration_site = graph.add_location(
        RESTORATION_SITE,
        vec![
            chest(204, "Restoration Site Moon Recipe", hb),
            chest(205, "Restoration Site AP Boost", hb).vanilla("AP Boost"),
            popup(601, "Restoration Site Membership Card", hb).vanilla("Membership Card"),
            double_bonus(11, "Demyx Bonus", hb),
            item_bonus(11, "Demyx Bonus (Donald)", hb).character(Character::Donald),
        ],
    )?;
    let ansems_study = graph.add_location(
        ANSEMS_STUDY,
        vec![
            chest(206, "Ansem's Study Ukulele Charm", hb),
            chest(207, "Ansem's Study Skill Recipe", hb),
            popup(602, "Ansem's Study Sleeping Lion", hb),
            stat_bonus(12, "Ansem's Study Bonus", hb),
        ],
    )?;
    let cavern = graph.add_location(
        CAVERN_OF_REMEMBRANCE,
        vec![
            chest(210, "Cavern Depths AP Boost", hb).vanilla("AP Boost"),
            chest(211, "Cavern Mining Area Serenity Gem", hb),
            chest(212, "Cavern Engine Chamber Power Crystal", hb),
            chest(213, "Cavern Mineshaft Orichalcum", hb).vanilla("Orichalcum"),
            popup(603, "Cavern Transport Proof of Connection", hb),
        ],
    )?;

    let start = graph.start();
    graph.add_edge(start, borough, free())?;
    if !graph.reverse() {
        graph.add_edge(borough, restoration_site, has("Membership Card"))?;
        graph.add_edge(restoration_site, ansems_study, has("Valor Form"))?;
    } else {
        graph.add_edge(borough, ansems_study, has("Membership Card"))?;
        graph.add_edge(ansems_study, restoration_site, has("Valor Form"))?;
    }
    graph.add_edge(
        borough,
        cavern,
        all(vec![has("High Jump"), has("Glide")]),
    )?;
    Ok(())
}
