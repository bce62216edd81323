pub mod garden_of_assemblage;
pub mod helpers;
pub mod hollow_bastion;
pub mod hundred_acre_wood;
pub mod land_of_dragons;
pub mod levels;
pub mod twtnw;
pub mod weapon_slots;

use crate::{ConfigError, LocationGraphBuilder};

pub fn make_graph(graph: &mut LocationGraphBuilder) -> Result<(), ConfigError> {
    garden_of_assemblage::make_graph(graph)?;
    levels::make_graph(graph)?;
    weapon_slots::make_graph(graph)?;
    hundred_acre_wood::make_graph(graph)?;
    hollow_bastion::make_graph(graph)?;
    land_of_dragons::make_graph(graph)?;
    twtnw::make_graph(graph)?;
    Ok(())
}
