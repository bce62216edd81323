use crate::assignment::Assignment;
use crate::traverse::traverse;
use kh2rando_game::{ItemCatalog, LocationGraph};
use kh2rando_logic::Inventory;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ValidationFailure {
    UnfilledCheck { check: String },
    MandatoryUnreachable { check: String, item: String },
    GoalUnreachable,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
    pub check_depth: Vec<Option<usize>>,
    pub goal_reached: bool,
    pub num_reachable_checks: usize,
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Checks that a finished assignment fills every slot and that, starting from `initial`, every
/// check holding a progression item and the goal can be reached.
pub fn validate(
    graph: &LocationGraph,
    catalog: &ItemCatalog,
    initial: &Inventory,
    assignment: &Assignment,
) -> ValidationReport {
    let mut failures = vec![];
    for (check_idx, check) in graph.checks.iter().enumerate() {
        let filled = match assignment.get(check_idx) {
            None => false,
            Some(placement) => check.category.num_slots() == 1 || placement.item2.is_some(),
        };
        if !filled {
            failures.push(ValidationFailure::UnfilledCheck {
                check: check.name.clone(),
            });
        }
    }

    let result = traverse(graph, initial, Some(assignment));
    for (check_idx, check) in graph.checks.iter().enumerate() {
        if result.check_depth[check_idx].is_some() {
            continue;
        }
        for item in assignment.items_at(check_idx) {
            if graph.is_progression(item) {
                failures.push(ValidationFailure::MandatoryUnreachable {
                    check: check.name.clone(),
                    item: catalog.name(item).to_string(),
                });
            }
        }
    }
    let goal_reached = result.goal_reached();
    if !goal_reached {
        failures.push(ValidationFailure::GoalUnreachable);
    }

    ValidationReport {
        num_reachable_checks: result.num_reachable_checks(),
        check_depth: result.check_depth,
        goal_reached,
        failures,
    }
}
