//! Scenario tests spanning several subsystems

mod hierarchy_scenarios;
mod history_scenarios;
