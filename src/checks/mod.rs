// Resource checkers
pub mod environments;
pub mod hosts;
pub mod stacks;
pub mod services;

// Re-export commonly used items
pub use environments::{check_environments, environment_alarm};
pub use hosts::{check_hosts, evaluate_grouped, evaluate_ungrouped};
pub use stacks::{check_stacks, stack_alarm};
pub use services::{check_services, service_alarm};
