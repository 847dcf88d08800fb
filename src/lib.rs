// Public modules
pub mod types;
pub mod config;
pub mod parsing;
pub mod rancher;
pub mod cache;
pub mod filter;
pub mod threshold;
pub mod checks;
pub mod runner;
pub mod report;
pub mod render;
pub mod server;

// Re-export commonly used items
pub use types::*;
pub use config::{load_config, load_config_with_env, Cli, CheckOptions, Command, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_percent_to_ratio, parse_label_pairs, parse_environment_list};
pub use rancher::{ResourceProvider, RancherClient, MockProvider, ProviderError};
pub use cache::{LookupCache, Lookups};
pub use filter::{in_scope, should_monitor, monitor_service};
pub use threshold::{evaluate_availability, severity_for_rate, Availability};
pub use checks::*;
pub use runner::CheckRunner;
pub use report::{HealthReport, ReportSummary, Severity, Verdict};
pub use render::{render_text, render_html, page_templates};
