use tracing::debug;

use crate::filter::in_scope;
use crate::rancher::{ProviderError, ResourceProvider};
use crate::report::{Severity, Verdict};
use crate::types::{Config, Environment, FilterConfig};

/// Flags every environment that is not active, or not healthy while in scope.
pub async fn check_environments(provider: &dyn ResourceProvider, cfg: &Config) -> Result<Verdict, ProviderError> {
    let environments = provider.list_environments().await?;
    let mut verdict = Verdict::new();

    for env in &environments {
        verdict.note(environment_status(env));
        if let Some(alarm) = environment_alarm(env, &cfg.filter) {
            debug!("environment {} is {}/{}", env.name, env.state, env.health_state);
            verdict.raise(Severity::Critical, &alarm);
        }
    }

    Ok(verdict)
}

fn environment_status(env: &Environment) -> String {
    format!(
        "env {} running {} with {} active hosts is {}/{}",
        env.name,
        env.orchestration,
        env.member_count(),
        env.state,
        env.health_state
    )
}

/// An inactive environment alarms regardless of scope; an unhealthy one only
/// when in scope.
pub fn environment_alarm(env: &Environment, filter: &FilterConfig) -> Option<String> {
    let inactive = env.state != "active";
    let unhealthy = env.health_state != "healthy" && in_scope(filter, &env.name);
    if inactive || unhealthy {
        Some(format!("{} ", environment_status(env)))
    } else {
        None
    }
}
