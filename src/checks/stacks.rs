use tracing::debug;

use crate::cache::Lookups;
use crate::filter::in_scope;
use crate::rancher::{ProviderError, ResourceProvider};
use crate::report::{Severity, Verdict};
use crate::types::{Config, FilterConfig, Stack};

pub async fn check_stacks(
    provider: &dyn ResourceProvider,
    lookups: &Lookups,
    cfg: &Config,
) -> Result<Verdict, ProviderError> {
    let stacks = provider.list_stacks().await?;
    let mut verdict = Verdict::new();

    for stack in &stacks {
        let env = lookups.environment(provider, &stack.account_id).await?;
        if !in_scope(&cfg.filter, &env.name) {
            debug!("skipping stack {} in env {}", stack.name, env.name);
            continue;
        }
        verdict.note(format!(
            "{} in env {} is {}/{}",
            stack.name, env.name, stack.state, stack.health_state
        ));
        if let Some(alarm) = stack_alarm(stack, &env.name, &cfg.filter) {
            verdict.raise(Severity::Critical, &alarm);
        }
    }

    Ok(verdict)
}

/// A stack alarms when it is not active. Unhealthy stacks alarm too, except
/// that with system stacks included only system stacks are held to health.
pub fn stack_alarm(stack: &Stack, env_name: &str, filter: &FilterConfig) -> Option<String> {
    let inactive = stack.state != "active";
    let unhealthy = stack.health_state != "healthy" && (!filter.include_system || stack.system);
    if inactive || unhealthy {
        Some(format!(
            "{} in env {} ({}/{}) ",
            stack.name, env_name, stack.state, stack.health_state
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::{config, environment, stack};
    use crate::rancher::MockProvider;

    #[tokio::test]
    async fn test_healthy_stacks_ok() {
        let provider = MockProvider::new()
            .with_environment(environment("1a5", "Default", "active", "healthy"))
            .with_stack(stack("1st1", "healthcheck", "active", "healthy", "1a5"))
            .with_stack(stack("1st2", "worlddominationapp", "active", "healthy", "1a5"));

        let verdict = check_stacks(&provider, &Lookups::new(), &config()).await.unwrap();
        assert_eq!(verdict.severity, Severity::Ok);
        assert_eq!(verdict.details.len(), 2);
        assert_eq!(provider.environment_fetches(), 1);
    }

    #[tokio::test]
    async fn test_degraded_stack_is_critical() {
        let provider = MockProvider::new()
            .with_environment(environment("1a5", "Default", "active", "healthy"))
            .with_stack(stack("1st1", "healthcheck", "active", "healthy", "1a5"))
            .with_stack(stack("1st2", "worlddominationapp", "active", "degraded", "1a5"));

        let verdict = check_stacks(&provider, &Lookups::new(), &config()).await.unwrap();

        assert_eq!(verdict.severity, Severity::Critical);
        assert_eq!(verdict.alarm(), "worlddominationapp in env Default (active/degraded)");
    }

    #[tokio::test]
    async fn test_out_of_scope_stacks_skipped() {
        let provider = MockProvider::new()
            .with_environment(environment("1a5", "Default", "active", "healthy"))
            .with_environment(environment("1a7", "second", "active", "healthy"))
            .with_stack(stack("1st1", "broken", "error", "unhealthy", "1a7"));
        let mut cfg = config();
        cfg.filter.include_env.insert("Default".to_string());

        let verdict = check_stacks(&provider, &Lookups::new(), &cfg).await.unwrap();
        assert_eq!(verdict.severity, Severity::Ok);
        assert!(verdict.details.is_empty());
    }

    #[test]
    fn test_include_system_narrows_health_to_system_stacks() {
        let mut filter = FilterConfig::default();
        let mut infra = stack("1st3", "network-services", "active", "unhealthy", "1a5");
        infra.system = true;
        let app = stack("1st4", "app", "active", "unhealthy", "1a5");

        assert!(stack_alarm(&infra, "Default", &filter).is_some());
        assert!(stack_alarm(&app, "Default", &filter).is_some());

        filter.include_system = true;
        assert!(stack_alarm(&infra, "Default", &filter).is_some());
        assert!(stack_alarm(&app, "Default", &filter).is_none());

        // Inactive stacks always alarm
        let stopped = stack("1st5", "app", "inactive", "healthy", "1a5");
        assert!(stack_alarm(&stopped, "Default", &filter).is_some());
    }
}
