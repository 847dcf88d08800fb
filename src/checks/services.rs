use tracing::debug;

use crate::cache::Lookups;
use crate::filter::{in_scope, monitor_service};
use crate::rancher::{ProviderError, ResourceProvider};
use crate::report::{Severity, Verdict};
use crate::types::{format_labels, Config, Service};

/// Flags monitored services that are not healthy. Services resolve their
/// environment through their stack.
pub async fn check_services(
    provider: &dyn ResourceProvider,
    lookups: &Lookups,
    cfg: &Config,
) -> Result<Verdict, ProviderError> {
    let services = provider.list_services().await?;
    let mut verdict = Verdict::new();

    for service in &services {
        let stack = lookups.stack(provider, &service.stack_id).await?;
        let env = lookups.environment(provider, &stack.account_id).await?;
        if !in_scope(&cfg.filter, &env.name) {
            debug!("skipping service {}/{} in env {}", stack.name, service.name, env.name);
            continue;
        }

        let monitor = monitor_service(&cfg.filter, service);
        verdict.note(format!(
            "env={}, stack={}, currentscale={} health={}, name={}, scale={}, stackid={}, state={}, transition={}, transitionmessage={}, transitioningprogress={}, labels={}, system={}, monitor={}",
            env.name,
            stack.name,
            service.current_scale,
            service.health_state,
            service.name,
            service.scale,
            service.stack_id,
            service.state,
            service.transitioning,
            service.transitioning_message,
            service.transitioning_progress,
            format_labels(service.labels()),
            service.system,
            monitor
        ));

        if monitor {
            if let Some(alarm) = service_alarm(service, &stack.name, &env.name) {
                verdict.raise(Severity::Critical, &alarm);
            }
        }
    }

    Ok(verdict)
}

pub fn service_alarm(service: &Service, stack_name: &str, env_name: &str) -> Option<String> {
    if service.health_state == "healthy" {
        return None;
    }
    Some(format!(
        "{}/{} in env {} is {} ",
        stack_name, service.name, env_name, service.health_state
    ))
}
