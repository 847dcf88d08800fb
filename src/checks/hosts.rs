use std::collections::BTreeMap;
use tracing::debug;

use crate::cache::Lookups;
use crate::filter::in_scope;
use crate::rancher::{ProviderError, ResourceProvider};
use crate::report::{Severity, Verdict};
use crate::threshold::evaluate_availability;
use crate::types::{format_labels, Config, Host, Thresholds};

/// A host together with the name of the environment it belongs to.
pub type ScopedHost = (String, Host);

/// Measures the share of active hosts against the thresholds, across all
/// in-scope hosts or per environment when grouping.
pub async fn check_hosts(
    provider: &dyn ResourceProvider,
    lookups: &Lookups,
    cfg: &Config,
) -> Result<Verdict, ProviderError> {
    let hosts = provider.list_hosts().await?;
    let mut verdict = Verdict::new();
    let mut scoped: Vec<ScopedHost> = Vec::with_capacity(hosts.len());

    for host in hosts {
        let env = lookups.environment(provider, &host.account_id).await?;
        if !in_scope(&cfg.filter, &env.name) {
            debug!("skipping host {} in env {}", host.hostname, env.name);
            continue;
        }
        verdict.note(format!(
            "{}({}) in env {} is {} {}",
            host.hostname,
            host.agent_ip_address,
            env.name,
            host.state,
            format_labels(&host.labels)
        ));
        scoped.push((env.name.clone(), host));
    }

    if cfg.group {
        evaluate_grouped(&scoped, &cfg.thresholds, &mut verdict);
    } else {
        evaluate_ungrouped(&scoped, &cfg.thresholds, &mut verdict);
    }
    Ok(verdict)
}

/// One ratio over every host. Unavailable hosts are always listed; the
/// availability summary follows when a threshold is crossed.
pub fn evaluate_ungrouped(hosts: &[ScopedHost], thresholds: &Thresholds, verdict: &mut Verdict) {
    let (available, unavailable) = split_available(hosts.iter().map(|(_, h)| h));
    verdict.raise(Severity::Ok, &unavailable);

    let availability = evaluate_availability(available, hosts.len(), thresholds);
    debug!("hosts: {}", availability.summary());
    if availability.is_violation() || hosts.is_empty() {
        verdict.raise(availability.severity, &format!(" {}", availability.summary()));
    }
}

/// One ratio per environment, in environment name order. The worst group
/// decides the severity; every violating group is reported.
pub fn evaluate_grouped(hosts: &[ScopedHost], thresholds: &Thresholds, verdict: &mut Verdict) {
    if hosts.is_empty() {
        verdict.raise(Severity::Ok, "no hosts in scope");
        return;
    }

    let mut groups: BTreeMap<&str, Vec<&Host>> = BTreeMap::new();
    for (env_name, host) in hosts {
        groups.entry(env_name.as_str()).or_default().push(host);
    }

    for (env_name, members) in groups {
        let (available, unavailable) = split_available(members.iter().copied());
        let availability = evaluate_availability(available, members.len(), thresholds);
        debug!("hosts in env {}: {}", env_name, availability.summary());
        if availability.is_violation() {
            verdict.raise(
                availability.severity,
                &format!("{}: {}: {} ", env_name, availability.summary(), unavailable),
            );
        }
    }
}

fn split_available<'a, I>(hosts: I) -> (usize, String)
where
    I: IntoIterator<Item = &'a Host>,
{
    let mut available = 0;
    let mut unavailable = String::new();
    for host in hosts {
        if host.is_available() {
            available += 1;
        } else {
            unavailable.push_str(&format!("{} is {} ", host.hostname, host.state));
        }
    }
    (available, unavailable)
}
