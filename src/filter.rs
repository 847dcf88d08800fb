use std::collections::HashMap;

use crate::types::{FilterConfig, Service};

/// True when no environments were requested or `environment_name` is one of them.
pub fn in_scope(filter: &FilterConfig, environment_name: &str) -> bool {
    filter.include_env.is_empty() || filter.include_env.contains(environment_name)
}

/// Label filter. With include labels set, a resource is monitored if any of
/// its labels carries the requested value. Otherwise, with exclude labels set,
/// any matching label drops it. Include wins when both are configured.
pub fn should_monitor<'a, I>(filter: &FilterConfig, labels: I) -> bool
where
    I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
{
    if !filter.include.is_empty() {
        labels.into_iter().any(|(k, v)| label_matches(&filter.include, k, v))
    } else if !filter.exclude.is_empty() {
        !labels.into_iter().any(|(k, v)| label_matches(&filter.exclude, k, v))
    } else {
        true
    }
}

/// System services are always monitored when system resources are included.
pub fn monitor_service(filter: &FilterConfig, service: &Service) -> bool {
    (filter.include_system && service.system) || should_monitor(filter, service.labels())
}

fn label_matches(expected: &HashMap<String, String>, key: &str, value: &serde_json::Value) -> bool {
    match (expected.get(key), value.as_str()) {
        (Some(want), Some(have)) => want == have,
        _ => false,
    }
}
