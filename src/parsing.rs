use std::collections::{HashMap, HashSet};

/// Parses a percentage such as `"85%"` (the `%` is optional) into a ratio.
/// An empty value means zero.
pub fn parse_percent_to_ratio(q: &str) -> Option<f64> {
    let q = q.trim();
    if q.is_empty() {
        return Some(0.0);
    }
    let number = q.strip_suffix('%').unwrap_or(q).trim();
    match number.parse::<f64>() {
        Ok(pct) if pct.is_finite() && pct >= 0.0 => Some(pct / 100.0),
        _ => None,
    }
}

/// Parses `key=value[,key=value]` into a label map. Pairs that are not
/// exactly one `key=value` are skipped.
pub fn parse_label_pairs(q: &str) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    for pair in q.split(',') {
        let parts: Vec<&str> = pair.split('=').collect();
        if parts.len() != 2 {
            continue;
        }
        let key = parts[0].trim();
        if key.is_empty() {
            continue;
        }
        labels.insert(key.to_string(), parts[1].trim().to_string());
    }
    labels
}

pub fn parse_environment_list(q: &str) -> HashSet<String> {
    q.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
