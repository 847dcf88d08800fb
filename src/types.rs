use serde::{Deserialize, Deserializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Label values as delivered by the API; anything that is not a string never matches a filter.
pub type Labels = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone)]
pub struct Config {
    pub rancher_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub verbose: bool,
    pub debug: bool,
    pub group: bool,
    pub thresholds: Thresholds,
    pub filter: FilterConfig,
}

/// Availability bounds as ratios in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 1.0,
            critical: 0.5,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct FilterConfig {
    pub include: HashMap<String, String>,
    pub exclude: HashMap<String, String>,
    pub include_env: HashSet<String>,
    pub include_system: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Environments,
    Hosts,
    Stacks,
    Services,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Environments,
        CheckKind::Hosts,
        CheckKind::Stacks,
        CheckKind::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Environments => "environments",
            CheckKind::Hosts => "hosts",
            CheckKind::Stacks => "stacks",
            CheckKind::Services => "services",
        }
    }

    pub fn from_name(name: &str) -> Option<CheckKind> {
        CheckKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope of every list endpoint.
#[derive(Debug, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// An environment, called `project` by the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orchestration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_state: String,
}

impl Environment {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_ip_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Labels,
}

impl Host {
    pub fn is_available(&self) -> bool {
        self.state == "active"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub system: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scale: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_scale: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitioning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitioning_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitioning_progress: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub system: bool,
    #[serde(default)]
    pub launch_config: Option<LaunchConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stack_id: String,
}

impl Service {
    pub fn labels(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.launch_config.iter().flat_map(|lc| lc.labels.iter())
    }
}

/// Renders labels as `key=value` pairs in key order, for status lines.
pub fn format_labels<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
{
    let mut pairs: Vec<String> = labels
        .into_iter()
        .map(|(k, v)| match v.as_str() {
            Some(s) => format!("{}={}", k, s),
            None => format!("{}={}", k, v),
        })
        .collect();
    pairs.sort();
    pairs.join(",")
}

// The API sends explicit nulls for unset fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
