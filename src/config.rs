use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;

use crate::parsing::{parse_environment_list, parse_label_pairs, parse_percent_to_ratio};
use crate::types::{CheckKind, Config, FilterConfig, Thresholds};

/// check-rancher - rancher monitoring utility
///
/// Exit code is NRPE compatible (0: OK, 1: warning, 2: critical, 3: unknown)
#[derive(Debug, Parser)]
#[command(name = "check-rancher", version)]
pub struct Cli {
    #[command(flatten)]
    pub options: CheckOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check status of environments
    Environments,
    /// Check hosts (-g groups by environment and uses -w/-c)
    Hosts,
    /// Check status of stacks
    Stacks,
    /// Check status of services
    Services,
    /// Run every check and report the worst result
    All,
    /// Serve the checks over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },
}

impl Command {
    pub fn check_kind(&self) -> Option<CheckKind> {
        match self {
            Command::Environments => Some(CheckKind::Environments),
            Command::Hosts => Some(CheckKind::Hosts),
            Command::Stacks => Some(CheckKind::Stacks),
            Command::Services => Some(CheckKind::Services),
            Command::All | Command::Serve { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CheckOptions {
    /// Rancher url (env RANCHER_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Rancher access key (env RANCHER_ACCESS_KEY)
    #[arg(long, global = true)]
    pub access_key: Option<String>,

    /// Rancher secret key (env RANCHER_SECRET_KEY)
    #[arg(long, global = true)]
    pub secret_key: Option<String>,

    /// Verbose mode - show status of all checked resources
    #[arg(short = 'v', global = true)]
    pub verbose: bool,

    /// Debug mode - debug level logging on stderr
    #[arg(short = 'd', global = true)]
    pub debug: bool,

    /// Group resources, for example all hosts of an environment
    #[arg(short = 'g', global = true)]
    pub group: bool,

    /// Warning if less than that many percent of resources are available
    #[arg(short = 'w', global = true, default_value = "100%")]
    pub warning: String,

    /// Critical if less than that many percent of resources are available
    #[arg(short = 'c', global = true, default_value = "50%")]
    pub critical: String,

    /// Monitor items with these labels (ignore rest), key=value[,key=value]
    #[arg(short = 'i', global = true, default_value = "")]
    pub include: String,

    /// Do not monitor items with these labels (monitor rest). Ignored when -i is set
    #[arg(short = 'e', global = true, default_value = "")]
    pub exclude: String,

    /// System stacks only / include system services
    #[arg(long, global = true)]
    pub system: bool,

    /// Limit check to objects in these environments (comma-separated)
    #[arg(long = "env", global = true, default_value = "")]
    pub include_env: String,
}

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config(options: &CheckOptions) -> Result<Config> {
    load_config_with_env(options, &SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(options: &CheckOptions, env: &E) -> Result<Config> {
    let rancher_url = flag_or_env(&options.url, env, "RANCHER_URL")
        .ok_or_else(|| anyhow!("need rancher URL (--url or RANCHER_URL)"))?;

    let access_key = flag_or_env(&options.access_key, env, "RANCHER_ACCESS_KEY");
    let secret_key = flag_or_env(&options.secret_key, env, "RANCHER_SECRET_KEY");
    let (access_key, secret_key) = match (access_key, secret_key) {
        (Some(a), Some(s)) => (a, s),
        _ => return Err(anyhow!("need access key / secret key (RANCHER_ACCESS_KEY, RANCHER_SECRET_KEY)")),
    };

    let warning = parse_percent_to_ratio(&options.warning)
        .ok_or_else(|| anyhow!("Invalid warning threshold {:?}, expected NN%", options.warning))?;
    let critical = parse_percent_to_ratio(&options.critical)
        .ok_or_else(|| anyhow!("Invalid critical threshold {:?}, expected NN%", options.critical))?;

    Ok(Config {
        rancher_url,
        access_key,
        secret_key,
        verbose: options.verbose,
        debug: options.debug,
        group: options.group,
        thresholds: Thresholds { warning, critical },
        filter: FilterConfig {
            include: parse_label_pairs(&options.include),
            exclude: parse_label_pairs(&options.exclude),
            include_env: parse_environment_list(&options.include_env),
            include_system: options.system,
        },
    })
}

fn flag_or_env<E: EnvironmentProvider>(flag: &Option<String>, env: &E, key: &str) -> Option<String> {
    flag.clone()
        .or_else(|| env.get_var(key))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("check-rancher").chain(args.iter().copied())).unwrap()
    }

    fn credentials() -> MockEnvironment {
        MockEnvironment::new()
            .with_var("RANCHER_URL", "http://rancher.example:8080")
            .with_var("RANCHER_ACCESS_KEY", "access")
            .with_var("RANCHER_SECRET_KEY", "secret")
    }

    #[test]
    fn test_config_loading_defaults() {
        let cli = parse(&["hosts"]);
        let config = load_config_with_env(&cli.options, &credentials()).unwrap();

        assert_eq!(config.rancher_url, "http://rancher.example:8080");
        assert_eq!(config.access_key, "access");
        assert_eq!(config.secret_key, "secret");
        assert_eq!(config.thresholds, Thresholds { warning: 1.0, critical: 0.5 });
        assert!(!config.verbose);
        assert!(!config.group);
        assert!(config.filter.include.is_empty());
        assert!(config.filter.exclude.is_empty());
        assert!(config.filter.include_env.is_empty());
        assert!(!config.filter.include_system);
        assert_eq!(cli.command.check_kind(), Some(CheckKind::Hosts));
    }

    #[test]
    fn test_config_loading_with_flags() {
        let cli = parse(&[
            "-v", "-g", "-w", "90%", "-c", "55%",
            "-i", "monitor=yes", "--system", "--env", "Default,second",
            "--url", "http://flag.example", "hosts",
        ]);
        let config = load_config_with_env(&cli.options, &credentials()).unwrap();

        // Flags win over the environment
        assert_eq!(config.rancher_url, "http://flag.example");
        assert!(config.verbose);
        assert!(config.group);
        assert_eq!(config.thresholds.warning, 0.9);
        assert_eq!(config.thresholds.critical, 0.55);
        assert_eq!(config.filter.include.get("monitor"), Some(&"yes".to_string()));
        assert!(config.filter.include_system);
        assert!(config.filter.include_env.contains("Default"));
        assert!(config.filter.include_env.contains("second"));
    }

    #[test]
    fn test_options_after_subcommand() {
        let cli = parse(&["services", "-e", "monitor=no", "-v"]);
        assert!(matches!(cli.command, Command::Services));
        assert!(cli.options.verbose);
        assert_eq!(cli.options.exclude, "monitor=no");
    }

    #[test]
    fn test_serve_listen_address() {
        let cli = parse(&["serve", "--listen", "127.0.0.1:9000"]);
        match cli.command {
            Command::Serve { listen } => assert_eq!(listen, "127.0.0.1:9000"),
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(parse(&["all"]).command.check_kind(), None);
    }

    #[test]
    fn test_config_loading_missing_required() {
        let cli = parse(&["hosts"]);

        // Missing URL
        let env = MockEnvironment::new()
            .with_var("RANCHER_ACCESS_KEY", "access")
            .with_var("RANCHER_SECRET_KEY", "secret");
        let result = load_config_with_env(&cli.options, &env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("rancher URL"));

        // Missing secret key
        let env = MockEnvironment::new()
            .with_var("RANCHER_URL", "http://rancher.example")
            .with_var("RANCHER_ACCESS_KEY", "access");
        let result = load_config_with_env(&cli.options, &env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("secret key"));

        // Blank values count as missing
        let env = credentials().with_var("RANCHER_ACCESS_KEY", "  ");
        assert!(load_config_with_env(&cli.options, &env).is_err());
    }

    #[test]
    fn test_config_loading_invalid_threshold() {
        let cli = parse(&["-w", "lots", "hosts"]);
        let result = load_config_with_env(&cli.options, &credentials());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("warning threshold"));

        let cli = parse(&["-c", "half", "hosts"]);
        let result = load_config_with_env(&cli.options, &credentials());
        assert!(result.unwrap_err().to_string().contains("critical threshold"));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["check-rancher", "containers"]).is_err());
        assert!(Cli::try_parse_from(["check-rancher"]).is_err());
    }
}
