use tracing::{error, info};

use crate::cache::Lookups;
use crate::checks;
use crate::rancher::{ProviderError, ResourceProvider};
use crate::report::{HealthReport, Verdict};
use crate::types::{CheckKind, Config};

/// Runs checks against one provider. The lookup caches live as long as the
/// runner, so build one per invocation.
pub struct CheckRunner<'a> {
    provider: &'a dyn ResourceProvider,
    config: &'a Config,
    lookups: Lookups,
}

impl<'a> CheckRunner<'a> {
    pub fn new(provider: &'a dyn ResourceProvider, config: &'a Config) -> Self {
        Self {
            provider,
            config,
            lookups: Lookups::new(),
        }
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    /// Runs one check. Provider failures become an UNKNOWN verdict carrying the error text.
    pub async fn run(&self, kind: CheckKind) -> Verdict {
        match self.try_run(kind).await {
            Ok(verdict) => {
                info!("{} check finished: {}", kind, verdict.severity);
                verdict
            }
            Err(e) => {
                error!("{} check failed: {}", kind, e);
                Verdict::unknown(e.to_string())
            }
        }
    }

    pub async fn try_run(&self, kind: CheckKind) -> Result<Verdict, ProviderError> {
        match kind {
            CheckKind::Environments => checks::check_environments(self.provider, self.config).await,
            CheckKind::Hosts => checks::check_hosts(self.provider, &self.lookups, self.config).await,
            CheckKind::Stacks => checks::check_stacks(self.provider, &self.lookups, self.config).await,
            CheckKind::Services => checks::check_services(self.provider, &self.lookups, self.config).await,
        }
    }

    /// Runs every check in order, sharing the lookup caches between them.
    pub async fn run_all(&self) -> HealthReport {
        let mut report = HealthReport::new();
        for kind in CheckKind::ALL {
            report.add(kind, self.run(kind).await);
        }
        let summary = report.summary();
        info!(
            "all checks finished: {} ok, {} warning, {} critical, {} unknown",
            summary.ok_count, summary.warning_count, summary.critical_count, summary.unknown_count
        );
        report
    }
}
