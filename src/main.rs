use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use rancher_health_check::config::{load_config, Cli, Command};
use rancher_health_check::render::render_text;
use rancher_health_check::report::{Severity, Verdict};
use rancher_health_check::runner::CheckRunner;
use rancher_health_check::server::{self, AppState};
use rancher_health_check::{Config, RancherClient};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.options.debug);

    let cfg = match load_config(&cli.options) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Configuration problems are reported before any check runs
            println!("{}", render_text(&Verdict::unknown(format!("{:#}", e))));
            return exit_code(Severity::Unknown);
        }
    };
    info!("rancher url = {}", cfg.rancher_url);

    match run(cli.command, cfg).await {
        Ok(severity) => exit_code(severity),
        Err(e) => {
            error!("{:#}", e);
            println!("{}", render_text(&Verdict::unknown(format!("{:#}", e))));
            exit_code(Severity::Unknown)
        }
    }
}

async fn run(command: Command, cfg: Config) -> Result<Severity> {
    let client = RancherClient::from_config(&cfg)?;
    info!("using rancher api at {}", client.base_url());

    if let Command::Serve { listen } = &command {
        let state = AppState::new(Arc::new(client), cfg.clone())?;
        server::serve(listen, state).await?;
        return Ok(Severity::Ok);
    }

    let runner = CheckRunner::new(&client, &cfg);
    let verdict = match command.check_kind() {
        Some(kind) => runner.run(kind).await,
        None => runner.run_all().await.verdict(),
    };
    print_verdict(&cfg, &verdict);
    Ok(verdict.severity)
}

fn print_verdict(cfg: &Config, verdict: &Verdict) {
    if cfg.verbose {
        for line in &verdict.details {
            println!("{}", line);
        }
    }
    println!("{}", render_text(verdict));
}

fn exit_code(severity: Severity) -> ExitCode {
    // Severity codes are 0..=3
    ExitCode::from(severity.code() as u8)
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
