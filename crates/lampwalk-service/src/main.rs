// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! lampwalk-service: serves `POST /simulate` over HTTP.
//!
//! Defaults come from the persisted `simulate_service` prefs (created on
//! first run); command-line flags override them for this process only.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lampwalk_app_core::{ConfigService, ServicePrefs, SERVICE_PREFS_KEY};
use lampwalk_config_fs::FsConfigStore;
use lampwalk_core::{IlluminationRule, StepPolicy};
use lampwalk_service::{router, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Lampwalk simulate service")]
struct Args {
    /// Listener address (e.g. 127.0.0.1:8790)
    #[arg(long)]
    listen: Option<SocketAddr>,
    /// Wall-clock budget per evaluation, in milliseconds
    #[arg(long)]
    eval_timeout_ms: Option<u64>,
    /// Default illumination rule (lamped_nodes, continuous, node_crossings)
    #[arg(long)]
    rule: Option<IlluminationRule>,
    /// Default fixed step in seconds (otherwise the bounded policy applies)
    #[arg(long)]
    step: Option<f64>,
    /// Longest accepted path, in nodes
    #[arg(long)]
    max_path_length: Option<usize>,
    /// Directory holding the prefs file; platform config dir when omitted
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Ignore persisted prefs and never write them
    #[arg(long)]
    no_config: bool,
}

impl Args {
    fn apply(&self, prefs: &mut ServicePrefs) {
        if let Some(listen) = self.listen {
            prefs.listen = listen.to_string();
        }
        if let Some(ms) = self.eval_timeout_ms {
            prefs.eval_timeout_ms = ms;
        }
        if let Some(rule) = self.rule {
            prefs.evaluation.rule = rule;
        }
        if let Some(seconds) = self.step {
            prefs.evaluation.step = StepPolicy::Fixed { seconds };
        }
        if let Some(nodes) = self.max_path_length {
            prefs.evaluation.max_path_length = nodes;
        }
    }
}

fn load_prefs(args: &Args) -> ServicePrefs {
    if args.no_config {
        return ServicePrefs::default();
    }
    let store = match &args.config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    };
    let loaded = store
        .map(ConfigService::new)
        .and_then(|svc| svc.load_or_init::<ServicePrefs>(SERVICE_PREFS_KEY));
    match loaded {
        Ok(loaded) => {
            info!(location = %loaded.location, created = loaded.created, "prefs loaded");
            loaded.value
        }
        Err(err) => {
            warn!(%err, "config store unavailable; using built-in defaults");
            ServicePrefs::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut prefs = load_prefs(&args);
    args.apply(&mut prefs);
    let addr: SocketAddr = prefs
        .listen
        .parse()
        .with_context(|| format!("invalid listen address `{}`", prefs.listen))?;

    let app = router(AppState::from_prefs(&prefs));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(
        addr = %listener.local_addr()?,
        rule = %prefs.evaluation.rule,
        timeout_ms = prefs.eval_timeout_ms,
        max_path_length = prefs.evaluation.max_path_length,
        "lampwalk service listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    info!("lampwalk service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_only_what_they_name() {
        let args = Args::parse_from([
            "lampwalk-service",
            "--rule",
            "node-crossings",
            "--step",
            "0.2",
            "--max-path-length",
            "64",
        ]);
        let mut prefs = ServicePrefs::default();
        args.apply(&mut prefs);
        assert_eq!(prefs.evaluation.rule, IlluminationRule::NodeCrossings);
        assert_eq!(prefs.evaluation.step, StepPolicy::Fixed { seconds: 0.2 });
        assert_eq!(prefs.evaluation.max_path_length, 64);
        assert_eq!(prefs.listen, ServicePrefs::default().listen);
    }

    #[test]
    fn prefs_are_created_under_the_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "lampwalk-service",
            "--config-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert_eq!(load_prefs(&args), ServicePrefs::default());
        assert!(dir.path().join("simulate_service.json").exists());
    }
}
